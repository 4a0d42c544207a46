mod class;
pub use class::{ClassBuilder, ClassLayout, ClassMapping, Embedding, Identity, ObjectIdType};

mod discriminator;
pub use discriminator::Discriminator;

mod field;
pub use field::{FieldBuilder, FieldMapping};

mod map;
pub use map::MapContext;

mod repository;
pub use repository::{Builder, Repository};

mod value;
pub use value::{ColumnConfig, NullValue, ValueKind, ValueMapping};

mod version;
pub use version::Version;
