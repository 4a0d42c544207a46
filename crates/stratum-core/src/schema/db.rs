mod column;
pub use column::Column;

mod io;
pub use io::ColumnIo;

mod schema;
pub use schema::Schema;

mod table;
pub use table::{Table, TableId};

mod ty;
pub use ty::Type;
