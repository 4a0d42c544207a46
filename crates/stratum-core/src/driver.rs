mod dictionary;
pub use dictionary::{Dictionary, StorageTypes};

mod result;
pub use result::ResultRow;

mod row;
pub use row::{Row, RowAction, RowManager};

mod select;
pub use select::{EagerMode, Join, JoinKind, Joins, Select};

mod state;
pub use state::{ObjectId, StateManager};

mod store;
pub use store::{LargeObject, LobTarget, Store};
