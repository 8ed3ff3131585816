pub mod error;
pub mod types;
pub mod value;

pub use error::{BackendError, ConflictError, DbError, Result};
pub use types::{Column, ColumnValues, RecordSchema, Row};
pub use value::{DataType, Value};
