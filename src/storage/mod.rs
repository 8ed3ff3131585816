pub mod engine;
pub mod memory;
pub mod table;

pub use engine::{BackendResult, PersistenceBackend};
pub use memory::InMemoryBackend;
pub use table::Table;
