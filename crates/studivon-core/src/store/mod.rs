//! Task repository implementations.

mod memory;
mod sqlite;

pub use memory::InMemoryTaskRepository;
pub use sqlite::SqliteTaskRepository;
