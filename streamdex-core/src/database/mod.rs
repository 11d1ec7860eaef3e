//! Persistence ports and their SQLite implementation.

pub mod ports;
pub mod sqlite;

pub use sqlite::SqliteCatalogStore;
