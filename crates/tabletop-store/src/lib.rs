//! Tabletop Store — persistence collaborators.
//!
//! Two `RecordStore` implementations share one subscription fan-out:
//! an in-memory store for tests and ephemeral sessions, and a SQLite
//! store for the desktop database.

pub mod hub;
pub mod memory;
pub mod schema;
pub mod sqlite;

pub use memory::MemoryRecordStore;
pub use sqlite::{SqliteRecordStore, connect};
