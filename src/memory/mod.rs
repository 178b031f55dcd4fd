//! Memory system: short-term context window and durable thought stores.

pub mod sqlite;
pub mod store;

pub use sqlite::{SqliteThoughtStore, ThoughtStore};
pub use store::MemoryStore;
