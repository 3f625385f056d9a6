//! Persistence adapters
//!
//! SQLite key-value storage for production and JSON-in-memory storage for
//! demos and tests, both behind the repository ports.

mod encounter_repository;
mod kv_store;
mod memory;
mod party_repository;

pub use encounter_repository::SqliteEncounterRepository;
pub use kv_store::{connect, SqliteKeyValueStore};
pub use memory::{InMemoryEncounterRepository, InMemoryPartyRepository};
pub use party_repository::SqlitePartyRepository;
