//! Database module: models and schema for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: pooled SQLite storage
//! - `memory.rs`: in-process store for tests and local runs

pub mod memory;
pub mod models;
pub mod schema;
pub mod sqlite;

pub use memory::MemoryStore;
pub use models::{NewCredential, UserCredential};
pub use schema::SQLITE_INIT;
pub use sqlite::{CredentialsStorage, SqlitePool};
