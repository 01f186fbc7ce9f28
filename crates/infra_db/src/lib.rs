//! Infrastructure Persistence Layer
//!
//! This crate provides the adapters behind the `KeyValueStore` port:
//!
//! - **InMemoryKeyValueStore**: process-local map, used by tests and demos
//! - **FileKeyValueStore**: one JSON document on disk, the server-side
//!   analogue of a browser's local storage
//! - **PostgresKeyValueStore**: a `kv_entries` table accessed through SQLx
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{DatabaseConfig, create_pool, PostgresKeyValueStore};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/quoting")).await?;
//! let store = PostgresKeyValueStore::new(pool);
//! store.migrate().await?;
//! ```

pub mod pool;
pub mod error;
pub mod adapters;

pub use pool::{DatabasePool, create_pool, DatabaseConfig};
pub use error::DatabaseError;
pub use adapters::{InMemoryKeyValueStore, FileKeyValueStore, PostgresKeyValueStore};
