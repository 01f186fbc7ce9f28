//! Key-value store adapters
//!
//! Each adapter implements `KeyValueStore` and `HealthCheckable` from
//! `core_kernel::ports`; domain repositories only ever see the trait.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use core_kernel::KeyValueStore;
//! use infra_db::adapters::InMemoryKeyValueStore;
//!
//! let store: Arc<dyn KeyValueStore> = Arc::new(InMemoryKeyValueStore::new());
//! ```

pub mod memory;
pub mod file;
pub mod postgres;

pub use memory::InMemoryKeyValueStore;
pub use file::FileKeyValueStore;
pub use postgres::PostgresKeyValueStore;
