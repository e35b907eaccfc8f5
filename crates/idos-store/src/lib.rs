//! # idOS Store
//!
//! Storage abstraction for the idOS kernel. The remote database is modelled
//! as an opaque record store behind the [`Store`] trait, so the kernel never
//! depends on a transport.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait: `list`, `create`, `delete`, `get`, `get_shared`
//! - [`StoreExt`] - Typed helpers for grants, credentials and wallets
//! - [`Filter`] - Field conditions, including normalized address matching
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//!
//! ## Usage
//!
//! ```rust,no_run
//! use idos_core::Grant;
//! use idos_store::{SqliteStore, StoreExt};
//!
//! async fn example() {
//!     let store = SqliteStore::open("idos.db").unwrap();
//!
//!     store.create_grant(&Grant::new("", "alice.near", 0)).await.unwrap();
//!     let grants = store.list_grants_for("alice.near").await.unwrap();
//!     assert_eq!(grants.len(), 1);
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Create and delete only**: records are never updated in place
//! - **Ids**: a record without an `id` gets a fresh UUID on create
//! - **Shared lookups**: `get_shared` on credentials only returns shared copies

pub mod error;
pub mod memory;
pub mod migration;
pub mod record;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use record::{from_record, record_id, to_record, Filter, Record, Table};
pub use sqlite::SqliteStore;
pub use traits::{Store, StoreExt};
