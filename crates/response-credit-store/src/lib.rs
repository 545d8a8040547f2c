//! # Response Credit Store
//!
//! World-state abstraction for the response credit registry. Provides a
//! trait-based key-value interface with SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! The registry never talks to a ledger directly. It consumes the
//! [`KeyValueStore`] capability: get, put and delete by key, plus a lazy
//! [`StateCursor`] over a key range. [`SqliteStore`] persists world state to
//! disk; [`MemoryStore`] keeps it in an ordered map for tests.
//!
//! ## Key Types
//!
//! - [`KeyValueStore`] - The async trait for all world-state operations
//! - [`StateCursor`] - A range-scan cursor that must be closed
//! - [`KeyRange`] - Half-open key range, empty bounds are unbounded
//! - [`PagedCursor`] - Cursor that fetches a range page by page
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bytes::Bytes;
//! use response_credit_store::{KeyRange, KeyValueStore, SqliteStore};
//!
//! async fn example() {
//!     let store = SqliteStore::open("world-state.db").unwrap();
//!
//!     store.put("000001", Bytes::from_static(b"{}")).await.unwrap();
//!     let value = store.get("000001").await.unwrap();
//!     assert!(value.is_some());
//!
//!     let mut cursor = store.range_scan(KeyRange::full()).await.unwrap();
//!     while let Some(entry) = cursor.next_entry().await.unwrap() {
//!         println!("{} => {} bytes", entry.key, entry.value.len());
//!     }
//!     cursor.close().unwrap();
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Empty means absent**: putting an empty value deletes the key, so a key
//!   is either absent or holds a non-empty value
//! - **Empty keys rejected**: `put` and `delete` refuse the empty key
//! - **Lazy scans**: cursors fetch one page at a time in key order and see
//!   writes made after they were opened

pub mod cursor;
pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use cursor::{PageSource, PagedCursor, DEFAULT_PAGE_SIZE};
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{validate_key, KeyRange, KeyValue, KeyValueStore, StateCursor};
