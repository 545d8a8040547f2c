//! # Response Credit Registry
//!
//! Records response credits on a shared ledger's world state. A response
//! credit is issued to a participant (a battery, a distributed energy
//! resource) that delivered a demand-response event, and can later be
//! reassigned to another owner.
//!
//! ## Overview
//!
//! - **Credit**: `ID`, `IssueDate`, `Owner`. Stored as canonical JSON under its id.
//! - **World state**: any [`KeyValueStore`]; [`MemoryStore`] and [`SqliteStore`] ship here.
//! - **Registry**: [`CreditRegistry`] issues, reads, updates, transfers,
//!   deletes and enumerates credits, one store mutation per call.
//! - **Invocation**: [`CreditRegistry::invoke`] takes a function name and
//!   string arguments, the way a ledger host calls in.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use response_credit::{CreditRegistry, RegistryConfig};
//! use response_credit::store::SqliteStore;
//!
//! async fn example() -> response_credit::Result<()> {
//!     let store = SqliteStore::open("world-state.db")?;
//!     let registry = CreditRegistry::new(store, RegistryConfig::default());
//!
//!     registry.initialize_registry().await?;
//!     registry.transfer_credit("000001", "BESS2").await?;
//!
//!     for credit in registry.get_all_credits().await? {
//!         println!("{} owned by {}", credit.id, credit.owner);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `response_credit::core` - Credit record and its canonical encoding
//! - `response_credit::store` - World-state abstraction, memory and SQLite backends

pub mod error;
pub mod invoke;
pub mod registry;
pub mod scan;

// Re-export component crates
pub use response_credit_core as core;
pub use response_credit_store as store;

pub use error::{ErrorKind, RegistryError, Result};
pub use invoke::{Invocation, InvocationResponse};
pub use registry::{
    bootstrap_credits, CreditRegistry, RegistryConfig, BOOTSTRAP_ISSUE_DATE, BOOTSTRAP_OWNER,
};
pub use scan::CreditScan;

pub use response_credit_core::{decode_credit, encode_credit, Credit, CreditId};
pub use response_credit_store::{KeyValueStore, MemoryStore, SqliteStore};
