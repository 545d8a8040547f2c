//! # Response Credit Core
//!
//! Pure primitives for the response credit registry: the [`Credit`] record,
//! its identifier, and the canonical encoding shared with every other
//! implementation that reads or writes the same world state.
//!
//! This crate contains no I/O, no storage, no async. It is pure computation
//! over credit records.
//!
//! ## Key Types
//!
//! - [`Credit`] - A tradable unit of demand-response value
//! - [`CreditId`] - Caller-assigned identifier, doubles as the world-state key
//!
//! ## Canonicalization
//!
//! Credits are encoded as compact JSON with keys in the fixed order
//! `ID`, `IssueDate`, `Owner`. See the [`canonical`] module.

pub mod canonical;
pub mod credit;
pub mod error;
pub mod types;

pub use canonical::{decode_credit, encode_credit};
pub use credit::Credit;
pub use error::CoreError;
pub use types::CreditId;
