//! # Response Credit Testkit
//!
//! Testing utilities for the response credit registry.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Credits with their exact stored bytes, for cross-implementation checks
//! - **Generators**: Proptest strategies for property-based testing
//! - **Instrumented store**: Counts store calls, injects faults, tracks open cursors
//! - **Fixtures**: A registry wired to an instrumented in-memory store
//!
//! ## Golden Vectors
//!
//! ```rust
//! use response_credit_testkit::vectors::verify_all_vectors;
//!
//! for (name, matches, actual) in verify_all_vectors() {
//!     assert!(matches, "{}: {}", name, actual);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use response_credit_testkit::generators::{credit_from_params, CreditParams};
//!
//! proptest! {
//!     #[test]
//!     fn encoding_is_deterministic(params: CreditParams) {
//!         let c = credit_from_params(&params);
//!         prop_assert_eq!(encode_credit(&c).unwrap(), encode_credit(&c).unwrap());
//!     }
//! }
//! ```
//!
//! ## Fault Injection
//!
//! ```rust,ignore
//! use response_credit_testkit::{Fault, RegistryFixture};
//!
//! let fixture = RegistryFixture::seeded().await?;
//! fixture.store.fail(Fault::Get);
//! assert!(fixture.registry.credit_exists("000001").await.is_err());
//! ```

pub mod fixtures;
pub mod generators;
pub mod instrumented;
pub mod vectors;

pub use fixtures::{sample_credits, FixtureStore, RegistryFixture};
pub use generators::{credit_from_params, CreditParams};
pub use instrumented::{Fault, InstrumentedStore};
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector};
