//! Strong type definitions for the response credit registry.
//!
//! Identifiers are newtypes so a credit id cannot be confused with an owner
//! or an issue date at compile time.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// A credit identifier, e.g. `"000001"`.
///
/// Assigned by the caller at issuance and never changed afterwards. The id is
/// also the world-state key the credit is stored under.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreditId(String);

impl CreditId {
    /// Create a new CreditId.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a world-state key.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the empty id, which no store will accept as a key.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume the id, returning the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for CreditId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CreditId({:?})", self.0)
    }
}

impl fmt::Display for CreditId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CreditId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CreditId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CreditId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for CreditId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
