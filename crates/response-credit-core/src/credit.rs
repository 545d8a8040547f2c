//! The credit record.
//!
//! A [`Credit`] represents a tradable unit of demand-response value. Field
//! declaration order is the wire order: `ID`, `IssueDate`, `Owner`. Stored
//! bytes are read back with [`crate::decode_credit`], which applies the
//! ledger's lenient field matching.

use serde::Serialize;

use crate::types::CreditId;

/// A response credit as stored in world state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Credit {
    /// Globally unique id, also the world-state key.
    #[serde(rename = "ID")]
    pub id: CreditId,

    /// Calendar date of issuance, e.g. `"2021-12-25"`.
    #[serde(rename = "IssueDate")]
    pub issue_date: String,

    /// Current holder, e.g. `"BESS1"`.
    #[serde(rename = "Owner")]
    pub owner: String,
}

impl Credit {
    /// Create a credit from its three fields.
    pub fn new(
        id: impl Into<CreditId>,
        issue_date: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            issue_date: issue_date.into(),
            owner: owner.into(),
        }
    }

    /// Hand the credit to a new owner. Id and issue date are untouched.
    pub fn transfer_to(&mut self, new_owner: impl Into<String>) {
        self.owner = new_owner.into();
    }
}
