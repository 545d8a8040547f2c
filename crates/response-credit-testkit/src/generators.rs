//! Proptest generators for property-based testing.

use std::collections::BTreeMap;

use proptest::prelude::*;

use response_credit_core::{Credit, CreditId};

/// Generate a non-empty credit id.
pub fn credit_id() -> impl Strategy<Value = CreditId> {
    "[0-9A-Za-z_-]{1,16}".prop_map(CreditId::from)
}

/// Generate a calendar-shaped date string.
pub fn issue_date() -> impl Strategy<Value = String> {
    (2000u32..=2099, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| format!("{:04}-{:02}-{:02}", y, m, d))
}

/// Generate an owner name, including characters the encoder must escape.
pub fn owner() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Z]{3,4}[0-9]{1,2}".prop_map(String::from),
        "[A-Za-z0-9 <>&\"\\\\._-]{0,24}".prop_map(String::from),
        ".{0,24}".prop_map(String::from),
    ]
}

/// Parameters for generating a credit.
#[derive(Debug, Clone)]
pub struct CreditParams {
    pub id: CreditId,
    pub issue_date: String,
    pub owner: String,
}

impl Arbitrary for CreditParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (credit_id(), issue_date(), owner())
            .prop_map(|(id, issue_date, owner)| CreditParams {
                id,
                issue_date,
                owner,
            })
            .boxed()
    }
}

/// Generate a credit from parameters.
pub fn credit_from_params(params: &CreditParams) -> Credit {
    Credit::new(
        params.id.clone(),
        params.issue_date.clone(),
        params.owner.clone(),
    )
}

/// Generate a single credit.
pub fn credit() -> impl Strategy<Value = Credit> {
    any::<CreditParams>().prop_map(|p| credit_from_params(&p))
}

/// Generate up to `max` credits with distinct ids, in id order.
pub fn distinct_credits(max: usize) -> impl Strategy<Value = Vec<Credit>> {
    prop::collection::btree_map(credit_id(), (issue_date(), owner()), 0..=max).prop_map(
        |entries: BTreeMap<CreditId, (String, String)>| {
            entries
                .into_iter()
                .map(|(id, (date, owner))| Credit::new(id, date, owner))
                .collect()
        },
    )
}
