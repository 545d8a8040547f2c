//! String-argument invocation surface.
//!
//! A ledger host calls the registry by function name with a positional list
//! of string arguments. Parsing happens up front, so an unknown function or a
//! wrong argument count never touches world state.

use response_credit_core::{encode_credit, Credit};

use crate::error::{RegistryError, Result};

/// A parsed call into the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    InitializeRegistry,
    IssueCredit {
        id: String,
        issue_date: String,
        owner: String,
    },
    ReadCredit {
        id: String,
    },
    UpdateCredit {
        id: String,
        issue_date: String,
        owner: String,
    },
    TransferCredit {
        id: String,
        new_owner: String,
    },
    DeleteCredit {
        id: String,
    },
    CreditExists {
        id: String,
    },
    GetAllCredits,
}

impl Invocation {
    /// Parse a function name and its positional arguments.
    ///
    /// `InitLedger` is accepted as an alias for `InitializeRegistry`.
    pub fn parse<A: AsRef<str>>(function: &str, args: &[A]) -> Result<Self> {
        let arg = |i: usize| args[i].as_ref().to_owned();

        let expected = match function {
            "InitializeRegistry" | "InitLedger" | "GetAllCredits" => 0,
            "ReadCredit" | "DeleteCredit" | "CreditExists" => 1,
            "TransferCredit" => 2,
            "IssueCredit" | "UpdateCredit" => 3,
            other => {
                return Err(RegistryError::InvalidInvocation(format!(
                    "unknown function {:?}",
                    other
                )))
            }
        };

        if args.len() != expected {
            return Err(RegistryError::InvalidInvocation(format!(
                "{} expects {} argument(s), got {}",
                function,
                expected,
                args.len()
            )));
        }

        let invocation = match function {
            "InitializeRegistry" | "InitLedger" => Invocation::InitializeRegistry,
            "GetAllCredits" => Invocation::GetAllCredits,
            "ReadCredit" => Invocation::ReadCredit { id: arg(0) },
            "DeleteCredit" => Invocation::DeleteCredit { id: arg(0) },
            "CreditExists" => Invocation::CreditExists { id: arg(0) },
            "TransferCredit" => Invocation::TransferCredit {
                id: arg(0),
                new_owner: arg(1),
            },
            "IssueCredit" => Invocation::IssueCredit {
                id: arg(0),
                issue_date: arg(1),
                owner: arg(2),
            },
            _ => Invocation::UpdateCredit {
                id: arg(0),
                issue_date: arg(1),
                owner: arg(2),
            },
        };
        Ok(invocation)
    }

    /// Canonical function name of this call.
    pub fn function_name(&self) -> &'static str {
        match self {
            Invocation::InitializeRegistry => "InitializeRegistry",
            Invocation::IssueCredit { .. } => "IssueCredit",
            Invocation::ReadCredit { .. } => "ReadCredit",
            Invocation::UpdateCredit { .. } => "UpdateCredit",
            Invocation::TransferCredit { .. } => "TransferCredit",
            Invocation::DeleteCredit { .. } => "DeleteCredit",
            Invocation::CreditExists { .. } => "CreditExists",
            Invocation::GetAllCredits => "GetAllCredits",
        }
    }
}

/// What a successful invocation returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationResponse {
    /// Mutations return nothing.
    Empty,
    Credit(Credit),
    Credits(Vec<Credit>),
    Exists(bool),
}

impl InvocationResponse {
    /// Serialize the response into the bytes handed back to the host.
    ///
    /// Credits use their canonical encoding; a list is a JSON array of them
    /// (`[]` when empty); existence is `true` or `false`.
    pub fn to_payload(&self) -> Result<Vec<u8>> {
        match self {
            InvocationResponse::Empty => Ok(Vec::new()),
            InvocationResponse::Exists(exists) => Ok(exists.to_string().into_bytes()),
            InvocationResponse::Credit(credit) => encode(credit),
            InvocationResponse::Credits(credits) => {
                let mut out = Vec::with_capacity(2 + credits.len() * 64);
                out.push(b'[');
                for (i, credit) in credits.iter().enumerate() {
                    if i > 0 {
                        out.push(b',');
                    }
                    out.extend_from_slice(&encode(credit)?);
                }
                out.push(b']');
                Ok(out)
            }
        }
    }
}

fn encode(credit: &Credit) -> Result<Vec<u8>> {
    encode_credit(credit).map_err(|source| RegistryError::Encoding {
        id: credit.id.clone(),
        source,
    })
}
