//! Error types for the registry.

use response_credit_core::{CoreError, CreditId};
use response_credit_store::StoreError;
use thiserror::Error;

/// Errors that can occur during registry operations.
///
/// Every variant that concerns a specific record carries its id.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Issuance attempted against an occupied id.
    #[error("the credit {0} already exists")]
    AlreadyExists(CreditId),

    /// Read, update, transfer or delete attempted against an absent id.
    #[error("the credit {0} does not exist")]
    NotFound(CreditId),

    /// Stored bytes do not conform to the credit encoding.
    #[error("failed to decode credit {id}: {source}")]
    Decoding {
        id: CreditId,
        #[source]
        source: CoreError,
    },

    /// A credit could not be serialized.
    #[error("failed to encode credit {id}: {source}")]
    Encoding {
        id: CreditId,
        #[source]
        source: CoreError,
    },

    /// World state failed to service a request.
    #[error("failed to access world state: {0}")]
    Store(#[from] StoreError),

    /// Id rejected before reaching world state.
    #[error("invalid credit id: {0:?}")]
    InvalidId(String),

    /// Unknown function or wrong arguments on the invocation surface.
    #[error("invalid invocation: {0}")]
    InvalidInvocation(String),
}

/// Fieldless view of [`RegistryError`] for callers that only branch on kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    AlreadyExists,
    NotFound,
    Decoding,
    Encoding,
    Store,
    InvalidArgument,
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegistryError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            RegistryError::NotFound(_) => ErrorKind::NotFound,
            RegistryError::Decoding { .. } => ErrorKind::Decoding,
            RegistryError::Encoding { .. } => ErrorKind::Encoding,
            RegistryError::Store(_) => ErrorKind::Store,
            RegistryError::InvalidId(_) | RegistryError::InvalidInvocation(_) => {
                ErrorKind::InvalidArgument
            }
        }
    }

    /// The credit id this error is about, if any.
    pub fn credit_id(&self) -> Option<&CreditId> {
        match self {
            RegistryError::AlreadyExists(id) | RegistryError::NotFound(id) => Some(id),
            RegistryError::Decoding { id, .. } | RegistryError::Encoding { id, .. } => Some(id),
            _ => None,
        }
    }
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
