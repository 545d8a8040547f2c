//! The CreditRegistry: lifecycle operations over credits in world state.
//!
//! Each operation is one call that optionally checks existence, builds or
//! mutates a [`Credit`] in memory, encodes it, and issues exactly one store
//! mutation. A failed precondition returns before anything is written.

use std::sync::Arc;

use bytes::Bytes;
use response_credit_core::{decode_credit, encode_credit, Credit, CreditId};
use response_credit_store::{KeyRange, KeyValueStore};

use crate::error::{RegistryError, Result};
use crate::invoke::{Invocation, InvocationResponse};
use crate::scan::CreditScan;

/// Issue date of the bootstrap credits.
pub const BOOTSTRAP_ISSUE_DATE: &str = "2021-12-25";

/// Owner of the bootstrap credits.
pub const BOOTSTRAP_OWNER: &str = "BESS1";

/// The three credits written by [`CreditRegistry::initialize_registry`]
/// under the default configuration.
pub fn bootstrap_credits() -> Vec<Credit> {
    ["000001", "000002", "000003"]
        .into_iter()
        .map(|id| Credit::new(id, BOOTSTRAP_ISSUE_DATE, BOOTSTRAP_OWNER))
        .collect()
}

/// Configuration for the registry.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Credits written, in order, by `initialize_registry`.
    pub seed: Vec<Credit>,
    /// Reject empty ids before touching world state.
    pub validate_ids: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            seed: bootstrap_credits(),
            validate_ids: true,
        }
    }
}

/// The main registry struct.
///
/// Provides:
/// - Seeding world state with the bootstrap credits
/// - Issuing, updating, transferring and deleting credits
/// - Reading one credit, checking existence, enumerating all credits
pub struct CreditRegistry<S: KeyValueStore> {
    /// The world-state backend.
    store: Arc<S>,
    /// Configuration.
    config: RegistryConfig,
}

impl<S: KeyValueStore> CreditRegistry<S> {
    /// Create a registry over `store`.
    pub fn new(store: S, config: RegistryConfig) -> Self {
        Self::with_shared_store(Arc::new(store), config)
    }

    /// Create a registry over a store that other components also hold.
    pub fn with_shared_store(store: Arc<S>, config: RegistryConfig) -> Self {
        Self { store, config }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Seed
    // ─────────────────────────────────────────────────────────────────────────

    /// Write the configured seed credits without checking for existing ones.
    ///
    /// Existing records under the seed ids are overwritten. The first failure
    /// aborts the loop; credits written before it stay written.
    pub async fn initialize_registry(&self) -> Result<()> {
        for credit in &self.config.seed {
            self.write_credit(credit).await?;
        }

        tracing::info!(count = self.config.seed.len(), "registry seeded");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Issue a new credit. Fails with `AlreadyExists` if `id` is taken.
    pub async fn issue_credit(&self, id: &str, issue_date: &str, owner: &str) -> Result<()> {
        if self.credit_exists(id).await? {
            return Err(RegistryError::AlreadyExists(CreditId::from(id)));
        }

        let credit = Credit::new(id, issue_date, owner);
        self.write_credit(&credit).await?;

        tracing::debug!(id, owner, "credit issued");
        Ok(())
    }

    /// Replace every field of an existing credit.
    ///
    /// There is no patch semantic: fields meant to stay the same must be
    /// passed with their current values.
    pub async fn update_credit(&self, id: &str, issue_date: &str, owner: &str) -> Result<()> {
        if !self.credit_exists(id).await? {
            return Err(RegistryError::NotFound(CreditId::from(id)));
        }

        let credit = Credit::new(id, issue_date, owner);
        self.write_credit(&credit).await
    }

    /// Change the owner of an existing credit, keeping id and issue date.
    pub async fn transfer_credit(&self, id: &str, new_owner: &str) -> Result<()> {
        let mut credit = self.read_credit(id).await?;
        let previous = std::mem::take(&mut credit.owner);
        credit.transfer_to(new_owner);

        self.write_credit(&credit).await?;

        tracing::debug!(id, from = %previous, to = new_owner, "credit transferred");
        Ok(())
    }

    /// Remove an existing credit.
    pub async fn delete_credit(&self, id: &str) -> Result<()> {
        if !self.credit_exists(id).await? {
            return Err(RegistryError::NotFound(CreditId::from(id)));
        }

        self.store.delete(id).await?;

        tracing::debug!(id, "credit deleted");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Fetch and decode one credit.
    pub async fn read_credit(&self, id: &str) -> Result<Credit> {
        let bytes = self
            .get_present(id)
            .await?
            .ok_or_else(|| RegistryError::NotFound(CreditId::from(id)))?;

        decode_credit(&bytes).map_err(|source| {
            tracing::warn!(id, error = %source, "stored credit failed to decode");
            RegistryError::Decoding {
                id: CreditId::from(id),
                source,
            }
        })
    }

    /// True iff world state holds a non-empty value under `id`.
    ///
    /// A store failure is returned as an error, never as `false`.
    pub async fn credit_exists(&self, id: &str) -> Result<bool> {
        Ok(self.get_present(id).await?.is_some())
    }

    /// Every credit in world state, in store key order.
    ///
    /// Fails as a whole on the first record that does not decode.
    pub async fn get_all_credits(&self) -> Result<Vec<Credit>> {
        let mut scan = self.scan_credits().await?;
        let credits = scan.collect_remaining().await?;
        scan.close()?;
        Ok(credits)
    }

    /// Open a lazy scan over every credit in world state.
    pub async fn scan_credits(&self) -> Result<CreditScan> {
        let cursor = self.store.range_scan(KeyRange::full()).await?;
        Ok(CreditScan::new(cursor))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Invocation surface
    // ─────────────────────────────────────────────────────────────────────────

    /// Run a parsed invocation.
    pub async fn execute(&self, invocation: Invocation) -> Result<InvocationResponse> {
        let response = match invocation {
            Invocation::InitializeRegistry => {
                self.initialize_registry().await?;
                InvocationResponse::Empty
            }
            Invocation::IssueCredit {
                id,
                issue_date,
                owner,
            } => {
                self.issue_credit(&id, &issue_date, &owner).await?;
                InvocationResponse::Empty
            }
            Invocation::ReadCredit { id } => InvocationResponse::Credit(self.read_credit(&id).await?),
            Invocation::UpdateCredit {
                id,
                issue_date,
                owner,
            } => {
                self.update_credit(&id, &issue_date, &owner).await?;
                InvocationResponse::Empty
            }
            Invocation::TransferCredit { id, new_owner } => {
                self.transfer_credit(&id, &new_owner).await?;
                InvocationResponse::Empty
            }
            Invocation::DeleteCredit { id } => {
                self.delete_credit(&id).await?;
                InvocationResponse::Empty
            }
            Invocation::CreditExists { id } => {
                InvocationResponse::Exists(self.credit_exists(&id).await?)
            }
            Invocation::GetAllCredits => InvocationResponse::Credits(self.get_all_credits().await?),
        };
        Ok(response)
    }

    /// Parse `function` with string `args`, run it, and return the response payload.
    pub async fn invoke<A: AsRef<str>>(&self, function: &str, args: &[A]) -> Result<Vec<u8>> {
        let invocation = Invocation::parse(function, args)?;
        tracing::debug!(function = invocation.function_name(), "invocation");
        self.execute(invocation).await?.to_payload()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    fn check_id(&self, id: &str) -> Result<()> {
        if self.config.validate_ids && id.is_empty() {
            return Err(RegistryError::InvalidId(id.to_owned()));
        }
        Ok(())
    }

    /// Raw get that treats an empty value as absent.
    async fn get_present(&self, id: &str) -> Result<Option<Bytes>> {
        self.check_id(id)?;
        let value = self.store.get(id).await?;
        Ok(value.filter(|v| !v.is_empty()))
    }

    /// Encode `credit` and put it under its own id.
    async fn write_credit(&self, credit: &Credit) -> Result<()> {
        self.check_id(credit.id.as_str())?;

        let bytes = encode_credit(credit).map_err(|source| RegistryError::Encoding {
            id: credit.id.clone(),
            source,
        })?;

        self.store.put(credit.id.as_str(), Bytes::from(bytes)).await?;
        Ok(())
    }
}
