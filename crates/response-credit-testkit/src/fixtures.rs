//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use response_credit::{CreditRegistry, RegistryConfig, Result};
use response_credit_core::Credit;
use response_credit_store::{KeyRange, KeyValueStore, MemoryStore};

use crate::instrumented::InstrumentedStore;

/// The store type fixtures run against.
pub type FixtureStore = InstrumentedStore<MemoryStore>;

/// A registry over an instrumented in-memory store.
pub struct RegistryFixture {
    pub store: Arc<FixtureStore>,
    pub registry: CreditRegistry<FixtureStore>,
}

impl RegistryFixture {
    /// Empty world state, default configuration.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self::with_store(MemoryStore::new(), config)
    }

    /// Use a preconfigured memory store, e.g. one with a small scan batch.
    pub fn with_store(store: MemoryStore, config: RegistryConfig) -> Self {
        let store = Arc::new(InstrumentedStore::new(store));
        let registry = CreditRegistry::with_shared_store(Arc::clone(&store), config);
        Self { store, registry }
    }

    /// A fixture whose world state holds the bootstrap credits.
    ///
    /// Counters are reset after seeding.
    pub async fn seeded() -> Result<Self> {
        let fixture = Self::new();
        fixture.registry.initialize_registry().await?;
        fixture.store.reset_counts();
        Ok(fixture)
    }

    /// Write `credits` straight into world state, bypassing the registry.
    pub async fn preload(&self, credits: &[Credit]) -> Result<()> {
        for credit in credits {
            let bytes = response_credit_core::encode_credit(credit).map_err(|source| {
                response_credit::RegistryError::Encoding {
                    id: credit.id.clone(),
                    source,
                }
            })?;
            self.store
                .inner()
                .put(credit.id.as_str(), Bytes::from(bytes))
                .await?;
        }
        Ok(())
    }

    /// Every raw key and value in world state, read past the instrumentation.
    pub async fn snapshot(&self) -> Result<BTreeMap<String, Bytes>> {
        let mut cursor = self.store.inner().range_scan(KeyRange::full()).await?;
        let mut state = BTreeMap::new();
        while let Some(entry) = cursor.next_entry().await? {
            state.insert(entry.key, entry.value);
        }
        cursor.close()?;
        Ok(state)
    }
}

impl Default for RegistryFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// `count` credits with zero-padded sequential ids, all owned by `owner`.
pub fn sample_credits(count: usize, owner: &str) -> Vec<Credit> {
    (1..=count)
        .map(|i| Credit::new(format!("{:06}", i), "2021-12-25", owner))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seeded_fixture() {
        let fixture = RegistryFixture::seeded().await.unwrap();
        let state = fixture.snapshot().await.unwrap();

        assert_eq!(
            state.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["000001", "000002", "000003"]
        );
        assert_eq!(fixture.store.mutations(), 0);
    }

    #[tokio::test]
    async fn test_preload_bypasses_counters() {
        let fixture = RegistryFixture::new();
        fixture.preload(&sample_credits(5, "BESS1")).await.unwrap();

        assert_eq!(fixture.store.puts(), 0);
        assert_eq!(fixture.registry.get_all_credits().await.unwrap().len(), 5);
        assert_eq!(fixture.store.open_cursors(), 0);
    }

    #[test]
    fn test_sample_credits() {
        let credits = sample_credits(3, "DER1");
        assert_eq!(credits[2], Credit::new("000003", "2021-12-25", "DER1"));
    }
}
