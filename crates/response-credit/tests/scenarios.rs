//! End-to-end registry scenarios against both world-state backends.

use std::sync::Arc;

use anyhow::Result;
use bytes::Bytes;
use response_credit::store::KeyRange;
use response_credit::{
    Credit, CreditRegistry, ErrorKind, KeyValueStore, MemoryStore, RegistryConfig, SqliteStore,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

async fn lifecycle<S: KeyValueStore>(registry: &CreditRegistry<S>) -> Result<()> {
    registry.initialize_registry().await?;
    assert_eq!(
        registry.read_credit("000002").await?,
        Credit::new("000002", "2021-12-25", "BESS1")
    );

    registry.issue_credit("X", "2024-01-01", "BESS1").await?;
    registry.transfer_credit("X", "BESS2").await?;
    assert_eq!(registry.read_credit("X").await?.owner, "BESS2");

    registry.update_credit("X", "2024-03-03", "BESS2").await?;
    assert_eq!(
        registry.read_credit("X").await?,
        Credit::new("X", "2024-03-03", "BESS2")
    );

    registry.delete_credit("000001").await?;
    assert!(!registry.credit_exists("000001").await?);

    let ids: Vec<String> = registry
        .get_all_credits()
        .await?
        .into_iter()
        .map(|c| c.id.into_inner())
        .collect();
    assert_eq!(ids, vec!["000002", "000003", "X"]);
    Ok(())
}

#[tokio::test]
async fn test_lifecycle_memory() -> Result<()> {
    init_tracing();
    let registry = CreditRegistry::new(MemoryStore::new(), RegistryConfig::default());
    lifecycle(&registry).await
}

#[tokio::test]
async fn test_lifecycle_sqlite() -> Result<()> {
    init_tracing();
    let store = SqliteStore::open_memory()?.with_scan_batch(2);
    let registry = CreditRegistry::new(store, RegistryConfig::default());
    lifecycle(&registry).await
}

#[tokio::test]
async fn test_state_survives_reopen() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("world-state.db");

    {
        let registry = CreditRegistry::new(SqliteStore::open(&path)?, RegistryConfig::default());
        registry.initialize_registry().await?;
        registry.transfer_credit("000003", "DER4").await?;
    }

    let registry = CreditRegistry::new(SqliteStore::open(&path)?, RegistryConfig::default());
    assert_eq!(registry.read_credit("000003").await?.owner, "DER4");
    assert_eq!(registry.get_all_credits().await?.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_records_are_canonical_bytes() -> Result<()> {
    let registry = CreditRegistry::new(MemoryStore::new(), RegistryConfig::default());
    registry.issue_credit("000009", "2023-07-14", "BESS1").await?;

    let raw = registry.store().get("000009").await?;
    assert_eq!(
        raw,
        Some(Bytes::from_static(
            br#"{"ID":"000009","IssueDate":"2023-07-14","Owner":"BESS1"}"#
        ))
    );
    Ok(())
}

#[tokio::test]
async fn test_records_written_by_other_writers_are_readable() -> Result<()> {
    let store = MemoryStore::new();
    store.insert_raw(
        "000001",
        Bytes::from_static(
            br#"{"ID":"000001","IssueDate":"2021-12-30","Issuer":"VPP Operator","Owner":"DER1"}"#,
        ),
    )?;
    let registry = CreditRegistry::new(store, RegistryConfig::default());

    assert_eq!(
        registry.read_credit("000001").await?,
        Credit::new("000001", "2021-12-30", "DER1")
    );
    Ok(())
}

#[tokio::test]
async fn test_enumeration_tolerates_null_and_folded_keys() -> Result<()> {
    let store = MemoryStore::new();
    store.insert_raw(
        "000001",
        Bytes::from_static(br#"{"ID":"000001","IssueDate":null,"Owner":"DER1"}"#),
    )?;
    store.insert_raw(
        "000002",
        Bytes::from_static(br#"{"id":"000002","issueDate":"2022-01-05","owner":"DER2"}"#),
    )?;
    let registry = CreditRegistry::new(store, RegistryConfig::default());

    assert_eq!(
        registry.get_all_credits().await?,
        vec![
            Credit::new("000001", "", "DER1"),
            Credit::new("000002", "2022-01-05", "DER2"),
        ]
    );

    registry.transfer_credit("000002", "BESS1").await?;
    assert_eq!(
        registry.store().get("000002").await?,
        Some(Bytes::from_static(
            br#"{"ID":"000002","IssueDate":"2022-01-05","Owner":"BESS1"}"#
        ))
    );
    Ok(())
}

#[tokio::test]
async fn test_shared_store_sees_registry_writes() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let registry =
        CreditRegistry::with_shared_store(Arc::clone(&store), RegistryConfig::default());

    registry.issue_credit("A", "2024-01-01", "BESS1").await?;
    let mut cursor = store.range_scan(KeyRange::full()).await?;
    let entry = cursor.next_entry().await?.expect("one entry");
    assert_eq!(entry.key, "A");
    cursor.close()?;
    Ok(())
}

#[tokio::test]
async fn test_scan_can_stop_early() -> Result<()> {
    let registry = CreditRegistry::new(
        MemoryStore::new().with_scan_batch(1),
        RegistryConfig::default(),
    );
    registry.initialize_registry().await?;

    let mut scan = registry.scan_credits().await?;
    let first = scan.next_credit().await?.expect("seeded credit");
    assert_eq!(first.id.as_str(), "000001");
    scan.close()?;

    let err = registry.read_credit("").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    Ok(())
}
