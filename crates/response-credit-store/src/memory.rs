//! In-memory implementation of the KeyValueStore trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use bytes::Bytes;

use crate::cursor::{PageSource, PagedCursor, DEFAULT_PAGE_SIZE};
use crate::error::{Result, StoreError};
use crate::traits::{validate_key, KeyRange, KeyValue, KeyValueStore, StateCursor};

type StateMap = BTreeMap<String, Bytes>;

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
/// Keys are kept ordered so range scans match SQLite's byte ordering.
pub struct MemoryStore {
    state: Arc<RwLock<StateMap>>,
    page_size: usize,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(BTreeMap::new())),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set how many entries a range cursor pulls per page.
    pub fn with_scan_batch(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> Result<usize> {
        Ok(read_state(&self.state)?.len())
    }

    /// True if the store holds no keys.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(read_state(&self.state)?.is_empty())
    }

    /// Write raw bytes under `key`, bypassing the empty-value rule.
    ///
    /// Lets tests plant values no well-behaved writer would produce.
    pub fn insert_raw(&self, key: impl Into<String>, value: impl Into<Bytes>) -> Result<()> {
        write_state(&self.state)?.insert(key.into(), value.into());
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn read_state(state: &RwLock<StateMap>) -> Result<RwLockReadGuard<'_, StateMap>> {
    state
        .read()
        .map_err(|e| StoreError::Poisoned(e.to_string()))
}

fn write_state(state: &RwLock<StateMap>) -> Result<RwLockWriteGuard<'_, StateMap>> {
    state
        .write()
        .map_err(|e| StoreError::Poisoned(e.to_string()))
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        let state = read_state(&self.state)?;
        Ok(state.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Bytes) -> Result<()> {
        validate_key(key)?;
        let mut state = write_state(&self.state)?;

        // Empty means absent
        if value.is_empty() {
            state.remove(key);
        } else {
            state.insert(key.to_owned(), value);
        }

        tracing::debug!(key, "memory store put");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        write_state(&self.state)?.remove(key);

        tracing::debug!(key, "memory store delete");
        Ok(())
    }

    async fn range_scan(&self, range: KeyRange) -> Result<Box<dyn StateCursor>> {
        tracing::debug!(start = %range.start, end = %range.end, "memory range cursor opened");
        let source = MemoryPages {
            state: Arc::clone(&self.state),
        };
        Ok(Box::new(PagedCursor::new(source, range, self.page_size)))
    }
}

/// Page source reading straight from the shared map.
struct MemoryPages {
    state: Arc<RwLock<StateMap>>,
}

#[async_trait]
impl PageSource for MemoryPages {
    async fn fetch_page(
        &self,
        range: &KeyRange,
        after: Option<&str>,
        limit: usize,
    ) -> Result<Vec<KeyValue>> {
        let state = read_state(&self.state)?;

        // Resume strictly after the last key handed out
        let lower = match after {
            Some(after) => Bound::Excluded(after),
            None if range.start.is_empty() => Bound::Unbounded,
            None => Bound::Included(range.start.as_str()),
        };

        // Stop at the exclusive end
        let page = state
            .range::<str, _>((lower, Bound::Unbounded))
            .take_while(|(key, _)| range.end.is_empty() || key.as_str() < range.end.as_str())
            .filter(|(key, _)| range.contains(key))
            .take(limit)
            .map(|(key, value)| KeyValue::new(key.clone(), value.clone()))
            .collect();

        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    async fn collect(store: &MemoryStore, range: KeyRange) -> Vec<String> {
        let mut cursor = store.range_scan(range).await.unwrap();
        let mut keys = Vec::new();
        while let Some(entry) = cursor.next_entry().await.unwrap() {
            keys.push(entry.key);
        }
        cursor.close().unwrap();
        keys
    }

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryStore::new();

        assert_eq!(store.get("000001").await.unwrap(), None);

        store.put("000001", Bytes::from_static(b"one")).await.unwrap();
        assert_eq!(
            store.get("000001").await.unwrap(),
            Some(Bytes::from_static(b"one"))
        );

        store.put("000001", Bytes::from_static(b"uno")).await.unwrap();
        assert_eq!(
            store.get("000001").await.unwrap(),
            Some(Bytes::from_static(b"uno"))
        );

        store.delete("000001").await.unwrap();
        assert_eq!(store.get("000001").await.unwrap(), None);
        assert!(store.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_delete_absent_key_succeeds() {
        let store = MemoryStore::new();
        store.delete("missing").await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_value_removes_key() {
        let store = MemoryStore::new();
        store.put("A", Bytes::from_static(b"a")).await.unwrap();
        store.put("A", Bytes::new()).await.unwrap();

        assert_eq!(store.get("A").await.unwrap(), None);
        assert_eq!(store.len().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_empty_key_rejected() {
        let store = MemoryStore::new();
        let put = store.put("", Bytes::from_static(b"x")).await;
        assert!(matches!(put, Err(StoreError::InvalidKey(_))));

        let delete = store.delete("").await;
        assert!(matches!(delete, Err(StoreError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_range_scan_ordered() {
        let store = MemoryStore::new().with_scan_batch(2);
        for key in ["C", "A", "000002", "B", "000001"] {
            store.put(key, Bytes::from(key.to_owned())).await.unwrap();
        }

        assert_eq!(
            collect(&store, KeyRange::full()).await,
            vec!["000001", "000002", "A", "B", "C"]
        );
        assert_eq!(collect(&store, KeyRange::new("A", "C")).await, vec!["A", "B"]);
        assert_eq!(collect(&store, KeyRange::new("B", "")).await, vec!["B", "C"]);
    }

    #[tokio::test]
    async fn test_range_scan_empty_store() {
        let store = MemoryStore::new();
        assert!(collect(&store, KeyRange::full()).await.is_empty());
    }

    #[tokio::test]
    async fn test_cursor_sees_later_writes_past_position() {
        let store = MemoryStore::new().with_scan_batch(1);
        store.put("A", Bytes::from_static(b"a")).await.unwrap();
        store.put("C", Bytes::from_static(b"c")).await.unwrap();

        let mut cursor = store.range_scan(KeyRange::full()).await.unwrap();
        assert_eq!(cursor.next_entry().await.unwrap().unwrap().key, "A");

        store.put("B", Bytes::from_static(b"b")).await.unwrap();
        assert_eq!(cursor.next_entry().await.unwrap().unwrap().key, "B");
        assert_eq!(cursor.next_entry().await.unwrap().unwrap().key, "C");
        assert!(cursor.next_entry().await.unwrap().is_none());
    }

    proptest! {
        #[test]
        fn test_paged_scan_matches_range_contains(
            keys in prop::collection::btree_set("[A-Ca-c0-2]{1,3}", 0..40),
            start in "[A-Ca-c0-2]{0,2}",
            end in "[A-Ca-c0-2]{0,2}",
            page_size in 1usize..6,
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let store = MemoryStore::new().with_scan_batch(page_size);
            let range = KeyRange::new(start, end);

            let scanned = runtime.block_on(async {
                for key in &keys {
                    store.put(key, Bytes::from(key.clone())).await.unwrap();
                }
                collect(&store, range.clone()).await
            });

            let expected: Vec<String> = keys
                .iter()
                .filter(|key| range.contains(key))
                .cloned()
                .collect();
            prop_assert_eq!(scanned, expected);
        }
    }
}
