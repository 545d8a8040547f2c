//! KeyValueStore trait: the abstract interface to world state.
//!
//! This trait allows the registry to be storage-agnostic. Implementations
//! include SQLite (durable) and in-memory (for tests); a ledger client can
//! implement it too.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::{Result, StoreError};

/// One entry yielded by a range scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Bytes,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<Bytes>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A half-open key range `[start, end)`.
///
/// An empty `start` means "from the first key", an empty `end` means
/// "through the last key". `KeyRange::full()` covers the whole namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyRange {
    pub start: String,
    pub end: String,
}

impl KeyRange {
    /// Create a range from an inclusive start and exclusive end.
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// The unbounded range over every key in the namespace.
    pub fn full() -> Self {
        Self::default()
    }

    /// True if neither end is bounded.
    pub fn is_full(&self) -> bool {
        self.start.is_empty() && self.end.is_empty()
    }

    /// Check whether `key` falls inside the range.
    pub fn contains(&self, key: &str) -> bool {
        (self.start.is_empty() || key >= self.start.as_str())
            && (self.end.is_empty() || key < self.end.as_str())
    }
}

/// Reject keys the world state cannot hold.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(StoreError::InvalidKey("key must not be an empty string".into()));
    }
    Ok(())
}

/// A lazy cursor over a key range.
///
/// Entries arrive in ascending key order. A cursor holds backend resources
/// until [`StateCursor::close`] is called; closing twice is a no-op, and
/// reading after close fails with [`StoreError::CursorClosed`].
#[async_trait]
pub trait StateCursor: Send {
    /// Fetch the next entry, or `None` once the range is exhausted.
    async fn next_entry(&mut self) -> Result<Option<KeyValue>>;

    /// Release the cursor.
    fn close(&mut self) -> Result<()>;

    /// Whether [`StateCursor::close`] has been called.
    fn is_closed(&self) -> bool;
}

/// The KeyValueStore trait: async interface to world state.
///
/// # Design Notes
///
/// - **Absent is not an error**: `get` returns `Ok(None)` for a missing key.
///   `Err` always means the store itself failed.
/// - **Empty means absent**: `put` with an empty value removes the key.
/// - **Read-your-writes**: a `get` or scan issued after a `put` on the same
///   store observes it.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Bytes>>;

    /// Write `value` under `key`, replacing any previous value.
    async fn put(&self, key: &str, value: Bytes) -> Result<()>;

    /// Remove `key`. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Open a lazy cursor over `range`.
    async fn range_scan(&self, range: KeyRange) -> Result<Box<dyn StateCursor>>;
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        (**self).get(key).await
    }

    async fn put(&self, key: &str, value: Bytes) -> Result<()> {
        (**self).put(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key).await
    }

    async fn range_scan(&self, range: KeyRange) -> Result<Box<dyn StateCursor>> {
        (**self).range_scan(range).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_range_contains_everything() {
        let range = KeyRange::full();
        assert!(range.is_full());
        assert!(range.contains(""));
        assert!(range.contains("000001"));
        assert!(range.contains("zzz"));
    }

    #[test]
    fn test_range_is_half_open() {
        let range = KeyRange::new("B", "D");
        assert!(!range.contains("A"));
        assert!(range.contains("B"));
        assert!(range.contains("C"));
        assert!(range.contains("Czz"));
        assert!(!range.contains("D"));
    }

    #[test]
    fn test_open_ended_ranges() {
        assert!(KeyRange::new("B", "").contains("zzz"));
        assert!(!KeyRange::new("B", "").contains("A"));
        assert!(KeyRange::new("", "B").contains("A"));
        assert!(!KeyRange::new("", "B").contains("B"));
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("000001").is_ok());
        assert!(matches!(validate_key(""), Err(StoreError::InvalidKey(_))));
    }
}
