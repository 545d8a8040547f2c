//! A store wrapper that counts calls, injects failures and tracks cursors.
//!
//! Wrap any [`KeyValueStore`] to assert that a failed operation wrote
//! nothing, that store errors surface as errors, and that every cursor the
//! registry opens is closed again.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use bytes::Bytes;
use response_credit_store::{KeyRange, KeyValue, KeyValueStore, Result, StateCursor, StoreError};

/// A store call that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    Get,
    Put,
    Delete,
    Scan,
    /// `next_entry` on cursors opened while the fault is set.
    CursorNext,
    /// `close` on cursors opened while the fault is set.
    CursorClose,
}

#[derive(Debug, Default)]
struct Faults {
    active: Vec<Fault>,
    /// Successful puts left before `put` starts failing.
    put_budget: Option<usize>,
}

impl Faults {
    fn is_set(&self, fault: Fault) -> bool {
        self.active.contains(&fault)
    }
}

/// Counting, fault-injecting wrapper around a store.
pub struct InstrumentedStore<S> {
    inner: S,
    gets: AtomicUsize,
    puts: AtomicUsize,
    deletes: AtomicUsize,
    scans: AtomicUsize,
    open_cursors: Arc<AtomicUsize>,
    faults: Mutex<Faults>,
}

impl<S: KeyValueStore> InstrumentedStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            gets: AtomicUsize::new(0),
            puts: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
            scans: AtomicUsize::new(0),
            open_cursors: Arc::new(AtomicUsize::new(0)),
            faults: Mutex::new(Faults::default()),
        }
    }

    /// The wrapped store. Calls made on it are not counted.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// Puts that reached the wrapped store.
    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// Deletes that reached the wrapped store.
    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    /// Puts plus deletes.
    pub fn mutations(&self) -> usize {
        self.puts() + self.deletes()
    }

    pub fn scans(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }

    /// Cursors opened and not yet closed.
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }

    /// Make `fault` fail from now on.
    pub fn fail(&self, fault: Fault) {
        if let Ok(mut faults) = self.faults() {
            if !faults.is_set(fault) {
                faults.active.push(fault);
            }
        }
    }

    /// Clear one fault.
    pub fn heal(&self, fault: Fault) {
        if let Ok(mut faults) = self.faults() {
            faults.active.retain(|f| *f != fault);
        }
    }

    /// Clear every fault, including a put budget.
    pub fn heal_all(&self) {
        if let Ok(mut faults) = self.faults() {
            *faults = Faults::default();
        }
    }

    /// Let `n` more puts succeed, then fail every put after them.
    pub fn fail_puts_after(&self, n: usize) {
        if let Ok(mut faults) = self.faults() {
            faults.put_budget = Some(n);
        }
    }

    /// Reset every counter except open cursors.
    pub fn reset_counts(&self) {
        for counter in [&self.gets, &self.puts, &self.deletes, &self.scans] {
            counter.store(0, Ordering::SeqCst);
        }
    }

    fn faults(&self) -> Result<MutexGuard<'_, Faults>> {
        self.faults
            .lock()
            .map_err(|e| StoreError::Poisoned(format!("fault table poisoned: {}", e)))
    }

    fn check(&self, fault: Fault) -> Result<()> {
        if self.faults()?.is_set(fault) {
            tracing::debug!(?fault, "injected store fault");
            return Err(StoreError::Unavailable(format!("injected {:?} fault", fault)));
        }
        Ok(())
    }

    fn check_put(&self) -> Result<()> {
        self.check(Fault::Put)?;
        let mut faults = self.faults()?;
        match faults.put_budget {
            Some(0) => Err(StoreError::Unavailable("put budget exhausted".into())),
            Some(n) => {
                faults.put_budget = Some(n - 1);
                Ok(())
            }
            None => Ok(()),
        }
    }
}

#[async_trait]
impl<S: KeyValueStore> KeyValueStore for InstrumentedStore<S> {
    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        self.check(Fault::Get)?;
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: Bytes) -> Result<()> {
        self.check_put()?;
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner.put(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.check(Fault::Delete)?;
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(key).await
    }

    async fn range_scan(&self, range: KeyRange) -> Result<Box<dyn StateCursor>> {
        self.check(Fault::Scan)?;
        let (fail_next, fail_close) = {
            let faults = self.faults()?;
            (faults.is_set(Fault::CursorNext), faults.is_set(Fault::CursorClose))
        };

        let inner = self.inner.range_scan(range).await?;
        self.scans.fetch_add(1, Ordering::SeqCst);
        self.open_cursors.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(TrackedCursor {
            inner,
            open_cursors: Arc::clone(&self.open_cursors),
            fail_next,
            fail_close,
            released: false,
        }))
    }
}

/// Cursor that decrements the open count when closed.
///
/// Dropping it without closing leaves the count raised, which is how leaks
/// show up in tests.
struct TrackedCursor {
    inner: Box<dyn StateCursor>,
    open_cursors: Arc<AtomicUsize>,
    fail_next: bool,
    fail_close: bool,
    released: bool,
}

#[async_trait]
impl StateCursor for TrackedCursor {
    async fn next_entry(&mut self) -> Result<Option<KeyValue>> {
        if self.released {
            return Err(StoreError::CursorClosed);
        }
        if self.fail_next {
            return Err(StoreError::Unavailable("injected CursorNext fault".into()));
        }
        self.inner.next_entry().await
    }

    fn close(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        self.open_cursors.fetch_sub(1, Ordering::SeqCst);
        self.inner.close()?;

        if self.fail_close {
            return Err(StoreError::Unavailable("injected CursorClose fault".into()));
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use response_credit_store::MemoryStore;

    #[tokio::test]
    async fn test_counts_calls() {
        let store = InstrumentedStore::new(MemoryStore::new());
        store.put("A", Bytes::from_static(b"a")).await.unwrap();
        store.get("A").await.unwrap();
        store.delete("A").await.unwrap();

        assert_eq!(store.puts(), 1);
        assert_eq!(store.gets(), 1);
        assert_eq!(store.deletes(), 1);
        assert_eq!(store.mutations(), 2);
    }

    #[tokio::test]
    async fn test_injected_fault_blocks_write() {
        let store = InstrumentedStore::new(MemoryStore::new());
        store.fail(Fault::Put);

        let err = store.put("A", Bytes::from_static(b"a")).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert_eq!(store.puts(), 0);
        assert!(store.inner().is_empty().unwrap());

        store.heal(Fault::Put);
        store.put("A", Bytes::from_static(b"a")).await.unwrap();
        assert_eq!(store.puts(), 1);
    }

    #[tokio::test]
    async fn test_put_budget() {
        let store = InstrumentedStore::new(MemoryStore::new());
        store.fail_puts_after(1);

        store.put("A", Bytes::from_static(b"a")).await.unwrap();
        assert!(store.put("B", Bytes::from_static(b"b")).await.is_err());
        assert_eq!(store.inner().len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_tracks_open_cursors() {
        let store = InstrumentedStore::new(MemoryStore::new());

        let mut cursor = store.range_scan(KeyRange::full()).await.unwrap();
        assert_eq!(store.open_cursors(), 1);

        cursor.close().unwrap();
        cursor.close().unwrap();
        assert_eq!(store.open_cursors(), 0);
        assert!(matches!(
            cursor.next_entry().await,
            Err(StoreError::CursorClosed)
        ));

        let leaked = store.range_scan(KeyRange::full()).await.unwrap();
        drop(leaked);
        assert_eq!(store.open_cursors(), 1);
    }
}
