//! SQLite implementation of the KeyValueStore trait.
//!
//! This is the durable world-state backend. It uses rusqlite with bundled
//! SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use rusqlite::{params, Connection, OptionalExtension};

use crate::cursor::{PageSource, PagedCursor, DEFAULT_PAGE_SIZE};
use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{validate_key, KeyRange, KeyValue, KeyValueStore, StateCursor};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
    /// Rows fetched per range-scan page.
    page_size: usize,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self::from_connection(conn))
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set how many rows a range cursor pulls per page.
    pub fn with_scan_batch(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }
}

/// Run `f` against the connection on the blocking thread pool.
async fn with_conn<F, T>(conn: &Arc<Mutex<Connection>>, f: F) -> Result<T>
where
    F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let conn = Arc::clone(conn);

    // Off the async workers
    tokio::task::spawn_blocking(move || {
        let conn = conn
            .lock()
            .map_err(|e| StoreError::Poisoned(format!("mutex poisoned: {}", e)))?;
        f(&conn)
    })
    .await
    .map_err(|e| StoreError::Task(format!("spawn_blocking failed: {}", e)))?
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        let key = key.to_owned();

        with_conn(&self.conn, move |conn| {
            let value: Option<Vec<u8>> = conn
                .query_row(
                    "SELECT value FROM world_state WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(value.map(Bytes::from))
        })
        .await
    }

    async fn put(&self, key: &str, value: Bytes) -> Result<()> {
        validate_key(key)?;
        let key = key.to_owned();

        with_conn(&self.conn, move |conn| {
            // Empty means absent
            if value.is_empty() {
                conn.execute("DELETE FROM world_state WHERE key = ?1", params![key])?;
            } else {
                // Upsert
                conn.execute(
                    "INSERT INTO world_state (key, value) VALUES (?1, ?2)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                    params![key, value.as_ref()],
                )?;
            }
            tracing::debug!(key = %key, "sqlite store put");
            Ok(())
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        let key = key.to_owned();

        with_conn(&self.conn, move |conn| {
            conn.execute("DELETE FROM world_state WHERE key = ?1", params![key])?;
            tracing::debug!(key = %key, "sqlite store delete");
            Ok(())
        })
        .await
    }

    async fn range_scan(&self, range: KeyRange) -> Result<Box<dyn StateCursor>> {
        tracing::debug!(start = %range.start, end = %range.end, "sqlite range cursor opened");
        let source = SqlitePages {
            conn: Arc::clone(&self.conn),
        };
        Ok(Box::new(PagedCursor::new(source, range, self.page_size)))
    }
}

/// Page source issuing one keyset-paginated query per page.
struct SqlitePages {
    conn: Arc<Mutex<Connection>>,
}

#[async_trait]
impl PageSource for SqlitePages {
    async fn fetch_page(
        &self,
        range: &KeyRange,
        after: Option<&str>,
        limit: usize,
    ) -> Result<Vec<KeyValue>> {
        let start = range.start.clone();
        let end = range.end.clone();
        let after = after.map(str::to_owned);
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        with_conn(&self.conn, move |conn| {
            // Keyset pagination: resume strictly after the last key returned
            let mut stmt = conn.prepare_cached(
                "SELECT key, value FROM world_state
                 WHERE (?1 IS NULL OR key > ?1)
                   AND (?2 = '' OR key >= ?2)
                   AND (?3 = '' OR key < ?3)
                 ORDER BY key
                 LIMIT ?4",
            )?;

            let page = stmt
                .query_map(params![after, start, end, limit], |row| {
                    let key: String = row.get(0)?;
                    let value: Vec<u8> = row.get(1)?;
                    Ok(KeyValue::new(key, value))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(page)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn collect(store: &SqliteStore, range: KeyRange) -> Vec<String> {
        let mut cursor = store.range_scan(range).await.unwrap();
        let mut keys = Vec::new();
        while let Some(entry) = cursor.next_entry().await.unwrap() {
            keys.push(entry.key);
        }
        cursor.close().unwrap();
        keys
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = SqliteStore::open_memory().unwrap();

        assert_eq!(store.get("000001").await.unwrap(), None);

        // Insert
        store.put("000001", Bytes::from_static(b"one")).await.unwrap();
        assert_eq!(
            store.get("000001").await.unwrap(),
            Some(Bytes::from_static(b"one"))
        );

        // Overwrite
        store.put("000001", Bytes::from_static(b"uno")).await.unwrap();
        assert_eq!(
            store.get("000001").await.unwrap(),
            Some(Bytes::from_static(b"uno"))
        );

        store.delete("000001").await.unwrap();
        assert_eq!(store.get("000001").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_empty_value_removes_key() {
        let store = SqliteStore::open_memory().unwrap();
        store.put("A", Bytes::from_static(b"a")).await.unwrap();
        store.put("A", Bytes::new()).await.unwrap();
        assert_eq!(store.get("A").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_empty_key_rejected() {
        let store = SqliteStore::open_memory().unwrap();
        let put = store.put("", Bytes::from_static(b"x")).await;
        assert!(matches!(put, Err(StoreError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_range_scan_paged_and_ordered() {
        let store = SqliteStore::open_memory().unwrap().with_scan_batch(2);
        for key in ["C", "A", "000002", "B", "000001"] {
            store.put(key, Bytes::from(key.to_owned())).await.unwrap();
        }

        assert_eq!(
            collect(&store, KeyRange::full()).await,
            vec!["000001", "000002", "A", "B", "C"]
        );
        assert_eq!(collect(&store, KeyRange::new("A", "C")).await, vec!["A", "B"]);
        assert_eq!(collect(&store, KeyRange::new("", "A")).await, vec!["000001", "000002"]);
    }

    #[tokio::test]
    async fn test_range_scan_values() {
        let store = SqliteStore::open_memory().unwrap();
        store.put("k", Bytes::from_static(b"value")).await.unwrap();

        let mut cursor = store.range_scan(KeyRange::full()).await.unwrap();
        let entry = cursor.next_entry().await.unwrap().unwrap();
        assert_eq!(entry, KeyValue::new("k", Bytes::from_static(b"value")));
        assert!(cursor.next_entry().await.unwrap().is_none());
        cursor.close().unwrap();
    }

    #[tokio::test]
    async fn test_persistence_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world-state.db");

        // Write, then drop the connection
        {
            let store = SqliteStore::open(&path).unwrap();
            store.put("000001", Bytes::from_static(b"persisted")).await.unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(
            store.get("000001").await.unwrap(),
            Some(Bytes::from_static(b"persisted"))
        );
    }
}
