//! Lazy enumeration of every credit in world state.
//!
//! A [`CreditScan`] owns a store cursor for its whole life and releases it on
//! every exit path: explicit [`CreditScan::close`], exhaustion followed by
//! drop, an early `?` return, a panic unwinding through the caller, or the
//! enclosing future being dropped mid-scan. Scans are not resumable; open a
//! new one to start again from the first key.

use response_credit_core::{decode_credit, Credit, CreditId};
use response_credit_store::StateCursor;

use crate::error::{RegistryError, Result};

/// A scoped, lazily decoding cursor over stored credits.
pub struct CreditScan {
    cursor: Box<dyn StateCursor>,
}

impl CreditScan {
    pub(crate) fn new(cursor: Box<dyn StateCursor>) -> Self {
        Self { cursor }
    }

    /// Decode the next stored credit, or `None` once the range is exhausted.
    pub async fn next_credit(&mut self) -> Result<Option<Credit>> {
        let Some(entry) = self.cursor.next_entry().await? else {
            return Ok(None);
        };

        decode_credit(&entry.value).map(Some).map_err(|source| {
            tracing::warn!(key = %entry.key, error = %source, "stored credit failed to decode");
            RegistryError::Decoding {
                id: CreditId::from(entry.key),
                source,
            }
        })
    }

    /// Drain the remaining credits, stopping at the first failure.
    pub async fn collect_remaining(&mut self) -> Result<Vec<Credit>> {
        let mut credits = Vec::new();
        while let Some(credit) = self.next_credit().await? {
            credits.push(credit);
        }
        Ok(credits)
    }

    /// Release the cursor, surfacing any error the store reports.
    pub fn close(mut self) -> Result<()> {
        self.cursor.close()?;
        Ok(())
    }
}

impl Drop for CreditScan {
    fn drop(&mut self) {
        if self.cursor.is_closed() {
            return;
        }
        if let Err(e) = self.cursor.close() {
            tracing::warn!(error = %e, "failed to close credit scan cursor");
        }
    }
}
