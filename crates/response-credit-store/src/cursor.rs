//! Paged range cursor shared by the bundled stores.
//!
//! A [`PagedCursor`] never materializes the whole range. It asks its
//! [`PageSource`] for at most `page_size` entries strictly after the last key
//! it handed out, so a scan holds no lock or statement between pages.

use std::collections::VecDeque;

use async_trait::async_trait;

use crate::error::{Result, StoreError};
use crate::traits::{KeyRange, KeyValue, StateCursor};

/// Entries fetched per page unless a store overrides it.
pub const DEFAULT_PAGE_SIZE: usize = 64;

/// Backend hook used by [`PagedCursor`] to pull the next page.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Return up to `limit` entries in `range` with key strictly greater than
    /// `after` (or from the start of the range when `after` is `None`),
    /// ascending by key.
    async fn fetch_page(
        &self,
        range: &KeyRange,
        after: Option<&str>,
        limit: usize,
    ) -> Result<Vec<KeyValue>>;
}

/// A lazy [`StateCursor`] that reads its range one page at a time.
pub struct PagedCursor<P: PageSource> {
    source: P,
    range: KeyRange,
    after: Option<String>,
    buffer: VecDeque<KeyValue>,
    page_size: usize,
    exhausted: bool,
    closed: bool,
}

impl<P: PageSource> PagedCursor<P> {
    pub fn new(source: P, range: KeyRange, page_size: usize) -> Self {
        Self {
            source,
            range,
            after: None,
            buffer: VecDeque::new(),
            page_size: page_size.max(1),
            exhausted: false,
            closed: false,
        }
    }

    async fn fill(&mut self) -> Result<()> {
        let page = self
            .source
            .fetch_page(&self.range, self.after.as_deref(), self.page_size)
            .await?;

        if page.len() < self.page_size {
            self.exhausted = true;
        }
        if let Some(last) = page.last() {
            self.after = Some(last.key.clone());
        }
        self.buffer.extend(page);
        Ok(())
    }
}

#[async_trait]
impl<P: PageSource> StateCursor for PagedCursor<P> {
    async fn next_entry(&mut self) -> Result<Option<KeyValue>> {
        if self.closed {
            return Err(StoreError::CursorClosed);
        }
        if self.buffer.is_empty() && !self.exhausted {
            self.fill().await?;
        }
        Ok(self.buffer.pop_front())
    }

    fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            self.buffer.clear();
            tracing::debug!(start = %self.range.start, end = %self.range.end, "range cursor closed");
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}
