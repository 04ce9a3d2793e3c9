//! TTL cache in front of an ArtworkLookup
//!
//! Only successful lookups are cached. `NotFound` and `Unavailable` always go
//! back to the wrapped lookup so a transient outage is never remembered.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::{ArtworkLookup, ArtworkRecord, LookupError};

/// Map size at which an insert first drops every expired entry.
pub const DEFAULT_SWEEP_THRESHOLD: usize = 1024;

#[derive(Debug, Clone)]
struct CacheEntry {
    record: ArtworkRecord,
    stored_at: Instant,
}

/// Caching decorator with a fixed time-to-live per entry.
pub struct CachedLookup<L> {
    inner: L,
    ttl: Duration,
    sweep_threshold: usize,
    entries: DashMap<String, CacheEntry>,
}

impl<L: ArtworkLookup> CachedLookup<L> {
    pub fn new(inner: L, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            sweep_threshold: DEFAULT_SWEEP_THRESHOLD,
            entries: DashMap::new(),
        }
    }

    pub fn with_sweep_threshold(mut self, threshold: usize) -> Self {
        self.sweep_threshold = threshold.max(1);
        self
    }

    /// Number of entries currently held, fresh or expired.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fresh cached record, evicting it if it has expired.
    fn fresh(&self, external_id: &str) -> Option<ArtworkRecord> {
        let expired = match self.entries.get(external_id) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                return Some(entry.record.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(external_id);
        }
        None
    }

    fn store(&self, external_id: &str, record: ArtworkRecord) {
        if self.entries.len() >= self.sweep_threshold {
            let ttl = self.ttl;
            let before = self.entries.len();
            self.entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
            tracing::debug!(
                evicted = before.saturating_sub(self.entries.len()),
                remaining = self.entries.len(),
                "Swept expired artwork cache entries"
            );
        }
        self.entries.insert(
            external_id.to_string(),
            CacheEntry {
                record,
                stored_at: Instant::now(),
            },
        );
    }
}

#[async_trait::async_trait]
impl<L: ArtworkLookup> ArtworkLookup for CachedLookup<L> {
    async fn lookup(&self, external_id: &str) -> Result<ArtworkRecord, LookupError> {
        if let Some(record) = self.fresh(external_id) {
            tracing::trace!(external_id = %external_id, "Artwork cache hit");
            return Ok(record);
        }

        let record = self.inner.lookup(external_id).await?;
        self.store(external_id, record.clone());
        Ok(record)
    }
}
