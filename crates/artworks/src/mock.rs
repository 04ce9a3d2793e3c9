//! Mock Artwork Lookup Implementation
//!
//! Resolves every identifier to `Artwork {id}` / `Artist {id}` unless told
//! otherwise. Records calls and the peak number of concurrent lookups so
//! tests can assert on fan-out behaviour. Thread-safe via `Arc<>`.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::{ArtworkLookup, ArtworkRecord, LookupError};

/// Programmable artwork lookup for tests and local development.
#[derive(Debug, Clone, Default)]
pub struct MockArtworkLookup {
    missing: Arc<HashSet<String>>,
    unavailable: Arc<HashSet<String>>,
    delay: Option<Duration>,
    calls: Arc<Mutex<Vec<String>>>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

impl MockArtworkLookup {
    /// Create a mock that resolves every identifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifiers that resolve to `LookupError::NotFound`.
    pub fn with_missing<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.missing = Arc::new(ids.into_iter().map(Into::into).collect());
        self
    }

    /// Identifiers that resolve to `LookupError::Unavailable`.
    pub fn with_unavailable<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unavailable = Arc::new(ids.into_iter().map(Into::into).collect());
        self
    }

    /// Simulated latency applied to every lookup.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Identifiers looked up so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .expect("calls lock poisoned: prior test panicked")
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }

    /// Highest number of lookups observed running at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn record_for(external_id: &str) -> ArtworkRecord {
        ArtworkRecord {
            id: external_id.parse().unwrap_or_default(),
            title: format!("Artwork {}", external_id),
            artist_display: format!("Artist {}", external_id),
            date_display: Some("2000".to_string()),
            image_id: None,
        }
    }
}

#[async_trait::async_trait]
impl ArtworkLookup for MockArtworkLookup {
    async fn lookup(&self, external_id: &str) -> Result<ArtworkRecord, LookupError> {
        tracing::debug!(external_id = %external_id, "Mock artwork lookup");

        self.calls
            .lock()
            .map_err(|e| LookupError::Unavailable(format!("calls lock poisoned: {e}")))?
            .push(external_id.to_string());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.missing.contains(external_id) {
            return Err(LookupError::NotFound);
        }
        if self.unavailable.contains(external_id) {
            return Err(LookupError::Unavailable("Request timed out".to_string()));
        }
        Ok(Self::record_for(external_id))
    }
}
