//! Voyage Artwork Lookup Service
//!
//! Resolves external artwork identifiers to display metadata:
//! - Art Institute of Chicago HTTP client for production
//! - Mock lookup for testing and development
//! - TTL cache in front of either implementation

pub mod cache;
pub mod client;
pub mod mock;

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use voyage_common::config::parse_or;

pub use cache::CachedLookup;
pub use client::AicClient;
pub use mock::MockArtworkLookup;

const DEFAULT_BASE_URL: &str = "https://api.artic.edu/api/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_CACHE_TTL_SECS: u64 = 60 * 60 * 6;

/// Why a lookup did not produce a record.
///
/// The two kinds are distinct: `NotFound` invalidates the identifier,
/// `Unavailable` says nothing about it and may succeed later.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("Artwork not found in the artwork catalogue")]
    NotFound,

    #[error("Could not validate artwork, try again later ({0})")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum ArtworkConfigError {
    #[error("Artwork lookup configuration error: {0}")]
    Configuration(String),
}

/// Artwork metadata returned by the lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtworkRecord {
    pub id: i64,
    pub title: String,
    pub artist_display: String,
    pub date_display: Option<String>,
    pub image_id: Option<String>,
}

/// Artwork lookup configuration.
#[derive(Debug, Clone)]
pub struct ArtworkConfig {
    /// Lookup provider (aic, mock)
    pub provider: String,
    /// Base URL of the artwork API
    pub base_url: String,
    /// Upper bound for a single lookup request
    pub timeout: Duration,
    /// How long successful lookups are served from the cache
    pub cache_ttl: Duration,
}

impl Default for ArtworkConfig {
    fn default() -> Self {
        Self {
            provider: "aic".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        }
    }
}

impl ArtworkConfig {
    /// Create artwork lookup config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            provider: std::env::var("ARTWORK_PROVIDER").unwrap_or(defaults.provider),
            base_url: std::env::var("ARTWORK_API_BASE_URL").unwrap_or(defaults.base_url),
            timeout: Duration::from_secs(parse_or("ARTWORK_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)),
            cache_ttl: Duration::from_secs(parse_or(
                "ARTWORK_CACHE_TTL_SECS",
                DEFAULT_CACHE_TTL_SECS,
            )),
        }
    }
}

/// Resolves an external identifier to artwork metadata.
#[async_trait::async_trait]
pub trait ArtworkLookup: Send + Sync {
    async fn lookup(&self, external_id: &str) -> Result<ArtworkRecord, LookupError>;
}

/// Factory for creating ArtworkLookup implementations.
pub struct ArtworkLookupFactory;

impl ArtworkLookupFactory {
    /// Create a cached ArtworkLookup based on configuration.
    pub fn create(config: ArtworkConfig) -> Result<Arc<dyn ArtworkLookup>, ArtworkConfigError> {
        match config.provider.as_str() {
            "aic" => {
                tracing::info!(base_url = %config.base_url, "Creating Art Institute of Chicago lookup");
                let client = AicClient::new(&config)?;
                Ok(Arc::new(CachedLookup::new(client, config.cache_ttl)))
            }
            "mock" => {
                tracing::info!("Creating mock artwork lookup");
                Ok(Arc::new(CachedLookup::new(
                    MockArtworkLookup::new(),
                    config.cache_ttl,
                )))
            }
            provider => Err(ArtworkConfigError::Configuration(format!(
                "Unknown artwork provider: {}. Supported providers: aic, mock",
                provider
            ))),
        }
    }
}
