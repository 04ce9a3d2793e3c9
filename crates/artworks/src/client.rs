//! Art Institute of Chicago API client
//!
//! Calls `GET {base_url}/artworks/{id}` with a fixed request timeout.
//! A 404 is reported as `LookupError::NotFound`; timeouts, transport
//! failures and any other non-success status are `LookupError::Unavailable`.

use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use crate::{ArtworkConfig, ArtworkConfigError, ArtworkLookup, ArtworkRecord, LookupError};

/// Only the fields the service snapshots
const ARTWORK_FIELDS: &str = "id,title,artist_display,date_display,image_id";

#[derive(Debug, Deserialize)]
struct ArtworkEnvelope {
    data: ArtworkData,
}

#[derive(Debug, Deserialize)]
struct ArtworkData {
    id: i64,
    title: Option<String>,
    artist_display: Option<String>,
    date_display: Option<String>,
    image_id: Option<String>,
}

impl From<ArtworkData> for ArtworkRecord {
    fn from(data: ArtworkData) -> Self {
        Self {
            id: data.id,
            title: data.title.unwrap_or_default(),
            artist_display: data.artist_display.unwrap_or_default(),
            date_display: data.date_display,
            image_id: data.image_id,
        }
    }
}

/// HTTP client for the Art Institute of Chicago public API
pub struct AicClient {
    http: Client,
    base_url: Url,
}

impl AicClient {
    pub fn new(config: &ArtworkConfig) -> Result<Self, ArtworkConfigError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            ArtworkConfigError::Configuration(format!(
                "Invalid ARTWORK_API_BASE_URL {}: {}",
                config.base_url, e
            ))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ArtworkConfigError::Configuration(format!(
                "ARTWORK_API_BASE_URL cannot be used as a base: {}",
                config.base_url
            )));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ArtworkConfigError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { http, base_url })
    }

    fn artwork_url(&self, external_id: &str) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was rejected in new()
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("artworks").push(external_id);
        }
        url.query_pairs_mut().append_pair("fields", ARTWORK_FIELDS);
        url
    }
}

#[async_trait::async_trait]
impl ArtworkLookup for AicClient {
    async fn lookup(&self, external_id: &str) -> Result<ArtworkRecord, LookupError> {
        let url = self.artwork_url(external_id);

        tracing::debug!(external_id = %external_id, url = %url, "Start artwork request");

        let response = self.http.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                LookupError::Unavailable("Request timed out".to_string())
            } else {
                LookupError::Unavailable(format!("Could not reach API: {}", e))
            }
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(external_id = %external_id, "Artwork not found");
            return Err(LookupError::NotFound);
        }
        if !status.is_success() {
            tracing::warn!(external_id = %external_id, status = %status, "Artwork API error");
            return Err(LookupError::Unavailable(format!(
                "API returned {}",
                status.as_u16()
            )));
        }

        let envelope: ArtworkEnvelope = response.json().await.map_err(|e| {
            if e.is_timeout() {
                LookupError::Unavailable("Request timed out".to_string())
            } else {
                LookupError::Unavailable(format!("Failed to parse response: {}", e))
            }
        })?;

        Ok(envelope.data.into())
    }
}
