//! Validation of the initial place set on project creation
//!
//! Shape checks (count, blank or duplicate ids) run first and never touch the
//! artwork lookup. Lookups then fan out with bounded concurrency and every
//! outcome is collected before deciding, so the caller sees all failing ids
//! at once.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use voyage_artworks::{ArtworkLookup, ArtworkRecord, LookupError};
use voyage_common::{Error, FieldError, Result};

use crate::domain::entities::MAX_EXTERNAL_ID_LENGTH;
use crate::domain::guard::{Rejection, MAX_PLACES};

/// Default number of simultaneous artwork lookups
pub const DEFAULT_LOOKUP_CONCURRENCY: usize = 5;

/// A place requested at project creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceDraft {
    pub external_id: String,
    pub notes: Option<String>,
}

impl PlaceDraft {
    pub fn new(external_id: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            notes: None,
        }
    }
}

/// Reject malformed place sets before any lookup is attempted.
pub fn check_drafts(drafts: &[PlaceDraft]) -> Result<()> {
    let count = drafts.len() as i64;
    if count < 1 || count > MAX_PLACES {
        return Err(Error::Validation(format!(
            "A project must be created with between 1 and {} places, got {}",
            MAX_PLACES, count
        )));
    }

    let mut errors = BTreeMap::new();
    let mut seen = HashSet::with_capacity(drafts.len());

    for (index, draft) in drafts.iter().enumerate() {
        let external_id = draft.external_id.as_str();
        if external_id.trim().is_empty() {
            errors.insert(
                format!("places[{}]", index),
                FieldError::new("REQUIRED", "Each place must include 'external_id'"),
            );
            continue;
        }
        if external_id.chars().count() > MAX_EXTERNAL_ID_LENGTH {
            errors.insert(
                external_id.to_string(),
                FieldError::new(
                    "TOO_LONG",
                    format!("external_id must be ≤{} characters", MAX_EXTERNAL_ID_LENGTH),
                ),
            );
            continue;
        }
        if !seen.insert(external_id) {
            errors.insert(
                external_id.to_string(),
                FieldError::new("DUPLICATE", "Duplicate external_id in request"),
            );
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::InvalidFields {
            field: "places".to_string(),
            errors,
        })
    }
}

/// Resolve every id, at most `concurrency` at a time.
///
/// Returns all records when every lookup succeeds, otherwise the rejection
/// for each failing id.
pub async fn validate_artworks_batch(
    lookup: Arc<dyn ArtworkLookup>,
    external_ids: &[String],
    concurrency: usize,
) -> std::result::Result<HashMap<String, ArtworkRecord>, BTreeMap<String, Rejection>> {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for external_id in external_ids {
        let external_id = external_id.clone();
        let lookup = Arc::clone(&lookup);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let outcome = match semaphore.acquire_owned().await {
                Ok(_permit) => lookup.lookup(&external_id).await,
                Err(e) => Err(LookupError::Unavailable(format!(
                    "Lookup limiter closed: {}",
                    e
                ))),
            };
            (external_id, outcome)
        });
    }

    let mut records = HashMap::with_capacity(external_ids.len());
    let mut failures = BTreeMap::new();

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((external_id, Ok(record))) => {
                records.insert(external_id, record);
            }
            Ok((external_id, Err(err))) => {
                tracing::debug!(external_id = %external_id, error = %err, "Artwork rejected");
                let rejection = Rejection::from_lookup(&external_id, err);
                failures.insert(external_id, rejection);
            }
            Err(e) => {
                tracing::error!(error = %e, "Artwork lookup task failed");
            }
        }
    }

    // A panicked task leaves its id without an outcome
    for external_id in external_ids {
        if !records.contains_key(external_id) && !failures.contains_key(external_id) {
            failures.insert(
                external_id.clone(),
                Rejection::Unavailable {
                    external_id: external_id.clone(),
                    detail: "Lookup did not complete".to_string(),
                },
            );
        }
    }

    if failures.is_empty() {
        Ok(records)
    } else {
        Err(failures)
    }
}

/// Report batch failures as a single client error with per-id details.
pub fn batch_error(failures: BTreeMap<String, Rejection>) -> Error {
    Error::InvalidFields {
        field: "places".to_string(),
        errors: failures
            .into_iter()
            .map(|(external_id, rejection)| (external_id, rejection.field_error()))
            .collect(),
    }
}
