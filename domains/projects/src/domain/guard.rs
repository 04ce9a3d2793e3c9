//! Place collection invariants
//!
//! A project holds between `MIN_PLACES` and `MAX_PLACES` places once created,
//! and each external identifier appears at most once. The checks here are
//! pure; the service runs them twice per mutation, once before taking the
//! project row lock and again with the lock held, because the first read
//! may be stale by the time the lock is granted.

use voyage_artworks::LookupError;
use voyage_common::{Error, ErrorClass, FieldError};

/// Upper bound on places per project
pub const MAX_PLACES: i64 = 10;

/// Lower bound on places per project once it has any
pub const MIN_PLACES: i64 = 1;

/// Why a collection mutation was refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("Place {external_id} already exists in this project")]
    Duplicate { external_id: String },

    #[error("Project already has the maximum of {max} places")]
    MaxReached { max: i64 },

    #[error("Artwork {external_id} not found in the artwork catalogue")]
    NotFound { external_id: String },

    #[error("Could not validate artwork {external_id}, try again later")]
    Unavailable { external_id: String, detail: String },

    #[error("Cannot remove the last place from a project")]
    LastPlace,

    #[error("Cannot delete project with visited places")]
    HasVisitedPlaces,
}

impl Rejection {
    /// Machine-readable reason code
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::Duplicate { .. } => "DUPLICATE",
            Rejection::MaxReached { .. } => "MAX_REACHED",
            Rejection::NotFound { .. } => "NOT_FOUND",
            Rejection::Unavailable { .. } => "UNAVAILABLE",
            Rejection::LastPlace => "LAST_PLACE",
            Rejection::HasVisitedPlaces => "HAS_VISITED_PLACES",
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Rejection::Duplicate { .. }
            | Rejection::MaxReached { .. }
            | Rejection::NotFound { .. } => ErrorClass::ClientInput,
            Rejection::Unavailable { .. } => ErrorClass::Upstream,
            Rejection::LastPlace | Rejection::HasVisitedPlaces => ErrorClass::StateConflict,
        }
    }

    /// Attach the identifier a lookup failed for.
    pub fn from_lookup(external_id: &str, err: LookupError) -> Self {
        match err {
            LookupError::NotFound => Rejection::NotFound {
                external_id: external_id.to_string(),
            },
            LookupError::Unavailable(detail) => Rejection::Unavailable {
                external_id: external_id.to_string(),
                detail,
            },
        }
    }

    /// Per-item entry for batch error details
    pub fn field_error(&self) -> FieldError {
        FieldError::new(self.reason(), self.to_string())
    }
}

impl From<Rejection> for Error {
    fn from(rejection: Rejection) -> Self {
        Error::Rejected {
            class: rejection.class(),
            reason: rejection.reason(),
            message: rejection.to_string(),
        }
    }
}

/// Cardinality and uniqueness checks over a project's place collection.
pub struct PlaceCollectionGuard;

impl PlaceCollectionGuard {
    /// Whether a place with `external_id` may join a collection of `count`.
    pub fn can_add(count: i64, already_present: bool, external_id: &str) -> Result<(), Rejection> {
        if count >= MAX_PLACES {
            return Err(Rejection::MaxReached { max: MAX_PLACES });
        }
        if already_present {
            return Err(Rejection::Duplicate {
                external_id: external_id.to_string(),
            });
        }
        Ok(())
    }

    /// Whether a place may leave a collection of `count`.
    pub fn can_remove(count: i64) -> Result<(), Rejection> {
        if count <= MIN_PLACES {
            return Err(Rejection::LastPlace);
        }
        Ok(())
    }

    /// Projects whose places have been visited are kept as a travel record.
    pub fn can_delete_project(has_visited_places: bool) -> Result<(), Rejection> {
        if has_visited_places {
            return Err(Rejection::HasVisitedPlaces);
        }
        Ok(())
    }
}
