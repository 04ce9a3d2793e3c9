//! Domain entities for Projects domain
//!
//! A `Project` owns between 1 and 10 `Place`s once created. Each place is a
//! snapshot of an artwork resolved through the artwork lookup.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use voyage_artworks::ArtworkRecord;
use voyage_common::{Error, Result};

use crate::domain::state::ProjectState;

/// Maximum project name length
pub const MAX_NAME_LENGTH: usize = 255;

/// Maximum external identifier length
pub const MAX_EXTERNAL_ID_LENGTH: usize = 100;

/// Snapshotted title and artist strings are cut to this many characters
pub const MAX_SNAPSHOT_LENGTH: usize = 500;

/// Project status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "project_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Active,
    Completed,
}

impl ProjectStatus {
    /// Convert to state machine state
    pub fn to_state(&self) -> ProjectState {
        match self {
            ProjectStatus::Active => ProjectState::Active,
            ProjectStatus::Completed => ProjectState::Completed,
        }
    }

    /// Create from state machine state
    pub fn from_state(state: ProjectState) -> Self {
        match state {
            ProjectState::Active => ProjectStatus::Active,
            ProjectState::Completed => ProjectStatus::Completed,
        }
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.to_state().fmt(f)
    }
}

/// Travel project entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Create a new project with validation. New projects start `Active`.
    pub fn new(
        name: String,
        description: Option<String>,
        start_date: Option<NaiveDate>,
    ) -> Result<Self> {
        validate_name(&name)?;

        let now = Utc::now();
        Ok(Project {
            id: Uuid::new_v4(),
            name,
            description,
            start_date,
            status: ProjectStatus::default(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Validate invariants
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)
    }
}

/// Place entity: one artwork inside a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Place {
    pub id: Uuid,
    pub project_id: Uuid,
    pub external_id: String,
    pub title: String,
    pub artist: String,
    pub notes: String,
    pub visited: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Place {
    /// Build a place from a resolved artwork.
    ///
    /// Title and artist are copied from the record once and never refreshed.
    pub fn new(
        project_id: Uuid,
        external_id: String,
        artwork: &ArtworkRecord,
        notes: Option<String>,
    ) -> Result<Self> {
        validate_external_id(&external_id)?;

        let now = Utc::now();
        Ok(Place {
            id: Uuid::new_v4(),
            project_id,
            external_id,
            title: truncate_chars(&artwork.title, MAX_SNAPSHOT_LENGTH),
            artist: truncate_chars(&artwork.artist_display, MAX_SNAPSHOT_LENGTH),
            notes: notes.unwrap_or_default(),
            visited: false,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Project name must be 1-255 characters and not only whitespace
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Validation("Project name cannot be empty".to_string()));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(Error::Validation(format!(
            "Project name must be ≤{} characters",
            MAX_NAME_LENGTH
        )));
    }
    Ok(())
}

/// External identifier must be 1-100 characters and not only whitespace
pub fn validate_external_id(external_id: &str) -> Result<()> {
    if external_id.trim().is_empty() {
        return Err(Error::Validation(
            "Place external_id cannot be empty".to_string(),
        ));
    }
    if external_id.chars().count() > MAX_EXTERNAL_ID_LENGTH {
        return Err(Error::Validation(format!(
            "Place external_id must be ≤{} characters",
            MAX_EXTERNAL_ID_LENGTH
        )));
    }
    Ok(())
}

fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}
