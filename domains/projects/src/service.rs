//! Project service: every operation that reads or mutates travel projects
//!
//! Collection mutations follow one protocol:
//! 1. cheap pre-checks without a lock (fail fast, no lookup cost)
//! 2. artwork lookup, never while holding a lock
//! 3. transaction: lock the project row, re-check invariants, mutate
//! 4. status reconciliation inside the same transaction, then commit

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use voyage_artworks::ArtworkLookup;
use voyage_common::{Error, Pagination, RepositoryError, Result};

use crate::domain::entities::{validate_external_id, Place, Project, ProjectStatus};
use crate::domain::guard::{PlaceCollectionGuard, Rejection};
use crate::domain::state::ProjectStatusSync;
use crate::domain::validation::{
    batch_error, check_drafts, validate_artworks_batch, PlaceDraft, DEFAULT_LOOKUP_CONCURRENCY,
};
use crate::repository::{
    count_places_tx, create_place_tx, create_project_tx, delete_place_tx, delete_project_tx,
    find_place_tx, has_visited_places_tx, lock_project_tx, place_exists_tx, update_place_tx,
    update_project_status_tx, update_project_tx, visited_flags_tx, ProjectFilter,
    ProjectsRepositories,
};

/// Input for CreateProject
#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub places: Vec<PlaceDraft>,
}

/// Partial update of a project. Status is derived and never set here.
///
/// The nullable fields are `None` when untouched and `Some(None)` to clear.
#[derive(Debug, Clone, Default)]
pub struct ProjectChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub start_date: Option<Option<NaiveDate>>,
}

/// Partial update of a place. The external id is immutable.
#[derive(Debug, Clone, Default)]
pub struct PlaceChanges {
    pub notes: Option<String>,
    pub visited: Option<bool>,
}

/// A project together with its places
#[derive(Debug, Clone)]
pub struct ProjectWithPlaces {
    pub project: Project,
    pub places: Vec<Place>,
}

/// Result of a status reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    pub status: ProjectStatus,
    pub changed: bool,
}

#[derive(Clone)]
pub struct ProjectService {
    repos: ProjectsRepositories,
    lookup: Arc<dyn ArtworkLookup>,
    lookup_concurrency: usize,
}

fn project_not_found(project_id: Uuid) -> Error {
    Error::NotFound(format!("Project {} not found", project_id))
}

fn place_not_found(external_id: &str) -> Error {
    Error::NotFound(format!("Place {} not found in this project", external_id))
}

impl ProjectService {
    pub fn new(repos: ProjectsRepositories, lookup: Arc<dyn ArtworkLookup>) -> Self {
        Self {
            repos,
            lookup,
            lookup_concurrency: DEFAULT_LOOKUP_CONCURRENCY,
        }
    }

    /// Bound on simultaneous lookups during project creation
    pub fn with_lookup_concurrency(mut self, concurrency: usize) -> Self {
        self.lookup_concurrency = concurrency.max(1);
        self
    }

    pub fn repos(&self) -> &ProjectsRepositories {
        &self.repos
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    pub async fn get_project(&self, project_id: Uuid) -> Result<ProjectWithPlaces> {
        let project = self
            .repos
            .projects
            .find(project_id)
            .await?
            .ok_or_else(|| project_not_found(project_id))?;
        let places = self.repos.places.list_by_project(project_id).await?;
        Ok(ProjectWithPlaces { project, places })
    }

    pub async fn list_projects(
        &self,
        filter: &ProjectFilter,
        pagination: Pagination,
    ) -> Result<Vec<ProjectWithPlaces>> {
        let projects = self
            .repos
            .projects
            .list(filter, pagination.limit(), pagination.offset())
            .await?;

        let ids: Vec<Uuid> = projects.iter().map(|p| p.id).collect();
        let mut by_project: HashMap<Uuid, Vec<Place>> = HashMap::new();
        for place in self.repos.places.list_for_projects(&ids).await? {
            by_project.entry(place.project_id).or_default().push(place);
        }

        Ok(projects
            .into_iter()
            .map(|project| {
                let places = by_project.remove(&project.id).unwrap_or_default();
                ProjectWithPlaces { project, places }
            })
            .collect())
    }

    pub async fn list_places(&self, project_id: Uuid) -> Result<Vec<Place>> {
        if self.repos.projects.find(project_id).await?.is_none() {
            return Err(project_not_found(project_id));
        }
        self.repos.places.list_by_project(project_id).await
    }

    pub async fn get_place(&self, project_id: Uuid, external_id: &str) -> Result<Place> {
        self.repos
            .places
            .find_by_external_id(project_id, external_id)
            .await?
            .ok_or_else(|| place_not_found(external_id))
    }

    // ------------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------------

    /// Create a project with its initial places, all or nothing.
    pub async fn create_project(&self, input: NewProject) -> Result<ProjectWithPlaces> {
        let project = Project::new(input.name, input.description, input.start_date)?;
        check_drafts(&input.places)?;

        let external_ids: Vec<String> = input
            .places
            .iter()
            .map(|draft| draft.external_id.clone())
            .collect();
        let artworks = validate_artworks_batch(
            Arc::clone(&self.lookup),
            &external_ids,
            self.lookup_concurrency,
        )
        .await
        .map_err(|failures| {
            tracing::info!(
                project_name = %project.name,
                rejected = failures.len(),
                "Project creation rejected by artwork validation"
            );
            batch_error(failures)
        })?;

        let mut tx = self.repos.begin().await?;
        let project = create_project_tx(&mut tx, &project).await?;

        let mut places = Vec::with_capacity(input.places.len());
        for draft in input.places {
            let artwork = artworks.get(&draft.external_id).ok_or_else(|| {
                Error::Internal(format!("No artwork resolved for {}", draft.external_id))
            })?;
            let place = Place::new(project.id, draft.external_id, artwork, draft.notes)?;
            places.push(insert_place(&mut tx, &place).await?);
        }

        let outcome = sync_in_tx(&mut tx, &project).await?;
        tx.commit().await?;

        tracing::info!(
            project_id = %project.id,
            places = places.len(),
            "Project created"
        );

        Ok(ProjectWithPlaces {
            project: Project {
                status: outcome.status,
                ..project
            },
            places,
        })
    }

    /// Add one place to an existing project.
    pub async fn add_place(
        &self,
        project_id: Uuid,
        external_id: String,
        notes: Option<String>,
    ) -> Result<Place> {
        validate_external_id(&external_id)?;

        // Unlocked pre-check so obviously doomed requests skip the lookup
        if self.repos.projects.find(project_id).await?.is_none() {
            return Err(project_not_found(project_id));
        }
        let count = self.repos.places.count_for_project(project_id).await?;
        let present = self.repos.places.exists(project_id, &external_id).await?;
        PlaceCollectionGuard::can_add(count, present, &external_id)?;

        let artwork = self.lookup.lookup(&external_id).await.map_err(|e| {
            tracing::info!(
                project_id = %project_id,
                external_id = %external_id,
                error = %e,
                "Artwork lookup rejected place"
            );
            Rejection::from_lookup(&external_id, e)
        })?;

        let mut tx = self.repos.begin().await?;
        let project = lock_project_tx(&mut tx, project_id)
            .await?
            .ok_or_else(|| project_not_found(project_id))?;

        // The pre-check may be stale by now
        let count = count_places_tx(&mut tx, project_id).await?;
        let present = place_exists_tx(&mut tx, project_id, &external_id).await?;
        PlaceCollectionGuard::can_add(count, present, &external_id)?;

        let place = Place::new(project_id, external_id, &artwork, notes)?;
        let place = insert_place(&mut tx, &place).await?;

        sync_in_tx(&mut tx, &project).await?;
        tx.commit().await?;

        tracing::info!(
            project_id = %project_id,
            external_id = %place.external_id,
            places = count + 1,
            "Place added"
        );
        Ok(place)
    }

    /// Remove one place, refusing to empty the project.
    pub async fn remove_place(&self, project_id: Uuid, external_id: &str) -> Result<()> {
        let mut tx = self.repos.begin().await?;
        let project = lock_project_tx(&mut tx, project_id)
            .await?
            .ok_or_else(|| project_not_found(project_id))?;

        if find_place_tx(&mut tx, project_id, external_id).await?.is_none() {
            return Err(place_not_found(external_id));
        }

        let count = count_places_tx(&mut tx, project_id).await?;
        PlaceCollectionGuard::can_remove(count)?;

        delete_place_tx(&mut tx, project_id, external_id).await?;
        sync_in_tx(&mut tx, &project).await?;
        tx.commit().await?;

        tracing::info!(
            project_id = %project_id,
            external_id = %external_id,
            places = count - 1,
            "Place removed"
        );
        Ok(())
    }

    /// Update notes or visited flag of a place, then reconcile status.
    pub async fn update_place(
        &self,
        project_id: Uuid,
        external_id: &str,
        changes: PlaceChanges,
    ) -> Result<Place> {
        let mut tx = self.repos.begin().await?;
        let project = lock_project_tx(&mut tx, project_id)
            .await?
            .ok_or_else(|| project_not_found(project_id))?;

        let mut place = find_place_tx(&mut tx, project_id, external_id)
            .await?
            .ok_or_else(|| place_not_found(external_id))?;

        if let Some(notes) = changes.notes {
            place.notes = notes;
        }
        if let Some(visited) = changes.visited {
            place.visited = visited;
        }

        let place = update_place_tx(&mut tx, &place).await?;
        let outcome = sync_in_tx(&mut tx, &project).await?;
        tx.commit().await?;

        tracing::debug!(
            project_id = %project_id,
            external_id = %external_id,
            visited = place.visited,
            status = %outcome.status,
            "Place updated"
        );
        Ok(place)
    }

    /// Update the editable fields of a project.
    pub async fn update_project(&self, project_id: Uuid, changes: ProjectChanges) -> Result<Project> {
        let mut tx = self.repos.begin().await?;
        let mut project = lock_project_tx(&mut tx, project_id)
            .await?
            .ok_or_else(|| project_not_found(project_id))?;

        if let Some(name) = changes.name {
            project.name = name;
        }
        if let Some(description) = changes.description {
            project.description = description;
        }
        if let Some(start_date) = changes.start_date {
            project.start_date = start_date;
        }
        project.validate()?;

        let project = update_project_tx(&mut tx, &project).await?;
        tx.commit().await?;

        tracing::debug!(project_id = %project_id, "Project updated");
        Ok(project)
    }

    /// Delete a project and its places unless any place was visited.
    pub async fn delete_project(&self, project_id: Uuid) -> Result<()> {
        let mut tx = self.repos.begin().await?;
        lock_project_tx(&mut tx, project_id)
            .await?
            .ok_or_else(|| project_not_found(project_id))?;

        let visited = has_visited_places_tx(&mut tx, project_id).await?;
        PlaceCollectionGuard::can_delete_project(visited)?;

        delete_project_tx(&mut tx, project_id).await?;
        tx.commit().await?;

        tracing::info!(project_id = %project_id, "Project deleted");
        Ok(())
    }

    /// Reconcile the stored status with the place collection.
    pub async fn sync_status(&self, project_id: Uuid) -> Result<SyncOutcome> {
        let mut tx = self.repos.begin().await?;
        let project = lock_project_tx(&mut tx, project_id)
            .await?
            .ok_or_else(|| project_not_found(project_id))?;

        let outcome = sync_in_tx(&mut tx, &project).await?;
        tx.commit().await?;
        Ok(outcome)
    }
}

/// Insert a place, reporting a unique violation as a duplicate.
async fn insert_place(tx: &mut Transaction<'_, Postgres>, place: &Place) -> Result<Place> {
    create_place_tx(tx, place).await.map_err(|e| match e {
        RepositoryError::AlreadyExists => Rejection::Duplicate {
            external_id: place.external_id.clone(),
        }
        .into(),
        other => other.into(),
    })
}

/// Write the derived status if it differs from `project.status`.
///
/// Must run inside the transaction holding the project lock.
#[mutants::skip] // Exercised only by the database-backed integration tests
async fn sync_in_tx(tx: &mut Transaction<'_, Postgres>, project: &Project) -> Result<SyncOutcome> {
    let flags = visited_flags_tx(tx, project.id).await?;
    let current = project.status.to_state();

    match ProjectStatusSync::reconcile(current, flags)? {
        Some(next) => {
            let status = ProjectStatus::from_state(next);
            update_project_status_tx(tx, project.id, status).await?;
            tracing::info!(
                project_id = %project.id,
                from = %project.status,
                to = %status,
                "Project status synchronized"
            );
            Ok(SyncOutcome {
                status,
                changed: true,
            })
        }
        None => Ok(SyncOutcome {
            status: project.status,
            changed: false,
        }),
    }
}
