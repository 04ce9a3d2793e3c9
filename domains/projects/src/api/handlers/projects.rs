//! Travel project API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use voyage_common::{Error, Pagination, Result, ValidatedJson};

use super::places::PlaceResponse;
use crate::api::middleware::ProjectsState;
use crate::domain::entities::ProjectStatus;
use crate::domain::validation::PlaceDraft;
use crate::repository::{ProjectFilter, ProjectOrdering};
use crate::service::{NewProject, ProjectChanges, ProjectWithPlaces, SyncOutcome};

/// Query parameters for listing projects
#[derive(Debug, Default, Deserialize)]
pub struct ListProjectsParams {
    pub status: Option<ProjectStatus>,
    pub name: Option<String>,
    pub start_date_from: Option<NaiveDate>,
    pub start_date_to: Option<NaiveDate>,
    pub search: Option<String>,
    pub ordering: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ListProjectsParams {
    /// Split into a storage filter and pagination
    pub fn into_filter(self) -> Result<(ProjectFilter, Pagination)> {
        let ordering = match non_blank(self.ordering) {
            Some(raw) => raw.parse::<ProjectOrdering>()?,
            None => ProjectOrdering::default(),
        };
        if let (Some(from), Some(to)) = (self.start_date_from, self.start_date_to) {
            if from > to {
                return Err(Error::Validation(
                    "start_date_from must not be after start_date_to".to_string(),
                ));
            }
        }

        let filter = ProjectFilter {
            status: self.status,
            name: non_blank(self.name),
            start_date_from: self.start_date_from,
            start_date_to: self.start_date_to,
            search: non_blank(self.search),
            ordering,
        };
        let pagination = Pagination {
            offset: self.offset,
            limit: self.limit,
        };
        Ok((filter, pagination))
    }
}

/// A place requested at creation time
#[derive(Debug, Serialize, Deserialize)]
pub struct PlaceInput {
    pub external_id: String,
    pub notes: Option<String>,
}

/// Request for creating a project with its initial places
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    pub description: Option<String>,

    pub start_date: Option<NaiveDate>,

    #[validate(length(min = 1, max = 10, message = "A project needs between 1 and 10 places"))]
    pub places: Vec<PlaceInput>,
}

/// Request for updating a project. `status` is derived and cannot be set.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    /// `null` clears the description; an absent key leaves it unchanged
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub description: Option<Option<String>>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub start_date: Option<Option<NaiveDate>>,
}

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub status: ProjectStatus,
    pub places: Vec<PlaceResponse>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<ProjectWithPlaces> for ProjectResponse {
    fn from(value: ProjectWithPlaces) -> Self {
        let ProjectWithPlaces { project, places } = value;
        Self {
            id: project.id,
            name: project.name,
            description: project.description,
            start_date: project.start_date,
            status: project.status,
            places: places.into_iter().map(Into::into).collect(),
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

/// List projects
///
/// **GET /v1/projects**
///
/// Filters: `status`, `name`, `start_date_from`, `start_date_to`, `search`.
/// Ordering: `name`, `created_at`, `start_date`, prefix `-` for descending.
pub async fn list_projects(
    State(state): State<ProjectsState>,
    Query(params): Query<ListProjectsParams>,
) -> Result<Json<Vec<ProjectResponse>>> {
    let (filter, pagination) = params.into_filter()?;
    let projects = state.service.list_projects(&filter, pagination).await?;
    Ok(Json(projects.into_iter().map(Into::into).collect()))
}

/// Create a project
///
/// **POST /v1/projects**
///
/// Every artwork is validated before anything is stored. On failure the
/// response lists each rejected `external_id` under `details.places`.
pub async fn create_project(
    State(state): State<ProjectsState>,
    ValidatedJson(request): ValidatedJson<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectResponse>)> {
    let input = NewProject {
        name: request.name,
        description: request.description,
        start_date: request.start_date,
        places: request
            .places
            .into_iter()
            .map(|p| PlaceDraft {
                external_id: p.external_id,
                notes: p.notes,
            })
            .collect(),
    };

    let created = state.service.create_project(input).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Get a project with its places
///
/// **GET /v1/projects/{id}**
pub async fn get_project(
    State(state): State<ProjectsState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<ProjectResponse>> {
    let project = state.service.get_project(project_id).await?;
    Ok(Json(project.into()))
}

/// Update project details
///
/// **PATCH /v1/projects/{id}**
pub async fn update_project(
    State(state): State<ProjectsState>,
    Path(project_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateProjectRequest>,
) -> Result<Json<ProjectResponse>> {
    let changes = ProjectChanges {
        name: request.name,
        description: request.description,
        start_date: request.start_date,
    };
    state.service.update_project(project_id, changes).await?;

    let project = state.service.get_project(project_id).await?;
    Ok(Json(project.into()))
}

/// Delete a project
///
/// **DELETE /v1/projects/{id}**
///
/// Projects with visited places are kept (409 `HAS_VISITED_PLACES`).
pub async fn delete_project(
    State(state): State<ProjectsState>,
    Path(project_id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service.delete_project(project_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Reconcile project status with its places
///
/// **POST /v1/projects/{id}/sync**
pub async fn sync_status(
    State(state): State<ProjectsState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<SyncOutcome>> {
    let outcome = state.service.sync_status(project_id).await?;
    Ok(Json(outcome))
}
