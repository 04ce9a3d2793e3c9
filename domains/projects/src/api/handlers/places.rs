//! Place API handlers
//!
//! Places are addressed by their artwork identifier within a project.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use voyage_common::{Result, ValidatedJson};

use crate::api::middleware::ProjectsState;
use crate::domain::entities::Place;
use crate::service::PlaceChanges;

/// Request for adding a place to a project
#[derive(Debug, Deserialize, Validate)]
pub struct AddPlaceRequest {
    #[validate(length(min = 1, max = 100, message = "external_id must be 1-100 characters"))]
    pub external_id: String,
    pub notes: Option<String>,
}

/// Request for updating a place. Any `external_id` in the body is ignored.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePlaceRequest {
    pub notes: Option<String>,
    pub visited: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct PlaceResponse {
    pub id: Uuid,
    pub external_id: String,
    pub title: String,
    pub artist: String,
    pub notes: String,
    pub visited: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Place> for PlaceResponse {
    fn from(place: Place) -> Self {
        Self {
            id: place.id,
            external_id: place.external_id,
            title: place.title,
            artist: place.artist,
            notes: place.notes,
            visited: place.visited,
            created_at: place.created_at,
            updated_at: place.updated_at,
        }
    }
}

/// List places of a project
///
/// **GET /v1/projects/{id}/places**
pub async fn list_places(
    State(state): State<ProjectsState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<PlaceResponse>>> {
    let places = state.service.list_places(project_id).await?;
    Ok(Json(places.into_iter().map(Into::into).collect()))
}

/// Add a place to a project
///
/// **POST /v1/projects/{id}/places**
///
/// The artwork is resolved before the project is locked. Rejections:
/// - `MAX_REACHED` / `DUPLICATE` / `NOT_FOUND` (400)
/// - `UNAVAILABLE` (503) when the artwork catalogue cannot answer
pub async fn add_place(
    State(state): State<ProjectsState>,
    Path(project_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<AddPlaceRequest>,
) -> Result<(StatusCode, Json<PlaceResponse>)> {
    let place = state
        .service
        .add_place(project_id, request.external_id, request.notes)
        .await?;
    Ok((StatusCode::CREATED, Json(place.into())))
}

/// Get a single place
///
/// **GET /v1/projects/{id}/places/{external_id}**
pub async fn get_place(
    State(state): State<ProjectsState>,
    Path((project_id, external_id)): Path<(Uuid, String)>,
) -> Result<Json<PlaceResponse>> {
    let place = state.service.get_place(project_id, &external_id).await?;
    Ok(Json(place.into()))
}

/// Update notes or visited flag
///
/// **PATCH /v1/projects/{id}/places/{external_id}**
///
/// Project status is reconciled before the response is sent.
pub async fn update_place(
    State(state): State<ProjectsState>,
    Path((project_id, external_id)): Path<(Uuid, String)>,
    ValidatedJson(request): ValidatedJson<UpdatePlaceRequest>,
) -> Result<Json<PlaceResponse>> {
    let changes = PlaceChanges {
        notes: request.notes,
        visited: request.visited,
    };
    let place = state
        .service
        .update_place(project_id, &external_id, changes)
        .await?;
    Ok(Json(place.into()))
}

/// Remove a place
///
/// **DELETE /v1/projects/{id}/places/{external_id}**
///
/// Removing the last place of a project is a 409 `LAST_PLACE`.
pub async fn remove_place(
    State(state): State<ProjectsState>,
    Path((project_id, external_id)): Path<(Uuid, String)>,
) -> Result<StatusCode> {
    state.service.remove_place(project_id, &external_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
