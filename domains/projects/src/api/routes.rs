//! Route definitions for Projects domain API

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{places, projects};
use super::middleware::ProjectsState;

/// Create project routes
fn project_routes() -> Router<ProjectsState> {
    Router::new()
        .route(
            "/v1/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/v1/projects/{id}",
            get(projects::get_project)
                .patch(projects::update_project)
                .delete(projects::delete_project),
        )
        .route("/v1/projects/{id}/sync", post(projects::sync_status))
}

/// Create place routes
fn place_routes() -> Router<ProjectsState> {
    Router::new()
        .route(
            "/v1/projects/{id}/places",
            get(places::list_places).post(places::add_place),
        )
        .route(
            "/v1/projects/{id}/places/{external_id}",
            get(places::get_place)
                .patch(places::update_place)
                .delete(places::remove_place),
        )
}

/// Create all Projects domain API routes
pub fn routes() -> Router<ProjectsState> {
    Router::new().merge(project_routes()).merge(place_routes())
}
