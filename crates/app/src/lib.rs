//! Voyage application composition root
//!
//! Composes the domain routers into a single application.

use std::sync::Arc;

use axum::Router;
use sqlx::PgPool;
use voyage_artworks::ArtworkLookup;
use voyage_common::Config;
use voyage_projects::ProjectsState;

/// Create the main application router with all routes
pub fn create_app(config: &Config, pool: PgPool, lookup: Arc<dyn ArtworkLookup>) -> Router {
    let projects_state = ProjectsState::new(pool, lookup, config.lookup_concurrency);

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .route(
            "/",
            axum::routing::get(|| async { concat!("Voyage API v", env!("CARGO_PKG_VERSION")) }),
        )
        .merge(voyage_projects::routes().with_state(projects_state))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
