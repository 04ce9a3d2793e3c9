//! Projects domain state

use std::sync::Arc;

use sqlx::PgPool;
use voyage_artworks::ArtworkLookup;

use crate::repository::ProjectsRepositories;
use crate::service::ProjectService;

/// Application state for the Projects domain
#[derive(Clone)]
pub struct ProjectsState {
    pub service: ProjectService,
}

impl ProjectsState {
    pub fn new(pool: PgPool, lookup: Arc<dyn ArtworkLookup>, lookup_concurrency: usize) -> Self {
        let service = ProjectService::new(ProjectsRepositories::new(pool), lookup)
            .with_lookup_concurrency(lookup_concurrency);
        Self { service }
    }
}
