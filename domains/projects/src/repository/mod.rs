//! Repository implementations for Projects domain

pub mod places;
pub mod projects;
pub mod transactions;

use sqlx::{PgPool, Postgres, Transaction};

pub use places::PlaceRepository;
pub use projects::{OrderField, ProjectFilter, ProjectOrdering, ProjectRepository};
pub use transactions::{
    count_places_tx, create_place_tx, create_project_tx, delete_place_tx, delete_project_tx,
    find_place_tx, has_visited_places_tx, lock_project_tx, place_exists_tx, update_place_tx,
    update_project_status_tx, update_project_tx, visited_flags_tx,
};

/// Combined repository access for the Projects domain
#[derive(Clone)]
pub struct ProjectsRepositories {
    pool: PgPool,
    pub projects: ProjectRepository,
    pub places: PlaceRepository,
}

impl ProjectsRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            projects: ProjectRepository::new(pool.clone()),
            places: PlaceRepository::new(pool.clone()),
            pool,
        }
    }

    /// Begin a new database transaction.
    pub async fn begin(&self) -> std::result::Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }

    /// Get a reference to the underlying database pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
