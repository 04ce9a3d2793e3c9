//! Project place repository

use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::Place;
use voyage_common::Result;

pub(crate) const PLACE_COLUMNS: &str =
    "id, project_id, external_id, title, artist, notes, visited, created_at, updated_at";

#[derive(Clone)]
pub struct PlaceRepository {
    pool: PgPool,
}

impl PlaceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Places of one project in insertion order
    pub async fn list_by_project(&self, project_id: Uuid) -> Result<Vec<Place>> {
        let query = format!(
            "SELECT {PLACE_COLUMNS} FROM project_places \
             WHERE project_id = $1 ORDER BY created_at ASC, id ASC"
        );
        let rows = sqlx::query_as::<_, Place>(&query)
            .bind(project_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Places of several projects in one round trip
    pub async fn list_for_projects(&self, project_ids: &[Uuid]) -> Result<Vec<Place>> {
        if project_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {PLACE_COLUMNS} FROM project_places \
             WHERE project_id = ANY($1) ORDER BY created_at ASC, id ASC"
        );
        let rows = sqlx::query_as::<_, Place>(&query)
            .bind(project_ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Find a place by its artwork identifier within a project
    pub async fn find_by_external_id(
        &self,
        project_id: Uuid,
        external_id: &str,
    ) -> Result<Option<Place>> {
        let query = format!(
            "SELECT {PLACE_COLUMNS} FROM project_places \
             WHERE project_id = $1 AND external_id = $2"
        );
        let row = sqlx::query_as::<_, Place>(&query)
            .bind(project_id)
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Unlocked place count, only good for an early rejection
    pub async fn count_for_project(&self, project_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM project_places WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Unlocked membership check, only good for an early rejection
    pub async fn exists(&self, project_id: Uuid, external_id: &str) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM project_places WHERE project_id = $1 AND external_id = $2)",
        )
        .bind(project_id)
        .bind(external_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}
