//! Transaction helpers for Projects domain
//!
//! Every collection mutation starts with `lock_project_tx`, which takes the
//! project row lock. Concurrent mutations of the same project queue on that
//! lock until the holder commits or rolls back.

use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use super::places::PLACE_COLUMNS;
use super::projects::PROJECT_COLUMNS;
use crate::domain::entities::{Place, Project, ProjectStatus};
use voyage_common::RepositoryError;

/// Lock the project row for the rest of the transaction.
///
/// Returns `None` when the project does not exist.
pub async fn lock_project_tx(
    tx: &mut Transaction<'_, Postgres>,
    project_id: Uuid,
) -> Result<Option<Project>, sqlx::Error> {
    let query = format!("SELECT {PROJECT_COLUMNS} FROM travel_projects WHERE id = $1 FOR UPDATE");
    let row = sqlx::query_as::<_, Project>(&query)
        .bind(project_id)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(row)
}

/// Count places of a project within a transaction
pub async fn count_places_tx(
    tx: &mut Transaction<'_, Postgres>,
    project_id: Uuid,
) -> Result<i64, sqlx::Error> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM project_places WHERE project_id = $1",
    )
    .bind(project_id)
    .fetch_one(&mut **tx)
    .await?;
    Ok(count)
}

/// Whether `external_id` is already part of the project
pub async fn place_exists_tx(
    tx: &mut Transaction<'_, Postgres>,
    project_id: Uuid,
    external_id: &str,
) -> Result<bool, sqlx::Error> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM project_places WHERE project_id = $1 AND external_id = $2)",
    )
    .bind(project_id)
    .bind(external_id)
    .fetch_one(&mut **tx)
    .await?;
    Ok(exists)
}

/// Find a place within a transaction
pub async fn find_place_tx(
    tx: &mut Transaction<'_, Postgres>,
    project_id: Uuid,
    external_id: &str,
) -> Result<Option<Place>, sqlx::Error> {
    let query = format!(
        "SELECT {PLACE_COLUMNS} FROM project_places WHERE project_id = $1 AND external_id = $2"
    );
    let row = sqlx::query_as::<_, Place>(&query)
        .bind(project_id)
        .bind(external_id)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(row)
}

/// Create a project within a transaction
pub async fn create_project_tx(
    tx: &mut Transaction<'_, Postgres>,
    project: &Project,
) -> Result<Project, sqlx::Error> {
    let query = format!(
        "INSERT INTO travel_projects ({PROJECT_COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING {PROJECT_COLUMNS}"
    );
    let row = sqlx::query_as::<_, Project>(&query)
        .bind(project.id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.start_date)
        .bind(project.status)
        .bind(project.created_at)
        .bind(project.updated_at)
        .fetch_one(&mut **tx)
        .await?;
    Ok(row)
}

/// Update the editable project fields within a transaction
pub async fn update_project_tx(
    tx: &mut Transaction<'_, Postgres>,
    project: &Project,
) -> Result<Project, RepositoryError> {
    let query = format!(
        "UPDATE travel_projects SET name = $2, description = $3, start_date = $4, updated_at = NOW() \
         WHERE id = $1 \
         RETURNING {PROJECT_COLUMNS}"
    );
    let row = sqlx::query_as::<_, Project>(&query)
        .bind(project.id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.start_date)
        .fetch_one(&mut **tx)
        .await?;
    Ok(row)
}

/// Persist a derived status within a transaction
pub async fn update_project_status_tx(
    tx: &mut Transaction<'_, Postgres>,
    project_id: Uuid,
    status: ProjectStatus,
) -> Result<(), RepositoryError> {
    let result = sqlx::query(
        "UPDATE travel_projects SET status = $2, updated_at = NOW() WHERE id = $1",
    )
    .bind(project_id)
    .bind(status)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

/// Delete a project and, by cascade, its places
pub async fn delete_project_tx(
    tx: &mut Transaction<'_, Postgres>,
    project_id: Uuid,
) -> Result<(), RepositoryError> {
    let result = sqlx::query("DELETE FROM travel_projects WHERE id = $1")
        .bind(project_id)
        .execute(&mut **tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

/// Insert a place within a transaction.
///
/// A unique violation on `(project_id, external_id)` surfaces as
/// `RepositoryError::AlreadyExists`.
pub async fn create_place_tx(
    tx: &mut Transaction<'_, Postgres>,
    place: &Place,
) -> Result<Place, RepositoryError> {
    let query = format!(
        "INSERT INTO project_places ({PLACE_COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING {PLACE_COLUMNS}"
    );
    let row = sqlx::query_as::<_, Place>(&query)
        .bind(place.id)
        .bind(place.project_id)
        .bind(&place.external_id)
        .bind(&place.title)
        .bind(&place.artist)
        .bind(&place.notes)
        .bind(place.visited)
        .bind(place.created_at)
        .bind(place.updated_at)
        .fetch_one(&mut **tx)
        .await?;
    Ok(row)
}

/// Update notes and visited flag within a transaction
pub async fn update_place_tx(
    tx: &mut Transaction<'_, Postgres>,
    place: &Place,
) -> Result<Place, RepositoryError> {
    let query = format!(
        "UPDATE project_places SET notes = $2, visited = $3, updated_at = NOW() \
         WHERE id = $1 \
         RETURNING {PLACE_COLUMNS}"
    );
    let row = sqlx::query_as::<_, Place>(&query)
        .bind(place.id)
        .bind(&place.notes)
        .bind(place.visited)
        .fetch_one(&mut **tx)
        .await?;
    Ok(row)
}

/// Delete a place within a transaction
pub async fn delete_place_tx(
    tx: &mut Transaction<'_, Postgres>,
    project_id: Uuid,
    external_id: &str,
) -> Result<(), RepositoryError> {
    let result =
        sqlx::query("DELETE FROM project_places WHERE project_id = $1 AND external_id = $2")
            .bind(project_id)
            .bind(external_id)
            .execute(&mut **tx)
            .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

/// Whether any place of the project has been visited
pub async fn has_visited_places_tx(
    tx: &mut Transaction<'_, Postgres>,
    project_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM project_places WHERE project_id = $1 AND visited)",
    )
    .bind(project_id)
    .fetch_one(&mut **tx)
    .await?;
    Ok(exists)
}

/// Visited flags of every place in the project
pub async fn visited_flags_tx(
    tx: &mut Transaction<'_, Postgres>,
    project_id: Uuid,
) -> Result<Vec<bool>, sqlx::Error> {
    let flags = sqlx::query_scalar::<_, bool>(
        "SELECT visited FROM project_places WHERE project_id = $1",
    )
    .bind(project_id)
    .fetch_all(&mut **tx)
    .await?;
    Ok(flags)
}
