//! Travel project repository

use std::str::FromStr;

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{Project, ProjectStatus};
use voyage_common::{Error, Result};

pub(crate) const PROJECT_COLUMNS: &str =
    "id, name, description, start_date, status, created_at, updated_at";

/// Sortable project columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    Name,
    CreatedAt,
    StartDate,
}

impl OrderField {
    fn column(&self) -> &'static str {
        match self {
            OrderField::Name => "name",
            OrderField::CreatedAt => "created_at",
            OrderField::StartDate => "start_date",
        }
    }
}

/// Sort order for project listings, written `field` or `-field`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectOrdering {
    pub field: OrderField,
    pub descending: bool,
}

impl Default for ProjectOrdering {
    fn default() -> Self {
        Self {
            field: OrderField::CreatedAt,
            descending: true,
        }
    }
}

impl FromStr for ProjectOrdering {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let (descending, name) = match value.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, value),
        };
        let field = match name {
            "name" => OrderField::Name,
            "created_at" => OrderField::CreatedAt,
            "start_date" => OrderField::StartDate,
            other => {
                return Err(Error::Validation(format!(
                    "Invalid ordering '{}'. Allowed: name, created_at, start_date (prefix '-' for descending)",
                    other
                )))
            }
        };
        Ok(Self { field, descending })
    }
}

impl ProjectOrdering {
    fn sql(&self) -> String {
        let direction = if self.descending { "DESC" } else { "ASC" };
        format!("{} {}, id {}", self.field.column(), direction, direction)
    }
}

/// Filters for listing projects
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    pub status: Option<ProjectStatus>,
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    pub start_date_from: Option<NaiveDate>,
    pub start_date_to: Option<NaiveDate>,
    /// Case-insensitive substring of the name or description
    pub search: Option<String>,
    pub ordering: ProjectOrdering,
}

impl ProjectFilter {
    /// Build the list query. Placeholders follow the order in which
    /// `ProjectRepository::list` binds values.
    fn list_query(&self) -> String {
        let mut conditions = Vec::new();
        let mut bind_idx = 1u32;

        if self.status.is_some() {
            conditions.push(format!("status = ${bind_idx}"));
            bind_idx += 1;
        }
        if self.name.is_some() {
            conditions.push(format!("name ILIKE ${bind_idx}"));
            bind_idx += 1;
        }
        if self.start_date_from.is_some() {
            conditions.push(format!("start_date >= ${bind_idx}"));
            bind_idx += 1;
        }
        if self.start_date_to.is_some() {
            conditions.push(format!("start_date <= ${bind_idx}"));
            bind_idx += 1;
        }
        if self.search.is_some() {
            conditions.push(format!(
                "(name ILIKE ${bind_idx} OR description ILIKE ${bind_idx})"
            ));
            bind_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        format!(
            "SELECT {PROJECT_COLUMNS} FROM travel_projects{where_clause} \
             ORDER BY {order} LIMIT ${limit_idx} OFFSET ${offset_idx}",
            order = self.ordering.sql(),
            limit_idx = bind_idx,
            offset_idx = bind_idx + 1,
        )
    }
}

/// Wrap user input for ILIKE, escaping its wildcards
fn contains_pattern(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[derive(Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find project by ID
    pub async fn find(&self, id: Uuid) -> Result<Option<Project>> {
        let query = format!("SELECT {PROJECT_COLUMNS} FROM travel_projects WHERE id = $1");
        let row = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// List projects matching `filter`
    pub async fn list(&self, filter: &ProjectFilter, limit: i64, offset: i64) -> Result<Vec<Project>> {
        let query = filter.list_query();
        let mut q = sqlx::query_as::<_, Project>(&query);

        if let Some(status) = filter.status {
            q = q.bind(status);
        }
        if let Some(ref name) = filter.name {
            q = q.bind(contains_pattern(name));
        }
        if let Some(from) = filter.start_date_from {
            q = q.bind(from);
        }
        if let Some(to) = filter.start_date_to {
            q = q.bind(to);
        }
        if let Some(ref search) = filter.search {
            q = q.bind(contains_pattern(search));
        }

        let rows = q.bind(limit).bind(offset).fetch_all(&self.pool).await?;
        Ok(rows)
    }
}
