//! Repository functions for posts (positions within a unit).

use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use crate::error::AppError;
use crate::models::attendance::UnitSummary;
use crate::models::post::{Post, PostWithUnit};
use crate::repositories::common::push_clause;

const SELECT_COLUMNS: &str = "id, unit_id, name, active, created_at, updated_at";

#[derive(Debug, FromRow)]
struct PostUnitRow {
    id: String,
    name: String,
    active: bool,
    unit_id: String,
    unit_name: String,
    unit_city: String,
}

impl From<PostUnitRow> for PostWithUnit {
    fn from(row: PostUnitRow) -> Self {
        PostWithUnit {
            id: row.id,
            name: row.name,
            active: row.active,
            unit: UnitSummary {
                id: row.unit_id,
                name: row.unit_name,
                city: row.unit_city,
            },
        }
    }
}

/// Lists posts with their unit, optionally scoped to one unit and/or an
/// active flag.
pub async fn list(
    pool: &PgPool,
    unit_id: Option<&str>,
    active: Option<bool>,
) -> Result<Vec<PostWithUnit>, AppError> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT p.id, p.name, p.active, u.id AS unit_id, u.name AS unit_name, u.city AS unit_city \
         FROM posts p JOIN units u ON p.unit_id = u.id",
    );
    let mut has_clause = false;
    if let Some(unit_id) = unit_id {
        push_clause(&mut builder, &mut has_clause);
        builder.push("p.unit_id = ").push_bind(unit_id.to_string());
    }
    if let Some(flag) = active {
        push_clause(&mut builder, &mut has_clause);
        builder.push("p.active = ").push_bind(flag);
    }
    builder.push(" ORDER BY p.name");

    let rows = builder.build_query_as::<PostUnitRow>().fetch_all(pool).await?;
    Ok(rows.into_iter().map(PostWithUnit::from).collect())
}

pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Post>, AppError> {
    let query = format!("SELECT {} FROM posts WHERE id = $1", SELECT_COLUMNS);
    let post = sqlx::query_as::<_, Post>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(post)
}

/// Post that is active and belongs to the given unit; used by login to pin
/// the session to a valid (unit, post) pair.
pub async fn find_active_in_unit(
    pool: &PgPool,
    id: &str,
    unit_id: &str,
) -> Result<Option<Post>, AppError> {
    let query = format!(
        "SELECT {} FROM posts WHERE id = $1 AND unit_id = $2 AND active = TRUE",
        SELECT_COLUMNS
    );
    let post = sqlx::query_as::<_, Post>(&query)
        .bind(id)
        .bind(unit_id)
        .fetch_optional(pool)
        .await?;
    Ok(post)
}

pub async fn insert(pool: &PgPool, post: &Post) -> Result<Post, AppError> {
    let query = format!(
        "INSERT INTO posts (id, unit_id, name, active, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING {}",
        SELECT_COLUMNS
    );
    let row = sqlx::query_as::<_, Post>(&query)
        .bind(&post.id)
        .bind(&post.unit_id)
        .bind(&post.name)
        .bind(post.active)
        .bind(post.created_at)
        .bind(post.updated_at)
        .fetch_one(pool)
        .await?;
    Ok(row)
}

pub async fn update(pool: &PgPool, post: &Post) -> Result<Post, AppError> {
    let query = format!(
        "UPDATE posts SET name = $2, active = $3, updated_at = $4 WHERE id = $1 \
         RETURNING {}",
        SELECT_COLUMNS
    );
    let row = sqlx::query_as::<_, Post>(&query)
        .bind(&post.id)
        .bind(&post.name)
        .bind(post.active)
        .bind(post.updated_at)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))?;
    Ok(row)
}
