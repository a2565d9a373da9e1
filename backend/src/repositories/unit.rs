//! Repository functions for units (sites).

use sqlx::PgPool;

use crate::error::AppError;
use crate::models::post::Post;
use crate::models::unit::Unit;

const SELECT_COLUMNS: &str = "id, name, city, address, active, created_at, updated_at";

/// Lists units ordered by name. `active = None` means no filter.
pub async fn list(pool: &PgPool, active: Option<bool>) -> Result<Vec<Unit>, AppError> {
    let units = match active {
        Some(flag) => {
            let query = format!(
                "SELECT {} FROM units WHERE active = $1 ORDER BY name",
                SELECT_COLUMNS
            );
            sqlx::query_as::<_, Unit>(&query)
                .bind(flag)
                .fetch_all(pool)
                .await?
        }
        None => {
            let query = format!("SELECT {} FROM units ORDER BY name", SELECT_COLUMNS);
            sqlx::query_as::<_, Unit>(&query).fetch_all(pool).await?
        }
    };
    Ok(units)
}

pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Unit>, AppError> {
    let query = format!("SELECT {} FROM units WHERE id = $1", SELECT_COLUMNS);
    let unit = sqlx::query_as::<_, Unit>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(unit)
}

pub async fn find_active(pool: &PgPool, id: &str) -> Result<Option<Unit>, AppError> {
    let query = format!(
        "SELECT {} FROM units WHERE id = $1 AND active = TRUE",
        SELECT_COLUMNS
    );
    let unit = sqlx::query_as::<_, Unit>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(unit)
}

/// Active posts of a unit, for embedding into unit listings.
pub async fn active_posts(pool: &PgPool, unit_id: &str) -> Result<Vec<Post>, AppError> {
    let posts = sqlx::query_as::<_, Post>(
        "SELECT id, unit_id, name, active, created_at, updated_at \
         FROM posts WHERE unit_id = $1 AND active = TRUE ORDER BY name",
    )
    .bind(unit_id)
    .fetch_all(pool)
    .await?;
    Ok(posts)
}

pub async fn insert(pool: &PgPool, unit: &Unit) -> Result<Unit, AppError> {
    let query = format!(
        "INSERT INTO units (id, name, city, address, active, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING {}",
        SELECT_COLUMNS
    );
    let row = sqlx::query_as::<_, Unit>(&query)
        .bind(&unit.id)
        .bind(&unit.name)
        .bind(&unit.city)
        .bind(&unit.address)
        .bind(unit.active)
        .bind(unit.created_at)
        .bind(unit.updated_at)
        .fetch_one(pool)
        .await?;
    Ok(row)
}

pub async fn update(pool: &PgPool, unit: &Unit) -> Result<Unit, AppError> {
    let query = format!(
        "UPDATE units SET name = $2, city = $3, address = $4, active = $5, updated_at = $6 \
         WHERE id = $1 \
         RETURNING {}",
        SELECT_COLUMNS
    );
    let row = sqlx::query_as::<_, Unit>(&query)
        .bind(&unit.id)
        .bind(&unit.name)
        .bind(&unit.city)
        .bind(&unit.address)
        .bind(unit.active)
        .bind(unit.updated_at)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Unit not found".into()))?;
    Ok(row)
}
