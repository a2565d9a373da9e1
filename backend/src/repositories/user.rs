//! Repository functions for user accounts.

use sqlx::PgPool;

use crate::error::AppError;
use crate::models::user::User;

const SELECT_COLUMNS: &str =
    "id, username, password_hash, full_name, role, active, created_at, updated_at";

pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, AppError> {
    let query = format!("SELECT {} FROM users WHERE username = $1", SELECT_COLUMNS);
    let user = sqlx::query_as::<_, User>(&query)
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<User>, AppError> {
    let query = format!("SELECT {} FROM users WHERE id = $1", SELECT_COLUMNS);
    let user = sqlx::query_as::<_, User>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<User>, AppError> {
    let query = format!(
        "SELECT {} FROM users ORDER BY created_at DESC",
        SELECT_COLUMNS
    );
    let users = sqlx::query_as::<_, User>(&query).fetch_all(pool).await?;
    Ok(users)
}

pub async fn username_exists(pool: &PgPool, username: &str) -> Result<bool, AppError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)",
    )
    .bind(username)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

pub async fn insert(pool: &PgPool, user: &User) -> Result<User, AppError> {
    let query = format!(
        "INSERT INTO users (id, username, password_hash, full_name, role, active, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING {}",
        SELECT_COLUMNS
    );
    let row = sqlx::query_as::<_, User>(&query)
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(user.role.as_str())
        .bind(user.active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(pool)
        .await?;
    Ok(row)
}

pub async fn update(pool: &PgPool, user: &User) -> Result<User, AppError> {
    let query = format!(
        "UPDATE users SET password_hash = $2, full_name = $3, role = $4, active = $5, \
         updated_at = $6 WHERE id = $1 \
         RETURNING {}",
        SELECT_COLUMNS
    );
    let row = sqlx::query_as::<_, User>(&query)
        .bind(&user.id)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(user.role.as_str())
        .bind(user.active)
        .bind(user.updated_at)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(row)
}
