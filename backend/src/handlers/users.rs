//! Admin handlers for user accounts. Routes are mounted behind the
//! Administer capability gate.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        session::UserSession,
        user::{CreateUser, UpdateUser, User, UserResponse},
    },
    repositories::user as user_repo,
    state::AppState,
    utils::password::hash_password,
};

pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = user_repo::list_all(&state.pool).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let user = user_repo::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(Json(user.into()))
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUser>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    payload.validate()?;

    if user_repo::username_exists(&state.pool, &payload.username).await? {
        return Err(AppError::Conflict("Username already exists".into()));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = User::new(
        payload.username,
        password_hash,
        payload.full_name,
        payload.role,
        payload.active,
        Utc::now(),
    );

    let created = user_repo::insert(&state.pool, &user).await?;
    tracing::info!(user_id = %created.id, username = %created.username, "user created");
    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUser>,
) -> Result<Json<UserResponse>, AppError> {
    payload.validate()?;

    let mut user = user_repo::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    if let Some(full_name) = payload.full_name {
        user.full_name = full_name;
    }
    if let Some(role) = payload.role {
        user.role = role;
    }
    if let Some(active) = payload.active {
        user.active = active;
    }
    if let Some(password) = payload.password {
        user.password_hash = hash_password(&password)?;
    }
    user.updated_at = Utc::now();

    let updated = user_repo::update(&state.pool, &user).await?;
    Ok(Json(updated.into()))
}

/// Deactivates instead of deleting; attendance history stays attributable.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    if session.user_id == id {
        return Err(AppError::BadRequest(
            "Cannot deactivate your own user".into(),
        ));
    }

    let mut user = user_repo::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    user.active = false;
    user.updated_at = Utc::now();

    let updated = user_repo::update(&state.pool, &user).await?;
    tracing::info!(user_id = %updated.id, "user deactivated");
    Ok(Json(updated.into()))
}
