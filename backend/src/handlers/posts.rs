//! Post handlers. Listing is public for the login screen; mutations sit
//! behind the Administer gate.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    error::AppError,
    models::post::{CreatePost, Post, PostResponse, PostWithUnit, UpdatePost},
    repositories::{post as post_repo, unit as unit_repo},
    state::AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct PostListQuery {
    pub unit_id: Option<String>,
    /// Active posts only by default; pass `active=false` to see retired ones.
    pub active: Option<bool>,
}

pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PostListQuery>,
) -> Result<Json<Vec<PostWithUnit>>, AppError> {
    let active = query.active.unwrap_or(true);
    let posts = post_repo::list(&state.pool, query.unit_id.as_deref(), Some(active)).await?;
    Ok(Json(posts))
}

pub async fn create_post(
    State(state): State<AppState>,
    Json(payload): Json<CreatePost>,
) -> Result<(StatusCode, Json<PostResponse>), AppError> {
    payload.validate()?;

    if unit_repo::find_by_id(&state.pool, &payload.unit_id)
        .await?
        .is_none()
    {
        return Err(AppError::BadRequest(
            "The selected unit does not exist".into(),
        ));
    }

    let post = Post::new(payload.unit_id, payload.name, payload.active, Utc::now());
    let created = post_repo::insert(&state.pool, &post).await?;
    tracing::info!(post_id = %created.id, name = %created.name, "post created");
    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdatePost>,
) -> Result<Json<PostResponse>, AppError> {
    payload.validate()?;

    let mut post = post_repo::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))?;

    if let Some(name) = payload.name {
        post.name = name;
    }
    if let Some(active) = payload.active {
        post.active = active;
    }
    post.updated_at = Utc::now();

    let updated = post_repo::update(&state.pool, &post).await?;
    Ok(Json(updated.into()))
}

/// Deactivates the post; historical attendance keeps referencing it.
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PostResponse>, AppError> {
    let mut post = post_repo::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))?;

    post.active = false;
    post.updated_at = Utc::now();

    let updated = post_repo::update(&state.pool, &post).await?;
    tracing::info!(post_id = %updated.id, "post deactivated");
    Ok(Json(updated.into()))
}
