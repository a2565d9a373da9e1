//! Unit handlers. Listing is public (the login screen needs it before any
//! session exists); mutations sit behind the Administer gate.

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
    models::{
        post::PostResponse,
        unit::{CreateUnit, Unit, UnitResponse, UpdateUnit},
    },
    repositories::unit as unit_repo,
    state::AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct UnitListQuery {
    /// Active units only by default; pass `active=false` to see retired ones.
    pub active: Option<bool>,
}

pub async fn list_units(
    State(state): State<AppState>,
    Query(query): Query<UnitListQuery>,
) -> Result<Json<Vec<UnitResponse>>, AppError> {
    let active = query.active.unwrap_or(true);
    let units = unit_repo::list(&state.pool, Some(active)).await?;

    let mut responses = Vec::with_capacity(units.len());
    for unit in units {
        let posts = unit_repo::active_posts(&state.pool, &unit.id)
            .await?
            .into_iter()
            .map(PostResponse::from)
            .collect();
        responses.push(UnitResponse::from_unit(unit, posts));
    }

    Ok(Json(responses))
}

pub async fn get_unit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UnitResponse>, AppError> {
    let unit = unit_repo::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Unit not found".into()))?;
    let posts = unit_repo::active_posts(&state.pool, &unit.id)
        .await?
        .into_iter()
        .map(PostResponse::from)
        .collect();
    Ok(Json(UnitResponse::from_unit(unit, posts)))
}

pub async fn create_unit(
    State(state): State<AppState>,
    Json(payload): Json<CreateUnit>,
) -> Result<(StatusCode, Json<UnitResponse>), AppError> {
    payload.validate()?;

    let unit = Unit::new(
        payload.name,
        payload.city,
        payload.address,
        payload.active,
        Utc::now(),
    );
    let created = unit_repo::insert(&state.pool, &unit).await?;
    tracing::info!(unit_id = %created.id, name = %created.name, "unit created");
    Ok((StatusCode::CREATED, Json(UnitResponse::from_unit(created, Vec::new()))))
}

pub async fn update_unit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUnit>,
) -> Result<Json<UnitResponse>, AppError> {
    payload.validate()?;

    let mut unit = unit_repo::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Unit not found".into()))?;

    if let Some(name) = payload.name {
        unit.name = name;
    }
    if let Some(city) = payload.city {
        unit.city = city;
    }
    if payload.address.is_some() {
        unit.address = payload.address;
    }
    if let Some(active) = payload.active {
        unit.active = active;
    }
    unit.updated_at = Utc::now();

    let updated = unit_repo::update(&state.pool, &unit).await?;
    let posts = unit_repo::active_posts(&state.pool, &updated.id)
        .await?
        .into_iter()
        .map(PostResponse::from)
        .collect();
    Ok(Json(UnitResponse::from_unit(updated, posts)))
}

/// Deactivates the unit; historical attendance keeps referencing it.
pub async fn delete_unit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UnitResponse>, AppError> {
    let mut unit = unit_repo::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Unit not found".into()))?;

    unit.active = false;
    unit.updated_at = Utc::now();

    let updated = unit_repo::update(&state.pool, &unit).await?;
    tracing::info!(unit_id = %updated.id, "unit deactivated");
    Ok(Json(UnitResponse::from_unit(updated, Vec::new())))
}
