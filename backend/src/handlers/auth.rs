use axum::{
    extract::{Extension, State},
    http::{header, HeaderMap},
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        session::UserSession,
        user::{LoginRequest, LoginResponse},
    },
    repositories::{post as post_repo, unit as unit_repo, user as user_repo},
    state::AppState,
    utils::{
        cookies::{
            build_auth_cookie, build_clear_cookie, extract_cookie_value, CookieOptions,
            ACCESS_COOKIE_NAME, ACCESS_COOKIE_PATH, REFRESH_COOKIE_NAME, REFRESH_COOKIE_PATH,
        },
        jwt::{create_access_token, create_refresh_token, verify_refresh_token},
        password::verify_password,
    },
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshResponse {
    pub access_token: String,
    pub user: UserSession,
}

fn cookie_options(state: &AppState) -> CookieOptions {
    CookieOptions {
        secure: state.config.cookie_secure,
        same_site: state.config.cookie_same_site,
    }
}

fn set_cookie_headers(cookies: &[String]) -> Result<HeaderMap, AppError> {
    let mut headers = HeaderMap::new();
    for cookie in cookies {
        let value = cookie
            .parse()
            .map_err(|_| AppError::InternalServerError(anyhow::anyhow!("invalid cookie value")))?;
        headers.append(header::SET_COOKIE, value);
    }
    Ok(headers)
}

/// Clears both session cookies; shared by logout and the post-check-out
/// session close.
pub fn clear_session_headers(state: &AppState) -> Result<HeaderMap, AppError> {
    let options = cookie_options(state);
    set_cookie_headers(&[
        build_clear_cookie(ACCESS_COOKIE_NAME, ACCESS_COOKIE_PATH, options),
        build_clear_cookie(REFRESH_COOKIE_NAME, REFRESH_COOKIE_PATH, options),
    ])
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<LoginResponse>), AppError> {
    payload.validate()?;

    // Unknown, inactive, and wrong-password cases all produce the same reply.
    let user = user_repo::find_by_username(&state.pool, &payload.username)
        .await?
        .filter(|user| user.active)
        .ok_or_else(|| AppError::Unauthorized("Invalid username or password".into()))?;

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Invalid username or password".into()));
    }

    let unit = unit_repo::find_active(&state.pool, &payload.unit_id)
        .await?
        .ok_or_else(|| {
            AppError::BadRequest("The selected unit does not exist or is inactive".into())
        })?;

    let post = post_repo::find_active_in_unit(&state.pool, &payload.post_id, &unit.id)
        .await?
        .ok_or_else(|| {
            AppError::BadRequest("The selected post does not exist or is inactive".into())
        })?;

    let session = UserSession::new(&user, Some(unit.id), Some(post.id));

    let access_token = create_access_token(
        &session,
        &state.config.jwt_secret,
        state.config.access_token_expiration_hours,
    )?;
    let refresh_token = create_refresh_token(
        &session,
        &state.config.jwt_refresh_secret,
        state.config.refresh_token_expiration_days,
    )?;

    let options = cookie_options(&state);
    let headers = set_cookie_headers(&[
        build_auth_cookie(
            ACCESS_COOKIE_NAME,
            &access_token,
            Duration::from_secs(state.config.access_token_expiration_hours * 3600),
            ACCESS_COOKIE_PATH,
            options,
        ),
        build_auth_cookie(
            REFRESH_COOKIE_NAME,
            &refresh_token,
            Duration::from_secs(state.config.refresh_token_expiration_days * 24 * 3600),
            REFRESH_COOKIE_PATH,
            options,
        ),
    ])?;

    tracing::info!(user_id = %session.user_id, username = %session.username, "login");

    Ok((
        headers,
        Json(LoginResponse {
            access_token,
            refresh_token,
            user: session,
        }),
    ))
}

/// Mints a fresh access token from a valid refresh token. Refresh tokens are
/// never re-issued here; when one expires the user logs in again.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Option<Json<RefreshRequest>>,
) -> Result<(HeaderMap, Json<RefreshResponse>), AppError> {
    let from_cookie = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| extract_cookie_value(raw, REFRESH_COOKIE_NAME));
    let token = payload
        .and_then(|Json(body)| body.refresh_token)
        .or(from_cookie)
        .ok_or_else(|| AppError::Unauthorized("Refresh token is required".into()))?;

    let claims = verify_refresh_token(&token, &state.config.jwt_refresh_secret)
        .map_err(|_| AppError::Unauthorized("Invalid or expired refresh token".into()))?;
    let session = claims.into_session();

    let access_token = create_access_token(
        &session,
        &state.config.jwt_secret,
        state.config.access_token_expiration_hours,
    )?;

    let options = cookie_options(&state);
    let response_headers = set_cookie_headers(&[build_auth_cookie(
        ACCESS_COOKIE_NAME,
        &access_token,
        Duration::from_secs(state.config.access_token_expiration_hours * 3600),
        ACCESS_COOKIE_PATH,
        options,
    )])?;

    Ok((
        response_headers,
        Json(RefreshResponse {
            access_token,
            user: session,
        }),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
) -> Result<(HeaderMap, Json<serde_json::Value>), AppError> {
    let headers = clear_session_headers(&state)?;
    Ok((headers, Json(serde_json::json!({"message": "Logged out"}))))
}

pub async fn me(Extension(session): Extension<UserSession>) -> Json<UserSession> {
    Json(session)
}
