use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::{
    models::{session::UserSession, user::Capability},
    state::AppState,
    utils::{
        cookies::{extract_cookie_value, ACCESS_COOKIE_NAME},
        jwt::verify_access_token,
    },
};

/// Authenticates the request and stores the session as an extension.
/// Missing or invalid tokens fail closed with 401.
pub async fn auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let session = authenticate_request(request.headers(), &state)?;
    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

/// Auth + ViewHistory capability for cross-user history surfaces.
pub async fn auth_history(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    auth_with_capability(state, request, next, Capability::ViewHistory).await
}

/// Auth + ViewMap capability for the live map feed.
pub async fn auth_map(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    auth_with_capability(state, request, next, Capability::ViewMap).await
}

/// Auth + Administer capability for master-data mutations.
pub async fn auth_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    auth_with_capability(state, request, next, Capability::Administer).await
}

async fn auth_with_capability(
    state: AppState,
    mut request: Request,
    next: Next,
    capability: Capability,
) -> Result<Response, StatusCode> {
    let session = authenticate_request(request.headers(), &state)?;
    // A valid session without the capability is rejected, not hidden.
    if !session.has_capability(capability) {
        return Err(StatusCode::FORBIDDEN);
    }
    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

fn authenticate_request(headers: &HeaderMap, state: &AppState) -> Result<UserSession, StatusCode> {
    let token = extract_token(headers).ok_or(StatusCode::UNAUTHORIZED)?;
    let claims = verify_access_token(&token, &state.config.jwt_secret)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;
    Ok(claims.into_session())
}

/// Bearer header wins; the access cookie is the browser fallback.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    if let Some(token) = auth_header.and_then(parse_bearer_token) {
        return Some(token.to_string());
    }

    headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| extract_cookie_value(raw, ACCESS_COOKIE_NAME))
}

fn parse_bearer_token(header: &str) -> Option<&str> {
    let (scheme, rest) = header.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") {
        Some(rest.trim_start())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bearer_token_accepts_any_scheme_casing() {
        assert_eq!(parse_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(parse_bearer_token("bearer abc"), Some("abc"));
        assert_eq!(parse_bearer_token("BEARER  abc"), Some("abc"));
        assert_eq!(parse_bearer_token("Basic abc"), None);
        assert_eq!(parse_bearer_token("Bearerabc"), None);
    }

    #[test]
    fn extract_token_prefers_bearer_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer from-header".parse().unwrap());
        headers.insert(
            header::COOKIE,
            "access_token=from-cookie".parse().unwrap(),
        );
        assert_eq!(extract_token(&headers).as_deref(), Some("from-header"));

        headers.remove(header::AUTHORIZATION);
        assert_eq!(extract_token(&headers).as_deref(), Some("from-cookie"));

        headers.remove(header::COOKIE);
        assert!(extract_token(&headers).is_none());
    }
}
