//! The auth gate and its capability variants, exercised over real routers.
//! The probe handler never touches the database, so a lazily-connected pool
//! is enough.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware as axum_middleware,
    routing::get,
    Extension, Json, Router,
};
use tower::ServiceExt;

use centinela_backend::{
    middleware,
    models::{session::UserSession, user::Role},
    state::AppState,
    utils::jwt::create_refresh_token,
};

mod support;

use support::{access_token_for, lazy_pool, session_for_role, test_config};

async fn whoami(Extension(session): Extension<UserSession>) -> Json<UserSession> {
    Json(session)
}

fn test_state() -> AppState {
    AppState::new(lazy_pool(), test_config())
}

fn app_with_auth(state: AppState) -> Router {
    Router::new()
        .route("/probe", get(whoami))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth,
        ))
        .with_state(state)
}

fn app_with_admin_gate(state: AppState) -> Router {
    Router::new()
        .route("/probe", get(whoami))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_admin,
        ))
        .with_state(state)
}

fn app_with_history_gate(state: AppState) -> Router {
    Router::new()
        .route("/probe", get(whoami))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_history,
        ))
        .with_state(state)
}

fn app_with_map_gate(state: AppState) -> Router {
    Router::new()
        .route("/probe", get(whoami))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_map,
        ))
        .with_state(state)
}

fn get_probe(token: Option<&str>) -> Request<Body> {
    let builder = Request::builder().method("GET").uri("/probe");
    let builder = match token {
        Some(token) => builder.header("Authorization", format!("Bearer {}", token)),
        None => builder,
    };
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn missing_token_is_rejected() {
    let app = app_with_auth(test_state());
    let response = app.oneshot(get_probe(None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let app = app_with_auth(test_state());
    let response = app.oneshot(get_probe(Some("not-a-jwt"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_token_does_not_open_the_access_gate() {
    let state = test_state();
    let session = session_for_role(Role::Agente);
    let refresh = create_refresh_token(
        &session,
        &state.config.jwt_refresh_secret,
        state.config.refresh_token_expiration_days,
    )
    .unwrap();

    let app = app_with_auth(state);
    let response = app.oneshot(get_probe(Some(&refresh))).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn valid_token_reaches_the_handler_with_its_session() {
    let state = test_state();
    let session = session_for_role(Role::Agente);
    let token = access_token_for(&state.config, &session);

    let app = app_with_auth(state);
    let response = app.oneshot(get_probe(Some(&token))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["user_id"], "user-agente");
    assert_eq!(json["role"], "agente");
    assert_eq!(json["unit_id"], "unit-1");
    assert_eq!(json["post_id"], "post-1");
}

#[tokio::test]
async fn cookie_token_also_authenticates() {
    let state = test_state();
    let session = session_for_role(Role::Agente);
    let token = access_token_for(&state.config, &session);

    let app = app_with_auth(state);
    let request = Request::builder()
        .method("GET")
        .uri("/probe")
        .header("Cookie", format!("access_token={}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn admin_gate_rejects_every_non_admin_role() {
    for role in Role::ALL {
        let state = test_state();
        let token = access_token_for(&state.config, &session_for_role(role));
        let app = app_with_admin_gate(state);
        let response = app.oneshot(get_probe(Some(&token))).await.unwrap();

        let expected = if role == Role::Admin {
            StatusCode::OK
        } else {
            StatusCode::FORBIDDEN
        };
        assert_eq!(response.status(), expected, "role {:?}", role);
    }
}

#[tokio::test]
async fn oficina_cannot_reach_admin_operations() {
    let state = test_state();
    let token = access_token_for(&state.config, &session_for_role(Role::Oficina));
    let app = app_with_admin_gate(state);
    let response = app.oneshot(get_probe(Some(&token))).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn history_gate_admits_exactly_the_history_roles() {
    let allowed = [
        Role::Admin,
        Role::Asistente,
        Role::Jefe,
        Role::Gerente,
        Role::CentroDeControl,
    ];
    for role in Role::ALL {
        let state = test_state();
        let token = access_token_for(&state.config, &session_for_role(role));
        let app = app_with_history_gate(state);
        let response = app.oneshot(get_probe(Some(&token))).await.unwrap();

        let expected = if allowed.contains(&role) {
            StatusCode::OK
        } else {
            StatusCode::FORBIDDEN
        };
        assert_eq!(response.status(), expected, "role {:?}", role);
    }
}

#[tokio::test]
async fn map_gate_admits_exactly_the_map_roles() {
    let allowed = [
        Role::Admin,
        Role::Asistente,
        Role::Jefe,
        Role::Gerente,
        Role::CentroDeControl,
    ];
    for role in Role::ALL {
        let state = test_state();
        let token = access_token_for(&state.config, &session_for_role(role));
        let app = app_with_map_gate(state);
        let response = app.oneshot(get_probe(Some(&token))).await.unwrap();

        let expected = if allowed.contains(&role) {
            StatusCode::OK
        } else {
            StatusCode::FORBIDDEN
        };
        assert_eq!(response.status(), expected, "role {:?}", role);
    }
}

#[tokio::test]
async fn unauthenticated_request_never_reaches_capability_checks() {
    let app = app_with_history_gate(test_state());
    let response = app.oneshot(get_probe(None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
