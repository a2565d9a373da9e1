use axum::{
    http::Method,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use centinela_backend::{
    config::Config, db::connection::create_pool, docs, handlers, middleware as auth_middleware,
    state::AppState,
};

fn mask_secret(s: &str) -> String {
    if s.is_empty() {
        return "<empty>".into();
    }
    let prefix = s.chars().take(4).collect::<String>();
    format!("{}*** (len={})", prefix, s.len())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "centinela_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load()?;
    tracing::info!(
        database_url = %config.database_url,
        jwt_secret = %mask_secret(&config.jwt_secret),
        jwt_refresh_secret = %mask_secret(&config.jwt_refresh_secret),
        access_token_expiration_hours = config.access_token_expiration_hours,
        refresh_token_expiration_days = config.refresh_token_expiration_days,
        time_zone = %config.time_zone,
        "Loaded configuration from environment/.env"
    );

    // Initialize database
    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let state = AppState::new(pool, config);

    // Public routes (no auth): login flow plus the unit/post catalog the
    // login screen renders before any session exists.
    let public_routes = Router::new()
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/refresh", post(handlers::auth::refresh))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/units", get(handlers::units::list_units))
        .route("/api/posts", get(handlers::posts::list_posts));

    // Authenticated routes: any valid session.
    let user_routes = Router::new()
        .route("/api/auth/me", get(handlers::auth::me))
        .route(
            "/api/attendance/check-in",
            post(handlers::attendance::check_in),
        )
        .route(
            "/api/attendance/check-out",
            post(handlers::attendance::check_out),
        )
        .route(
            "/api/attendance/current",
            get(handlers::attendance::current_attendance),
        )
        .route("/api/attendance", get(handlers::attendance::list_attendance))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::auth,
        ));

    // History-gated routes: cross-user data leaves through here.
    let history_routes = Router::new()
        .route(
            "/api/attendance/export",
            get(handlers::export::export_attendance),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::auth_history,
        ));

    let map_routes = Router::new()
        .route("/api/attendance/map", get(handlers::attendance::map_feed))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::auth_map,
        ));

    // Admin routes: master data mutations.
    let admin_routes = Router::new()
        .route(
            "/api/admin/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route(
            "/api/admin/users/{id}",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
        .route("/api/admin/units", post(handlers::units::create_unit))
        .route(
            "/api/admin/units/{id}",
            get(handlers::units::get_unit)
                .put(handlers::units::update_unit)
                .delete(handlers::units::delete_unit),
        )
        .route("/api/admin/posts", post(handlers::posts::create_post))
        .route(
            "/api/admin/posts/{id}",
            axum::routing::put(handlers::posts::update_post).delete(handlers::posts::delete_post),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::auth_admin,
        ));

    // Compose app with shared layers (CORS/Trace) and shared state
    let app = Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(history_routes)
        .merge(map_routes)
        .merge(admin_routes)
        .merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([
                            Method::GET,
                            Method::POST,
                            Method::PUT,
                            Method::DELETE,
                            Method::OPTIONS,
                        ])
                        .allow_headers(Any)
                        .max_age(std::time::Duration::from_secs(24 * 60 * 60)),
                ),
        )
        .with_state(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
