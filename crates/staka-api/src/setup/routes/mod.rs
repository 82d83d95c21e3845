//! Route configuration and setup.

use crate::api_doc::ApiDoc;
use crate::handlers;
use crate::middleware::{admin_auth_middleware, request_id_middleware, AdminAuthState};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, patch, post},
    Json, Router,
};
use staka_core::Config;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Room for multipart boundaries and the non-file fields on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;
const HTTP_CONCURRENCY_LIMIT: usize = 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let auth_state = Arc::new(AdminAuthState {
        admin_api_key: config.admin_api_key.clone(),
    });
    let body_limit = config
        .max_upload_size_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let admin = admin_routes(body_limit).layer(axum::middleware::from_fn_with_state(
        auth_state,
        admin_auth_middleware,
    ));

    let app = public_routes()
        .merge(admin)
        .route(
            "/api/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .merge(utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"))
        .nest_service("/uploads", ServeDir::new(&config.uploads_dir))
        .layer(ConcurrencyLimitLayer::new(HTTP_CONCURRENCY_LIMIT))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state);

    Ok(app)
}

fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tarifs", get(handlers::tariffs::list_public_tariffs))
        .route("/health", get(handlers::health::health_check))
        .route("/health/ready", get(handlers::health::readiness_check))
}

fn admin_routes(body_limit: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/admin/tarifs",
            get(handlers::admin_tariffs::list_tariffs).post(handlers::admin_tariffs::create_tariff),
        )
        .route(
            "/admin/tarifs/{id}",
            get(handlers::admin_tariffs::get_tariff)
                .put(handlers::admin_tariffs::update_tariff)
                .delete(handlers::admin_tariffs::delete_tariff),
        )
        .route(
            "/admin/tarifs/{id}/toggle",
            patch(handlers::admin_tariffs::toggle_tariff),
        )
        .route(
            "/admin/files",
            post(handlers::files::upload_admin_file).layer(DefaultBodyLimit::max(body_limit)),
        )
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
