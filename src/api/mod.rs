//! REST API server module
//!
//! Serves the download endpoints at the root path, plus health, events and
//! OpenAPI documentation.

use crate::{Config, JobService, Result};
use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Media
/// - `POST /get_info` - Resolve metadata and formats for a URL
/// - `GET /supported_sites` - Curated supported-site names
///
/// ## Downloads
/// - `POST /download` - Start a background download
/// - `GET /progress/:download_id` - Poll a download's status
/// - `GET /download_file/:filename` - Fetch a finished file
///
/// ## System
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
/// - `GET /events` - Server-sent events stream
pub fn create_router(jobs: JobService, config: Arc<Config>) -> Router {
    let state = AppState::new(jobs, config.clone());

    let router = Router::new()
        // Media
        .route("/get_info", post(routes::get_info))
        .route("/supported_sites", get(routes::supported_sites))
        // Downloads
        .route("/download", post(routes::start_download))
        .route("/progress/:download_id", get(routes::get_progress))
        .route("/download_file/:filename", get(routes::download_file))
        // System
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec))
        .route("/events", get(routes::event_stream));

    // SwaggerUi registers its own copy of the OpenAPI document under /api-docs
    let router = if config.server.api.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    let router = router.with_state(state);

    // The last layer applied is the outermost: Trace -> CORS -> Auth -> Handler
    let router = match &config.server.api.api_key {
        Some(key) => router.layer(middleware::from_fn_with_state(
            auth::ApiKey::new(key.as_str()),
            auth::require_api_key,
        )),
        None => router,
    };

    let router = if config.server.api.cors_enabled {
        router.layer(build_cors_layer(&config.server.api.cors_origins))
    } else {
        router
    };

    router.layer(TraceLayer::new_for_http())
}

/// Build a CORS layer based on configured origins
///
/// `"*"` or an empty list allows any origin; otherwise only the listed ones.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    let cors = if allow_any || origins.is_empty() {
        CorsLayer::new().allow_origin(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new().allow_origin(AllowOrigin::list(allowed))
    };

    cors.allow_methods(Any).allow_headers(Any)
}

/// Start the API server on the configured bind address.
///
/// Runs until the server fails; see [`serve_with_shutdown`] for a server that
/// stops on a signal.
///
/// # Example
///
/// ```no_run
/// use media_dl::{Config, JobService};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let jobs = JobService::new((*config).clone()).await?;
///
/// media_dl::api::start_api_server(jobs, config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(jobs: JobService, config: Arc<Config>) -> Result<()> {
    serve_with_shutdown(jobs, config, std::future::pending()).await
}

/// Serve the API until `shutdown` resolves, then drain in-flight requests
pub async fn serve_with_shutdown<F>(jobs: JobService, config: Arc<Config>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let bind_address = config.server.api.bind_address;

    tracing::info!(address = %bind_address, "Starting API server");

    let app = create_router(jobs, config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(
        address = %listener.local_addr().unwrap_or(bind_address),
        "API server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
