//! OpenAPI documentation and schema generation
//!
//! The specification is generated at compile time with utoipa.

use utoipa::OpenApi;

/// OpenAPI documentation for the media-dl REST API
///
/// The document can be accessed via:
/// - `/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "media-dl REST API",
        version = "0.1.0",
        description = "REST API for inspecting media URLs, starting background downloads and polling their progress",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    paths(
        // Media
        crate::api::routes::get_info,
        crate::api::routes::supported_sites,

        // Downloads
        crate::api::routes::start_download,
        crate::api::routes::get_progress,
        crate::api::routes::download_file,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
    ),
    components(schemas(
        // Core types from types.rs
        crate::types::JobId,
        crate::types::JobStatus,
        crate::types::MediaInfo,
        crate::types::FormatInfo,
        crate::types::Event,

        // API request/response types from routes
        crate::api::routes::InfoRequest,
        crate::api::routes::StartDownloadRequest,
        crate::api::routes::StartDownloadResponse,
        crate::api::routes::SupportedSitesResponse,
        crate::api::routes::HealthResponse,

        // Error types from error.rs
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "media", description = "Media inspection - Resolve metadata and formats, list supported sites"),
        (name = "downloads", description = "Downloads - Start background downloads, poll progress, fetch files"),
        (name = "system", description = "System endpoints - Health checks, OpenAPI spec, events"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Registers the `X-Api-Key` header scheme
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = &mut openapi.components {
            components.add_security_scheme(
                "api_key",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Header(
                        utoipa::openapi::security::ApiKeyValue::new("X-Api-Key"),
                    ),
                ),
            );
        }
    }
}
