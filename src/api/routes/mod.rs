//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`downloads`] - Starting downloads, polling progress, fetching files
//! - [`media`] - Media info extraction and the supported-site listing
//! - [`system`] - Health, events, OpenAPI

use crate::types::JobId;
use axum::{Json, extract::rejection::JsonRejection};
use serde::{Deserialize, Serialize};

mod downloads;
mod media;
mod system;

pub use downloads::*;
pub use media::*;
pub use system::*;

// ============================================================================
// Request/Response Types (shared across handlers)
// ============================================================================

/// Request body for POST /get_info
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct InfoRequest {
    /// Media page URL
    #[serde(default)]
    pub url: String,
}

/// Request body for POST /download
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct StartDownloadRequest {
    /// Media page URL
    #[serde(default)]
    pub url: String,

    /// Engine format id from `/get_info`, used verbatim when present
    #[serde(default)]
    pub format_id: Option<String>,

    /// `"audio"` to extract audio; anything else selects the best stream unless `format_id` is set
    #[serde(default = "default_quality")]
    pub quality: String,
}

fn default_quality() -> String {
    crate::jobs::QUALITY_BEST.to_string()
}

/// Response for POST /download
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct StartDownloadResponse {
    /// Identifier to poll `/progress/{download_id}` with
    pub download_id: JobId,
}

/// Response for GET /supported_sites
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct SupportedSitesResponse {
    /// Curated site names
    pub sites: Vec<String>,
}

/// Response for GET /health
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    /// Always "ok"
    pub status: String,
    /// Server version
    pub version: String,
    /// Active media engine ("yt-dlp" or "noop")
    pub engine: String,
    /// Jobs accepted since startup
    pub jobs: usize,
}

/// Unwrap a JSON body, turning malformed input into `InvalidRequest`
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> crate::Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| crate::Error::InvalidRequest(rejection.body_text()))
}
