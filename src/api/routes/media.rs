//! Media info and supported-site handlers.

use super::{InfoRequest, SupportedSitesResponse, json_body};
use crate::api::AppState;
use crate::types::MediaInfo;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

/// POST /get_info - Resolve media metadata and formats
#[utoipa::path(
    post,
    path = "/get_info",
    tag = "media",
    request_body = InfoRequest,
    responses(
        (status = 200, description = "Media metadata", body = MediaInfo),
        (status = 400, description = "Empty or malformed URL, or extraction failed", body = crate::error::ApiError)
    )
)]
pub async fn get_info(
    State(state): State<AppState>,
    payload: Result<Json<InfoRequest>, JsonRejection>,
) -> crate::Result<Json<MediaInfo>> {
    let request = json_body(payload)?;
    let info = state.jobs.get_info(&request.url).await?;
    Ok(Json(info))
}

/// GET /supported_sites - Curated list of supported sites
#[utoipa::path(
    get,
    path = "/supported_sites",
    tag = "media",
    responses(
        (status = 200, description = "Supported site names", body = SupportedSitesResponse)
    )
)]
pub async fn supported_sites(State(state): State<AppState>) -> Json<SupportedSitesResponse> {
    Json(SupportedSitesResponse {
        sites: state.jobs.supported_sites().await,
    })
}
