//! Download handlers: start, progress polling, file retrieval.

use super::{StartDownloadRequest, StartDownloadResponse, json_body};
use crate::api::AppState;
use crate::types::{JobId, JobStatus};
use axum::{
    Json,
    body::Body,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;

/// POST /download - Start a background download
#[utoipa::path(
    post,
    path = "/download",
    tag = "downloads",
    request_body = StartDownloadRequest,
    responses(
        (status = 200, description = "Download accepted", body = StartDownloadResponse),
        (status = 400, description = "URL is empty", body = crate::error::ApiError)
    )
)]
pub async fn start_download(
    State(state): State<AppState>,
    payload: Result<Json<StartDownloadRequest>, JsonRejection>,
) -> crate::Result<Json<StartDownloadResponse>> {
    let request = json_body(payload)?;
    let download_id = state.jobs.start_download(
        &request.url,
        request.format_id.as_deref(),
        &request.quality,
    )?;
    Ok(Json(StartDownloadResponse { download_id }))
}

/// GET /progress/:download_id - Current status of a download
///
/// Unknown or unparseable ids answer `{"status": "not_found"}` with 200.
#[utoipa::path(
    get,
    path = "/progress/{download_id}",
    tag = "downloads",
    params(
        ("download_id" = String, Path, description = "Id returned by POST /download")
    ),
    responses(
        (status = 200, description = "Current job status", body = JobStatus)
    )
)]
pub async fn get_progress(
    State(state): State<AppState>,
    Path(download_id): Path<String>,
) -> Json<JobStatus> {
    let status = match download_id.parse::<JobId>() {
        Ok(id) => state.jobs.get_status(&id),
        Err(_) => JobStatus::NotFound,
    };
    Json(status)
}

/// GET /download_file/:filename - Fetch a finished file as an attachment
#[utoipa::path(
    get,
    path = "/download_file/{filename}",
    tag = "downloads",
    params(
        ("filename" = String, Path, description = "File name inside the downloads directory")
    ),
    responses(
        (status = 200, description = "File contents", content_type = "application/octet-stream"),
        (status = 404, description = "File not found", body = crate::error::ApiError)
    )
)]
pub async fn download_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> crate::Result<Response> {
    let path = state.jobs.resolve_download_file(&filename).await?;
    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|_| crate::Error::FileNotFound(filename.clone()))?;
    let len = file.metadata().await?.len();

    tracing::debug!(file = %path.display(), bytes = len, "serving download");

    let mut response = Body::from_stream(ReaderStream::new(file)).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    if let Ok(disposition) = HeaderValue::from_str(&content_disposition(&filename)) {
        headers.insert(header::CONTENT_DISPOSITION, disposition);
    }
    Ok(response)
}

/// `attachment` disposition carrying the file name
///
/// Non-ASCII names get an RFC 5987 `filename*` alongside an ASCII fallback.
pub(crate) fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();

    if fallback == filename {
        return format!("attachment; filename=\"{fallback}\"");
    }

    let encoded = urlencoding::encode(filename);
    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}
