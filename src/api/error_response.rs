//! HTTP error response handling for the API
//!
//! Converts domain errors into HTTP responses with a status code derived from
//! [`ToHttpStatus`] and a JSON [`ApiError`] body.

use crate::error::{ApiError, Error, ToHttpStatus};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status_code.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
        } else {
            tracing::debug!(error = %self, code = self.error_code(), "request rejected");
        }

        let api_error: ApiError = self.into();
        (status_code, Json(api_error)).into_response()
    }
}
