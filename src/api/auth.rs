//! Authentication middleware for the REST API
//!
//! When `ApiConfig::api_key` is set, requests must carry a matching
//! `X-Api-Key` header. The health check stays reachable without a key.

use crate::error::ApiError;
use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Paths served without authentication
const PUBLIC_PATHS: &[&str] = &["/health"];

/// Key the middleware checks requests against
#[derive(Clone)]
pub struct ApiKey(Arc<str>);

impl ApiKey {
    /// Wrap the configured key
    pub fn new(key: impl Into<Arc<str>>) -> Self {
        Self(key.into())
    }
}

/// Reject requests whose `X-Api-Key` header does not match the configured key
///
/// # Examples
///
/// ```no_run
/// use axum::{Router, middleware};
/// use media_dl::api::auth::{ApiKey, require_api_key};
///
/// let router: Router = Router::new().layer(middleware::from_fn_with_state(
///     ApiKey::new("secret-key-123"),
///     require_api_key,
/// ));
/// ```
pub async fn require_api_key(
    State(expected): State<ApiKey>,
    request: Request,
    next: Next,
) -> Response {
    if PUBLIC_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    match provided {
        Some(key) if constant_time_eq(key.as_bytes(), expected.0.as_bytes()) => {
            next.run(request).await
        }
        Some(_) => unauthorized("Invalid API key"),
        None => unauthorized("Missing X-Api-Key header"),
    }
}

/// Byte comparison whose duration does not depend on where inputs differ
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn unauthorized(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(ApiError::unauthorized(message))).into_response()
}
