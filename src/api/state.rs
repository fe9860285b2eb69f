//! Application state for the API server

use crate::{Config, JobService};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned per request; every field is a cheap handle.
#[derive(Clone)]
pub struct AppState {
    /// Job orchestration, info extraction and file lookup
    pub jobs: JobService,

    /// Configuration (read-only at runtime)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(jobs: JobService, config: Arc<Config>) -> Self {
        Self { jobs, config }
    }
}
