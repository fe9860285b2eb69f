//! # media-dl
//!
//! Media download service: inspect a media URL, start a background download,
//! and poll its progress until it finishes or fails.
//!
//! Extraction and downloading are delegated to an external engine (`yt-dlp`)
//! behind the [`engine::MediaEngine`] trait. The crate itself owns the job
//! lifecycle: every accepted download gets a [`JobId`], runs on its own
//! execution unit, and publishes [`JobStatus`] snapshots that any number of
//! clients can read concurrently.
//!
//! ## Quick Start
//!
//! ```no_run
//! use media_dl::{Config, JobService, JobStatus};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let jobs = JobService::new(Config::default()).await?;
//!
//!     let id = jobs.start_download("https://vimeo.com/76979871", None, "audio")?;
//!     loop {
//!         match jobs.get_status(&id) {
//!             JobStatus::Finished { filename, .. } => break println!("saved {filename}"),
//!             JobStatus::Error { message } => break eprintln!("failed: {message}"),
//!             _ => tokio::time::sleep(std::time::Duration::from_millis(500)).await,
//!         }
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// External extraction engine
pub mod engine;
/// Error types
pub mod error;
/// Download jobs and progress tracking
pub mod jobs;
/// Core types and events
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use engine::{MediaEngine, NoOpEngine, YtDlpEngine};
pub use error::{ApiError, Error, ErrorDetail, Result, ToHttpStatus};
pub use jobs::{JobRegistry, JobService};
pub use types::{Event, FormatInfo, JobId, JobStatus, MediaInfo};

/// Serve the REST API until a termination signal arrives.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// In-flight HTTP requests are drained. Running downloads are not awaited;
/// there is no cancellation, so they end with the process.
///
/// # Example
///
/// ```no_run
/// use media_dl::{Config, JobService, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let jobs = JobService::new(Config::default()).await?;
///     run_with_shutdown(jobs).await?;
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(jobs: JobService) -> Result<()> {
    let config = jobs.config();
    api::serve_with_shutdown(jobs, config, wait_for_signal()).await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{Signal, SignalKind, signal};

    async fn next(signal: &mut Option<Signal>) -> Option<()> {
        match signal {
            Some(signal) => signal.recv().await,
            None => std::future::pending().await,
        }
    }

    // Registration can fail in restricted environments (containers, tests)
    let register = |kind: SignalKind, name: &str| {
        signal(kind)
            .inspect_err(|e| tracing::warn!(error = %e, "Could not register {} handler", name))
            .ok()
    };
    let mut sigterm = register(SignalKind::terminate(), "SIGTERM");
    let mut sigint = register(SignalKind::interrupt(), "SIGINT");

    if sigterm.is_none() && sigint.is_none() {
        tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
        tokio::signal::ctrl_c().await.ok();
        return;
    }

    tokio::select! {
        Some(()) = next(&mut sigterm) => tracing::info!("Received SIGTERM signal"),
        Some(()) = next(&mut sigint) => tracing::info!("Received SIGINT signal (Ctrl+C)"),
        else => tracing::warn!("Signal streams closed"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
