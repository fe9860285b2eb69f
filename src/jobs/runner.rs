//! Detached execution of a single download

use super::reporter::ProgressReporter;
use crate::config::AudioConfig;
use crate::engine::{DownloadRequest, FormatSelection, MediaEngine};
use crate::error::Error;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;
use std::sync::Arc;

/// Quality selector requesting best audio transcoded to the configured codec
pub const QUALITY_AUDIO: &str = "audio";

/// Quality selector requesting the engine's best combined stream
pub const QUALITY_BEST: &str = "best";

/// Output file name template, relative to the downloads directory
const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

/// Map the client's format/quality selection onto an engine format selection
///
/// `quality = "audio"` wins over an explicit format id, since it also requests
/// the transcode step. Without a format id every other quality falls back to
/// the engine's best stream.
pub(crate) fn select_format(
    format_id: Option<&str>,
    quality: &str,
    audio: &AudioConfig,
) -> FormatSelection {
    let quality = quality.trim();
    if quality.eq_ignore_ascii_case(QUALITY_AUDIO) {
        return FormatSelection::Audio {
            codec: audio.codec.clone(),
            quality: audio.quality.clone(),
        };
    }

    if let Some(id) = format_id.map(str::trim).filter(|id| !id.is_empty()) {
        return FormatSelection::Explicit(id.to_string());
    }

    FormatSelection::Best
}

/// Build the engine request for one job
pub(crate) fn build_request(
    url: &str,
    format_id: Option<&str>,
    quality: &str,
    download_dir: &Path,
    audio: &AudioConfig,
) -> DownloadRequest {
    DownloadRequest {
        url: url.to_string(),
        output_template: download_dir.join(OUTPUT_TEMPLATE),
        format: select_format(format_id, quality, audio),
    }
}

/// One download, run to completion or failure off the request path
pub struct JobRunner {
    request: DownloadRequest,
    engine: Arc<dyn MediaEngine>,
    reporter: ProgressReporter,
}

impl JobRunner {
    /// Bind a request and engine to the job's reporter
    pub fn new(
        request: DownloadRequest,
        engine: Arc<dyn MediaEngine>,
        reporter: ProgressReporter,
    ) -> Self {
        Self {
            request,
            engine,
            reporter,
        }
    }

    /// Start the download on a blocking-capable execution unit and return
    ///
    /// Uses the tokio blocking pool when called inside a runtime, a dedicated
    /// OS thread otherwise. If no execution unit can be obtained the job is
    /// marked failed immediately.
    pub fn spawn(self) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                // Detached; the runner records its own outcome.
                drop(handle.spawn_blocking(move || self.run()));
            }
            Err(_) => self.spawn_thread(),
        }
    }

    fn spawn_thread(self) {
        let job_id = self.reporter.job_id();
        let reporter = Arc::new(self.reporter);
        let thread_reporter = Arc::clone(&reporter);
        let request = self.request;
        let engine = self.engine;

        let spawned = std::thread::Builder::new()
            .name(format!("media-dl-job-{job_id}"))
            .spawn(move || run_download(&request, engine.as_ref(), thread_reporter.as_ref()));

        if let Err(e) = spawned {
            tracing::error!(job_id = %job_id, error = %e, "failed to spawn download thread");
            reporter.fail(format!("failed to start download: {e}"));
        }
    }

    /// Run the download on the current thread
    ///
    /// Never returns an error and never unwinds: engine failures and panics
    /// are written to the job's status.
    pub fn run(self) {
        run_download(&self.request, self.engine.as_ref(), &self.reporter);
    }
}

fn run_download(request: &DownloadRequest, engine: &dyn MediaEngine, reporter: &ProgressReporter) {
    let job_id = reporter.job_id();
    tracing::info!(
        job_id = %job_id,
        url = %request.url,
        format = %request.format.format_spec(),
        engine = engine.name(),
        "download started"
    );

    let outcome = catch_unwind(AssertUnwindSafe(|| engine.download(request, reporter)));

    match outcome {
        Ok(Ok(())) => {
            if !reporter.is_closed() {
                tracing::warn!(job_id = %job_id, "engine returned without a finished event");
            }
        }
        Ok(Err(e)) => {
            reporter.fail(failure_message(e));
        }
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "download panicked".to_string());
            tracing::error!(job_id = %job_id, panic = %message, "engine panicked");
            reporter.fail(message);
        }
    }
}

/// Message stored in the job status; engine download failures are kept verbatim
fn failure_message(error: Error) -> String {
    match error {
        Error::Download(message) => message,
        other => other.to_string(),
    }
}
