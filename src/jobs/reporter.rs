//! Translation of raw engine progress into job status updates

use super::registry::JobRegistry;
use crate::engine::{ProgressEvent, ProgressKind, ProgressSink};
use crate::types::{Event, JobId, JobStatus};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;

/// Placeholder for speed/ETA the engine did not report
const UNKNOWN_METRIC: &str = "N/A";

/// Placeholder for a filename the engine did not report
const UNKNOWN_FILENAME: &str = "Unknown";

/// Progress sink bound to a single job
///
/// Sanitizes engine telemetry into [`JobStatus`] values, stores them in the
/// [`JobRegistry`] and mirrors them on the event channel. Once the job reaches
/// a terminal status every later report is dropped.
pub struct ProgressReporter {
    job_id: JobId,
    registry: Arc<JobRegistry>,
    events: broadcast::Sender<Event>,
    closed: AtomicBool,
}

impl ProgressReporter {
    /// Create a reporter writing to `registry` under `job_id`
    pub fn new(job_id: JobId, registry: Arc<JobRegistry>, events: broadcast::Sender<Event>) -> Self {
        Self {
            job_id,
            registry,
            events,
            closed: AtomicBool::new(false),
        }
    }

    /// The job this reporter writes to
    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    /// Whether the job has reached a terminal status through this reporter
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Record a terminal failure
    ///
    /// Returns `false` when the job was already terminal and nothing was written.
    pub fn fail(&self, message: impl Into<String>) -> bool {
        if self.closed.swap(true, Ordering::SeqCst) {
            return false;
        }
        let message = message.into();
        tracing::warn!(job_id = %self.job_id, error = %message, "download failed");
        self.registry.set(self.job_id, JobStatus::error(message.clone()));
        self.emit(Event::JobFailed {
            id: self.job_id,
            error: message,
        });
        true
    }

    fn on_downloading(&self, event: ProgressEvent) {
        let percent = parse_percent(event.percent.as_deref());
        let speed = event.speed.unwrap_or_else(|| UNKNOWN_METRIC.to_string());
        let eta = event.eta.unwrap_or_else(|| UNKNOWN_METRIC.to_string());
        let filename = event
            .filename
            .as_deref()
            .map(display_name)
            .unwrap_or_else(|| UNKNOWN_FILENAME.to_string());

        self.registry.set(
            self.job_id,
            JobStatus::Downloading {
                percent,
                speed: speed.clone(),
                eta: eta.clone(),
                filename,
            },
        );
        self.emit(Event::JobProgress {
            id: self.job_id,
            percent,
            speed,
            eta,
        });
    }

    fn on_finished(&self, event: ProgressEvent) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let filepath = event
            .filename
            .unwrap_or_else(|| UNKNOWN_FILENAME.to_string());
        let filename = display_name(&filepath);

        tracing::info!(job_id = %self.job_id, file = %filepath, "download finished");
        self.registry
            .set(self.job_id, JobStatus::finished(filename.clone(), filepath));
        self.emit(Event::JobFinished {
            id: self.job_id,
            filename,
        });
    }

    fn emit(&self, event: Event) {
        // No subscribers is the normal case
        let _ = self.events.send(event);
    }
}

impl ProgressSink for ProgressReporter {
    fn report(&self, event: ProgressEvent) {
        if self.is_closed() {
            tracing::debug!(job_id = %self.job_id, "ignoring progress after terminal status");
            return;
        }

        match event.kind {
            ProgressKind::Downloading => self.on_downloading(event),
            ProgressKind::Finished => self.on_finished(event),
            ProgressKind::Other(ref kind) => {
                tracing::trace!(job_id = %self.job_id, kind = %kind, "ignoring progress event");
            }
        }
    }
}

/// Parse engine percent text such as `" 45.3%"`
///
/// Anything unparseable becomes 0; the result is clamped to `[0, 100]`.
pub(crate) fn parse_percent(raw: Option<&str>) -> f64 {
    let value = raw
        .map(|s| s.trim().trim_end_matches('%').trim())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0);
    value.clamp(0.0, 100.0)
}

/// File name component of an engine-reported path
fn display_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}
