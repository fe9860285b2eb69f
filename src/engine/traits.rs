//! Traits and types for the media extraction engine

use crate::types::MediaInfo;
use async_trait::async_trait;
use std::path::PathBuf;

/// Kind of a raw progress event emitted by an engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressKind {
    /// Bytes are being fetched
    Downloading,
    /// The output file is complete
    Finished,
    /// Any other engine phase; consumers ignore these
    Other(String),
}

impl From<&str> for ProgressKind {
    fn from(kind: &str) -> Self {
        match kind {
            "downloading" => ProgressKind::Downloading,
            "finished" => ProgressKind::Finished,
            other => ProgressKind::Other(other.to_string()),
        }
    }
}

/// Raw telemetry payload from an engine
///
/// Every field except `kind` is optional and unvalidated. Percent arrives as
/// engine-formatted text (e.g. `" 45.3%"`), exactly as the engine rendered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    /// What the engine is reporting
    pub kind: ProgressKind,
    /// Percentage text, if any
    pub percent: Option<String>,
    /// Speed text, if any
    pub speed: Option<String>,
    /// ETA text, if any
    pub eta: Option<String>,
    /// File path the engine is writing or has written
    pub filename: Option<String>,
}

impl ProgressEvent {
    /// A `downloading` event carrying only a percentage
    pub fn downloading(percent: impl Into<String>) -> Self {
        Self {
            kind: ProgressKind::Downloading,
            percent: Some(percent.into()),
            speed: None,
            eta: None,
            filename: None,
        }
    }

    /// A `finished` event for the given output path
    pub fn finished(filename: impl Into<String>) -> Self {
        Self {
            kind: ProgressKind::Finished,
            percent: None,
            speed: None,
            eta: None,
            filename: Some(filename.into()),
        }
    }

    /// Attach a speed string
    pub fn with_speed(mut self, speed: impl Into<String>) -> Self {
        self.speed = Some(speed.into());
        self
    }

    /// Attach an ETA string
    pub fn with_eta(mut self, eta: impl Into<String>) -> Self {
        self.eta = Some(eta.into());
        self
    }

    /// Attach a filename
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

/// Receiver of engine progress events
///
/// Called synchronously from inside [`MediaEngine::download`], possibly many
/// times per second. Implementations must not panic and have no way to fail
/// the download.
pub trait ProgressSink: Send + Sync {
    /// Handle one progress event
    fn report(&self, event: ProgressEvent);
}

/// Which stream(s) the engine should fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatSelection {
    /// The engine's best combined stream
    Best,
    /// A format identifier passed to the engine verbatim
    Explicit(String),
    /// Best audio stream, transcoded afterwards
    Audio {
        /// Target codec (e.g. "mp3")
        codec: String,
        /// Target quality tier (e.g. "192")
        quality: String,
    },
}

impl FormatSelection {
    /// Format expression handed to the engine
    pub fn format_spec(&self) -> &str {
        match self {
            FormatSelection::Best => "best",
            FormatSelection::Explicit(id) => id,
            FormatSelection::Audio { .. } => "bestaudio/best",
        }
    }
}

/// Everything an engine needs to perform one download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    /// Source URL
    pub url: String,
    /// Output path template, e.g. `downloads/%(title)s.%(ext)s`
    pub output_template: PathBuf,
    /// Stream selection and post-processing
    pub format: FormatSelection,
}

/// External media extraction/download engine
///
/// Implementations resolve media metadata, list the sites they support, and
/// perform downloads while reporting progress through a [`ProgressSink`].
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Resolve metadata and available formats for a URL without downloading
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Extraction`] when the URL cannot be resolved.
    async fn extract_info(&self, url: &str) -> crate::Result<MediaInfo>;

    /// Download a URL, blocking the calling thread until done
    ///
    /// Progress is delivered to `progress` in the order the engine produces
    /// it. A successful download ends with exactly one `finished` event.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Download`] with the engine's failure message.
    fn download(&self, request: &DownloadRequest, progress: &dyn ProgressSink)
    -> crate::Result<()>;

    /// Names of all extractors the engine ships, in engine order
    async fn list_extractors(&self) -> crate::Result<Vec<String>>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
