//! Core types for media-dl

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Unique identifier for a download job
///
/// Random 128-bit value rendered as a hyphenated UUID string. Never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String)]
pub struct JobId(pub Uuid);

impl JobId {
    /// Generate a fresh random JobId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Lifecycle snapshot of a download job
///
/// `Finished` and `Error` are terminal: once stored, nothing writes to the
/// job again. `NotFound` is only ever produced by a lookup and never stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    /// Accepted, no progress reported yet
    Starting {
        /// Always 0
        percent: f64,
    },

    /// Engine is fetching data
    Downloading {
        /// Progress percentage (0.0 to 100.0)
        percent: f64,
        /// Engine-formatted speed, "N/A" when unknown
        speed: String,
        /// Engine-formatted ETA, "N/A" when unknown
        eta: String,
        /// File currently being written, "Unknown" when not reported
        filename: String,
    },

    /// Download (and any post-processing) completed
    Finished {
        /// Always 100
        percent: f64,
        /// File name inside the downloads directory
        filename: String,
        /// Full path of the produced file
        filepath: String,
    },

    /// Engine failed; the job will not progress further
    Error {
        /// Failure message reported by the engine
        #[serde(rename = "error")]
        message: String,
    },

    /// No job with the requested id exists
    NotFound,
}

impl JobStatus {
    /// Initial status seeded when a job is accepted
    pub fn starting() -> Self {
        JobStatus::Starting { percent: 0.0 }
    }

    /// Terminal success status
    pub fn finished(filename: impl Into<String>, filepath: impl Into<String>) -> Self {
        JobStatus::Finished {
            percent: 100.0,
            filename: filename.into(),
            filepath: filepath.into(),
        }
    }

    /// Terminal failure status
    pub fn error(message: impl Into<String>) -> Self {
        JobStatus::Error {
            message: message.into(),
        }
    }

    /// Whether no further updates may follow this status
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Finished { .. } | JobStatus::Error { .. })
    }

    /// Progress percentage, if this phase carries one
    pub fn percent(&self) -> Option<f64> {
        match self {
            JobStatus::Starting { percent }
            | JobStatus::Downloading { percent, .. }
            | JobStatus::Finished { percent, .. } => Some(*percent),
            JobStatus::Error { .. } | JobStatus::NotFound => None,
        }
    }
}

/// Media metadata returned by `POST /get_info`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MediaInfo {
    /// Media title ("Unknown" when the engine reports none)
    pub title: String,
    /// Thumbnail URL
    pub thumbnail: Option<String>,
    /// Duration in seconds
    pub duration: Option<f64>,
    /// Uploader / channel name
    pub uploader: Option<String>,
    /// Engine extractor that handled the URL (e.g. "Youtube")
    pub platform: String,
    /// Downloadable formats that carry audio and/or video
    pub formats: Vec<FormatInfo>,
}

/// One downloadable format of a media item
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FormatInfo {
    /// Engine format identifier, usable as `format_id` in `POST /download`
    pub format_id: Option<String>,
    /// Container extension
    pub ext: Option<String>,
    /// Human-readable quality label
    pub quality: String,
    /// Size in bytes when known
    pub filesize: Option<u64>,
    /// Video codec ("none" for audio-only)
    pub vcodec: Option<String>,
    /// Audio codec ("none" for video-only)
    pub acodec: Option<String>,
}

/// Event emitted during a job's lifecycle
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Job accepted and handed to a runner
    JobStarted {
        /// Job ID
        id: JobId,
        /// Source URL
        url: String,
    },

    /// Progress update from the engine
    JobProgress {
        /// Job ID
        id: JobId,
        /// Progress percentage (0.0 to 100.0)
        percent: f64,
        /// Engine-formatted speed
        speed: String,
        /// Engine-formatted ETA
        eta: String,
    },

    /// Job completed
    JobFinished {
        /// Job ID
        id: JobId,
        /// File name inside the downloads directory
        filename: String,
    },

    /// Job failed
    JobFailed {
        /// Job ID
        id: JobId,
        /// Failure message
        error: String,
    },
}

impl Event {
    /// Event name used for the SSE `event:` field
    pub fn name(&self) -> &'static str {
        match self {
            Event::JobStarted { .. } => "job_started",
            Event::JobProgress { .. } => "job_progress",
            Event::JobFinished { .. } => "job_finished",
            Event::JobFailed { .. } => "job_failed",
        }
    }
}
