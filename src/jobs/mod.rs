//! Asynchronous download jobs and their progress tracking.
//!
//! A download request becomes a job in three steps:
//! - [`registry`] - the shared [`JobRegistry`] every status poll reads from
//! - [`reporter`] - the [`ProgressReporter`] the engine calls while downloading
//! - [`runner`] - the [`JobRunner`] that executes the engine off the request path
//!
//! [`JobService`] ties them together and is what the API layer talks to.

mod registry;
mod reporter;
mod runner;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

pub use registry::JobRegistry;
pub use reporter::ProgressReporter;
pub use runner::{JobRunner, QUALITY_AUDIO, QUALITY_BEST};

use crate::config::Config;
use crate::engine::{self, MediaEngine};
use crate::error::{Error, Result};
use crate::types::{Event, JobId, JobStatus, MediaInfo};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Capacity of the event channel; slow subscribers see `Lagged` beyond this
const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Entry point for starting downloads and observing them
///
/// Cheap to clone; all clones share one registry, engine and event channel.
#[derive(Clone)]
pub struct JobService {
    registry: Arc<JobRegistry>,
    engine: Arc<dyn MediaEngine>,
    config: Arc<Config>,
    event_tx: broadcast::Sender<Event>,
}

impl JobService {
    /// Create a service, detecting the engine from the tools configuration
    ///
    /// # Errors
    ///
    /// Fails when the download directory cannot be created.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use media_dl::{JobService, config::Config};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let service = JobService::new(Config::default()).await?;
    /// let id = service.start_download("https://vimeo.com/76979871", None, "best")?;
    /// println!("{:?}", service.get_status(&id));
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new(config: Config) -> Result<Self> {
        let engine = engine::detect(&config.tools);
        Self::with_engine(config, engine).await
    }

    /// Create a service around a specific engine
    pub async fn with_engine(config: Config, engine: Arc<dyn MediaEngine>) -> Result<Self> {
        tokio::fs::create_dir_all(config.download_dir())
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create download directory '{}': {}",
                        config.download_dir().display(),
                        e
                    ),
                ))
            })?;

        let (event_tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        tracing::info!(
            engine = engine.name(),
            download_dir = %config.download_dir().display(),
            "job service ready"
        );

        Ok(Self {
            registry: Arc::new(JobRegistry::new()),
            engine,
            config: Arc::new(config),
            event_tx,
        })
    }

    /// Accept a download and start it in the background
    ///
    /// Returns as soon as the job is registered; the download itself runs on
    /// a separate execution unit and is observed through [`get_status`].
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRequest`] when `url` is blank. No job is created then.
    ///
    /// [`get_status`]: JobService::get_status
    pub fn start_download(&self, url: &str, format_id: Option<&str>, quality: &str) -> Result<JobId> {
        let url = url.trim();
        if url.is_empty() {
            return Err(Error::InvalidRequest("URL is required".into()));
        }

        let id = JobId::new();
        self.registry.create(id);

        let request = runner::build_request(
            url,
            format_id,
            quality,
            self.config.download_dir(),
            &self.config.download.audio,
        );
        let reporter = ProgressReporter::new(id, Arc::clone(&self.registry), self.event_tx.clone());

        tracing::info!(job_id = %id, url = %url, quality = %quality, "download accepted");
        self.emit_event(Event::JobStarted {
            id,
            url: url.to_string(),
        });

        JobRunner::new(request, Arc::clone(&self.engine), reporter).spawn();
        Ok(id)
    }

    /// Current status of a job, [`JobStatus::NotFound`] for unknown ids
    pub fn get_status(&self, id: &JobId) -> JobStatus {
        self.registry.get(id)
    }

    /// Resolve media metadata without downloading
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidRequest`] when the URL is blank or not an absolute URL with a host
    /// - [`Error::Extraction`] when the engine cannot resolve it
    pub async fn get_info(&self, url: &str) -> Result<MediaInfo> {
        let url = url.trim();
        if url.is_empty() {
            return Err(Error::InvalidRequest("URL is required".into()));
        }
        let parsed = url::Url::parse(url)
            .map_err(|_| Error::InvalidRequest("Invalid URL format".into()))?;
        if !parsed.has_host() {
            return Err(Error::InvalidRequest("Invalid URL format".into()));
        }

        self.engine.extract_info(url).await.map_err(|e| match e {
            Error::Extraction(message) => Error::Extraction(message),
            other => Error::Extraction(other.to_string()),
        })
    }

    /// Curated site names for display
    ///
    /// Scans the first `sites.scan_limit` engine extractors for names that
    /// contain a popular site (case-insensitive). Falls back to the popular
    /// list when the engine cannot enumerate extractors.
    pub async fn supported_sites(&self) -> Vec<String> {
        let popular = &self.config.sites.popular;

        match self.engine.list_extractors().await {
            Ok(extractors) => {
                let needles: Vec<String> = popular.iter().map(|p| p.to_lowercase()).collect();
                extractors
                    .into_iter()
                    .take(self.config.sites.scan_limit)
                    .filter(|name| {
                        let name = name.to_lowercase();
                        needles.iter().any(|needle| name.contains(needle.as_str()))
                    })
                    .collect()
            }
            Err(e) => {
                tracing::debug!(error = %e, "listing extractors failed, using popular sites");
                popular.clone()
            }
        }
    }

    /// Path of a finished file in the downloads directory
    ///
    /// # Errors
    ///
    /// [`Error::FileNotFound`] when the name escapes the directory or no such
    /// regular file exists.
    pub async fn resolve_download_file(&self, filename: &str) -> Result<PathBuf> {
        let path = crate::utils::resolve_in_dir(self.config.download_dir(), filename)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            _ => Err(Error::FileNotFound(filename.to_string())),
        }
    }

    /// Subscribe to job lifecycle events
    ///
    /// Events are emitted as jobs start, progress and complete. Each subscriber
    /// receives its own copy; late subscribers miss earlier events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Shared configuration
    pub fn config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Number of jobs accepted since startup
    pub fn job_count(&self) -> usize {
        self.registry.len()
    }

    /// Name of the active engine
    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    /// Spawn the REST API server in a background task
    pub fn spawn_api_server(&self) -> tokio::task::JoinHandle<Result<()>> {
        let service = self.clone();
        let config = self.config();
        tokio::spawn(async move { crate::api::start_api_server(service, config).await })
    }

    fn emit_event(&self, event: Event) {
        // Ignore send errors (no active subscribers is fine)
        let _ = self.event_tx.send(event);
    }
}
