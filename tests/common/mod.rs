//! Common test utilities for media-dl integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use media_dl::engine::{DownloadRequest, MediaEngine, ProgressEvent, ProgressSink};
use media_dl::{Config, Error, JobId, JobService, JobStatus, MediaInfo};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What a [`FakeEngine`] download does once started
#[derive(Clone, Debug)]
pub enum Outcome {
    /// Report the given percentages, then write `<title>.<ext>` into the
    /// requested output directory and report it finished
    Succeed {
        percents: Vec<&'static str>,
        title: &'static str,
        ext: &'static str,
    },
    /// Fail with this message after reporting the given percentages
    Fail {
        percents: Vec<&'static str>,
        message: &'static str,
    },
}

/// Engine that behaves like yt-dlp without touching the network
///
/// Downloads pause briefly between progress events so pollers can observe
/// intermediate states.
pub struct FakeEngine {
    outcome: Outcome,
    step_delay: Duration,
    requests: Mutex<Vec<DownloadRequest>>,
}

impl FakeEngine {
    pub fn new(outcome: Outcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            step_delay: Duration::from_millis(20),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<DownloadRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn report_percents(&self, percents: &[&str], progress: &dyn ProgressSink) {
        for percent in percents {
            progress.report(
                ProgressEvent::downloading(*percent)
                    .with_speed("1.00MiB/s")
                    .with_eta("00:01"),
            );
            std::thread::sleep(self.step_delay);
        }
    }
}

#[async_trait]
impl MediaEngine for FakeEngine {
    async fn extract_info(&self, url: &str) -> media_dl::Result<MediaInfo> {
        Ok(MediaInfo {
            title: format!("Info for {url}"),
            thumbnail: None,
            duration: Some(1.0),
            uploader: None,
            platform: "Fake".into(),
            formats: Vec::new(),
        })
    }

    fn download(&self, request: &DownloadRequest, progress: &dyn ProgressSink) -> media_dl::Result<()> {
        self.requests.lock().unwrap().push(request.clone());

        match &self.outcome {
            Outcome::Succeed {
                percents,
                title,
                ext,
            } => {
                self.report_percents(percents, progress);
                let template = request.output_template.to_string_lossy();
                let path = PathBuf::from(
                    template
                        .replace("%(title)s", title)
                        .replace("%(ext)s", ext),
                );
                std::fs::write(&path, b"fake media")?;
                progress.report(ProgressEvent::finished(path.to_string_lossy()));
                Ok(())
            }
            Outcome::Fail { percents, message } => {
                self.report_percents(percents, progress);
                Err(Error::Download((*message).to_string()))
            }
        }
    }

    async fn list_extractors(&self) -> media_dl::Result<Vec<String>> {
        Ok(vec!["youtube".into(), "generic".into()])
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Service around `engine`, downloading into a fresh temp dir
pub async fn service_with(engine: Arc<FakeEngine>) -> (JobService, tempfile::TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.download.download_dir = temp_dir.path().join("downloads");
    let service = JobService::with_engine(config, engine).await.unwrap();
    (service, temp_dir)
}

/// Poll until the job is terminal, collecting every distinct status seen
pub async fn poll_until_terminal(service: &JobService, id: &JobId) -> Vec<JobStatus> {
    let mut seen: Vec<JobStatus> = Vec::new();
    let poll = async {
        loop {
            let status = service.get_status(id);
            if seen.last() != Some(&status) {
                seen.push(status.clone());
            }
            if status.is_terminal() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    };
    tokio::time::timeout(Duration::from_secs(10), poll)
        .await
        .expect("job did not reach a terminal status");
    seen
}
