//! Shared test helpers for driving jobs through a scripted engine.

use crate::config::Config;
use crate::engine::{DownloadRequest, MediaEngine, ProgressEvent, ProgressSink};
use crate::error::{Error, Result};
use crate::jobs::JobService;
use crate::types::{JobId, JobStatus, MediaInfo};
use async_trait::async_trait;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One scripted action performed inside `download`
#[derive(Debug)]
pub(crate) enum Step {
    /// Deliver a progress event to the sink
    Report(ProgressEvent),
    /// Return `Error::Download` with this message
    Fail(String),
    /// Return `Ok(())`
    Complete,
    /// Panic with this message
    Panic(String),
}

/// Feeds steps to a blocked [`ScriptedEngine::download`] call
pub(crate) struct Controller {
    tx: Sender<Step>,
}

impl Controller {
    pub(crate) fn push(&self, step: Step) {
        self.tx.send(step).unwrap();
    }
}

/// Engine whose downloads block until the test pushes steps
///
/// Downloads pull from one shared script, so tests drive a single job at a
/// time unless they only push `Fail`/`Complete` steps.
pub(crate) struct ScriptedEngine {
    steps: Mutex<Receiver<Step>>,
    requests: Mutex<Vec<DownloadRequest>>,
    info: Mutex<std::result::Result<MediaInfo, String>>,
    extractors: Mutex<std::result::Result<Vec<String>, String>>,
}

impl ScriptedEngine {
    pub(crate) fn new() -> (Arc<Self>, Controller) {
        let (tx, rx) = channel();
        let engine = Arc::new(Self {
            steps: Mutex::new(rx),
            requests: Mutex::new(Vec::new()),
            info: Mutex::new(Err("no info scripted".into())),
            extractors: Mutex::new(Err("no extractors scripted".into())),
        });
        (engine, Controller { tx })
    }

    pub(crate) fn set_info(&self, info: std::result::Result<MediaInfo, String>) {
        *self.info.lock().unwrap() = info;
    }

    pub(crate) fn set_extractors(&self, extractors: std::result::Result<Vec<String>, String>) {
        *self.extractors.lock().unwrap() = extractors;
    }

    /// Requests received by `download`, in call order
    pub(crate) fn requests(&self) -> Vec<DownloadRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaEngine for ScriptedEngine {
    async fn extract_info(&self, _url: &str) -> Result<MediaInfo> {
        self.info.lock().unwrap().clone().map_err(Error::Extraction)
    }

    fn download(&self, request: &DownloadRequest, progress: &dyn ProgressSink) -> Result<()> {
        self.requests.lock().unwrap().push(request.clone());
        loop {
            let step = self.steps.lock().unwrap().recv();
            match step {
                Ok(Step::Report(event)) => progress.report(event),
                Ok(Step::Fail(message)) => return Err(Error::Download(message)),
                Ok(Step::Complete) => return Ok(()),
                Ok(Step::Panic(message)) => panic!("{message}"),
                Err(_) => return Err(Error::Download("script ended".into())),
            }
        }
    }

    async fn list_extractors(&self) -> Result<Vec<String>> {
        self.extractors
            .lock()
            .unwrap()
            .clone()
            .map_err(Error::ExternalTool)
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Service over a scripted engine, downloading into a fresh temp dir.
/// The tempdir must be kept alive for the duration of the test.
pub(crate) async fn create_test_service() -> (JobService, Arc<ScriptedEngine>, Controller, tempfile::TempDir)
{
    let temp_dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.download.download_dir = temp_dir.path().join("downloads");

    let (engine, controller) = ScriptedEngine::new();
    let service = JobService::with_engine(config, engine.clone()).await.unwrap();
    (service, engine, controller, temp_dir)
}

/// Poll until the job's status satisfies `predicate`, panicking after 5 seconds
pub(crate) async fn wait_for_status(
    service: &JobService,
    id: &JobId,
    predicate: impl Fn(&JobStatus) -> bool,
) -> JobStatus {
    let poll = async {
        loop {
            let status = service.get_status(id);
            if predicate(&status) {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    };
    match tokio::time::timeout(Duration::from_secs(5), poll).await {
        Ok(status) => status,
        Err(_) => panic!(
            "timed out waiting for job {id}; last status {:?}",
            service.get_status(id)
        ),
    }
}
