//! Engine used when no yt-dlp binary is available

use super::traits::{DownloadRequest, MediaEngine, ProgressSink};
use crate::types::MediaInfo;
use async_trait::async_trait;

const MISSING_ENGINE: &str = "media extraction requires the yt-dlp binary. \
     Configure ytdlp_path in config or ensure yt-dlp is in PATH.";

/// Engine that rejects every operation with `Error::NotSupported`
///
/// Lets the service start and answer status/health requests on a host without
/// yt-dlp; info requests fail synchronously and downloads end in the `error`
/// state.
///
/// # Examples
///
/// ```
/// use media_dl::engine::{MediaEngine, NoOpEngine};
///
/// # #[tokio::main]
/// # async fn main() {
/// let engine = NoOpEngine;
/// assert!(engine.extract_info("https://example.com/v").await.is_err());
/// # }
/// ```
pub struct NoOpEngine;

#[async_trait]
impl MediaEngine for NoOpEngine {
    async fn extract_info(&self, _url: &str) -> crate::Result<MediaInfo> {
        Err(crate::Error::NotSupported(MISSING_ENGINE.into()))
    }

    fn download(
        &self,
        _request: &DownloadRequest,
        _progress: &dyn ProgressSink,
    ) -> crate::Result<()> {
        Err(crate::Error::NotSupported(MISSING_ENGINE.into()))
    }

    async fn list_extractors(&self) -> crate::Result<Vec<String>> {
        Err(crate::Error::NotSupported(MISSING_ENGINE.into()))
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
