//! Media extraction engine
//!
//! Everything that touches the outside world during info extraction and
//! downloading lives behind the [`MediaEngine`] trait. The job subsystem only
//! ever sees normalized [`ProgressEvent`]s delivered through a [`ProgressSink`].
//!
//! ## Implementations
//!
//! - [`YtDlpEngine`]: drives an external `yt-dlp` binary
//! - [`NoOpEngine`]: stub used when no binary is available
//!
//! ## Usage
//!
//! ```no_run
//! use media_dl::config::ToolsConfig;
//! use media_dl::engine;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = engine::detect(&ToolsConfig::default());
//!     let sites = engine.list_extractors().await?;
//!     println!("{} supports {} extractors", engine.name(), sites.len());
//!     Ok(())
//! }
//! ```

mod noop;
pub(crate) mod parser;
mod traits;
mod ytdlp;

pub use noop::NoOpEngine;
pub use traits::{
    DownloadRequest, FormatSelection, MediaEngine, ProgressEvent, ProgressKind, ProgressSink,
};
pub use ytdlp::YtDlpEngine;

use crate::config::ToolsConfig;
use std::sync::Arc;

/// Pick the engine for the configured tools
///
/// An explicit `ytdlp_path` wins; otherwise PATH is searched when
/// `search_path` is enabled. Falls back to [`NoOpEngine`].
pub fn detect(tools: &ToolsConfig) -> Arc<dyn MediaEngine> {
    if let Some(path) = &tools.ytdlp_path {
        tracing::info!(path = %path.display(), "using configured yt-dlp binary");
        return Arc::new(YtDlpEngine::new(path.clone()));
    }

    if tools.search_path
        && let Some(engine) = YtDlpEngine::from_path()
    {
        tracing::info!(path = %engine.binary_path().display(), "found yt-dlp in PATH");
        return Arc::new(engine);
    }

    tracing::warn!("yt-dlp not found, media extraction and downloads are disabled");
    Arc::new(NoOpEngine)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn explicit_path_is_used_verbatim() {
        let tools = ToolsConfig {
            ytdlp_path: Some(PathBuf::from("/opt/yt-dlp/bin/yt-dlp")),
            search_path: false,
        };
        assert_eq!(detect(&tools).name(), "yt-dlp");
    }

    #[test]
    fn no_path_and_no_search_falls_back_to_noop() {
        let tools = ToolsConfig {
            ytdlp_path: None,
            search_path: false,
        };
        assert_eq!(detect(&tools).name(), "noop");
    }

    #[test]
    fn path_search_matches_which() {
        let expected = if which::which("yt-dlp").is_ok() {
            "yt-dlp"
        } else {
            "noop"
        };
        assert_eq!(detect(&ToolsConfig::default()).name(), expected);
    }
}
