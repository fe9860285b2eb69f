//! yt-dlp engine driving the external `yt-dlp` binary

use super::parser::{
    EngineLine, OUTPUT_MARKER, PROGRESS_MARKER, engine_error_message, parse_engine_line,
    parse_media_info,
};
use super::traits::{DownloadRequest, FormatSelection, MediaEngine, ProgressEvent, ProgressKind, ProgressSink};
use crate::error::{Error, Result};
use crate::types::MediaInfo;
use async_trait::async_trait;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Engine backed by the external `yt-dlp` binary
///
/// Metadata and extractor listing run through `tokio::process`. Downloads run
/// the binary synchronously on the calling thread and translate its stdout
/// into [`ProgressEvent`]s line by line.
///
/// # Examples
///
/// ```no_run
/// use media_dl::engine::{MediaEngine, YtDlpEngine};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let engine = YtDlpEngine::from_path().expect("yt-dlp not found in PATH");
/// let info = engine.extract_info("https://www.youtube.com/watch?v=dQw4w9WgXcQ").await?;
/// println!("{} ({} formats)", info.title, info.formats.len());
/// # Ok(())
/// # }
/// ```
pub struct YtDlpEngine {
    binary_path: PathBuf,
}

impl YtDlpEngine {
    /// Create an engine with an explicit binary path
    pub fn new(binary_path: PathBuf) -> Self {
        Self { binary_path }
    }

    /// Attempt to find yt-dlp in PATH
    pub fn from_path() -> Option<Self> {
        which::which("yt-dlp").ok().map(Self::new)
    }

    /// Path of the binary this engine executes
    pub fn binary_path(&self) -> &PathBuf {
        &self.binary_path
    }
}

/// Command line for one download
///
/// Progress is requested through a template so every hook invocation becomes
/// one parseable stdout line, and the post-processed path is printed last.
pub(crate) fn download_args(request: &DownloadRequest) -> Vec<String> {
    let mut args = vec![
        "--newline".to_string(),
        "--no-warnings".to_string(),
        "--no-playlist".to_string(),
        "--progress".to_string(),
        "--progress-template".to_string(),
        format!(
            "download:{PROGRESS_MARKER} %(progress.status)s|%(progress._percent_str)s|%(progress._speed_str)s|%(progress._eta_str)s|%(progress.filename)s"
        ),
        "--print".to_string(),
        format!("after_move:{OUTPUT_MARKER} %(filepath)s"),
        "-o".to_string(),
        request.output_template.to_string_lossy().into_owned(),
        "-f".to_string(),
        request.format.format_spec().to_string(),
    ];

    if let FormatSelection::Audio { codec, quality } = &request.format {
        args.extend([
            "-x".to_string(),
            "--audio-format".to_string(),
            codec.clone(),
            "--audio-quality".to_string(),
            quality.clone(),
        ]);
    }

    args.push("--".to_string());
    args.push(request.url.clone());
    args
}

#[async_trait]
impl MediaEngine for YtDlpEngine {
    async fn extract_info(&self, url: &str) -> Result<MediaInfo> {
        let output = tokio::process::Command::new(&self.binary_path)
            .args(["--dump-single-json", "--no-warnings", "--no-playlist", "--"])
            .arg(url)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| Error::ExternalTool(format!("Failed to execute yt-dlp: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Extraction(engine_error_message(
                &stderr,
                output.status.code(),
            )));
        }

        parse_media_info(&output.stdout)
    }

    fn download(&self, request: &DownloadRequest, progress: &dyn ProgressSink) -> Result<()> {
        let mut child = Command::new(&self.binary_path)
            .args(download_args(request))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::ExternalTool(format!("Failed to execute yt-dlp: {}", e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::ExternalTool("yt-dlp stdout was not captured".into()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::ExternalTool("yt-dlp stderr was not captured".into()))?;

        // Drain stderr concurrently so a chatty engine cannot fill the pipe and stall
        let stderr_reader = std::thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        });

        // Streams of a merged format each emit their own "finished"; only the
        // post-processed file counts, so finished events are held back.
        let mut last_finished: Option<String> = None;
        let mut output_file: Option<String> = None;

        let read = for_each_line_lossy(BufReader::new(stdout), |line| {
            match parse_engine_line(line) {
                Some(EngineLine::Progress(event)) if event.kind == ProgressKind::Finished => {
                    last_finished = event.filename.or(last_finished.take());
                }
                Some(EngineLine::Progress(event)) => progress.report(event),
                Some(EngineLine::OutputFile(path)) => output_file = Some(path),
                None => tracing::trace!(line = %line, "yt-dlp output"),
            }
        });
        if let Err(e) = read {
            tracing::warn!(error = %e, "reading yt-dlp output failed");
        }

        let status = child
            .wait()
            .map_err(|e| Error::ExternalTool(format!("Failed to wait for yt-dlp: {}", e)))?;
        let stderr = stderr_reader.join().unwrap_or_default();

        if !status.success() {
            return Err(Error::Download(engine_error_message(&stderr, status.code())));
        }

        match output_file.or(last_finished) {
            Some(path) => {
                progress.report(ProgressEvent::finished(path));
                Ok(())
            }
            None => Err(Error::Download(
                "yt-dlp exited without reporting an output file".into(),
            )),
        }
    }

    async fn list_extractors(&self) -> Result<Vec<String>> {
        let output = tokio::process::Command::new(&self.binary_path)
            .arg("--list-extractors")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| Error::ExternalTool(format!("Failed to execute yt-dlp: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::ExternalTool(engine_error_message(
                &stderr,
                output.status.code(),
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}

/// Feed every newline-terminated line of `reader` to `f`
///
/// Bytes that are not UTF-8 (titles and paths in other locales) are replaced
/// rather than ending the read, so the child never loses its stdout reader.
fn for_each_line_lossy<R: BufRead>(
    mut reader: R,
    mut f: impl FnMut(&str),
) -> std::io::Result<()> {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&buf);
        f(line.trim_end_matches(['\n', '\r']));
    }
}
