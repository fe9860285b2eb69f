//! Parsing of yt-dlp output

use super::traits::{ProgressEvent, ProgressKind};
use crate::error::{Error, Result};
use crate::types::{FormatInfo, MediaInfo};
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Marker prefixed to every progress line requested via `--progress-template`
pub(crate) const PROGRESS_MARKER: &str = "[media-dl:progress]";

/// Marker prefixed to the final output path printed via `--print after_move:`
pub(crate) const OUTPUT_MARKER: &str = "[media-dl:file]";

// Patterns are compile-time constants
#[allow(clippy::unwrap_used)]
static PROGRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[media-dl:progress\]\s*(\w+)\|([^|]*)\|([^|]*)\|([^|]*)\|(.*)$").unwrap()
});

#[allow(clippy::unwrap_used)]
static ANSI_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").unwrap());

/// A line of yt-dlp stdout that carries information for us
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EngineLine {
    /// A progress hook invocation
    Progress(ProgressEvent),
    /// Final path of the produced file, after post-processing
    OutputFile(String),
}

/// Remove terminal color sequences yt-dlp may embed in `_percent_str` etc.
pub(crate) fn strip_ansi(s: &str) -> Cow<'_, str> {
    ANSI_RE.replace_all(s, "")
}

/// yt-dlp renders missing template fields as "NA"
fn template_field(raw: &str) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() || value == "NA" {
        None
    } else {
        Some(value.to_string())
    }
}

/// Parse one line of yt-dlp stdout
///
/// Returns `None` for lines that are neither a progress template line nor
/// the final output path.
pub(crate) fn parse_engine_line(line: &str) -> Option<EngineLine> {
    let line = strip_ansi(line.trim_end());

    if let Some(path) = line.strip_prefix(OUTPUT_MARKER) {
        return template_field(path).map(EngineLine::OutputFile);
    }

    let caps = PROGRESS_RE.captures(&line)?;
    let field = |i: usize| caps.get(i).and_then(|m| template_field(m.as_str()));

    Some(EngineLine::Progress(ProgressEvent {
        kind: ProgressKind::from(caps.get(1)?.as_str()),
        percent: field(2),
        speed: field(3),
        eta: field(4),
        filename: field(5),
    }))
}

/// Pick the most useful failure message from yt-dlp's stderr
///
/// Prefers the last `ERROR:` line (without its prefix), then the last
/// non-empty line, then a generic message naming the exit code.
pub(crate) fn engine_error_message(stderr: &str, exit_code: Option<i32>) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    if let Some(error_line) = lines.iter().rev().find(|l| l.starts_with("ERROR:")) {
        return error_line.trim_start_matches("ERROR:").trim().to_string();
    }

    match (lines.last(), exit_code) {
        (Some(last), _) => (*last).to_string(),
        (None, Some(code)) => format!("yt-dlp exited with status {code}"),
        (None, None) => "yt-dlp was terminated by a signal".to_string(),
    }
}

/// Parse `--dump-single-json` output into [`MediaInfo`]
///
/// Formats that carry neither video nor audio (storyboards, etc.) are dropped.
pub(crate) fn parse_media_info(stdout: &[u8]) -> Result<MediaInfo> {
    let json: serde_json::Value = serde_json::from_slice(stdout)
        .map_err(|e| Error::Extraction(format!("unreadable engine output: {e}")))?;

    let str_field = |v: &serde_json::Value, key: &str| v[key].as_str().map(str::to_string);

    let formats = json["formats"]
        .as_array()
        .map(|formats| {
            formats
                .iter()
                .filter(|f| {
                    let vcodec = f["vcodec"].as_str();
                    let acodec = f["acodec"].as_str();
                    vcodec != Some("none") || acodec != Some("none")
                })
                .map(|f| FormatInfo {
                    format_id: str_field(f, "format_id"),
                    ext: str_field(f, "ext"),
                    quality: quality_label(f),
                    filesize: f["filesize"].as_u64(),
                    vcodec: str_field(f, "vcodec"),
                    acodec: str_field(f, "acodec"),
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(MediaInfo {
        title: str_field(&json, "title").unwrap_or_else(|| "Unknown".to_string()),
        thumbnail: str_field(&json, "thumbnail"),
        duration: json["duration"].as_f64(),
        uploader: str_field(&json, "uploader"),
        platform: str_field(&json, "extractor_key").unwrap_or_else(|| "Unknown".to_string()),
        formats,
    })
}

/// `format_note` when present, otherwise the numeric `quality` rank
fn quality_label(format: &serde_json::Value) -> String {
    if let Some(note) = format["format_note"].as_str() {
        return note.to_string();
    }
    match &format["quality"] {
        serde_json::Value::Null => "Unknown".to_string(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
