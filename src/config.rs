//! Configuration types for media-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::Path, path::PathBuf};

/// Download behavior configuration (output directory, audio extraction)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Download directory (default: "./downloads")
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Audio extraction settings used for `quality = "audio"`
    #[serde(default)]
    pub audio: AudioConfig,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            audio: AudioConfig::default(),
        }
    }
}

/// Target of the audio extraction post-process
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Codec to transcode to (default: "mp3")
    #[serde(default = "default_audio_codec")]
    pub codec: String,

    /// Quality tier handed to the engine (default: "192")
    #[serde(default = "default_audio_quality")]
    pub quality: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            codec: default_audio_codec(),
            quality: default_audio_quality(),
        }
    }
}

/// External tool paths
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,

    /// Whether to search PATH for yt-dlp if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            search_path: true,
        }
    }
}

/// Curation of the `/supported_sites` listing
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SitesConfig {
    /// Site names shown to users; also the fallback listing when the engine
    /// cannot enumerate its extractors
    #[serde(default = "default_popular_sites")]
    pub popular: Vec<String>,

    /// How many engine extractors are scanned for popular names (default: 50)
    #[serde(default = "default_scan_limit")]
    pub scan_limit: usize,
}

impl Default for SitesConfig {
    fn default() -> Self {
        Self {
            popular: default_popular_sites(),
            scan_limit: default_scan_limit(),
        }
    }
}

/// Main configuration for media-dl
///
/// Sub-configs are flattened so the TOML file stays a shallow document:
///
/// ```toml
/// download_dir = "/srv/media"
/// ytdlp_path = "/usr/local/bin/yt-dlp"
///
/// [audio]
/// codec = "opus"
///
/// [api]
/// bind_address = "0.0.0.0:5000"
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Download behavior settings
    #[serde(flatten)]
    pub download: DownloadConfig,

    /// External tool paths
    #[serde(flatten)]
    pub tools: ToolsConfig,

    /// Supported-site listing
    #[serde(default)]
    pub sites: SitesConfig,

    /// API and external server integration
    #[serde(flatten)]
    pub server: ServerIntegrationConfig,
}

impl Config {
    /// Download directory
    pub fn download_dir(&self) -> &PathBuf {
        &self.download.download_dir
    }

    /// Load configuration from a TOML file
    ///
    /// Missing keys take their defaults, so an empty file is a valid config.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read {}: {}", path.display(), e),
            key: None,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::Config {
            message: e.message().to_string(),
            key: None,
        })
    }
}

/// API and external server integration configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ServerIntegrationConfig {
    /// REST API configuration
    #[serde(default)]
    pub api: ApiConfig,
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:5000)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Optional API key for authentication
    #[serde(default)]
    pub api_key: Option<String>,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            api_key: None,
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_audio_codec() -> String {
    "mp3".into()
}

fn default_audio_quality() -> String {
    "192".into()
}

fn default_true() -> bool {
    true
}

fn default_popular_sites() -> Vec<String> {
    [
        "YouTube",
        "Facebook",
        "Twitter",
        "Instagram",
        "TikTok",
        "Vimeo",
        "Dailymotion",
        "Twitch",
        "Pinterest",
        "Reddit",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_scan_limit() -> usize {
    50
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 5000))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".into()]
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = Config::from_toml_str("").unwrap();

        assert_eq!(config.download_dir(), &PathBuf::from("downloads"));
        assert_eq!(config.download.audio, AudioConfig::default());
        assert_eq!(config.download.audio.codec, "mp3");
        assert_eq!(config.download.audio.quality, "192");
        assert!(config.tools.ytdlp_path.is_none());
        assert!(config.tools.search_path);
        assert_eq!(config.sites.scan_limit, 50);
        assert_eq!(config.sites.popular.len(), 10);
        assert_eq!(
            config.server.api.bind_address,
            "127.0.0.1:5000".parse::<SocketAddr>().unwrap()
        );
        assert!(config.server.api.cors_enabled);
        assert!(config.server.api.api_key.is_none());
    }

    #[test]
    fn flattened_keys_parse_at_top_level() {
        let config = Config::from_toml_str(
            r#"
            download_dir = "/srv/media"
            ytdlp_path = "/usr/local/bin/yt-dlp"
            search_path = false

            [audio]
            codec = "opus"

            [sites]
            popular = ["Vimeo"]

            [api]
            bind_address = "0.0.0.0:8080"
            api_key = "secret"
            swagger_ui = false
            "#,
        )
        .unwrap();

        assert_eq!(config.download_dir(), &PathBuf::from("/srv/media"));
        assert_eq!(
            config.tools.ytdlp_path,
            Some(PathBuf::from("/usr/local/bin/yt-dlp"))
        );
        assert!(!config.tools.search_path);
        assert_eq!(config.download.audio.codec, "opus");
        assert_eq!(config.download.audio.quality, "192");
        assert_eq!(config.sites.popular, vec!["Vimeo".to_string()]);
        assert_eq!(config.sites.scan_limit, 50);
        assert_eq!(config.server.api.bind_address.port(), 8080);
        assert_eq!(config.server.api.api_key.as_deref(), Some("secret"));
        assert!(!config.server.api.swagger_ui);
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let err = Config::from_toml_str("download_dir = [").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = Config::from_toml_file("/nonexistent/media-dl.toml").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn from_toml_file_reads_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("media-dl.toml");
        std::fs::write(&path, "download_dir = \"out\"\n").unwrap();

        let config = Config::from_toml_file(&path).unwrap();
        assert_eq!(config.download_dir(), &PathBuf::from("out"));
    }
}
