use clap::Parser;
use media_dl::{Config, JobService};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "media-dl")]
#[command(version)]
#[command(about = "Download media from video sites through yt-dlp, with a REST API for progress polling")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path (TOML); defaults apply when omitted
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Listening address, e.g. 0.0.0.0:5000
    #[arg(short, long, value_name = "ADDR")]
    bind: Option<SocketAddr>,

    /// Directory finished downloads are written to
    #[arg(short, long, value_name = "DIR")]
    download_dir: Option<PathBuf>,

    /// Path to the yt-dlp executable
    #[arg(long, value_name = "PATH")]
    yt_dlp: Option<PathBuf>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn load_config(&self) -> media_dl::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_toml_file(path)?,
            None => Config::default(),
        };

        if let Some(bind) = self.bind {
            config.server.api.bind_address = bind;
        }
        if let Some(dir) = &self.download_dir {
            config.download.download_dir = dir.clone();
        }
        if let Some(path) = &self.yt_dlp {
            config.tools.ytdlp_path = Some(path.clone());
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_filter = format!("media_dl={},tower_http={}", cli.log_level, cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting media-dl v{}", env!("CARGO_PKG_VERSION"));

    let result = async {
        let config = cli.load_config()?;
        if let Some(path) = &cli.config {
            tracing::info!(path = %path.display(), "Configuration loaded");
        }
        let jobs = JobService::new(config).await?;
        media_dl::run_with_shutdown(jobs).await
    }
    .await;

    match result {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            // Downloads still running on the blocking pool are abandoned here
            std::process::exit(0)
        }
        Err(e) => {
            tracing::error!(error = %e, "media-dl failed");
            ExitCode::FAILURE
        }
    }
}
