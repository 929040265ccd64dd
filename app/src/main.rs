//! Desktop entry point for FaceGallery.

use clap::Parser;
use std::path::PathBuf;
use ui::GallerySettings;

mod config;
mod logging;

#[derive(Parser)]
#[command(name = "facegallery", author, version, about = "FaceGallery face search viewer")]
struct Cli {
    /// Backend base URL (e.g. http://localhost:8000)
    #[arg(long)]
    backend_url: Option<String>,
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override log level (e.g. info, debug)
    #[arg(long)]
    log_level: Option<String>,
    /// Number of grid images revealed per batch
    #[arg(long)]
    batch_size: Option<usize>,
    /// Maximum concurrent image downloads
    #[arg(long)]
    preload_threads: Option<usize>,
    /// Request timeout in seconds, 0 disables it
    #[arg(long)]
    request_timeout_secs: Option<u64>,
}

#[cfg_attr(feature = "trace-spans", tracing::instrument)]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let overrides = config::AppConfigOverrides {
        backend_url: cli.backend_url,
        log_level: cli.log_level,
        batch_size: cli.batch_size,
        preload_threads: cli.preload_threads,
        request_timeout_secs: cli.request_timeout_secs,
    };
    let cfg = config::AppConfig::load_from(cli.config).apply_overrides(&overrides);
    let _guard = logging::init(&cfg.cache_path, &cfg.log_level)?;

    tracing::info!(
        backend_url = %cfg.backend_url,
        batch_size = cfg.batch_size,
        preload_threads = cfg.preload_threads,
        "Starting FaceGallery"
    );

    let settings = GallerySettings {
        backend_url: cfg.backend_url.clone(),
        batch_size: cfg.batch_size,
        preload_threads: cfg.preload_threads,
        request_timeout: cfg.request_timeout(),
        cache_dir: cfg.cache_path.clone(),
    };
    if let Err(e) = ui::run(settings) {
        tracing::error!("UI error: {}", e);
        return Err(e.into());
    }
    Ok(())
}
