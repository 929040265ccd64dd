use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
#[cfg(not(feature = "tokio-console"))]
use tracing_subscriber::{fmt::writer::MakeWriterExt, EnvFilter};

/// Log to stdout and a daily `facegallery.log` under `base_dir`.
/// Keep the returned guard alive until exit so the file writer flushes.
pub fn init(base_dir: &Path, level: &str) -> std::io::Result<WorkerGuard> {
    std::fs::create_dir_all(base_dir)?;
    let file_appender = rolling::daily(base_dir, "facegallery.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    #[cfg(feature = "tokio-console")]
    {
        let _ = (file_writer, level);
        console_subscriber::init();
    }

    #[cfg(not(feature = "tokio-console"))]
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stdout.and(file_writer))
        .init();

    Ok(guard)
}
