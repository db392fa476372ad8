use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=warn";

pub fn log_file_path(log_dir: &Path) -> PathBuf {
    log_dir.join("geoprep.log")
}

/// Installs the global subscriber: coloured stdout plus a plain-text file
/// under `log_dir`. `RUST_LOG` overrides the default filter.
pub fn init_tracing(log_dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(log_dir)
        .map_err(|e| anyhow::anyhow!("cannot create log directory {}: {e}", log_dir.display()))?;
    let path = log_file_path(log_dir);
    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| anyhow::anyhow!("cannot open log file {}: {e}", path.display()))?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Arc::new(log_file))
                .with_ansi(false),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing subscriber already installed: {e}"))?;

    tracing::info!(log_file = %path.display(), "logging initialised");
    Ok(())
}
