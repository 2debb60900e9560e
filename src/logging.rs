use color_eyre::Result;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Where logs go unless `--log-file` says otherwise. The TUI owns stdout, so
/// logging to the terminal would corrupt the screen.
pub fn default_log_path() -> PathBuf {
    std::env::temp_dir().join("wifi-spectrum.log")
}

/// Install the global subscriber, appending plain-text records to `path`.
/// `RUST_LOG` overrides the default `info` level.
pub fn init_tracing(path: &Path) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| color_eyre::eyre::eyre!("failed to install log subscriber: {e}"))?;

    tracing::info!(path = %path.display(), "logging initialised");
    Ok(())
}
