// Tracing subscriber setup shared by every gridiron command.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

/// Default directive when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "gridiron=info,warn";

/// File name used under the log directory for interactive sessions.
pub const LOG_FILE_NAME: &str = "gridiron.log";

/// Where diagnostics go. The interactive analyzer owns the terminal, so it
/// logs to a file; batch commands log to stderr.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    /// `logs/` under the current working directory.
    pub fn default_file() -> anyhow::Result<Self> {
        Ok(LogTarget::File(std::env::current_dir()?.join("logs")))
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Create the log directory and return the full log file path.
pub fn prepare_log_file(dir: &Path) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    Ok(dir.join(LOG_FILE_NAME))
}

pub fn init_tracing(target: LogTarget) -> anyhow::Result<()> {
    match target {
        LogTarget::Stderr => {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(env_filter())
                .with_writer(std::io::stderr)
                .with_target(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .context("failed to set tracing subscriber")?;
        }
        LogTarget::File(dir) => {
            let path = prepare_log_file(&dir)?;
            let log_file = std::fs::File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(env_filter())
                .with_writer(log_file)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .context("failed to set tracing subscriber")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepare_log_file_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("logs");
        let path = prepare_log_file(&logs).unwrap();
        assert!(logs.is_dir());
        assert_eq!(path, logs.join("gridiron.log"));
    }

    #[test]
    fn default_filter_parses() {
        assert!(DEFAULT_FILTER.parse::<EnvFilter>().is_ok());
    }
}
