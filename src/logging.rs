//! Tracing bootstrap. The TUI owns stdout while it runs, so events go to a
//! plain-text log file in the data directory instead.

use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

use crate::config::Settings;

/// Install the global subscriber. Fails if the filter is invalid, the log file
/// cannot be opened, or a subscriber is already installed.
pub fn init(settings: &Settings) -> Result<()> {
    let filter = EnvFilter::try_new(&settings.log_filter)
        .with_context(|| format!("invalid log filter '{}'", settings.log_filter))?;

    let log_path = settings.log_path();
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|err| anyhow!("failed to initialize logging: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_a_malformed_filter_before_touching_the_disk() {
        let dir = tempfile::tempdir().unwrap();
        let env = [
            ("LIBRARY_DATA_DIR", dir.path().join("logs").display().to_string()),
            ("LIBRARY_LOG", "library_manager=loud".to_string()),
        ];
        let settings = Settings::from_lookup(|key| {
            env.iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| value.clone())
        })
        .unwrap();

        let err = init(&settings).unwrap_err();
        assert!(err.to_string().contains("invalid log filter"));
        assert!(!settings.log_path().exists());
    }
}
