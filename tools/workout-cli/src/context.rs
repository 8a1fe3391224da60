//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use workout_core::clock::{DurationClock, SystemClock};
use workout_sync::{LoadOutcome, SyncCoordinator, SyncError};

use crate::config::{CliConfig, CONFIG_NAMES};
use crate::output::Output;
use crate::store::{FileOriginStore, FileRemote};

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Where the configuration came from, if a file was found.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = if let Some(path) = config_path {
            (CliConfig::load(path)?, Some(PathBuf::from(path)))
        } else {
            match Self::find_config(&cwd) {
                Some((config, path)) => (config, Some(path)),
                None => (CliConfig::default(), None),
            }
        };

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<(CliConfig, PathBuf)> {
        let mut current = start.to_path_buf();
        loop {
            for name in &CONFIG_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    match CliConfig::load(config_path.to_str()?) {
                        Ok(config) => return Some((config, config_path)),
                        Err(e) => tracing::warn!(error = %e, "ignoring unreadable config"),
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Directory holding the session files.
    pub fn data_dir(&self) -> PathBuf {
        match &self.config.storage.data_dir {
            Some(dir) => self.resolve_path(dir),
            None => dirs_path().join("workout"),
        }
    }

    /// The file-backed store for this context.
    pub fn remote(&self) -> FileRemote {
        FileRemote::new(self.data_dir())
    }

    /// Mount a coordinator over the file store.
    pub async fn open(&self) -> Result<(SyncCoordinator, LoadOutcome)> {
        let data_dir = self.data_dir();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let clock = DurationClock::new(
            Arc::new(SystemClock),
            Arc::new(FileOriginStore::new(&data_dir)),
        );
        let sync = SyncCoordinator::new(
            Arc::new(FileRemote::new(&data_dir)),
            clock,
            self.config.sync.clone(),
        );

        let outcome = sync.mount().await;
        tracing::debug!(?outcome, dir = %data_dir.display(), "session mounted");
        if outcome == LoadOutcome::Fallback {
            self.output
                .warn("Could not read the active session; continuing with local state");
        }
        Ok((sync, outcome))
    }

    /// Persist outstanding edits and unmount.
    pub async fn close(&self, sync: &SyncCoordinator) -> Result<()> {
        let flushed = match sync.flush().await {
            Ok(_) => Ok(()),
            Err(SyncError::NotActive(_)) => Ok(()),
            Err(e) => Err(e),
        };
        sync.drain().await;
        sync.shutdown();
        flushed.context("Failed to save session")
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if PathBuf::from(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.cwd.join(path)
        }
    }
}

/// Get the platform-specific data directory.
fn dirs_path() -> PathBuf {
    if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".local").join("share")
    } else {
        PathBuf::from("/tmp")
    }
}
