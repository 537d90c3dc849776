//! Run-state persistence
//!
//! The watermark lives under `LAST_SCRAPE_DATETIME` in a `.env` style
//! key-value file next to the rest of the configuration. Updates rewrite only
//! that line.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use tracing::debug;

use scout_core::{RunState, LAST_SCRAPE_KEY};

use crate::StoreError;

/// Where the run state is loaded from and saved to
#[async_trait]
pub trait RunStatePort: Send + Sync {
    /// Stored state, `None` if there is no usable history
    async fn load(&self) -> Result<Option<RunState>, StoreError>;

    async fn save(&self, state: &RunState) -> Result<(), StoreError>;
}

/// `.env` file backed run state
#[derive(Debug, Clone)]
pub struct EnvFileRunState {
    path: PathBuf,
}

impl EnvFileRunState {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Set `key=value` in env file content, keeping every other line
pub fn upsert_env_line(content: &str, key: &str, value: &str) -> String {
    let prefix = format!("{key}=");
    let mut replaced = false;
    let mut lines: Vec<String> = content
        .lines()
        .map(|line| {
            if !replaced && line.trim_start().starts_with(&prefix) {
                replaced = true;
                format!("{key}={value}")
            } else {
                line.to_string()
            }
        })
        .collect();

    if !replaced {
        lines.push(format!("{key}={value}"));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[async_trait]
impl RunStatePort for EnvFileRunState {
    async fn load(&self) -> Result<Option<RunState>, StoreError> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Ok(None);
        }

        let entries = dotenvy::from_path_iter(&self.path)
            .map_err(|e| StoreError::Config(format!("{}: {e}", self.path.display())))?;
        for entry in entries {
            let (key, value) =
                entry.map_err(|e| StoreError::Config(format!("{}: {e}", self.path.display())))?;
            if key == LAST_SCRAPE_KEY {
                return Ok(RunState::from_stored(Some(&value)));
            }
        }
        Ok(None)
    }

    async fn save(&self, state: &RunState) -> Result<(), StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        let stored = state.to_stored();
        let updated = upsert_env_line(&content, LAST_SCRAPE_KEY, &stored);
        tokio::fs::write(&self.path, updated).await?;

        debug!(path = %self.path.display(), watermark = %stored, "Saved run state");
        Ok(())
    }
}

/// In-process run state
#[derive(Debug, Default)]
pub struct MemoryRunState {
    state: Mutex<Option<RunState>>,
}

impl MemoryRunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: RunState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
        }
    }

    pub fn current(&self) -> Option<RunState> {
        self.state.lock().clone()
    }
}

#[async_trait]
impl RunStatePort for MemoryRunState {
    async fn load(&self) -> Result<Option<RunState>, StoreError> {
        Ok(self.current())
    }

    async fn save(&self, state: &RunState) -> Result<(), StoreError> {
        *self.state.lock() = Some(state.clone());
        Ok(())
    }
}
