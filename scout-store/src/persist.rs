//! End-of-run persistence with local snapshot fallback

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use scout_core::{CompetitionRecord, DiscussionRecord, Record};

use crate::{Document, DocumentStore, StoreError};

/// How the collected records ended up persisted
#[derive(Debug)]
pub enum PersistOutcome {
    /// Written to the document store
    Stored {
        competitions: usize,
        discussions: usize,
    },
    /// Store failed; records written to local JSON files instead
    Snapshot {
        error: String,
        paths: Vec<PathBuf>,
    },
    /// Store and snapshot both failed
    Failed { error: String, snapshot_error: String },
}

impl PersistOutcome {
    pub fn is_stored(&self) -> bool {
        matches!(self, PersistOutcome::Stored { .. })
    }
}

impl std::fmt::Display for PersistOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistOutcome::Stored {
                competitions,
                discussions,
            } => write!(f, "stored {competitions} competitions, {discussions} discussions"),
            PersistOutcome::Snapshot { paths, .. } => {
                write!(f, "store failed, snapshot written to ")?;
                for (i, path) in paths.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", path.display())?;
                }
                Ok(())
            }
            PersistOutcome::Failed { error, .. } => write!(f, "persistence failed: {error}"),
        }
    }
}

async fn upsert_records<R: Record>(
    store: &dyn DocumentStore,
    records: &[R],
) -> Result<(), StoreError> {
    let documents = records
        .iter()
        .map(Document::from_record)
        .collect::<Result<Vec<_>, _>>()?;
    store.upsert_batch(R::KIND.collection(), &documents).await
}

/// Upsert competitions, then discussions if there are any
pub async fn store_run(
    store: &dyn DocumentStore,
    competitions: &[CompetitionRecord],
    discussions: &[DiscussionRecord],
) -> Result<(), StoreError> {
    upsert_records(store, competitions).await?;
    info!(store = store.name(), count = competitions.len(), "Saved competitions");

    if !discussions.is_empty() {
        upsert_records(store, discussions).await?;
        info!(store = store.name(), count = discussions.len(), "Saved discussions");
    }
    Ok(())
}

async fn write_snapshot_file<T: Serialize>(path: &Path, records: &[T]) -> Result<(), StoreError> {
    tokio::fs::write(path, serde_json::to_vec_pretty(records)?).await?;
    Ok(())
}

/// Write both record sets as timestamped JSON arrays into `dir`
pub async fn write_snapshot(
    dir: &Path,
    competitions: &[CompetitionRecord],
    discussions: &[DiscussionRecord],
    now: DateTime<Utc>,
) -> Result<Vec<PathBuf>, StoreError> {
    tokio::fs::create_dir_all(dir).await?;

    let stamp = now.format("%Y%m%d_%H%M%S");
    let competitions_path = dir.join(format!("competitions_backup_{stamp}.json"));
    let discussions_path = dir.join(format!("discussions_backup_{stamp}.json"));

    write_snapshot_file(&competitions_path, competitions).await?;
    write_snapshot_file(&discussions_path, discussions).await?;

    Ok(vec![competitions_path, discussions_path])
}

/// Persist a run; on store failure fall back to a local snapshot
pub async fn persist_run(
    store: &dyn DocumentStore,
    competitions: &[CompetitionRecord],
    discussions: &[DiscussionRecord],
    backup_dir: &Path,
    now: DateTime<Utc>,
) -> PersistOutcome {
    let error = match store_run(store, competitions, discussions).await {
        Ok(()) => {
            return PersistOutcome::Stored {
                competitions: competitions.len(),
                discussions: discussions.len(),
            }
        }
        Err(e) => e.to_string(),
    };

    warn!(store = store.name(), error = %error, "Saving to store failed, writing local snapshot");
    match write_snapshot(backup_dir, competitions, discussions, now).await {
        Ok(paths) => {
            info!(dir = %backup_dir.display(), "Snapshot written");
            PersistOutcome::Snapshot { error, paths }
        }
        Err(e) => {
            error!(error = %e, "Snapshot write failed, collected records are lost");
            PersistOutcome::Failed {
                error,
                snapshot_error: e.to_string(),
            }
        }
    }
}
