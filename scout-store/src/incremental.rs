//! Incremental state between runs
//!
//! Holds the stored snapshot of previously collected records and the
//! last-scrape watermark. A discussion whose id, title and upvote count all
//! match the stored snapshot is skipped; competitions are always refreshed.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use scout_core::{RecordKind, RecordSnapshot, RunState};

use crate::{DocumentStore, RunStatePort, StoreError};

/// Stored snapshots keyed by record id
pub type SnapshotMap = HashMap<String, RecordSnapshot>;

/// Whether `candidate` is unchanged relative to `existing`
pub fn should_skip(existing: &SnapshotMap, candidate: &RecordSnapshot) -> bool {
    existing
        .get(&candidate.id)
        .is_some_and(|stored| candidate.matches(stored))
}

pub struct IncrementalStateStore {
    store: Arc<dyn DocumentStore>,
    run_state: Arc<dyn RunStatePort>,
    state: RunState,
    discussions: SnapshotMap,
}

impl IncrementalStateStore {
    /// Load the run state; a first run persists its default watermark at once
    pub async fn open(
        store: Arc<dyn DocumentStore>,
        run_state: Arc<dyn RunStatePort>,
    ) -> Result<Self, StoreError> {
        let state = match run_state.load().await? {
            Some(state) => state,
            None => {
                let state = RunState::first_run(Utc::now());
                run_state.save(&state).await?;
                info!(watermark = %state.to_stored(), "No previous run, starting from default watermark");
                state
            }
        };

        Ok(Self {
            store,
            run_state,
            state,
            discussions: SnapshotMap::new(),
        })
    }

    /// Read the stored snapshot of one record kind. Discussions are kept for
    /// [`should_skip`](Self::should_skip). A failing store yields an empty map.
    pub async fn load_existing(&mut self, kind: RecordKind) -> SnapshotMap {
        let snapshots = match self.store.list_documents(kind.collection()).await {
            Ok(documents) => documents
                .iter()
                .map(|doc| (doc.id.clone(), doc.snapshot()))
                .collect::<SnapshotMap>(),
            Err(e) => {
                warn!(collection = kind.collection(), error = %e, "Could not load stored records, treating all as new");
                SnapshotMap::new()
            }
        };

        info!(collection = kind.collection(), count = snapshots.len(), "Loaded stored records");
        if kind == RecordKind::Discussion {
            self.discussions = snapshots.clone();
        }
        snapshots
    }

    /// Whether a discussion candidate is unchanged since the last run
    pub fn should_skip(&self, candidate: &RecordSnapshot) -> bool {
        should_skip(&self.discussions, candidate)
    }

    pub fn last_scrape_time(&self) -> DateTime<Utc> {
        self.state.last_scrape_datetime
    }

    /// Advance the watermark and persist it
    pub async fn record_progress(&mut self, timestamp: DateTime<Utc>) -> Result<(), StoreError> {
        self.state.advance(timestamp);
        self.run_state.save(&self.state).await
    }
}
