//! Local JSON-directory backend
//!
//! Each collection is one `<dir>/<collection>.json` file holding an object of
//! id → document. Used for offline runs and as a store that needs no
//! credentials.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

use crate::{Document, DocumentStore, StoreError};

pub struct JsonDirStore {
    dir: PathBuf,
    // Serializes read-modify-write of collection files
    lock: Mutex<()>,
}

impl JsonDirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{collection}.json"))
    }

    async fn read_collection(
        &self,
        collection: &str,
    ) -> Result<BTreeMap<String, Map<String, Value>>, StoreError> {
        let path = self.collection_path(collection);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }
}

#[async_trait]
impl DocumentStore for JsonDirStore {
    fn name(&self) -> &str {
        "json"
    }

    async fn upsert_batch(
        &self,
        collection: &str,
        documents: &[Document],
    ) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;

        let mut existing = self.read_collection(collection).await?;
        for document in documents {
            existing.insert(document.id.clone(), document.fields.clone());
        }

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.collection_path(collection);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(&existing)?).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!(collection, path = %path.display(), total = existing.len(), "Wrote collection file");
        Ok(())
    }

    async fn list_documents(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self
            .read_collection(collection)
            .await?
            .into_iter()
            .map(|(id, fields)| Document::new(id, fields))
            .collect())
    }
}
