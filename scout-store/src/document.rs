//! Document store port
//!
//! Records are stored as JSON objects keyed by id, one collection per record
//! kind. Writes are batched upserts; reads list a whole collection.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use scout_core::{Record, RecordSnapshot};

/// Errors from a document store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Store returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Store configuration error: {0}")]
    Config(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// A stored JSON object and its id
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Serialize a record; its fields become the document body
    pub fn from_record<R: Record>(record: &R) -> Result<Self, StoreError> {
        match serde_json::to_value(record)? {
            Value::Object(fields) => Ok(Self::new(record.id(), fields)),
            other => Err(StoreError::InvalidDocument(format!(
                "record {} serialized to {other}",
                record.id()
            ))),
        }
    }

    /// Id, title and upvotes for change detection
    pub fn snapshot(&self) -> RecordSnapshot {
        RecordSnapshot {
            id: self.id.clone(),
            title: self
                .fields
                .get("title")
                .and_then(Value::as_str)
                .map(str::to_string),
            upvotes: self.fields.get("upvotes").and_then(Value::as_u64),
        }
    }
}

/// Batched upsert-by-id storage with whole-collection reads
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &str;

    /// Insert or overwrite every document by id
    async fn upsert_batch(&self, collection: &str, documents: &[Document])
        -> Result<(), StoreError>;

    /// All documents of a collection
    async fn list_documents(&self, collection: &str) -> Result<Vec<Document>, StoreError>;
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, BTreeMap<String, Document>>>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Number of documents in a collection
    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .get(collection)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }

    pub fn get(&self, collection: &str, id: &str) -> Option<Document> {
        self.collections
            .lock()
            .get(collection)
            .and_then(|docs| docs.get(id).cloned())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn upsert_batch(
        &self,
        collection: &str,
        documents: &[Document],
    ) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable("memory store is offline".to_string()));
        }

        let mut collections = self.collections.lock();
        let docs = collections.entry(collection.to_string()).or_default();
        for document in documents {
            docs.insert(document.id.clone(), document.clone());
        }
        Ok(())
    }

    async fn list_documents(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .collections
            .lock()
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }
}
