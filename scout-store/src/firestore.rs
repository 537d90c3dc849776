//! Firestore backend over the REST API
//!
//! Documents are written with `documents:commit` (at most 500 writes per
//! commit) and read back page by page from the collection listing. Values
//! use Firestore's typed JSON encoding (`stringValue`, `integerValue`, ...).

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::debug;

use crate::{Document, DocumentStore, StoreError};

/// Maximum writes Firestore accepts in one commit
pub const MAX_WRITES_PER_COMMIT: usize = 500;

const PAGE_SIZE: usize = 300;

const PRODUCTION_HOST: &str = "https://firestore.googleapis.com";

/// Firestore connection settings
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    /// Google Cloud project id
    pub project_id: String,
    /// Database id, `(default)` unless configured otherwise
    pub database: String,
    /// OAuth2 access token (e.g. `gcloud auth print-access-token`)
    pub access_token: Option<String>,
    /// `host:port` of a local emulator; disables auth
    pub emulator_host: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl FirestoreConfig {
    pub fn new(project_id: &str) -> Self {
        Self {
            project_id: project_id.to_string(),
            database: "(default)".to_string(),
            access_token: None,
            emulator_host: None,
            timeout_secs: 30,
        }
    }

    pub fn with_access_token(mut self, token: Option<String>) -> Self {
        self.access_token = token;
        self
    }

    pub fn with_emulator(mut self, host: Option<String>) -> Self {
        self.emulator_host = host;
        self
    }

    /// Resource name of the database documents root
    pub fn documents_root(&self) -> String {
        format!(
            "projects/{}/databases/{}/documents",
            self.project_id, self.database
        )
    }

    fn base_url(&self) -> String {
        match &self.emulator_host {
            Some(host) if host.starts_with("http") => format!("{}/v1", host.trim_end_matches('/')),
            Some(host) => format!("http://{host}/v1"),
            None => format!("{PRODUCTION_HOST}/v1"),
        }
    }
}

/// Firestore REST client
pub struct FirestoreStore {
    config: FirestoreConfig,
    http: Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<RestDocument>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RestDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

impl FirestoreStore {
    pub fn new(config: FirestoreConfig) -> Result<Self, StoreError> {
        if config.project_id.trim().is_empty() {
            return Err(StoreError::Config("Firestore project id is empty".to_string()));
        }
        if config.emulator_host.is_none() && config.access_token.is_none() {
            return Err(StoreError::Config(
                "Firestore access token required outside the emulator".to_string(),
            ));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("kaggle-scout/0.1")
            .build()?;

        Ok(Self { config, http })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match (&self.config.emulator_host, &self.config.access_token) {
            (None, Some(token)) => request.bearer_auth(token),
            _ => request,
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Status {
            status: status.as_u16(),
            body,
        })
    }

    /// Commit body upserting `documents` into `collection`
    fn commit_body(&self, collection: &str, documents: &[Document]) -> Value {
        let root = self.config.documents_root();
        let writes: Vec<Value> = documents
            .iter()
            .map(|doc| {
                json!({
                    "update": {
                        "name": format!("{root}/{collection}/{}", doc.id),
                        "fields": encode_fields(&doc.fields),
                    }
                })
            })
            .collect();
        json!({ "writes": writes })
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    fn name(&self) -> &str {
        "firestore"
    }

    async fn upsert_batch(
        &self,
        collection: &str,
        documents: &[Document],
    ) -> Result<(), StoreError> {
        let url = format!(
            "{}/{}:commit",
            self.config.base_url(),
            self.config.documents_root()
        );

        for chunk in documents.chunks(MAX_WRITES_PER_COMMIT) {
            let body = self.commit_body(collection, chunk);
            let response = self.authorize(self.http.post(&url).json(&body)).send().await?;
            Self::check(response).await?;
            debug!(collection, writes = chunk.len(), "Committed Firestore batch");
        }
        Ok(())
    }

    async fn list_documents(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let url = format!(
            "{}/{}/{collection}",
            self.config.base_url(),
            self.config.documents_root()
        );

        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query: Vec<(&str, String)> = vec![("pageSize", PAGE_SIZE.to_string())];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }

            let response = self
                .authorize(self.http.get(&url).query(&query))
                .send()
                .await?;
            let page: ListResponse = Self::check(response).await?.json().await?;

            for doc in page.documents {
                let id = doc.name.rsplit('/').next().unwrap_or_default().to_string();
                documents.push(Document::new(id, decode_fields(&doc.fields)));
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(collection, count = documents.len(), "Listed Firestore documents");
        Ok(documents)
    }
}

/// Encode a JSON object as Firestore fields
pub fn encode_fields(fields: &Map<String, Value>) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(key, value)| (key.clone(), encode_value(value)))
            .collect(),
    )
}

/// Encode one JSON value as a Firestore typed value
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64().unwrap_or_default() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

/// Decode Firestore fields into a plain JSON object
pub fn decode_fields(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(key, value)| (key.clone(), decode_value(value)))
        .collect()
}

/// Decode one Firestore typed value; unknown types become null
pub fn decode_value(value: &Value) -> Value {
    let Some((kind, inner)) = value.as_object().and_then(|obj| obj.iter().next()) else {
        return Value::Null;
    };

    match kind.as_str() {
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner.clone(),
        "booleanValue" | "doubleValue" => inner.clone(),
        "integerValue" => inner
            .as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .map(Value::from)
            .unwrap_or_else(|| inner.clone()),
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(decode_value).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => Value::Object(
            inner
                .get("fields")
                .and_then(Value::as_object)
                .map(decode_fields)
                .unwrap_or_default(),
        ),
        _ => Value::Null,
    }
}
