//! In-page extraction function set
//!
//! Detail pages are read by a JavaScript file that defines one function per
//! field (`extractDescription()`, `extractDiscussionContent()`, ...). The
//! file is opaque to the crawler: its source is wrapped in an expression
//! that calls a single function, evaluated through [`BrowserPage::evaluate`],
//! and the JSON result is decoded here.

use serde::Deserialize;
use std::path::Path;
use tracing::debug;

use crate::{BrowserError, BrowserPage};

/// Default location of the extraction script
pub const DEFAULT_EXTRACT_SCRIPT: &str = "extract_content.js";

/// Functions defined by the extraction script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractFn {
    Description,
    Evaluation,
    Deadline,
    StartTime,
    DiscussionContent,
}

impl ExtractFn {
    pub fn name(&self) -> &'static str {
        match self {
            ExtractFn::Description => "extractDescription",
            ExtractFn::Evaluation => "extractEvaluation",
            ExtractFn::Deadline => "extractDeadline",
            ExtractFn::StartTime => "extractStartTime",
            ExtractFn::DiscussionContent => "extractDiscussionContent",
        }
    }
}

/// Raw result of `extractDiscussionContent()`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDiscussionContent {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, rename = "posted_datetime")]
    pub posted_datetime: Option<String>,
    #[serde(default)]
    pub competition_rank: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub kaggle_rank: Option<String>,
    #[serde(default)]
    pub medal_type: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Ranks come back as either `"Expert"` or `1234`
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// The loaded extraction script
#[derive(Debug, Clone)]
pub struct ExtractionScripts {
    source: String,
}

impl ExtractionScripts {
    /// Use script source held in memory
    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Read the script from disk
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Ok(Self { source })
    }

    /// Expression that defines the function set and calls `function`
    pub fn expression(&self, function: ExtractFn) -> String {
        format!(
            "(() => {{\n{}\nreturn {}();\n}})()",
            self.source,
            function.name()
        )
    }

    /// Evaluate one extraction function on `page`
    pub async fn invoke(
        &self,
        page: &mut dyn BrowserPage,
        function: ExtractFn,
    ) -> Result<serde_json::Value, BrowserError> {
        debug!(function = function.name(), "Running extraction function");
        page.evaluate(&self.expression(function)).await
    }

    /// Evaluate a function that returns a string; null and blank become `None`
    pub async fn invoke_text(
        &self,
        page: &mut dyn BrowserPage,
        function: ExtractFn,
    ) -> Result<Option<String>, BrowserError> {
        let value = self.invoke(page, function).await?;
        Ok(match value {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
            _ => None,
        })
    }

    /// Evaluate `extractDiscussionContent()`
    pub async fn discussion_content(
        &self,
        page: &mut dyn BrowserPage,
    ) -> Result<RawDiscussionContent, BrowserError> {
        let value = self.invoke(page, ExtractFn::DiscussionContent).await?;
        if value.is_null() {
            return Ok(RawDiscussionContent {
                error: Some("extraction returned null".to_string()),
                ..Default::default()
            });
        }
        serde_json::from_value(value).map_err(|e| BrowserError::Evaluation(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expression_wraps_source() {
        let scripts = ExtractionScripts::from_source("function extractDescription() { return 'x'; }");
        let expr = scripts.expression(ExtractFn::Description);

        assert!(expr.starts_with("(() => {"));
        assert!(expr.contains("function extractDescription()"));
        assert!(expr.contains("return extractDescription();"));
        assert!(expr.ends_with("})()"));
    }

    #[test]
    fn test_discussion_content_decoding() {
        let raw: RawDiscussionContent = serde_json::from_value(serde_json::json!({
            "content": "Great write-up",
            "posted_datetime": "Thu Jan 1 2024 12:00:00 GMT+0530",
            "competitionRank": "2nd",
            "kaggleRank": 1234,
            "medalType": "gold"
        }))
        .unwrap();

        assert_eq!(raw.content.as_deref(), Some("Great write-up"));
        assert_eq!(raw.posted_datetime.as_deref(), Some("Thu Jan 1 2024 12:00:00 GMT+0530"));
        assert_eq!(raw.competition_rank.as_deref(), Some("2nd"));
        assert_eq!(raw.kaggle_rank.as_deref(), Some("1234"));
        assert_eq!(raw.medal_type.as_deref(), Some("gold"));
        assert!(raw.error.is_none());
    }

    #[test]
    fn test_discussion_error_payload() {
        let raw: RawDiscussionContent =
            serde_json::from_value(serde_json::json!({ "error": "no content node" })).unwrap();
        assert_eq!(raw.error.as_deref(), Some("no content node"));
        assert!(raw.content.is_none());
    }
}
