//! Records collected by a crawl run
//!
//! Both record kinds are keyed by a stable id: the final path segment of the
//! URL they were discovered at.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::format_utc;

/// The two persisted record kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Competition,
    Discussion,
}

impl RecordKind {
    /// Document store collection holding this kind
    pub fn collection(&self) -> &'static str {
        match self {
            RecordKind::Competition => "competitions",
            RecordKind::Discussion => "discussions",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.collection())
    }
}

/// A competition and its normalized detail fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionRecord {
    pub id: String,
    pub title: String,
    pub url: String,
    pub description: String,
    pub evaluation: String,
    /// ISO-UTC, `"Indefinite"` or an `"Error: ..."` marker
    pub deadline: String,
    /// ISO-UTC, `"Indefinite"` or an `"Error: ..."` marker
    pub start_time: String,
    pub page_found: u32,
    pub scraped_at: String,
}

/// A popular discussion thread of a competition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscussionRecord {
    pub id: String,
    pub competition_id: String,
    pub title: String,
    pub url: String,
    pub author: String,
    pub content: String,
    pub upvotes: u32,
    pub post_date: String,
    pub author_competition_rank: Option<u32>,
    pub author_kaggle_rank: Option<String>,
    pub medal_type: Option<String>,
    pub page_found: u32,
    pub scraped_at: String,
}

/// Anything persisted under a stable id
pub trait Record: Serialize {
    const KIND: RecordKind;

    fn id(&self) -> &str;
}

impl Record for CompetitionRecord {
    const KIND: RecordKind = RecordKind::Competition;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for DiscussionRecord {
    const KIND: RecordKind = RecordKind::Discussion;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Minimum stored state needed to detect a changed record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSnapshot {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub upvotes: Option<u64>,
}

impl RecordSnapshot {
    pub fn new(id: &str, title: &str, upvotes: u32) -> Self {
        Self {
            id: id.to_string(),
            title: Some(title.to_string()),
            upvotes: Some(u64::from(upvotes)),
        }
    }

    /// Same title and upvote count as `existing`
    pub fn matches(&self, existing: &RecordSnapshot) -> bool {
        self.id == existing.id && self.title == existing.title && self.upvotes == existing.upvotes
    }
}

/// Id of an item: the last path segment of its href, without query or fragment
pub fn record_id_from_href(href: &str) -> &str {
    let path = href.split(['?', '#']).next().unwrap_or_default();
    path.rsplit('/').next().unwrap_or_default()
}

/// Whether an id is usable: non-empty, not the listing root, at least 3 chars
pub fn is_valid_record_id(id: &str, listing_root: &str) -> bool {
    !id.is_empty() && id != listing_root && id.chars().count() >= 3
}

/// Absolute URL of an href found on `base_url`
pub fn absolute_url(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if href.starts_with('/') {
        format!("{}{}", base_url.trim_end_matches('/'), href)
    } else {
        format!("{}/{}", base_url.trim_end_matches('/'), href)
    }
}

/// Timestamp stored in `scraped_at`
pub fn scrape_timestamp(now: DateTime<Utc>) -> String {
    format_utc(&now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_is_last_path_segment() {
        assert_eq!(record_id_from_href("/competitions/titanic"), "titanic");
        assert_eq!(
            record_id_from_href("/competitions/titanic/discussion/123456"),
            "123456"
        );
        assert_eq!(
            record_id_from_href("/competitions/titanic?tab=overview"),
            "titanic"
        );
        assert_eq!(record_id_from_href("/competitions/"), "");
        assert_eq!(record_id_from_href(""), "");
    }

    #[test]
    fn test_invalid_ids() {
        assert!(!is_valid_record_id("", "competitions"));
        assert!(!is_valid_record_id("competitions", "competitions"));
        assert!(!is_valid_record_id("ab", "competitions"));
        assert!(is_valid_record_id("abc", "competitions"));
    }

    #[test]
    fn test_absolute_url() {
        assert_eq!(
            absolute_url("https://www.kaggle.com/", "/competitions/titanic"),
            "https://www.kaggle.com/competitions/titanic"
        );
        assert_eq!(
            absolute_url("https://www.kaggle.com", "https://other.org/x"),
            "https://other.org/x"
        );
    }

    #[test]
    fn test_snapshot_matching() {
        let existing = RecordSnapshot::new("42", "T", 42);
        assert!(RecordSnapshot::new("42", "T", 42).matches(&existing));
        assert!(!RecordSnapshot::new("42", "T", 43).matches(&existing));
        assert!(!RecordSnapshot::new("42", "U", 42).matches(&existing));
    }

    #[test]
    fn test_collections() {
        assert_eq!(RecordKind::Competition.collection(), "competitions");
        assert_eq!(RecordKind::Discussion.to_string(), "discussions");
    }
}
