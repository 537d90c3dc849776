//! Selector registry
//!
//! Listing markup changes far more often than crawl logic, so every selector
//! lives in a TOML file as an ordered fallback chain. The kaggle.com chains
//! are embedded; a file on disk can replace them.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

const EMBEDDED_KAGGLE: &str = include_str!("../selectors/kaggle.toml");

/// Errors loading a selector file
#[derive(Debug, Error)]
pub enum SelectorConfigError {
    #[error("Failed to read selector file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid selector file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Selector chain {0} is empty")]
    EmptyChain(&'static str),
}

/// Selectors of one paginated listing
#[derive(Debug, Clone, Deserialize)]
pub struct ListingSelectors {
    /// Container that signals the list has rendered, tried in order
    pub ready: Vec<String>,
    /// Waited for after the container; defaults to `items`
    #[serde(default)]
    pub items_ready: Option<String>,
    /// One match per listed item
    pub items: String,
    /// Link inside an item; absent when the item itself is the link
    #[serde(default)]
    pub link: Option<String>,
    /// Title inside an item, tried in order
    pub title: Vec<String>,
    /// Path segment of the listing itself, never a valid item id
    pub root_segment: String,
}

impl ListingSelectors {
    pub fn items_ready(&self) -> &str {
        self.items_ready.as_deref().unwrap_or(&self.items)
    }
}

/// Per-item fields read from the discussion listing
#[derive(Debug, Clone, Deserialize)]
pub struct DiscussionFieldSelectors {
    pub upvotes: Vec<String>,
    pub author: Vec<String>,
}

/// The "next page" control
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationSelectors {
    /// Next-page control, tried in order
    pub next: Vec<String>,
    /// CSS class marking the control as disabled
    pub disabled_class: String,
}

/// All selector chains used by a crawl
#[derive(Debug, Clone, Deserialize)]
pub struct SelectorConfig {
    pub competitions: ListingSelectors,
    pub discussions: ListingSelectors,
    pub discussion_fields: DiscussionFieldSelectors,
    pub pagination: PaginationSelectors,
}

impl SelectorConfig {
    /// The embedded kaggle.com selectors
    pub fn kaggle() -> Result<Self, SelectorConfigError> {
        Self::from_toml(EMBEDDED_KAGGLE)
    }

    pub fn from_toml(content: &str) -> Result<Self, SelectorConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, SelectorConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    fn validate(&self) -> Result<(), SelectorConfigError> {
        let chains: [(&'static str, &Vec<String>); 6] = [
            ("competitions.ready", &self.competitions.ready),
            ("competitions.title", &self.competitions.title),
            ("discussions.ready", &self.discussions.ready),
            ("discussions.title", &self.discussions.title),
            ("discussion_fields.upvotes", &self.discussion_fields.upvotes),
            ("pagination.next", &self.pagination.next),
        ];

        for (name, chain) in chains {
            if chain.iter().all(|s| s.trim().is_empty()) {
                return Err(SelectorConfigError::EmptyChain(name));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_selectors_load() {
        let config = SelectorConfig::from_toml(EMBEDDED_KAGGLE).unwrap();

        assert_eq!(config.competitions.ready.len(), 2);
        assert!(config.competitions.link.is_none());
        assert_eq!(config.competitions.items_ready(), config.competitions.items);
        assert_eq!(config.discussions.link.as_deref(), Some("a[href*='/discussion/']"));
        assert_eq!(config.discussions.root_segment, "discussion");
        assert_eq!(config.pagination.disabled_class, "Mui-disabled");
    }

    #[test]
    fn test_title_chain_order_is_kept() {
        let config = SelectorConfig::kaggle().unwrap();
        assert_eq!(config.competitions.title, [".sc-dFaThA", "h3", ".sc-jPkiSJ"]);
        assert_eq!(config.discussions.title, [".sc-dFaThA", ".sc-jPkiSJ", "h3"]);
    }

    #[test]
    fn test_empty_chain_is_rejected() {
        let content = EMBEDDED_KAGGLE.replace(
            "upvotes = [\"span[aria-live='polite']\"]",
            "upvotes = []",
        );
        let err = SelectorConfig::from_toml(&content).unwrap_err();
        assert!(matches!(err, SelectorConfigError::EmptyChain("discussion_fields.upvotes")));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("selectors.toml");
        std::fs::write(&path, EMBEDDED_KAGGLE).unwrap();

        let config = SelectorConfig::load(&path).unwrap();
        assert_eq!(config.pagination.next.len(), 2);

        let missing = SelectorConfig::load(&dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(SelectorConfigError::Io(_))));
    }
}
