//! Crawl error types

use scout_browser::BrowserError;
use thiserror::Error;

/// Failure of a single listed item; logged and counted, never fatal
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("Item {index} on page {page} has no link")]
    MissingLink { page: u32, index: usize },

    #[error("Item {id}: {source}")]
    Browser {
        id: String,
        #[source]
        source: BrowserError,
    },
}

impl ItemError {
    pub fn browser(id: &str, source: BrowserError) -> Self {
        ItemError::Browser {
            id: id.to_string(),
            source,
        }
    }
}

/// Failures that abort a whole run
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),
}
