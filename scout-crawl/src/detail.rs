//! Item detail extraction
//!
//! Detail fields come from the in-page extraction function set, evaluated on
//! a fresh tab per item. Listing-level fields (title, upvotes, author) are
//! read from the item element through selector chains.

use std::sync::Arc;
use tracing::{debug, warn};

use scout_browser::{Browser, BrowserPage, ElementRef, ExtractFn, ExtractionScripts};
use scout_core::{date_field, is_known_date, parse_rank, parse_upvotes, TextNormalizer, INDEFINITE};

use crate::ItemError;

/// Title used when no selector in the chain yields text
pub const UNKNOWN_TITLE: &str = "Unknown title";

/// Author used when the author element is missing
pub const UNKNOWN_AUTHOR: &str = "Unknown author";

/// Normalized detail fields of a competition
#[derive(Debug, Clone, PartialEq)]
pub struct CompetitionDetails {
    pub description: String,
    pub evaluation: String,
    pub deadline: String,
    pub start_time: String,
}

/// Normalized detail fields of a discussion
#[derive(Debug, Clone, PartialEq)]
pub struct DiscussionDetails {
    pub content: String,
    pub post_date: String,
    pub author_competition_rank: Option<u32>,
    pub author_kaggle_rank: Option<String>,
    pub medal_type: Option<String>,
}

pub struct ItemDetailExtractor {
    browser: Arc<dyn Browser>,
    scripts: ExtractionScripts,
    normalizer: TextNormalizer,
}

impl ItemDetailExtractor {
    pub fn new(browser: Arc<dyn Browser>, scripts: ExtractionScripts) -> Self {
        Self {
            browser,
            scripts,
            normalizer: TextNormalizer::new(),
        }
    }

    /// Open `url` in a new tab and wait for it to settle
    async fn open(&self, id: &str, url: &str) -> Result<Box<dyn BrowserPage>, ItemError> {
        let mut page = self
            .browser
            .new_page()
            .await
            .map_err(|e| ItemError::browser(id, e))?;

        if let Err(e) = page.navigate(url).await {
            close_quietly(page.as_mut()).await;
            return Err(ItemError::browser(id, e));
        }
        if let Err(e) = page.wait_for_network_idle().await {
            debug!(id, error = %e, "Network idle wait failed");
        }
        Ok(page)
    }

    pub async fn competition_details(
        &self,
        id: &str,
        url: &str,
    ) -> Result<CompetitionDetails, ItemError> {
        let mut page = self.open(id, url).await?;
        let details = self.read_competition(id, page.as_mut()).await;
        close_quietly(page.as_mut()).await;
        details
    }

    async fn read_competition(
        &self,
        id: &str,
        page: &mut dyn BrowserPage,
    ) -> Result<CompetitionDetails, ItemError> {
        let description = self.long_text(id, page, ExtractFn::Description).await?;
        let evaluation = self.long_text(id, page, ExtractFn::Evaluation).await?;
        let deadline = self.date(id, page, ExtractFn::Deadline).await?;
        let start_time = self.date(id, page, ExtractFn::StartTime).await?;

        Ok(CompetitionDetails {
            description,
            evaluation,
            deadline,
            start_time,
        })
    }

    async fn long_text(
        &self,
        id: &str,
        page: &mut dyn BrowserPage,
        function: ExtractFn,
    ) -> Result<String, ItemError> {
        let raw = self
            .scripts
            .invoke_text(page, function)
            .await
            .map_err(|e| ItemError::browser(id, e))?;
        Ok(raw
            .map(|text| self.normalizer.normalize(&text, true))
            .unwrap_or_default())
    }

    async fn date(
        &self,
        id: &str,
        page: &mut dyn BrowserPage,
        function: ExtractFn,
    ) -> Result<String, ItemError> {
        let raw = self
            .scripts
            .invoke_text(page, function)
            .await
            .map_err(|e| ItemError::browser(id, e))?;
        Ok(checked_date(id, function.name(), raw.as_deref()))
    }

    pub async fn discussion_details(
        &self,
        id: &str,
        url: &str,
    ) -> Result<DiscussionDetails, ItemError> {
        let mut page = self.open(id, url).await?;
        let raw = self.scripts.discussion_content(page.as_mut()).await;
        close_quietly(page.as_mut()).await;
        let raw = raw.map_err(|e| ItemError::browser(id, e))?;

        let content = match (&raw.error, &raw.content) {
            (Some(error), _) => {
                warn!(discussion_id = id, error = %error, "Discussion content extraction failed");
                String::new()
            }
            (None, Some(content)) if !content.is_empty() => {
                self.normalizer.normalize(content, true)
            }
            _ => String::new(),
        };

        Ok(DiscussionDetails {
            content,
            post_date: checked_date(id, "posted_datetime", raw.posted_datetime.as_deref()),
            author_competition_rank: raw.competition_rank.as_deref().and_then(parse_rank),
            author_kaggle_rank: raw.kaggle_rank,
            medal_type: raw.medal_type,
        })
    }
}

/// [`date_field`], logging values that failed to parse
fn checked_date(id: &str, field: &str, raw: Option<&str>) -> String {
    let value = date_field(raw);
    if value != INDEFINITE && !is_known_date(&value) {
        warn!(id, field, value = %value, "Unparsable date");
    }
    value
}

async fn close_quietly(page: &mut dyn BrowserPage) {
    if let Err(e) = page.close().await {
        debug!(error = %e, "Page close failed");
    }
}

/// First non-empty trimmed text under `item` along a selector chain
pub async fn first_text(
    page: &mut dyn BrowserPage,
    item: ElementRef,
    chain: &[String],
) -> Option<String> {
    for selector in chain {
        let element = match page.query_within(item, selector).await {
            Ok(Some(element)) => element,
            Ok(None) => continue,
            Err(e) => {
                debug!(selector = %selector, error = %e, "Selector failed");
                continue;
            }
        };
        if let Ok(Some(text)) = page.text_content(element).await {
            let text = text.trim();
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }
    }
    None
}

/// Item title, `"Unknown title"` when the chain finds nothing
pub async fn read_title(page: &mut dyn BrowserPage, item: ElementRef, chain: &[String]) -> String {
    first_text(page, item, chain)
        .await
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string())
}

/// Upvote count shown on a listing item, 0 when absent
pub async fn read_upvotes(page: &mut dyn BrowserPage, item: ElementRef, chain: &[String]) -> u32 {
    first_text(page, item, chain)
        .await
        .map(|text| parse_upvotes(&text))
        .unwrap_or(0)
}

pub async fn read_author(page: &mut dyn BrowserPage, item: ElementRef, chain: &[String]) -> String {
    first_text(page, item, chain)
        .await
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string())
}
