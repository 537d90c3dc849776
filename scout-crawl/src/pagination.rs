//! Paginated listing crawler
//!
//! One listing is walked as a loop of three steps:
//! - FetchPage: load `page=N`, wait for quiescence and the list container
//! - ExtractItems: collect unique, valid item links and hand them to a visitor
//! - Paginate: find the next-page control, stop if it is missing or disabled
//!
//! Every way the loop can end is a [`TerminalReason`]; none of them is an error.

use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};

use scout_browser::{BrowserPage, ElementRef, ListingSelectors, PaginationSelectors};
use scout_core::{is_valid_record_id, record_id_from_href};

use crate::{ItemError, Pacer};

/// Placeholder substituted with the page number in a listing URL template
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Why a listing crawl stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalReason {
    MaxPages,
    NoContainer,
    NoItems,
    NextMissing,
    NextDisabled,
    NavigationFailed,
    StoppedByVisitor,
}

impl std::fmt::Display for TerminalReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            TerminalReason::MaxPages => "page limit reached",
            TerminalReason::NoContainer => "listing did not render",
            TerminalReason::NoItems => "no items on page",
            TerminalReason::NextMissing => "no next-page control",
            TerminalReason::NextDisabled => "next-page control disabled",
            TerminalReason::NavigationFailed => "navigation failed",
            TerminalReason::StoppedByVisitor => "stopped early",
        };
        f.write_str(reason)
    }
}

/// Result of one iteration of the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    Continue(u32),
    Terminal(TerminalReason),
}

/// What to crawl and how long to wait
#[derive(Debug, Clone)]
pub struct ListingPlan {
    /// Short name for logs
    pub label: String,
    /// Listing URL containing [`PAGE_PLACEHOLDER`]
    pub url_template: String,
    pub listing: ListingSelectors,
    pub pagination: PaginationSelectors,
    pub max_pages: u32,
    /// Per-selector wait for the list container
    pub container_timeout: Duration,
    /// Wait for the first item once the container exists
    pub items_timeout: Duration,
}

impl ListingPlan {
    pub fn new(
        label: impl Into<String>,
        url_template: impl Into<String>,
        listing: ListingSelectors,
        pagination: PaginationSelectors,
        max_pages: u32,
    ) -> Self {
        Self {
            label: label.into(),
            url_template: url_template.into(),
            listing,
            pagination,
            max_pages,
            container_timeout: Duration::from_secs(30),
            items_timeout: Duration::from_secs(60),
        }
    }

    pub fn with_timeouts(mut self, container: Duration, items: Duration) -> Self {
        self.container_timeout = container;
        self.items_timeout = items;
        self
    }

    pub fn page_url(&self, page: u32) -> String {
        self.url_template
            .replace(PAGE_PLACEHOLDER, &page.to_string())
    }
}

/// A listed item with a usable link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    /// The matched item element
    pub element: ElementRef,
    /// The link element; equal to `element` when the item is the link
    pub link: ElementRef,
    pub href: String,
    pub id: String,
}

/// Items of one listing page
#[derive(Debug)]
pub struct ListingPage {
    pub number: u32,
    pub items: Vec<ListItem>,
    /// Items that could not be turned into a [`ListItem`]
    pub item_errors: Vec<ItemError>,
}

/// Whether the crawl goes on after a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitDecision {
    Continue,
    Stop,
}

/// Processes the items of each listing page
#[async_trait]
pub trait PageVisitor: Send {
    /// `listing` is the page the items were found on; their handles stay
    /// valid for the duration of the call
    async fn visit(&mut self, listing: &mut dyn BrowserPage, page: ListingPage) -> VisitDecision;
}

/// Totals of one listing crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSummary {
    pub pages_visited: u32,
    pub items_seen: usize,
    pub item_errors: usize,
    pub terminal: TerminalReason,
}

/// Generic FetchPage → ExtractItems → Paginate loop
#[derive(Debug, Clone)]
pub struct PaginatedListCrawler {
    plan: ListingPlan,
    pacer: Pacer,
}

impl PaginatedListCrawler {
    pub fn new(plan: ListingPlan, pacer: Pacer) -> Self {
        Self { plan, pacer }
    }

    pub fn plan(&self) -> &ListingPlan {
        &self.plan
    }

    /// Walk the listing from page 1 on `page`
    pub async fn run(
        &self,
        page: &mut dyn BrowserPage,
        visitor: &mut dyn PageVisitor,
    ) -> CrawlSummary {
        let mut summary = CrawlSummary {
            pages_visited: 0,
            items_seen: 0,
            item_errors: 0,
            terminal: TerminalReason::MaxPages,
        };
        let mut current = 1;

        if self.plan.max_pages == 0 {
            return summary;
        }

        loop {
            match self.step(page, visitor, current, &mut summary).await {
                PageOutcome::Continue(next) => current = next,
                PageOutcome::Terminal(reason) => {
                    info!(
                        listing = %self.plan.label,
                        page = current,
                        reason = %reason,
                        "Listing crawl finished"
                    );
                    summary.terminal = reason;
                    return summary;
                }
            }
        }
    }

    async fn step(
        &self,
        page: &mut dyn BrowserPage,
        visitor: &mut dyn PageVisitor,
        number: u32,
        summary: &mut CrawlSummary,
    ) -> PageOutcome {
        if let Err(reason) = self.fetch_page(page, number).await {
            return PageOutcome::Terminal(reason);
        }
        summary.pages_visited += 1;

        let listing = self.extract_items(page, number).await;
        summary.item_errors += listing.item_errors.len();
        if listing.items.is_empty() {
            for e in &listing.item_errors {
                debug!(listing = %self.plan.label, error = %e, "Unusable item");
            }
            return PageOutcome::Terminal(TerminalReason::NoItems);
        }

        info!(
            listing = %self.plan.label,
            page = number,
            items = listing.items.len(),
            "Found unique items"
        );
        summary.items_seen += listing.items.len();

        if visitor.visit(page, listing).await == VisitDecision::Stop {
            return PageOutcome::Terminal(TerminalReason::StoppedByVisitor);
        }

        self.paginate(page, number).await
    }

    /// Navigate to page `number` and wait until its list has rendered
    async fn fetch_page(
        &self,
        page: &mut dyn BrowserPage,
        number: u32,
    ) -> Result<(), TerminalReason> {
        let url = self.plan.page_url(number);
        info!(listing = %self.plan.label, page = number, url = %url, "Fetching listing page");

        if let Err(e) = page.navigate(&url).await {
            warn!(listing = %self.plan.label, page = number, error = %e, "Listing navigation failed");
            return Err(TerminalReason::NavigationFailed);
        }
        if let Err(e) = page.wait_for_network_idle().await {
            debug!(page = number, error = %e, "Network idle wait failed");
        }

        let mut container_found = false;
        for selector in &self.plan.listing.ready {
            match page
                .wait_for_selector(selector, self.plan.container_timeout)
                .await
            {
                Ok(()) => {
                    container_found = true;
                    break;
                }
                Err(e) => debug!(selector = %selector, error = %e, "Container selector missed"),
            }
        }
        if !container_found {
            warn!(listing = %self.plan.label, page = number, "No listing container found");
            return Err(TerminalReason::NoContainer);
        }

        if let Err(e) = page
            .wait_for_selector(self.plan.listing.items_ready(), self.plan.items_timeout)
            .await
        {
            info!(listing = %self.plan.label, page = number, error = %e, "No items appeared");
            return Err(TerminalReason::NoItems);
        }
        Ok(())
    }

    /// Unique items with a valid id, in page order
    async fn extract_items(&self, page: &mut dyn BrowserPage, number: u32) -> ListingPage {
        let mut listing = ListingPage {
            number,
            items: Vec::new(),
            item_errors: Vec::new(),
        };

        let elements = match page.query_selector_all(&self.plan.listing.items).await {
            Ok(elements) => elements,
            Err(e) => {
                warn!(listing = %self.plan.label, page = number, error = %e, "Item query failed");
                return listing;
            }
        };

        let mut seen_hrefs = HashSet::new();
        for (index, element) in elements.into_iter().enumerate() {
            let link = match &self.plan.listing.link {
                None => Some(element),
                Some(selector) => page.query_within(element, selector).await.ok().flatten(),
            };
            let Some(link) = link else {
                listing
                    .item_errors
                    .push(ItemError::MissingLink { page: number, index });
                continue;
            };

            let href = match page.attribute(link, "href").await {
                Ok(Some(href)) if !href.trim().is_empty() => href.trim().to_string(),
                _ => continue,
            };
            let id = record_id_from_href(&href).to_string();
            if !is_valid_record_id(&id, &self.plan.listing.root_segment)
                || !seen_hrefs.insert(href.clone())
            {
                continue;
            }

            listing.items.push(ListItem {
                element,
                link,
                href,
                id,
            });
        }

        listing
    }

    /// Advance past page `number` by clicking the next-page control
    async fn paginate(&self, page: &mut dyn BrowserPage, number: u32) -> PageOutcome {
        if number >= self.plan.max_pages {
            return PageOutcome::Terminal(TerminalReason::MaxPages);
        }

        let Some(next) = self.find_next_control(page).await else {
            return PageOutcome::Terminal(TerminalReason::NextMissing);
        };
        if self.is_disabled(page, next).await {
            return PageOutcome::Terminal(TerminalReason::NextDisabled);
        }

        debug!(listing = %self.plan.label, page = number + 1, "Going to next page");
        if let Err(e) = page.click(next).await {
            warn!(listing = %self.plan.label, page = number, error = %e, "Next-page click failed");
            return PageOutcome::Terminal(TerminalReason::NavigationFailed);
        }
        if let Err(e) = page.wait_for_network_idle().await {
            debug!(page = number + 1, error = %e, "Network idle wait failed");
        }
        self.pacer.pause().await;

        PageOutcome::Continue(number + 1)
    }

    async fn find_next_control(&self, page: &mut dyn BrowserPage) -> Option<ElementRef> {
        for selector in &self.plan.pagination.next {
            match page.query_selector(selector).await {
                Ok(Some(element)) => return Some(element),
                Ok(None) => {}
                Err(e) => debug!(selector = %selector, error = %e, "Next-page selector failed"),
            }
        }
        None
    }

    /// Disabled when the `disabled` attribute is set to anything but
    /// `"false"` or the class list carries the disabled marker class
    async fn is_disabled(&self, page: &mut dyn BrowserPage, next: ElementRef) -> bool {
        let disabled = page.attribute(next, "disabled").await.ok().flatten();
        if disabled.is_some_and(|value| value != "false") {
            return true;
        }

        let class = page.attribute(next, "class").await.ok().flatten();
        class.is_some_and(|class| {
            class
                .split_whitespace()
                .any(|c| c == self.plan.pagination.disabled_class)
        })
    }
}
