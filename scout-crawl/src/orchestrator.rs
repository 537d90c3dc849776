//! Crawl orchestration
//!
//! A run walks the active-competition listing; for every new competition it
//! extracts the detail page, then walks that competition's discussion listing
//! (sorted by votes) and collects the discussions above the upvote threshold
//! that changed since the last run. Everything collected is persisted once at
//! the end of the run.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use scout_browser::{Browser, BrowserPage, ExtractionScripts, SelectorConfig};
use scout_core::{
    absolute_url, scrape_timestamp, CompetitionRecord, DiscussionRecord, RecordKind,
    RecordSnapshot, DEFAULT_BASE_URL, DEFAULT_MAX_DISCUSSION_PAGES, DEFAULT_MAX_PAGES,
    DEFAULT_MIN_UPVOTES,
};
use scout_store::{persist_run, DocumentStore, IncrementalStateStore, PersistOutcome};

use crate::{
    read_author, read_title, read_upvotes, CrawlError, ItemDetailExtractor, ListingPage,
    ListingPlan, Pacer, PageVisitor, PaginatedListCrawler, TerminalReason, VisitDecision,
};

/// Crawl limits and pacing
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub base_url: String,
    /// Competition listing pages to walk
    pub max_pages: u32,
    /// Discussion listing pages to walk per competition
    pub max_discussion_pages: u32,
    pub min_upvotes: u32,
    pub pacer: Pacer,
    pub container_timeout: Duration,
    pub items_timeout: Duration,
    /// Where snapshot files go when the store is unavailable
    pub backup_dir: PathBuf,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_pages: DEFAULT_MAX_PAGES,
            max_discussion_pages: DEFAULT_MAX_DISCUSSION_PAGES,
            min_upvotes: DEFAULT_MIN_UPVOTES,
            pacer: Pacer::default(),
            container_timeout: Duration::from_secs(30),
            items_timeout: Duration::from_secs(60),
            backup_dir: PathBuf::from("."),
        }
    }
}

impl CrawlConfig {
    pub fn competitions_url_template(&self) -> String {
        format!(
            "{}/competitions?listOption=active&page={{page}}",
            self.base_url.trim_end_matches('/')
        )
    }
}

/// Discussion listing of a competition, most upvoted first
pub fn discussions_url_template(competition_url: &str) -> String {
    format!(
        "{}/discussion?sort=votes&page={{page}}",
        competition_url.trim_end_matches('/')
    )
}

/// Records and counters of one run; ids are unique within each collection
#[derive(Debug, Default)]
pub struct RunAccumulator {
    pub competitions: Vec<CompetitionRecord>,
    pub discussions: Vec<DiscussionRecord>,
    competition_ids: HashSet<String>,
    discussion_ids: HashSet<String>,
    pub item_errors: usize,
    pub skipped_unchanged: usize,
    pub duplicates: usize,
}

impl RunAccumulator {
    pub fn has_competition(&self, id: &str) -> bool {
        self.competition_ids.contains(id)
    }

    pub fn has_discussion(&self, id: &str) -> bool {
        self.discussion_ids.contains(id)
    }

    /// Append unless the id is already present
    pub fn push_competition(&mut self, record: CompetitionRecord) -> bool {
        if !self.competition_ids.insert(record.id.clone()) {
            return false;
        }
        self.competitions.push(record);
        true
    }

    /// Append unless the id is already present
    pub fn push_discussion(&mut self, record: DiscussionRecord) -> bool {
        if !self.discussion_ids.insert(record.id.clone()) {
            return false;
        }
        self.discussions.push(record);
        true
    }
}

/// Outcome of a run
#[derive(Debug)]
pub struct RunReport {
    pub competitions: usize,
    pub discussions: usize,
    pub item_errors: usize,
    pub skipped_unchanged: usize,
    pub duplicates: usize,
    pub competition_pages: u32,
    pub terminal: TerminalReason,
    pub persistence: PersistOutcome,
    pub elapsed: Duration,
}

/// Shared, read-only inputs of the visitors
#[derive(Clone, Copy)]
struct RunContext<'a> {
    browser: &'a dyn Browser,
    extractor: &'a ItemDetailExtractor,
    selectors: &'a SelectorConfig,
    config: &'a CrawlConfig,
}

pub struct CrawlOrchestrator {
    browser: Arc<dyn Browser>,
    store: Arc<dyn DocumentStore>,
    state: IncrementalStateStore,
    selectors: SelectorConfig,
    extractor: ItemDetailExtractor,
    config: CrawlConfig,
}

impl CrawlOrchestrator {
    pub fn new(
        browser: Arc<dyn Browser>,
        store: Arc<dyn DocumentStore>,
        state: IncrementalStateStore,
        selectors: SelectorConfig,
        scripts: ExtractionScripts,
        config: CrawlConfig,
    ) -> Self {
        let extractor = ItemDetailExtractor::new(browser.clone(), scripts);
        Self {
            browser,
            store,
            state,
            selectors,
            extractor,
            config,
        }
    }

    fn competition_plan(&self) -> ListingPlan {
        ListingPlan::new(
            "competitions",
            self.config.competitions_url_template(),
            self.selectors.competitions.clone(),
            self.selectors.pagination.clone(),
            self.config.max_pages,
        )
        .with_timeouts(self.config.container_timeout, self.config.items_timeout)
    }

    /// Crawl everything, then persist. Only a browser that cannot open a
    /// page aborts the run.
    pub async fn run(mut self) -> Result<RunReport, CrawlError> {
        let started = Instant::now();
        info!(
            watermark = %self.state.last_scrape_time().to_rfc3339(),
            max_pages = self.config.max_pages,
            min_upvotes = self.config.min_upvotes,
            "Starting crawl"
        );

        self.state.load_existing(RecordKind::Discussion).await;

        let mut acc = RunAccumulator::default();
        let mut listing = self.browser.new_page().await?;
        let crawler = PaginatedListCrawler::new(self.competition_plan(), self.config.pacer);

        let summary = {
            let mut visitor = CompetitionVisitor {
                ctx: RunContext {
                    browser: self.browser.as_ref(),
                    extractor: &self.extractor,
                    selectors: &self.selectors,
                    config: &self.config,
                },
                state: &mut self.state,
                acc: &mut acc,
            };
            crawler.run(listing.as_mut(), &mut visitor).await
        };
        if let Err(e) = listing.close().await {
            debug!(error = %e, "Listing page close failed");
        }

        info!(
            competitions = acc.competitions.len(),
            discussions = acc.discussions.len(),
            "Extraction finished"
        );

        let persistence = persist_run(
            self.store.as_ref(),
            &acc.competitions,
            &acc.discussions,
            &self.config.backup_dir,
            Utc::now(),
        )
        .await;

        Ok(RunReport {
            competitions: acc.competitions.len(),
            discussions: acc.discussions.len(),
            item_errors: acc.item_errors,
            skipped_unchanged: acc.skipped_unchanged,
            duplicates: acc.duplicates,
            competition_pages: summary.pages_visited,
            terminal: summary.terminal,
            persistence,
            elapsed: started.elapsed(),
        })
    }
}

struct CompetitionVisitor<'a> {
    ctx: RunContext<'a>,
    state: &'a mut IncrementalStateStore,
    acc: &'a mut RunAccumulator,
}

impl CompetitionVisitor<'_> {
    /// Walk the discussion listing of one competition; returns how many
    /// discussions were collected
    async fn crawl_discussions(&mut self, competition_id: &str, competition_url: &str) -> usize {
        let mut page = match self.ctx.browser.new_page().await {
            Ok(page) => page,
            Err(e) => {
                warn!(competition_id, error = %e, "Could not open discussion listing");
                self.acc.item_errors += 1;
                return 0;
            }
        };

        let plan = ListingPlan::new(
            format!("discussions/{competition_id}"),
            discussions_url_template(competition_url),
            self.ctx.selectors.discussions.clone(),
            self.ctx.selectors.pagination.clone(),
            self.ctx.config.max_discussion_pages,
        )
        .with_timeouts(self.ctx.config.container_timeout, self.ctx.config.items_timeout);

        let before = self.acc.discussions.len();
        let mut visitor = DiscussionVisitor {
            ctx: self.ctx,
            state: &*self.state,
            acc: &mut *self.acc,
            competition_id,
            eligible_total: 0,
        };
        let summary = PaginatedListCrawler::new(plan, self.ctx.config.pacer)
            .run(page.as_mut(), &mut visitor)
            .await;
        info!(
            competition_id,
            eligible = visitor.eligible_total,
            pages = summary.pages_visited,
            "Discussions above threshold"
        );

        if let Err(e) = page.close().await {
            debug!(error = %e, "Discussion listing close failed");
        }
        self.acc.discussions.len() - before
    }
}

#[async_trait]
impl<'a> PageVisitor for CompetitionVisitor<'a> {
    async fn visit(&mut self, listing: &mut dyn BrowserPage, page: ListingPage) -> VisitDecision {
        for error in &page.item_errors {
            warn!(page = page.number, error = %error, "Skipping competition item");
            self.acc.item_errors += 1;
        }

        for item in page.items {
            let title = read_title(listing, item.element, &self.ctx.selectors.competitions.title).await;
            if self.acc.has_competition(&item.id) {
                debug!(competition_id = %item.id, "Skipping duplicate competition");
                self.acc.duplicates += 1;
                continue;
            }

            let url = absolute_url(&self.ctx.config.base_url, &item.href);
            info!(competition_id = %item.id, title = %title, page = page.number, "Processing competition");

            let details = self.ctx.extractor.competition_details(&item.id, &url).await;
            self.ctx.config.pacer.pause().await;
            let details = match details {
                Ok(details) => details,
                Err(e) => {
                    warn!(competition_id = %item.id, error = %e, "Competition extraction failed");
                    self.acc.item_errors += 1;
                    continue;
                }
            };

            self.acc.push_competition(CompetitionRecord {
                id: item.id.clone(),
                title,
                url: url.clone(),
                description: details.description,
                evaluation: details.evaluation,
                deadline: details.deadline,
                start_time: details.start_time,
                page_found: page.number,
                scraped_at: scrape_timestamp(Utc::now()),
            });

            let collected = self.crawl_discussions(&item.id, &url).await;
            info!(competition_id = %item.id, discussions = collected, "Competition done");

            if let Err(e) = self.state.record_progress(Utc::now()).await {
                warn!(competition_id = %item.id, error = %e, "Could not save run state");
            }
        }

        VisitDecision::Continue
    }
}

struct DiscussionVisitor<'a> {
    ctx: RunContext<'a>,
    state: &'a IncrementalStateStore,
    acc: &'a mut RunAccumulator,
    competition_id: &'a str,
    eligible_total: usize,
}

#[async_trait]
impl<'a> PageVisitor for DiscussionVisitor<'a> {
    async fn visit(&mut self, listing: &mut dyn BrowserPage, page: ListingPage) -> VisitDecision {
        let selectors = self.ctx.selectors;
        let config = self.ctx.config;

        for error in &page.item_errors {
            debug!(competition_id = self.competition_id, error = %error, "Skipping discussion item");
            self.acc.item_errors += 1;
        }

        let mut eligible = 0;
        for item in page.items {
            let upvotes = read_upvotes(listing, item.element, &selectors.discussion_fields.upvotes).await;
            if upvotes < config.min_upvotes {
                continue;
            }

            let title = read_title(listing, item.element, &selectors.discussions.title).await;
            if self
                .state
                .should_skip(&RecordSnapshot::new(&item.id, &title, upvotes))
            {
                debug!(discussion_id = %item.id, upvotes, "Skipping unchanged discussion");
                self.acc.skipped_unchanged += 1;
                continue;
            }

            eligible += 1;
            if self.acc.has_discussion(&item.id) {
                debug!(discussion_id = %item.id, "Skipping duplicate discussion");
                self.acc.duplicates += 1;
                continue;
            }

            let author = read_author(listing, item.element, &selectors.discussion_fields.author).await;
            let url = absolute_url(&config.base_url, &item.href);
            info!(discussion_id = %item.id, title = %title, upvotes, "Processing discussion");

            let details = self.ctx.extractor.discussion_details(&item.id, &url).await;
            config.pacer.pause().await;
            match details {
                Ok(details) => {
                    self.acc.push_discussion(DiscussionRecord {
                        id: item.id.clone(),
                        competition_id: self.competition_id.to_string(),
                        title,
                        url,
                        author,
                        content: details.content,
                        upvotes,
                        post_date: details.post_date,
                        author_competition_rank: details.author_competition_rank,
                        author_kaggle_rank: details.author_kaggle_rank,
                        medal_type: details.medal_type,
                        page_found: page.number,
                        scraped_at: scrape_timestamp(Utc::now()),
                    });
                }
                Err(e) => {
                    warn!(discussion_id = %item.id, error = %e, "Discussion extraction failed");
                    self.acc.item_errors += 1;
                }
            }
        }

        self.eligible_total += eligible;
        info!(
            competition_id = self.competition_id,
            page = page.number,
            eligible,
            min_upvotes = config.min_upvotes,
            "Discussion page done"
        );

        if eligible == 0 && page.number > 1 {
            info!(competition_id = self.competition_id, page = page.number, "No popular discussions left");
            return VisitDecision::Stop;
        }
        VisitDecision::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeBrowser, FakeNode, FakePage};
    use scout_browser::ExtractFn;
    use scout_store::{Document, MemoryRunState, MemoryStore, RunStatePort};
    use serde_json::json;

    const BASE: &str = "https://www.kaggle.com";
    const COMP_LIST_1: &str = "https://www.kaggle.com/competitions?listOption=active&page=1";
    const TITANIC: &str = "https://www.kaggle.com/competitions/titanic";
    const DISC_ITEMS: &str = "li.MuiListItem-root.MuiListItem-gutters.MuiListItem-divider.sc-inRxyr";
    const NEXT: &str = "button[aria-label='Go to next page']";

    fn disc_list(page: u32) -> String {
        format!("{TITANIC}/discussion?sort=votes&page={page}")
    }

    fn competition_listing(hrefs: &[&str]) -> FakePage {
        FakePage::new()
            .node("ul.MuiList-root.km-list", FakeNode::new())
            .nodes(
                "a[href^='/competitions/']",
                hrefs
                    .iter()
                    .map(|href| {
                        FakeNode::new()
                            .attr("href", href)
                            .child("h3", FakeNode::new().text("Titanic"))
                    })
                    .collect(),
            )
    }

    fn discussion_item(id: &str, title: &str, upvotes: u32) -> FakeNode {
        FakeNode::new()
            .child(
                "a[href*='/discussion/']",
                FakeNode::new().attr("href", &format!("/competitions/titanic/discussion/{id}")),
            )
            .child(".sc-dFaThA", FakeNode::new().text(title))
            .child("span[aria-live='polite']", FakeNode::new().text(&upvotes.to_string()))
            .child("a[emphasis]", FakeNode::new().text(" someone "))
    }

    fn discussion_listing(items: Vec<FakeNode>) -> FakePage {
        FakePage::new()
            .node("ul.MuiList-root.km-list.css-1uzmcsd", FakeNode::new())
            .node(
                "ul.MuiList-root.km-list.css-1uzmcsd li.MuiListItem-root",
                FakeNode::new(),
            )
            .nodes(DISC_ITEMS, items)
    }

    fn discussion_detail(content: &str) -> FakePage {
        FakePage::new().evaluates(
            ExtractFn::DiscussionContent,
            json!({ "content": content, "posted_datetime": "2024-02-03T10:00:00Z", "competitionRank": "2nd" }),
        )
    }

    fn competition_detail() -> FakePage {
        FakePage::new()
            .evaluates(ExtractFn::Description, json!("Predict survival on the Titanic"))
            .evaluates(ExtractFn::Deadline, json!("2030-01-01T00:00:00Z"))
    }

    fn config(backup_dir: PathBuf) -> CrawlConfig {
        CrawlConfig {
            pacer: Pacer::none(),
            backup_dir,
            ..CrawlConfig::default()
        }
    }

    async fn orchestrator(
        browser: &FakeBrowser,
        store: Arc<dyn DocumentStore>,
        run_state: Arc<MemoryRunState>,
        backup_dir: PathBuf,
    ) -> CrawlOrchestrator {
        let state = IncrementalStateStore::open(store.clone(), run_state).await.unwrap();
        CrawlOrchestrator::new(
            Arc::new(browser.clone()),
            store,
            state,
            SelectorConfig::kaggle().unwrap(),
            ExtractionScripts::from_source("/* extraction functions */"),
            config(backup_dir),
        )
    }

    fn stored_discussion(id: &str, title: &str, upvotes: u32) -> Document {
        let fields = json!({ "id": id, "title": title, "upvotes": upvotes });
        Document::new(id, fields.as_object().cloned().unwrap())
    }

    #[tokio::test]
    async fn test_full_run() {
        let browser = FakeBrowser::new()
            .page(
                COMP_LIST_1,
                competition_listing(&["/competitions/titanic", "/competitions/titanic?tab=overview"]),
            )
            .page(TITANIC, competition_detail())
            .page(
                &disc_list(1),
                discussion_listing(vec![
                    discussion_item("111", "Unchanged thread", 42),
                    discussion_item("222", "New thread", 50),
                    discussion_item("333", "Quiet thread", 3),
                ]),
            )
            .page(
                &format!("{TITANIC}/discussion/222"),
                discussion_detail("Use the cabin deck as a feature"),
            );

        let store = Arc::new(MemoryStore::new());
        store
            .upsert_batch("discussions", &[stored_discussion("111", "Unchanged thread", 42)])
            .await
            .unwrap();
        let run_state = Arc::new(MemoryRunState::new());
        let dir = tempfile::tempdir().unwrap();

        let report = orchestrator(&browser, store.clone(), run_state.clone(), dir.path().to_path_buf())
            .await
            .run()
            .await
            .unwrap();

        assert_eq!(report.competitions, 1);
        assert_eq!(report.discussions, 1);
        assert_eq!(report.skipped_unchanged, 1);
        assert_eq!(report.duplicates, 1);
        assert!(report.persistence.is_stored());

        assert_eq!(store.count("competitions"), 1);
        let titanic = store.get("competitions", "titanic").unwrap();
        assert_eq!(titanic.fields["title"], "Titanic");
        assert_eq!(titanic.fields["description"], "Predict survival on the Titanic.");
        assert_eq!(titanic.fields["deadline"], "2030-01-01T00:00:00+00:00");
        assert_eq!(titanic.fields["start_time"], "Indefinite");

        let new_thread = store.get("discussions", "222").unwrap();
        assert_eq!(new_thread.fields["competition_id"], "titanic");
        assert_eq!(new_thread.fields["author"], "someone");
        assert_eq!(new_thread.fields["upvotes"], 50);
        assert_eq!(new_thread.fields["author_competition_rank"], 2);
        assert_eq!(new_thread.fields["url"], format!("{BASE}/competitions/titanic/discussion/222"));
        assert!(store.get("discussions", "333").is_none());

        let saved = run_state.load().await.unwrap().unwrap();
        assert!(Utc::now() - saved.last_scrape_datetime < chrono::Duration::minutes(5));
        assert_eq!(browser.open_pages(), 0);
    }

    #[tokio::test]
    async fn test_no_competitions() {
        let browser = FakeBrowser::new().page(COMP_LIST_1, competition_listing(&[]));
        let store = Arc::new(MemoryStore::new());
        let dir = tempfile::tempdir().unwrap();

        let report = orchestrator(&browser, store.clone(), Arc::new(MemoryRunState::new()), dir.path().to_path_buf())
            .await
            .run()
            .await
            .unwrap();

        assert_eq!(report.competitions, 0);
        assert_eq!(report.terminal, TerminalReason::NoItems);
        assert_eq!(browser.clicks(), 0);
        assert_eq!(browser.navigations(), vec![COMP_LIST_1.to_string()]);
    }

    #[tokio::test]
    async fn test_discussion_crawl_stops_on_unpopular_page() {
        let browser = FakeBrowser::new()
            .page(COMP_LIST_1, competition_listing(&["/competitions/titanic"]))
            .page(TITANIC, competition_detail())
            .page(
                &disc_list(1),
                discussion_listing(vec![discussion_item("222", "Popular", 80)])
                    .node(NEXT, FakeNode::new().attr("class", "MuiButtonBase-root")),
            )
            .page(
                &disc_list(2),
                discussion_listing(vec![discussion_item("333", "Quiet", 2)])
                    .node(NEXT, FakeNode::new().attr("class", "MuiButtonBase-root")),
            )
            .page(
                &disc_list(3),
                discussion_listing(vec![discussion_item("444", "Popular again", 90)]),
            )
            .page(&format!("{TITANIC}/discussion/222"), discussion_detail("Great thread here"));
        let store = Arc::new(MemoryStore::new());
        let dir = tempfile::tempdir().unwrap();

        let report = orchestrator(&browser, store.clone(), Arc::new(MemoryRunState::new()), dir.path().to_path_buf())
            .await
            .run()
            .await
            .unwrap();

        assert_eq!(report.discussions, 1);
        let navigations = browser.navigations();
        assert!(navigations.contains(&disc_list(2)));
        assert!(!navigations.contains(&disc_list(3)));
    }

    #[tokio::test]
    async fn test_failed_discussion_does_not_stop_the_page() {
        let browser = FakeBrowser::new()
            .page(COMP_LIST_1, competition_listing(&["/competitions/titanic"]))
            .page(TITANIC, competition_detail())
            .page(
                &disc_list(1),
                discussion_listing(vec![
                    discussion_item("111", "Broken thread", 60),
                    discussion_item("222", "Working thread", 55),
                ]),
            )
            .page(
                &format!("{TITANIC}/discussion/111"),
                FakePage::new().evaluates(ExtractFn::DiscussionContent, json!("garbage")),
            )
            .page(
                &format!("{TITANIC}/discussion/222"),
                discussion_detail("Feature engineering on ticket prefixes"),
            );
        let store = Arc::new(MemoryStore::new());
        let dir = tempfile::tempdir().unwrap();

        let report = orchestrator(&browser, store.clone(), Arc::new(MemoryRunState::new()), dir.path().to_path_buf())
            .await
            .run()
            .await
            .unwrap();

        assert_eq!(report.discussions, 1);
        assert_eq!(report.item_errors, 1);
        assert!(store.get("discussions", "111").is_none());
        assert!(store.get("discussions", "222").is_some());
        assert_eq!(browser.open_pages(), 0);
    }

    #[tokio::test]
    async fn test_failed_competition_does_not_stop_the_page() {
        let spaceship = "https://www.kaggle.com/competitions/spaceship-titanic";
        let browser = FakeBrowser::new()
            .page(
                COMP_LIST_1,
                competition_listing(&["/competitions/spaceship-titanic", "/competitions/titanic"]),
            )
            .page(spaceship, FakePage::new().unreachable())
            .page(TITANIC, competition_detail());
        let store = Arc::new(MemoryStore::new());
        let dir = tempfile::tempdir().unwrap();

        let report = orchestrator(&browser, store.clone(), Arc::new(MemoryRunState::new()), dir.path().to_path_buf())
            .await
            .run()
            .await
            .unwrap();

        assert_eq!(report.competitions, 1);
        assert_eq!(report.item_errors, 1);
        assert!(store.get("competitions", "spaceship-titanic").is_none());
        assert!(store.get("competitions", "titanic").is_some());
        assert_eq!(browser.open_pages(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_falls_back_to_snapshot() {
        let browser = FakeBrowser::new()
            .page(COMP_LIST_1, competition_listing(&["/competitions/titanic"]))
            .page(TITANIC, competition_detail());
        let dir = tempfile::tempdir().unwrap();

        let report = orchestrator(
            &browser,
            Arc::new(MemoryStore::unavailable()),
            Arc::new(MemoryRunState::new()),
            dir.path().to_path_buf(),
        )
        .await
        .run()
        .await
        .unwrap();

        assert_eq!(report.competitions, 1);
        let PersistOutcome::Snapshot { paths, .. } = report.persistence else {
            panic!("expected a snapshot");
        };
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.exists()));
    }

    #[test]
    fn test_accumulator_rejects_duplicate_ids() {
        let mut acc = RunAccumulator::default();
        let record = CompetitionRecord {
            id: "titanic".to_string(),
            title: "Titanic".to_string(),
            url: TITANIC.to_string(),
            description: String::new(),
            evaluation: String::new(),
            deadline: "Indefinite".to_string(),
            start_time: "Indefinite".to_string(),
            page_found: 1,
            scraped_at: "2024-01-01T00:00:00+00:00".to_string(),
        };
        assert!(acc.push_competition(record.clone()));
        assert!(!acc.push_competition(record));
        assert_eq!(acc.competitions.len(), 1);
    }

    #[test]
    fn test_url_templates() {
        assert_eq!(
            CrawlConfig::default().competitions_url_template(),
            "https://www.kaggle.com/competitions?listOption=active&page={page}"
        );
        assert_eq!(
            discussions_url_template("https://www.kaggle.com/competitions/titanic/"),
            "https://www.kaggle.com/competitions/titanic/discussion?sort=votes&page={page}"
        );
    }
}
