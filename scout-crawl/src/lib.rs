//! kaggle-scout crawl engine
//!
//! - [`PaginatedListCrawler`] walks one paginated listing and hands each page to a visitor
//! - [`ItemDetailExtractor`] opens detail pages and runs the extraction function set
//! - [`CrawlOrchestrator`] nests the competition and discussion crawls and persists the run
//! - [`Pacer`] inserts the politeness pauses between requests

pub mod detail;
pub mod error;
pub mod orchestrator;
pub mod pacing;
pub mod pagination;

#[cfg(test)]
mod testing;

pub use detail::*;
pub use error::*;
pub use orchestrator::*;
pub use pacing::*;
pub use pagination::*;
