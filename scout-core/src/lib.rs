//! kaggle-scout core - record types and normalization pipeline
//!
//! This crate provides the pure building blocks of the crawler:
//! - Competition and discussion records with stable ids
//! - Text normalization for long-form scraped content
//! - Date normalization to canonical UTC timestamps
//! - The persisted run state (last-scrape watermark)

pub mod dates;
pub mod fields;
pub mod records;
pub mod run_state;
pub mod text;

pub use dates::*;
pub use fields::*;
pub use records::*;
pub use run_state::*;
pub use text::*;

/// Default base URL of the crawled site
pub const DEFAULT_BASE_URL: &str = "https://www.kaggle.com";

/// Minimum upvotes for a discussion to be collected
pub const DEFAULT_MIN_UPVOTES: u32 = 10;

/// Default number of competition listing pages to walk
pub const DEFAULT_MAX_PAGES: u32 = 5;

/// Default number of discussion listing pages to walk per competition
pub const DEFAULT_MAX_DISCUSSION_PAGES: u32 = 20;
