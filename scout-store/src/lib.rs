//! kaggle-scout persistence
//!
//! - [`DocumentStore`] port with Firestore, JSON-directory and in-memory backends
//! - [`RunStatePort`] for the last-scrape watermark (`.env` file backed)
//! - [`IncrementalStateStore`] for unchanged-record detection between runs
//! - Bulk persistence with a local snapshot fallback

pub mod document;
pub mod firestore;
pub mod incremental;
pub mod json_dir;
pub mod persist;
pub mod run_state;

pub use document::*;
pub use firestore::*;
pub use incremental::*;
pub use json_dir::*;
pub use persist::*;
pub use run_state::*;
