//! kaggle-scout browser layer
//!
//! Everything the crawler needs from a page, and nothing more:
//! - A small automation port ([`Browser`], [`BrowserPage`]) with opaque element handles
//! - A chromiumoxide-backed implementation (feature `chromium`)
//! - Data-driven selector chains loaded from TOML
//! - The in-page extraction function set evaluated through the port

pub mod driver;
pub mod extract;
pub mod selectors;

#[cfg(feature = "chromium")]
pub mod chromium;

pub use driver::*;
pub use extract::*;
pub use selectors::*;

#[cfg(feature = "chromium")]
pub use chromium::*;
