//! URL handling module for Trawler
//!
//! This module resolves extracted links against their page and normalizes
//! URLs into visited-set keys.

mod normalize;
mod resolve;

pub use normalize::{dedup_key, normalize_url};
pub use resolve::resolve_link;
