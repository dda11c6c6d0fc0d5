//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: The lifecycle of one crawl (initializing, seeding, running, draining, done or aborted)
//! - `StateTracker`: Shared, transition-checked holder of the current state

mod crawl_state;

pub use crawl_state::{CrawlState, StateTracker};
