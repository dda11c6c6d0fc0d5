use crate::crawler::metrics::Metrics;
use crate::extract::Item;
use serde::{Deserialize, Serialize};

/// One page to crawl, created once and never changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlTarget {
    pub root_url: String,

    /// Page the link was found on; empty for the root
    pub parent_url: String,

    pub current_url: String,

    /// Link distance from the root (root is 0)
    pub current_depth: i32,

    pub max_depth: i32,
}

impl CrawlTarget {
    /// Creates the depth-0 target a crawl starts from
    pub fn root(root_url: &str, max_depth: i32) -> Self {
        Self {
            root_url: root_url.to_string(),
            parent_url: String::new(),
            current_url: root_url.to_string(),
            current_depth: 0,
            max_depth,
        }
    }

    /// Creates the target for a link found on this page
    pub fn child(&self, url: &str) -> Self {
        Self {
            root_url: self.root_url.clone(),
            parent_url: self.current_url.clone(),
            current_url: url.to_string(),
            current_depth: self.current_depth + 1,
            max_depth: self.max_depth,
        }
    }

    pub fn within_depth(&self) -> bool {
        self.current_depth <= self.max_depth
    }
}

/// What one worker produced for one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerResult {
    pub source_url: String,
    pub extracted_urls: Vec<CrawlTarget>,
    pub extracted_items: Vec<Item>,
}

/// Aggregate output of a completed crawl
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResponse {
    /// Per-page results, in completion order
    pub results: Vec<WorkerResult>,
    pub metrics: Metrics,
}

impl CrawlResponse {
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.results
            .iter()
            .flat_map(|result| result.extracted_items.iter())
    }
}
