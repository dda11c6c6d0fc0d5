//! Crawl counters shared by the dedup processor and fetch tasks

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Snapshot of crawl counters
///
/// Every counter only ever grows during a crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    pub root_url: String,

    /// Links extracted across all pages, duplicates included
    pub urls_found: u64,

    /// Pages fetched and parsed
    pub urls_visited: u64,

    /// Targets dropped by the visited set
    pub duplicate_urls_found: u64,

    /// Items extracted across all pages
    pub items_found: u64,
}

/// Mutex-guarded handle on the crawl's [`Metrics`]
#[derive(Debug, Clone, Default)]
pub struct MetricsRecorder {
    inner: Arc<Mutex<Metrics>>,
}

impl MetricsRecorder {
    pub fn new(root_url: &str) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Metrics {
                root_url: root_url.to_string(),
                ..Metrics::default()
            })),
        }
    }

    /// Records one fetched page and what was extracted from it
    pub fn record_page(&self, urls_found: usize, items_found: usize) -> Metrics {
        let mut metrics = self.inner.lock().unwrap();
        metrics.urls_visited += 1;
        metrics.urls_found += urls_found as u64;
        metrics.items_found += items_found as u64;
        metrics.clone()
    }

    pub fn record_duplicate(&self) {
        self.inner.lock().unwrap().duplicate_urls_found += 1;
    }

    pub fn urls_visited(&self) -> u64 {
        self.inner.lock().unwrap().urls_visited
    }

    pub fn items_found(&self) -> u64 {
        self.inner.lock().unwrap().items_found
    }

    pub fn snapshot(&self) -> Metrics {
        self.inner.lock().unwrap().clone()
    }
}
