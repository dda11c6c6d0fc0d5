use crate::extract::{ItemRule, UrlRule};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration structure for Trawler
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// URL the crawl starts from
    #[serde(rename = "root-url", default)]
    pub root_url: Option<String>,

    #[serde(default)]
    pub crawler: CrawlerConfig,

    #[serde(default)]
    pub request: RequestConfig,

    #[serde(default)]
    pub health: HealthConfig,

    /// Item extraction rules, tried in order
    #[serde(rename = "item", default)]
    pub items: Vec<ItemRule>,

    /// URL extraction rules; empty means every `href` is followed
    #[serde(rename = "url", default)]
    pub urls: Vec<UrlRule>,
}

impl Config {
    /// Collects the runtime options a [`crate::Crawler`] is built from
    pub fn crawl_options(&self) -> CrawlOptions {
        CrawlOptions {
            crawler: self.crawler.clone(),
            request: self.request.clone(),
            health: self.health.clone(),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Number of worker loops pulling targets
    #[serde(rename = "worker-count")]
    pub worker_count: usize,

    /// Maximum link depth below the root (root is depth 0)
    #[serde(rename = "max-depth")]
    pub max_depth: i32,

    /// Delay each worker waits before handling a target (milliseconds)
    #[serde(rename = "crawl-delay-ms")]
    pub crawl_delay_ms: u64,

    /// Pages fetched before further targets are rejected
    #[serde(rename = "max-visited-urls")]
    pub max_visited_urls: usize,

    /// Items extracted before further targets are rejected
    #[serde(rename = "max-items-found")]
    pub max_items_found: usize,

    /// Live task count above which targets are re-queued instead of spawned
    #[serde(rename = "max-tasks")]
    pub max_tasks: usize,

    /// Forward page results that carry no items
    #[serde(rename = "allow-empty-item")]
    pub allow_empty_item: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            worker_count: 5,
            max_depth: 1,
            crawl_delay_ms: 5000,
            max_visited_urls: 20,
            max_items_found: 5000,
            max_tasks: 10_000,
            allow_empty_item: false,
        }
    }
}

impl CrawlerConfig {
    pub fn crawl_delay(&self) -> Duration {
        Duration::from_millis(self.crawl_delay_ms)
    }
}

/// Outgoing request configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    /// Name of the single header sent with every request
    #[serde(rename = "header-key")]
    pub header_key: String,

    #[serde(rename = "header-value")]
    pub header_value: String,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            header_key: "User-Agent".to_string(),
            header_value: format!("trawler/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 60,
        }
    }
}

impl RequestConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Worker pool health check timings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Wait before checking that every worker registered (milliseconds)
    #[serde(rename = "readiness-grace-ms")]
    pub readiness_grace_ms: u64,

    /// Period of the liveness check (milliseconds)
    #[serde(rename = "liveness-interval-ms")]
    pub liveness_interval_ms: u64,

    /// Window in which at least one page must be visited (milliseconds)
    #[serde(rename = "liveness-window-ms")]
    pub liveness_window_ms: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            readiness_grace_ms: 10_000,
            liveness_interval_ms: 10_000,
            liveness_window_ms: 60_000,
        }
    }
}

impl HealthConfig {
    pub fn readiness_grace(&self) -> Duration {
        Duration::from_millis(self.readiness_grace_ms)
    }

    pub fn liveness_interval(&self) -> Duration {
        Duration::from_millis(self.liveness_interval_ms)
    }

    pub fn liveness_window(&self) -> Duration {
        Duration::from_millis(self.liveness_window_ms)
    }
}

/// Everything a crawl needs besides the root URL and the rules
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlOptions {
    pub crawler: CrawlerConfig,
    pub request: RequestConfig,
    pub health: HealthConfig,
}
