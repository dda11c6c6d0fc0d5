//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching
//! - Single-page scraping (fetch, tokenize, extract)
//! - Worker pool bookkeeping and health checks
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod health;
mod metrics;
mod pool;
mod types;
mod worker;

pub use coordinator::Crawler;
pub use fetcher::{build_http_client, fetch_page, FetchedPage};
pub use health::{liveness_check, readiness_check, LivenessProbe};
pub use metrics::{Metrics, MetricsRecorder};
pub use pool::{TaskGauge, TaskGuard, WorkerRegistry};
pub use types::{CrawlResponse, CrawlTarget, WorkerResult};
pub use worker::{extract_page, extract_page_at, PageScraper, RuleSet};

use crate::config::Config;
use crate::{ConfigError, Result};

/// Runs a complete crawl described by a configuration file
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build a [`Crawler`] from the config's options
/// 2. Load robots.txt restrictions for the root
/// 3. Run the worker pool until the frontier drains
/// 4. Return every page result with the crawl metrics
///
/// # Returns
///
/// * `Ok(CrawlResponse)` - Crawl completed successfully
/// * `Err(TrawlerError)` - Configuration, transport or health failure
pub async fn crawl(config: Config) -> Result<CrawlResponse> {
    let root_url = config
        .root_url
        .clone()
        .ok_or_else(|| ConfigError::Validation("root-url is required to crawl".to_string()))?;

    let crawler = Crawler::new(config.crawl_options())?;
    crawler.crawl(&root_url, config.items, config.urls).await
}
