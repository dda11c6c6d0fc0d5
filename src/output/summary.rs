//! Crawl summaries
//!
//! This module condenses a [`CrawlResponse`] into the figures printed at
//! the end of a run.

use crate::crawler::{CrawlResponse, Metrics};
use std::collections::BTreeMap;

/// Condensed view of one crawl
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    pub metrics: Metrics,

    /// Pages whose result was kept
    pub pages_with_results: usize,

    /// Item count per item name
    pub items_by_name: BTreeMap<String, usize>,

    /// Pages with the most items, highest first
    pub top_pages: Vec<(String, usize)>,
}

/// Number of pages listed in [`CrawlSummary::top_pages`]
const TOP_PAGES: usize = 10;

/// Builds the summary of a crawl response
pub fn summarize(response: &CrawlResponse) -> CrawlSummary {
    let mut items_by_name = BTreeMap::new();
    for item in response.items() {
        *items_by_name.entry(item.item_name.clone()).or_insert(0) += 1;
    }

    let mut top_pages: Vec<(String, usize)> = response
        .results
        .iter()
        .filter(|result| !result.extracted_items.is_empty())
        .map(|result| (result.source_url.clone(), result.extracted_items.len()))
        .collect();
    top_pages.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    top_pages.truncate(TOP_PAGES);

    CrawlSummary {
        metrics: response.metrics.clone(),
        pages_with_results: response.results.len(),
        items_by_name,
        top_pages,
    }
}

/// Prints a summary to stdout in a formatted manner
pub fn print_summary(summary: &CrawlSummary) {
    println!("=== Crawl Summary ===\n");

    println!("Overview:");
    println!("  Root URL: {}", summary.metrics.root_url);
    println!("  Pages visited: {}", summary.metrics.urls_visited);
    println!("  Links found: {}", summary.metrics.urls_found);
    println!(
        "  Duplicate links: {}",
        summary.metrics.duplicate_urls_found
    );
    println!("  Items found: {}", summary.metrics.items_found);
    println!("  Pages with results: {}", summary.pages_with_results);
    println!();

    if !summary.items_by_name.is_empty() {
        println!("Items by Name:");
        for (name, count) in &summary.items_by_name {
            println!("  {}: {}", name, count);
        }
        println!();
    }

    if !summary.top_pages.is_empty() {
        println!("Top Pages by Items:");
        for (i, (url, count)) in summary.top_pages.iter().enumerate() {
            println!("  {}. {} ({} items)", i + 1, url, count);
        }
    }
}
