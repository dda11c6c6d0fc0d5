//! Environment variable overrides
//!
//! Deployments tune a crawl without editing the file. Every variable is
//! optional; a set but malformed value is an error rather than ignored.

use crate::config::types::Config;
use crate::ConfigError;
use std::str::FromStr;

/// Applies overrides from the process environment
pub fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
    apply_overrides(config, |name| std::env::var(name).ok())
}

/// Applies overrides read through `lookup`
///
/// `CRAWL_DELAY` is given in seconds; everything else uses the unit of the
/// field it overrides.
pub fn apply_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = parse_var(&lookup, "WORKER_COUNT")? {
        config.crawler.worker_count = value;
    }
    if let Some(value) = parse_var(&lookup, "MAX_DEPTH")? {
        config.crawler.max_depth = value;
    }
    if let Some(seconds) = parse_var::<u64, _>(&lookup, "CRAWL_DELAY")? {
        config.crawler.crawl_delay_ms = seconds.saturating_mul(1000);
    }
    if let Some(value) = parse_var(&lookup, "MAX_VISITED_URLS")? {
        config.crawler.max_visited_urls = value;
    }
    if let Some(value) = parse_var(&lookup, "MAX_ITEMS_FOUND")? {
        config.crawler.max_items_found = value;
    }
    if let Some(value) = parse_var(&lookup, "MAX_TASKS")? {
        config.crawler.max_tasks = value;
    }
    if let Some(value) = parse_var(&lookup, "ALLOW_EMPTY_ITEM")? {
        config.crawler.allow_empty_item = value;
    }
    if let Some(value) = lookup("HEADER_KEY") {
        config.request.header_key = value;
    }
    if let Some(value) = lookup("HEADER_VALUE") {
        config.request.header_value = value;
    }

    Ok(())
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidOverride {
                name: name.to_string(),
                value: raw,
            }),
        None => Ok(None),
    }
}
