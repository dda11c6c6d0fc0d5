use crate::config::types::{Config, CrawlerConfig, RequestConfig};
use crate::extract::{ItemRule, UrlRule};
use crate::ConfigError;
use url::Url;

/// Upper bound on worker loops per crawl
pub const MAX_WORKER_COUNT: usize = 1000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if let Some(root_url) = &config.root_url {
        validate_root_url(root_url)?;
    }
    validate_crawler_config(&config.crawler)?;
    validate_request_config(&config.request)?;
    validate_rules(&config.items, &config.urls)?;
    Ok(())
}

/// Validates that the crawl root is an absolute HTTP(S) URL
pub fn validate_root_url(root_url: &str) -> Result<(), ConfigError> {
    let url = Url::parse(root_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid root URL '{}': {}", root_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Root URL '{}' must use HTTP or HTTPS",
            root_url
        )));
    }

    Ok(())
}

/// Validates crawler configuration
pub fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.worker_count < 1 || config.worker_count > MAX_WORKER_COUNT {
        return Err(ConfigError::Validation(format!(
            "worker_count must be between 1 and {}, got {}",
            MAX_WORKER_COUNT, config.worker_count
        )));
    }

    if config.max_depth < 0 {
        return Err(ConfigError::Validation(format!(
            "max_depth must be >= 0, got {}",
            config.max_depth
        )));
    }

    // Worker loops count as live tasks themselves
    if config.max_tasks <= config.worker_count {
        return Err(ConfigError::Validation(format!(
            "max_tasks must be greater than worker_count ({}), got {}",
            config.worker_count, config.max_tasks
        )));
    }

    Ok(())
}

fn validate_request_config(config: &RequestConfig) -> Result<(), ConfigError> {
    if config.header_key.trim().is_empty() {
        return Err(ConfigError::Validation(
            "header_key cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates item and URL rules
///
/// Containers and fields must name a tag. A non-empty URL matcher must name
/// one as well; leave the matcher empty to follow every `href`.
pub fn validate_rules(items: &[ItemRule], urls: &[UrlRule]) -> Result<(), ConfigError> {
    for item in items {
        if item.container.tag.is_empty() {
            return Err(ConfigError::Validation(format!(
                "Item rule '{}' has a container without a tag",
                item.name
            )));
        }

        for (field, rule) in &item.fields {
            if rule.tag.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "Field '{}' of item rule '{}' has no tag",
                    field, item.name
                )));
            }
        }
    }

    for url in urls {
        if !url.extract.is_empty() && url.extract.tag.is_empty() {
            return Err(ConfigError::Validation(format!(
                "URL rule '{}' sets a matcher without a tag",
                url.name
            )));
        }
    }

    Ok(())
}
