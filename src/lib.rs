//! Trawler: a rule-driven concurrent web crawler
//!
//! This crate crawls a site from a root URL down to a maximum depth, pulling
//! outbound links and structured items out of every page with declarative
//! extraction rules, while honouring robots.txt restrictions and resource ceilings.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod robots;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Trawler operations
#[derive(Debug, Error)]
pub enum TrawlerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Health check failed: {0}")]
    Health(#[from] HealthError),

    #[error("Invalid crawl state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlState,
        to: state::CrawlState,
    },

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Crawl channel closed unexpectedly: {0}")]
    ChannelClosed(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid value for environment variable {name}: {value}")]
    InvalidOverride { name: String, value: String },
}

/// Errors raised by the crawler's own health checks
///
/// These are kept apart from transport errors so callers can tell "the site
/// is unreachable" from "the worker pool degraded".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HealthError {
    #[error("readiness check failed: {registered} of {expected} workers registered")]
    Readiness { registered: usize, expected: usize },

    #[error("liveness check failed: {live} live tasks is below the floor of {floor}")]
    TaskFloor { live: usize, floor: usize },

    #[error("liveness check failed: no URL visited in the last {window_ms}ms")]
    Stalled { window_ms: u64 },
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Trawler operations
pub type Result<T> = std::result::Result<T, TrawlerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{Config, CrawlOptions};
pub use crawler::{CrawlResponse, CrawlTarget, Crawler, Metrics, WorkerResult};
pub use extract::{ExtractionRule, FilterRule, Item, ItemRule, UrlReshapeRule, UrlRule};
pub use state::CrawlState;
