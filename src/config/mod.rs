//! Configuration module for Trawler
//!
//! This module handles loading, parsing, overriding and validating TOML
//! configuration files.
//!
//! # Example
//!
//! ```no_run
//! use trawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("trawler.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod env;
mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlOptions, CrawlerConfig, HealthConfig, RequestConfig};

// Re-export parser functions
pub use env::{apply_env_overrides, apply_overrides};
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::{
    validate, validate_crawler_config, validate_root_url, validate_rules, MAX_WORKER_COUNT,
};
