//! Trawler main entry point
//!
//! This is the command-line interface for the Trawler crawler.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use trawler::config::{load_config_with_hash, validate_root_url, Config};
use trawler::crawler::crawl;
use trawler::extract::ExtractionRule;
use trawler::output::{print_summary, summarize, write_json};
use tracing_subscriber::EnvFilter;

/// Trawler: a rule-driven web crawler
///
/// Trawler crawls a site from a root URL down to a maximum depth, following
/// links and extracting structured items as described by the rules in its
/// configuration file. robots.txt restrictions are honoured.
#[derive(Parser, Debug)]
#[command(name = "trawler")]
#[command(version)]
#[command(about = "A rule-driven web crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Root URL to crawl, overriding `root-url` in the config
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Write the full crawl response as JSON to this file
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let mut config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e).with_context(|| format!("loading {}", cli.config.display()));
        }
    };

    if let Some(url) = cli.url {
        validate_root_url(&url)?;
        config.root_url = Some(url);
    }

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_crawl(config, cli.output.as_deref()).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("trawler=info,warn"),
            1 => EnvFilter::new("trawler=debug,info"),
            2 => EnvFilter::new("trawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn describe_rule(rule: &ExtractionRule) -> String {
    let mut description = if rule.tag.is_empty() {
        "<any>".to_string()
    } else {
        format!("<{}>", rule.tag)
    };
    if !rule.attribute.is_empty() {
        description.push_str(&format!(" {}=\"{}\"", rule.attribute, rule.attribute_value));
    }
    if !rule.attribute_to_get.is_empty() {
        description.push_str(&format!(" -> @{}", rule.attribute_to_get));
    }
    if rule.skip_tokens > 0 {
        description.push_str(&format!(" (skip {})", rule.skip_tokens));
    }
    if rule.filter.is_some() {
        description.push_str(" [filtered]");
    }
    description
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Trawler Dry Run ===\n");

    println!(
        "Root URL: {}",
        config.root_url.as_deref().unwrap_or("(not set)")
    );

    println!("\nCrawler Configuration:");
    println!("  Workers: {}", config.crawler.worker_count);
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Crawl delay: {}ms", config.crawler.crawl_delay_ms);
    println!("  Max visited URLs: {}", config.crawler.max_visited_urls);
    println!("  Max items found: {}", config.crawler.max_items_found);
    println!("  Max tasks: {}", config.crawler.max_tasks);
    println!("  Allow empty items: {}", config.crawler.allow_empty_item);

    println!("\nRequest:");
    println!(
        "  Header: {}: {}",
        config.request.header_key, config.request.header_value
    );
    println!("  Timeout: {}s", config.request.timeout_secs);

    println!("\nHealth Checks:");
    println!("  Readiness grace: {}ms", config.health.readiness_grace_ms);
    println!(
        "  Liveness interval: {}ms",
        config.health.liveness_interval_ms
    );
    println!("  Liveness window: {}ms", config.health.liveness_window_ms);

    println!("\nItem Rules ({}):", config.items.len());
    for rule in &config.items {
        println!("  - {} in {}", rule.name, describe_rule(&rule.container));
        for (field, field_rule) in &rule.fields {
            println!("    * {}: {}", field, describe_rule(field_rule));
        }
    }

    println!("\nURL Rules ({}):", config.urls.len());
    if config.urls.is_empty() {
        println!("  (every href is followed)");
    }
    for rule in &config.urls {
        println!("  - {}: {}", rule.name, describe_rule(&rule.extract));
    }

    println!("\n✓ Configuration is valid");
    if config.root_url.is_none() {
        println!("! No root URL set; pass --url or set root-url to crawl");
    }

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: Config,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    tracing::info!(
        "Item rules: {}, URL rules: {}",
        config.items.len(),
        config.urls.len()
    );

    let response = match crawl(config).await {
        Ok(response) => {
            tracing::info!("Crawl completed successfully");
            response
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    print_summary(&summarize(&response));

    if let Some(path) = output {
        write_json(&response, path)
            .with_context(|| format!("writing results to {}", path.display()))?;
        println!("\n✓ Results written to: {}", path.display());
    }

    Ok(())
}
