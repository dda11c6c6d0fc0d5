//! Robots.txt handling module
//!
//! This module fetches a site's robots.txt once per crawl and turns it into
//! the set of blacklisted paths the worker checks extracted links against.

mod parser;

pub use parser::Restrictions;

use crate::config::RequestConfig;
use crate::crawler::fetch_page;
use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

/// Returns `{scheme}://{host}[:port]/robots.txt` for `root_url`
pub fn robots_txt_url(root_url: &Url) -> Option<Url> {
    root_url.host_str()?;
    root_url.join("/robots.txt").ok()
}

/// Fetches and parses robots.txt for the crawl root
///
/// Never fails: a missing, unreachable or non-success robots.txt is logged
/// and treated as "nothing restricted".
///
/// # Arguments
///
/// * `client` - The HTTP client used for the crawl
/// * `root_url` - The crawl's root URL
/// * `request` - Header and timeout settings
pub async fn load_restrictions(
    client: &Client,
    root_url: &Url,
    request: &RequestConfig,
) -> Restrictions {
    let Some(robots_url) = robots_txt_url(root_url) else {
        warn!("Cannot derive robots.txt location for {}", root_url);
        return Restrictions::allow_all();
    };

    match fetch_page(client, robots_url.as_str(), request).await {
        Ok(page) if page.is_success() => {
            let restrictions = Restrictions::from_content(&page.body);
            info!(
                "Loaded {} robots.txt restrictions from {}",
                restrictions.len(),
                robots_url
            );
            restrictions
        }
        Ok(page) => {
            debug!("No robots.txt at {} (status {})", robots_url, page.status);
            Restrictions::allow_all()
        }
        Err(e) => {
            warn!("Failed to fetch {}: {}", robots_url, e);
            Restrictions::allow_all()
        }
    }
}
