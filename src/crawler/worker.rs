//! Single-page scraping
//!
//! A scrape is one fetch followed by one pass over the page's token stream.
//! On every start tag the extraction engine first tries to pull a link and
//! then tries to start an item.

use crate::config::RequestConfig;
use crate::crawler::fetcher::fetch_page;
use crate::crawler::types::{CrawlTarget, WorkerResult};
use crate::extract::{
    extract_item, extract_url, extract_url_with_rules, item_tags_of_interest,
    url_tags_of_interest, ItemRule, Token, TokenStream, UrlRule,
};
use crate::robots::Restrictions;
use crate::url::resolve_link;
use crate::Result;
use chrono::{DateTime, Local};
use reqwest::Client;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::trace;
use url::Url;

/// Rules for one crawl together with their tag-of-interest sets
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub item_rules: Vec<ItemRule>,
    pub url_rules: Vec<UrlRule>,
    container_tags: HashSet<String>,
    url_tags: HashSet<String>,
}

impl RuleSet {
    pub fn new(item_rules: Vec<ItemRule>, url_rules: Vec<UrlRule>) -> Self {
        let container_tags = item_tags_of_interest(&item_rules);
        let url_tags = url_tags_of_interest(&url_rules);
        Self {
            item_rules,
            url_rules,
            container_tags,
            url_tags,
        }
    }
}

/// Fetches pages and runs extraction on them
#[derive(Debug, Clone)]
pub struct PageScraper {
    client: Client,
    request: RequestConfig,
    rules: Arc<RuleSet>,
    restrictions: Arc<Restrictions>,
}

impl PageScraper {
    pub fn new(
        client: Client,
        request: RequestConfig,
        rules: Arc<RuleSet>,
        restrictions: Arc<Restrictions>,
    ) -> Self {
        Self {
            client,
            request,
            rules,
            restrictions,
        }
    }

    /// Scrapes `target.current_url`
    ///
    /// Transport errors are returned untouched; there is no retry.
    pub async fn scrape(&self, target: &CrawlTarget) -> Result<WorkerResult> {
        let page = fetch_page(&self.client, &target.current_url, &self.request).await?;
        Ok(extract_page_at(
            &page.body,
            &page.final_url,
            target,
            &self.rules,
            &self.restrictions,
            Local::now(),
        ))
    }
}

/// Runs link and item extraction over one page body
///
/// Same as [`extract_page_at`] with the target's own URL as the base.
pub fn extract_page(
    html: &str,
    target: &CrawlTarget,
    rules: &RuleSet,
    restrictions: &Restrictions,
    queried_at: DateTime<Local>,
) -> WorkerResult {
    extract_page_at(
        html,
        &target.current_url,
        target,
        rules,
        restrictions,
        queried_at,
    )
}

/// Runs link and item extraction over a page served from `page_url`
///
/// Links are resolved against `page_url`, which differs from the target
/// URL after a redirect, and each one appears at most once in the result.
/// Links whose path is blacklisted are dropped. Zero items is a normal
/// outcome.
///
/// # Arguments
///
/// * `html` - The page body
/// * `page_url` - Final URL of the response the body came from
/// * `target` - The target the body was fetched for
/// * `rules` - Item and URL rules for the crawl
/// * `restrictions` - Blacklisted paths from robots.txt
/// * `queried_at` - Timestamp stamped on every extracted item
pub fn extract_page_at(
    html: &str,
    page_url: &str,
    target: &CrawlTarget,
    rules: &RuleSet,
    restrictions: &Restrictions,
    queried_at: DateTime<Local>,
) -> WorkerResult {
    let base_url = Url::parse(page_url).ok();
    let mut seen: HashSet<String> = HashSet::new();
    let mut extracted_urls = Vec::new();
    let mut extracted_items = Vec::new();

    let mut tokens = TokenStream::from_html(html);
    while let Some(token) = tokens.next() {
        let Token::StartTag(tag) = token else {
            continue;
        };

        let found = if rules.url_rules.is_empty() {
            extract_url(&tag, &seen)
        } else {
            extract_url_with_rules(&tag, &seen, &rules.url_tags, &rules.url_rules)
        };

        if let Some(raw) = found {
            seen.insert(raw.clone());

            let resolved = match &base_url {
                Some(base) => resolve_link(&raw, base),
                None => Url::parse(&raw).ok().map(|url| url.to_string()),
            };

            match resolved {
                Some(url) if seen.contains(&url) && url != raw => {}
                Some(url) if restrictions.is_blacklisted(&url) => {
                    trace!("Skipping blacklisted link {}", url);
                }
                Some(url) => {
                    seen.insert(url.clone());
                    extracted_urls.push(target.child(&url));
                }
                None => trace!("Skipping uncrawlable link {}", raw),
            }
        }

        if !rules.item_rules.is_empty() {
            if let Some(item) = extract_item(
                &tag,
                &mut tokens,
                &rules.container_tags,
                &rules.item_rules,
                &target.current_url,
                &queried_at,
            ) {
                extracted_items.push(item);
            }
        }
    }

    WorkerResult {
        source_url: target.current_url.clone(),
        extracted_urls,
        extracted_items,
    }
}
