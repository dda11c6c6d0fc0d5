//! Robots.txt parser implementation
//!
//! Only the `User-agent: *` group is honoured, and only its `Disallow`
//! lines. The result is a set of blacklisted path prefixes.

use robotstxt::{parse_robotstxt, RobotsParseHandler};
use std::collections::HashSet;
use url::Url;

/// Paths the crawl must not enqueue
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Restrictions {
    paths: HashSet<String>,
}

impl Restrictions {
    /// Creates a permissive set that blocks nothing
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Parses raw robots.txt content
    ///
    /// Rules are collected from the first `User-agent: *` line until a
    /// `User-agent:` line naming another agent. Wildcards are removed from
    /// `Disallow` values and empty values are ignored.
    pub fn from_content(content: &str) -> Self {
        let mut collector = WildcardDisallows::default();
        parse_robotstxt(content, &mut collector);
        Self {
            paths: collector.paths,
        }
    }

    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// Returns true when any leading segment run of the URL's path is
    /// blacklisted
    ///
    /// For `/gp/cart/view.html` the candidates are `/`, `/gp`, `/gp/`,
    /// `/gp/cart`, `/gp/cart/` and the full path. Matching is
    /// case-sensitive. Absolute URLs are reduced to their path; strings
    /// starting with `/` are used as-is; anything else is never blocked.
    pub fn is_blacklisted(&self, url: &str) -> bool {
        if self.paths.is_empty() {
            return false;
        }

        let path = match Url::parse(url) {
            Ok(parsed) => parsed.path().to_string(),
            Err(_) if url.starts_with('/') => url
                .split(|c| c == '?' || c == '#')
                .next()
                .unwrap_or(url)
                .to_string(),
            Err(_) => return false,
        };

        let mut candidate = String::with_capacity(path.len());
        for segment in path.split('/').skip(1) {
            candidate.push('/');
            if self.paths.contains(&candidate) {
                return true;
            }
            if segment.is_empty() {
                continue;
            }
            candidate.push_str(segment);
            if self.paths.contains(&candidate) {
                return true;
            }
        }

        false
    }
}

/// Parse callbacks collecting the `Disallow` values of the `*` group
#[derive(Debug, Default)]
struct WildcardDisallows {
    paths: HashSet<String>,
    active: bool,
    finished: bool,
}

fn is_wildcard_agent(user_agent: &str) -> bool {
    let user_agent = user_agent.trim();
    user_agent == "*" || user_agent.starts_with("* ")
}

impl RobotsParseHandler for WildcardDisallows {
    fn handle_robots_start(&mut self) {}

    fn handle_robots_end(&mut self) {}

    fn handle_user_agent(&mut self, _line_num: u32, user_agent: &str) {
        if self.finished {
            return;
        }
        if is_wildcard_agent(user_agent) {
            self.active = true;
        } else if self.active {
            self.active = false;
            self.finished = true;
        }
    }

    fn handle_allow(&mut self, _line_num: u32, _value: &str) {}

    fn handle_disallow(&mut self, _line_num: u32, value: &str) {
        if !self.active {
            return;
        }
        let path = value.trim().replace('*', "");
        if !path.is_empty() {
            self.paths.insert(path);
        }
    }

    fn handle_sitemap(&mut self, _line_num: u32, _value: &str) {}

    fn handle_unknown_action(&mut self, _line_num: u32, _action: &str, _value: &str) {}
}
