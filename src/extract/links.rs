//! Outbound link extraction

use crate::extract::reshape::reshape_url;
use crate::extract::rules::{ExtractionRule, UrlRule};
use crate::extract::token::Tag;
use std::collections::HashSet;

/// Attribute read when a rule does not name one
pub const HREF_ATTRIBUTE: &str = "href";

/// Collects the tag names targeted by URL rules with a non-empty matcher
pub fn url_tags_of_interest(rules: &[UrlRule]) -> HashSet<String> {
    rules
        .iter()
        .filter(|rule| !rule.extract.is_empty())
        .map(|rule| rule.extract.tag.clone())
        .collect()
}

/// Default link extraction: the tag's `href`, unless empty or already seen
pub fn extract_url(tag: &Tag, seen: &HashSet<String>) -> Option<String> {
    let href = tag.attribute(HREF_ATTRIBUTE)?;
    if href.is_empty() || seen.contains(href) {
        return None;
    }
    Some(href.to_string())
}

/// Rule-driven link extraction
///
/// Rules are tried in order and the first one producing a non-empty,
/// unseen URL wins. A rule with an empty matcher reads `href` from any tag;
/// otherwise the tag must match the rule and the value comes from
/// `attribute_to_get` (default `href`). A reshape predicate failure skips
/// to the next rule.
///
/// # Arguments
///
/// * `tag` - The start tag being examined
/// * `seen` - URLs already taken from this page
/// * `rule_tags` - Output of [`url_tags_of_interest`] for `rules`
/// * `rules` - URL rules in priority order
pub fn extract_url_with_rules(
    tag: &Tag,
    seen: &HashSet<String>,
    rule_tags: &HashSet<String>,
    rules: &[UrlRule],
) -> Option<String> {
    for rule in rules {
        let candidate = if rule.extract.is_empty() {
            match tag.attribute(HREF_ATTRIBUTE) {
                Some(href) if !href.is_empty() => href.to_string(),
                _ => continue,
            }
        } else {
            if !rule_tags.contains(&tag.name) {
                continue;
            }
            match read_with_rule(tag, &rule.extract) {
                Some(value) => value,
                None => continue,
            }
        };

        let candidate = match &rule.reshape {
            Some(reshape) => match reshape_url(&candidate, reshape) {
                Some(reshaped) => reshaped,
                None => continue,
            },
            None => candidate,
        };

        if candidate.is_empty() || seen.contains(&candidate) {
            continue;
        }

        return Some(candidate);
    }

    None
}

fn read_with_rule(tag: &Tag, rule: &ExtractionRule) -> Option<String> {
    if !rule.matches_containing(tag) {
        return None;
    }

    let attribute = if rule.attribute_to_get.is_empty() {
        HREF_ATTRIBUTE
    } else {
        rule.attribute_to_get.as_str()
    };

    tag.attribute(attribute)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
