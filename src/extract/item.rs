//! Item extraction from a bounded container

use crate::extract::filter::{filter_value, Value};
use crate::extract::reshape::reshape_url;
use crate::extract::rules::{ExtractionRule, ItemRule};
use crate::extract::stack::TokenStack;
use crate::extract::token::{Tag, Token};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// A structured record pulled out of one container on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub item_name: String,
    pub source_url: String,
    pub date_queried: String,
    pub time_queried: String,
    pub fields: BTreeMap<String, String>,
}

/// Collects the container tag names of all item rules
pub fn item_tags_of_interest(rules: &[ItemRule]) -> HashSet<String> {
    rules
        .iter()
        .map(|rule| rule.container.tag.clone())
        .collect()
}

/// Tries to start an item at `tag`
///
/// The first item rule whose container matches wins, and the container is
/// then consumed from `tokens` up to its matching end tag.
///
/// # Arguments
///
/// * `tag` - The start tag just read from the stream
/// * `tokens` - The rest of the page's token stream
/// * `container_tags` - Container tag names, for a cheap early exit
/// * `rules` - Item rules in priority order
/// * `source_url` - URL of the page being scraped
/// * `queried_at` - Timestamp stamped onto the item
///
/// # Returns
///
/// `None` when no rule matches, when a field value fails its filter, or
/// when none of the rule's fields were found inside the container.
pub fn extract_item<I>(
    tag: &Tag,
    tokens: &mut I,
    container_tags: &HashSet<String>,
    rules: &[ItemRule],
    source_url: &str,
    queried_at: &DateTime<Local>,
) -> Option<Item>
where
    I: Iterator<Item = Token>,
{
    if !container_tags.contains(&tag.name) {
        return None;
    }

    let rule = rules.iter().find(|rule| rule.container.matches(tag))?;
    parse_item_fields(tag, tokens, rule, source_url, queried_at)
}

/// Text tokens that follow one field tag, pulled lazily
///
/// Several fields may target the same tag with different skip counts, so
/// the texts are kept and shared between them.
struct FollowingText {
    texts: Vec<String>,
    exhausted: bool,
}

impl FollowingText {
    fn new() -> Self {
        Self {
            texts: Vec::new(),
            exhausted: false,
        }
    }

    /// Returns the text token at `index`, advancing the stream as needed
    /// but never past the end of the container
    fn nth<I>(&mut self, index: usize, tokens: &mut I, stack: &mut TokenStack) -> Option<String>
    where
        I: Iterator<Item = Token>,
    {
        while self.texts.len() <= index && !self.exhausted {
            match tokens.next() {
                Some(Token::Text(text)) => self.texts.push(text),
                Some(Token::StartTag(tag)) => stack.push(&tag.name),
                Some(Token::EndTag(_)) => {
                    stack.pop();
                    if stack.is_empty() {
                        self.exhausted = true;
                    }
                }
                None => self.exhausted = true,
            }
        }

        self.texts.get(index).cloned()
    }
}

enum FieldOutcome {
    Accepted(String),
    Missing,
    Rejected,
}

fn accept_field_value(raw: Option<String>, rule: &ExtractionRule) -> FieldOutcome {
    let Some(mut value) = raw else {
        return FieldOutcome::Missing;
    };

    if let Some(reshape) = &rule.url_reshape {
        match reshape_url(&value, reshape) {
            Some(reshaped) => value = reshaped,
            None => return FieldOutcome::Missing,
        }
    }

    if let Some(filter) = &rule.filter {
        if !filter_value(&Value::Text(value.clone()), filter) {
            return FieldOutcome::Rejected;
        }
    }

    FieldOutcome::Accepted(value)
}

/// Reads the fields of `rule` from inside the container opened by `container`
///
/// Each field is assigned at most once, by its first match. A filter failure
/// discards the whole item but the rest of the container is still consumed
/// so the caller resumes after it.
pub fn parse_item_fields<I>(
    container: &Tag,
    tokens: &mut I,
    rule: &ItemRule,
    source_url: &str,
    queried_at: &DateTime<Local>,
) -> Option<Item>
where
    I: Iterator<Item = Token>,
{
    let field_tags: HashSet<&str> = rule.fields.values().map(|field| field.tag.as_str()).collect();
    let mut stack = TokenStack::new();
    stack.push(&container.name);

    let mut fields = BTreeMap::new();
    let mut rejected = false;

    while !stack.is_empty() {
        let Some(token) = tokens.next() else {
            break;
        };

        match token {
            Token::StartTag(tag) => {
                stack.push(&tag.name);
                if rejected || !field_tags.contains(tag.name.as_str()) {
                    continue;
                }

                let mut following = FollowingText::new();
                for (name, field_rule) in &rule.fields {
                    if fields.contains_key(name) || !field_rule.matches(&tag) {
                        continue;
                    }

                    let raw = if field_rule.attribute_to_get.is_empty() {
                        following.nth(field_rule.skip_tokens, tokens, &mut stack)
                    } else {
                        tag.attribute(&field_rule.attribute_to_get)
                            .map(str::to_string)
                    };

                    match accept_field_value(raw, field_rule) {
                        FieldOutcome::Accepted(value) => {
                            fields.insert(name.clone(), value);
                        }
                        FieldOutcome::Missing => {}
                        FieldOutcome::Rejected => {
                            tracing::debug!("Item {} rejected by filter on field {}", rule.name, name);
                            rejected = true;
                            break;
                        }
                    }
                }
            }
            Token::EndTag(_) => {
                stack.pop();
            }
            Token::Text(_) => {}
        }
    }

    if rejected || (!rule.fields.is_empty() && fields.is_empty()) {
        return None;
    }

    Some(Item {
        item_name: rule.name.clone(),
        source_url: source_url.to_string(),
        date_queried: queried_at.format("%Y-%m-%d").to_string(),
        time_queried: queried_at.format("%H:%M:%S").to_string(),
        fields,
    })
}
