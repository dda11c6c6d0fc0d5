//! Declarative extraction rules
//!
//! These are plain values supplied at runtime (usually from the TOML config).
//! An all-default rule is meaningful: it matches anything and reshapes nothing.

use crate::extract::filter::FilterRule;
use crate::extract::token::Tag;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Describes how to recognise a tag and what to read from it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ExtractionRule {
    /// Tag name the rule targets (e.g. "div")
    pub tag: String,

    /// Attribute that must be present on the tag (e.g. "class")
    pub attribute: String,

    /// Value the attribute must carry
    pub attribute_value: String,

    /// Attribute to read instead of the text that follows the tag
    pub attribute_to_get: String,

    /// Number of text tokens to skip before taking the value
    pub skip_tokens: usize,

    /// Optional reshaping applied to the extracted value
    pub url_reshape: Option<UrlReshapeRule>,

    /// Optional filter the extracted value must pass
    pub filter: Option<FilterRule>,
}

impl ExtractionRule {
    /// Creates a rule matching `tag` with no attribute constraint
    pub fn for_tag(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Self::default()
        }
    }

    /// Adds an attribute/value constraint to the rule
    pub fn with_attribute(mut self, attribute: &str, value: &str) -> Self {
        self.attribute = attribute.to_string();
        self.attribute_value = value.to_string();
        self
    }

    /// Reads `attribute` from the matched tag instead of its text
    pub fn reading(mut self, attribute: &str) -> Self {
        self.attribute_to_get = attribute.to_string();
        self
    }

    pub fn skipping(mut self, skip_tokens: usize) -> Self {
        self.skip_tokens = skip_tokens;
        self
    }

    pub fn with_reshape(mut self, reshape: UrlReshapeRule) -> Self {
        self.url_reshape = Some(reshape);
        self
    }

    pub fn with_filter(mut self, filter: FilterRule) -> Self {
        self.filter = Some(filter);
        self
    }

    /// True when every field holds its zero value
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Exact match used for item containers and item fields
    ///
    /// The tag name must be equal and, when an attribute is named, the tag
    /// must carry it with exactly `attribute_value`.
    pub fn matches(&self, tag: &Tag) -> bool {
        if !self.tag.is_empty() && self.tag != tag.name {
            return false;
        }

        if self.attribute.is_empty() {
            return true;
        }

        tag.attribute(&self.attribute) == Some(self.attribute_value.as_str())
    }

    /// Loose match used for URL rules: the attribute only has to contain
    /// `attribute_value` (class lists usually carry several names)
    pub fn matches_containing(&self, tag: &Tag) -> bool {
        if !self.tag.is_empty() && self.tag != tag.name {
            return false;
        }

        if self.attribute.is_empty() {
            return true;
        }

        tag.attribute(&self.attribute)
            .map_or(false, |value| value.contains(self.attribute_value.as_str()))
    }
}

/// Defines one item type: a bounding container and named fields inside it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ItemRule {
    /// Name given to every item extracted with this rule
    pub name: String,

    /// Rule recognising the container tag that bounds one item
    pub container: ExtractionRule,

    /// Field rules, scanned only inside the container
    pub fields: BTreeMap<String, ExtractionRule>,
}

impl ItemRule {
    pub fn new(name: &str, container: ExtractionRule) -> Self {
        Self {
            name: name.to_string(),
            container,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: &str, rule: ExtractionRule) -> Self {
        self.fields.insert(name.to_string(), rule);
        self
    }
}

/// Defines how to recognise and reshape one class of outbound link
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct UrlRule {
    pub name: String,

    /// Tag matcher; empty means "read `href` from any tag"
    pub extract: ExtractionRule,

    /// Reshaping applied to the extracted link
    pub reshape: Option<UrlReshapeRule>,
}

impl UrlRule {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn with_extract(mut self, extract: ExtractionRule) -> Self {
        self.extract = extract;
        self
    }

    pub fn with_reshape(mut self, reshape: UrlReshapeRule) -> Self {
        self.reshape = Some(reshape);
        self
    }
}

/// Rewrites a URL once it passes all three "must" predicates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct UrlReshapeRule {
    pub prefix_must_exist: String,
    pub suffix_must_exist: String,
    pub substring_must_contain: String,
    pub prefix_to_strip: String,
    pub suffix_to_strip: String,
    pub prefix_to_add: String,
    pub suffix_to_add: String,
    pub replace_from: String,
    pub replace_to: String,
}

impl UrlReshapeRule {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
