//! Rule-driven extraction of links and items from HTML token streams

pub mod filter;
pub mod item;
pub mod links;
pub mod reshape;
pub mod rules;
pub mod stack;
pub mod token;

pub use filter::{coerce_to_number, filter_value, FilterOperand, FilterRule, Value};
pub use item::{extract_item, item_tags_of_interest, parse_item_fields, Item};
pub use links::{extract_url, extract_url_with_rules, url_tags_of_interest};
pub use reshape::reshape_url;
pub use rules::{ExtractionRule, ItemRule, UrlReshapeRule, UrlRule};
pub use stack::TokenStack;
pub use token::{extract_attribute, Tag, Token, TokenStream};
