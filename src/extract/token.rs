//! Flat HTML token stream
//!
//! The extraction engine consumes HTML as a pull-based sequence of start
//! tags, end tags and text. The stream is produced from the parsed document
//! tree so every start tag is balanced by an end tag, void elements included.

use ego_tree::iter::Edge;
use scraper::{Html, Node};

/// A single `key="value"` pair on a start tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

/// A start tag with its attributes, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub attributes: Vec<Attribute>,
}

impl Tag {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes.push(Attribute {
            key: key.to_string(),
            value: value.to_string(),
        });
        self
    }

    /// Looks up an attribute value; see [`extract_attribute`]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        extract_attribute(self, name)
    }
}

/// One token of the stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    StartTag(Tag),
    EndTag(String),
    Text(String),
}

/// Returns the value of attribute `name` on `tag`
///
/// `None` means the attribute is absent, which is distinct from
/// `Some("")` for an attribute present with an empty value.
pub fn extract_attribute<'a>(tag: &'a Tag, name: &str) -> Option<&'a str> {
    tag.attributes
        .iter()
        .find(|attribute| attribute.key == name)
        .map(|attribute| attribute.value.as_str())
}

/// Pull-based stream of tokens for one page
///
/// Whitespace-only text is dropped and remaining text is trimmed, so "the
/// first text token after a tag" is the first visible text.
#[derive(Debug)]
pub struct TokenStream {
    tokens: std::vec::IntoIter<Token>,
}

impl TokenStream {
    /// Tokenizes an HTML document
    pub fn from_html(html: &str) -> Self {
        let document = Html::parse_document(html);
        let mut tokens = Vec::new();

        for edge in document.tree.root().traverse() {
            match edge {
                Edge::Open(node) => match node.value() {
                    Node::Element(element) => {
                        let attributes = element
                            .attrs()
                            .map(|(key, value)| Attribute {
                                key: key.to_string(),
                                value: value.to_string(),
                            })
                            .collect();
                        tokens.push(Token::StartTag(Tag {
                            name: element.name().to_string(),
                            attributes,
                        }));
                    }
                    Node::Text(text) => {
                        let trimmed = text.trim();
                        if !trimmed.is_empty() {
                            tokens.push(Token::Text(trimmed.to_string()));
                        }
                    }
                    _ => {}
                },
                Edge::Close(node) => {
                    if let Node::Element(element) = node.value() {
                        tokens.push(Token::EndTag(element.name().to_string()));
                    }
                }
            }
        }

        Self::from_tokens(tokens)
    }

    /// Wraps an already tokenized sequence
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        Self {
            tokens: tokens.into_iter(),
        }
    }
}

impl Iterator for TokenStream {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.tokens.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start_tags(html: &str) -> Vec<String> {
        TokenStream::from_html(html)
            .filter_map(|token| match token {
                Token::StartTag(tag) => Some(tag.name),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_extract_attribute_found() {
        let tag = Tag::new("a")
            .with_attribute("class", "a-link-normal")
            .with_attribute("href", "amazon.com");
        assert_eq!(extract_attribute(&tag, "href"), Some("amazon.com"));
    }

    #[test]
    fn test_extract_attribute_missing_vs_empty() {
        let tag = Tag::new("button").with_attribute("disabled", "");
        assert_eq!(extract_attribute(&tag, "disabled"), Some(""));
        assert_eq!(extract_attribute(&tag, "type"), None);
    }

    #[test]
    fn test_stream_is_balanced() {
        let html = r#"<div class="a"><img src="x.png"><p>one<br>two</p></div>"#;
        let mut depth: i32 = 0;
        for token in TokenStream::from_html(html) {
            match token {
                Token::StartTag(_) => depth += 1,
                Token::EndTag(_) => depth -= 1,
                Token::Text(_) => {}
            }
            assert!(depth >= 0);
        }
        assert_eq!(depth, 0);
    }

    #[test]
    fn test_stream_preserves_document_order() {
        let tags = start_tags(r#"<div><a href="/x">x</a><span>y</span></div>"#);
        let relevant: Vec<&str> = tags
            .iter()
            .map(String::as_str)
            .filter(|name| ["div", "a", "span"].contains(name))
            .collect();
        assert_eq!(relevant, vec!["div", "a", "span"]);
    }

    #[test]
    fn test_stream_trims_and_drops_blank_text() {
        let texts: Vec<String> = TokenStream::from_html("<p>\n   </p><p>  RTX 3080 </p>")
            .filter_map(|token| match token {
                Token::Text(text) => Some(text),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["RTX 3080".to_string()]);
    }

    #[test]
    fn test_stream_decodes_entities() {
        let texts: Vec<String> = TokenStream::from_html("<p>Tom &amp; Jerry</p>")
            .filter_map(|token| match token {
                Token::Text(text) => Some(text),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["Tom & Jerry".to_string()]);
    }

    #[test]
    fn test_attributes_are_captured() {
        let tag = TokenStream::from_html(r#"<a class="item-title" href="/p/1">t</a>"#)
            .find_map(|token| match token {
                Token::StartTag(tag) if tag.name == "a" => Some(tag),
                _ => None,
            })
            .unwrap();
        assert_eq!(tag.attribute("class"), Some("item-title"));
        assert_eq!(tag.attribute("href"), Some("/p/1"));
    }
}
