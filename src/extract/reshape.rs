use crate::extract::rules::UrlReshapeRule;

/// Reshapes `url` according to `rule`
///
/// The URL must start with `prefix_must_exist`, end with `suffix_must_exist`
/// and contain `substring_must_contain` (empty predicates always hold).
/// When it does, the rewrite runs in a fixed order: substring replace,
/// prefix/suffix strip, prefix/suffix add.
///
/// # Returns
///
/// * `Some(String)` - The reshaped URL (unchanged for an empty rule)
/// * `None` - A predicate failed; callers must discard the URL
///
/// # Example
///
/// ```
/// use trawler::extract::{reshape_url, UrlReshapeRule};
///
/// let rule = UrlReshapeRule {
///     prefix_must_exist: "/".to_string(),
///     prefix_to_add: "http://x.com".to_string(),
///     ..UrlReshapeRule::default()
/// };
/// assert_eq!(reshape_url("/a/b", &rule).as_deref(), Some("http://x.com/a/b"));
/// assert_eq!(reshape_url("a/b", &rule), None);
/// ```
pub fn reshape_url(url: &str, rule: &UrlReshapeRule) -> Option<String> {
    if !url.starts_with(rule.prefix_must_exist.as_str())
        || !url.ends_with(rule.suffix_must_exist.as_str())
        || !url.contains(rule.substring_must_contain.as_str())
    {
        return None;
    }

    let mut reshaped = if rule.replace_from.is_empty() {
        url.to_string()
    } else {
        url.replace(rule.replace_from.as_str(), &rule.replace_to)
    };

    if !rule.prefix_to_strip.is_empty() {
        if let Some(stripped) = reshaped.strip_prefix(rule.prefix_to_strip.as_str()) {
            reshaped = stripped.to_string();
        }
    }

    if !rule.suffix_to_strip.is_empty() {
        if let Some(stripped) = reshaped.strip_suffix(rule.suffix_to_strip.as_str()) {
            reshaped = stripped.to_string();
        }
    }

    if !rule.prefix_to_add.is_empty() {
        reshaped.insert_str(0, &rule.prefix_to_add);
    }

    reshaped.push_str(&rule.suffix_to_add);

    Some(reshaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix_rule(prefix_must_exist: &str, prefix_to_add: &str) -> UrlReshapeRule {
        UrlReshapeRule {
            prefix_must_exist: prefix_must_exist.to_string(),
            prefix_to_add: prefix_to_add.to_string(),
            ..UrlReshapeRule::default()
        }
    }

    #[test]
    fn test_prefix_added_when_prefix_exists() {
        let rule = prefix_rule("/", "http://x.com");
        assert_eq!(
            reshape_url("/a/b", &rule),
            Some("http://x.com/a/b".to_string())
        );
    }

    #[test]
    fn test_not_match_when_prefix_missing() {
        let rule = prefix_rule("/", "http://x.com");
        assert_eq!(reshape_url("a/b", &rule), None);
    }

    #[test]
    fn test_empty_rule_is_identity() {
        assert_eq!(
            reshape_url("https://site.com/x", &UrlReshapeRule::default()),
            Some("https://site.com/x".to_string())
        );
    }

    #[test]
    fn test_protocol_relative_links() {
        let rule = UrlReshapeRule {
            prefix_must_exist: "//".to_string(),
            prefix_to_strip: "//".to_string(),
            prefix_to_add: "http://".to_string(),
            ..UrlReshapeRule::default()
        };
        assert_eq!(
            reshape_url("//c1.neweggimages.com/p/1", &rule),
            Some("http://c1.neweggimages.com/p/1".to_string())
        );
    }

    #[test]
    fn test_operations_apply_in_order() {
        let rule = UrlReshapeRule {
            substring_must_contain: "/dp/".to_string(),
            replace_from: "/dp/".to_string(),
            replace_to: "/gp/product/".to_string(),
            suffix_to_strip: "?ref=x".to_string(),
            prefix_to_add: "https://www.amazon.com".to_string(),
            suffix_to_add: "/".to_string(),
            ..UrlReshapeRule::default()
        };
        assert_eq!(
            reshape_url("/item/dp/B08?ref=x", &rule),
            Some("https://www.amazon.com/item/gp/product/B08/".to_string())
        );
    }

    #[test]
    fn test_suffix_and_substring_predicates() {
        let rule = UrlReshapeRule {
            suffix_must_exist: ".html".to_string(),
            substring_must_contain: "/product/".to_string(),
            ..UrlReshapeRule::default()
        };
        assert!(reshape_url("/product/1.html", &rule).is_some());
        assert!(reshape_url("/product/1.php", &rule).is_none());
        assert!(reshape_url("/category/1.html", &rule).is_none());
    }
}
