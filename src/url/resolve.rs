use url::Url;

/// Resolves an extracted link against the page it was found on
///
/// # Arguments
///
/// * `href` - The raw link, possibly relative
/// * `base_url` - URL of the page the link was found on
///
/// # Returns
///
/// The absolute HTTP(S) URL, or `None` for links that cannot be crawled
/// (javascript:, mailto:, tel:, data:, fragment-only or unparsable).
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    // Same-page anchor
    if href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
