use crate::UrlError;
use url::Url;

/// Normalizes a URL into the form used as the visited-set key
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject anything that is not HTTP or HTTPS
/// 3. Remove fragment (everything after #)
/// 4. Remove trailing slash from the path (except for root /)
/// 5. Remove empty query string (trailing ?)
///
/// Host lowercasing and dot-segment removal come from the parser itself.
/// Non-empty query strings are kept as-is.
///
/// # Examples
///
/// ```
/// use trawler::url::normalize_url;
///
/// let url = normalize_url("https://EXAMPLE.com/page/#reviews").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/page");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);

    let path = url.path();
    if path.len() > 1 && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/');
        let trimmed = if trimmed.is_empty() { "/" } else { trimmed }.to_string();
        url.set_path(&trimmed);
    }

    if url.query() == Some("") {
        url.set_query(None);
    }

    Ok(url)
}

/// Returns the visited-set key for `url_str`
///
/// Strings that do not parse as HTTP(S) URLs are keyed verbatim, so they
/// still dedup against themselves.
pub fn dedup_key(url_str: &str) -> String {
    match normalize_url(url_str) {
        Ok(url) => url.to_string(),
        Err(_) => url_str.to_string(),
    }
}
