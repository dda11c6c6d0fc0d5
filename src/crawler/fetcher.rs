//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the shared HTTP client with the configured timeout
//! - GET requests carrying the single configured header
//! - Error classification (transport errors carry the failing URL)

use crate::config::RequestConfig;
use crate::TrawlerError;
use reqwest::Client;
use tracing::{debug, warn};

/// A fetched response body
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: String,

    /// HTTP status code
    pub status: u16,

    /// Response body as text
    pub body: String,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The request configuration (timeout)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use trawler::config::RequestConfig;
/// use trawler::crawler::build_http_client;
///
/// let client = build_http_client(&RequestConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &RequestConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(config.timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL with a single GET request
///
/// No retries. Any transport failure (DNS, connect, TLS, timeout, body
/// read) is returned as [`TrawlerError::Http`]. A non-success status is not
/// an error: the body is returned and the caller decides what to do with it.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
/// * `config` - Supplies the header sent with the request
pub async fn fetch_page(
    client: &Client,
    url: &str,
    config: &RequestConfig,
) -> Result<FetchedPage, TrawlerError> {
    let to_error = |source: reqwest::Error| TrawlerError::Http {
        url: url.to_string(),
        source,
    };

    let response = client
        .get(url)
        .header(config.header_key.as_str(), config.header_value.as_str())
        .send()
        .await
        .map_err(to_error)?;

    let status = response.status();
    let final_url = response.url().to_string();

    if !status.is_success() {
        warn!("{} returned HTTP {}", url, status.as_u16());
    }

    let body = response.text().await.map_err(to_error)?;
    debug!("Fetched {} ({} bytes)", final_url, body.len());

    Ok(FetchedPage {
        final_url,
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(&RequestConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_fetch_sends_configured_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .and(header("X-Crawler", "trawler-test"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>hi</p>"))
            .expect(1)
            .mount(&server)
            .await;

        let config = RequestConfig {
            header_key: "X-Crawler".to_string(),
            header_value: "trawler-test".to_string(),
            ..RequestConfig::default()
        };
        let client = build_http_client(&config).unwrap();
        let page = fetch_page(&client, &format!("{}/page", server.uri()), &config)
            .await
            .unwrap();

        assert!(page.is_success());
        assert_eq!(page.body, "<p>hi</p>");
    }

    #[tokio::test]
    async fn test_non_success_status_still_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
            .mount(&server)
            .await;

        let config = RequestConfig::default();
        let client = build_http_client(&config).unwrap();
        let page = fetch_page(&client, &format!("{}/gone", server.uri()), &config)
            .await
            .unwrap();

        assert_eq!(page.status, 404);
        assert!(!page.is_success());
        assert_eq!(page.body, "not here");
    }

    #[tokio::test]
    async fn test_transport_error_carries_url() {
        let config = RequestConfig::default();
        let client = build_http_client(&config).unwrap();
        let result = fetch_page(&client, "http://127.0.0.1:1/unreachable", &config).await;

        match result {
            Err(TrawlerError::Http { url, .. }) => {
                assert_eq!(url, "http://127.0.0.1:1/unreachable")
            }
            other => panic!("expected Http error, got {:?}", other),
        }
    }
}
