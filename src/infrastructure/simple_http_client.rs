//! HTTP client for product pages and product images
//!
//! Sends browser-like headers so the retailer serves the regular page
//! variant. Every call is a single attempt: failures go straight back to the
//! caller.

use async_trait::async_trait;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use reqwest::{Client, ClientBuilder, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::domain::product_url::strip_query;
use crate::domain::services::{FetchError, FetchResult, ImageSource, PageSource};

/// Configuration for HTTP client behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    /// User agent string
    pub user_agent: String,
    /// Accept-Language header value
    pub accept_language: String,
    /// Request timeout in seconds; `None` keeps the transport default
    pub timeout_seconds: Option<u64>,
    /// Whether to follow redirects
    pub follow_redirects: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            timeout_seconds: None,
            follow_redirects: true,
        }
    }
}

/// HTTP client used for both page fetches and image downloads
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> anyhow::Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language)
                .map_err(|e| anyhow::anyhow!("Invalid Accept-Language value: {}", e))?,
        );

        let mut builder = ClientBuilder::new()
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .gzip(true)
            .brotli(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            });

        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let client = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self { client, config })
    }

    pub const fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// GET `url`, failing on transport errors and non-2xx statuses
    pub async fn fetch_response(&self, url: &str) -> FetchResult<Response> {
        info!("🌐 HTTP GET: {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("❌ HTTP error {}: {}", status, url);
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response)
    }

    /// Fetch HTML content and return it as a string.
    ///
    /// The query string is stripped first so tracking parameters never change
    /// the page that is requested.
    pub async fn fetch_html_string(&self, url: &str) -> FetchResult<String> {
        let clean_url = strip_query(url);
        let response = self.fetch_response(clean_url).await?;

        let html_content = response.text().await.map_err(|source| FetchError::Body {
            url: clean_url.to_string(),
            source,
        })?;

        if html_content.is_empty() {
            return Err(FetchError::EmptyBody {
                url: clean_url.to_string(),
            });
        }

        debug!("Fetched {} bytes of HTML from {}", html_content.len(), clean_url);
        Ok(html_content)
    }

    /// Download raw bytes (images)
    pub async fn fetch_bytes(&self, url: &str) -> FetchResult<Vec<u8>> {
        let response = self.fetch_response(url).await?;
        let bytes = response.bytes().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })?;

        if bytes.is_empty() {
            return Err(FetchError::EmptyBody {
                url: url.to_string(),
            });
        }

        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl PageSource for HttpClient {
    async fn fetch_page(&self, url: &str) -> FetchResult<String> {
        self.fetch_html_string(url).await
    }
}

#[async_trait]
impl ImageSource for HttpClient {
    async fn download_image(&self, url: &str) -> FetchResult<Vec<u8>> {
        self.fetch_bytes(url).await
    }
}
