//! Page and image retrieval service traits

use async_trait::async_trait;
use thiserror::Error;

/// Failure reaching the product page or an image
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed for {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status}: {url}")]
    Status { status: u16, url: String },

    #[error("Failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Empty response from {url}")]
    EmptyBody { url: String },
}

impl FetchError {
    /// HTTP status code, when the server answered at all
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type FetchResult<T> = Result<T, FetchError>;

/// Retrieves product page HTML
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the page at `url` (query string is dropped before the request)
    async fn fetch_page(&self, url: &str) -> FetchResult<String>;
}

/// Retrieves image bytes
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Download one image; exactly one attempt
    async fn download_image(&self, url: &str) -> FetchResult<Vec<u8>>;
}
