//! Product URL classification and normalization

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// `http(s)://[www.]namshi.com/.../p/`, anchored at the start of the text.
static PRODUCT_URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://(?:www\.)?namshi\.com/.*?/p/").expect("valid product URL pattern")
});

/// Returns true when `text` is a Namshi product page URL.
///
/// Purely syntactic: reachability is never checked.
pub fn is_eligible(text: &str) -> bool {
    PRODUCT_URL_PATTERN.is_match(text)
}

/// Drops the query string (everything from the first `?`).
pub fn strip_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(base, _)| base)
}

/// A validated product page URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductUrl {
    /// URL as the user sent it
    raw: String,
}

impl ProductUrl {
    /// Classify `text`, returning `None` for anything that is not a product URL
    pub fn parse(text: &str) -> Option<Self> {
        is_eligible(text).then(|| Self {
            raw: text.to_string(),
        })
    }

    /// URL as received
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// URL with tracking parameters removed; this is what gets fetched
    pub fn normalized(&self) -> &str {
        strip_query(&self.raw)
    }
}

impl From<ProductUrl> for String {
    fn from(product_url: ProductUrl) -> Self {
        product_url.raw
    }
}

impl AsRef<str> for ProductUrl {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for ProductUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.normalized())
    }
}
