//! Image URL resolution
//!
//! Deduplicates extracted image references, keeps the ones that look like
//! product photos and rewrites resolution hints.

use std::collections::HashSet;
use tracing::debug;
use url::Url;

use super::config::ImageRules;

/// Deduplicate (first occurrence wins), then keep product photos only.
///
/// The marker filter is a precision pass: if it would leave nothing, the
/// deduplicated list is returned unfiltered.
pub fn resolve(raw_urls: &[String], rules: &ImageRules) -> Vec<String> {
    let mut seen = HashSet::new();
    let deduped: Vec<String> = raw_urls
        .iter()
        .filter(|url| seen.insert(url.as_str()))
        .cloned()
        .collect();

    let filtered: Vec<String> = deduped
        .iter()
        .filter(|url| rules.is_product_image(url))
        .cloned()
        .collect();

    if filtered.is_empty() {
        if !deduped.is_empty() {
            debug!(
                "Marker filter removed all {} images, keeping unfiltered list",
                deduped.len()
            );
        }
        deduped
    } else {
        debug!("Resolved {} of {} image URLs", filtered.len(), raw_urls.len());
        filtered
    }
}

/// Absolute http(s) URL check used by every image strategy
pub fn is_absolute(url: &str) -> bool {
    url.starts_with("http")
}

/// Value of the `width` query parameter, if present and numeric
pub fn parse_width(url: &str) -> Option<u32> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "width")
        .and_then(|(_, value)| value.parse().ok())
}

/// Rewrite the `width` query parameter to `width`; URLs without one are unchanged.
///
/// Only the width value is touched; every other parameter keeps its original encoding.
pub fn upgrade_width(url: &str, width: u32) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };
    let Some(query) = parsed.query() else {
        return url.to_string();
    };

    let mut found = false;
    let rewritten = query
        .split('&')
        .map(|pair| {
            let key = pair.split_once('=').map_or(pair, |(key, _)| key);
            if key == "width" {
                found = true;
                format!("width={width}")
            } else {
                pair.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("&");

    if !found {
        return url.to_string();
    }
    parsed.set_query(Some(&rewritten));
    parsed.to_string()
}
