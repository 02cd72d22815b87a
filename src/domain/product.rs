use std::collections::HashSet;

use super::constants::sentinel;

/// Structured product data extracted from one product page
///
/// Built once per request and never mutated afterwards. Text fields always
/// hold a value: unrecoverable fields carry a sentinel instead of being absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRecord {
    name: String,
    price: String,
    /// Document order, duplicates kept
    sizes: Vec<String>,
    /// Unique, first-seen order
    image_urls: Vec<String>,
}

impl ProductRecord {
    /// Create a record; empty name or price fall back to their sentinels and
    /// repeated image URLs are dropped.
    pub fn new(
        name: impl Into<String>,
        price: impl Into<String>,
        sizes: Vec<String>,
        image_urls: Vec<String>,
    ) -> Self {
        let name = non_empty_or(name.into(), sentinel::NAME_NOT_FOUND);
        let price = non_empty_or(price.into(), sentinel::PRICE_NOT_FOUND);

        let mut seen = HashSet::new();
        let image_urls = image_urls
            .into_iter()
            .filter(|url| seen.insert(url.clone()))
            .collect();

        Self {
            name,
            price,
            sizes,
            image_urls,
        }
    }

    /// Record returned when the page could not be fetched or parsed at all
    pub fn degraded() -> Self {
        Self {
            name: sentinel::NAME_EXTRACTION_ERROR.to_string(),
            price: sentinel::PRICE_EXTRACTION_ERROR.to_string(),
            sizes: Vec::new(),
            image_urls: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> &str {
        &self.price
    }

    pub fn sizes(&self) -> &[String] {
        &self.sizes
    }

    pub fn image_urls(&self) -> &[String] {
        &self.image_urls
    }

    pub fn has_images(&self) -> bool {
        !self.image_urls.is_empty()
    }

    /// Markdown summary attached to the first delivered image
    pub fn caption(&self) -> String {
        let sizes_text = if self.sizes.is_empty() {
            sentinel::NO_SIZES.to_string()
        } else {
            self.sizes
                .iter()
                .map(|s| escape_markdown(s))
                .collect::<Vec<_>>()
                .join(", ")
        };

        format!(
            "{}\n\n*Price:* {}\n\n*Available Sizes:* {}",
            bold_markdown(&self.name),
            escape_markdown(&self.price),
            sizes_text
        )
    }
}

fn non_empty_or(value: String, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Escape the characters that legacy Markdown treats as entity delimiters.
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Render `text` in bold legacy Markdown.
///
/// Nothing is escaped inside an entity, so a literal `*` closes the bold
/// span, is written escaped, and the span is reopened after it.
pub fn bold_markdown(text: &str) -> String {
    text.split('*')
        .map(|part| if part.is_empty() { String::new() } else { format!("*{part}*") })
        .collect::<Vec<_>>()
        .join("\\*")
}
