//! Product detail parser
//!
//! Every field is extracted by an ordered fallback chain: the exact selector
//! for the current markup first, then a class-substring selector that survives
//! regenerated style-module suffixes, then the field sentinel.

#![allow(clippy::uninlined_format_args)]

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::config::{ImageRules, ParsingConfig, ProductDetailSelectors};
use super::image_resolver::{self, is_absolute, parse_width, upgrade_width};
use super::{ParsingError, ParsingResult};
use crate::domain::product::ProductRecord;

type StrategyFn<T> = Box<dyn Fn(&Html) -> Option<T> + Send + Sync>;

/// One named extraction attempt
pub struct Strategy<T> {
    name: String,
    run: StrategyFn<T>,
}

impl<T> Strategy<T> {
    pub fn new(name: impl Into<String>, run: impl Fn(&Html) -> Option<T> + Send + Sync + 'static) -> Self {
        Self {
            name: name.into(),
            run: Box::new(run),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&self, html: &Html) -> Option<T> {
        (self.run)(html)
    }
}

/// Ordered strategies for one field; the first `Some` wins
pub struct FallbackChain<T> {
    field: &'static str,
    strategies: Vec<Strategy<T>>,
}

impl<T> FallbackChain<T> {
    pub fn new(field: &'static str) -> Self {
        Self {
            field,
            strategies: Vec::new(),
        }
    }

    pub fn then(mut self, strategy: Strategy<T>) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn strategies(&self) -> &[Strategy<T>] {
        &self.strategies
    }

    pub fn resolve(&self, html: &Html) -> Option<T> {
        for (i, strategy) in self.strategies.iter().enumerate() {
            if let Some(value) = strategy.apply(html) {
                debug!("Extracted {} using strategy {} ({})", self.field, i, strategy.name);
                return Some(value);
            }
        }

        debug!(
            "Failed to extract {} using {} strategies",
            self.field,
            self.strategies.len()
        );
        None
    }
}

/// Parser for extracting product information from Namshi product pages
pub struct ProductDetailParser {
    name: FallbackChain<String>,
    price: FallbackChain<String>,
    sizes: FallbackChain<Vec<String>>,
    images: FallbackChain<Vec<String>>,
    image_rules: ImageRules,
}

impl ProductDetailParser {
    /// Create a new product detail parser with default configuration
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&ParsingConfig::default())
    }

    /// Create parser with custom selector configuration
    pub fn with_config(config: &ParsingConfig) -> ParsingResult<Self> {
        let selectors = &config.product_detail_selectors;
        let rules = &config.image_rules;

        if rules.preferred_width == 0 {
            return Err(ParsingError::ConfigurationError {
                message: "preferred image width must be greater than 0".to_string(),
            });
        }

        Ok(Self {
            name: Self::name_chain(selectors)?,
            price: Self::text_chain("price", &selectors.price)?,
            sizes: Self::sizes_chain(selectors)?,
            images: Self::images_chain(selectors, rules)?,
            image_rules: rules.clone(),
        })
    }

    /// Extract a product record. Never fails: unrecoverable fields become sentinels.
    pub fn extract(&self, html: &str) -> ProductRecord {
        let document = Html::parse_document(html);

        let name = self.name.resolve(&document).unwrap_or_default();
        let price = self.price.resolve(&document).unwrap_or_default();
        let sizes = self.sizes.resolve(&document).unwrap_or_default();
        let raw_images = self.images.resolve(&document).unwrap_or_default();
        let image_urls = image_resolver::resolve(&raw_images, &self.image_rules);

        if image_urls.is_empty() {
            warn!("No product images found in page");
        }

        let record = ProductRecord::new(name, price, sizes, image_urls);
        debug!(
            "Extracted product '{}' ({} sizes, {} images)",
            record.name(),
            record.sizes().len(),
            record.image_urls().len()
        );
        record
    }

    /// Compile selector strings into Selector objects
    fn compile_selectors(field: &str, selector_strings: &[String]) -> ParsingResult<Vec<(String, Selector)>> {
        let mut selectors = Vec::new();
        let mut errors = Vec::new();

        for selector_str in selector_strings {
            match Selector::parse(selector_str) {
                Ok(selector) => selectors.push((selector_str.clone(), selector)),
                Err(e) => {
                    let error = ParsingError::invalid_selector(selector_str, e);
                    warn!("Failed to compile selector for {}: {}", field, error);
                    errors.push(error);
                }
            }
        }

        if selectors.is_empty() && !selector_strings.is_empty() {
            return Err(errors
                .into_iter()
                .next()
                .filter(|_| selector_strings.len() == 1)
                .unwrap_or_else(|| ParsingError::no_valid_selectors(field, selector_strings.len())));
        }

        Ok(selectors)
    }

    fn name_chain(selectors: &ProductDetailSelectors) -> ParsingResult<FallbackChain<String>> {
        let mut chain = FallbackChain::new("name");

        for (label, selector) in Self::compile_selectors("name", &selectors.title_meta)? {
            let delimiter = selectors.title_delimiter.clone();
            chain = chain.then(Strategy::new(format!("meta {}", label), move |html| {
                first_attr(html, &selector, "content").and_then(|content| strip_title_suffix(&content, &delimiter))
            }));
        }

        for (label, selector) in Self::compile_selectors("name", &selectors.title)? {
            chain = chain.then(Strategy::new(label, move |html| first_text(html, &selector)));
        }

        Ok(chain)
    }

    fn text_chain(field: &'static str, selector_strings: &[String]) -> ParsingResult<FallbackChain<String>> {
        let chain = Self::compile_selectors(field, selector_strings)?
            .into_iter()
            .fold(FallbackChain::new(field), |chain, (label, selector)| {
                chain.then(Strategy::new(label, move |html| first_text(html, &selector)))
            });
        Ok(chain)
    }

    fn sizes_chain(selectors: &ProductDetailSelectors) -> ParsingResult<FallbackChain<Vec<String>>> {
        let chain = Self::compile_selectors("sizes", &selectors.size)?
            .into_iter()
            .fold(FallbackChain::new("sizes"), |chain, (label, selector)| {
                chain.then(Strategy::new(label, move |html| {
                    non_empty(html.select(&selector).filter_map(element_text).collect())
                }))
            });
        Ok(chain)
    }

    fn images_chain(selectors: &ProductDetailSelectors, rules: &ImageRules) -> ParsingResult<FallbackChain<Vec<String>>> {
        let mut chain = FallbackChain::new("images");

        // Gallery images
        for (label, selector) in Self::compile_selectors("images", &selectors.gallery_image)? {
            let width = rules.preferred_width;
            chain = chain.then(Strategy::new(format!("gallery {}", label), move |html| {
                non_empty(
                    html.select(&selector)
                        .filter_map(|img| img.value().attr("src"))
                        .filter(|src| is_absolute(src))
                        .map(|src| upgrade_width(src, width))
                        .collect(),
                )
            }));
        }

        // Document-level image annotations
        for (label, selector) in Self::compile_selectors("images", &selectors.meta_image)? {
            let rules = rules.clone();
            chain = chain.then(Strategy::new(format!("meta {}", label), move |html| {
                non_empty(
                    html.select(&selector)
                        .filter_map(|meta| meta.value().attr("content"))
                        .filter(|content| {
                            is_absolute(content)
                                && !rules.is_logo(content)
                                && rules.is_annotated_product_image(content)
                        })
                        .map(str::to_string)
                        .collect(),
                )
            }));
        }

        // Generic images identified by alt text
        for (label, selector) in Self::compile_selectors("images", &selectors.alt_image)? {
            let rules = rules.clone();
            chain = chain.then(Strategy::new(format!("alt {}", label), move |html| {
                non_empty(
                    html.select(&selector)
                        .filter_map(|img| img.value().attr("src"))
                        .filter(|src| is_absolute(src))
                        .filter(|src| {
                            parse_width(src).is_some_and(|w| w > rules.min_width)
                                || rules.is_annotated_product_image(src)
                        })
                        .map(|src| upgrade_width(src, rules.preferred_width))
                        .collect(),
                )
            }));
        }

        Ok(chain)
    }
}

/// Extract a record with the default configuration.
///
/// If the default parser cannot be built the whole record degrades.
pub fn extract(html: &str) -> ProductRecord {
    match ProductDetailParser::new() {
        Ok(parser) => parser.extract(html),
        Err(e) => {
            warn!("Product detail parser unavailable: {}", e);
            ProductRecord::degraded()
        }
    }
}

fn element_text(element: ElementRef<'_>) -> Option<String> {
    let text = element.text().collect::<String>().trim().to_string();
    (!text.is_empty()).then_some(text)
}

fn first_text(html: &Html, selector: &Selector) -> Option<String> {
    html.select(selector).next().and_then(element_text)
}

fn first_attr(html: &Html, selector: &Selector, attr: &str) -> Option<String> {
    html.select(selector)
        .next()
        .and_then(|element| element.value().attr(attr))
        .map(str::to_string)
}

/// `"Running Shoe | Namshi"` -> `"Running Shoe"`
fn strip_title_suffix(title: &str, delimiter: &str) -> Option<String> {
    let name = if delimiter.is_empty() {
        title
    } else {
        title.split(delimiter).next().unwrap_or(title)
    };
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    (!items.is_empty()).then_some(items)
}
