//! Parsing configuration for HTML extraction
//!
//! Centralized configuration for CSS selectors and image filtering rules.
//! Namshi renders class names with generated style-module suffixes
//! (`ProductPrice_value__hnFSS`), so every field lists the exact class first
//! and a class-substring match second.

use serde::{Deserialize, Serialize};

/// Main parsing configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingConfig {
    /// Product detail selectors
    pub product_detail_selectors: ProductDetailSelectors,

    /// Image selection rules
    pub image_rules: ImageRules,
}

/// CSS selectors for product detail pages, tried in order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductDetailSelectors {
    /// Document-level title annotations (`content` attribute)
    pub title_meta: Vec<String>,

    /// Delimiter separating the product name from the site suffix in the title annotation
    pub title_delimiter: String,

    /// Heading elements holding the product name
    pub title: Vec<String>,

    /// Inline price elements
    pub price: Vec<String>,

    /// Enabled size selector controls
    pub size: Vec<String>,

    /// Images inside the product gallery
    pub gallery_image: Vec<String>,

    /// Document-level image annotations (`content` attribute)
    pub meta_image: Vec<String>,

    /// Generic images identified by their alt text
    pub alt_image: Vec<String>,
}

impl Default for ProductDetailSelectors {
    fn default() -> Self {
        Self {
            title_meta: vec![r#"meta[property="og:title"]"#.to_string()],
            title_delimiter: "|".to_string(),
            title: vec![
                "h1.ProductConversion_productTitle__dvlc5".to_string(),
                r#"h1[class*="productTitle"]"#.to_string(),
            ],
            price: vec![
                "span.ProductPrice_value__hnFSS".to_string(),
                r#"span[class*="value"]"#.to_string(),
            ],
            size: vec![
                "button.SizePills_size_variant__4qpXf:not([disabled])".to_string(),
                r#"button[class*="size_variant"]:not([disabled])"#.to_string(),
            ],
            gallery_image: vec!["div.ImageGallery_imageContainer__jmn93 img".to_string()],
            meta_image: vec![r#"meta[property="og:image"]"#.to_string()],
            alt_image: vec![
                r#"img[alt*="PUMA"], img[alt*="product"], img[alt*="Product"]"#.to_string(),
            ],
        }
    }
}

/// Rules that tell product photos apart from logos, icons and thumbnails
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageRules {
    /// Markers identifying a product photo URL (matched case-insensitively)
    pub product_markers: Vec<String>,

    /// Stricter markers required for document-level image annotations
    pub annotation_markers: Vec<String>,

    /// Substrings identifying site logos (matched case-insensitively)
    pub logo_markers: Vec<String>,

    /// Width requested when a URL carries a `width` parameter
    pub preferred_width: u32,

    /// Generic images at or below this width are dropped unless they carry a marker
    pub min_width: u32,
}

impl Default for ImageRules {
    fn default() -> Self {
        Self {
            product_markers: vec!["/p/".to_string(), "pzsku".to_string(), "product".to_string()],
            annotation_markers: vec!["/p/".to_string(), "pzsku".to_string()],
            logo_markers: vec!["namshi-logo".to_string()],
            preferred_width: 800,
            min_width: 200,
        }
    }
}

impl ImageRules {
    /// True when `url` carries one of the product-image markers
    pub fn is_product_image(&self, url: &str) -> bool {
        contains_any(url, &self.product_markers)
    }

    /// True when `url` carries one of the stricter annotation markers
    pub fn is_annotated_product_image(&self, url: &str) -> bool {
        contains_any(url, &self.annotation_markers)
    }

    pub fn is_logo(&self, url: &str) -> bool {
        contains_any(url, &self.logo_markers)
    }
}

fn contains_any(url: &str, markers: &[String]) -> bool {
    let lowered = url.to_lowercase();
    markers
        .iter()
        .any(|marker| lowered.contains(&marker.to_lowercase()))
}
