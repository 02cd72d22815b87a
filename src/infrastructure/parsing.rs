//! HTML parsing infrastructure for Namshi product pages
//!
//! Selector configuration, fallback-chain field extraction and image
//! resolution.

pub mod config;
pub mod error;
pub mod image_resolver;
pub mod product_detail_parser;

// Re-export public types
pub use config::{ImageRules, ParsingConfig, ProductDetailSelectors};
pub use error::{ParsingError, ParsingResult};
pub use product_detail_parser::{FallbackChain, ProductDetailParser, Strategy, extract};
