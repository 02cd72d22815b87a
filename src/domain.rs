//! Domain module - product data and the rules around it
//!
//! Site constants, URL classification, the product record, and the
//! grouped-media batching rules. Nothing here performs I/O.

pub mod constants;
pub mod media;
pub mod product;
pub mod product_url;
pub mod services;

// Re-export commonly used items for convenience
pub use media::{MediaBatch, MediaPhoto, into_batches};
pub use product::ProductRecord;
pub use product_url::{ProductUrl, is_eligible, strip_query};
pub use services::{FetchError, FetchResult, ImageSource, PageSource};
