//! Domain services
//!
//! Interfaces the request pipeline depends on; implementations live in the
//! infrastructure layer.

pub mod product_services;

pub use product_services::{FetchError, FetchResult, ImageSource, PageSource};
