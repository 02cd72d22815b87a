//! Site characteristics and user-facing constants
//!
//! Everything that is tied to the Namshi page family or to the wording the bot
//! uses lives here, so markup drift or copy changes touch one place.

/// Namshi site characteristics
pub mod site {
    /// Retailer domain (without the optional `www.` subdomain)
    pub const DOMAIN: &str = "namshi.com";

    /// Marker path segment every product page URL carries
    pub const PRODUCT_PATH_MARKER: &str = "/p/";

    /// Example product URL shown in guidance messages
    pub const EXAMPLE_PRODUCT_URL: &str =
        "https://www.namshi.com/uae-en/buy-product-name/product-id/p/";
}

/// Placeholder values used when a field cannot be recovered
pub mod sentinel {
    /// Product name could not be located in the page
    pub const NAME_NOT_FOUND: &str = "Product name not found";

    /// Price could not be located in the page
    pub const PRICE_NOT_FOUND: &str = "Price not found";

    /// The whole extraction failed (fetch error or parser failure)
    pub const NAME_EXTRACTION_ERROR: &str = "Error extracting product name";

    /// The whole extraction failed (fetch error or parser failure)
    pub const PRICE_EXTRACTION_ERROR: &str = "Error extracting price";

    /// Shown in the caption when the size list is empty
    pub const NO_SIZES: &str = "No sizes available";
}

/// Delivery limits imposed by the messaging transport
pub mod delivery {
    /// Maximum number of items in one grouped-media message
    pub const MEDIA_GROUP_LIMIT: usize = 10;
}

/// Texts sent back to the user
pub mod messages {
    pub const PROCESSING: &str = "Processing your Namshi product URL... Please wait.";
    pub const COMPLETED: &str = "All product information has been sent!";
    pub const NO_IMAGES: &str = "No product images found.";
    pub const DOWNLOAD_FAILED: &str = "Failed to download product images.";
    pub const DELIVERY_FAILED: &str =
        "Something went wrong while sending the product images. Please try again.";

    /// Reply for text that is not an eligible product URL
    pub fn guidance() -> String {
        format!(
            "Please send a valid Namshi product URL (e.g., {})",
            super::site::EXAMPLE_PRODUCT_URL
        )
    }

    /// Reply for `/start`
    pub fn greeting(first_name: &str) -> String {
        format!(
            "Hi {first_name}! Send me a Namshi product URL and I'll extract the product details for you."
        )
    }

    /// Reply for `/help`
    pub fn help() -> String {
        format!(
            "Send me a Namshi product URL (e.g., {}) and I'll extract the product images, name, price, and available sizes for you.",
            super::site::EXAMPLE_PRODUCT_URL
        )
    }
}
