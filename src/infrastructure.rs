//! Infrastructure layer: HTTP fetching, HTML parsing, Telegram transport,
//! configuration and logging.

pub mod config;
pub mod logging;
pub mod parsing;
pub mod simple_http_client;
pub mod telegram;

// Re-export commonly used items
pub use config::{AppConfig, ConfigError, DeliveryConfig, LoggingConfig, bot_token_from_env};
pub use logging::{get_log_directory, init_logging, init_logging_with_config};
pub use parsing::{ParsingConfig, ParsingError, ParsingResult, ProductDetailParser};
pub use simple_http_client::{HttpClient, HttpClientConfig};
pub use telegram::{TelegramClient, TelegramConfig};
