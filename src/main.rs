use std::path::PathBuf;

use anyhow::Context;
use namshi_product_bot::infrastructure::{AppConfig, bot_token_from_env, init_logging_with_config, logging};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Optional first argument: explicit config file
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref()).context("Failed to load configuration")?;

    init_logging_with_config(&config.logging)?;
    logging::log_system_info();
    info!("Configuration loaded from {}", AppConfig::source_description(config_path.as_deref()));

    let token = match bot_token_from_env() {
        Ok(token) => token,
        Err(e) => {
            error!("❌ {}", e);
            return Err(e.into());
        }
    };

    namshi_product_bot::run(config, token).await
}
