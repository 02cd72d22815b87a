//! Namshi Product Bot
//!
//! A Telegram bot that takes Namshi product page URLs and replies with the
//! product's images, name, price and available sizes.

pub mod application;
pub mod domain;
pub mod infrastructure;

use std::sync::Arc;
use std::time::Duration;

use application::{Bot, BotSettings, DeliveryBatcher, MessagingClient, RequestOrchestrator};
use infrastructure::{AppConfig, HttpClient, ProductDetailParser, TelegramClient};

/// Wire the HTTP client, parser and Telegram transport into a bot
pub fn build_bot(config: &AppConfig, token: &str) -> anyhow::Result<Bot> {
    let http = Arc::new(HttpClient::with_config(config.http.clone())?);
    let telegram: Arc<dyn MessagingClient> = Arc::new(TelegramClient::new(token, &config.telegram)?);
    let parser = ProductDetailParser::with_config(&config.parsing)?;

    let batcher = DeliveryBatcher::new(http.clone(), telegram.clone())
        .with_media_group_limit(config.delivery.media_group_limit);
    let orchestrator = RequestOrchestrator::new(http, telegram.clone(), parser, batcher);

    let settings = BotSettings {
        poll_timeout: Duration::from_secs(config.telegram.poll_timeout_secs),
        drop_pending_updates: config.telegram.drop_pending_updates,
    };

    Ok(Bot::new(telegram, orchestrator, settings))
}

/// Build the bot and poll until shutdown
pub async fn run(config: AppConfig, token: String) -> anyhow::Result<()> {
    let bot = build_bot(&config, &token)?;
    bot.run().await
}
