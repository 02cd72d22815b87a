//! Long-polling bot loop
//!
//! Updates are handled strictly one at a time. Nothing a single message does
//! can stop the loop; polling errors are logged and retried after a pause.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::application::messaging::{ChatId, IncomingMessage, MessagingClient, MessagingResult, Update};
use crate::application::orchestrator::RequestOrchestrator;
use crate::domain::constants::messages;

/// Pause before polling again after a failed poll
const POLL_ERROR_PAUSE: Duration = Duration::from_secs(5);

/// Kind of text a user sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Start,
    Help,
    /// Any other `/command`; ignored
    Unknown,
    Text(&'a str),
}

impl<'a> Command<'a> {
    pub fn classify(text: &'a str) -> Self {
        let trimmed = text.trim();
        let Some(command) = trimmed.strip_prefix('/') else {
            return Self::Text(text);
        };
        // "/start@SomeBot args" -> "start"
        let name = command
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .split('@')
            .next()
            .unwrap_or_default();
        match name {
            "start" => Self::Start,
            "help" => Self::Help,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BotSettings {
    pub poll_timeout: Duration,
    pub drop_pending_updates: bool,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_secs(30),
            drop_pending_updates: true,
        }
    }
}

pub struct Bot {
    messaging: Arc<dyn MessagingClient>,
    orchestrator: RequestOrchestrator,
    settings: BotSettings,
}

impl Bot {
    pub fn new(messaging: Arc<dyn MessagingClient>, orchestrator: RequestOrchestrator, settings: BotSettings) -> Self {
        Self {
            messaging,
            orchestrator,
            settings,
        }
    }

    /// Poll until Ctrl-C
    pub async fn run(&self) -> anyhow::Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("❌ Could not listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Poll until `shutdown` completes.
    ///
    /// The shutdown future lives for the whole loop, so a signal that arrives
    /// while a batch is being handled stops the loop right after that batch.
    pub async fn run_until(&self, shutdown: impl Future<Output = ()>) -> anyhow::Result<()> {
        tokio::pin!(shutdown);

        info!("🚀 Bot started");
        let mut offset = if self.settings.drop_pending_updates {
            self.skip_pending_updates().await
        } else {
            None
        };

        loop {
            let polled = tokio::select! {
                biased;
                () = &mut shutdown => break,
                polled = self.messaging.receive_updates(offset, self.settings.poll_timeout) => polled,
            };

            match polled {
                Ok(updates) => offset = self.handle_updates(updates, offset).await,
                Err(e) => {
                    error!("❌ Polling failed: {}", e);
                    tokio::select! {
                        biased;
                        () = &mut shutdown => break,
                        () = tokio::time::sleep(POLL_ERROR_PAUSE) => {}
                    }
                }
            }
        }

        info!("🛑 Shutdown signal received, bot stopped");
        Ok(())
    }

    /// Handle a polled batch in order, returning the next offset
    pub async fn handle_updates(&self, updates: Vec<Update>, offset: Option<i64>) -> Option<i64> {
        let mut next = offset;
        for update in updates {
            next = Some(next.map_or(update.update_id + 1, |n| n.max(update.update_id + 1)));
            if let Some(message) = update.message {
                self.handle_message(&message).await;
            }
        }
        next
    }

    /// Handle one message; failures are logged, never returned
    pub async fn handle_message(&self, message: &IncomingMessage) {
        let Some(text) = message.text.as_deref() else {
            debug!("Ignoring non-text message in chat {}", message.chat_id);
            return;
        };

        let result = match Command::classify(text) {
            Command::Start => {
                let name = message.sender_first_name.as_deref().unwrap_or("there");
                self.reply(message.chat_id, &messages::greeting(name)).await
            }
            Command::Help => self.reply(message.chat_id, &messages::help()).await,
            Command::Unknown => {
                debug!("Ignoring unknown command: {}", text);
                Ok(())
            }
            Command::Text(text) => self
                .orchestrator
                .handle_text(message.chat_id, text)
                .await
                .map(|outcome| debug!("Request finished: {:?}", outcome)),
        };

        if let Err(e) = result {
            error!("❌ Failed to handle message in chat {}: {}", message.chat_id, e);
        }
    }

    async fn reply(&self, chat_id: ChatId, text: &str) -> MessagingResult<()> {
        self.messaging.send_text(chat_id, text, None).await.map(|_| ())
    }

    /// Acknowledge everything queued while offline, returning the offset to start from
    async fn skip_pending_updates(&self) -> Option<i64> {
        match self.messaging.receive_updates(Some(-1), Duration::ZERO).await {
            Ok(updates) => {
                let next = updates.last().map(|u| u.update_id + 1);
                if next.is_some() {
                    info!("Dropped pending updates");
                }
                next
            }
            Err(e) => {
                warn!("Could not drop pending updates: {}", e);
                None
            }
        }
    }
}
