//! Application layer - request handling on top of the domain and infrastructure
//!
//! The bot loop feeds incoming texts to the orchestrator, which drives
//! extraction and hands the resulting record to the delivery batcher.

pub mod bot;
pub mod delivery;
pub mod messaging;
pub mod orchestrator;

// Re-export commonly used items
pub use bot::{Bot, BotSettings, Command};
pub use delivery::{DeliveryBatcher, DeliveryError, DeliveryOutcome, TextOnlyReason};
pub use messaging::{ChatId, IncomingMessage, MessageId, MessagingClient, MessagingError, MessagingResult, ParseMode, Update};
pub use orchestrator::{RequestOrchestrator, RequestOutcome};
