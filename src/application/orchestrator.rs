//! Per-message request pipeline
//!
//! classify → "processing" notice → fetch + extract → deliver → clean up.
//! Fetch failures never abort a request: they degrade to the sentinel record
//! and delivery carries on with it.

use std::sync::Arc;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use crate::application::delivery::{DeliveryBatcher, DeliveryOutcome};
use crate::application::messaging::{ChatId, MessagingClient, MessagingResult};
use crate::domain::constants::messages;
use crate::domain::product::ProductRecord;
use crate::domain::product_url::ProductUrl;
use crate::domain::services::{FetchResult, PageSource};
use crate::infrastructure::parsing::ProductDetailParser;

/// What happened to one incoming text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Not a product URL; guidance was sent
    Rejected,
    /// Product delivered (media or text only)
    Delivered(DeliveryOutcome),
    /// A send failed mid-delivery; the user was told
    DeliveryFailed { batches_sent: usize },
}

pub struct RequestOrchestrator {
    pages: Arc<dyn PageSource>,
    messaging: Arc<dyn MessagingClient>,
    parser: ProductDetailParser,
    batcher: DeliveryBatcher,
}

impl RequestOrchestrator {
    pub fn new(
        pages: Arc<dyn PageSource>,
        messaging: Arc<dyn MessagingClient>,
        parser: ProductDetailParser,
        batcher: DeliveryBatcher,
    ) -> Self {
        Self {
            pages,
            messaging,
            parser,
            batcher,
        }
    }

    /// Handle one text message from `chat_id`.
    ///
    /// Only a failure to send the guidance or the processing notice is
    /// returned; everything after that is reported to the user instead.
    pub async fn handle_text(&self, chat_id: ChatId, text: &str) -> MessagingResult<RequestOutcome> {
        let span = info_span!("request", request_id = %Uuid::new_v4(), chat_id = %chat_id);
        self.process(chat_id, text).instrument(span).await
    }

    async fn process(&self, chat_id: ChatId, text: &str) -> MessagingResult<RequestOutcome> {
        let Some(url) = ProductUrl::parse(text.trim()) else {
            info!("Rejected non-product text");
            self.messaging
                .send_text(chat_id, &messages::guidance(), None)
                .await?;
            return Ok(RequestOutcome::Rejected);
        };

        info!("🔗 Product URL received: {}", url);
        let processing = self
            .messaging
            .send_text(chat_id, messages::PROCESSING, None)
            .await?;

        let record = self.fetch_record(&url).await.unwrap_or_else(|e| {
            error!("❌ Failed to fetch product page: {}", e);
            ProductRecord::degraded()
        });
        info!(
            "Extracted '{}' ({}), {} size(s), {} image(s)",
            record.name(),
            record.price(),
            record.sizes().len(),
            record.image_urls().len()
        );

        let outcome = match self.batcher.deliver(chat_id, &record).await {
            Ok(delivered) => RequestOutcome::Delivered(delivered),
            Err(e) => {
                error!("❌ {}", e);
                if let Err(notice_err) = self
                    .messaging
                    .send_text(chat_id, messages::DELIVERY_FAILED, None)
                    .await
                {
                    warn!("Could not send delivery failure notice: {}", notice_err);
                }
                RequestOutcome::DeliveryFailed {
                    batches_sent: e.batches_sent,
                }
            }
        };

        if let Err(e) = self.messaging.delete_message(chat_id, processing).await {
            warn!("Could not delete processing message {}: {}", processing, e);
        }

        Ok(outcome)
    }

    async fn fetch_record(&self, url: &ProductUrl) -> FetchResult<ProductRecord> {
        let html = self.pages.fetch_page(url.normalized()).await?;
        Ok(self.parser.extract(&html))
    }
}
