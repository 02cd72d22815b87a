//! Product delivery: download images, batch them, send them
//!
//! Images are downloaded one by one. Failed downloads are skipped. The
//! product caption rides on the first photo that actually downloaded, so it
//! is never lost to a broken first URL.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::application::messaging::{ChatId, MessagingClient, MessagingError, ParseMode};
use crate::domain::constants::{delivery::MEDIA_GROUP_LIMIT, messages};
use crate::domain::media::{MediaPhoto, into_batches};
use crate::domain::product::ProductRecord;
use crate::domain::services::ImageSource;

/// Why a delivery fell back to text only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextOnlyReason {
    /// The record had no image URLs
    NoImages,
    /// Every image download failed
    DownloadsFailed,
}

/// Result of a completed delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Photos were sent in grouped messages
    MediaSent {
        photos: usize,
        batches: usize,
        failed_downloads: usize,
    },
    /// Only the caption text and an explanatory notice were sent
    TextOnly(TextOnlyReason),
}

/// A send failed part-way through a delivery
#[derive(Error, Debug)]
#[error("Delivery stopped after {batches_sent} batch(es): {source}")]
pub struct DeliveryError {
    /// Grouped messages that went out before the failure
    pub batches_sent: usize,
    #[source]
    pub source: MessagingError,
}

impl DeliveryError {
    fn before_any_batch(source: MessagingError) -> Self {
        Self { batches_sent: 0, source }
    }
}

/// Sends a [`ProductRecord`] to a chat
#[derive(Clone)]
pub struct DeliveryBatcher {
    images: Arc<dyn ImageSource>,
    messaging: Arc<dyn MessagingClient>,
    media_group_limit: usize,
}

impl DeliveryBatcher {
    pub fn new(images: Arc<dyn ImageSource>, messaging: Arc<dyn MessagingClient>) -> Self {
        Self {
            images,
            messaging,
            media_group_limit: MEDIA_GROUP_LIMIT,
        }
    }

    /// Override the batch size (clamped to `1..=10`)
    pub fn with_media_group_limit(mut self, limit: usize) -> Self {
        self.media_group_limit = limit.clamp(1, MEDIA_GROUP_LIMIT);
        self
    }

    pub const fn media_group_limit(&self) -> usize {
        self.media_group_limit
    }

    pub async fn deliver(&self, chat_id: ChatId, record: &ProductRecord) -> Result<DeliveryOutcome, DeliveryError> {
        let caption = record.caption();

        if !record.has_images() {
            info!("No product images found, sending text only");
            self.send_text_only(chat_id, &caption, messages::NO_IMAGES).await?;
            return Ok(DeliveryOutcome::TextOnly(TextOnlyReason::NoImages));
        }

        let (mut photos, failed_downloads) = self.download_all(record.image_urls()).await;
        if photos.is_empty() {
            warn!("All {} image downloads failed", failed_downloads);
            self.send_text_only(chat_id, &caption, messages::DOWNLOAD_FAILED)
                .await?;
            return Ok(DeliveryOutcome::TextOnly(TextOnlyReason::DownloadsFailed));
        }

        photos[0].caption = Some(caption);
        let photo_count = photos.len();
        let batches = into_batches(photos, self.media_group_limit);
        let batch_count = batches.len();

        for (index, batch) in batches.iter().enumerate() {
            debug!("Sending batch {}/{} ({} photos)", index + 1, batch_count, batch.len());
            self.messaging
                .send_media_group(chat_id, batch)
                .await
                .map_err(|source| DeliveryError {
                    batches_sent: index,
                    source,
                })?;
        }

        self.messaging
            .send_text(chat_id, messages::COMPLETED, None)
            .await
            .map_err(|source| DeliveryError {
                batches_sent: batch_count,
                source,
            })?;

        info!(
            "Delivered {} photo(s) in {} batch(es), {} download(s) failed",
            photo_count, batch_count, failed_downloads
        );
        Ok(DeliveryOutcome::MediaSent {
            photos: photo_count,
            batches: batch_count,
            failed_downloads,
        })
    }

    async fn download_all(&self, urls: &[String]) -> (Vec<MediaPhoto>, usize) {
        let mut photos = Vec::with_capacity(urls.len());
        let mut failed = 0;

        for url in urls {
            match self.images.download_image(url).await {
                Ok(data) => photos.push(MediaPhoto::new(data, url.as_str())),
                Err(e) => {
                    warn!("Skipping image {}: {}", url, e);
                    failed += 1;
                }
            }
        }

        (photos, failed)
    }

    async fn send_text_only(&self, chat_id: ChatId, caption: &str, notice: &str) -> Result<(), DeliveryError> {
        self.messaging
            .send_text(chat_id, caption, Some(ParseMode::Markdown))
            .await
            .map_err(DeliveryError::before_any_batch)?;
        self.messaging
            .send_text(chat_id, notice, None)
            .await
            .map_err(DeliveryError::before_any_batch)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::messaging::{MessageId, MessagingResult, Update};
    use crate::domain::services::{FetchError, FetchResult};
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    enum Sent {
        Text(String, Option<ParseMode>),
        Group(Vec<(String, Option<String>)>),
    }

    #[derive(Default)]
    struct RecordingMessenger {
        sent: Mutex<Vec<Sent>>,
        fail_group_number: Option<usize>,
    }

    impl RecordingMessenger {
        fn sent(&self) -> Vec<Sent> {
            self.sent.lock().unwrap().clone()
        }

        fn groups_sent(&self) -> usize {
            self.sent().iter().filter(|s| matches!(s, Sent::Group(_))).count()
        }
    }

    #[async_trait]
    impl MessagingClient for RecordingMessenger {
        async fn receive_updates(&self, _offset: Option<i64>, _timeout: Duration) -> MessagingResult<Vec<Update>> {
            Ok(Vec::new())
        }

        async fn send_text(&self, _chat_id: ChatId, text: &str, parse_mode: Option<ParseMode>) -> MessagingResult<MessageId> {
            self.sent.lock().unwrap().push(Sent::Text(text.to_string(), parse_mode));
            Ok(MessageId(1))
        }

        async fn send_media_group(&self, _chat_id: ChatId, media: &[MediaPhoto]) -> MessagingResult<()> {
            if self.fail_group_number == Some(self.groups_sent()) {
                return Err(MessagingError::Api {
                    method: "sendMediaGroup",
                    description: "Too Many Requests".to_string(),
                });
            }
            let group = media
                .iter()
                .map(|p| (p.source_url.clone(), p.caption.clone()))
                .collect();
            self.sent.lock().unwrap().push(Sent::Group(group));
            Ok(())
        }

        async fn delete_message(&self, _chat_id: ChatId, _message_id: MessageId) -> MessagingResult<()> {
            Ok(())
        }
    }

    struct FakeImages {
        broken: HashSet<String>,
    }

    #[async_trait]
    impl ImageSource for FakeImages {
        async fn download_image(&self, url: &str) -> FetchResult<Vec<u8>> {
            if self.broken.contains(url) {
                Err(FetchError::Status {
                    status: 404,
                    url: url.to_string(),
                })
            } else {
                Ok(url.as_bytes().to_vec())
            }
        }
    }

    fn urls(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("https://cdn/p/{i}.jpg")).collect()
    }

    fn record(images: Vec<String>) -> ProductRecord {
        ProductRecord::new("Shoe", "AED 99", vec!["42".to_string()], images)
    }

    fn batcher(messenger: &Arc<RecordingMessenger>, broken: &[&str]) -> DeliveryBatcher {
        let images = Arc::new(FakeImages {
            broken: broken.iter().map(|s| s.to_string()).collect(),
        });
        DeliveryBatcher::new(images, messenger.clone())
    }

    #[tokio::test]
    async fn test_twelve_images_go_out_as_ten_and_two() {
        let messenger = Arc::new(RecordingMessenger::default());
        let outcome = batcher(&messenger, &[])
            .deliver(ChatId(1), &record(urls(12)))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            DeliveryOutcome::MediaSent {
                photos: 12,
                batches: 2,
                failed_downloads: 0
            }
        );

        let sent = messenger.sent();
        assert_eq!(sent.len(), 3);
        let Sent::Group(first) = &sent[0] else { panic!("expected group") };
        let Sent::Group(second) = &sent[1] else { panic!("expected group") };
        assert_eq!(first.len(), 10);
        assert_eq!(second.len(), 2);
        assert!(first[0].1.as_deref().unwrap().starts_with("*Shoe*"));
        assert!(first.iter().skip(1).chain(second.iter()).all(|(_, c)| c.is_none()));
        assert_eq!(sent[2], Sent::Text(messages::COMPLETED.to_string(), None));
    }

    #[tokio::test]
    async fn test_caption_moves_to_first_downloaded_photo() {
        let messenger = Arc::new(RecordingMessenger::default());
        batcher(&messenger, &["https://cdn/p/1.jpg"])
            .deliver(ChatId(1), &record(urls(3)))
            .await
            .unwrap();

        let Sent::Group(group) = &messenger.sent()[0] else { panic!("expected group") };
        assert_eq!(group.len(), 2);
        assert_eq!(group[0].0, "https://cdn/p/2.jpg");
        assert!(group[0].1.is_some());
    }

    #[tokio::test]
    async fn test_no_images_sends_caption_and_notice() {
        let messenger = Arc::new(RecordingMessenger::default());
        let outcome = batcher(&messenger, &[])
            .deliver(ChatId(1), &record(Vec::new()))
            .await
            .unwrap();

        assert_eq!(outcome, DeliveryOutcome::TextOnly(TextOnlyReason::NoImages));
        let sent = messenger.sent();
        assert_eq!(sent.len(), 2);
        assert!(matches!(&sent[0], Sent::Text(text, Some(ParseMode::Markdown)) if text.starts_with("*Shoe*")));
        assert_eq!(sent[1], Sent::Text(messages::NO_IMAGES.to_string(), None));
    }

    #[tokio::test]
    async fn test_all_downloads_failed() {
        let messenger = Arc::new(RecordingMessenger::default());
        let outcome = batcher(&messenger, &["https://cdn/p/1.jpg", "https://cdn/p/2.jpg"])
            .deliver(ChatId(1), &record(urls(2)))
            .await
            .unwrap();

        assert_eq!(outcome, DeliveryOutcome::TextOnly(TextOnlyReason::DownloadsFailed));
        assert_eq!(messenger.sent()[1], Sent::Text(messages::DOWNLOAD_FAILED.to_string(), None));
    }

    #[tokio::test]
    async fn test_failed_batch_stops_remaining_batches() {
        let messenger = Arc::new(RecordingMessenger {
            fail_group_number: Some(1),
            ..Default::default()
        });
        let err = batcher(&messenger, &[])
            .deliver(ChatId(1), &record(urls(25)))
            .await
            .unwrap_err();

        assert_eq!(err.batches_sent, 1);
        assert_eq!(messenger.groups_sent(), 1);
        assert!(!messenger.sent().contains(&Sent::Text(messages::COMPLETED.to_string(), None)));
    }

    #[tokio::test]
    async fn test_custom_media_group_limit() {
        let messenger = Arc::new(RecordingMessenger::default());
        let outcome = batcher(&messenger, &[])
            .with_media_group_limit(4)
            .deliver(ChatId(1), &record(urls(9)))
            .await
            .unwrap();

        assert!(matches!(outcome, DeliveryOutcome::MediaSent { batches: 3, .. }));
    }
}
