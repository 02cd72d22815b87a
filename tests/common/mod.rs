//! Shared fakes for the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use namshi_product_bot::application::{
    ChatId, MessageId, MessagingClient, MessagingError, MessagingResult, ParseMode, Update,
};
use namshi_product_bot::domain::{FetchError, FetchResult, ImageSource, MediaPhoto, PageSource};

pub const PRODUCT_URL: &str = "https://www.namshi.com/uae-en/buy-puma-running-shoe/Z1234/p/";

/// Everything the bot pushed to the chat, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Text {
        chat_id: ChatId,
        text: String,
        parse_mode: Option<ParseMode>,
    },
    Group {
        chat_id: ChatId,
        photos: Vec<(String, Option<String>)>,
    },
    Deleted {
        chat_id: ChatId,
        message_id: MessageId,
    },
}

#[derive(Default)]
pub struct RecordingMessenger {
    pub sent: Mutex<Vec<Sent>>,
    pub next_id: AtomicUsize,
    pub polls: Mutex<VecDeque<MessagingResult<Vec<Update>>>>,
    /// Zero-based index of the grouped message that should fail
    pub fail_group: Option<usize>,
    pub fail_delete: bool,
}

impl RecordingMessenger {
    pub fn with_polls(polls: Vec<MessagingResult<Vec<Update>>>) -> Self {
        Self {
            polls: Mutex::new(polls.into()),
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Text { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn groups(&self) -> Vec<Vec<(String, Option<String>)>> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Group { photos, .. } => Some(photos),
                _ => None,
            })
            .collect()
    }

    pub fn deleted(&self) -> Vec<MessageId> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Deleted { message_id, .. } => Some(message_id),
                _ => None,
            })
            .collect()
    }

    fn transport_error(method: &'static str) -> MessagingError {
        MessagingError::Api {
            method,
            description: "Bad Gateway".to_string(),
        }
    }
}

#[async_trait]
impl MessagingClient for RecordingMessenger {
    /// Queued results first; then behaves like an idle long poll
    async fn receive_updates(&self, _offset: Option<i64>, timeout: Duration) -> MessagingResult<Vec<Update>> {
        let queued = self.polls.lock().unwrap().pop_front();
        match queued {
            Some(result) => result,
            None => {
                tokio::time::sleep(timeout).await;
                Ok(Vec::new())
            }
        }
    }

    async fn send_text(&self, chat_id: ChatId, text: &str, parse_mode: Option<ParseMode>) -> MessagingResult<MessageId> {
        self.sent.lock().unwrap().push(Sent::Text {
            chat_id,
            text: text.to_string(),
            parse_mode,
        });
        Ok(MessageId(100 + self.next_id.fetch_add(1, Ordering::SeqCst) as i64))
    }

    async fn send_media_group(&self, chat_id: ChatId, media: &[MediaPhoto]) -> MessagingResult<()> {
        if self.fail_group == Some(self.groups().len()) {
            return Err(Self::transport_error("sendMediaGroup"));
        }
        self.sent.lock().unwrap().push(Sent::Group {
            chat_id,
            photos: media
                .iter()
                .map(|p| (p.source_url.clone(), p.caption.clone()))
                .collect(),
        });
        Ok(())
    }

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> MessagingResult<()> {
        if self.fail_delete {
            return Err(Self::transport_error("deleteMessage"));
        }
        self.sent.lock().unwrap().push(Sent::Deleted { chat_id, message_id });
        Ok(())
    }
}

/// Serves fixed HTML per URL and counts requests
#[derive(Default)]
pub struct FakePages {
    pages: HashMap<String, String>,
    pub requested: Mutex<Vec<String>>,
}

impl FakePages {
    pub fn with_page(url: &str, html: impl Into<String>) -> Self {
        let mut pages = HashMap::new();
        pages.insert(url.to_string(), html.into());
        Self {
            pages,
            ..Default::default()
        }
    }

    pub fn request_count(&self) -> usize {
        self.requested.lock().unwrap().len()
    }
}

#[async_trait]
impl PageSource for FakePages {
    async fn fetch_page(&self, url: &str) -> FetchResult<String> {
        self.requested.lock().unwrap().push(url.to_string());
        self.pages.get(url).cloned().ok_or_else(|| FetchError::Status {
            status: 503,
            url: url.to_string(),
        })
    }
}

/// Returns the URL bytes as the image, except for the broken ones
#[derive(Default)]
pub struct FakeImages {
    pub broken: HashSet<String>,
    pub requested: Mutex<Vec<String>>,
}

impl FakeImages {
    pub fn broken(urls: &[&str]) -> Self {
        Self {
            broken: urls.iter().map(|u| u.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn request_count(&self) -> usize {
        self.requested.lock().unwrap().len()
    }
}

#[async_trait]
impl ImageSource for FakeImages {
    async fn download_image(&self, url: &str) -> FetchResult<Vec<u8>> {
        self.requested.lock().unwrap().push(url.to_string());
        if self.broken.contains(url) {
            return Err(FetchError::Status {
                status: 404,
                url: url.to_string(),
            });
        }
        Ok(url.as_bytes().to_vec())
    }
}

/// Product page with `image_count` gallery images served from `image_base`
pub fn product_page(image_base: &str, image_count: usize) -> String {
    let template = include_str!("../fixtures/namshi_product_page.html");
    let gallery: String = (1..=image_count)
        .map(|i| {
            format!(
                r#"<div class="ImageGallery_imageContainer__jmn93"><img src="{image_base}/p/pzsku/Z1234/{i}.jpg?width=400" alt="PUMA shoe"></div>"#
            )
        })
        .collect();
    template.replace("{{GALLERY}}", &gallery)
}

/// Gallery URL after the width upgrade
pub fn resolved_image(image_base: &str, index: usize) -> String {
    format!("{image_base}/p/pzsku/Z1234/{index}.jpg?width=800")
}
