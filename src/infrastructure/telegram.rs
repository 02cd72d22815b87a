//! Telegram Bot API client
//!
//! Implements [`MessagingClient`] over plain HTTPS calls. JSON bodies for
//! everything except photo uploads, which go out as multipart forms with one
//! `attach://photoN` part per image.

#![allow(clippy::uninlined_format_args)]

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

use crate::application::messaging::{
    ChatId, IncomingMessage, MessageId, MessagingClient, MessagingError, MessagingResult, ParseMode, Update,
};
use crate::domain::media::MediaPhoto;

/// Telegram transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot API base URL
    pub api_base_url: String,
    /// Long-poll timeout in seconds
    pub poll_timeout_secs: u64,
    /// Skip updates queued while the bot was offline
    pub drop_pending_updates: bool,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.telegram.org".to_string(),
            poll_timeout_secs: 30,
            drop_pending_updates: true,
        }
    }
}

/// Extra time on top of the long-poll timeout before the HTTP call gives up
const POLL_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TgUpdate {
    update_id: i64,
    message: Option<TgMessage>,
}

#[derive(Debug, Deserialize)]
struct TgMessage {
    message_id: i64,
    chat: TgChat,
    text: Option<String>,
    from: Option<TgUser>,
}

#[derive(Debug, Deserialize)]
struct TgChat {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct TgUser {
    first_name: String,
}

#[derive(Debug, Serialize)]
struct InputMediaPhoto {
    #[serde(rename = "type")]
    kind: &'static str,
    media: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
}

impl From<TgMessage> for IncomingMessage {
    fn from(message: TgMessage) -> Self {
        Self {
            chat_id: ChatId(message.chat.id),
            message_id: MessageId(message.message_id),
            text: message.text,
            sender_first_name: message.from.map(|user| user.first_name),
        }
    }
}

/// Telegram Bot API client
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    api_base_url: String,
    token: String,
}

impl TelegramClient {
    pub fn new(token: impl Into<String>, config: &TelegramConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create Telegram HTTP client: {}", e))?;

        Ok(Self {
            client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base_url, self.token, method)
    }

    async fn call<T: DeserializeOwned>(&self, method: &'static str, request: RequestBuilder) -> MessagingResult<T> {
        debug!("Telegram call: {}", method);
        let response = request
            .send()
            .await
            .map_err(|source| MessagingError::Request { method, source })?;

        // Telegram answers errors with a JSON body as well, so decode regardless of status.
        let body: ApiResponse<T> = response.json().await.map_err(|e| MessagingError::Decode {
            method,
            message: e.to_string(),
        })?;

        if !body.ok {
            return Err(MessagingError::Api {
                method,
                description: body.description.unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        body.result.ok_or_else(|| MessagingError::Decode {
            method,
            message: "missing result".to_string(),
        })
    }

    async fn call_json<T: DeserializeOwned>(&self, method: &'static str, payload: &serde_json::Value) -> MessagingResult<T> {
        let request = self.client.post(self.method_url(method)).json(payload);
        self.call(method, request).await
    }

    async fn send_photo(&self, chat_id: ChatId, photo: &MediaPhoto) -> MessagingResult<()> {
        let mut form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part("photo", photo_part(photo, 0));
        if let Some(caption) = &photo.caption {
            form = form
                .text("caption", caption.clone())
                .text("parse_mode", ParseMode::Markdown.as_str());
        }

        let request = self.client.post(self.method_url("sendPhoto")).multipart(form);
        let _: TgMessage = self.call("sendPhoto", request).await?;
        Ok(())
    }
}

fn photo_part(photo: &MediaPhoto, index: usize) -> Part {
    Part::bytes(photo.data.clone()).file_name(format!("photo{}.jpg", index))
}

#[async_trait]
impl MessagingClient for TelegramClient {
    async fn receive_updates(&self, offset: Option<i64>, timeout: Duration) -> MessagingResult<Vec<Update>> {
        let mut payload = json!({
            "timeout": timeout.as_secs(),
            "allowed_updates": ["message"],
        });
        if let Some(offset) = offset {
            payload["offset"] = json!(offset);
        }

        let request = self
            .client
            .post(self.method_url("getUpdates"))
            .timeout(timeout + POLL_GRACE)
            .json(&payload);
        let updates: Vec<TgUpdate> = self.call("getUpdates", request).await?;

        Ok(updates
            .into_iter()
            .map(|update| Update {
                update_id: update.update_id,
                message: update.message.map(IncomingMessage::from),
            })
            .collect())
    }

    async fn send_text(&self, chat_id: ChatId, text: &str, parse_mode: Option<ParseMode>) -> MessagingResult<MessageId> {
        let mut payload = json!({
            "chat_id": chat_id.0,
            "text": text,
        });
        if let Some(mode) = parse_mode {
            payload["parse_mode"] = json!(mode.as_str());
        }

        let message: TgMessage = self.call_json("sendMessage", &payload).await?;
        Ok(MessageId(message.message_id))
    }

    async fn send_media_group(&self, chat_id: ChatId, media: &[MediaPhoto]) -> MessagingResult<()> {
        match media {
            [] => Ok(()),
            // Media groups need at least two items; a lone photo goes out on its own.
            [photo] => self.send_photo(chat_id, photo).await,
            photos => {
                let descriptors: Vec<InputMediaPhoto> = photos
                    .iter()
                    .enumerate()
                    .map(|(i, photo)| InputMediaPhoto {
                        kind: "photo",
                        media: format!("attach://photo{}", i),
                        caption: photo.caption.clone(),
                        parse_mode: photo.caption.as_ref().map(|_| ParseMode::Markdown.as_str()),
                    })
                    .collect();
                let media_json = serde_json::to_string(&descriptors).map_err(|e| MessagingError::Decode {
                    method: "sendMediaGroup",
                    message: e.to_string(),
                })?;

                let form = photos.iter().enumerate().fold(
                    Form::new()
                        .text("chat_id", chat_id.to_string())
                        .text("media", media_json),
                    |form, (i, photo)| form.part(format!("photo{}", i), photo_part(photo, i)),
                );

                let request = self.client.post(self.method_url("sendMediaGroup")).multipart(form);
                let sent: Vec<TgMessage> = self.call("sendMediaGroup", request).await?;
                if sent.len() != photos.len() {
                    warn!("Media group of {} photos produced {} messages", photos.len(), sent.len());
                }
                Ok(())
            }
        }
    }

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> MessagingResult<()> {
        let payload = json!({
            "chat_id": chat_id.0,
            "message_id": message_id.0,
        });
        let _: bool = self.call_json("deleteMessage", &payload).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    async fn client_for(server: &MockServer) -> TelegramClient {
        let config = TelegramConfig {
            api_base_url: server.uri(),
            ..Default::default()
        };
        TelegramClient::new("TEST:TOKEN", &config).unwrap()
    }

    fn message_json(message_id: i64) -> serde_json::Value {
        json!({ "message_id": message_id, "chat": { "id": 42 }, "date": 0 })
    }

    fn body_contains(needle: &'static str) -> impl Fn(&Request) -> bool + Send + Sync + 'static {
        move |request: &Request| String::from_utf8_lossy(&request.body).contains(needle)
    }

    #[tokio::test]
    async fn test_send_text_with_markdown() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/botTEST:TOKEN/sendMessage"))
            .and(body_partial_json(json!({ "chat_id": 42, "text": "*hi*", "parse_mode": "Markdown" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": message_json(7) })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let id = client.send_text(ChatId(42), "*hi*", Some(ParseMode::Markdown)).await.unwrap();
        assert_eq!(id, MessageId(7));
    }

    #[tokio::test]
    async fn test_api_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/botTEST:TOKEN/deleteMessage"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "ok": false,
                "description": "Bad Request: message to delete not found"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.delete_message(ChatId(42), MessageId(1)).await.unwrap_err();
        match err {
            MessagingError::Api { method, description } => {
                assert_eq!(method, "deleteMessage");
                assert!(description.contains("not found"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_receive_updates_maps_messages() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/botTEST:TOKEN/getUpdates"))
            .and(body_partial_json(json!({ "offset": 5, "timeout": 0 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": [
                    { "update_id": 5, "message": {
                        "message_id": 11, "date": 0, "chat": { "id": 42 },
                        "from": { "id": 1, "is_bot": false, "first_name": "Sara" },
                        "text": "hello"
                    }},
                    { "update_id": 6 }
                ]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let updates = client.receive_updates(Some(5), Duration::ZERO).await.unwrap();
        assert_eq!(updates.len(), 2);
        let message = updates[0].message.as_ref().unwrap();
        assert_eq!(message.chat_id, ChatId(42));
        assert_eq!(message.text.as_deref(), Some("hello"));
        assert_eq!(message.sender_first_name.as_deref(), Some("Sara"));
        assert!(updates[1].message.is_none());
    }

    #[tokio::test]
    async fn test_media_group_upload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/botTEST:TOKEN/sendMediaGroup"))
            .and(body_contains("attach://photo1"))
            .and(body_contains("\"caption\":\"*Shoe*\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": [message_json(1), message_json(2)]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let photos = vec![
            MediaPhoto::new(vec![1, 2, 3], "https://cdn/p/1.jpg").with_caption("*Shoe*"),
            MediaPhoto::new(vec![4, 5, 6], "https://cdn/p/2.jpg"),
        ];
        client.send_media_group(ChatId(42), &photos).await.unwrap();
    }

    #[tokio::test]
    async fn test_single_photo_goes_through_send_photo() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/botTEST:TOKEN/sendPhoto"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": message_json(3) })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let photos = vec![MediaPhoto::new(vec![1], "https://cdn/p/1.jpg")];
        client.send_media_group(ChatId(42), &photos).await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_media_group_is_a_no_op() {
        let server = MockServer::start().await;
        let client = client_for(&server).await;
        client.send_media_group(ChatId(42), &[]).await.unwrap();
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }
}
