//! Telegram Bot API adapter.
//!
//! Outbound notices and replies go through `sendMessage`. Inbound messages are
//! fetched with `getUpdates` long polling; the offset advances past every
//! update seen so that each one is delivered once.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::domain::{BridgeAdapter, BridgeError, RelayChatId, RelayInbound};

const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Maximum length of a Telegram text message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Extra time the HTTP client waits on top of the long-poll timeout.
const REQUEST_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub token: String,
    /// Destination of outbound notices. Without it only replies are sent.
    pub chat_id: Option<String>,
    pub poll_timeout: Duration,
    pub api_base: String,
}

impl TelegramConfig {
    pub fn new(token: impl Into<String>, chat_id: Option<String>, poll_timeout: Duration) -> Self {
        Self {
            token: token.into(),
            chat_id,
            poll_timeout,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

pub struct TelegramBridge {
    client: reqwest::Client,
    config: TelegramConfig,
    /// Next `getUpdates` offset
    offset: Mutex<Option<i64>>,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: String,
}

#[derive(Debug, Serialize)]
struct GetUpdatesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    timeout: u64,
    allowed_updates: [&'static str; 1],
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<UpdateMessage>,
}

#[derive(Debug, Deserialize)]
struct UpdateMessage {
    chat: UpdateChat,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdateChat {
    id: i64,
}

impl TelegramBridge {
    pub fn new(config: TelegramConfig) -> Result<Self, BridgeError> {
        let client = reqwest::Client::builder()
            .timeout(config.poll_timeout + REQUEST_GRACE)
            .build()
            .map_err(|e| BridgeError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            config,
            offset: Mutex::new(None),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.token,
            method
        )
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, BridgeError>
    where
        B: Serialize + ?Sized,
        T: for<'de> Deserialize<'de>,
    {
        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            // reqwest errors carry the URL, which embeds the token
            .map_err(|e| BridgeError::Transport(e.without_url().to_string()))?;

        let body: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| BridgeError::Transport(e.without_url().to_string()))?;

        unwrap_response(method, body)
    }

    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), BridgeError> {
        let request = SendMessageRequest {
            chat_id,
            text: truncate_text(text),
        };
        let _: serde_json::Value = self.call("sendMessage", &request).await?;
        Ok(())
    }
}

#[async_trait]
impl BridgeAdapter for TelegramBridge {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn send_outbound(&self, text: &str) -> Result<(), BridgeError> {
        let chat_id = self
            .config
            .chat_id
            .as_deref()
            .ok_or(BridgeError::NoDestination)?;
        self.send_text(chat_id, text).await
    }

    async fn reply(&self, chat: &RelayChatId, text: &str) -> Result<(), BridgeError> {
        self.send_text(chat.as_str(), text).await
    }

    async fn poll_inbound(&self) -> Result<Vec<RelayInbound>, BridgeError> {
        let mut offset = self.offset.lock().await;
        let request = GetUpdatesRequest {
            offset: *offset,
            timeout: self.config.poll_timeout.as_secs(),
            allowed_updates: ["message"],
        };
        let updates: Vec<Update> = self.call("getUpdates", &request).await?;

        let (inbound, next_offset) = collect_inbound(updates);
        if next_offset.is_some() {
            *offset = next_offset;
        }
        Ok(inbound)
    }
}

fn unwrap_response<T>(method: &str, response: ApiResponse<T>) -> Result<T, BridgeError> {
    if !response.ok {
        let description = response
            .description
            .unwrap_or_else(|| "no description".to_string());
        return Err(BridgeError::Rejected(format!("{}: {}", method, description)));
    }
    response
        .result
        .ok_or_else(|| BridgeError::Rejected(format!("{}: missing result", method)))
}

/// Text messages from a batch of updates, and the offset that acknowledges them.
fn collect_inbound(updates: Vec<Update>) -> (Vec<RelayInbound>, Option<i64>) {
    let next_offset = updates.iter().map(|u| u.update_id + 1).max();
    let inbound = updates
        .into_iter()
        .filter_map(|update| {
            let message = update.message?;
            let text = message.text?;
            Some(RelayInbound {
                chat: RelayChatId::new(message.chat.id.to_string()),
                text,
            })
        })
        .collect();
    (inbound, next_offset)
}

fn truncate_text(text: &str) -> String {
    text.chars().take(MAX_MESSAGE_CHARS).collect()
}
