// Telegram Bot API transport: sendMessage + getUpdates long polling

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, instrument};

use super::telegram_types::{
    ApiResponse, BotCommand, GetUpdatesParams, SendMessageParams, SetMyCommandsParams, Update,
};
use super::{ChatId, Incoming, Transport, TransportError, TransportResult, UpdateSource};

pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Seconds the server holds a getUpdates call open when there is nothing new.
const LONG_POLL_SECS: u64 = 30;

#[derive(Clone)]
pub struct TelegramClient {
    client: reqwest::Client,
    base_url: String, // "{api}/bot{token}"
}

impl TelegramClient {
    pub fn new(token: &str, timeout: Duration) -> TransportResult<Self> {
        Self::with_api_url(TELEGRAM_API_URL, token, timeout)
    }

    pub fn with_api_url(api_url: &str, token: &str, timeout: Duration) -> TransportResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
        })
    }

    async fn call<P, R>(&self, method: &str, params: &P, timeout: Option<Duration>) -> TransportResult<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let mut req = self.client.post(format!("{}/{}", self.base_url, method)).json(params);
        if let Some(timeout) = timeout {
            req = req.timeout(timeout);
        }
        let res = req.send().await?;
        let status = res.status();
        let body = res.bytes().await?;
        decode_response(status, &body)
    }

    /// Publish the command list shown in the chat client's command menu.
    pub async fn register_commands(&self, commands: &[(&str, &str)]) -> TransportResult<()> {
        let params = SetMyCommandsParams {
            commands: commands
                .iter()
                .map(|&(command, description)| BotCommand { command, description })
                .collect(),
        };
        let _: bool = self.call("setMyCommands", &params, None).await?;
        info!(count = commands.len(), "Registered bot commands");
        Ok(())
    }

    pub async fn get_updates(&self, offset: i64) -> TransportResult<Vec<Update>> {
        let params = GetUpdatesParams {
            offset,
            timeout: LONG_POLL_SECS,
            allowed_updates: &["message"],
        };
        // The request must outlive the server-side hold.
        let timeout = Duration::from_secs(LONG_POLL_SECS + 10);
        self.call("getUpdates", &params, Some(timeout)).await
    }
}

fn decode_response<R: DeserializeOwned>(status: reqwest::StatusCode, body: &[u8]) -> TransportResult<R> {
    let envelope: ApiResponse<R> = match serde_json::from_slice(body) {
        Ok(envelope) => envelope,
        Err(_) if !status.is_success() => {
            return Err(TransportError::Api {
                code: Some(i64::from(status.as_u16())),
                description: status.canonical_reason().unwrap_or("unknown status").to_string(),
            })
        }
        Err(e) => return Err(e.into()),
    };

    match envelope {
        ApiResponse { ok: true, result: Some(result), .. } => Ok(result),
        ApiResponse { description, error_code, .. } => Err(TransportError::Api {
            code: error_code.or(Some(i64::from(status.as_u16()))),
            description: description.unwrap_or_else(|| "request not ok".to_string()),
        }),
    }
}

#[async_trait::async_trait]
impl Transport for TelegramClient {
    #[instrument(skip(self, text), fields(chat_id = %chat_id))]
    async fn send_message(&self, chat_id: ChatId, text: &str) -> TransportResult<()> {
        let params = SendMessageParams { chat_id: chat_id.0, text };
        let _: serde_json::Value = self.call("sendMessage", &params, None).await?;
        debug!("Message delivered");
        Ok(())
    }
}

/// Long-polling update stream; tracks the confirmation offset.
pub struct TelegramUpdates {
    client: TelegramClient,
    offset: i64,
}

impl TelegramUpdates {
    pub fn new(client: TelegramClient) -> Self {
        Self { client, offset: 0 }
    }

    // Advance past everything received and keep only text messages.
    fn absorb(&mut self, updates: Vec<Update>) -> Vec<Incoming> {
        let mut incoming = Vec::with_capacity(updates.len());
        for update in updates {
            self.offset = self.offset.max(update.update_id + 1);
            if let Some(message) = update.message {
                if let Some(text) = message.text {
                    incoming.push(Incoming { chat_id: ChatId(message.chat.id), text });
                }
            }
        }
        incoming
    }
}

#[async_trait::async_trait]
impl UpdateSource for TelegramUpdates {
    async fn next_batch(&mut self) -> TransportResult<Vec<Incoming>> {
        let updates = self.client.get_updates(self.offset).await?;
        Ok(self.absorb(updates))
    }
}
