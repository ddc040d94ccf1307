// Messaging transport: outbound sends + inbound command stream

pub mod telegram;       // Telegram Bot API over HTTPS
pub mod telegram_types; // wire types for the Bot API
pub mod types;

pub use types::{ChatId, Incoming, TransportError, TransportResult};

#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    // An error means the chat could not be reached (blocked, deleted, network).
    async fn send_message(&self, chat_id: ChatId, text: &str) -> TransportResult<()>;
}

#[async_trait::async_trait]
pub trait UpdateSource: Send {
    // Waits for the next batch of incoming messages; may return an empty batch.
    async fn next_batch(&mut self) -> TransportResult<Vec<Incoming>>;
}
