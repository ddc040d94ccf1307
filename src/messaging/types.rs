use std::fmt;

/// Opaque chat handle of a subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A text message received from a chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incoming {
    pub chat_id: ChatId,
    pub text: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    // URLs are stripped before wrapping; they carry the bot token.
    #[error("HTTP request failed: {0}")]
    Http(reqwest::Error),

    #[error("messaging API error {code:?}: {description}")]
    Api { code: Option<i64>, description: String },

    #[error("malformed messaging API response: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        TransportError::Http(e.without_url())
    }
}

pub type TransportResult<T> = Result<T, TransportError>;
