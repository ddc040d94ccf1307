// Test doubles for the price provider and the messaging transport.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::market_data::{Observation, PriceProvider, ProviderError, ProviderResult};
use crate::messaging::{ChatId, Incoming, Transport, TransportError, TransportResult, UpdateSource};

pub fn observation(price: f64) -> Observation {
    Observation {
        price,
        market_cap: 70_000_000_000.0,
        volume_24h: 2_000_000_000.0,
        change_24h: 1.5,
        last_updated_at: 1_718_000_000,
    }
}

pub fn unavailable() -> ProviderError {
    ProviderError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE)
}

/// Replays a script of results, then repeats the fallback (or fails).
#[derive(Default)]
pub struct ScriptedProvider {
    script: Mutex<VecDeque<ProviderResult<Observation>>>,
    fallback: Option<Observation>,
    latency: Duration,
    fetches: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(script: Vec<ProviderResult<Observation>>) -> Self {
        Self { script: Mutex::new(script.into()), ..Self::default() }
    }

    pub fn prices(prices: &[f64]) -> Self {
        Self::new(prices.iter().map(|p| Ok(observation(*p))).collect())
    }

    /// Same price on every fetch.
    pub fn steady(price: f64) -> Self {
        Self { fallback: Some(observation(price)), ..Self::default() }
    }

    /// Every fetch takes `latency` before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl PriceProvider for ScriptedProvider {
    async fn fetch(&self) -> ProviderResult<Observation> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let next = self.script.lock().pop_front();
        next.unwrap_or_else(|| self.fallback.clone().ok_or_else(unavailable))
    }
}

/// Records every delivery and reports it on a channel.
pub struct RecordingTransport {
    sent: Mutex<Vec<(ChatId, String)>>,
    attempts: AtomicUsize,
    blocked: Mutex<HashSet<ChatId>>,
    notify: mpsc::UnboundedSender<(ChatId, String)>,
}

impl RecordingTransport {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(ChatId, String)>) {
        let (notify, rx) = mpsc::unbounded_channel();
        let transport = Self {
            sent: Mutex::new(Vec::new()),
            attempts: AtomicUsize::new(0),
            blocked: Mutex::new(HashSet::new()),
            notify,
        };
        (transport, rx)
    }

    pub fn block(&self, chat_id: ChatId) {
        self.blocked.lock().insert(chat_id);
    }

    pub fn unblock(&self, chat_id: ChatId) {
        self.blocked.lock().remove(&chat_id);
    }

    pub fn sent(&self) -> Vec<(ChatId, String)> {
        self.sent.lock().clone()
    }

    pub fn sent_to(&self, chat_id: ChatId) -> Vec<String> {
        self.sent.lock().iter().filter(|(id, _)| *id == chat_id).map(|(_, t)| t.clone()).collect()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Transport for RecordingTransport {
    async fn send_message(&self, chat_id: ChatId, text: &str) -> TransportResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.blocked.lock().contains(&chat_id) {
            return Err(TransportError::Api {
                code: Some(403),
                description: "Forbidden: bot was blocked by the user".to_string(),
            });
        }
        self.sent.lock().push((chat_id, text.to_string()));
        let _ = self.notify.send((chat_id, text.to_string()));
        Ok(())
    }
}

/// Update source fed from a channel; ends the stream by pending forever.
pub struct ChannelSource(pub mpsc::UnboundedReceiver<Incoming>);

#[async_trait::async_trait]
impl UpdateSource for ChannelSource {
    async fn next_batch(&mut self) -> TransportResult<Vec<Incoming>> {
        match self.0.recv().await {
            Some(first) => {
                let mut batch = vec![first];
                while let Ok(more) = self.0.try_recv() {
                    batch.push(more);
                }
                Ok(batch)
            }
            None => std::future::pending().await,
        }
    }
}
