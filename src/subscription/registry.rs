//! Process-wide subscriber table.
//!
//! Every activation hands out a [`Lease`] tagged with a fresh epoch. A task
//! keeps running only while its lease is current, so a stop followed by a
//! quick start can never leave two tasks polling for the same chat.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::debug;

use crate::messaging::ChatId;

struct Entry {
    active: bool,
    epoch: u64,
    stop: Arc<Notify>,
}

#[derive(Default)]
struct Inner {
    subscribers: HashMap<ChatId, Entry>,
    next_epoch: u64,
}

/// Right to run the update task for one chat.
#[derive(Debug)]
pub struct Lease {
    pub chat_id: ChatId,
    epoch: u64,
    stop: Arc<Notify>,
}

impl Lease {
    /// Resolves once the subscriber has been stopped.
    pub async fn stopped(&self) {
        self.stop.notified().await
    }
}

#[derive(Default)]
pub struct Registry {
    inner: Mutex<Inner>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the chat active. Returns a lease only when the chat was absent or
    /// inactive, i.e. when a new update task has to be spawned.
    pub fn activate(&self, chat_id: ChatId) -> Option<Lease> {
        let mut inner = self.inner.lock();
        if inner.subscribers.get(&chat_id).is_some_and(|e| e.active) {
            return None;
        }

        inner.next_epoch += 1;
        let epoch = inner.next_epoch;
        let stop = Arc::new(Notify::new());
        inner.subscribers.insert(chat_id, Entry { active: true, epoch, stop: Arc::clone(&stop) });
        publish_active(&inner);
        debug!(%chat_id, epoch, "Subscriber activated");
        Some(Lease { chat_id, epoch, stop })
    }

    /// Mark the chat inactive and wake its task. Returns whether it was active.
    pub fn deactivate(&self, chat_id: ChatId) -> bool {
        let mut inner = self.inner.lock();
        let was_active = match inner.subscribers.get_mut(&chat_id) {
            Some(entry) if entry.active => {
                entry.active = false;
                entry.stop.notify_one();
                true
            }
            _ => false,
        };
        if was_active {
            publish_active(&inner);
            debug!(%chat_id, "Subscriber deactivated");
        }
        was_active
    }

    /// Unknown chats read as inactive.
    pub fn is_active(&self, chat_id: ChatId) -> bool {
        self.inner.lock().subscribers.get(&chat_id).is_some_and(|e| e.active)
    }

    /// Whether `lease` still belongs to the current activation of its chat.
    pub fn holds(&self, lease: &Lease) -> bool {
        self.inner
            .lock()
            .subscribers
            .get(&lease.chat_id)
            .is_some_and(|e| e.active && e.epoch == lease.epoch)
    }

    /// Deactivate on behalf of a task, but only if its lease is still current.
    pub fn release(&self, lease: &Lease) -> bool {
        let mut inner = self.inner.lock();
        let released = match inner.subscribers.get_mut(&lease.chat_id) {
            Some(entry) if entry.active && entry.epoch == lease.epoch => {
                entry.active = false;
                true
            }
            _ => false,
        };
        if released {
            publish_active(&inner);
        }
        released
    }

    /// Stop everyone; used on shutdown.
    pub fn deactivate_all(&self) -> usize {
        let mut inner = self.inner.lock();
        let mut stopped = 0;
        for entry in inner.subscribers.values_mut().filter(|e| e.active) {
            entry.active = false;
            entry.stop.notify_one();
            stopped += 1;
        }
        publish_active(&inner);
        stopped
    }

    pub fn active_count(&self) -> usize {
        count_active(&self.inner.lock())
    }
}

fn count_active(inner: &Inner) -> usize {
    inner.subscribers.values().filter(|e| e.active).count()
}

fn publish_active(inner: &Inner) {
    metrics::gauge!("solpulse_active_subscribers").set(count_active(inner) as f64);
}
