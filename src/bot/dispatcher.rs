// Dispatcher routes chat commands to the registry and owns the update tasks.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, info, info_span, instrument, warn, Instrument};

use super::commands::Command;
use crate::format::MessageFormatter;
use crate::market_data::PriceProvider;
use crate::messaging::{ChatId, Incoming, Transport, UpdateSource};
use crate::subscription::{Registry, Scheduler, StopReason};

/// Pause before polling again after the update source failed.
const RECEIVE_RETRY_DELAY: Duration = Duration::from_secs(5);

pub struct Dispatcher {
    registry: Arc<Registry>,
    scheduler: Scheduler,
    tasks: JoinSet<StopReason>,
    lookups: JoinSet<()>, // in-flight one-shot /price replies
}

impl Dispatcher {
    pub fn new(
        registry: Arc<Registry>,
        provider: Arc<dyn PriceProvider>,
        transport: Arc<dyn Transport>,
        formatter: Arc<MessageFormatter>,
        interval: Duration,
    ) -> Self {
        let scheduler = Scheduler::new(Arc::clone(&registry), provider, transport, formatter, interval);
        Self { registry, scheduler, tasks: JoinSet::new(), lookups: JoinSet::new() }
    }

    /// Receive loop: pull batches from `source` until `shutdown` resolves,
    /// then stop every subscriber and wait for their tasks.
    pub async fn run<S, F>(mut self, mut source: S, shutdown: F)
    where
        S: UpdateSource,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!("Dispatcher listening for commands");

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                batch = source.next_batch() => match batch {
                    Ok(batch) => {
                        for incoming in batch {
                            self.handle(incoming).await;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "Receiving updates failed; retrying");
                        tokio::select! {
                            _ = &mut shutdown => break,
                            _ = tokio::time::sleep(RECEIVE_RETRY_DELAY) => {}
                        }
                    }
                },
            }
            self.reap();
        }

        self.shutdown().await;
    }

    pub async fn handle(&mut self, incoming: Incoming) {
        let Some(command) = Command::parse(&incoming.text) else {
            debug!(chat_id = %incoming.chat_id, "Ignoring non-command message");
            return;
        };

        match command {
            Command::Start => self.start(incoming.chat_id).await,
            Command::Stop => self.stop(incoming.chat_id).await,
            Command::Price => self.price(incoming.chat_id),
            Command::Help => self.reply(incoming.chat_id, &self.scheduler.formatter.help()).await,
        }
    }

    #[instrument(skip(self))]
    async fn start(&mut self, chat_id: ChatId) {
        self.reply(chat_id, &self.scheduler.formatter.welcome()).await;

        match self.registry.activate(chat_id) {
            Some(lease) => {
                info!("Started price updates");
                self.tasks.spawn(self.scheduler.clone().run(lease));
            }
            None => debug!("Already receiving updates"),
        }
    }

    #[instrument(skip(self))]
    async fn stop(&mut self, chat_id: ChatId) {
        if self.registry.deactivate(chat_id) {
            info!("Stopped price updates");
            self.reply(chat_id, &self.scheduler.formatter.stopped()).await;
        } else {
            self.reply(chat_id, &self.scheduler.formatter.not_subscribed()).await;
        }
    }

    // The fetch runs on its own task so a slow provider never holds up
    // commands from other chats.
    fn price(&mut self, chat_id: ChatId) {
        let provider = Arc::clone(&self.scheduler.provider);
        let transport = Arc::clone(&self.scheduler.transport);
        let formatter = Arc::clone(&self.scheduler.formatter);

        self.lookups.spawn(
            async move {
                let text = match provider.fetch().await {
                    Ok(obs) => formatter.current(&obs),
                    Err(e) => {
                        warn!(error = %e, "One-shot price fetch failed");
                        metrics::counter!("solpulse_fetch_failures_total").increment(1);
                        formatter.fetch_failed()
                    }
                };
                send_reply(transport.as_ref(), chat_id, &text).await;
            }
            .instrument(info_span!("price", %chat_id)),
        );
    }

    async fn reply(&self, chat_id: ChatId, text: &str) {
        send_reply(self.scheduler.transport.as_ref(), chat_id, text).await;
    }

    // Collect tasks that already finished so the set does not grow forever.
    fn reap(&mut self) {
        while let Some(done) = self.tasks.try_join_next() {
            match done {
                Ok(reason) => debug!(?reason, "Update task finished"),
                Err(e) => warn!(error = %e, "Update task panicked or was aborted"),
            }
        }
        while let Some(done) = self.lookups.try_join_next() {
            if let Err(e) = done {
                warn!(error = %e, "Price lookup panicked or was aborted");
            }
        }
    }

    /// Number of update tasks not yet collected.
    pub fn running_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub async fn shutdown(mut self) {
        let stopped = self.registry.deactivate_all();
        info!(subscribers = stopped, "Shutting down update tasks");
        while let Some(done) = self.tasks.join_next().await {
            if let Err(e) = done {
                warn!(error = %e, "Update task did not finish cleanly");
            }
        }
        // pending lookups are bounded by the HTTP timeout; let them answer
        while let Some(done) = self.lookups.join_next().await {
            if let Err(e) = done {
                warn!(error = %e, "Price lookup did not finish cleanly");
            }
        }
    }
}

// Command replies are best effort; a failed reply does not change state.
async fn send_reply(transport: &dyn Transport, chat_id: ChatId, text: &str) {
    if let Err(e) = transport.send_message(chat_id, text).await {
        warn!(%chat_id, error = %e, "Failed to send reply");
    }
}
