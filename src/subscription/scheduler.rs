// Per-subscriber update loop: fetch -> diff -> send -> sleep.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, instrument, warn};

use crate::format::MessageFormatter;
use crate::market_data::{Observation, PriceProvider};
use crate::messaging::Transport;
use crate::subscription::registry::{Lease, Registry};

/// Why an update task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Deactivated,
    SendFailed,
}

#[derive(Clone)]
pub struct Scheduler {
    pub registry: Arc<Registry>,
    pub provider: Arc<dyn PriceProvider>,
    pub transport: Arc<dyn Transport>,
    pub formatter: Arc<MessageFormatter>,
    pub interval: Duration,
}

impl Scheduler {
    pub fn new(
        registry: Arc<Registry>,
        provider: Arc<dyn PriceProvider>,
        transport: Arc<dyn Transport>,
        formatter: Arc<MessageFormatter>,
        interval: Duration,
    ) -> Self {
        Self { registry, provider, transport, formatter, interval }
    }

    /// Runs until the lease is revoked or a delivery fails.
    #[instrument(skip_all, fields(chat_id = %lease.chat_id))]
    pub async fn run(self, lease: Lease) -> StopReason {
        info!("Update task started");
        // last observation actually delivered
        let mut previous: Option<Observation> = None;

        loop {
            if !self.registry.holds(&lease) {
                info!("Update task stopped");
                return StopReason::Deactivated;
            }

            match self.provider.fetch().await {
                Ok(current) => {
                    // a stop may have landed while the fetch was in flight
                    if !self.registry.holds(&lease) {
                        info!("Update task stopped");
                        return StopReason::Deactivated;
                    }

                    let text = match &previous {
                        Some(prev) => self.formatter.update(prev, &current),
                        None => self.formatter.initial(&current),
                    };

                    if let Err(e) = self.transport.send_message(lease.chat_id, &text).await {
                        error!(error = %e, "Failed to deliver update; deactivating subscriber");
                        metrics::counter!("solpulse_send_failures_total").increment(1);
                        self.registry.release(&lease);
                        return StopReason::SendFailed;
                    }

                    metrics::counter!("solpulse_updates_sent_total").increment(1);
                    debug!(price = current.price, "Update delivered");
                    previous = Some(current);
                }
                Err(e) => {
                    // skip this cycle; the previous observation stays the baseline
                    warn!(error = %e, "Price fetch failed; skipping cycle");
                    metrics::counter!("solpulse_fetch_failures_total").increment(1);
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = lease.stopped() => debug!("Woken by stop signal"),
            }
        }
    }
}
