use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use solpulse::bot::{Command, Dispatcher};
use solpulse::config::Settings;
use solpulse::format::MessageFormatter;
use solpulse::market_data::adapters::coingecko::CoinGeckoAdapter;
use solpulse::messaging::telegram::{TelegramClient, TelegramUpdates};
use solpulse::subscription::Registry;
use solpulse::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok(); // load .env

    telemetry::init_tracing(telemetry::DEFAULT_LOG_FILTER);
    let settings = Settings::from_env().context("loading settings")?;
    telemetry::init_metrics(settings.metrics_port).context("starting metrics exporter")?;
    info!(?settings, "Starting {} Price Signal Bot", settings.asset_symbol);

    let provider = Arc::new(CoinGeckoAdapter::from_settings(&settings)?);
    let telegram = TelegramClient::new(&settings.telegram_token, settings.http_timeout())?;

    let commands: Vec<(&str, &str)> = Command::ALL.iter().map(|c| (c.name(), c.description())).collect();
    if let Err(e) = telegram.register_commands(&commands).await {
        warn!(error = %e, "Could not register bot commands");
    }

    let formatter = Arc::new(MessageFormatter::new(
        &settings.asset_symbol,
        &settings.vs_currency,
        settings.update_interval(),
    ));
    let dispatcher = Dispatcher::new(
        Arc::new(Registry::new()),
        provider,
        Arc::new(telegram.clone()),
        formatter,
        settings.update_interval(),
    );

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Could not listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
        info!("Ctrl-C received");
    };

    dispatcher.run(TelegramUpdates::new(telegram), shutdown).await;
    info!("Shutdown complete");
    Ok(())
}
