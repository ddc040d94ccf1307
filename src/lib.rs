//! Telegram bot that pushes periodic price updates for a single asset to
//! every chat that asked for them.

pub mod bot;
pub mod config;
pub mod format;
pub mod market_data;
pub mod messaging;
pub mod subscription;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod testing;
