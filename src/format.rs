//! Chat message text.

use std::time::Duration;

use num_format::{Locale, ToFormattedString};

use crate::bot::commands::Command;
use crate::market_data::delta::{Delta, Direction, ObservationDelta};
use crate::market_data::Observation;

pub struct MessageFormatter {
    pub symbol: String,   // e.g. "SOL"
    pub currency: String, // e.g. "USD"
    pub interval: Duration,
}

impl MessageFormatter {
    pub fn new(symbol: &str, currency: &str, interval: Duration) -> Self {
        Self {
            symbol: symbol.to_string(),
            currency: currency.to_uppercase(),
            interval,
        }
    }

    pub fn welcome(&self) -> String {
        format!(
            "🚀 Welcome to the {sym} Price Signal Bot! 🚀\n\n\
             I'll send you {sym} price updates {every}.\n\n\
             {commands}",
            sym = self.symbol,
            every = describe_interval(self.interval),
            commands = self.command_list(),
        )
    }

    pub fn help(&self) -> String {
        self.command_list()
    }

    fn command_list(&self) -> String {
        let mut out = String::from("Commands:");
        for command in Command::ALL {
            out.push_str(&format!("\n/{} - {}", command.name(), command.description()));
        }
        out
    }

    pub fn stopped(&self) -> String {
        format!("❌ {} price updates stopped. Use /start to resume.", self.symbol)
    }

    pub fn not_subscribed(&self) -> String {
        "You're not currently receiving updates.".to_string()
    }

    pub fn fetch_failed(&self) -> String {
        format!(
            "⚠️ Sorry, I couldn't fetch the {} data at the moment. Please try again later.",
            self.symbol
        )
    }

    /// First message of an update session; no deltas yet.
    pub fn initial(&self, obs: &Observation) -> String {
        format!("💰 {} Price: {}", self.symbol, self.snapshot_body(obs))
    }

    /// Reply to a one-shot price request.
    pub fn current(&self, obs: &Observation) -> String {
        format!("💰 Current {} Price: {}", self.symbol, self.snapshot_body(obs))
    }

    fn snapshot_body(&self, obs: &Observation) -> String {
        format!(
            "{price}\n\
             📊 Market Cap: {cap}\n\
             📈 24h Volume: {vol}\n\
             📉 24h Change: {change}\n\
             🕒 Last Updated: {updated}",
            price = self.money(obs.price),
            cap = self.money(obs.market_cap),
            vol = self.money(obs.volume_24h),
            change = change_24h(obs.change_24h),
            updated = last_updated(obs),
        )
    }

    /// Periodic update relative to the previously delivered observation.
    pub fn update(&self, previous: &Observation, current: &Observation) -> String {
        let delta = ObservationDelta::between(previous, current);
        format!(
            "{p_ind} {sym} Price: {price}\n\
             {p_change} since last update\n\n\
             {c_ind} Market Cap: {cap}\n\
             {c_change} since last update\n\n\
             📈 24h Volume: {vol}\n\
             {v_ind} {v_change} since last update\n\n\
             📉 24h Change: {change}\n\
             🕒 Last Updated: {updated}",
            sym = self.symbol,
            p_ind = delta.price.direction.indicator(),
            price = self.money(current.price),
            p_change = change_text(&delta.price),
            c_ind = delta.market_cap.direction.indicator(),
            cap = self.money(current.market_cap),
            c_change = change_text(&delta.market_cap),
            vol = self.money(current.volume_24h),
            v_ind = delta.volume.direction.indicator(),
            v_change = change_text(&delta.volume),
            change = change_24h(current.change_24h),
            updated = last_updated(current),
        )
    }

    fn money(&self, value: f64) -> String {
        format!("${} {}", grouped(value), self.currency)
    }
}

// 1234567.891 -> "1,234,567.89"
fn grouped(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}{}.{:02}", sign, (cents / 100).to_formatted_string(&Locale::en), cents % 100)
}

// "+$1.50 (+1.00%)", "-$5.00 (-5.00%)" or "No change"
fn change_text(delta: &Delta) -> String {
    match delta.direction {
        Direction::Up => format!("+${} (+{:.2}%)", grouped(delta.absolute), delta.percent),
        Direction::Down => format!("-${} ({:.2}%)", grouped(delta.absolute.abs()), delta.percent),
        Direction::Unchanged => "No change".to_string(),
    }
}

fn change_24h(change: f64) -> String {
    if change > 0.0 {
        format!("🟢 +{:.2}%", change)
    } else if change < 0.0 {
        format!("🔴 {:.2}%", change)
    } else {
        format!("⚪ {:.2}%", change)
    }
}

fn last_updated(obs: &Observation) -> String {
    match obs.last_updated() {
        Some(ts) => ts.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => "unknown".to_string(),
    }
}

fn describe_interval(interval: Duration) -> String {
    let secs = interval.as_secs();
    match secs {
        60 => "every minute".to_string(),
        3600 => "every hour".to_string(),
        s if s % 3600 == 0 => format!("every {} hours", s / 3600),
        s if s % 60 == 0 => format!("every {} minutes", s / 60),
        1 => "every second".to_string(),
        s => format!("every {} seconds", s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::observation;

    fn formatter() -> MessageFormatter {
        MessageFormatter::new("SOL", "usd", Duration::from_secs(60))
    }

    #[test]
    fn test_grouped() {
        assert_eq!(grouped(0.0), "0.00");
        assert_eq!(grouped(150.0), "150.00");
        assert_eq!(grouped(1234567.891), "1,234,567.89");
        assert_eq!(grouped(-2500.5), "-2,500.50");
        assert_eq!(grouped(-0.001), "0.00");
    }

    #[test]
    fn test_initial_message() {
        let text = formatter().initial(&observation(150.0));
        assert!(text.starts_with("💰 SOL Price: $150.00 USD"));
        assert!(text.contains("Price: $150.00"));
        assert!(!text.contains("since last update"));
    }

    #[test]
    fn test_update_up() {
        let text = formatter().update(&observation(150.0), &observation(151.5));
        assert!(text.starts_with("🟢 ↗️ SOL Price: $151.50 USD"));
        assert!(text.contains("+$1.50 (+1.00%) since last update"));
    }

    #[test]
    fn test_update_down() {
        let text = formatter().update(&observation(100.0), &observation(95.0));
        assert!(text.starts_with("🔴 ↘️ SOL Price: $95.00 USD"));
        assert!(text.contains("-$5.00 (-5.00%) since last update"));
    }

    #[test]
    fn test_update_unchanged() {
        let text = formatter().update(&observation(100.0), &observation(100.0));
        assert!(text.starts_with("⚪ → SOL Price: $100.00 USD"));
        assert!(text.contains("No change since last update"));
    }

    #[test]
    fn test_update_zero_prior_volume() {
        let mut prev = observation(100.0);
        prev.volume_24h = 0.0;
        let mut curr = observation(100.0);
        curr.volume_24h = 50.0;
        let text = formatter().update(&prev, &curr);
        assert!(text.contains("🟢 ↗️ +$50.00 (+0.00%) since last update"));
    }

    #[test]
    fn test_market_cap_grouping_and_timestamp() {
        let mut obs = observation(150.0);
        obs.market_cap = 71_234_567_890.12;
        obs.last_updated_at = 1_718_000_000;
        let text = formatter().current(&obs);
        assert!(text.starts_with("💰 Current SOL Price: $150.00 USD"));
        assert!(text.contains("📊 Market Cap: $71,234,567,890.12 USD"));
        assert!(text.contains("🕒 Last Updated: 2024-06-10 06:13:20 UTC"));
    }

    #[test]
    fn test_change_24h_indicator() {
        assert_eq!(change_24h(1.234), "🟢 +1.23%");
        assert_eq!(change_24h(-0.5), "🔴 -0.50%");
        assert_eq!(change_24h(0.0), "⚪ 0.00%");
    }

    #[test]
    fn test_welcome_lists_commands_and_interval() {
        let text = formatter().welcome();
        assert!(text.contains("every minute"));
        assert!(text.contains("/start - "));
        assert!(text.contains("/stop - "));
        assert!(text.contains("/price - "));
    }

    #[test]
    fn test_describe_interval() {
        assert_eq!(describe_interval(Duration::from_secs(300)), "every 5 minutes");
        assert_eq!(describe_interval(Duration::from_secs(45)), "every 45 seconds");
        assert_eq!(describe_interval(Duration::from_secs(7200)), "every 2 hours");
    }
}
