// Change between two consecutive observations of the same subscriber.

use crate::market_data::types::Observation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Unchanged,
}

impl Direction {
    pub fn indicator(self) -> &'static str {
        match self {
            Direction::Up => "🟢 ↗️",
            Direction::Down => "🔴 ↘️",
            Direction::Unchanged => "⚪ →",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Delta {
    pub absolute: f64,
    pub percent: f64,
    pub direction: Direction,
}

impl Delta {
    pub fn between(previous: f64, current: f64) -> Self {
        let absolute = current - previous;
        // A zero baseline has no meaningful relative change.
        let percent = if previous != 0.0 { absolute / previous * 100.0 } else { 0.0 };
        let direction = if absolute > 0.0 {
            Direction::Up
        } else if absolute < 0.0 {
            Direction::Down
        } else {
            Direction::Unchanged
        };
        Self { absolute, percent, direction }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservationDelta {
    pub price: Delta,
    pub market_cap: Delta,
    pub volume: Delta,
}

impl ObservationDelta {
    pub fn between(previous: &Observation, current: &Observation) -> Self {
        Self {
            price: Delta::between(previous.price, current.price),
            market_cap: Delta::between(previous.market_cap, current.market_cap),
            volume: Delta::between(previous.volume_24h, current.volume_24h),
        }
    }
}
