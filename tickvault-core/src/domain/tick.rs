//! Tick — one quote and/or trade record.

use super::Timestamped;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single tick. One record may carry a quote update, a trade update, or
/// both; `has_quote`/`has_trade` discriminate which halves are populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub has_quote: bool,
    pub has_trade: bool,
    pub is_opening: bool,
    pub is_closing: bool,

    pub last_price: f64,
    pub last_size: i64,
    pub last_exch: String,
    pub datetime: DateTime<Utc>,

    pub bid_exch: String,
    pub ask_exch: String,
    pub bid_price: f64,
    pub ask_price: f64,
    pub bid_size: i64,
    pub ask_size: i64,

    pub cond_quote: String,
    pub cond1: String,
    pub cond2: String,
    pub cond3: String,
    pub cond4: String,
}

impl Tick {
    /// Bid/ask spread; meaningful only when `has_quote` is set.
    pub fn spread(&self) -> f64 {
        self.ask_price - self.bid_price
    }
}

impl Timestamped for Tick {
    fn timestamp(&self) -> DateTime<Utc> {
        self.datetime
    }
}
