//! Candle — one OHLC bar at a given resolution.

use super::Timestamped;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLC bar for a single symbol at a single point in time.
///
/// `adj_close` is the split/dividend-adjusted close as delivered by the
/// provider; the store persists it verbatim and never re-adjusts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: i64,
    pub open_interest: i64,
    pub datetime: DateTime<Utc>,
}

impl Candle {
    /// Basic OHLC sanity check: high is the top of the bar, low the
    /// bottom, prices positive.
    pub fn is_sane(&self) -> bool {
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
    }
}

impl Timestamped for Candle {
    fn timestamp(&self) -> DateTime<Utc> {
        self.datetime
    }
}
