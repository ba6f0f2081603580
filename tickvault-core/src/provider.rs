//! History provider trait and its error surface.
//!
//! The trait abstracts over remote historical-data sources so the store
//! can be exercised against mocks; concrete transports live outside this
//! crate. Providers don't know about the cache — the store sits above.

use crate::calendar::{CalendarRange, TimeWindow};
use crate::domain::{Candle, Resolution, Tick};
use thiserror::Error;

/// Errors a provider may surface.
///
/// [`ProviderError::Empty`] is a sentinel, not a failure: the request was
/// valid but no data exists for it. The tick pipeline absorbs it by
/// persisting an empty day document; everything else aborts the batch.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no data for an otherwise valid request")]
    Empty,

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("rate limited (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    pub fn is_empty_response(&self) -> bool {
        matches!(self, ProviderError::Empty)
    }
}

/// A source of historical candles and ticks.
pub trait HistoryProvider: Send + Sync {
    /// Candles for `symbol` at `resolution` over the inclusive day range.
    fn candles(
        &self,
        symbol: &str,
        resolution: Resolution,
        range: &CalendarRange,
    ) -> Result<Vec<Candle>, ProviderError>;

    /// Ticks for `symbol` within the timestamp window. `quotes`/`trades`
    /// select which record kinds the provider should return; at least one
    /// is always set by the store.
    fn ticks(
        &self,
        symbol: &str,
        window: &TimeWindow,
        quotes: bool,
        trades: bool,
    ) -> Result<Vec<Tick>, ProviderError>;
}
