//! TickVault Core — incremental JSON store for historical market data.
//!
//! This crate contains the gap-detection and synchronization engine:
//! - Calendar ranges with optional weekend exclusion
//! - Per-symbol coverage metadata and missing-date/range computation
//! - A union-range candle synchronization path
//! - A concurrent per-day tick fetch pipeline with cooperative
//!   cancellation and disk-truth metadata reconciliation
//! - Flat per-day/per-symbol JSON document persistence
//!
//! The remote data source is abstracted behind [`HistoryProvider`];
//! concrete transports live outside this crate.

pub mod calendar;
pub mod domain;
pub mod error;
pub mod meta;
pub mod provider;
pub mod store;

pub use calendar::{CalendarRange, TimeOfDay, TimeWindow};
pub use domain::{sort_newest_first, sort_oldest_first, Candle, Resolution, Tick, Timestamped};
pub use error::StoreError;
pub use meta::SymbolMeta;
pub use provider::{HistoryProvider, ProviderError};
pub use store::{CandleUpdateRequest, JsonStore, TickKind, TickUpdateRequest, UpdateOutcome};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything that crosses the fetch pool's
    /// thread boundary is Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<Candle>();
        require_sync::<Candle>();
        require_send::<Tick>();
        require_sync::<Tick>();
        require_send::<CalendarRange>();
        require_sync::<CalendarRange>();
        require_send::<TimeOfDay>();
        require_sync::<TimeOfDay>();
        require_send::<TimeWindow>();
        require_sync::<TimeWindow>();
        require_send::<SymbolMeta>();
        require_sync::<SymbolMeta>();
        require_send::<StoreError>();
        require_sync::<StoreError>();
        require_send::<ProviderError>();
        require_sync::<ProviderError>();
        require_send::<JsonStore>();
        require_sync::<JsonStore>();
    }
}
