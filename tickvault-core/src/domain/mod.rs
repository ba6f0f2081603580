//! Domain types — candles, ticks, resolutions, ordering helpers.

mod candle;
mod resolution;
mod tick;

pub use candle::Candle;
pub use resolution::{ParseResolutionError, Resolution};
pub use tick::Tick;

use chrono::{DateTime, Utc};

/// Anything carrying a market timestamp. The seam that lets candle and
/// tick arrays share ordering code.
pub trait Timestamped {
    fn timestamp(&self) -> DateTime<Utc>;
}

/// Canonical storage order: ascending by timestamp. Stable, so records
/// sharing a timestamp keep their relative order.
pub fn sort_oldest_first<T: Timestamped>(items: &mut [T]) {
    items.sort_by_key(|item| item.timestamp());
}

/// Display order: descending by timestamp. Never the storage order.
pub fn sort_newest_first<T: Timestamped>(items: &mut [T]) {
    items.sort_by_key(|item| std::cmp::Reverse(item.timestamp()));
}
