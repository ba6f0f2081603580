//! The JSON store — incremental synchronization and read-only queries.
//!
//! [`JsonStore`] sits between a [`HistoryProvider`] and a directory of
//! flat JSON documents. Update operations diff the requested window
//! against local coverage and fetch only what is missing; query
//! operations never touch the network.
//!
//! Concurrent update calls for the *same* symbol are not safe against
//! each other — serializing per symbol is the caller's contract. The
//! store keeps no cross-call state, so distinct symbols are fine.

mod docs;
mod layout;
mod pipeline;

pub use layout::TickKind;

use crate::calendar::{CalendarRange, TimeOfDay};
use crate::domain::{sort_oldest_first, Candle, Resolution, Tick};
use crate::error::StoreError;
use crate::meta::SymbolMeta;
use crate::provider::HistoryProvider;
use chrono::NaiveDate;
use log::{debug, info};
use std::path::PathBuf;
use std::sync::Arc;

const DEFAULT_WORKERS: usize = 4;

/// What an update operation accomplished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The requested window was already fully covered locally; no
    /// provider call was made and nothing was written.
    AlreadyCovered,
    /// Data was fetched and persisted.
    Updated { fetched_days: usize },
}

impl UpdateOutcome {
    pub fn is_already_covered(&self) -> bool {
        matches!(self, UpdateOutcome::AlreadyCovered)
    }

    pub fn fetched_days(&self) -> usize {
        match self {
            UpdateOutcome::AlreadyCovered => 0,
            UpdateOutcome::Updated { fetched_days } => *fetched_days,
        }
    }
}

/// Parameters for a candle synchronization.
#[derive(Debug, Clone)]
pub struct CandleUpdateRequest {
    pub symbol: String,
    pub resolution: Resolution,
    pub from: NaiveDate,
    pub to: NaiveDate,
    /// True when Saturday/Sunday should be treated as expected trading
    /// days and fetched like any other date.
    pub update_weekends: bool,
}

impl CandleUpdateRequest {
    fn validate(&self) -> Result<CalendarRange, StoreError> {
        if self.symbol.trim().is_empty() {
            return Err(StoreError::InvalidRequest("symbol not specified".into()));
        }
        if self.from > self.to {
            return Err(StoreError::InvalidRequest(
                "from date must not be after to date".into(),
            ));
        }
        if self.resolution == Resolution::Tick {
            return Err(StoreError::InvalidRequest(
                "candle resolution must be D, W, or intraday minutes 1-60".into(),
            ));
        }
        Ok(CalendarRange::new(self.from, self.to))
    }
}

/// Parameters for a tick synchronization.
#[derive(Debug, Clone)]
pub struct TickUpdateRequest {
    pub symbol: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
    /// Intraday session bounds; tick fetches for each date are limited to
    /// `[session_start, session_end]` on that date.
    pub session_start: TimeOfDay,
    pub session_end: TimeOfDay,
    pub quotes: bool,
    pub trades: bool,
    pub update_weekends: bool,
}

impl TickUpdateRequest {
    /// Request for both quotes and trades over the full trading day.
    pub fn new(symbol: &str, from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            symbol: symbol.to_string(),
            from,
            to,
            session_start: TimeOfDay::MIDNIGHT,
            session_end: TimeOfDay::END_OF_DAY,
            quotes: true,
            trades: true,
            update_weekends: false,
        }
    }

    fn validate(&self) -> Result<(CalendarRange, TickKind), StoreError> {
        if self.symbol.trim().is_empty() {
            return Err(StoreError::InvalidRequest("symbol not specified".into()));
        }
        if self.from > self.to {
            return Err(StoreError::InvalidRequest(
                "from date must not be after to date".into(),
            ));
        }
        let Some(kind) = TickKind::from_flags(self.quotes, self.trades) else {
            return Err(StoreError::InvalidRequest(
                "at least one of quotes or trades must be selected".into(),
            ));
        };
        if self.session_start > self.session_end {
            return Err(StoreError::InvalidRequest(
                "session start must not be after session end".into(),
            ));
        }
        Ok((CalendarRange::new(self.from, self.to), kind))
    }
}

/// Incremental JSON store for historical candles and ticks.
pub struct JsonStore {
    root: PathBuf,
    provider: Arc<dyn HistoryProvider>,
    workers: usize,
}

impl JsonStore {
    pub fn new(root: impl Into<PathBuf>, provider: Arc<dyn HistoryProvider>) -> Self {
        Self {
            root: root.into(),
            provider,
            workers: DEFAULT_WORKERS,
        }
    }

    /// Size of the tick fetch worker pool (clamped to at least 1).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    /// Synchronize locally stored candles with the provider.
    ///
    /// Candles form one contiguous stored span per symbol/resolution, so
    /// coverage is judged by the span's bounds alone. Any extension
    /// re-fetches the union of the requested range and the known span and
    /// replaces the persisted document wholesale; the metadata document
    /// is rebuilt from the fetched span afterwards. On failure nothing is
    /// reconciled and the error carries symbol and range context.
    pub fn update_candles(&self, request: &CandleUpdateRequest) -> Result<UpdateOutcome, StoreError> {
        let range = request.validate()?;

        let meta_path = layout::candle_meta_path(&self.root, request.resolution, &request.symbol);
        let mut meta = docs::read_json::<SymbolMeta>(&meta_path)?.unwrap_or_else(|| {
            SymbolMeta::new(&request.symbol, request.resolution, request.update_weekends)
        });

        let Some(download) = meta.download_range(&range) else {
            debug!(
                "{}: {} candles already cover {range}",
                request.symbol, request.resolution
            );
            return Ok(UpdateOutcome::AlreadyCovered);
        };

        info!(
            "{}: fetching {} candles over {download}",
            request.symbol, request.resolution
        );
        let mut candles = self
            .provider
            .candles(&request.symbol, request.resolution, &download)
            .map_err(|err| StoreError::provider(&request.symbol, download, err))?;
        sort_oldest_first(&mut candles);

        let doc_path = layout::candle_doc_path(&self.root, request.resolution, &request.symbol);
        docs::write_json(&doc_path, &candles)?;

        // The span model tracks covered days, not trading days, so every
        // calendar day of the fetched range is listed.
        meta.include_weekends = request.update_weekends;
        meta.relist_span(&download);
        docs::write_json(&meta_path, &meta)?;

        Ok(UpdateOutcome::Updated {
            fetched_days: download.day_count(),
        })
    }

    /// Synchronize locally stored ticks with the provider.
    ///
    /// Each missing date in the requested window becomes one unit of work
    /// for the fetch pool. After all units succeed, `listed_dates` is
    /// reconciled from a rescan of the symbol's directory — disk truth,
    /// not the in-memory success count — so files surviving an earlier
    /// partial run are absorbed here. On failure the metadata document is
    /// left untouched and already-written day documents stay on disk.
    pub fn update_ticks(&self, request: &TickUpdateRequest) -> Result<UpdateOutcome, StoreError> {
        let (range, kind) = request.validate()?;

        let meta_path = layout::tick_meta_path(&self.root, kind, &request.symbol);
        let mut meta = docs::read_json::<SymbolMeta>(&meta_path)?.unwrap_or_else(|| {
            SymbolMeta::new(&request.symbol, Resolution::Tick, request.update_weekends)
        });
        meta.include_weekends = request.update_weekends;

        let missing = meta.missing_dates(&range);
        if missing.is_empty() {
            debug!("{}: {} ticks already cover {range}", request.symbol, kind.dir_name());
            return Ok(UpdateOutcome::AlreadyCovered);
        }

        info!(
            "{}: fetching {} ticks for {} missing dates in {range}",
            request.symbol,
            kind.dir_name(),
            missing.len()
        );

        let symbol_dir = layout::tick_symbol_dir(&self.root, kind, &request.symbol);
        let plan = pipeline::FetchPlan {
            symbol: &request.symbol,
            dates: &missing,
            quotes: kind.wants_quotes(),
            trades: kind.wants_trades(),
            session_start: request.session_start,
            session_end: request.session_end,
            symbol_dir: &symbol_dir,
        };
        let fetched = pipeline::fetch_days(self.provider.as_ref(), &plan, self.workers)?;

        meta.listed_dates = layout::scan_day_documents(&symbol_dir)?;
        docs::write_json(&meta_path, &meta)?;

        Ok(UpdateOutcome::Updated {
            fetched_days: fetched,
        })
    }

    /// Locally persisted candles intersected with `range`, ascending by
    /// datetime. A missing document yields an empty vector; the network
    /// is never touched.
    pub fn stored_candles(
        &self,
        symbol: &str,
        resolution: Resolution,
        range: &CalendarRange,
    ) -> Result<Vec<Candle>, StoreError> {
        let path = layout::candle_doc_path(&self.root, resolution, symbol);
        let candles: Vec<Candle> = docs::read_json(&path)?.unwrap_or_default();

        let window = range.time_window();
        Ok(candles
            .into_iter()
            .filter(|c| window.contains(c.datetime))
            .collect())
    }

    /// Locally persisted ticks of the selected kind within `range`,
    /// ascending by datetime. Days without a document are skipped; the
    /// network is never touched.
    pub fn stored_ticks(
        &self,
        symbol: &str,
        range: &CalendarRange,
        quotes: bool,
        trades: bool,
    ) -> Result<Vec<Tick>, StoreError> {
        let Some(kind) = TickKind::from_flags(quotes, trades) else {
            return Err(StoreError::InvalidRequest(
                "at least one of quotes or trades must be selected".into(),
            ));
        };

        let mut out = Vec::new();
        for date in range.days() {
            let path = layout::tick_day_path(&self.root, kind, symbol, date);
            if let Some(mut ticks) = docs::read_json::<Vec<Tick>>(&path)? {
                out.append(&mut ticks);
            }
        }
        Ok(out)
    }

    /// Span implied by the candle metadata document, if any.
    pub fn candle_coverage(
        &self,
        symbol: &str,
        resolution: Resolution,
    ) -> Result<Option<CalendarRange>, StoreError> {
        let meta_path = layout::candle_meta_path(&self.root, resolution, symbol);
        let meta: Option<SymbolMeta> = docs::read_json(&meta_path)?;
        Ok(meta.and_then(|m| m.covered_span()))
    }

    /// Span implied by the tick metadata document, if any.
    pub fn tick_coverage(
        &self,
        symbol: &str,
        kind: TickKind,
    ) -> Result<Option<CalendarRange>, StoreError> {
        let meta_path = layout::tick_meta_path(&self.root, kind, symbol);
        let meta: Option<SymbolMeta> = docs::read_json(&meta_path)?;
        Ok(meta.and_then(|m| m.covered_span()))
    }
}
