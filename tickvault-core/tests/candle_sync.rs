//! Candle synchronization scenarios against a recording mock provider.

use chrono::NaiveDate;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tickvault_core::{
    CalendarRange, Candle, CandleUpdateRequest, HistoryProvider, JsonStore, ProviderError,
    Resolution, StoreError, Tick, TimeWindow, UpdateOutcome,
};

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

fn temp_store_dir() -> PathBuf {
    let id = TEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!("tickvault_candles_{}_{id}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Provider that serves one candle per requested day and records every
/// call. `generation` is stamped into the volume so tests can tell which
/// fetch produced the persisted document.
struct CandleFeed {
    calls: Mutex<Vec<(String, Resolution, CalendarRange)>>,
    generation: AtomicU64,
    fail: bool,
}

impl CandleFeed {
    fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            generation: AtomicU64::new(0),
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn last_range(&self) -> CalendarRange {
        self.calls.lock().unwrap().last().unwrap().2
    }
}

impl HistoryProvider for CandleFeed {
    fn candles(
        &self,
        symbol: &str,
        resolution: Resolution,
        range: &CalendarRange,
    ) -> Result<Vec<Candle>, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((symbol.to_string(), resolution, *range));
        if self.fail {
            return Err(ProviderError::Transport("connection reset".into()));
        }

        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(range
            .days()
            .map(|date| Candle {
                open: 100.0,
                high: 102.0,
                low: 99.0,
                close: 101.0,
                adj_close: 101.0,
                volume: generation as i64,
                open_interest: 0,
                datetime: date.and_hms_opt(0, 0, 0).unwrap().and_utc(),
            })
            .collect())
    }

    fn ticks(
        &self,
        _symbol: &str,
        _window: &TimeWindow,
        _quotes: bool,
        _trades: bool,
    ) -> Result<Vec<Tick>, ProviderError> {
        Err(ProviderError::Other("candle feed has no tick data".into()))
    }
}

fn store_with(provider: Arc<CandleFeed>) -> (JsonStore, PathBuf) {
    let dir = temp_store_dir();
    (JsonStore::new(&dir, provider), dir)
}

fn daily_request(from: NaiveDate, to: NaiveDate) -> CandleUpdateRequest {
    CandleUpdateRequest {
        symbol: "SPY".into(),
        resolution: Resolution::Day,
        from,
        to,
        update_weekends: true,
    }
}

#[test]
fn first_sync_fetches_exactly_the_requested_range() {
    let feed = Arc::new(CandleFeed::new());
    let (store, dir) = store_with(feed.clone());

    let request = daily_request(d(2010, 1, 1), d(2010, 1, 31));
    let outcome = store.update_candles(&request).unwrap();

    assert_eq!(outcome, UpdateOutcome::Updated { fetched_days: 31 });
    assert_eq!(feed.call_count(), 1);
    assert_eq!(feed.last_range(), CalendarRange::new(d(2010, 1, 1), d(2010, 1, 31)));
    assert!(dir.join("candles/day/SPY.json").exists());
    assert!(dir.join("candles/day/.meta/SPY.json").exists());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn covered_request_short_circuits_with_zero_provider_calls() {
    let feed = Arc::new(CandleFeed::new());
    let (store, dir) = store_with(feed.clone());

    store
        .update_candles(&daily_request(d(2010, 1, 1), d(2010, 1, 31)))
        .unwrap();
    let outcome = store
        .update_candles(&daily_request(d(2010, 1, 10), d(2010, 1, 20)))
        .unwrap();

    assert!(outcome.is_already_covered());
    assert_eq!(feed.call_count(), 1);

    // A request equal to the stored span is also fully covered.
    let outcome = store
        .update_candles(&daily_request(d(2010, 1, 1), d(2010, 1, 31)))
        .unwrap();
    assert!(outcome.is_already_covered());
    assert_eq!(feed.call_count(), 1);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn extension_refetches_the_union_and_replaces_the_document() {
    let feed = Arc::new(CandleFeed::new());
    let (store, dir) = store_with(feed.clone());

    store
        .update_candles(&daily_request(d(2010, 1, 1), d(2010, 1, 31)))
        .unwrap();
    store
        .update_candles(&daily_request(d(2010, 1, 15), d(2010, 3, 1)))
        .unwrap();

    assert_eq!(feed.call_count(), 2);
    assert_eq!(feed.last_range(), CalendarRange::new(d(2010, 1, 1), d(2010, 3, 1)));

    // The document is the second fetch wholesale: every candle carries
    // generation 2 and there are no duplicated January days.
    let union = CalendarRange::new(d(2010, 1, 1), d(2010, 3, 1));
    let stored = store
        .stored_candles("SPY", Resolution::Day, &union)
        .unwrap();
    assert_eq!(stored.len(), union.day_count());
    assert!(stored.iter().all(|c| c.volume == 2));

    assert_eq!(
        store.candle_coverage("SPY", Resolution::Day).unwrap(),
        Some(union)
    );

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn backward_extension_refetches_down_to_the_requested_start() {
    let feed = Arc::new(CandleFeed::new());
    let (store, dir) = store_with(feed.clone());

    store
        .update_candles(&daily_request(d(2010, 1, 1), d(2010, 1, 31)))
        .unwrap();
    store
        .update_candles(&daily_request(d(2009, 11, 1), d(2009, 12, 15)))
        .unwrap();

    assert_eq!(feed.last_range(), CalendarRange::new(d(2009, 11, 1), d(2010, 1, 31)));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn provider_failure_aborts_without_touching_metadata() {
    let feed = Arc::new(CandleFeed::new());
    let (store, dir) = store_with(feed);
    store
        .update_candles(&daily_request(d(2010, 1, 1), d(2010, 1, 31)))
        .unwrap();
    let meta_path = dir.join("candles/day/.meta/SPY.json");
    let meta_before = std::fs::read(&meta_path).unwrap();

    let failing = Arc::new(CandleFeed::failing());
    let store = JsonStore::new(&dir, failing);
    let err = store
        .update_candles(&daily_request(d(2010, 1, 1), d(2010, 6, 1)))
        .unwrap_err();

    assert!(matches!(err, StoreError::Provider { .. }));
    assert_eq!(std::fs::read(&meta_path).unwrap(), meta_before);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn each_resolution_owns_its_documents() {
    let feed = Arc::new(CandleFeed::new());
    let (store, dir) = store_with(feed);

    for resolution in [Resolution::Day, Resolution::Week, Resolution::Minutes(5)] {
        let request = CandleUpdateRequest {
            resolution,
            ..daily_request(d(2010, 1, 1), d(2010, 1, 10))
        };
        store.update_candles(&request).unwrap();
    }

    assert!(dir.join("candles/day/SPY.json").exists());
    assert!(dir.join("candles/week/SPY.json").exists());
    assert!(dir.join("candles/5min/SPY.json").exists());
    assert!(dir.join("candles/5min/.meta/SPY.json").exists());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn stored_candles_intersect_with_the_requested_range() {
    let feed = Arc::new(CandleFeed::new());
    let (store, dir) = store_with(feed);

    store
        .update_candles(&daily_request(d(2010, 1, 1), d(2010, 1, 31)))
        .unwrap();

    let mid = store
        .stored_candles(
            "SPY",
            Resolution::Day,
            &CalendarRange::new(d(2010, 1, 10), d(2010, 1, 12)),
        )
        .unwrap();
    assert_eq!(mid.len(), 3);

    let outside = store
        .stored_candles(
            "SPY",
            Resolution::Day,
            &CalendarRange::new(d(2011, 1, 1), d(2011, 1, 31)),
        )
        .unwrap();
    assert!(outside.is_empty());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn stored_candles_with_nothing_persisted_is_empty() {
    let feed = Arc::new(CandleFeed::new());
    let (store, dir) = store_with(feed.clone());

    let stored = store
        .stored_candles(
            "SPY",
            Resolution::Day,
            &CalendarRange::new(d(2010, 1, 1), d(2010, 1, 31)),
        )
        .unwrap();
    assert!(stored.is_empty());
    assert_eq!(feed.call_count(), 0);

    let _ = std::fs::remove_dir_all(&dir);
}
