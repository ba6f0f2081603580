//! Bounded worker pool for per-day tick fetches.
//!
//! One operation, one pool: a producer feeds missing dates into a small
//! bounded channel, W workers each claim a date, fetch it from the
//! provider and persist the day document, and the orchestrating thread
//! aggregates per-unit reports with a blocking receive — it burns no CPU
//! while the pool is busy.
//!
//! Cancellation is cooperative. The first failed unit flips an
//! `AtomicBool`; workers check it before and after every claim, so no new
//! work starts, while a provider call already in flight simply runs to
//! completion. Day documents written before the failure stay on disk —
//! the next successful run's directory rescan absorbs them.

use crate::calendar::{CalendarRange, TimeOfDay, TimeWindow};
use crate::domain::{sort_oldest_first, Tick};
use crate::error::StoreError;
use crate::provider::{HistoryProvider, ProviderError};
use chrono::NaiveDate;
use crossbeam_channel::{bounded, Receiver, Sender};
use log::debug;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use super::{docs, layout};

/// Keeps the producer one step ahead of the pool without buffering the
/// whole date list.
const UNIT_QUEUE_DEPTH: usize = 2;

/// Everything one tick fetch operation needs. Built once per call;
/// nothing here is shared across calls.
pub(crate) struct FetchPlan<'a> {
    pub symbol: &'a str,
    pub dates: &'a [NaiveDate],
    pub quotes: bool,
    pub trades: bool,
    pub session_start: TimeOfDay,
    pub session_end: TimeOfDay,
    pub symbol_dir: &'a Path,
}

/// Fetch and persist one document per date in `plan.dates`. Returns the
/// number of completed units — on success always `plan.dates.len()`.
///
/// Fails on the first unit whose provider call or persist fails; units
/// already completed are not rolled back.
pub(crate) fn fetch_days(
    provider: &dyn HistoryProvider,
    plan: &FetchPlan<'_>,
    workers: usize,
) -> Result<usize, StoreError> {
    let total = plan.dates.len();
    if total == 0 {
        return Ok(0);
    }
    let workers = workers.max(1);

    let cancelled = AtomicBool::new(false);
    let cancelled = &cancelled;
    let (unit_tx, unit_rx) = bounded::<NaiveDate>(UNIT_QUEUE_DEPTH);
    // Sized so workers never block on reporting, even after the
    // aggregator has stopped listening.
    let (report_tx, report_rx) = bounded::<Result<NaiveDate, StoreError>>(total);

    thread::scope(|scope| {
        scope.spawn(move || {
            for &date in plan.dates {
                if cancelled.load(Ordering::Acquire) {
                    break;
                }
                if unit_tx.send(date).is_err() {
                    break;
                }
            }
        });

        for _ in 0..workers {
            let units = unit_rx.clone();
            let reports = report_tx.clone();
            scope.spawn(move || worker_loop(provider, plan, units, reports, cancelled));
        }
        drop(unit_rx);
        drop(report_tx);

        let mut completed = 0;
        while completed < total {
            let report = report_rx.recv().map_err(|_| StoreError::PipelineStalled)?;
            match report {
                Ok(date) => {
                    completed += 1;
                    debug!("{}: stored {date} ({completed}/{total})", plan.symbol);
                }
                Err(err) => {
                    cancelled.store(true, Ordering::Release);
                    return Err(err);
                }
            }
        }
        Ok(completed)
    })
}

fn worker_loop(
    provider: &dyn HistoryProvider,
    plan: &FetchPlan<'_>,
    units: Receiver<NaiveDate>,
    reports: Sender<Result<NaiveDate, StoreError>>,
    cancelled: &AtomicBool,
) {
    loop {
        if cancelled.load(Ordering::Acquire) {
            return;
        }
        let Ok(date) = units.recv() else {
            return;
        };
        // The flag may have been raised while this worker was parked in
        // recv; claimed-but-unstarted units are abandoned too.
        if cancelled.load(Ordering::Acquire) {
            return;
        }
        if reports.send(fetch_day(provider, plan, date)).is_err() {
            return;
        }
    }
}

/// One unit of work: fetch one day's ticks within the session window and
/// persist them. An empty provider response still persists an (empty)
/// document, marking the date covered so it is never re-requested.
fn fetch_day(
    provider: &dyn HistoryProvider,
    plan: &FetchPlan<'_>,
    date: NaiveDate,
) -> Result<NaiveDate, StoreError> {
    let window = TimeWindow::trading_day(date, plan.session_start, plan.session_end);
    let path = plan.symbol_dir.join(layout::day_file_name(date));

    let mut ticks: Vec<Tick> = match provider.ticks(plan.symbol, &window, plan.quotes, plan.trades) {
        Ok(ticks) => ticks,
        Err(ProviderError::Empty) => {
            debug!("{}: no data on {date}, storing an empty document", plan.symbol);
            Vec::new()
        }
        Err(err) => {
            return Err(StoreError::provider(
                plan.symbol,
                CalendarRange::single(date),
                err,
            ))
        }
    };

    sort_oldest_first(&mut ticks);
    docs::write_json(&path, &ticks)?;
    Ok(date)
}
