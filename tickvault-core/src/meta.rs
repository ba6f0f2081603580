//! Per-symbol coverage metadata and gap detection.
//!
//! A [`SymbolMeta`] records which calendar dates already have a persisted
//! document for one symbol at one resolution. It is itself persisted as a
//! JSON document next to the data (`.meta/<SYMBOL>.json`) and is only ever
//! rewritten by the orchestrator after an operation fully completes —
//! fetch workers never touch it.
//!
//! Membership in `listed_dates` means "a data file exists for this date",
//! not "this date had market activity": a day the provider answered with
//! an empty response is still listed, so it is never re-requested.

use crate::calendar::CalendarRange;
use crate::domain::Resolution;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Coverage record for one symbol at one resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolMeta {
    pub symbol: String,
    pub resolution: Resolution,
    /// Dates with a persisted document. Sorted and duplicate-free by
    /// construction.
    pub listed_dates: BTreeSet<NaiveDate>,
    /// True when Saturday/Sunday count as expected trading days.
    pub include_weekends: bool,
}

impl SymbolMeta {
    /// Fresh, empty coverage record — what loading a missing metadata
    /// document yields.
    pub fn new(symbol: &str, resolution: Resolution, include_weekends: bool) -> Self {
        Self {
            symbol: symbol.to_string(),
            resolution,
            listed_dates: BTreeSet::new(),
            include_weekends,
        }
    }

    /// Earliest listed date, `None` when nothing is listed.
    pub fn first_listed(&self) -> Option<NaiveDate> {
        self.listed_dates.iter().next().copied()
    }

    /// Latest listed date, `None` when nothing is listed.
    pub fn last_listed(&self) -> Option<NaiveDate> {
        self.listed_dates.iter().next_back().copied()
    }

    /// The contiguous span implied by the first and last listed dates.
    pub fn covered_span(&self) -> Option<CalendarRange> {
        match (self.first_listed(), self.last_listed()) {
            (Some(first), Some(last)) => Some(CalendarRange::new(first, last)),
            _ => None,
        }
    }

    /// Ascending, duplicate-free dates inside `range` that have no local
    /// document yet.
    ///
    /// Weekends are omitted entirely when `include_weekends` is false —
    /// they are never expected, so they are never missing. A single-day
    /// range is answered directly from the listed set, bypassing the
    /// weekend filter.
    pub fn missing_dates(&self, range: &CalendarRange) -> Vec<NaiveDate> {
        if range.from == range.to {
            if self.listed_dates.contains(&range.from) {
                return Vec::new();
            }
            return vec![range.from];
        }

        range
            .trading_days(self.include_weekends)
            .filter(|d| !self.listed_dates.contains(d))
            .collect()
    }

    /// [`missing_dates`](Self::missing_dates) merged into maximal runs of
    /// calendar-adjacent dates. A gap strictly greater than one calendar
    /// day between successive missing dates starts a new span.
    ///
    /// The merge rule deliberately uses the raw calendar-day delta: with
    /// weekends excluded, a missing Friday and the following Monday are
    /// three calendar days apart and therefore land in different spans,
    /// even though they are adjacent trading days.
    pub fn missing_ranges(&self, range: &CalendarRange) -> Vec<CalendarRange> {
        let dates = self.missing_dates(range);
        let mut runs = Vec::new();

        let mut dates = dates.into_iter();
        let Some(first) = dates.next() else {
            return runs;
        };

        let mut start = first;
        let mut end = first;
        for date in dates {
            if (date - end).num_days() > 1 {
                runs.push(CalendarRange::new(start, end));
                start = date;
            }
            end = date;
        }
        runs.push(CalendarRange::new(start, end));

        runs
    }

    /// What the candle path must fetch to cover `requested`.
    ///
    /// `None` when the covered span already contains the requested range.
    /// Otherwise the union of the requested range and the covered span:
    /// any extension re-fetches the whole known span, so the persisted
    /// document can always be overwritten wholesale instead of spliced.
    pub fn download_range(&self, requested: &CalendarRange) -> Option<CalendarRange> {
        let Some(span) = self.covered_span() else {
            return Some(*requested);
        };

        if span.from <= requested.from && requested.to <= span.to {
            return None;
        }

        Some(requested.union(&span))
    }

    /// Replace the listed set with every calendar day in `range`,
    /// weekends included — the candle path tracks a covered span, not
    /// actual trading days.
    pub fn relist_span(&mut self, range: &CalendarRange) {
        self.listed_dates = range.days().collect();
    }

}
