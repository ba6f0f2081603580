//! On-disk layout.
//!
//! ```text
//! <root>/candles/<day|week|{n}min>/<SYMBOL>.json        full candle array
//! <root>/candles/<...>/.meta/<SYMBOL>.json              coverage metadata
//! <root>/ticks/<quotes|trades|quotes_trades>/<SYMBOL>/<YYYY-MM-DD>.json
//! <root>/ticks/<...>/.meta/<SYMBOL>.json                coverage metadata
//! ```

use crate::domain::Resolution;
use crate::error::StoreError;
use chrono::NaiveDate;
use log::warn;
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

pub(crate) const DAY_FILE_FORMAT: &str = "%Y-%m-%d";

/// Which tick record kinds a store directory holds. Quotes and trades
/// requested together live in their own directory, separate from
/// quotes-only and trades-only data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickKind {
    Quotes,
    Trades,
    QuotesTrades,
}

impl TickKind {
    /// `None` when neither flag is set.
    pub fn from_flags(quotes: bool, trades: bool) -> Option<Self> {
        match (quotes, trades) {
            (true, true) => Some(TickKind::QuotesTrades),
            (true, false) => Some(TickKind::Quotes),
            (false, true) => Some(TickKind::Trades),
            (false, false) => None,
        }
    }

    pub fn dir_name(&self) -> &'static str {
        match self {
            TickKind::Quotes => "quotes",
            TickKind::Trades => "trades",
            TickKind::QuotesTrades => "quotes_trades",
        }
    }

    pub fn wants_quotes(&self) -> bool {
        matches!(self, TickKind::Quotes | TickKind::QuotesTrades)
    }

    pub fn wants_trades(&self) -> bool {
        matches!(self, TickKind::Trades | TickKind::QuotesTrades)
    }
}

fn candle_dir(root: &Path, resolution: Resolution) -> PathBuf {
    root.join("candles").join(resolution.dir_name())
}

pub(crate) fn candle_doc_path(root: &Path, resolution: Resolution, symbol: &str) -> PathBuf {
    candle_dir(root, resolution).join(format!("{symbol}.json"))
}

pub(crate) fn candle_meta_path(root: &Path, resolution: Resolution, symbol: &str) -> PathBuf {
    candle_dir(root, resolution)
        .join(".meta")
        .join(format!("{symbol}.json"))
}

pub(crate) fn tick_symbol_dir(root: &Path, kind: TickKind, symbol: &str) -> PathBuf {
    root.join("ticks").join(kind.dir_name()).join(symbol)
}

pub(crate) fn tick_meta_path(root: &Path, kind: TickKind, symbol: &str) -> PathBuf {
    root.join("ticks")
        .join(kind.dir_name())
        .join(".meta")
        .join(format!("{symbol}.json"))
}

pub(crate) fn day_file_name(date: NaiveDate) -> String {
    format!("{}.json", date.format(DAY_FILE_FORMAT))
}

pub(crate) fn tick_day_path(root: &Path, kind: TickKind, symbol: &str, date: NaiveDate) -> PathBuf {
    tick_symbol_dir(root, kind, symbol).join(day_file_name(date))
}

/// Dates for which a day document actually exists in `dir` — the disk
/// truth the tick path reconciles its metadata against. A missing
/// directory means nothing is stored yet. Files that are not
/// `YYYY-MM-DD.json` are skipped with a warning.
pub(crate) fn scan_day_documents(dir: &Path) -> Result<BTreeSet<NaiveDate>, StoreError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeSet::new()),
        Err(err) => return Err(StoreError::io("scanning", dir, err)),
    };

    let mut dates = BTreeSet::new();
    for entry in entries {
        let entry = entry.map_err(|err| StoreError::io("scanning", dir, err))?;
        let path = entry.path();
        if path.is_dir() {
            continue;
        }

        let stem = path.file_stem().and_then(|s| s.to_str());
        let parsed = stem.and_then(|s| NaiveDate::parse_from_str(s, DAY_FILE_FORMAT).ok());
        match parsed {
            Some(date) if path.extension().is_some_and(|ext| ext == "json") => {
                dates.insert(date);
            }
            _ => warn!("skipping unrecognized file in tick directory: {}", path.display()),
        }
    }

    Ok(dates)
}
