//! Store-level failure taxonomy.

use crate::calendar::CalendarRange;
use crate::provider::ProviderError;
use std::path::PathBuf;
use thiserror::Error;

/// Everything a store operation can fail with.
///
/// Validation errors are detected before any I/O. Provider and
/// persistence failures abort the operation immediately; documents already
/// written stay on disk (no rollback) and are absorbed by the next
/// successful run's reconciliation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Malformed request parameters; nothing was read or written.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The provider failed for a concrete symbol and range.
    #[error("provider failed for {symbol} over {range}: {source}")]
    Provider {
        symbol: String,
        range: CalendarRange,
        #[source]
        source: ProviderError,
    },

    /// Disk I/O failure on a specific path.
    #[error("{op} {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A document exists but does not parse.
    #[error("malformed document {path}: {source}")]
    Document {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The fetch pool disconnected before every dispatched unit reported.
    /// Unreachable in correct operation; kept so the aggregator never has
    /// to panic or silently under-count.
    #[error("tick fetch pipeline stopped before all dates completed")]
    PipelineStalled,
}

impl StoreError {
    pub(crate) fn provider(symbol: &str, range: CalendarRange, source: ProviderError) -> Self {
        StoreError::Provider {
            symbol: symbol.to_string(),
            range,
            source,
        }
    }

    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            op,
            path: path.into(),
            source,
        }
    }
}

impl From<crate::domain::ParseResolutionError> for StoreError {
    fn from(err: crate::domain::ParseResolutionError) -> Self {
        StoreError::InvalidRequest(err.to_string())
    }
}
