use thiserror::Error;

use sheetfeed_reduce::ParseError;
use sheetfeed_sheets::FetchError;
use sheetfeed_store::WriteError;

/// Everything that can go wrong inside one sync round.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),

    #[error("write failed: {0}")]
    Write(#[from] WriteError),

    /// First failure of an aggregated round, wrapped with the failing
    /// branch's registration context.
    #[error("{detail} failed: {source}")]
    Aggregate {
        name: String,
        detail: String,
        source: Box<SyncError>,
    },

    /// A branch was dropped before settling (its task panicked or the
    /// runtime tore it down).
    #[error("branch dropped before settling")]
    Canceled,
}
