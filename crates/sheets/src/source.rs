use async_trait::async_trait;
use thiserror::Error;

use sheetfeed_core::RawRow;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),
}

/// Trait for tabular row sources (Google Sheets, test fixtures, etc.)
///
/// Implementations return the rows of one A1-notation range, in sheet
/// order, as plain string cells. Sync rounds depend on this seam rather
/// than on a concrete client.
#[async_trait]
pub trait RowSource: Send + Sync {
    async fn fetch_rows(&self, range: &str) -> Result<Vec<RawRow>, FetchError>;
}
