use thiserror::Error;

/// A row that cannot be reduced. `row` is the zero-based index within the
/// fetched range (the sheet's header row is outside the range).
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("row {row}: expected at least {expected} cells, got {got}")]
    RowShape {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("row {row}: invalid score {text:?}: {source}")]
    Score {
        row: usize,
        text: String,
        source: std::num::ParseIntError,
    },

    #[error("row {row}: invalid schedule {text:?}: {source}")]
    Schedule {
        row: usize,
        text: String,
        source: chrono::ParseError,
    },
}
