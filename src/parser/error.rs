use thiserror::Error;

/// Ways an extraction run can degrade. Only `Internal` surfaces as an error
/// on the returned set; the rest shape the output silently.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("no table found")]
    NoTableFound,
    #[error("no header row carries the Agency marker")]
    HeaderAmbiguous,
    #[error("row {row} has {found} cells, header has {expected}")]
    MalformedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("internal error: {0}")]
    Internal(String),
}

impl ExtractError {
    /// Whether the pipeline can continue (possibly with zero incidents).
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ExtractError::Internal(_))
    }
}
