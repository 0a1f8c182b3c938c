use std::cmp::Ordering;

use super::error::ExtractError;

/// Cell texts of one table as found on the page, row by row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

impl<S: Into<String>> From<Vec<Vec<S>>> for RawTable {
    fn from(rows: Vec<Vec<S>>) -> Self {
        Self::new(
            rows.into_iter()
                .map(|r| r.into_iter().map(Into::into).collect())
                .collect(),
        )
    }
}

/// Orders tables by row count only. Equal counts compare equal, so the
/// selection below keeps the earliest of them.
pub fn by_row_count(a: &RawTable, b: &RawTable) -> Ordering {
    a.row_count().cmp(&b.row_count())
}

/// Pick the dispatch listing: the table with the most rows, earliest on ties.
pub fn select_table(tables: &[RawTable]) -> Result<&RawTable, ExtractError> {
    // Iterator::max_by returns the last maximum, so fold manually to keep the first.
    tables
        .iter()
        .fold(None, |best: Option<&RawTable>, t| match best {
            Some(b) if by_row_count(t, b) != Ordering::Greater => Some(b),
            _ => Some(t),
        })
        .ok_or(ExtractError::NoTableFound)
}

// ── Tests ──
