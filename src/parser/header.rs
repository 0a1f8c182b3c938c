use std::collections::HashSet;

use super::error::ExtractError;
use super::tables::RawTable;

/// Token whose presence in row 0 marks it as the real header row.
pub const AGENCY_MARKER: &str = "Agency";

/// Column names for the selected table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Unique names used as record keys.
    pub names: Vec<String>,
    /// Cells as they appeared, used to spot repeated header rows.
    pub cells: Vec<String>,
    /// True when names were generated rather than read from the page.
    pub synthetic: bool,
}

impl Header {
    pub fn synthetic(width: usize) -> Self {
        let names: Vec<String> = (0..width).map(|i| format!("Col_{i}")).collect();
        Self {
            cells: names.clone(),
            names,
            synthetic: true,
        }
    }

    pub fn from_cells(cells: &[String]) -> Self {
        Self {
            names: unique_names(cells),
            cells: cells.to_vec(),
            synthetic: false,
        }
    }

    pub fn width(&self) -> usize {
        self.names.len()
    }

    /// Whether a data row is just the header again.
    pub fn matches(&self, row: &[String]) -> bool {
        row.len() == self.cells.len()
            && row.iter().zip(&self.cells).all(|(a, b)| a.trim() == b.trim())
    }
}

/// Result of header inference: the header, how many leading rows it consumed,
/// and the degradation when no marker row was found.
#[derive(Debug)]
pub struct Resolved {
    pub header: Header,
    pub consumed: usize,
    pub warning: Option<ExtractError>,
}

pub fn resolve_header(table: &RawTable) -> Resolved {
    let Some(first) = table.rows.first() else {
        return Resolved {
            header: Header::synthetic(0),
            consumed: 0,
            warning: Some(ExtractError::HeaderAmbiguous),
        };
    };

    if first.concat().contains(AGENCY_MARKER) {
        Resolved {
            header: Header::from_cells(first),
            consumed: 1,
            warning: None,
        }
    } else {
        Resolved {
            header: Header::synthetic(first.len()),
            consumed: 0,
            warning: Some(ExtractError::HeaderAmbiguous),
        }
    }
}

/// Blank names become `Col_i`; repeats get a `_n` suffix.
fn unique_names(cells: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    cells
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let base = match cell.trim() {
                "" => format!("Col_{i}"),
                t => t.to_string(),
            };
            let mut name = base.clone();
            let mut n = 1;
            while !seen.insert(name.clone()) {
                name = format!("{base}_{n}");
                n += 1;
            }
            name
        })
        .collect()
}

// ── Tests ──
