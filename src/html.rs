use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

use crate::parser::tables::{self, RawTable};

static TABLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());

/// Every `<table>` on the page as rows of cell text.
pub fn parse_tables(page: &str) -> Vec<RawTable> {
    let document = Html::parse_document(page);
    document
        .select(&TABLE_SEL)
        .map(|table| {
            let rows = table
                .select(&ROW_SEL)
                .map(row_cells)
                .filter(|cells| !cells.is_empty())
                .collect();
            RawTable::new(rows)
        })
        .collect()
}

/// Direct `<td>`/`<th>` children of a row, whitespace collapsed.
fn row_cells(row: ElementRef) -> Vec<String> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| matches!(el.value().name(), "td" | "th"))
        .map(|el| collapse_ws(&el.text().collect::<String>()))
        .collect()
}

pub fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Debug view of what the page parser sees.
#[derive(Debug, Serialize)]
pub struct TableSample {
    pub tables_found: usize,
    pub total_rows: usize,
    pub sample_rows: Vec<Vec<String>>,
}

/// Summarize the largest table: row count and its first `limit` rows.
pub fn sample_rows(page: &str, limit: usize) -> TableSample {
    let found = parse_tables(page);
    let (total_rows, sample_rows) = match tables::select_table(&found) {
        Ok(t) => (t.row_count(), t.rows.iter().take(limit).cloned().collect()),
        Err(_) => (0, Vec::new()),
    };
    TableSample {
        tables_found: found.len(),
        total_rows,
        sample_rows,
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cells() {
        let page = "<table><tr><th> Agency </th><th>Address</th></tr>\
                    <tr><td>FD</td><td>1&nbsp;Main\n  St</td></tr></table>";
        let tables = parse_tables(page);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rows, vec![vec!["Agency", "Address"], vec!["FD", "1 Main St"]]);
    }

    #[test]
    fn no_tables() {
        assert!(parse_tables("<p>nothing here</p>").is_empty());
    }

    #[test]
    fn empty_rows_skipped() {
        let page = "<table><tr></tr><tr><td>a</td><td>b</td></tr></table>";
        assert_eq!(parse_tables(page)[0].row_count(), 1);
    }

    #[test]
    fn fixture_tables() {
        let page = std::fs::read_to_string("tests/fixtures/dispatch.html").unwrap();
        let tables = parse_tables(&page);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].row_count(), 1);
        assert_eq!(tables[1].row_count(), 10);
        assert_eq!(tables[1].rows[0][0], "Agency");
        assert_eq!(tables[1].rows[2][1], "2300 Bayway Dr");
        assert_eq!(tables[1].rows[7].len(), 1);
    }

    #[test]
    fn sample_of_largest() {
        let page = std::fs::read_to_string("tests/fixtures/dispatch.html").unwrap();
        let s = sample_rows(&page, 3);
        assert_eq!(s.tables_found, 2);
        assert_eq!(s.total_rows, 10);
        assert_eq!(s.sample_rows.len(), 3);
    }
}
