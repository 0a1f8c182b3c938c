use std::collections::HashSet;

use tracing::debug;

use super::error::ExtractError;
use super::header::Header;
use crate::config::{EngineConfig, Strictness};
use crate::record::{IncidentRecord, KNOWN_FIELDS};

/// Turn data rows into records keyed by the header.
///
/// `first_row` is the table index of `rows[0]`, used only for log messages.
pub fn normalize_rows(
    rows: &[Vec<String>],
    header: &Header,
    cfg: &EngineConfig,
    first_row: usize,
) -> Vec<IncidentRecord> {
    let names = field_names(header, cfg.positional_columns);
    let checks_agency = names.iter().any(|n| n == "Agency");
    let mut records = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let idx = first_row + i;

        if !is_structurally_valid(row) {
            debug!("Row {}: dropped, fewer than two filled cells", idx);
            continue;
        }
        if header.matches(row) {
            debug!("Row {}: dropped, repeated header", idx);
            continue;
        }
        if row.len() != names.len() {
            let e = ExtractError::MalformedRow {
                row: idx,
                expected: names.len(),
                found: row.len(),
            };
            debug!("{}, padding/truncating", e);
        }

        let record = build_record(row, &names);

        if cfg.strictness == Strictness::Strict && checks_agency && !has_known_agency(&record, cfg) {
            debug!("Row {}: dropped, agency {:?} not recognized", idx, record.agency);
            continue;
        }

        records.push(record);
    }

    records
}

/// A row needs at least two non-blank cells to carry incident data.
pub fn is_structurally_valid(row: &[String]) -> bool {
    row.iter().filter(|c| !c.trim().is_empty()).count() > 1
}

/// Drop records whose full field text repeats an earlier record.
pub fn dedupe(records: Vec<IncidentRecord>) -> Vec<IncidentRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert(r.values().collect::<Vec<_>>().join("\u{1f}")))
        .collect()
}

fn field_names(header: &Header, positional: bool) -> Vec<String> {
    if positional && header.synthetic && header.width() >= KNOWN_FIELDS.len() {
        header
            .names
            .iter()
            .enumerate()
            .map(|(i, n)| KNOWN_FIELDS.get(i).map_or_else(|| n.clone(), |k| k.to_string()))
            .collect()
    } else {
        header.names.clone()
    }
}

fn build_record(row: &[String], names: &[String]) -> IncidentRecord {
    let mut record = IncidentRecord::default();
    for (i, name) in names.iter().enumerate() {
        let value = row.get(i).map(|c| c.trim().to_string()).unwrap_or_default();
        record.set_field(name, value);
    }
    record
}

fn has_known_agency(record: &IncidentRecord, cfg: &EngineConfig) -> bool {
    record
        .agency
        .as_deref()
        .is_some_and(|a| cfg.agency_codes.iter().any(|c| c == a))
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn header() -> Header {
        Header::from_cells(&cells(&["Agency", "Address", "Incident Type"]))
    }

    #[test]
    fn zips_against_header() {
        let rows = vec![cells(&["FD", "100 Main St", "Fire"])];
        let out = normalize_rows(&rows, &header(), &EngineConfig::default(), 1);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].agency.as_deref(), Some("FD"));
        assert_eq!(out[0].address.as_deref(), Some("100 Main St"));
        assert_eq!(out[0].incident_type.as_deref(), Some("Fire"));
    }

    #[test]
    fn short_row_padded() {
        let rows = vec![cells(&["FD", "100 Main St"])];
        let out = normalize_rows(&rows, &header(), &EngineConfig::default(), 1);
        assert_eq!(out[0].incident_type.as_deref(), Some(""));
    }

    #[test]
    fn long_row_truncated() {
        let rows = vec![cells(&["FD", "100 Main St", "Fire", "extra", "more"])];
        let out = normalize_rows(&rows, &header(), &EngineConfig::default(), 1);
        assert!(out[0].extra.is_empty());
        assert_eq!(out[0].values().count(), 3);
    }

    #[test]
    fn drops_invalid_rows() {
        let rows = vec![
            cells(&["only"]),
            cells(&["", "  ", ""]),
            cells(&["FD", "", ""]),
            cells(&["Agency", "Address", "Incident Type"]),
            cells(&["PD", "9 Elm", "Theft"]),
        ];
        let out = normalize_rows(&rows, &header(), &EngineConfig::default(), 1);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].agency.as_deref(), Some("PD"));
    }

    #[test]
    fn strict_requires_known_agency() {
        let cfg = EngineConfig {
            strictness: Strictness::Strict,
            ..Default::default()
        };
        let rows = vec![
            cells(&["FD", "1 A St", "Fire"]),
            cells(&["EMS", "2 B St", "Medical"]),
            cells(&["PD", "3 C St", "Theft"]),
        ];
        let out = normalize_rows(&rows, &header(), &cfg, 1);
        let agencies: Vec<_> = out.iter().filter_map(|r| r.agency.as_deref()).collect();
        assert_eq!(agencies, vec!["FD", "PD"]);
    }

    #[test]
    fn strict_without_agency_column_is_lenient() {
        let cfg = EngineConfig {
            strictness: Strictness::Strict,
            ..Default::default()
        };
        let rows = vec![cells(&["a", "b"]), cells(&["c", "d"])];
        let out = normalize_rows(&rows, &Header::synthetic(2), &cfg, 0);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn lenient_accepts_any_agency() {
        let rows = vec![cells(&["EMS", "2 B St", "Medical"])];
        let out = normalize_rows(&rows, &header(), &EngineConfig::default(), 1);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn positional_binding_for_wide_synthetic_header() {
        let cfg = EngineConfig {
            positional_columns: true,
            ..Default::default()
        };
        let rows = vec![cells(&["FD", "1 A St", "B St", "455K", "10:01", "Fire", "Y", "E1"])];
        let out = normalize_rows(&rows, &Header::synthetic(8), &cfg, 0);
        assert_eq!(out[0].agency.as_deref(), Some("FD"));
        assert_eq!(out[0].key_map.as_deref(), Some("455K"));
        assert_eq!(out[0].combined_response.as_deref(), Some("Y"));
        assert_eq!(out[0].field("Col_7"), Some("E1"));
    }

    #[test]
    fn positional_binding_off_by_default() {
        let rows = vec![cells(&["FD", "1 A St", "B St", "455K", "10:01", "Fire", "Y"])];
        let out = normalize_rows(&rows, &Header::synthetic(7), &EngineConfig::default(), 0);
        assert_eq!(out[0].agency, None);
        assert_eq!(out[0].field("Col_0"), Some("FD"));
    }

    #[test]
    fn dedupe_keeps_first() {
        let rows = vec![
            cells(&["FD", "1 A St", "Fire"]),
            cells(&["FD", "1 A St", "Fire"]),
            cells(&["FD", "1 A St", "Alarm"]),
        ];
        let out = dedupe(normalize_rows(&rows, &header(), &EngineConfig::default(), 1));
        assert_eq!(out.len(), 2);
    }
}
