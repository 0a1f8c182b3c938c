use crate::record::IncidentRecord;

/// Drop boilerplate rows; `banned` matches in any case.
pub fn filter_disclaimers(records: Vec<IncidentRecord>, banned: &[String]) -> Vec<IncidentRecord> {
    records
        .into_iter()
        .filter(|r| !is_disclaimer(r, banned))
        .collect()
}

pub fn is_disclaimer(record: &IncidentRecord, banned: &[String]) -> bool {
    let text = record.text().to_lowercase();
    banned.iter().any(|b| text.contains(&b.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(values: &[(&str, &str)]) -> IncidentRecord {
        let mut r = IncidentRecord::default();
        for (k, v) in values {
            r.set_field(k, v.to_string());
        }
        r
    }

    fn banned() -> Vec<String> {
        vec!["this page contains".into(), "disclaimer".into()]
    }

    #[test]
    fn removes_any_case() {
        let records = vec![
            record(&[("Agency", "THIS PAGE CONTAINS"), ("Address", "live data")]),
            record(&[("Agency", "FD"), ("Address", "See Disclaimer below")]),
            record(&[("Agency", "FD"), ("Address", "100 Main St")]),
        ];
        let out = filter_disclaimers(records, &banned());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].address.as_deref(), Some("100 Main St"));
    }

    #[test]
    fn mixed_case_banned_entry() {
        let records = vec![
            record(&[("Agency", "FD"), ("Address", "see disclaimer below")]),
            record(&[("Agency", "PD"), ("Address", "1 Main St")]),
        ];
        let out = filter_disclaimers(records, &["Disclaimer".to_string()]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].agency.as_deref(), Some("PD"));
    }

    #[test]
    fn empty_banned_list_keeps_all() {
        let records = vec![record(&[("Agency", "disclaimer"), ("Address", "x")])];
        assert_eq!(filter_disclaimers(records, &[]).len(), 1);
    }
}
