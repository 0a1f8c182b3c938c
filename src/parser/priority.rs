use crate::record::IncidentRecord;

/// Flag records whose uppercased text contains any keyword.
///
/// Plain substring search, so `HAZMAT` hits inside `HAZMAT SPILL-TRUCK`.
/// Keywords are compared as given; pass them uppercase.
pub fn classify(records: &mut [IncidentRecord], keywords: &[String]) {
    for record in records.iter_mut() {
        let flagged = is_priority(record, keywords);
        record.set_priority(flagged);
    }
}

pub fn is_priority(record: &IncidentRecord, keywords: &[String]) -> bool {
    let text = record.text().to_uppercase();
    keywords.iter().any(|k| text.contains(k.as_str()))
}
