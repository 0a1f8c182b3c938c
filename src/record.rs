use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Dispatch columns that get a typed slot on [`IncidentRecord`], in canonical order.
pub const KNOWN_FIELDS: &[&str] = &[
    "Agency",
    "Address",
    "Cross Street",
    "Key Map",
    "Call Time",
    "Incident Type",
    "Combined Response",
];

/// Keys the record computes itself; page columns with these names are renamed.
const DERIVED_FIELDS: &[&str] = &["has_location", "lat", "lon", "priority"];

/// One incident row keyed by header name, plus derived location and priority.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IncidentRecord {
    #[serde(rename = "Agency", skip_serializing_if = "Option::is_none")]
    pub agency: Option<String>,
    #[serde(rename = "Address", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(rename = "Cross Street", skip_serializing_if = "Option::is_none")]
    pub cross_street: Option<String>,
    #[serde(rename = "Key Map", skip_serializing_if = "Option::is_none")]
    pub key_map: Option<String>,
    #[serde(rename = "Call Time", skip_serializing_if = "Option::is_none")]
    pub call_time: Option<String>,
    #[serde(rename = "Incident Type", skip_serializing_if = "Option::is_none")]
    pub incident_type: Option<String>,
    #[serde(rename = "Combined Response", skip_serializing_if = "Option::is_none")]
    pub combined_response: Option<String>,
    /// Columns without a typed slot, keyed by header name.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,

    has_location: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lon: Option<f64>,
    priority: bool,
}

impl IncidentRecord {
    /// Store `value` under the column `name`.
    pub fn set_field(&mut self, name: &str, value: String) {
        match name {
            "Agency" => self.agency = Some(value),
            "Address" => self.address = Some(value),
            "Cross Street" => self.cross_street = Some(value),
            "Key Map" => self.key_map = Some(value),
            "Call Time" => self.call_time = Some(value),
            "Incident Type" => self.incident_type = Some(value),
            "Combined Response" => self.combined_response = Some(value),
            _ => {
                self.extra.insert(extra_key(name), value);
            }
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "Agency" => self.agency.as_deref(),
            "Address" => self.address.as_deref(),
            "Cross Street" => self.cross_street.as_deref(),
            "Key Map" => self.key_map.as_deref(),
            "Call Time" => self.call_time.as_deref(),
            "Incident Type" => self.incident_type.as_deref(),
            "Combined Response" => self.combined_response.as_deref(),
            _ => self.extra.get(&extra_key(name)).map(|s| s.as_str()),
        }
    }

    /// Header-derived values: typed fields first, then extras by column name.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        [
            &self.agency,
            &self.address,
            &self.cross_street,
            &self.key_map,
            &self.call_time,
            &self.incident_type,
            &self.combined_response,
        ]
        .into_iter()
        .filter_map(|v| v.as_deref())
        .chain(self.extra.values().map(|v| v.as_str()))
    }

    /// All header-derived values joined by a single space.
    pub fn text(&self) -> String {
        self.values().collect::<Vec<_>>().join(" ")
    }

    /// Address-like value used for placeholder coordinates.
    pub fn address_text(&self) -> Option<&str> {
        self.address
            .as_deref()
            .or_else(|| self.extra.get("Location").map(|s| s.as_str()))
            .or_else(|| self.extra.get("Block").map(|s| s.as_str()))
    }

    pub fn set_location(&mut self, coords: Option<(f64, f64)>) {
        match coords {
            Some((lat, lon)) => {
                self.has_location = true;
                self.lat = Some(lat);
                self.lon = Some(lon);
            }
            None => {
                self.has_location = false;
                self.lat = None;
                self.lon = None;
            }
        }
    }

    pub fn location(&self) -> Option<(f64, f64)> {
        self.lat.zip(self.lon)
    }

    pub fn has_location(&self) -> bool {
        self.has_location
    }

    pub fn set_priority(&mut self, priority: bool) {
        self.priority = priority;
    }

    pub fn is_priority(&self) -> bool {
        self.priority
    }
}

/// Column names clashing with a derived field get a `_1` suffix.
fn extra_key(name: &str) -> String {
    if DERIVED_FIELDS.contains(&name) {
        format!("{name}_1")
    } else {
        name.to_string()
    }
}

/// Final output of one extraction run.
#[derive(Debug, Clone, Serialize)]
pub struct IncidentSet {
    pub incidents: Vec<IncidentRecord>,
    pub total_incidents: usize,
    pub priority_count: usize,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IncidentSet {
    pub fn new(incidents: Vec<IncidentRecord>) -> Self {
        let priority_count = incidents.iter().filter(|r| r.is_priority()).count();
        Self {
            total_incidents: incidents.len(),
            priority_count,
            incidents,
            timestamp: Utc::now(),
            error: None,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Empty set carrying the failure message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::empty()
        }
    }

    pub fn priority(&self) -> impl Iterator<Item = &IncidentRecord> {
        self.incidents.iter().filter(|r| r.is_priority())
    }

    /// Keep only priority records; `total_incidents` still counts everything.
    pub fn retain_priority(&mut self) {
        self.incidents.retain(|r| r.is_priority());
    }
}

// ── Tests ──
