use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Facility {
    #[serde(skip)]
    pub name: &'static str,
    pub lat: f64,
    pub lon: f64,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

const fn facility(name: &'static str, lat: f64, lon: f64, kind: &'static str) -> Facility {
    Facility { name, lat, lon, kind }
}

/// Plants and terminals along the Houston ship channel.
pub const FACILITIES: &[Facility] = &[
    facility("LyondellBasell Channelview", 29.8160, -95.1150, "petrochemical"),
    facility("ExxonMobil Baytown Refinery", 29.7450, -95.0120, "refinery"),
    facility("ExxonMobil Baytown Chemical", 29.7520, -95.0050, "chemical"),
    facility("Chevron Phillips Cedar Bayou", 29.7400, -94.9850, "chemical"),
    facility("Shell Deer Park", 29.6700, -95.1280, "refinery"),
    facility("Valero Houston Refinery", 29.7350, -95.2450, "refinery"),
    facility("Marathon Galveston Bay", 29.7180, -95.0450, "refinery"),
    facility("Pasadena Refining", 29.6910, -95.1580, "refinery"),
    facility("Air Liquide Channelview", 29.8050, -95.1100, "industrial_gas"),
    facility("Arkema Crosby", 29.9150, -95.0620, "chemical"),
    facility("Huntsman Petrochemical", 29.7280, -95.0380, "chemical"),
    facility("Ineos Chocolate Bayou", 29.2450, -95.2280, "chemical"),
    facility("Covestro Baytown", 29.7380, -95.0180, "chemical"),
    facility("Enterprise Products", 29.7620, -95.0850, "storage"),
    facility("Kinder Morgan Pasadena", 29.6850, -95.1650, "storage"),
];

/// Facilities keyed by name, for JSON output.
pub fn by_name() -> BTreeMap<&'static str, Facility> {
    FACILITIES.iter().map(|f| (f.name, *f)).collect()
}
