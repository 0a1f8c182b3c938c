use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

pub const DISPATCH_URL: &str = "https://cohweb.houstontx.gov/ActiveIncidents/Combined.aspx";
pub const CAER_URL: &str = "https://www.incident-reporter.net/e-notifycaerfeed/caermessagelive.html";
pub const NWS_FORECAST_URL: &str = "https://api.weather.gov/gridpoints/HGX/75,98/forecast/hourly";

const DEFAULT_KEYWORDS: &[&str] = &[
    "SHELDON", "BAYWAY", "DECKER", "CHANNELVIEW", "PASADENA", "FIRE", "HAZMAT", "LYONDELL",
    "EXXON", "INDUSTRIAL", "CHEMICAL", "REFINERY", "PLANT", "EXPLOSION", "LEAK", "SMOKE", "ODOR",
    "APARTMENT", "HOUSE", "ALARM", "CRASH", "MAJOR",
];
const DEFAULT_BANNED: &[&str] = &["this page contains", "disclaimer"];
const DEFAULT_AGENCIES: &[&str] = &["FD", "PD"];

/// Row acceptance policy applied after structural checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Any structurally valid row is an incident.
    #[default]
    Lenient,
    /// `Agency` must be one of `agency_codes` (when the header has an Agency column).
    Strict,
}

/// Placeholder area the pseudo-geocoder spreads markers over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl Default for BoundingBox {
    fn default() -> Self {
        // Houston ship channel
        Self {
            lat_min: 29.60,
            lat_max: 29.95,
            lon_min: -95.45,
            lon_max: -94.95,
        }
    }
}

impl BoundingBox {
    pub fn validate(&self) -> Result<()> {
        let finite = [self.lat_min, self.lat_max, self.lon_min, self.lon_max]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.lat_min > self.lat_max || self.lon_min > self.lon_max {
            bail!(
                "invalid bounding box: lat {}..{}, lon {}..{}",
                self.lat_min,
                self.lat_max,
                self.lon_min,
                self.lon_max
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Matched as substrings of the uppercased record text.
    pub keywords: Vec<String>,
    /// Matched case-insensitively against the record text.
    pub banned_substrings: Vec<String>,
    pub strictness: Strictness,
    pub agency_codes: Vec<String>,
    pub bbox: BoundingBox,
    pub dedupe: bool,
    /// Bind `Col_0..Col_6` to the dispatch fields when the header is synthetic.
    pub positional_columns: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            keywords: to_strings(DEFAULT_KEYWORDS),
            banned_substrings: to_strings(DEFAULT_BANNED),
            strictness: Strictness::Lenient,
            agency_codes: to_strings(DEFAULT_AGENCIES),
            bbox: BoundingBox::default(),
            dedupe: true,
            positional_columns: false,
        }
    }
}

impl EngineConfig {
    /// Load from a JSON file; missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let cfg: EngineConfig = serde_json::from_str(&text)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        cfg.normalized()
    }

    /// Uppercase keywords, drop blanks, and check the bounding box.
    pub fn normalized(mut self) -> Result<Self> {
        self.bbox.validate()?;
        self.keywords = self
            .keywords
            .iter()
            .map(|k| k.trim().to_uppercase())
            .filter(|k| !k.is_empty())
            .collect();
        self.banned_substrings = self
            .banned_substrings
            .iter()
            .map(|b| b.to_lowercase())
            .filter(|b| !b.is_empty())
            .collect();
        self.agency_codes = self.agency_codes.iter().map(|c| c.trim().to_string()).collect();
        Ok(self)
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ── Tests ──
