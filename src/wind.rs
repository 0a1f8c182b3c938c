use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

static SPEED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*(\d+)").unwrap());

/// Current-hour wind conditions from an NWS hourly forecast.
#[derive(Debug, Clone, Serialize)]
pub struct WindReport {
    pub speed: String,
    pub speed_numeric: u32,
    pub direction: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forecast: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<i64>,
    /// Northerly or easterly wind pushes plant plumes toward the residential side.
    pub is_risk: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WindReport {
    pub fn offline(error: impl Into<String>) -> Self {
        Self {
            speed: "OFFLINE".into(),
            speed_numeric: 0,
            direction: "OFFLINE".into(),
            forecast: None,
            temperature: None,
            is_risk: false,
            timestamp: Utc::now(),
            error: Some(error.into()),
        }
    }
}

/// Read the first period of a `/forecast/hourly` response.
pub fn parse_forecast(json: &str) -> Result<WindReport> {
    let doc: Value = serde_json::from_str(json).context("Forecast is not JSON")?;
    let current = doc
        .pointer("/properties/periods/0")
        .context("Forecast has no periods")?;

    let speed = current
        .get("windSpeed")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let direction = current
        .get("windDirection")
        .and_then(Value::as_str)
        .context("Forecast period has no windDirection")?
        .to_string();

    Ok(WindReport {
        speed_numeric: leading_number(&speed),
        is_risk: is_risk(&direction),
        forecast: current
            .get("shortForecast")
            .and_then(Value::as_str)
            .map(str::to_string),
        temperature: current.get("temperature").and_then(Value::as_i64),
        speed,
        direction,
        timestamp: Utc::now(),
        error: None,
    })
}

pub async fn fetch_wind(url: &str, opts: &crate::fetch::FetchOptions) -> Result<WindReport> {
    let body = crate::fetch::fetch_page(url, opts).await?;
    parse_forecast(&body)
}

fn leading_number(speed: &str) -> u32 {
    SPEED_RE
        .captures(speed)
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(0)
}

pub fn is_risk(direction: &str) -> bool {
    direction.contains('N') || direction.contains('E')
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "properties": {
            "periods": [
                {"windSpeed": "10 mph", "windDirection": "NNE", "shortForecast": "Sunny", "temperature": 78},
                {"windSpeed": "5 mph", "windDirection": "S", "shortForecast": "Clear", "temperature": 70}
            ]
        }
    }"#;

    #[test]
    fn first_period() {
        let w = parse_forecast(SAMPLE).unwrap();
        assert_eq!(w.speed, "10 mph");
        assert_eq!(w.speed_numeric, 10);
        assert_eq!(w.direction, "NNE");
        assert_eq!(w.forecast.as_deref(), Some("Sunny"));
        assert_eq!(w.temperature, Some(78));
        assert!(w.is_risk);
    }

    #[test]
    fn risk_directions() {
        assert!(is_risk("E"));
        assert!(is_risk("NW"));
        assert!(!is_risk("SSW"));
        assert!(!is_risk("S"));
    }

    #[test]
    fn speed_ranges() {
        assert_eq!(leading_number("5 to 10 mph"), 5);
        assert_eq!(leading_number(""), 0);
        assert_eq!(leading_number("calm"), 0);
    }

    #[test]
    fn missing_periods() {
        assert!(parse_forecast(r#"{"properties":{"periods":[]}}"#).is_err());
        assert!(parse_forecast("not json").is_err());
    }

    #[test]
    fn offline_report() {
        let v = serde_json::to_value(WindReport::offline("timeout")).unwrap();
        assert_eq!(v["speed"], "OFFLINE");
        assert_eq!(v["is_risk"], false);
        assert_eq!(v["error"], "timeout");
    }
}
