use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

static TITLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h5").unwrap());

const CRITICAL_TERMS: &[&str] = &["explosion", "shelter", "evacuate", "emergency"];
const WARNING_TERMS: &[&str] = &["flare", "release", "incident", "leak"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaerMessage {
    pub title: String,
    pub body: String,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct CaerFeed {
    pub messages: Vec<CaerMessage>,
    pub count: usize,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CaerFeed {
    pub fn new(messages: Vec<CaerMessage>) -> Self {
        Self {
            count: messages.len(),
            messages,
            timestamp: Utc::now(),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::new(Vec::new())
        }
    }
}

/// Each `<h5>` opens a message; its body is the loose text that follows,
/// up to the next `<h5>`.
pub fn parse_messages(page: &str) -> Vec<CaerMessage> {
    let document = Html::parse_document(page);
    let now = Utc::now();

    document
        .select(&TITLE_SEL)
        .map(|h5| {
            let title = crate::html::collapse_ws(&h5.text().collect::<String>());
            let body = body_after(h5);
            let severity = classify(&format!("{title}{body}"));
            CaerMessage {
                title,
                body,
                severity,
                timestamp: now,
            }
        })
        .collect()
}

fn body_after(title: ElementRef) -> String {
    let mut parts = Vec::new();
    for node in title.next_siblings() {
        if let Some(el) = ElementRef::wrap(node) {
            if el.value().name() == "h5" {
                break;
            }
            continue;
        }
        if let Some(text) = node.value().as_text() {
            let t = text.trim();
            if t.chars().count() > 1 {
                parts.push(crate::html::collapse_ws(t));
            }
        }
    }
    parts.join(" ")
}

pub fn classify(text: &str) -> Severity {
    let lower = text.to_lowercase();
    if CRITICAL_TERMS.iter().any(|t| lower.contains(t)) {
        Severity::Critical
    } else if WARNING_TERMS.iter().any(|t| lower.contains(t)) {
        Severity::Warning
    } else {
        Severity::Info
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_order() {
        assert_eq!(classify("Leak and EXPLOSION reported"), Severity::Critical);
        assert_eq!(classify("Flare stack activity"), Severity::Warning);
        assert_eq!(classify("Routine notice"), Severity::Info);
    }

    #[test]
    fn fixture_messages() {
        let page = std::fs::read_to_string("tests/fixtures/caer.html").unwrap();
        let msgs = parse_messages(&page);
        assert_eq!(msgs.len(), 3);

        assert_eq!(msgs[0].title, "LyondellBasell Channelview - Flaring");
        assert_eq!(
            msgs[0].body,
            "Planned flare activity at the Channelview complex. \
             Residents may see elevated flames through the evening."
        );
        assert_eq!(msgs[0].severity, Severity::Warning);

        assert_eq!(msgs[1].severity, Severity::Critical);
        assert_eq!(msgs[2].severity, Severity::Info);
        assert_eq!(msgs[2].body, "Routine maintenance scheduled for Tuesday.");
    }

    #[test]
    fn no_titles() {
        assert!(parse_messages("<p>No active messages</p>").is_empty());
    }

    #[test]
    fn feed_counts() {
        let feed = CaerFeed::new(parse_messages("<h5>A</h5>text here<h5>B</h5>"));
        assert_eq!(feed.count, 2);
        let v = serde_json::to_value(&feed).unwrap();
        assert_eq!(v["messages"][0]["severity"], "info");
        assert_eq!(v["messages"][0]["body"], "text here");
    }
}
