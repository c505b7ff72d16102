//! Lenient extraction of structured fields from model output.
//!
//! Models are asked to answer `**Title** (High Priority, Est. Time: 30 minutes)`
//! but nothing enforces it, so every field has a fallback and parsing never fails.

use crate::model::Priority;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static PRIORITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\((High|Medium|Low) Priority").expect("priority pattern is valid")
});

static ESTIMATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Est\. Time: (\d+)\s*(?:minutes?|mins?|m)").expect("estimate pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedSuggestion {
    pub title: String,
    pub priority: Priority,
    pub estimated_time: Option<u32>,
}

/// Parse a suggestion. Missing pieces fall back to an un-marked title,
/// [`Priority::MEDIUM`] and no estimate.
#[must_use]
pub fn parse(text: &str) -> ParsedSuggestion {
    ParsedSuggestion {
        title: parse_title(text),
        priority: parse_priority(text),
        estimated_time: parse_estimate(text),
    }
}

/// Text before the first `(` with all `**` markers removed.
#[must_use]
pub fn parse_title(text: &str) -> String {
    let unmarked = text.replace("**", "");
    unmarked
        .split('(')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

#[must_use]
pub fn parse_priority(text: &str) -> Priority {
    PRIORITY_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map_or(Priority::MEDIUM, |level| match level.as_str() {
            "High" => Priority::HIGH,
            "Low" => Priority::LOW,
            _ => Priority::MEDIUM,
        })
}

/// Estimated minutes. Values that do not fit a `u32` count as absent.
#[must_use]
pub fn parse_estimate(text: &str) -> Option<u32> {
    ESTIMATE_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|minutes| minutes.as_str().parse().ok())
}
