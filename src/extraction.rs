//! Best-effort numeric extraction from free text.
//!
//! Narrative text produced outside this crate sometimes carries scores such
//! as "Impact: 0.7". These helpers pull the first number that follows a label
//! and fall back to [`DEFAULT_SCORE`] when nothing parses. Nothing in the
//! network analyses depends on this module.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

/// Score used when no number follows the label.
pub const DEFAULT_SCORE: f64 = 0.5;

fn label_pattern(label: &str) -> Option<Regex> {
    Regex::new(&format!(r"(?i){}.*?(\d+(?:\.\d+)?)", regex::escape(label))).ok()
}

fn capture(pattern: &Regex, text: &str) -> Option<f64> {
    pattern.captures(text)?.get(1)?.as_str().parse().ok()
}

/// First number after `label` in `text`, or [`DEFAULT_SCORE`].
pub fn extract_score(text: &str, label: &str) -> f64 {
    label_pattern(label)
        .and_then(|p| capture(&p, text))
        .unwrap_or_else(|| fallback(label))
}

fn cached(cell: &'static OnceLock<Option<Regex>>, label: &str, text: &str) -> f64 {
    cell.get_or_init(|| label_pattern(label))
        .as_ref()
        .and_then(|p| capture(p, text))
        .unwrap_or_else(|| fallback(label))
}

fn fallback(label: &str) -> f64 {
    debug!(label, "No score found; using default");
    DEFAULT_SCORE
}

pub fn extract_impact_score(text: &str) -> f64 {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&PATTERN, "impact", text)
}

pub fn extract_likelihood_score(text: &str) -> f64 {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&PATTERN, "likelihood", text)
}

pub fn extract_adaptability_score(text: &str) -> f64 {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&PATTERN, "adaptability", text)
}
