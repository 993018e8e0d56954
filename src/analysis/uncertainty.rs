//! Cross-scenario scores and key uncertainties.
//!
//! A key uncertainty is a risk whose impact or likelihood estimate swings
//! across scenarios: its population variance exceeds the configured
//! threshold.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::extraction::{extract_adaptability_score, extract_impact_score, extract_likelihood_score};
use crate::stats;
use crate::types::RiskId;

/// Scores of one risk under one scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioScores {
    pub impact: f64,
    pub likelihood: f64,
    pub adaptability: f64,
}

impl ScenarioScores {
    pub fn new(impact: f64, likelihood: f64, adaptability: f64) -> Self {
        Self {
            impact,
            likelihood,
            adaptability,
        }
    }
}

/// Build scores from narrative text; missing numbers default to 0.5.
pub fn extract_scores(text: &str) -> ScenarioScores {
    ScenarioScores {
        impact: extract_impact_score(text),
        likelihood: extract_likelihood_score(text),
        adaptability: extract_adaptability_score(text),
    }
}

/// Per risk, per scenario name.
pub type CrossScenarioScores = BTreeMap<RiskId, BTreeMap<String, ScenarioScores>>;

/// Regroup per-scenario narratives by risk and extract their scores.
pub fn cross_scenario_scores(
    narratives: &BTreeMap<String, BTreeMap<RiskId, String>>,
) -> CrossScenarioScores {
    let mut scores = CrossScenarioScores::new();
    for (scenario, by_risk) in narratives {
        for (risk, text) in by_risk {
            scores
                .entry(*risk)
                .or_default()
                .insert(scenario.clone(), extract_scores(text));
        }
    }
    scores
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UncertaintyConfig {
    /// Variance across scenarios above which a risk is a key uncertainty.
    /// Default: 0.1
    pub variance_threshold: f64,
}

impl Default for UncertaintyConfig {
    fn default() -> Self {
        Self {
            variance_threshold: 0.1,
        }
    }
}

impl UncertaintyConfig {
    pub fn with_variance_threshold(mut self, threshold: f64) -> Self {
        self.variance_threshold = threshold;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.variance_threshold.is_finite() || self.variance_threshold < 0.0 {
            return Err(format!(
                "variance_threshold must be finite and >= 0.0, got {}",
                self.variance_threshold
            ));
        }
        Ok(())
    }
}

/// Risks whose impact or likelihood variance across scenarios exceeds the threshold.
pub fn identify_key_uncertainties(
    results: &CrossScenarioScores,
    config: &UncertaintyConfig,
) -> Vec<RiskId> {
    let uncertain: Vec<RiskId> = results
        .iter()
        .filter(|(_, by_scenario)| {
            let impacts: Vec<f64> = by_scenario.values().map(|s| s.impact).collect();
            let likelihoods: Vec<f64> = by_scenario.values().map(|s| s.likelihood).collect();
            stats::variance(&impacts) > config.variance_threshold
                || stats::variance(&likelihoods) > config.variance_threshold
        })
        .map(|(risk, _)| *risk)
        .collect();
    info!(
        risks = results.len(),
        key_uncertainties = uncertain.len(),
        "Key uncertainties identified"
    );
    uncertain
}
