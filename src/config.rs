//! Aggregate configuration for a full analysis run.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::{FeedbackConfig, TriggerConfig, UncertaintyConfig};
use crate::errors::{Error, Result};
use crate::network::DiffusionConfig;
use crate::simulation::{CascadeConfig, MonteCarloConfig, TippingConfig};

/// Every tunable of the analysis pipeline.
///
/// Missing sections fall back to their defaults, so a partial JSON file such
/// as `{"monte_carlo": {"num_simulations": 5000}}` is valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub diffusion: DiffusionConfig,
    pub cascade: CascadeConfig,
    pub monte_carlo: MonteCarloConfig,
    pub tipping: TippingConfig,
    pub trigger: TriggerConfig,
    pub feedback: FeedbackConfig,
    pub uncertainty: UncertaintyConfig,
}

impl AnalysisConfig {
    /// Load and validate a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            Error::Configuration(format!("cannot parse {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.monte_carlo = self.monte_carlo.with_seed(seed);
        self
    }

    pub fn with_num_simulations(mut self, num_simulations: usize) -> Self {
        self.monte_carlo = self.monte_carlo.with_num_simulations(num_simulations);
        self
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        let sections = [
            ("diffusion", self.diffusion.validate()),
            ("cascade", self.cascade.validate()),
            ("monte_carlo", self.monte_carlo.validate()),
            ("tipping", self.tipping.validate()),
            ("trigger", self.trigger.validate()),
            ("feedback", self.feedback.validate()),
            ("uncertainty", self.uncertainty.validate()),
        ];
        for (name, result) in sections {
            result.map_err(|msg| Error::Configuration(format!("{name}: {msg}")))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{"monte_carlo": {"num_simulations": 50, "random_seed": 7}}"#)
                .unwrap();
        assert_eq!(config.monte_carlo.num_simulations, 50);
        assert_eq!(config.monte_carlo.random_seed, Some(7));
        assert_eq!(config.monte_carlo.horizon, 10);
        assert_eq!(config.cascade.threshold, 0.5);
        assert_eq!(config.tipping.grid_points, 100);
        assert_eq!(config.feedback.min_cycle_len, 3);
    }

    #[test]
    fn test_invalid_section_is_named() {
        let config = AnalysisConfig {
            tipping: TippingConfig::default().with_grid_points(1),
            ..Default::default()
        };
        match config.validate().unwrap_err() {
            Error::Configuration(msg) => assert!(msg.starts_with("tipping:")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_json_file() {
        let path = std::env::temp_dir().join(format!("risknet-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"trigger": {"neighbor_weight_ratio": 0.7}}"#).unwrap();
        let config = AnalysisConfig::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.trigger.neighbor_weight_ratio, 0.7);

        assert!(matches!(
            AnalysisConfig::from_json_file("/nonexistent/risknet.json"),
            Err(Error::Configuration(_))
        ));
    }
}
