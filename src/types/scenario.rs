use serde::{Deserialize, Serialize};

use super::RiskId;
use crate::errors::{Error, Result};

/// One risk's estimated impact under a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactSample {
    pub risk: RiskId,
    pub impact: f64,
}

impl ImpactSample {
    pub fn new(risk: RiskId, impact: f64) -> Self {
        Self { risk, impact }
    }
}

/// Validate a scenario's impact samples: non-empty, finite, non-negative.
pub(crate) fn validate_samples(scenario: &str, samples: &[ImpactSample]) -> Result<()> {
    if samples.is_empty() {
        return Err(Error::degenerate(format!(
            "scenario '{scenario}' has no impact samples"
        )));
    }
    for s in samples {
        if !s.impact.is_finite() || s.impact < 0.0 {
            return Err(Error::risk_data(
                s.risk,
                format!(
                    "impact sample {} in scenario '{scenario}' must be finite and >= 0",
                    s.impact
                ),
            ));
        }
    }
    Ok(())
}

/// A simulated impact distribution for one scenario input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub impact_distribution: Vec<f64>,
}

impl SimulationResult {
    pub fn new(impact_distribution: Vec<f64>) -> Self {
        Self {
            impact_distribution,
        }
    }

    /// Population variance of the distribution (0 when empty).
    pub fn variance(&self) -> f64 {
        crate::stats::variance(&self.impact_distribution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_samples() {
        assert!(validate_samples("s", &[ImpactSample::new(RiskId(1), 0.4)]).is_ok());

        let err = validate_samples("s", &[]).unwrap_err();
        assert!(matches!(err, Error::DegenerateComputation { .. }));

        let err = validate_samples("s", &[ImpactSample::new(RiskId(2), -0.1)]).unwrap_err();
        assert!(matches!(err, Error::InvalidRiskData { risk: RiskId(2), .. }));
    }

    #[test]
    fn test_simulation_variance() {
        let result = SimulationResult::new(vec![1.0, 2.0, 3.0, 4.0]);
        assert!((result.variance() - 1.25).abs() < 1e-12);
        assert_eq!(SimulationResult::default().variance(), 0.0);
    }
}
