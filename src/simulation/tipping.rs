//! Tipping point detection.
//!
//! For each risk, sweep its level over an even grid on `[0, 1]` while every
//! other risk stays at its base impact, run the diffusion step forward and
//! record the aggregate impact. A tipping point is the first grid index whose
//! successive difference exceeds `mean + k * std` of all differences.
//!
//! No entry for a risk means its response curve has no disproportionate jump.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::consts::{DEFAULT_GRID_POINTS, DEFAULT_HORIZON, EPSILON};
use crate::errors::{Error, Result};
use crate::network::DiffusionEngine;
use crate::stats;
use crate::types::{Risk, RiskId};

/// Minimum margin by which a difference must exceed the threshold.
const JUMP_MARGIN: f64 = 1e-12;

/// Configuration for tipping point detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TippingConfig {
    /// Grid points spanning `[0, 1]`, endpoints included.
    /// Default: 100
    pub grid_points: usize,

    /// Diffusion steps per grid evaluation.
    /// Default: 10
    pub horizon: usize,

    /// Standard deviations above the mean difference that flag a jump.
    /// Default: 2.0
    pub sigma_multiplier: f64,
}

impl Default for TippingConfig {
    fn default() -> Self {
        Self {
            grid_points: DEFAULT_GRID_POINTS,
            horizon: DEFAULT_HORIZON,
            sigma_multiplier: 2.0,
        }
    }
}

impl TippingConfig {
    pub fn with_grid_points(mut self, grid_points: usize) -> Self {
        self.grid_points = grid_points;
        self
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_sigma_multiplier(mut self, sigma_multiplier: f64) -> Self {
        self.sigma_multiplier = sigma_multiplier;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.grid_points < 3 {
            return Err(format!(
                "tipping grid_points must be >= 3, got {}",
                self.grid_points
            ));
        }
        if self.horizon == 0 {
            return Err("tipping horizon must be > 0, got 0".to_string());
        }
        if !self.sigma_multiplier.is_finite() || self.sigma_multiplier < 0.0 {
            return Err(format!(
                "sigma_multiplier must be finite and >= 0.0, got {}",
                self.sigma_multiplier
            ));
        }
        Ok(())
    }

    /// Evenly spaced sweep levels on `[0, 1]`.
    pub fn grid(&self) -> Vec<f64> {
        let last = (self.grid_points - 1) as f64;
        (0..self.grid_points).map(|k| k as f64 / last).collect()
    }
}

/// A detected tipping point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TippingPoint {
    pub risk: RiskId,
    pub description: String,
    /// Swept level at which the jump starts.
    pub level: f64,
    /// Aggregate impact at that level.
    pub aggregate_impact: f64,
    pub grid_index: usize,
}

/// Aggregate-impact response of one swept risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseCurve {
    pub risk: RiskId,
    pub levels: Vec<f64>,
    pub aggregates: Vec<f64>,
}

impl ResponseCurve {
    /// Successive differences of the aggregate impact.
    pub fn derivative(&self) -> Vec<f64> {
        self.aggregates.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// Index of the first difference exceeding `mean + k * std`.
    pub fn first_jump(&self, sigma_multiplier: f64) -> Option<usize> {
        let diffs = self.derivative();
        let spread = stats::std_dev(&diffs);
        if diffs.is_empty() || spread <= EPSILON {
            return None;
        }
        let threshold = stats::mean(&diffs) + sigma_multiplier * spread;
        diffs.iter().position(|&d| d - threshold > JUMP_MARGIN)
    }
}

/// Sweeps risk levels against a shared, read-only network.
#[derive(Debug, Clone)]
pub struct TippingPointDetector<'a> {
    engine: DiffusionEngine<'a>,
    config: TippingConfig,
}

impl<'a> TippingPointDetector<'a> {
    pub fn new(engine: DiffusionEngine<'a>, config: TippingConfig) -> Result<Self> {
        config.validate().map_err(Error::Configuration)?;
        Ok(Self { engine, config })
    }

    pub fn config(&self) -> &TippingConfig {
        &self.config
    }

    /// Aggregate-impact response curve of one risk, others held at their impact.
    pub fn response_curve(&self, risks: &[Risk], risk: RiskId) -> Result<ResponseCurve> {
        let base_impacts = self.base_impacts(risks)?;
        let node = self.node_of(risk)?;
        Ok(self.curve_at(&base_impacts, node))
    }

    fn curve_at(&self, base_impacts: &[f64], node: usize) -> ResponseCurve {
        let levels = self.config.grid();
        let aggregates = levels
            .iter()
            .map(|&level| {
                let mut start = base_impacts.to_vec();
                start[node] = level;
                self.engine.run_aggregate(start, self.config.horizon)
            })
            .collect();
        ResponseCurve {
            risk: self.engine.network().id_at(node),
            levels,
            aggregates,
        }
    }

    /// Detect tipping points for every risk; sweeps run in parallel.
    pub fn detect(&self, risks: &[Risk]) -> Result<Vec<TippingPoint>> {
        let base_impacts = self.base_impacts(risks)?;
        let network = self.engine.network();

        let points: Vec<TippingPoint> = (0..network.len())
            .into_par_iter()
            .filter_map(|node| self.detect_node(risks, &base_impacts, node))
            .collect();

        info!(
            risks = network.len(),
            tipping_points = points.len(),
            "Tipping point sweep complete"
        );
        Ok(points)
    }

    /// Detect the tipping point of a single risk.
    pub fn detect_for(&self, risks: &[Risk], risk: RiskId) -> Result<Option<TippingPoint>> {
        let base_impacts = self.base_impacts(risks)?;
        let node = self.node_of(risk)?;
        Ok(self.detect_node(risks, &base_impacts, node))
    }

    fn node_of(&self, risk: RiskId) -> Result<usize> {
        self.engine
            .network()
            .index_of(risk)
            .ok_or_else(|| Error::network(format!("unknown risk {risk} for tipping sweep")))
    }

    fn base_impacts(&self, risks: &[Risk]) -> Result<Vec<f64>> {
        let network = self.engine.network();
        if network.is_empty() || risks.is_empty() {
            return Err(Error::degenerate(
                "tipping point sweep requires a non-empty risk set",
            ));
        }
        network.node_values(risks, Risk::impact)
    }

    fn detect_node(&self, risks: &[Risk], base_impacts: &[f64], node: usize) -> Option<TippingPoint> {
        let curve = self.curve_at(base_impacts, node);
        let index = curve.first_jump(self.config.sigma_multiplier)?;
        let description = risks
            .iter()
            .find(|r| r.id() == curve.risk)
            .map(|r| r.description().to_string())
            .unwrap_or_default();

        debug!(
            risk = %curve.risk,
            level = curve.levels[index],
            "Tipping point detected"
        );
        Some(TippingPoint {
            risk: curve.risk,
            description,
            level: curve.levels[index],
            aggregate_impact: curve.aggregates[index],
            grid_index: index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{DiffusionConfig, RiskNetwork};

    fn risks(impacts: &[f64]) -> Vec<Risk> {
        impacts
            .iter()
            .enumerate()
            .map(|(i, &impact)| {
                Risk::new(RiskId(i as u32 + 1), format!("risk {i}"), "", "", 0.5, impact).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_grid_spans_unit_interval() {
        let grid = TippingConfig::default().grid();
        assert_eq!(grid.len(), 100);
        assert_eq!(grid[0], 0.0);
        assert_eq!(grid[99], 1.0);
    }

    #[test]
    fn test_zero_weights_never_tip() {
        let risks = risks(&[0.3, 0.5, 0.8]);
        let net = RiskNetwork::from_matrix(&risks, vec![vec![0.0; 3]; 3]).unwrap();
        let engine = DiffusionEngine::new(&net, &DiffusionConfig::default());
        let detector = TippingPointDetector::new(engine, TippingConfig::default()).unwrap();

        assert!(detector.detect(&risks).unwrap().is_empty());
    }

    #[test]
    fn test_flat_curve_has_no_jump() {
        let curve = ResponseCurve {
            risk: RiskId(1),
            levels: vec![0.0, 0.5, 1.0],
            aggregates: vec![2.0, 2.0, 2.0],
        };
        assert_eq!(curve.first_jump(2.0), None);
    }

    #[test]
    fn test_step_response_is_detected() {
        let mut aggregates: Vec<f64> = (0..20).map(|k| k as f64 * 0.01).collect();
        aggregates.extend((20..40).map(|k| 1.0 + k as f64 * 0.01));
        let curve = ResponseCurve {
            risk: RiskId(1),
            levels: (0..40).map(|k| k as f64 / 39.0).collect(),
            aggregates,
        };
        assert_eq!(curve.first_jump(2.0), Some(19));
    }

    #[test]
    fn test_saturating_network_reports_consistent_points() {
        let risks = risks(&[0.2, 0.9, 0.9]);
        let net = RiskNetwork::from_matrix(
            &risks,
            vec![
                vec![0.0, 0.9, 0.9],
                vec![0.9, 0.0, 0.9],
                vec![0.9, 0.9, 0.0],
            ],
        )
        .unwrap();
        let engine = DiffusionEngine::new(&net, &DiffusionConfig::default());
        let detector = TippingPointDetector::new(engine, TippingConfig::default()).unwrap();

        for point in detector.detect(&risks).unwrap() {
            assert!((0.0..=1.0).contains(&point.level));
            assert!(point.aggregate_impact <= 3.0);
            let curve = detector.response_curve(&risks, point.risk).unwrap();
            assert_eq!(curve.risk, point.risk);
            assert_eq!(curve.aggregates[point.grid_index], point.aggregate_impact);
        }
    }

    #[test]
    fn test_response_curve_rejects_unknown_risks() {
        let risks = risks(&[0.3, 0.5]);
        let net = RiskNetwork::from_matrix(&risks, vec![vec![0.0; 2]; 2]).unwrap();
        let engine = DiffusionEngine::new(&net, &DiffusionConfig::default());
        let detector = TippingPointDetector::new(engine, TippingConfig::default()).unwrap();

        let curve = detector.response_curve(&risks, RiskId(1)).unwrap();
        assert_eq!(curve.levels.len(), curve.aggregates.len());
        assert!(matches!(
            detector.response_curve(&risks, RiskId(9)).unwrap_err(),
            Error::InvalidNetworkInput { .. }
        ));
        // A risk list missing a network node cannot seed the sweep.
        assert!(detector.response_curve(&risks[..1], RiskId(1)).is_err());
    }

    #[test]
    fn test_detect_for_single_risk() {
        let risks = risks(&[0.3, 0.5]);
        let net = RiskNetwork::from_matrix(&risks, vec![vec![0.0; 2]; 2]).unwrap();
        let engine = DiffusionEngine::new(&net, &DiffusionConfig::default());
        let detector = TippingPointDetector::new(engine, TippingConfig::default()).unwrap();

        assert_eq!(detector.detect_for(&risks, RiskId(2)).unwrap(), None);
        assert!(detector.detect_for(&risks, RiskId(9)).is_err());
    }

    #[test]
    fn test_empty_and_invalid() {
        let net = RiskNetwork::from_matrix(&[], vec![]).unwrap();
        let engine = DiffusionEngine::new(&net, &DiffusionConfig::default());
        let detector = TippingPointDetector::new(engine, TippingConfig::default()).unwrap();
        assert!(matches!(
            detector.detect(&[]).unwrap_err(),
            Error::DegenerateComputation { .. }
        ));

        assert!(TippingPointDetector::new(engine, TippingConfig::default().with_grid_points(2)).is_err());
        assert!(TippingPointDetector::new(
            engine,
            TippingConfig::default().with_sigma_multiplier(-1.0)
        )
        .is_err());
    }
}
