//! One-step influence diffusion over a [`RiskNetwork`].
//!
//! `v' = clamp(v + alpha * (W · v), 0, 1)`
//!
//! This is the single propagation law shared by the cascade, Monte Carlo and
//! tipping-point analyses. They differ only in how the level vector is
//! initialised, how many steps they run and what they record.

use serde::{Deserialize, Serialize};

use super::RiskNetwork;
use crate::consts::DEFAULT_DIFFUSION_ALPHA;
use crate::errors::{Error, Result};

/// Configuration for the diffusion step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffusionConfig {
    /// Influence coefficient applied to `W · v`.
    /// Default: 0.1
    pub alpha: f64,
}

impl Default for DiffusionConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_DIFFUSION_ALPHA,
        }
    }
}

impl DiffusionConfig {
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.alpha.is_finite() || self.alpha < 0.0 {
            return Err(format!(
                "diffusion alpha must be finite and >= 0.0, got {}",
                self.alpha
            ));
        }
        Ok(())
    }
}

/// Deterministic diffusion step bound to a read-only network.
#[derive(Debug, Clone, Copy)]
pub struct DiffusionEngine<'a> {
    network: &'a RiskNetwork,
    alpha: f64,
}

impl<'a> DiffusionEngine<'a> {
    pub fn new(network: &'a RiskNetwork, config: &DiffusionConfig) -> Self {
        Self {
            network,
            alpha: config.alpha,
        }
    }

    pub fn network(&self) -> &'a RiskNetwork {
        self.network
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// The `(W · v)_target` term: weighted influence arriving at one node.
    pub(crate) fn influence(&self, target: usize, levels: &[f64]) -> f64 {
        self.network.influence_on(target, levels)
    }

    fn check_len(&self, what: &str, len: usize) -> Result<()> {
        if len != self.network.len() {
            return Err(Error::network(format!(
                "{what} has {len} entries but the network has {} nodes",
                self.network.len()
            )));
        }
        Ok(())
    }

    /// Compute one synchronous update of `levels` into `out`.
    ///
    /// Both slices must have one entry per network node.
    pub fn step(&self, levels: &[f64], out: &mut [f64]) -> Result<()> {
        self.check_len("level vector", levels.len())?;
        self.check_len("output vector", out.len())?;
        self.step_into(levels, out);
        Ok(())
    }

    /// Advance `levels` in place by `steps` diffusion steps.
    pub fn advance(&self, levels: &mut Vec<f64>, steps: usize) -> Result<()> {
        self.check_len("level vector", levels.len())?;
        self.propagate(levels, steps);
        Ok(())
    }

    fn step_into(&self, levels: &[f64], out: &mut [f64]) {
        for (i, slot) in out.iter_mut().enumerate() {
            let influence = self.influence(i, levels);
            *slot = (levels[i] + self.alpha * influence).clamp(0.0, 1.0);
        }
    }

    /// [`advance`](Self::advance) for level vectors already built in network order.
    pub(crate) fn propagate(&self, levels: &mut Vec<f64>, steps: usize) {
        let mut scratch = vec![0.0; levels.len()];
        for _ in 0..steps {
            self.step_into(levels, &mut scratch);
            std::mem::swap(levels, &mut scratch);
        }
    }

    /// Advance `levels` by `steps` and return the aggregate (sum) impact.
    pub(crate) fn run_aggregate(&self, mut levels: Vec<f64>, steps: usize) -> f64 {
        self.propagate(&mut levels, steps);
        levels.iter().sum()
    }
}
