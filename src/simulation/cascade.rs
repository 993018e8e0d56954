//! Threshold cascade simulation.
//!
//! Seed risks start fully active (1.0) at step 0. At every step each inactive
//! risk receives the weighted activation of its already-active neighbours
//! (`(W · a)_i`, the same influence term the diffusion step uses); a risk whose
//! influence exceeds the threshold activates at that value and carries it
//! forward. The run stops at quiescence or after `max_steps`.
//!
//! A threshold `<= 0` activates every neighbour of an active node in a single
//! step, and a negative threshold activates every inactive node outright
//! (zero influence already exceeds it). Both behaviours are intentional.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{DEFAULT_CASCADE_THRESHOLD, DEFAULT_HORIZON};
use crate::errors::{Error, Result};
use crate::network::DiffusionEngine;
use crate::types::RiskId;

/// Largest accepted absolute cascade threshold.
const MAX_ABS_THRESHOLD: f64 = 1e6;

/// Configuration for cascade simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeConfig {
    /// Influence a risk must exceed to activate.
    /// Default: 0.5
    pub threshold: f64,

    /// Upper bound on propagation steps.
    /// Default: 10
    pub max_steps: usize,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_CASCADE_THRESHOLD,
            max_steps: DEFAULT_HORIZON,
        }
    }
}

impl CascadeConfig {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.threshold.is_finite() || self.threshold.abs() > MAX_ABS_THRESHOLD {
            return Err(format!(
                "cascade threshold must be finite and within [-{MAX_ABS_THRESHOLD}, {MAX_ABS_THRESHOLD}], got {}",
                self.threshold
            ));
        }
        if self.max_steps == 0 {
            return Err("cascade max_steps must be > 0, got 0".to_string());
        }
        Ok(())
    }
}

/// Lifecycle of one node within a cascade run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    Inactive,
    /// Crossed the threshold at the most recent step.
    Activating,
    Active,
}

/// Step-indexed activation sequences for one cascade run.
///
/// Every ever-activated node holds a sequence of length `steps + 1`; entry `t`
/// is its activation at step `t` (zero before it activated).
#[derive(Debug, Clone)]
pub struct ActivationState {
    sequences: Vec<Option<Vec<f64>>>,
    activated_at: Vec<Option<usize>>,
    steps: usize,
}

impl ActivationState {
    /// Seed nodes at full activation on step 0.
    fn seeded(n: usize, seeds: &[usize]) -> Self {
        let mut sequences = vec![None; n];
        let mut activated_at = vec![None; n];
        for &s in seeds {
            sequences[s] = Some(vec![1.0]);
            activated_at[s] = Some(0);
        }
        Self {
            sequences,
            activated_at,
            steps: 0,
        }
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn active_count(&self) -> usize {
        self.sequences.iter().filter(|s| s.is_some()).count()
    }

    /// False for indices outside the network.
    pub fn is_active(&self, node: usize) -> bool {
        matches!(self.sequences.get(node), Some(Some(_)))
    }

    pub fn state_of(&self, node: usize) -> NodeState {
        match self.activated_at.get(node).copied().flatten() {
            None => NodeState::Inactive,
            Some(t) if t == self.steps && t > 0 => NodeState::Activating,
            Some(_) => NodeState::Active,
        }
    }

    /// Latest activation per node (0 for inactive nodes).
    pub fn latest(&self) -> Vec<f64> {
        self.sequences
            .iter()
            .map(|s| s.as_ref().and_then(|seq| seq.last().copied()).unwrap_or(0.0))
            .collect()
    }

    /// Record one step: newly activated nodes get their value at the new step,
    /// every previously active node carries its last value forward.
    fn advance(&mut self, activations: &[(usize, f64)]) {
        let step = self.steps + 1;
        for seq in self.sequences.iter_mut().flatten() {
            let last = seq.last().copied().unwrap_or(0.0);
            seq.push(last);
        }
        for &(node, value) in activations {
            let mut seq = vec![0.0; step];
            seq.push(value);
            self.sequences[node] = Some(seq);
            self.activated_at[node] = Some(step);
        }
        self.steps = step;
    }
}

/// Activation history of one risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskActivation {
    pub risk: RiskId,
    /// Step at which the risk first became active.
    pub activated_at: usize,
    pub levels: Vec<f64>,
}

/// Result of a cascade run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeOutcome {
    pub seeds: Vec<RiskId>,
    /// Propagation steps performed.
    pub steps: usize,
    /// False when `max_steps` was reached while nodes were still activating.
    pub quiescent: bool,
    /// Ever-activated risks in network order, sequences of equal length.
    pub activations: Vec<RiskActivation>,
}

impl CascadeOutcome {
    pub fn activation_of(&self, risk: RiskId) -> Option<&RiskActivation> {
        self.activations.iter().find(|a| a.risk == risk)
    }

    pub fn activated(&self) -> impl Iterator<Item = RiskId> + '_ {
        self.activations.iter().map(|a| a.risk)
    }
}

/// Threshold cascade simulator over a shared network.
#[derive(Debug, Clone)]
pub struct CascadeSimulator<'a> {
    engine: DiffusionEngine<'a>,
    config: CascadeConfig,
}

impl<'a> CascadeSimulator<'a> {
    pub fn new(engine: DiffusionEngine<'a>, config: CascadeConfig) -> Result<Self> {
        config.validate().map_err(Error::Configuration)?;
        Ok(Self { engine, config })
    }

    pub fn config(&self) -> &CascadeConfig {
        &self.config
    }

    /// Propagate activation from `seeds` until quiescence or `max_steps`.
    pub fn simulate(&self, seeds: &[RiskId]) -> Result<CascadeOutcome> {
        let network = self.engine.network();
        let mut seed_idx = Vec::with_capacity(seeds.len());
        for &id in seeds {
            let idx = network
                .index_of(id)
                .ok_or_else(|| Error::network(format!("unknown cascade seed risk {id}")))?;
            if !seed_idx.contains(&idx) {
                seed_idx.push(idx);
            }
        }

        let n = network.len();
        let mut state = ActivationState::seeded(n, &seed_idx);
        let mut quiescent = false;

        for _ in 0..self.config.max_steps {
            let newly = self.crossings(&state);
            if newly.is_empty() {
                quiescent = true;
                break;
            }

            state.advance(&newly);
            debug!(
                step = state.steps(),
                newly_active = newly.len(),
                total_active = state.active_count(),
                "Cascade step"
            );
        }

        // The step bound may coincide with the last activation.
        if !quiescent {
            quiescent = self.crossings(&state).is_empty();
        }

        let activations = (0..n)
            .filter_map(|i| {
                let levels = state.sequences[i].clone()?;
                Some(RiskActivation {
                    risk: network.id_at(i),
                    activated_at: state.activated_at[i].unwrap_or(0),
                    levels,
                })
            })
            .collect();

        Ok(CascadeOutcome {
            seeds: seed_idx.iter().map(|&i| network.id_at(i)).collect(),
            steps: state.steps(),
            quiescent,
            activations,
        })
    }

    /// Inactive nodes whose incoming influence exceeds the threshold.
    fn crossings(&self, state: &ActivationState) -> Vec<(usize, f64)> {
        let latest = state.latest();
        (0..latest.len())
            .filter(|&i| !state.is_active(i))
            .filter_map(|i| {
                let influence = self.engine.influence(i, &latest);
                (influence > self.config.threshold).then_some((i, influence))
            })
            .collect()
    }

    /// Run independent cascades for several seed sets in parallel.
    pub fn simulate_batch(&self, seed_sets: &[Vec<RiskId>]) -> Result<Vec<CascadeOutcome>> {
        seed_sets
            .par_iter()
            .map(|seeds| self.simulate(seeds))
            .collect()
    }
}
