//! Monte Carlo aggregation of compounded risk impact.
//!
//! # Model
//!
//! For each trial:
//! 1. Sample every risk's initial level from `Beta(a, b) * base_impact`
//!    (Beta(2, 2) by default: mass around the nominal estimate, not a point)
//! 2. Advance the diffusion step for `horizon` steps
//! 3. Record the sum of the final levels as the trial's aggregate impact
//!
//! Trials are independent. Each trial owns a generator seeded from a master
//! generator before fan-out, so a fixed seed gives identical statistics
//! whether trials run on the rayon pool or sequentially.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Beta, Distribution};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::consts::{DEFAULT_HORIZON, DEFAULT_NUM_SIMULATIONS};
use crate::errors::{Error, Result};
use crate::network::DiffusionEngine;
use crate::stats;
use crate::types::{Risk, SimulationResult};

/// Configuration for the Monte Carlo impact aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloConfig {
    /// Number of independent trials.
    /// Default: 1000
    pub num_simulations: usize,

    /// Diffusion steps per trial.
    /// Default: 10
    pub horizon: usize,

    /// Beta shape parameters for the initial level multiplier.
    /// Default: 2.0 / 2.0
    pub beta_alpha: f64,
    pub beta_beta: f64,

    /// Random seed (None = seed from entropy).
    /// Default: None
    pub random_seed: Option<u64>,

    /// Spread trials across the rayon pool.
    /// Default: true
    pub parallel: bool,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            num_simulations: DEFAULT_NUM_SIMULATIONS,
            horizon: DEFAULT_HORIZON,
            beta_alpha: 2.0,
            beta_beta: 2.0,
            random_seed: None,
            parallel: true,
        }
    }
}

impl MonteCarloConfig {
    pub fn with_num_simulations(mut self, num_simulations: usize) -> Self {
        self.num_simulations = num_simulations;
        self
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.num_simulations == 0 {
            return Err("num_simulations must be > 0, got 0".to_string());
        }
        if self.horizon == 0 {
            return Err("monte carlo horizon must be > 0, got 0".to_string());
        }
        if !(self.beta_alpha.is_finite() && self.beta_alpha > 0.0) {
            return Err(format!(
                "beta_alpha must be finite and > 0.0, got {}",
                self.beta_alpha
            ));
        }
        if !(self.beta_beta.is_finite() && self.beta_beta > 0.0) {
            return Err(format!(
                "beta_beta must be finite and > 0.0, got {}",
                self.beta_beta
            ));
        }
        Ok(())
    }
}

/// One trial's final level vector and its aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSample {
    /// Final levels in network order.
    pub levels: Vec<f64>,
    /// Sum of `levels`.
    pub aggregate: f64,
}

/// Summary of the aggregate-impact distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateImpact {
    pub mean: f64,
    pub median: f64,
    pub percentile_95: f64,
    pub max: f64,
    pub min: f64,
    pub std_dev: f64,
    pub num_simulations: usize,
}

/// All samples of one Monte Carlo run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloOutcome {
    pub samples: Vec<SimulationSample>,
}

impl MonteCarloOutcome {
    /// Aggregate impact of every trial, in trial order.
    pub fn impact_distribution(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.aggregate).collect()
    }

    pub fn statistics(&self) -> AggregateImpact {
        let mut values = self.impact_distribution();
        let mean = stats::mean(&values);
        let std_dev = stats::std_dev(&values);
        stats::sort_ascending(&mut values);

        AggregateImpact {
            mean,
            median: stats::median_sorted(&values),
            percentile_95: stats::percentile_sorted(&values, 95.0),
            max: values.last().copied().unwrap_or(0.0),
            min: values.first().copied().unwrap_or(0.0),
            std_dev,
            num_simulations: values.len(),
        }
    }

    /// The aggregate-impact distribution in the shape resilience scoring uses.
    pub fn to_simulation_result(&self) -> SimulationResult {
        SimulationResult::new(self.impact_distribution())
    }
}

/// Monte Carlo aggregator over a shared, read-only network.
#[derive(Debug, Clone)]
pub struct MonteCarloAggregator<'a> {
    engine: DiffusionEngine<'a>,
    config: MonteCarloConfig,
    beta: Beta<f64>,
}

impl<'a> MonteCarloAggregator<'a> {
    pub fn new(engine: DiffusionEngine<'a>, config: MonteCarloConfig) -> Result<Self> {
        config.validate().map_err(Error::Configuration)?;
        let beta = Beta::new(config.beta_alpha, config.beta_beta)
            .map_err(|e| Error::Configuration(format!("invalid beta distribution: {e}")))?;
        Ok(Self {
            engine,
            config,
            beta,
        })
    }

    pub fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    /// Run all trials with the configured seed (or entropy).
    pub fn run(&self, risks: &[Risk]) -> Result<MonteCarloOutcome> {
        let mut rng = match self.config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.run_with_rng(risks, &mut rng)
    }

    /// Run all trials, deriving per-trial generators from `rng`.
    pub fn run_with_rng<R: Rng>(
        &self,
        risks: &[Risk],
        rng: &mut R,
    ) -> Result<MonteCarloOutcome> {
        let network = self.engine.network();
        if network.is_empty() || risks.is_empty() {
            return Err(Error::degenerate(
                "monte carlo aggregation requires a non-empty risk set",
            ));
        }
        let base_impacts = network.node_values(risks, Risk::impact)?;

        let trial_seeds: Vec<u64> = (0..self.config.num_simulations)
            .map(|_| rng.gen())
            .collect();

        let samples: Vec<SimulationSample> = if self.config.parallel {
            trial_seeds
                .par_iter()
                .map(|&seed| self.run_trial(seed, &base_impacts))
                .collect()
        } else {
            trial_seeds
                .iter()
                .map(|&seed| self.run_trial(seed, &base_impacts))
                .collect()
        };

        debug!(
            trials = samples.len(),
            horizon = self.config.horizon,
            "Monte Carlo trials complete"
        );
        Ok(MonteCarloOutcome { samples })
    }

    /// Run all trials and summarise the aggregate-impact distribution.
    pub fn aggregate(&self, risks: &[Risk]) -> Result<AggregateImpact> {
        let stats = self.run(risks)?.statistics();
        info!(
            mean = stats.mean,
            median = stats.median,
            p95 = stats.percentile_95,
            max = stats.max,
            "Aggregate impact estimated"
        );
        Ok(stats)
    }

    fn run_trial(&self, seed: u64, base_impacts: &[f64]) -> SimulationSample {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut levels: Vec<f64> = base_impacts
            .iter()
            .map(|&base| self.beta.sample(&mut rng) * base)
            .collect();
        self.engine.propagate(&mut levels, self.config.horizon);
        let aggregate = levels.iter().sum();
        SimulationSample { levels, aggregate }
    }
}
