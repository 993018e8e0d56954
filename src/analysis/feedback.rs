//! Feedback loop detection: simple cycles of three or more risks.
//!
//! Each cycle is rooted at its smallest network index and only extended
//! through larger indices, so every cycle is found exactly once (undirected
//! cycles additionally fix their orientation). Two-node mutual edges and
//! self-loops never qualify.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::{Error, Result};
use crate::network::RiskNetwork;
use crate::types::RiskId;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// Minimum number of distinct risks in a loop.
    /// Default: 3
    pub min_cycle_len: usize,

    /// Enumeration stops after this many loops.
    /// Default: 100_000
    pub max_cycles: usize,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            min_cycle_len: 3,
            max_cycles: 100_000,
        }
    }
}

impl FeedbackConfig {
    pub fn with_min_cycle_len(mut self, min_cycle_len: usize) -> Self {
        self.min_cycle_len = min_cycle_len;
        self
    }

    pub fn with_max_cycles(mut self, max_cycles: usize) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.min_cycle_len < 3 {
            return Err(format!(
                "min_cycle_len must be >= 3, got {}",
                self.min_cycle_len
            ));
        }
        if self.max_cycles == 0 {
            return Err("max_cycles must be > 0, got 0".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackLoops {
    /// Each loop lists its risks in traversal order, closing back on the first.
    pub cycles: Vec<Vec<RiskId>>,
    /// More than `max_cycles` loops exist; `cycles` holds the first `max_cycles`.
    pub truncated: bool,
}

impl FeedbackLoops {
    pub fn len(&self) -> usize {
        self.cycles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty()
    }
}

pub struct FeedbackLoopDetector<'a> {
    network: &'a RiskNetwork,
    config: FeedbackConfig,
}

impl<'a> FeedbackLoopDetector<'a> {
    pub fn new(network: &'a RiskNetwork, config: FeedbackConfig) -> Result<Self> {
        config.validate().map_err(Error::Configuration)?;
        Ok(Self { network, config })
    }

    pub fn detect(&self) -> FeedbackLoops {
        let mut search = CycleSearch {
            network: self.network,
            config: &self.config,
            path: Vec::new(),
            on_path: vec![false; self.network.len()],
            found: Vec::new(),
            truncated: false,
        };

        for start in 0..self.network.len() {
            if search.truncated {
                break;
            }
            search.path.push(start);
            search.on_path[start] = true;
            search.extend(start, start);
            search.on_path[start] = false;
            search.path.pop();
        }

        let truncated = search.truncated;
        if truncated {
            warn!(
                max_cycles = self.config.max_cycles,
                "Feedback loop enumeration truncated"
            );
        }
        let cycles: Vec<Vec<RiskId>> = search
            .found
            .into_iter()
            .map(|cycle| cycle.into_iter().map(|i| self.network.id_at(i)).collect())
            .collect();
        info!(loops = cycles.len(), truncated, "Feedback loops identified");
        FeedbackLoops { cycles, truncated }
    }
}

struct CycleSearch<'a> {
    network: &'a RiskNetwork,
    config: &'a FeedbackConfig,
    path: Vec<usize>,
    on_path: Vec<bool>,
    found: Vec<Vec<usize>>,
    /// Set when a loop closes after `max_cycles` were already recorded.
    truncated: bool,
}

impl CycleSearch<'_> {
    fn record(&mut self) {
        if self.found.len() >= self.config.max_cycles {
            self.truncated = true;
        } else {
            self.found.push(self.path.clone());
        }
    }

    fn extend(&mut self, start: usize, node: usize) {
        let network = self.network;
        for (next, _) in network.neighbors(node) {
            if self.truncated {
                return;
            }
            if next == start {
                if self.closes_new_cycle() {
                    self.record();
                }
            } else if next > start && !self.on_path[next] {
                self.path.push(next);
                self.on_path[next] = true;
                self.extend(start, next);
                self.on_path[next] = false;
                self.path.pop();
            }
        }
    }

    fn closes_new_cycle(&self) -> bool {
        let len = self.path.len();
        if len < self.config.min_cycle_len {
            return false;
        }
        // An undirected cycle is walked both ways; keep one orientation.
        self.network.is_directed() || self.path[1] < self.path[len - 1]
    }
}
