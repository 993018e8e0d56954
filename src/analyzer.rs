//! End-to-end analysis pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::{
    analyze_systemic_risks, assess_resilience, cross_scenario_scores, identify_key_uncertainties,
    CrossScenarioScores, FeedbackLoopDetector, FeedbackLoops, NetworkResilience,
    ResilienceAnalyzer, SystemicRisk, TriggerPoint, TriggerPointIdentifier,
};
use crate::config::AnalysisConfig;
use crate::errors::{Error, Result};
use crate::network::{DiffusionEngine, InteractionSource, RiskNetwork, Topology};
use crate::simulation::{
    AggregateImpact, CascadeOutcome, CascadeSimulator, MonteCarloAggregator, TippingPoint,
    TippingPointDetector,
};
use crate::types::{ExternalDataTable, ImpactSample, Risk, RiskId, SimulationResult};

/// Everything one analysis run consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub risks: Vec<Risk>,
    pub interactions: InteractionSource,
    #[serde(default)]
    pub topology: Topology,
    #[serde(default)]
    pub external_data: ExternalDataTable,
    /// One cascade is simulated per seed set.
    #[serde(default)]
    pub cascade_seeds: Vec<Vec<RiskId>>,
    #[serde(default)]
    pub scenario_impacts: BTreeMap<String, Vec<ImpactSample>>,
    #[serde(default)]
    pub simulation_results: BTreeMap<String, Vec<SimulationResult>>,
    /// Structured per-risk, per-scenario scores.
    #[serde(default)]
    pub scenario_scores: CrossScenarioScores,
    /// Per-scenario narrative text by risk; scores are extracted best-effort
    /// and never override an entry in `scenario_scores`.
    #[serde(default)]
    pub scenario_narratives: BTreeMap<String, BTreeMap<RiskId, String>>,
    #[serde(default)]
    pub key_dependencies: Vec<String>,
}

impl AnalysisInput {
    pub fn new(risks: Vec<Risk>, interactions: InteractionSource) -> Self {
        Self {
            risks,
            interactions,
            topology: Topology::default(),
            external_data: ExternalDataTable::default(),
            cascade_seeds: Vec::new(),
            scenario_impacts: BTreeMap::new(),
            simulation_results: BTreeMap::new(),
            scenario_scores: CrossScenarioScores::new(),
            scenario_narratives: BTreeMap::new(),
            key_dependencies: Vec::new(),
        }
    }

    /// Explicit scores merged over scores extracted from narratives.
    pub fn merged_scores(&self) -> CrossScenarioScores {
        let mut merged = cross_scenario_scores(&self.scenario_narratives);
        for (risk, by_scenario) in &self.scenario_scores {
            let entry = merged.entry(*risk).or_default();
            for (scenario, scores) in by_scenario {
                entry.insert(scenario.clone(), *scores);
            }
        }
        merged
    }
}

/// Result records of one analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub risk_count: usize,
    pub interaction_count: usize,
    pub topology: Topology,
    pub aggregate_impact: AggregateImpact,
    pub tipping_points: Vec<TippingPoint>,
    pub trigger_points: Vec<TriggerPoint>,
    pub cascades: Vec<CascadeOutcome>,
    pub feedback_loops: FeedbackLoops,
    pub network_resilience: NetworkResilience,
    /// Metric name to value.
    pub system_resilience: BTreeMap<String, f64>,
    /// Scenario name to combined resilience score.
    pub resilience_scores: BTreeMap<String, f64>,
    pub systemic_risks: Vec<SystemicRisk>,
    pub key_uncertainties: Vec<RiskId>,
}

/// Runs every analysis over one input with a fixed configuration.
#[derive(Debug, Clone)]
pub struct RiskAnalyzer {
    config: AnalysisConfig,
}

impl RiskAnalyzer {
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn analyze(&self, input: &AnalysisInput) -> Result<AnalysisReport> {
        if input.risks.is_empty() {
            return Err(Error::degenerate("analysis requires at least one risk"));
        }
        let network = RiskNetwork::build(&input.risks, &input.interactions, input.topology)?;
        let engine = DiffusionEngine::new(&network, &self.config.diffusion);
        let config = &self.config;

        let aggregate_impact =
            MonteCarloAggregator::new(engine, config.monte_carlo.clone())?.aggregate(&input.risks)?;
        let tipping_points =
            TippingPointDetector::new(engine, config.tipping.clone())?.detect(&input.risks)?;
        let trigger_points = TriggerPointIdentifier::new(&network, config.trigger.clone())?
            .identify(&input.risks, &input.external_data)?;
        let cascades = CascadeSimulator::new(engine, config.cascade.clone())?
            .simulate_batch(&input.cascade_seeds)?;
        let feedback_loops = FeedbackLoopDetector::new(&network, config.feedback.clone())?.detect();

        let resilience = ResilienceAnalyzer::new(&network);
        let network_resilience = resilience.network_resilience();
        let system_resilience = resilience
            .system_resilience(&input.risks, &input.scenario_impacts)?
            .as_map();
        let resilience_scores = if input.simulation_results.is_empty() {
            BTreeMap::new()
        } else {
            assess_resilience(&input.scenario_impacts, &input.simulation_results)?
        };

        let systemic_risks = analyze_systemic_risks(&input.risks, &input.key_dependencies);
        let key_uncertainties =
            identify_key_uncertainties(&input.merged_scores(), &config.uncertainty);

        let report = AnalysisReport {
            risk_count: network.len(),
            interaction_count: network.edge_count(),
            topology: network.topology(),
            aggregate_impact,
            tipping_points,
            trigger_points,
            cascades,
            feedback_loops,
            network_resilience,
            system_resilience,
            resilience_scores,
            systemic_risks,
            key_uncertainties,
        };
        info!(
            risks = report.risk_count,
            interactions = report.interaction_count,
            tipping_points = report.tipping_points.len(),
            trigger_points = report.trigger_points.len(),
            feedback_loops = report.feedback_loops.len(),
            "Risk analysis complete"
        );
        Ok(report)
    }
}
