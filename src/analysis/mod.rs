//! Structural analyses that read the network directly.
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |   RiskNetwork    |
//! +------------------+
//!     |      |      |
//!     v      v      v
//! +-------+ +-------+ +--------+
//! |Trigger| |Resil. | |Feedback|  <- centrality, clustering, cycles
//! +-------+ +-------+ +--------+
//!               ^
//!               |
//!   scenario impact samples + simulation results
//! ```
//!
//! `systemic` and `uncertainty` work on risk descriptions and
//! cross-scenario scores and do not touch the network.

mod centrality;
mod feedback;
mod resilience;
mod systemic;
mod trigger;
mod uncertainty;

pub use centrality::betweenness_centrality;
pub use feedback::{FeedbackConfig, FeedbackLoopDetector, FeedbackLoops};
pub use resilience::{
    assess_resilience, average_clustering, average_shortest_path_length, degree_assortativity,
    density, resilience_score, NetworkResilience, ResilienceAnalyzer, ResilienceMetrics,
    ScenarioImpactMetrics, Weighting,
};
pub use systemic::{
    analyze_systemic_risks, is_systemic, SystemicFactor, SystemicRisk, SYSTEMIC_KEYWORDS,
};
pub use trigger::{
    external_factors, TriggerConfig, TriggerPoint, TriggerPointIdentifier, INDICATOR_KEYWORDS,
};
pub use uncertainty::{
    cross_scenario_scores, extract_scores, identify_key_uncertainties, CrossScenarioScores,
    ScenarioScores, UncertaintyConfig,
};
