#![deny(unreachable_pub)]

// Core modules
mod consts;
mod errors;
pub mod stats;
pub mod types;

// Network and simulations
pub mod network;
pub mod simulation;

// Structural analyses
pub mod analysis;
pub mod extraction;

// Pipeline
mod analyzer;
mod config;

#[cfg(test)]
mod tests;

// Re-exports
pub use analysis::{
    FeedbackConfig, FeedbackLoopDetector, FeedbackLoops, NetworkResilience, ResilienceAnalyzer,
    ResilienceMetrics, SystemicFactor, SystemicRisk, TriggerConfig, TriggerPoint,
    TriggerPointIdentifier, UncertaintyConfig,
};
pub use analyzer::{AnalysisInput, AnalysisReport, RiskAnalyzer};
pub use config::AnalysisConfig;
pub use consts::{
    DEFAULT_CASCADE_THRESHOLD, DEFAULT_DIFFUSION_ALPHA, DEFAULT_GRID_POINTS, DEFAULT_HORIZON,
    DEFAULT_NUM_SIMULATIONS, EPSILON,
};
pub use errors::{Error, Result};
pub use network::{
    DiffusionConfig, DiffusionEngine, Interaction, InteractionSource, RiskNetwork, Topology,
};
pub use simulation::{
    AggregateImpact, CascadeConfig, CascadeOutcome, CascadeSimulator, MonteCarloAggregator,
    MonteCarloConfig, TippingConfig, TippingPoint, TippingPointDetector,
};
pub use types::*;
