//! Simulations driven by the shared diffusion primitive.
//!
//! - `cascade`: threshold activation from a seed set until quiescence
//! - `monte_carlo`: Beta-sampled initial levels, aggregate impact distribution
//! - `tipping`: per-risk level sweeps and response-curve jump detection
//!
//! Every simulator borrows a [`DiffusionEngine`](crate::network::DiffusionEngine)
//! bound to one immutable network and owns only its per-run state.

pub mod cascade;
pub mod monte_carlo;
pub mod tipping;

pub use cascade::{
    ActivationState, CascadeConfig, CascadeOutcome, CascadeSimulator, NodeState, RiskActivation,
};
pub use monte_carlo::{
    AggregateImpact, MonteCarloAggregator, MonteCarloConfig, MonteCarloOutcome, SimulationSample,
};
pub use tipping::{ResponseCurve, TippingConfig, TippingPoint, TippingPointDetector};
