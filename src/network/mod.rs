//! Risk interaction network and the shared diffusion primitive.
//!
//! # Architecture
//!
//! ```text
//! Risks + InteractionSource
//!          |
//!          v
//! +------------------+
//! |   RiskNetwork    |  <- immutable, shared read-only by every analysis
//! +------------------+
//!          |
//!          v
//! +------------------+
//! | DiffusionEngine  |  <- v' = clamp(v + alpha * W.v, 0, 1)
//! +------------------+
//!     |      |      |
//!     v      v      v
//!  Cascade  Monte  Tipping
//!           Carlo  points
//! ```

mod builder;
mod diffusion;

pub use builder::{Edge, Interaction, InteractionSource, RiskNetwork, Topology};
pub use diffusion::{DiffusionConfig, DiffusionEngine};
