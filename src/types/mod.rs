//! Shared data model for the risk network engine.
//!
//! This module contains the caller-owned input records (risks, external
//! indicators, per-scenario impact samples) consumed by every analysis.

mod external;
mod risk;
mod scenario;

pub use external::*;
pub use risk::*;
pub use scenario::*;
