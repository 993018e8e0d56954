use thiserror::Error;

use crate::types::RiskId;

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while building or analysing a risk network.
///
/// Every variant names the offending value so the caller can fix the input;
/// nothing here is transient and nothing is retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed interaction weights, unknown node references or empty topology.
    #[error("Invalid network input: {reason}")]
    InvalidNetworkInput { reason: String },

    /// Risk record outside its valid domain or duplicated.
    #[error("Invalid risk data for risk {risk}: {reason}")]
    InvalidRiskData { risk: RiskId, reason: String },

    /// Computation is undefined for the supplied data (e.g. zero total impact).
    #[error("Degenerate computation: {context}")]
    DegenerateComputation { context: String },

    /// Rejected configuration value.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
    pub(crate) fn network(reason: impl Into<String>) -> Self {
        Self::InvalidNetworkInput {
            reason: reason.into(),
        }
    }

    pub(crate) fn weight_out_of_range(from: RiskId, to: RiskId, weight: f64) -> Self {
        Self::network(format!(
            "interaction weight {weight} between {from} and {to} is outside [0, 1]"
        ))
    }

    pub(crate) fn unknown_risk(id: RiskId) -> Self {
        Self::network(format!("edge references unknown risk {id}"))
    }

    pub(crate) fn risk_data(risk: RiskId, reason: impl Into<String>) -> Self {
        Self::InvalidRiskData {
            risk,
            reason: reason.into(),
        }
    }

    pub(crate) fn degenerate(context: impl Into<String>) -> Self {
        Self::DegenerateComputation {
            context: context.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let err = Error::weight_out_of_range(RiskId(1), RiskId(2), 1.5);
        let msg = err.to_string();
        assert!(msg.contains("1.5"));
        assert!(msg.contains("R1"));
        assert!(msg.contains("R2"));

        let err = Error::risk_data(RiskId(7), "impact 2 is outside [0, 1]");
        assert!(err.to_string().contains("R7"));

        let err = Error::Configuration("num_simulations must be > 0, got 0".into());
        assert!(err.to_string().starts_with("Configuration error"));
    }
}
