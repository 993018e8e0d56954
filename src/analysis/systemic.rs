//! Systemic risk classification by description keywords.
//!
//! Keyword matching is case-insensitive substring search. It is a heuristic:
//! a description that says "worldwide" instead of "global" is not flagged.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{Risk, RiskId};

/// Description keywords marking a risk as systemic.
pub const SYSTEMIC_KEYWORDS: &[&str] = &[
    "market-wide",
    "industry-wide",
    "global",
    "systemic",
    "interconnected",
];

/// Broad system a systemic risk propagates through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemicFactor {
    FinancialSystem,
    SupplyChain,
    Geopolitical,
    Other,
}

impl SystemicFactor {
    /// First matching factor, checked in declaration order.
    pub fn classify(risk: &Risk) -> Self {
        if risk.mentions("financial") {
            Self::FinancialSystem
        } else if risk.mentions("supply chain") {
            Self::SupplyChain
        } else if risk.mentions("geopolitical") {
            Self::Geopolitical
        } else {
            Self::Other
        }
    }
}

impl fmt::Display for SystemicFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FinancialSystem => "Financial System",
            Self::SupplyChain => "Supply Chain",
            Self::Geopolitical => "Geopolitical",
            Self::Other => "Other",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemicRisk {
    pub risk: RiskId,
    pub description: String,
    pub impact: f64,
    pub factor: SystemicFactor,
}

/// Whether the risk mentions a systemic keyword or a key dependency.
pub fn is_systemic(risk: &Risk, key_dependencies: &[String]) -> bool {
    SYSTEMIC_KEYWORDS.iter().any(|k| risk.mentions(k))
        || key_dependencies
            .iter()
            .filter(|d| !d.is_empty())
            .any(|d| risk.mentions(d))
}

/// Flag systemic risks, in input order.
pub fn analyze_systemic_risks(risks: &[Risk], key_dependencies: &[String]) -> Vec<SystemicRisk> {
    let flagged: Vec<SystemicRisk> = risks
        .iter()
        .filter(|r| is_systemic(r, key_dependencies))
        .map(|r| SystemicRisk {
            risk: r.id(),
            description: r.description().to_string(),
            impact: r.impact(),
            factor: SystemicFactor::classify(r),
        })
        .collect();
    debug!(
        risks = risks.len(),
        systemic = flagged.len(),
        "Systemic risks classified"
    );
    flagged
}
