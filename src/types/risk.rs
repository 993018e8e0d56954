use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Stable identifier of a risk within one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RiskId(pub u32);

impl fmt::Display for RiskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

impl From<u32> for RiskId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// A discrete risk factor.
///
/// Immutable once constructed. Likelihood and impact are validated to lie in
/// `[0, 1]`; deserialization goes through the same checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RiskRecord", into = "RiskRecord")]
pub struct Risk {
    id: RiskId,
    description: String,
    category: String,
    subcategory: String,
    likelihood: f64,
    impact: f64,
}

/// Wire shape of a [`Risk`] before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RiskRecord {
    id: RiskId,
    description: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    subcategory: String,
    likelihood: f64,
    impact: f64,
}

impl Risk {
    /// Create a validated risk.
    pub fn new(
        id: RiskId,
        description: impl Into<String>,
        category: impl Into<String>,
        subcategory: impl Into<String>,
        likelihood: f64,
        impact: f64,
    ) -> Result<Self> {
        check_unit(id, "likelihood", likelihood)?;
        check_unit(id, "impact", impact)?;
        Ok(Self {
            id,
            description: description.into(),
            category: category.into(),
            subcategory: subcategory.into(),
            likelihood,
            impact,
        })
    }

    pub fn id(&self) -> RiskId {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn subcategory(&self) -> &str {
        &self.subcategory
    }

    pub fn likelihood(&self) -> f64 {
        self.likelihood
    }

    pub fn impact(&self) -> f64 {
        self.impact
    }

    /// Case-insensitive keyword test against the description.
    pub fn mentions(&self, keyword: &str) -> bool {
        self.description
            .to_lowercase()
            .contains(&keyword.to_lowercase())
    }
}

fn check_unit(id: RiskId, field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(Error::risk_data(
            id,
            format!("{field} {value} is outside [0, 1]"),
        ));
    }
    Ok(())
}

impl TryFrom<RiskRecord> for Risk {
    type Error = Error;

    fn try_from(r: RiskRecord) -> Result<Self> {
        Risk::new(
            r.id,
            r.description,
            r.category,
            r.subcategory,
            r.likelihood,
            r.impact,
        )
    }
}

impl From<Risk> for RiskRecord {
    fn from(r: Risk) -> Self {
        Self {
            id: r.id,
            description: r.description,
            category: r.category,
            subcategory: r.subcategory,
            likelihood: r.likelihood,
            impact: r.impact,
        }
    }
}

/// Reject duplicate identifiers in an ordered risk collection.
pub(crate) fn ensure_unique_ids(risks: &[Risk]) -> Result<()> {
    let mut seen = std::collections::HashSet::with_capacity(risks.len());
    for risk in risks {
        if !seen.insert(risk.id) {
            return Err(Error::risk_data(risk.id, "duplicate risk identifier"));
        }
    }
    Ok(())
}
