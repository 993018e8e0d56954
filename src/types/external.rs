use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Macro indicators observed for one year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalData {
    /// GDP growth rate, in percent.
    #[serde(default)]
    pub gdp_growth: Option<f64>,
    #[serde(default)]
    pub population: Option<u64>,
}

/// Read-only per-year indicator table, keyed by year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalDataTable {
    years: BTreeMap<i32, ExternalData>,
}

impl ExternalDataTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_year(mut self, year: i32, data: ExternalData) -> Self {
        self.years.insert(year, data);
        self
    }

    pub fn insert(&mut self, year: i32, data: ExternalData) {
        self.years.insert(year, data);
    }

    /// Most recent year and its indicators.
    pub fn latest(&self) -> Option<(i32, &ExternalData)> {
        self.years.iter().next_back().map(|(y, d)| (*y, d))
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }
}

impl FromIterator<(i32, ExternalData)> for ExternalDataTable {
    fn from_iter<T: IntoIterator<Item = (i32, ExternalData)>>(iter: T) -> Self {
        Self {
            years: iter.into_iter().collect(),
        }
    }
}

/// Indicator kinds a risk description can be linked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    GdpGrowth,
    Population,
}

/// Indicator value attached to a trigger point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalFactor {
    pub kind: IndicatorKind,
    pub year: i32,
    pub value: f64,
}

impl fmt::Display for ExternalFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            IndicatorKind::GdpGrowth => write!(f, "GDP Growth: {}%", self.value),
            IndicatorKind::Population => write!(f, "Population: {}", self.value),
        }
    }
}
