//! Trigger point identification.
//!
//! A trigger point is a risk that is both structurally central (betweenness
//! above the network mean) and strongly tied to its neighbours (summed
//! interaction weight above `ratio * neighbour count`).
//!
//! Qualifying risks are annotated with macro indicators from the most recent
//! year of external data. The link is a plain case-insensitive keyword match
//! on the description against [`INDICATOR_KEYWORDS`]; it is a heuristic and
//! will miss paraphrases.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::centrality::betweenness_centrality;
use crate::errors::{Error, Result};
use crate::network::RiskNetwork;
use crate::stats;
use crate::types::{ExternalData, ExternalDataTable, ExternalFactor, IndicatorKind, Risk, RiskId};

/// Description keywords and the indicator each one pulls in.
pub const INDICATOR_KEYWORDS: &[(&str, IndicatorKind)] = &[
    ("economic", IndicatorKind::GdpGrowth),
    ("population", IndicatorKind::Population),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// Minimum average interaction weight per neighbour.
    /// Default: 0.5
    pub neighbor_weight_ratio: f64,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            neighbor_weight_ratio: 0.5,
        }
    }
}

impl TriggerConfig {
    pub fn with_neighbor_weight_ratio(mut self, ratio: f64) -> Self {
        self.neighbor_weight_ratio = ratio;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.neighbor_weight_ratio) {
            return Err(format!(
                "neighbor_weight_ratio must be in [0.0, 1.0], got {}",
                self.neighbor_weight_ratio
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerPoint {
    pub risk: RiskId,
    pub description: String,
    pub centrality: f64,
    pub connected_risks: Vec<RiskId>,
    pub total_interaction_weight: f64,
    pub external_factors: Vec<ExternalFactor>,
}

pub struct TriggerPointIdentifier<'a> {
    network: &'a RiskNetwork,
    config: TriggerConfig,
}

impl<'a> TriggerPointIdentifier<'a> {
    pub fn new(network: &'a RiskNetwork, config: TriggerConfig) -> Result<Self> {
        config.validate().map_err(Error::Configuration)?;
        Ok(Self { network, config })
    }

    /// Identify trigger points, in network order.
    pub fn identify(
        &self,
        risks: &[Risk],
        external: &ExternalDataTable,
    ) -> Result<Vec<TriggerPoint>> {
        let network = self.network;
        if network.is_empty() {
            return Ok(Vec::new());
        }

        let centrality = betweenness_centrality(network);
        let mean_centrality = stats::mean(&centrality);
        let latest = external.latest();
        if latest.is_none() {
            debug!("No external data; trigger points will carry no indicators");
        }

        let mut points = Vec::new();
        for (node, &score) in centrality.iter().enumerate() {
            let id = network.id_at(node);
            let mut neighbors: Vec<(usize, f64)> = network.neighbors(node).collect();
            neighbors.sort_by_key(|&(n, _)| n);
            let total_weight: f64 = neighbors.iter().map(|&(_, w)| w).sum();

            let central = score > mean_centrality;
            let connected =
                total_weight > self.config.neighbor_weight_ratio * neighbors.len() as f64;
            if !(central && connected) {
                continue;
            }

            let risk = risks
                .iter()
                .find(|r| r.id() == id)
                .ok_or_else(|| Error::network(format!("no risk record for node {id}")))?;

            points.push(TriggerPoint {
                risk: id,
                description: risk.description().to_string(),
                centrality: score,
                connected_risks: neighbors.iter().map(|&(n, _)| network.id_at(n)).collect(),
                total_interaction_weight: total_weight,
                external_factors: latest
                    .map(|(year, data)| external_factors(risk, year, data))
                    .unwrap_or_default(),
            });
        }

        info!(
            risks = network.len(),
            trigger_points = points.len(),
            mean_centrality,
            "Trigger points identified"
        );
        Ok(points)
    }
}

/// Indicators from one year whose keyword appears in the risk description.
pub fn external_factors(risk: &Risk, year: i32, data: &ExternalData) -> Vec<ExternalFactor> {
    INDICATOR_KEYWORDS
        .iter()
        .filter(|(keyword, _)| risk.mentions(keyword))
        .filter_map(|&(_, kind)| {
            let value = match kind {
                IndicatorKind::GdpGrowth => data.gdp_growth?,
                IndicatorKind::Population => data.population? as f64,
            };
            Some(ExternalFactor { kind, year, value })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Interaction, Topology};

    fn risk(id: u32, description: &str) -> Risk {
        Risk::new(RiskId(id), description, "", "", 0.5, 0.5).unwrap()
    }

    fn star(hub_weight: f64) -> (Vec<Risk>, RiskNetwork) {
        let risks = vec![
            risk(1, "Economic slowdown hits demand"),
            risk(2, "Supplier insolvency"),
            risk(3, "Population decline in core market"),
            risk(4, "Currency shock"),
        ];
        let net = RiskNetwork::from_edges(
            &risks,
            vec![
                Interaction::new(RiskId(1), RiskId(2), hub_weight),
                Interaction::new(RiskId(1), RiskId(3), hub_weight),
                Interaction::new(RiskId(1), RiskId(4), hub_weight),
            ],
            Topology::Undirected,
        )
        .unwrap();
        (risks, net)
    }

    fn table() -> ExternalDataTable {
        ExternalDataTable::new()
            .with_year(
                2022,
                ExternalData {
                    gdp_growth: Some(3.0),
                    population: Some(90),
                },
            )
            .with_year(
                2023,
                ExternalData {
                    gdp_growth: Some(1.5),
                    population: Some(100),
                },
            )
    }

    #[test]
    fn test_hub_is_trigger_with_latest_indicator() {
        let (risks, net) = star(0.8);
        let identifier = TriggerPointIdentifier::new(&net, TriggerConfig::default()).unwrap();
        let points = identifier.identify(&risks, &table()).unwrap();

        assert_eq!(points.len(), 1);
        let hub = &points[0];
        assert_eq!(hub.risk, RiskId(1));
        assert_eq!(hub.connected_risks, vec![RiskId(2), RiskId(3), RiskId(4)]);
        assert!((hub.total_interaction_weight - 2.4).abs() < 1e-12);
        assert_eq!(
            hub.external_factors,
            vec![ExternalFactor {
                kind: IndicatorKind::GdpGrowth,
                year: 2023,
                value: 1.5,
            }]
        );
        assert_eq!(hub.external_factors[0].to_string(), "GDP Growth: 1.5%");
    }

    #[test]
    fn test_weak_hub_is_not_trigger() {
        // Central, but average weight 0.4 does not exceed 0.5.
        let (risks, net) = star(0.4);
        let identifier = TriggerPointIdentifier::new(&net, TriggerConfig::default()).unwrap();
        assert!(identifier.identify(&risks, &table()).unwrap().is_empty());

        let lenient = TriggerConfig::default().with_neighbor_weight_ratio(0.3);
        let identifier = TriggerPointIdentifier::new(&net, lenient).unwrap();
        assert_eq!(identifier.identify(&risks, &table()).unwrap().len(), 1);
    }

    #[test]
    fn test_empty_external_data_yields_no_factors() {
        let (risks, net) = star(0.9);
        let identifier = TriggerPointIdentifier::new(&net, TriggerConfig::default()).unwrap();
        let points = identifier
            .identify(&risks, &ExternalDataTable::new())
            .unwrap();
        assert_eq!(points.len(), 1);
        assert!(points[0].external_factors.is_empty());
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let r = risk(3, "POPULATION ageing and ECONOMIC stagnation");
        let data = ExternalData {
            gdp_growth: Some(-0.4),
            population: Some(5_000),
        };
        let factors = external_factors(&r, 2024, &data);
        assert_eq!(factors.len(), 2);
        assert_eq!(factors[1].to_string(), "Population: 5000");

        let partial = ExternalData {
            gdp_growth: None,
            population: Some(5_000),
        };
        assert_eq!(external_factors(&r, 2024, &partial).len(), 1);
    }

    #[test]
    fn test_invalid_ratio_rejected() {
        let (_, net) = star(0.8);
        let config = TriggerConfig::default().with_neighbor_weight_ratio(1.5);
        assert!(matches!(
            TriggerPointIdentifier::new(&net, config),
            Err(Error::Configuration(_))
        ));
    }
}
