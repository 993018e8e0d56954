//! Structural and impact-based resilience metrics.
//!
//! Structural metrics read the network only: edge density, average
//! clustering, degree assortativity and average shortest path length.
//! Impact metrics read per-scenario impact samples and simulated impact
//! distributions supplied by the caller.
//!
//! The combined score is `1 / (total_impact * (1 + sum of simulation
//! variances))`. It is undefined at zero total impact and that case fails
//! with [`Error::DegenerateComputation`] instead of returning a sentinel.

use std::collections::BTreeMap;

use petgraph::algo::dijkstra;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::consts::EPSILON;
use crate::errors::{Error, Result};
use crate::network::RiskNetwork;
use crate::stats;
use crate::types::{validate_samples, ImpactSample, Risk, SimulationResult};

/// How edge weights enter clustering and assortativity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weighting {
    /// Every edge counts as 1.
    Unweighted,
    /// Interaction weights are used.
    Weighted,
}

/// Edge density: undirected `2m / (n(n-1))`, directed `m / (n(n-1))`.
pub fn density(network: &RiskNetwork) -> f64 {
    let n = network.len();
    if n <= 1 {
        return 0.0;
    }
    let possible = (n * (n - 1)) as f64;
    let m = network.edge_count() as f64;
    if network.is_directed() {
        m / possible
    } else {
        2.0 * m / possible
    }
}

/// Average clustering coefficient over the undirected view.
///
/// Weighted clustering uses the geometric mean of the three edge weights of
/// each triangle, normalised by the largest weight in the network.
pub fn average_clustering(network: &RiskNetwork, weighting: Weighting) -> f64 {
    let n = network.len();
    if n == 0 {
        return 0.0;
    }
    let adj = network.undirected_adjacency();
    let mut dense = vec![0.0; n * n];
    let mut max_weight: f64 = 0.0;
    for (u, list) in adj.iter().enumerate() {
        for &(v, w) in list {
            let w = match weighting {
                Weighting::Unweighted => 1.0,
                Weighting::Weighted => w,
            };
            dense[u * n + v] = w;
            max_weight = max_weight.max(w);
        }
    }
    if max_weight <= 0.0 {
        return 0.0;
    }

    let total: f64 = (0..n)
        .map(|u| {
            let neighbors = &adj[u];
            let degree = neighbors.len();
            if degree < 2 {
                return 0.0;
            }
            let mut intensity = 0.0;
            for (i, &(v, _)) in neighbors.iter().enumerate() {
                for &(w, _) in &neighbors[i + 1..] {
                    let vw = dense[v * n + w];
                    if vw > 0.0 {
                        let product = dense[u * n + v] * dense[u * n + w] * vw;
                        intensity += (product / max_weight.powi(3)).cbrt();
                    }
                }
            }
            2.0 * intensity / (degree * (degree - 1)) as f64
        })
        .sum();
    total / n as f64
}

/// Degree assortativity: Pearson correlation of endpoint degrees over edges.
///
/// Directed networks pair the source's out-degree with the target's
/// in-degree. `None` when there are no edges or a side has no variance.
pub fn degree_assortativity(network: &RiskNetwork, weighting: Weighting) -> Option<f64> {
    let n = network.len();
    let edge_value = |w: f64| match weighting {
        Weighting::Unweighted => 1.0,
        Weighting::Weighted => w,
    };
    let out_degree: Vec<f64> = (0..n)
        .map(|u| network.neighbors(u).map(|(_, w)| edge_value(w)).sum())
        .collect();
    let in_degree: Vec<f64> = (0..n)
        .map(|u| network.incoming(u).map(|(_, w)| edge_value(w)).sum())
        .collect();

    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for edge in network.edges() {
        if network.is_directed() {
            xs.push(out_degree[edge.from]);
            ys.push(in_degree[edge.to]);
        } else {
            xs.push(out_degree[edge.from]);
            ys.push(out_degree[edge.to]);
            xs.push(out_degree[edge.to]);
            ys.push(out_degree[edge.from]);
        }
    }
    pearson(&xs, &ys)
}

fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.is_empty() {
        return None;
    }
    let mx = stats::mean(xs);
    let my = stats::mean(ys);
    let cov: f64 = xs.iter().zip(ys).map(|(x, y)| (x - mx) * (y - my)).sum();
    let sx: f64 = xs.iter().map(|x| (x - mx).powi(2)).sum::<f64>().sqrt();
    let sy: f64 = ys.iter().map(|y| (y - my).powi(2)).sum::<f64>().sqrt();
    if sx * sy <= EPSILON {
        return None;
    }
    Some(cov / (sx * sy))
}

/// Mean weighted shortest path length over all ordered pairs.
///
/// `None` for fewer than two nodes or when some pair is unreachable
/// (not strongly connected when directed).
pub fn average_shortest_path_length(network: &RiskNetwork) -> Option<f64> {
    let n = network.len();
    if n < 2 {
        return None;
    }
    let graph = network.graph();
    let mut total = 0.0;
    for source in graph.node_indices() {
        let dist = dijkstra(graph, source, None, |e| *e.weight());
        if dist.len() < n {
            return None;
        }
        total += dist.values().sum::<f64>();
    }
    Some(total / (n * (n - 1)) as f64)
}

/// Structural resilience of the network alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkResilience {
    /// Unweighted average clustering.
    pub average_clustering: f64,
    pub average_shortest_path_length: Option<f64>,
    pub density: f64,
    /// Unweighted degree assortativity.
    pub assortativity: Option<f64>,
}

/// Impact metrics for one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioImpactMetrics {
    /// Standard deviation over mean; `None` when the mean is 0.
    pub impact_dispersion: Option<f64>,
    pub max_impact: f64,
}

/// Combined structural, per-scenario and adaptive-capacity metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResilienceMetrics {
    pub network_density: f64,
    /// Weighted average clustering.
    pub average_clustering: f64,
    /// Strength assortativity.
    pub assortativity: Option<f64>,
    pub scenarios: BTreeMap<String, ScenarioImpactMetrics>,
    /// `1 - mean(risk impact)`.
    pub adaptive_capacity: f64,
}

impl ResilienceMetrics {
    /// Flat metric-name view. Undefined values are omitted.
    pub fn as_map(&self) -> BTreeMap<String, f64> {
        let mut map = BTreeMap::new();
        map.insert("network_density".to_string(), self.network_density);
        map.insert("average_clustering".to_string(), self.average_clustering);
        if let Some(a) = self.assortativity {
            map.insert("assortativity".to_string(), a);
        }
        for (scenario, m) in &self.scenarios {
            if let Some(d) = m.impact_dispersion {
                map.insert(format!("{scenario}_impact_dispersion"), d);
            }
            map.insert(format!("{scenario}_max_impact"), m.max_impact);
        }
        map.insert("adaptive_capacity".to_string(), self.adaptive_capacity);
        map
    }
}

/// Resilience analysis over one network.
pub struct ResilienceAnalyzer<'a> {
    network: &'a RiskNetwork,
}

impl<'a> ResilienceAnalyzer<'a> {
    pub fn new(network: &'a RiskNetwork) -> Self {
        Self { network }
    }

    pub fn network_resilience(&self) -> NetworkResilience {
        let metrics = NetworkResilience {
            average_clustering: average_clustering(self.network, Weighting::Unweighted),
            average_shortest_path_length: average_shortest_path_length(self.network),
            density: density(self.network),
            assortativity: degree_assortativity(self.network, Weighting::Unweighted),
        };
        debug!(?metrics, "Network resilience assessed");
        metrics
    }

    /// Structural metrics plus per-scenario impact metrics and adaptive capacity.
    pub fn system_resilience(
        &self,
        risks: &[Risk],
        scenario_impacts: &BTreeMap<String, Vec<ImpactSample>>,
    ) -> Result<ResilienceMetrics> {
        if risks.is_empty() {
            return Err(Error::degenerate(
                "adaptive capacity requires a non-empty risk set",
            ));
        }

        let mut scenarios = BTreeMap::new();
        for (scenario, samples) in scenario_impacts {
            validate_samples(scenario, samples)?;
            scenarios.insert(scenario.clone(), scenario_impact_metrics(samples));
        }

        let impacts: Vec<f64> = risks.iter().map(Risk::impact).collect();
        let metrics = ResilienceMetrics {
            network_density: density(self.network),
            average_clustering: average_clustering(self.network, Weighting::Weighted),
            assortativity: degree_assortativity(self.network, Weighting::Weighted),
            scenarios,
            adaptive_capacity: 1.0 - stats::mean(&impacts),
        };
        info!(
            density = metrics.network_density,
            clustering = metrics.average_clustering,
            adaptive_capacity = metrics.adaptive_capacity,
            scenarios = metrics.scenarios.len(),
            "System resilience assessed"
        );
        Ok(metrics)
    }
}

fn scenario_impact_metrics(samples: &[ImpactSample]) -> ScenarioImpactMetrics {
    let values: Vec<f64> = samples.iter().map(|s| s.impact).collect();
    let mean = stats::mean(&values);
    ScenarioImpactMetrics {
        impact_dispersion: (mean > 0.0).then(|| stats::std_dev(&values) / mean),
        max_impact: values.iter().copied().fold(0.0, f64::max),
    }
}

/// `1 / (total_impact * (1 + sum of simulation variances))`.
pub fn resilience_score(impacts: &[ImpactSample], simulations: &[SimulationResult]) -> Result<f64> {
    let total: f64 = impacts.iter().map(|s| s.impact).sum();
    if total <= 0.0 {
        return Err(Error::degenerate(
            "resilience score is undefined for zero total impact",
        ));
    }
    let variance: f64 = simulations.iter().map(SimulationResult::variance).sum();
    Ok(1.0 / (total * (1.0 + variance)))
}

/// Resilience score per scenario.
///
/// Every scenario with impact samples needs a simulation-result set.
pub fn assess_resilience(
    scenario_impacts: &BTreeMap<String, Vec<ImpactSample>>,
    simulation_results: &BTreeMap<String, Vec<SimulationResult>>,
) -> Result<BTreeMap<String, f64>> {
    scenario_impacts
        .iter()
        .map(|(scenario, samples)| {
            validate_samples(scenario, samples)?;
            let simulations = simulation_results.get(scenario).ok_or_else(|| {
                Error::degenerate(format!(
                    "no simulation results supplied for scenario '{scenario}'"
                ))
            })?;
            let score = resilience_score(samples, simulations)?;
            debug!(scenario = %scenario, score, "Scenario resilience scored");
            Ok((scenario.clone(), score))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Interaction, Topology};
    use crate::types::RiskId;

    fn risks(impacts: &[f64]) -> Vec<Risk> {
        impacts
            .iter()
            .enumerate()
            .map(|(i, &impact)| {
                Risk::new(RiskId(i as u32 + 1), format!("risk {i}"), "", "", 0.5, impact).unwrap()
            })
            .collect()
    }

    fn edges(risks: &[Risk], list: &[(u32, u32, f64)], topology: Topology) -> RiskNetwork {
        RiskNetwork::from_edges(
            risks,
            list.iter()
                .map(|&(a, b, w)| Interaction::new(RiskId(a), RiskId(b), w))
                .collect(),
            topology,
        )
        .unwrap()
    }

    fn samples(values: &[f64]) -> Vec<ImpactSample> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| ImpactSample::new(RiskId(i as u32 + 1), v))
            .collect()
    }

    #[test]
    fn test_density() {
        let r = risks(&[0.5; 4]);
        let path = edges(&r, &[(1, 2, 0.5), (2, 3, 0.5), (3, 4, 0.5)], Topology::Undirected);
        assert!((density(&path) - 0.5).abs() < 1e-12);

        let directed = edges(&r, &[(1, 2, 0.5), (2, 3, 0.5), (3, 4, 0.5)], Topology::Directed);
        assert!((density(&directed) - 0.25).abs() < 1e-12);

        let single = RiskNetwork::from_matrix(&risks(&[0.5]), vec![vec![0.0]]).unwrap();
        assert_eq!(density(&single), 0.0);
    }

    #[test]
    fn test_clustering_triangle_and_path() {
        let r = risks(&[0.5; 3]);
        let triangle = edges(&r, &[(1, 2, 0.5), (2, 3, 0.5), (1, 3, 0.5)], Topology::Undirected);
        assert!((average_clustering(&triangle, Weighting::Unweighted) - 1.0).abs() < 1e-12);
        assert!((average_clustering(&triangle, Weighting::Weighted) - 1.0).abs() < 1e-12);

        let path = edges(&r, &[(1, 2, 0.5), (2, 3, 0.5)], Topology::Undirected);
        assert_eq!(average_clustering(&path, Weighting::Weighted), 0.0);
    }

    #[test]
    fn test_weighted_clustering_uses_geometric_mean() {
        let r = risks(&[0.5; 3]);
        let triangle = edges(&r, &[(1, 2, 1.0), (2, 3, 1.0), (1, 3, 0.125)], Topology::Undirected);
        // Each node sees the same triangle: cbrt(1 * 1 * 0.125) = 0.5.
        assert!((average_clustering(&triangle, Weighting::Weighted) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_star_is_disassortative() {
        let r = risks(&[0.5; 4]);
        let star = edges(&r, &[(1, 2, 0.5), (1, 3, 0.5), (1, 4, 0.5)], Topology::Undirected);
        let a = degree_assortativity(&star, Weighting::Unweighted).unwrap();
        assert!((a + 1.0).abs() < 1e-9);

        let triangle = edges(
            &risks(&[0.5; 3]),
            &[(1, 2, 0.5), (2, 3, 0.5), (1, 3, 0.5)],
            Topology::Undirected,
        );
        assert_eq!(degree_assortativity(&triangle, Weighting::Weighted), None);
    }

    #[test]
    fn test_average_shortest_path() {
        let r = risks(&[0.5; 3]);
        let path = edges(&r, &[(1, 2, 0.2), (2, 3, 0.4)], Topology::Undirected);
        // Pairs: 0.2, 0.4, 0.6 each counted twice.
        let expected = 2.0 * (0.2 + 0.4 + 0.6) / 6.0;
        assert!((average_shortest_path_length(&path).unwrap() - expected).abs() < 1e-12);

        let directed = edges(&r, &[(1, 2, 0.2), (2, 3, 0.4)], Topology::Directed);
        assert_eq!(average_shortest_path_length(&directed), None);
    }

    #[test]
    fn test_system_resilience_map() {
        let r = risks(&[0.2, 0.4, 0.6]);
        let net = edges(&r, &[(1, 2, 0.5), (2, 3, 0.5)], Topology::Undirected);
        let mut impacts = BTreeMap::new();
        impacts.insert("baseline".to_string(), samples(&[0.2, 0.4, 0.6]));
        impacts.insert("calm".to_string(), samples(&[0.0, 0.0]));

        let metrics = ResilienceAnalyzer::new(&net)
            .system_resilience(&r, &impacts)
            .unwrap();
        assert!((metrics.adaptive_capacity - 0.6).abs() < 1e-12);

        let map = metrics.as_map();
        assert!((map["baseline_max_impact"] - 0.6).abs() < 1e-12);
        let expected = stats::std_dev(&[0.2, 0.4, 0.6]) / 0.4;
        assert!((map["baseline_impact_dispersion"] - expected).abs() < 1e-12);
        assert!(!map.contains_key("calm_impact_dispersion"));
        assert_eq!(map["calm_max_impact"], 0.0);
        assert!(map.contains_key("network_density"));
    }

    #[test]
    fn test_score_penalises_variance() {
        let impacts = samples(&[0.5, 0.5]);
        let calm = vec![SimulationResult::new(vec![1.0, 1.0, 1.0])];
        let noisy = vec![SimulationResult::new(vec![0.0, 1.0, 2.0])];

        let calm_score = resilience_score(&impacts, &calm).unwrap();
        let noisy_score = resilience_score(&impacts, &noisy).unwrap();
        assert!((calm_score - 1.0).abs() < 1e-12);
        assert!(noisy_score < calm_score);
    }

    #[test]
    fn test_score_undefined_at_zero_impact() {
        let err = resilience_score(&samples(&[0.0, 0.0]), &[]).unwrap_err();
        assert!(matches!(err, Error::DegenerateComputation { .. }));
    }

    #[test]
    fn test_assess_resilience_requires_simulations() {
        let mut impacts = BTreeMap::new();
        impacts.insert("stress".to_string(), samples(&[0.4]));
        let mut sims = BTreeMap::new();

        assert!(assess_resilience(&impacts, &sims).is_err());

        sims.insert("stress".to_string(), vec![SimulationResult::new(vec![0.5, 0.5])]);
        let scores = assess_resilience(&impacts, &sims).unwrap();
        assert!((scores["stress"] - 2.5).abs() < 1e-12);

        impacts.insert("bad".to_string(), samples(&[-0.1]));
        sims.insert("bad".to_string(), vec![]);
        assert!(matches!(
            assess_resilience(&impacts, &sims).unwrap_err(),
            Error::InvalidRiskData { .. }
        ));
    }
}
