//! Weighted risk interaction network.
//!
//! The network is built once per analysis run and is read-only afterwards.
//! Simulation state (activation sequences, level vectors) lives outside it and
//! refers to nodes by dense index, so one network can back any number of
//! concurrent simulations.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::consts::EPSILON;
use crate::errors::{Error, Result};
use crate::types::{ensure_unique_ids, Risk, RiskId};

/// Edge semantics of the interaction network.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    /// Interactions are mutual; each edge influences both endpoints.
    #[default]
    Undirected,
    /// `from` influences `to` only.
    Directed,
}

/// One pairwise interaction from an explicit edge list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub from: RiskId,
    pub to: RiskId,
    pub weight: f64,
}

impl Interaction {
    pub fn new(from: RiskId, to: RiskId, weight: f64) -> Self {
        Self { from, to, weight }
    }
}

/// Source of interaction weights.
///
/// Matrix entries are indexed by risk order, row = influenced risk, column =
/// influencing risk, so that diffusion computes `W · v` directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionSource {
    Matrix(Vec<Vec<f64>>),
    EdgeList(Vec<Interaction>),
}

impl InteractionSource {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Matrix(rows) => rows.is_empty(),
            Self::EdgeList(edges) => edges.is_empty(),
        }
    }
}

/// A stored edge, by dense node index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub weight: f64,
}

/// Immutable weighted graph over risk identifiers.
#[derive(Debug, Clone)]
pub struct RiskNetwork {
    topology: Topology,
    ids: Vec<RiskId>,
    index: HashMap<RiskId, usize>,
    /// Dense `W[target * n + source]`.
    weights: Vec<f64>,
    /// Node `i` holds `ids[i]`; undirected interactions are two opposite arcs.
    graph: DiGraph<RiskId, f64>,
    edges: Vec<Edge>,
}

impl RiskNetwork {
    /// Build a network over `risks` from the given interaction source.
    pub fn build(risks: &[Risk], source: &InteractionSource, topology: Topology) -> Result<Self> {
        ensure_unique_ids(risks)?;

        if source.is_empty() && !risks.is_empty() {
            return Err(Error::network(format!(
                "interaction source is empty but {} risks were supplied",
                risks.len()
            )));
        }

        let ids: Vec<RiskId> = risks.iter().map(Risk::id).collect();
        let index: HashMap<RiskId, usize> =
            ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();

        let mut builder = EdgeAccumulator::new(&ids, topology);
        match source {
            InteractionSource::Matrix(rows) => builder.add_matrix(rows)?,
            InteractionSource::EdgeList(list) => {
                for edge in list {
                    let from = *index
                        .get(&edge.from)
                        .ok_or_else(|| Error::unknown_risk(edge.from))?;
                    let to = *index
                        .get(&edge.to)
                        .ok_or_else(|| Error::unknown_risk(edge.to))?;
                    builder.add(from, to, edge.weight)?;
                }
            }
        }

        let network = builder.finish(index);
        debug!(
            nodes = network.len(),
            edges = network.edge_count(),
            topology = ?network.topology,
            "Built risk network"
        );
        Ok(network)
    }

    /// Build an undirected network from a square matrix indexed by risk order.
    pub fn from_matrix(risks: &[Risk], matrix: Vec<Vec<f64>>) -> Result<Self> {
        Self::build(risks, &InteractionSource::Matrix(matrix), Topology::Undirected)
    }

    /// Build a network from an explicit edge list.
    pub fn from_edges(
        risks: &[Risk],
        edges: Vec<Interaction>,
        topology: Topology,
    ) -> Result<Self> {
        Self::build(risks, &InteractionSource::EdgeList(edges), topology)
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn is_directed(&self) -> bool {
        self.topology == Topology::Directed
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Node identifiers in risk order.
    pub fn ids(&self) -> &[RiskId] {
        &self.ids
    }

    pub(crate) fn id_at(&self, index: usize) -> RiskId {
        self.ids[index]
    }

    pub fn index_of(&self, id: RiskId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Influence weight of `source` on `target` (0 when not connected).
    pub(crate) fn weight(&self, target: usize, source: usize) -> f64 {
        self.weights[target * self.len() + source]
    }

    /// Weight of the interaction between two risks by identifier.
    pub fn weight_between(&self, from: RiskId, to: RiskId) -> Option<f64> {
        let from = self.index_of(from)?;
        let to = self.index_of(to)?;
        Some(self.weight(to, from))
    }

    /// Interaction graph with edge weight = influence strength.
    ///
    /// Node indices coincide with network order. An undirected interaction
    /// is stored as a pair of opposite arcs, so path algorithms see both
    /// directions.
    pub fn graph(&self) -> &DiGraph<RiskId, f64> {
        &self.graph
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Nodes that influence `target`, with weights.
    pub(crate) fn incoming(&self, target: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.graph
            .edges_directed(NodeIndex::new(target), Direction::Incoming)
            .map(|e| (e.source().index(), *e.weight()))
    }

    /// Adjacent nodes (undirected) or successors (directed), with weights.
    pub(crate) fn neighbors(&self, node: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.graph
            .edges(NodeIndex::new(node))
            .map(|e| (e.target().index(), *e.weight()))
    }

    /// Weighted sum of incoming influence on `target` for a level vector.
    pub(crate) fn influence_on(&self, target: usize, levels: &[f64]) -> f64 {
        self.incoming(target)
            .map(|(source, w)| w * levels[source])
            .sum()
    }

    /// Gather one value per node, in network order, from the risk collection.
    ///
    /// Fails when a node has no matching risk.
    pub fn node_values<F>(&self, risks: &[Risk], value: F) -> Result<Vec<f64>>
    where
        F: Fn(&Risk) -> f64,
    {
        let by_id: HashMap<RiskId, &Risk> = risks.iter().map(|r| (r.id(), r)).collect();
        self.ids
            .iter()
            .map(|id| {
                by_id
                    .get(id)
                    .map(|r| value(*r))
                    .ok_or_else(|| Error::network(format!("no risk record for node {id}")))
            })
            .collect()
    }

    /// Undirected view: per node, adjacent nodes with the larger of the two
    /// directional weights.
    pub(crate) fn undirected_adjacency(&self) -> Vec<Vec<(usize, f64)>> {
        if !self.is_directed() {
            return (0..self.len()).map(|u| self.neighbors(u).collect()).collect();
        }
        let n = self.len();
        let mut adj = vec![Vec::new(); n];
        for u in 0..n {
            for v in 0..n {
                if u == v {
                    continue;
                }
                let w = self.weight(u, v).max(self.weight(v, u));
                if w > 0.0 {
                    adj[u].push((v, w));
                }
            }
        }
        adj
    }
}

/// Collects validated edges before freezing them into a [`RiskNetwork`].
struct EdgeAccumulator<'a> {
    ids: &'a [RiskId],
    topology: Topology,
    weights: Vec<f64>,
    set: Vec<bool>,
}

impl<'a> EdgeAccumulator<'a> {
    fn new(ids: &'a [RiskId], topology: Topology) -> Self {
        let n = ids.len();
        Self {
            ids,
            topology,
            weights: vec![0.0; n * n],
            set: vec![false; n * n],
        }
    }

    fn n(&self) -> usize {
        self.ids.len()
    }

    fn add_matrix(&mut self, rows: &[Vec<f64>]) -> Result<()> {
        let n = self.n();
        if rows.len() != n || rows.iter().any(|r| r.len() != n) {
            return Err(Error::network(format!(
                "interaction matrix must be {n}x{n} to match the risk set"
            )));
        }

        for (target, row) in rows.iter().enumerate() {
            for (source, &w) in row.iter().enumerate() {
                check_weight(self.ids[source], self.ids[target], w)?;
            }
        }

        if self.topology == Topology::Undirected {
            for i in 0..n {
                for j in (i + 1)..n {
                    if (rows[i][j] - rows[j][i]).abs() > EPSILON {
                        return Err(Error::network(format!(
                            "undirected interaction matrix is not symmetric at ({}, {}): {} vs {}",
                            self.ids[i], self.ids[j], rows[i][j], rows[j][i]
                        )));
                    }
                }
            }
        }

        let mut self_loops = 0;
        for (target, row) in rows.iter().enumerate() {
            for (source, &w) in row.iter().enumerate() {
                if source == target {
                    if w > 0.0 {
                        self_loops += 1;
                    }
                    continue;
                }
                if w > 0.0 {
                    self.weights[target * n + source] = w;
                }
            }
        }
        if self_loops > 0 {
            warn!(self_loops, "Ignoring diagonal entries of interaction matrix");
        }
        Ok(())
    }

    /// Add `from -> to` (and the reverse when undirected).
    fn add(&mut self, from: usize, to: usize, weight: f64) -> Result<()> {
        check_weight(self.ids[from], self.ids[to], weight)?;
        if from == to {
            warn!(risk = %self.ids[from], "Ignoring self-loop interaction");
            return Ok(());
        }

        self.set_weight(to, from, weight)?;
        if self.topology == Topology::Undirected {
            self.set_weight(from, to, weight)?;
        }
        Ok(())
    }

    fn set_weight(&mut self, target: usize, source: usize, weight: f64) -> Result<()> {
        let slot = target * self.n() + source;
        if self.set[slot] && (self.weights[slot] - weight).abs() > EPSILON {
            return Err(Error::network(format!(
                "conflicting duplicate interaction between {} and {}: {} vs {}",
                self.ids[source], self.ids[target], self.weights[slot], weight
            )));
        }
        self.set[slot] = true;
        self.weights[slot] = weight;
        Ok(())
    }

    fn finish(self, index: HashMap<RiskId, usize>) -> RiskNetwork {
        let n = self.n();
        let mut graph = DiGraph::with_capacity(n, 0);
        for &id in self.ids {
            graph.add_node(id);
        }
        let mut edges = Vec::new();

        for target in 0..n {
            for source in 0..n {
                let w = self.weights[target * n + source];
                if w <= 0.0 {
                    continue;
                }
                graph.add_edge(NodeIndex::new(source), NodeIndex::new(target), w);
                let keep = match self.topology {
                    Topology::Directed => true,
                    Topology::Undirected => source < target,
                };
                if keep {
                    edges.push(Edge {
                        from: source,
                        to: target,
                        weight: w,
                    });
                }
            }
        }

        RiskNetwork {
            topology: self.topology,
            ids: self.ids.to_vec(),
            index,
            weights: self.weights,
            graph,
            edges,
        }
    }
}

fn check_weight(from: RiskId, to: RiskId, weight: f64) -> Result<()> {
    if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
        return Err(Error::weight_out_of_range(from, to, weight));
    }
    Ok(())
}
