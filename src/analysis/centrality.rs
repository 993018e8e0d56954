//! Weighted betweenness centrality (Brandes), edge weight as distance.
//!
//! Distances come from petgraph's Dijkstra; path counts and dependencies are
//! accumulated over the shortest-path DAG in order of distance.

use petgraph::algo::dijkstra;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::network::RiskNetwork;
use crate::types::RiskId;

/// Relative tolerance for treating two path lengths as equal.
const PATH_TOLERANCE: f64 = 1e-12;

/// Betweenness centrality per node, in network order.
///
/// Normalised by `1 / ((n - 1)(n - 2))` when `n > 2`. Undirected networks
/// count each pair from both endpoints, which that normalisation accounts for.
pub fn betweenness_centrality(network: &RiskNetwork) -> Vec<f64> {
    let graph = network.graph();
    let n = graph.node_count();
    let mut centrality = vec![0.0; n];

    for source in graph.node_indices() {
        accumulate_from(graph, source, &mut centrality);
    }

    if n > 2 {
        let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
        for c in &mut centrality {
            *c *= scale;
        }
    }
    centrality
}

fn same_length(a: f64, b: f64) -> bool {
    (a - b).abs() <= PATH_TOLERANCE * a.abs().max(b.abs()).max(1.0)
}

fn accumulate_from(graph: &DiGraph<RiskId, f64>, source: NodeIndex, centrality: &mut [f64]) {
    let n = graph.node_count();
    let dist = dijkstra(graph, source, None, |e| *e.weight());

    // Reachable nodes by increasing distance; predecessors always come first.
    let mut order: Vec<(NodeIndex, f64)> = dist.iter().map(|(&node, &d)| (node, d)).collect();
    order.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

    let mut sigma = vec![0.0; n];
    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
    sigma[source.index()] = 1.0;

    for &(node, d) in &order {
        for edge in graph.edges(node) {
            let next = edge.target();
            let Some(&d_next) = dist.get(&next) else {
                continue;
            };
            if d < d_next && same_length(d + *edge.weight(), d_next) {
                sigma[next.index()] += sigma[node.index()];
                preds[next.index()].push(node.index());
            }
        }
    }

    let mut delta = vec![0.0; n];
    for &(node, _) in order.iter().rev() {
        let w = node.index();
        for &v in &preds[w] {
            delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
        }
        if node != source {
            centrality[w] += delta[w];
        }
    }
}
