//! Shortest-path solvers over the token graph.
//!
//! Both solvers share one relaxation rule and one label layout: per
//! vertex, the best known path weight, the predecessor edge, the hop
//! depth at which that weight was set, and the trade amount carried to
//! the vertex along that path. Edge weights depend on the carried
//! amount (AMM impact grows with size), so the instance is not a
//! textbook stationary-weight SSSP; relaxing from a per-vertex amount
//! stays sound because every pool family's per-unit rate is monotone
//! non-increasing in trade size. At equal weight the first-discovered
//! path wins, which is deterministic given edge insertion order.

pub mod bmssp;
pub mod classic;

pub use bmssp::BmsspSolver;
pub use classic::ClassicDijkstra;

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::config::RouterConfig;
use crate::errors::RouteError;
use crate::graph::cost::edge_cost;
use crate::graph::types::{RouteResult, RouteStep, TokenKey};
use crate::graph::TokenGraph;

/// Per-query label arrays, dense over the graph's node indices.
pub(crate) struct SearchState {
    pub dist: Vec<f64>,
    pub prev: Vec<Option<EdgeIndex>>,
    pub hops: Vec<u32>,
    pub amount: Vec<f64>,
}

impl SearchState {
    pub fn new(vertex_count: usize, source: NodeIndex, input_amount: f64) -> Self {
        let mut state = Self {
            dist: vec![f64::INFINITY; vertex_count],
            prev: vec![None; vertex_count],
            hops: vec![0; vertex_count],
            amount: vec![0.0; vertex_count],
        };
        state.dist[source.index()] = 0.0;
        state.amount[source.index()] = input_amount;
        state
    }

    /// Try to improve `edge`'s target through `u`. Returns the target
    /// node when the label improved.
    pub fn try_relax(
        &mut self,
        graph: &TokenGraph,
        config: &RouterConfig,
        u: NodeIndex,
        edge_ix: EdgeIndex,
        max_hops: u32,
    ) -> Option<NodeIndex> {
        if self.hops[u.index()] + 1 > max_hops {
            return None;
        }
        let edge = graph.edge(edge_ix);
        let cost = edge_cost(self.amount[u.index()], edge, config);
        if !cost.is_usable() {
            return None;
        }
        let candidate = self.dist[u.index()] + cost.weight;
        let (_, v) = graph.endpoints(edge_ix);
        if candidate < self.dist[v.index()] {
            self.dist[v.index()] = candidate;
            self.prev[v.index()] = Some(edge_ix);
            self.hops[v.index()] = self.hops[u.index()] + 1;
            self.amount[v.index()] = cost.output;
            Some(v)
        } else {
            None
        }
    }
}

/// Resolve the query endpoints or fail before any search work.
pub(crate) fn resolve_endpoints(
    graph: &TokenGraph,
    source: &TokenKey,
    target: &TokenKey,
) -> Result<(NodeIndex, NodeIndex), RouteError> {
    let source_ix = graph
        .node_of(source)
        .ok_or_else(|| RouteError::SourceNotFound(source.to_string()))?;
    let target_ix = graph
        .node_of(target)
        .ok_or_else(|| RouteError::TargetNotFound(target.to_string()))?;
    Ok((source_ix, target_ix))
}

/// Walk the predecessor chain from the target and assemble the route.
/// Caller guarantees `dist[target]` is finite.
pub(crate) fn reconstruct(
    graph: &TokenGraph,
    config: &RouterConfig,
    state: &SearchState,
    source: NodeIndex,
    target: NodeIndex,
) -> RouteResult {
    let mut edges = Vec::new();
    let mut cursor = target;
    while cursor != source {
        let edge_ix = state.prev[cursor.index()]
            .expect("finite-distance vertex must have a predecessor");
        edges.push(edge_ix);
        cursor = graph.endpoints(edge_ix).0;
    }
    edges.reverse();

    let mut path = vec![graph.key_of(source).clone()];
    let mut steps = Vec::with_capacity(edges.len());
    for edge_ix in edges {
        let (from, to) = graph.endpoints(edge_ix);
        let edge = graph.edge(edge_ix);
        let cost = edge_cost(state.amount[from.index()], edge, config);
        steps.push(RouteStep {
            from: graph.key_of(from).clone(),
            to: graph.key_of(to).clone(),
            weight: cost.weight,
            input_amount: state.amount[from.index()],
            output_amount: state.amount[to.index()],
            edge: edge.clone(),
        });
        path.push(graph.key_of(to).clone());
    }

    RouteResult {
        path,
        steps,
        total_weight: state.dist[target.index()],
        estimated_output: state.amount[target.index()],
    }
}

/// Uniform `NoRoute` for both solvers.
pub(crate) fn no_route(source: &TokenKey, target: &TokenKey, max_hops: u32) -> RouteError {
    RouteError::NoRoute {
        from: source.to_string(),
        target: target.to_string(),
        max_hops,
    }
}
