//! Classic heap-based Dijkstra with a hop cap.
//!
//! The baseline solver: a binary min-heap keyed by path weight, lazy
//! deletion for stale entries, early exit once the target is popped.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use petgraph::graph::NodeIndex;
use tracing::debug;

use super::{no_route, reconstruct, resolve_endpoints, SearchState};
use crate::config::RouterConfig;
use crate::errors::RouteError;
use crate::graph::types::{RouteResult, TokenKey};
use crate::graph::TokenGraph;

/// Heap entry ordered so the smallest distance pops first; ties resolve
/// to the earliest-pushed entry to keep exploration deterministic.
#[derive(Debug, Clone, Copy)]
struct HeapEntry {
    dist: f64,
    seq: u64,
    node: NodeIndex,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.dist == other.dist && self.seq == other.seq
    }
}

impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .dist
            .partial_cmp(&self.dist)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Textbook Dijkstra over the token graph.
pub struct ClassicDijkstra<'a> {
    graph: &'a TokenGraph,
    config: &'a RouterConfig,
}

impl<'a> ClassicDijkstra<'a> {
    pub fn new(graph: &'a TokenGraph, config: &'a RouterConfig) -> Self {
        Self { graph, config }
    }

    pub fn solve(
        &self,
        source: &TokenKey,
        target: &TokenKey,
        input_amount: f64,
        max_hops: Option<u32>,
    ) -> Result<RouteResult, RouteError> {
        let max_hops = self.config.max_hops_or_default(max_hops);
        let (source_ix, target_ix) = resolve_endpoints(self.graph, source, target)?;

        let n = self.graph.vertex_count();
        let mut state = SearchState::new(n, source_ix, input_amount);
        let mut visited = vec![false; n];
        let mut heap = BinaryHeap::new();
        let mut seq = 0u64;

        heap.push(HeapEntry {
            dist: 0.0,
            seq,
            node: source_ix,
        });

        while let Some(entry) = heap.pop() {
            let u = entry.node;
            if u == target_ix {
                break;
            }
            // Lazy deletion: drop settled vertices and stale entries.
            if visited[u.index()] || entry.dist > state.dist[u.index()] {
                continue;
            }
            if state.hops[u.index()] >= max_hops {
                continue;
            }
            visited[u.index()] = true;

            for &edge_ix in self.graph.out_edge_indices(u) {
                if let Some(v) = state.try_relax(self.graph, self.config, u, edge_ix, max_hops) {
                    seq += 1;
                    heap.push(HeapEntry {
                        dist: state.dist[v.index()],
                        seq,
                        node: v,
                    });
                }
            }
        }

        if !state.dist[target_ix.index()].is_finite() {
            debug!("classic: no route {source} -> {target} within {max_hops} hops");
            return Err(no_route(source, target, max_hops));
        }
        Ok(reconstruct(
            self.graph,
            self.config,
            &state,
            source_ix,
            target_ix,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::{Edge, LiquidityPool};

    fn key(symbol: &str) -> TokenKey {
        TokenKey::new(symbol, "eth")
    }

    fn rate_edge(to: &str, rate: f64) -> Edge {
        Edge::swap_with_rate(key(to), rate, 0.0)
    }

    fn solve(graph: &TokenGraph, from: &str, to: &str, amount: f64) -> Result<RouteResult, RouteError> {
        let config = RouterConfig::default();
        ClassicDijkstra::new(graph, &config).solve(&key(from), &key(to), amount, None)
    }

    #[test]
    fn picks_the_higher_product_path() {
        let mut graph = TokenGraph::new();
        for symbol in ["A", "B", "C"] {
            graph.add_token(symbol, "eth").unwrap();
        }
        // Direct 0.45 versus 0.5 * 0.96 = 0.48 through B.
        graph.add_edge(&key("A"), rate_edge("C", 0.45)).unwrap();
        graph.add_edge(&key("A"), rate_edge("B", 0.5)).unwrap();
        graph.add_edge(&key("B"), rate_edge("C", 0.96)).unwrap();

        let route = solve(&graph, "A", "C", 1.0).unwrap();
        assert_eq!(route.token_path(), "A.eth -> B.eth -> C.eth");
        assert!((route.estimated_output - 0.48).abs() < 1e-12);
        assert!((route.total_weight - (-(0.48f64).ln())).abs() < 1e-12);
    }

    #[test]
    fn parallel_edges_keep_the_best() {
        let mut graph = TokenGraph::new();
        graph.add_token("A", "eth").unwrap();
        graph.add_token("B", "eth").unwrap();
        graph.add_edge(&key("A"), rate_edge("B", 0.4)).unwrap();
        graph.add_edge(&key("A"), rate_edge("B", 0.6)).unwrap();
        graph.add_edge(&key("A"), rate_edge("B", 0.5)).unwrap();

        let route = solve(&graph, "A", "B", 1.0).unwrap();
        assert_eq!(route.hop_count(), 1);
        assert!((route.estimated_output - 0.6).abs() < 1e-12);
    }

    #[test]
    fn amount_carries_through_pools() {
        let mut graph = TokenGraph::new();
        graph.add_token("A", "eth").unwrap();
        graph.add_token("B", "eth").unwrap();
        graph.add_token("C", "eth").unwrap();
        graph
            .add_edge(
                &key("A"),
                Edge::swap(key("B"), LiquidityPool::constant_product(1_000.0, 1_000.0, 0.0), 0.0),
            )
            .unwrap();
        graph
            .add_edge(
                &key("B"),
                Edge::swap(key("C"), LiquidityPool::constant_product(1_000.0, 1_000.0, 0.0), 0.0),
            )
            .unwrap();

        let route = solve(&graph, "A", "C", 100.0).unwrap();
        let first_out = 1_000.0 * 100.0 / 1_100.0;
        let second_out = 1_000.0 * first_out / (1_000.0 + first_out);
        assert!((route.steps[0].output_amount - first_out).abs() < 1e-9);
        assert!((route.steps[1].input_amount - first_out).abs() < 1e-9);
        assert!((route.estimated_output - second_out).abs() < 1e-9);
    }

    #[test]
    fn unknown_endpoints_fail_fast() {
        let mut graph = TokenGraph::new();
        graph.add_token("A", "eth").unwrap();
        assert!(matches!(
            solve(&graph, "X", "A", 1.0),
            Err(RouteError::SourceNotFound(_))
        ));
        assert!(matches!(
            solve(&graph, "A", "X", 1.0),
            Err(RouteError::TargetNotFound(_))
        ));
    }

    #[test]
    fn disconnected_target_is_no_route() {
        let mut graph = TokenGraph::new();
        graph.add_token("A", "eth").unwrap();
        graph.add_token("B", "eth").unwrap();
        assert!(matches!(
            solve(&graph, "A", "B", 1.0),
            Err(RouteError::NoRoute { .. })
        ));
    }

    #[test]
    fn hop_cap_prunes_long_chains() {
        let mut graph = TokenGraph::new();
        for symbol in ["A", "B", "C", "D", "E", "F"] {
            graph.add_token(symbol, "eth").unwrap();
        }
        for (from, to) in [("A", "B"), ("B", "C"), ("C", "D"), ("D", "E"), ("E", "F")] {
            graph.add_edge(&key(from), rate_edge(to, 0.99)).unwrap();
        }

        let config = RouterConfig::default();
        let solver = ClassicDijkstra::new(&graph, &config);
        assert!(matches!(
            solver.solve(&key("A"), &key("F"), 1.0, Some(3)),
            Err(RouteError::NoRoute { .. })
        ));

        let route = solver.solve(&key("A"), &key("F"), 1.0, Some(5)).unwrap();
        assert_eq!(route.hop_count(), 5);
        assert!((route.estimated_output - 0.99f64.powi(5)).abs() < 1e-9);
    }
}
