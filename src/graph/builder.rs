use std::collections::HashMap;

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};

use super::types::{Edge, EdgeKind, LiquidityPool, TokenKey, TokenNode};
use crate::errors::GraphError;

/// Directed multi-chain token graph.
///
/// Vertices are `(symbol, chain)` keys, edges are swaps or bridges.
/// Construction validates every insertion; once a solver borrows the
/// graph it is read-only. Undirected semantics are emulated by inserting
/// both directions explicitly.
///
/// Outgoing edges are kept in insertion order per vertex, which is what
/// makes solver tie-breaking deterministic.
pub struct TokenGraph {
    graph: DiGraph<TokenNode, Edge>,
    key_to_node: HashMap<TokenKey, NodeIndex>,
    out_edges: Vec<Vec<EdgeIndex>>,
}

impl Default for TokenGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            key_to_node: HashMap::new(),
            out_edges: Vec::new(),
        }
    }

    /// Build a graph from a vertex list and `(source, edge)` pairs in one
    /// shot. Fails on the first invalid entry.
    pub fn build(
        vertices: Vec<TokenNode>,
        edges: Vec<(TokenKey, Edge)>,
    ) -> Result<Self, GraphError> {
        let mut graph = Self::new();
        for vertex in vertices {
            graph.add_vertex(vertex)?;
        }
        for (source, edge) in edges {
            graph.add_edge(&source, edge)?;
        }
        Ok(graph)
    }

    pub fn add_vertex(&mut self, vertex: TokenNode) -> Result<(), GraphError> {
        if self.key_to_node.contains_key(&vertex.key) {
            return Err(GraphError::DuplicateVertex(vertex.key.to_string()));
        }
        let key = vertex.key.clone();
        let node = self.graph.add_node(vertex);
        self.key_to_node.insert(key, node);
        self.out_edges.push(Vec::new());
        Ok(())
    }

    /// Convenience for a bare `(symbol, chain)` vertex.
    pub fn add_token(
        &mut self,
        symbol: impl Into<String>,
        chain: impl Into<String>,
    ) -> Result<(), GraphError> {
        self.add_vertex(TokenNode::new(TokenKey::new(symbol, chain)))
    }

    pub fn add_edge(&mut self, from: &TokenKey, edge: Edge) -> Result<(), GraphError> {
        if *from == edge.target {
            return Err(GraphError::SelfLoop(from.to_string()));
        }
        let Some(&source) = self.key_to_node.get(from) else {
            return Err(GraphError::DanglingEdge(from.to_string()));
        };
        let Some(&target) = self.key_to_node.get(&edge.target) else {
            return Err(GraphError::DanglingEdge(edge.target.to_string()));
        };

        let label = format!("{from} -> {}", edge.target);
        match &edge.kind {
            EdgeKind::Swap { pool, rate } => {
                if from.chain != edge.target.chain {
                    return Err(GraphError::InvalidPool {
                        edge: label,
                        reason: "swap edges must stay on one chain".into(),
                    });
                }
                if let Some(pool) = pool {
                    validate_pool(pool).map_err(|reason| GraphError::InvalidPool {
                        edge: label.clone(),
                        reason,
                    })?;
                }
                if let Some(rate) = rate {
                    if !rate.is_finite() || *rate <= 0.0 {
                        return Err(GraphError::InvalidPool {
                            edge: label,
                            reason: format!("nominal rate must be finite and positive, got {rate}"),
                        });
                    }
                }
            }
            EdgeKind::Bridge {
                fee_fraction,
                time_delay_s,
            } => {
                if from.symbol != edge.target.symbol {
                    return Err(GraphError::InvalidBridge {
                        edge: label,
                        reason: "bridges connect the same symbol across chains".into(),
                    });
                }
                if from.chain == edge.target.chain {
                    return Err(GraphError::InvalidBridge {
                        edge: label,
                        reason: "bridge endpoints must be on different chains".into(),
                    });
                }
                if !fee_fraction.is_finite() || !(0.0..1.0).contains(fee_fraction) {
                    return Err(GraphError::InvalidBridge {
                        edge: label,
                        reason: format!("fee fraction {fee_fraction} outside [0, 1)"),
                    });
                }
                if !time_delay_s.is_finite() || *time_delay_s < 0.0 {
                    return Err(GraphError::InvalidBridge {
                        edge: label,
                        reason: format!("negative or non-finite delay {time_delay_s}"),
                    });
                }
            }
        }
        if !edge.gas.is_finite() || edge.gas < 0.0 {
            return Err(GraphError::InvalidPool {
                edge: label,
                reason: format!("gas must be finite and non-negative, got {}", edge.gas),
            });
        }

        tracing::trace!("adding {} edge {label}", edge.kind_label());
        let edge_ix = self.graph.add_edge(source, target, edge);
        self.out_edges[source.index()].push(edge_ix);
        Ok(())
    }

    pub fn contains(&self, key: &TokenKey) -> bool {
        self.key_to_node.contains_key(key)
    }

    pub fn vertex(&self, key: &TokenKey) -> Option<&TokenNode> {
        self.key_to_node
            .get(key)
            .and_then(|&node| self.graph.node_weight(node))
    }

    /// Outgoing edges of `key` in insertion order; empty for unknown keys.
    pub fn neighbors(&self, key: &TokenKey) -> impl Iterator<Item = &Edge> + '_ {
        self.key_to_node
            .get(key)
            .map(|&node| self.out_edges[node.index()].as_slice())
            .unwrap_or(&[])
            .iter()
            .filter_map(|&edge_ix| self.graph.edge_weight(edge_ix))
    }

    pub fn out_degree(&self, key: &TokenKey) -> usize {
        self.key_to_node
            .get(key)
            .map(|&node| self.out_edges[node.index()].len())
            .unwrap_or(0)
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Vertex keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &TokenKey> + '_ {
        self.graph.node_indices().map(move |node| &self.graph[node].key)
    }

    // Index-level accessors for the solvers, which keep their label arrays
    // dense over `NodeIndex`.

    pub(crate) fn node_of(&self, key: &TokenKey) -> Option<NodeIndex> {
        self.key_to_node.get(key).copied()
    }

    pub(crate) fn key_of(&self, node: NodeIndex) -> &TokenKey {
        &self.graph[node].key
    }

    pub(crate) fn out_edge_indices(&self, node: NodeIndex) -> &[EdgeIndex] {
        &self.out_edges[node.index()]
    }

    pub(crate) fn edge(&self, edge_ix: EdgeIndex) -> &Edge {
        &self.graph[edge_ix]
    }

    pub(crate) fn endpoints(&self, edge_ix: EdgeIndex) -> (NodeIndex, NodeIndex) {
        self.graph
            .edge_endpoints(edge_ix)
            .expect("edge index issued by this graph")
    }
}

fn validate_pool(pool: &LiquidityPool) -> Result<(), String> {
    if !pool.reserve_base.is_finite()
        || !pool.reserve_quote.is_finite()
        || pool.reserve_base < 0.0
        || pool.reserve_quote < 0.0
    {
        return Err(format!(
            "reserves must be finite and non-negative ({}, {})",
            pool.reserve_base, pool.reserve_quote
        ));
    }
    if !(0.0..=0.05).contains(&pool.fee_fraction) {
        return Err(format!("fee fraction {} outside [0, 0.05]", pool.fee_fraction));
    }
    if pool.liquidity_usd < 0.0 {
        return Err(format!("negative liquidity_usd {}", pool.liquidity_usd));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::PoolKind;

    fn key(symbol: &str, chain: &str) -> TokenKey {
        TokenKey::new(symbol, chain)
    }

    fn two_vertex_graph() -> TokenGraph {
        let mut graph = TokenGraph::new();
        graph.add_token("WETH", "ethereum").unwrap();
        graph.add_token("USDC", "ethereum").unwrap();
        graph
    }

    #[test]
    fn duplicate_vertex_rejected() {
        let mut graph = two_vertex_graph();
        assert_eq!(
            graph.add_token("WETH", "ethereum"),
            Err(GraphError::DuplicateVertex("WETH.ethereum".into()))
        );
        // Same symbol on another chain is a distinct vertex.
        graph.add_token("WETH", "arbitrum").unwrap();
        assert_eq!(graph.vertex_count(), 3);
    }

    #[test]
    fn self_loop_rejected() {
        let mut graph = two_vertex_graph();
        let weth = key("WETH", "ethereum");
        let err = graph.add_edge(&weth, Edge::swap_with_rate(weth.clone(), 1.0, 0.0));
        assert_eq!(err, Err(GraphError::SelfLoop("WETH.ethereum".into())));
    }

    #[test]
    fn dangling_edge_rejected() {
        let mut graph = two_vertex_graph();
        let err = graph.add_edge(
            &key("WETH", "ethereum"),
            Edge::swap_with_rate(key("DAI", "ethereum"), 1.0, 0.0),
        );
        assert_eq!(err, Err(GraphError::DanglingEdge("DAI.ethereum".into())));
    }

    #[test]
    fn cross_chain_swap_rejected() {
        let mut graph = two_vertex_graph();
        graph.add_token("USDC", "polygon").unwrap();
        let err = graph.add_edge(
            &key("WETH", "ethereum"),
            Edge::swap_with_rate(key("USDC", "polygon"), 3000.0, 0.0),
        );
        assert!(matches!(err, Err(GraphError::InvalidPool { .. })));
    }

    #[test]
    fn pool_bounds_enforced() {
        let mut graph = two_vertex_graph();
        let mut pool = LiquidityPool::constant_product(1_000.0, 1_000.0, 0.003);
        pool.fee_fraction = 0.2; // over the 5% cap
        let err = graph.add_edge(
            &key("WETH", "ethereum"),
            Edge::swap(key("USDC", "ethereum"), pool, 0.0),
        );
        assert!(matches!(err, Err(GraphError::InvalidPool { .. })));
    }

    #[test]
    fn bridge_must_cross_chains_with_same_symbol() {
        let mut graph = two_vertex_graph();
        graph.add_token("USDC", "polygon").unwrap();

        let err = graph.add_edge(
            &key("WETH", "ethereum"),
            Edge::bridge(key("USDC", "polygon"), 0.001, 60.0, 0.0),
        );
        assert!(matches!(err, Err(GraphError::InvalidBridge { .. })));

        let err = graph.add_edge(
            &key("USDC", "ethereum"),
            Edge::bridge(key("USDC", "ethereum"), 0.001, 60.0, 0.0),
        );
        assert!(matches!(err, Err(GraphError::SelfLoop(_))));

        graph
            .add_edge(
                &key("USDC", "ethereum"),
                Edge::bridge(key("USDC", "polygon"), 0.001, 60.0, 0.0),
            )
            .unwrap();
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn neighbors_preserve_insertion_order_and_parallel_edges() {
        let mut graph = two_vertex_graph();
        let weth = key("WETH", "ethereum");
        let usdc = key("USDC", "ethereum");

        graph
            .add_edge(&weth, Edge::swap_with_rate(usdc.clone(), 3000.0, 0.0))
            .unwrap();
        graph
            .add_edge(
                &weth,
                Edge::swap(
                    usdc.clone(),
                    LiquidityPool::new(PoolKind::ConstantProduct, 100.0, 300_000.0, 0.003),
                    0.0,
                ),
            )
            .unwrap();

        let rates: Vec<Option<f64>> = graph.neighbors(&weth).map(Edge::nominal_rate).collect();
        assert_eq!(rates, vec![Some(3000.0), None]);
        assert_eq!(graph.out_degree(&weth), 2);
        assert_eq!(graph.out_degree(&usdc), 0);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn build_assembles_and_validates() {
        let weth = key("WETH", "ethereum");
        let usdc = key("USDC", "ethereum");
        let graph = TokenGraph::build(
            vec![
                TokenNode::new(weth.clone()).with_decimals(18),
                TokenNode::new(usdc.clone()).with_decimals(6),
            ],
            vec![(weth.clone(), Edge::swap_with_rate(usdc.clone(), 3000.0, 0.0))],
        )
        .unwrap();
        assert!(graph.contains(&weth));
        assert_eq!(graph.vertex(&usdc).unwrap().decimals, Some(6));
        assert_eq!(graph.vertex_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }
}
