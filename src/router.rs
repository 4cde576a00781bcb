//! Routing engine facade.
//!
//! Owns the configuration and picks a solver per query: classic Dijkstra
//! on small graphs, BMSSP once the vertex count clears the configured
//! threshold. Both solvers return identical routes; the split is purely
//! a performance call.

use tracing::debug;

use crate::config::RouterConfig;
use crate::errors::RouteError;
use crate::graph::types::{RouteResult, TokenKey};
use crate::graph::TokenGraph;
use crate::solver::{BmsspSolver, ClassicDijkstra};

pub struct Router {
    config: RouterConfig,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(RouterConfig::default())
    }
}

impl Router {
    pub fn new(config: RouterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Route with the solver the graph size calls for.
    pub fn route(
        &self,
        graph: &TokenGraph,
        source: &TokenKey,
        target: &TokenKey,
        input_amount: f64,
        max_hops: Option<u32>,
    ) -> Result<RouteResult, RouteError> {
        if graph.vertex_count() < self.config.classic_threshold {
            debug!(
                "routing {source} -> {target} with classic ({} vertices)",
                graph.vertex_count()
            );
            self.route_classic(graph, source, target, input_amount, max_hops)
        } else {
            debug!(
                "routing {source} -> {target} with bmssp ({} vertices)",
                graph.vertex_count()
            );
            self.route_bmssp(graph, source, target, input_amount, max_hops)
        }
    }

    pub fn route_classic(
        &self,
        graph: &TokenGraph,
        source: &TokenKey,
        target: &TokenKey,
        input_amount: f64,
        max_hops: Option<u32>,
    ) -> Result<RouteResult, RouteError> {
        ClassicDijkstra::new(graph, &self.config).solve(source, target, input_amount, max_hops)
    }

    pub fn route_bmssp(
        &self,
        graph: &TokenGraph,
        source: &TokenKey,
        target: &TokenKey,
        input_amount: f64,
        max_hops: Option<u32>,
    ) -> Result<RouteResult, RouteError> {
        BmsspSolver::new(graph, &self.config).solve(source, target, input_amount, max_hops)
    }
}
