//! # xdex-router
//!
//! Cross-chain DEX routing core: given a source asset, a target asset,
//! and an input amount, find the path through a multi-chain token graph
//! that maximizes what the trader receives, accounting for
//! liquidity-dependent slippage, per-hop fees, gas, and bridge costs.
//!
//! The crate is a library with no I/O of its own:
//!
//! - [`graph`]: the multi-chain token graph, trade-size-aware edge
//!   costs, and the stable JSON forms.
//! - [`amm`]: pure swap math for the three supported pool families.
//! - [`solver`]: two single-source shortest-path solvers, classic
//!   heap-based Dijkstra and the bounded multi-source BMSSP.
//! - [`validation`]: route quality checks and scoring.
//! - [`sources`]: the contracts external data collaborators satisfy,
//!   plus the graph assembler that consumes them.
//!
//! Graphs are built once and read-only afterwards; solver state is owned
//! per query, so one graph can serve concurrent queries from multiple
//! threads.

/// Pure AMM swap math
pub mod amm;
/// Engine configuration
pub mod config;
/// Typed error taxonomy
pub mod errors;
/// Token graph, edge costs, JSON forms
pub mod graph;
/// Solver selection facade
pub mod router;
/// Shortest-path solvers
pub mod solver;
/// External data contracts and graph assembly
pub mod sources;
/// Route quality validation
pub mod validation;

// Re-exports for convenience
pub use config::{AmmConfig, RouterConfig};
pub use errors::{AmmError, GraphError, RouteError};
pub use graph::{
    Edge, EdgeKind, LiquidityPool, PoolKind, RouteResult, RouteStep, TokenGraph, TokenKey,
    TokenNode,
};
pub use router::Router;
pub use solver::{BmsspSolver, ClassicDijkstra};
pub use sources::{BridgeRoute, BridgeSource, GraphAssembler, PoolSource, PriceFeed};
pub use validation::{RouteValidator, Validation, ValidationLimits};
