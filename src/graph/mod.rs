pub mod builder;
pub mod cost;
pub mod json;
pub mod types;

// Re-exports for external use
pub use builder::TokenGraph;
pub use cost::{edge_cost, EdgeCost, UNUSABLE_WEIGHT};
pub use types::{
    Edge, EdgeKind, LiquidityPool, PoolKind, RouteResult, RouteStep, TokenKey, TokenNode,
};
