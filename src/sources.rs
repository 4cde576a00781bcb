//! External data contracts and graph assembly.
//!
//! The routing core never performs I/O: price feeds, pool state, and
//! bridge descriptors arrive through these traits, already resolved by
//! the embedding application. `GraphAssembler` is the glue that turns
//! them into a validated `TokenGraph`, with sanity guards so one bad
//! upstream quote cannot poison the graph.

use tracing::{debug, warn};

use crate::errors::GraphError;
use crate::graph::types::{Edge, LiquidityPool, TokenKey, TokenNode};
use crate::graph::TokenGraph;

/// USD price lookup for a token symbol. `None` means unavailable.
pub trait PriceFeed {
    fn get_price(&self, symbol: &str) -> Option<f64>;
}

/// Pool state lookup for a token pair on one chain, quoted in the
/// direction `base -> quote`. `None` means no pool.
pub trait PoolSource {
    fn get_pool(&self, chain: &str, base: &str, quote: &str) -> Option<LiquidityPool>;
}

/// One bridge offering for a symbol.
#[derive(Debug, Clone)]
pub struct BridgeRoute {
    pub from_chain: String,
    pub to_chain: String,
    pub fee_fraction: f64,
    pub time_delay_s: f64,
    pub gas: f64,
}

/// Bridge discovery per token symbol.
pub trait BridgeSource {
    fn list_bridge_routes(&self, symbol: &str) -> Vec<BridgeRoute>;
}

/// Spot rates outside this band are treated as corrupted upstream data.
const MIN_SANE_RATE: f64 = 1e-10;
const MAX_SANE_RATE: f64 = 1e10;

/// Builds a `TokenGraph` from a vertex list and the three external
/// contracts. Swap edges are inserted in both directions per discovered
/// pool; bridge edges follow the descriptors.
pub struct GraphAssembler<'a> {
    prices: &'a dyn PriceFeed,
    pools: &'a dyn PoolSource,
    bridges: &'a dyn BridgeSource,
    swap_gas: f64,
}

impl<'a> GraphAssembler<'a> {
    pub fn new(
        prices: &'a dyn PriceFeed,
        pools: &'a dyn PoolSource,
        bridges: &'a dyn BridgeSource,
    ) -> Self {
        Self {
            prices,
            pools,
            bridges,
            swap_gas: 0.0,
        }
    }

    /// Gas estimate attached to every swap edge, in the chain's native
    /// unit.
    pub fn with_swap_gas(mut self, swap_gas: f64) -> Self {
        self.swap_gas = swap_gas;
        self
    }

    pub fn assemble(&self, tokens: &[TokenKey]) -> Result<TokenGraph, GraphError> {
        let mut graph = TokenGraph::new();

        for key in tokens {
            let mut vertex = TokenNode::new(key.clone());
            if let Some(price) = self.prices.get_price(&key.symbol) {
                vertex = vertex.with_price_usd(price);
            }
            graph.add_vertex(vertex)?;
        }

        // Same-chain pool discovery, one probe per ordered pair.
        for base in tokens {
            for quote in tokens {
                if base == quote || base.chain != quote.chain {
                    continue;
                }
                let Some(pool) = self.pools.get_pool(&base.chain, &base.symbol, &quote.symbol)
                else {
                    continue;
                };
                if !self.pool_is_sane(&pool) {
                    warn!(
                        "skipping pool {} -> {}: implausible state \
                         (reserves {} / {}, rate {})",
                        base,
                        quote,
                        pool.reserve_base,
                        pool.reserve_quote,
                        pool.spot_rate()
                    );
                    continue;
                }
                graph.add_edge(base, Edge::swap(quote.clone(), pool, self.swap_gas))?;
            }
        }

        // Bridge descriptors, keyed by symbol.
        let mut seen_symbols: Vec<&str> = Vec::new();
        for token in tokens {
            if seen_symbols.contains(&token.symbol.as_str()) {
                continue;
            }
            seen_symbols.push(&token.symbol);

            for descriptor in self.bridges.list_bridge_routes(&token.symbol) {
                let from = TokenKey::new(token.symbol.clone(), descriptor.from_chain.clone());
                let to = TokenKey::new(token.symbol.clone(), descriptor.to_chain.clone());
                if !graph.contains(&from) || !graph.contains(&to) {
                    debug!(
                        "skipping bridge {} -> {}: endpoint not in the vertex set",
                        from, to
                    );
                    continue;
                }
                graph.add_edge(
                    &from,
                    Edge::bridge(
                        to,
                        descriptor.fee_fraction,
                        descriptor.time_delay_s,
                        descriptor.gas,
                    ),
                )?;
            }
        }

        debug!(
            "assembled graph: {} vertices, {} edges",
            graph.vertex_count(),
            graph.edge_count()
        );
        Ok(graph)
    }

    fn pool_is_sane(&self, pool: &LiquidityPool) -> bool {
        let rate = pool.spot_rate();
        pool.reserve_base.is_finite()
            && pool.reserve_quote.is_finite()
            && pool.reserve_base > 0.0
            && pool.reserve_quote > 0.0
            && rate > MIN_SANE_RATE
            && rate < MAX_SANE_RATE
    }
}
