use std::fmt;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::amm::DEFAULT_STABLE_FEE;

/// Canonical vertex identity: a token symbol pinned to a chain.
///
/// The string form is `SYMBOL.chain` (`USDC.ethereum`). Keys compare by
/// exact equality; whatever casing the ingestion side provides is what
/// the graph stores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenKey {
    pub symbol: String,
    pub chain: String,
}

impl TokenKey {
    pub fn new(symbol: impl Into<String>, chain: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            chain: chain.into(),
        }
    }

    /// Parse the canonical `SYMBOL.chain` form. The first dot splits the
    /// two parts; both must be non-empty.
    pub fn parse(s: &str) -> Option<Self> {
        let (symbol, chain) = s.split_once('.')?;
        if symbol.is_empty() || chain.is_empty() {
            return None;
        }
        Some(Self::new(symbol, chain))
    }
}

impl fmt::Display for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.symbol, self.chain)
    }
}

/// Vertex payload: the key plus advisory metadata baked in by the
/// ingestion side. None of it affects routing; the validator and display
/// layers read it.
#[derive(Debug, Clone)]
pub struct TokenNode {
    pub key: TokenKey,
    pub address: Option<Address>,
    pub decimals: Option<u8>,
    pub price_usd: Option<f64>,
}

impl TokenNode {
    pub fn new(key: TokenKey) -> Self {
        Self {
            key,
            address: None,
            decimals: None,
            price_usd: None,
        }
    }

    pub fn with_address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = Some(decimals);
        self
    }

    pub fn with_price_usd(mut self, price_usd: f64) -> Self {
        self.price_usd = Some(price_usd);
        self
    }
}

/// Pool family, selecting which AMM closed form prices a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolKind {
    ConstantProduct,
    StableSwap,
    ConcentratedLiquidity,
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolKind::ConstantProduct => write!(f, "constant_product"),
            PoolKind::StableSwap => write!(f, "stable_swap"),
            PoolKind::ConcentratedLiquidity => write!(f, "concentrated_liquidity"),
        }
    }
}

/// Liquidity pool state backing a swap edge, denominated in the two
/// tokens' native units. `liquidity_usd` and `volume_24h` are advisory:
/// the validator reads them, the solvers never do.
///
/// The serde field names are the stable wire names, not the struct names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidityPool {
    pub reserve_base: f64,
    pub reserve_quote: f64,
    pub liquidity_usd: f64,
    #[serde(rename = "fee_percent")]
    pub fee_fraction: f64,
    #[serde(rename = "pool_type")]
    pub pool_kind: PoolKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_24h: Option<f64>,
}

impl LiquidityPool {
    pub fn new(pool_kind: PoolKind, reserve_base: f64, reserve_quote: f64, fee_fraction: f64) -> Self {
        Self {
            reserve_base,
            reserve_quote,
            liquidity_usd: 0.0,
            fee_fraction,
            pool_kind,
            volume_24h: None,
        }
    }

    pub fn constant_product(reserve_base: f64, reserve_quote: f64, fee_fraction: f64) -> Self {
        Self::new(PoolKind::ConstantProduct, reserve_base, reserve_quote, fee_fraction)
    }

    /// Stable-swap pool at the default 4 bp fee.
    pub fn stable_swap(reserve_base: f64, reserve_quote: f64) -> Self {
        Self::new(PoolKind::StableSwap, reserve_base, reserve_quote, DEFAULT_STABLE_FEE)
    }

    pub fn concentrated(reserve_base: f64, reserve_quote: f64, fee_fraction: f64) -> Self {
        Self::new(PoolKind::ConcentratedLiquidity, reserve_base, reserve_quote, fee_fraction)
    }

    pub fn with_liquidity_usd(mut self, liquidity_usd: f64) -> Self {
        self.liquidity_usd = liquidity_usd;
        self
    }

    pub fn with_volume_24h(mut self, volume_24h: f64) -> Self {
        self.volume_24h = Some(volume_24h);
        self
    }

    /// Zero-size exchange rate base -> quote, before fees.
    pub fn spot_rate(&self) -> f64 {
        if self.reserve_base > 0.0 {
            self.reserve_quote / self.reserve_base
        } else {
            0.0
        }
    }

    /// Mirror of this pool for the opposite trade direction.
    pub fn reversed(&self) -> Self {
        Self {
            reserve_base: self.reserve_quote,
            reserve_quote: self.reserve_base,
            ..self.clone()
        }
    }
}

/// What an edge traverses: a same-chain swap or a cross-chain bridge.
///
/// Bridges carry no pool by construction; their cost is a fixed fee plus
/// a latency penalty.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeKind {
    Swap {
        pool: Option<LiquidityPool>,
        /// Fallback exchange rate used when no pool is attached or the
        /// kernel rejects the trade size.
        rate: Option<f64>,
    },
    Bridge {
        fee_fraction: f64,
        time_delay_s: f64,
    },
}

/// Default execution-time estimate for a swap edge (about one L1 block).
pub const DEFAULT_SWAP_TIME_MS: f64 = 12_000.0;

/// A directed edge of the token graph. Immutable once added.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub target: TokenKey,
    pub kind: EdgeKind,
    /// Gas cost in the source chain's native unit.
    pub gas: f64,
    /// Estimated execution time for this hop.
    pub exec_time_ms: f64,
}

impl Edge {
    /// Swap edge backed by a pool.
    pub fn swap(target: TokenKey, pool: LiquidityPool, gas: f64) -> Self {
        Self {
            target,
            kind: EdgeKind::Swap {
                pool: Some(pool),
                rate: None,
            },
            gas,
            exec_time_ms: DEFAULT_SWAP_TIME_MS,
        }
    }

    /// Swap edge with only a nominal rate (no pool, no size dependence).
    pub fn swap_with_rate(target: TokenKey, rate: f64, gas: f64) -> Self {
        Self {
            target,
            kind: EdgeKind::Swap {
                pool: None,
                rate: Some(rate),
            },
            gas,
            exec_time_ms: DEFAULT_SWAP_TIME_MS,
        }
    }

    /// Bridge edge; execution time defaults to the bridge delay.
    pub fn bridge(target: TokenKey, fee_fraction: f64, time_delay_s: f64, gas: f64) -> Self {
        Self {
            target,
            kind: EdgeKind::Bridge {
                fee_fraction,
                time_delay_s,
            },
            gas,
            exec_time_ms: time_delay_s * 1_000.0,
        }
    }

    /// Attach a fallback nominal rate to a pooled swap edge.
    pub fn with_rate(mut self, nominal_rate: f64) -> Self {
        if let EdgeKind::Swap { ref mut rate, .. } = self.kind {
            *rate = Some(nominal_rate);
        }
        self
    }

    pub fn with_exec_time_ms(mut self, exec_time_ms: f64) -> Self {
        self.exec_time_ms = exec_time_ms;
        self
    }

    pub fn is_bridge(&self) -> bool {
        matches!(self.kind, EdgeKind::Bridge { .. })
    }

    pub fn kind_label(&self) -> &'static str {
        match self.kind {
            EdgeKind::Swap { .. } => "swap",
            EdgeKind::Bridge { .. } => "bridge",
        }
    }

    pub fn pool(&self) -> Option<&LiquidityPool> {
        match &self.kind {
            EdgeKind::Swap { pool, .. } => pool.as_ref(),
            EdgeKind::Bridge { .. } => None,
        }
    }

    pub fn nominal_rate(&self) -> Option<f64> {
        match &self.kind {
            EdgeKind::Swap { rate, .. } => *rate,
            EdgeKind::Bridge { .. } => None,
        }
    }
}

/// One hop of a computed route, with the amounts realized at solve time.
#[derive(Debug, Clone)]
pub struct RouteStep {
    pub from: TokenKey,
    pub to: TokenKey,
    pub weight: f64,
    pub input_amount: f64,
    pub output_amount: f64,
    pub edge: Edge,
}

impl RouteStep {
    /// Realized rate across this hop.
    pub fn effective_rate(&self) -> f64 {
        if self.input_amount > 0.0 {
            self.output_amount / self.input_amount
        } else {
            0.0
        }
    }
}

/// A computed route: the vertex path, its hops, and the totals the solver
/// settled on. Produced per query; the engine never retains one.
#[derive(Debug, Clone)]
pub struct RouteResult {
    pub path: Vec<TokenKey>,
    pub steps: Vec<RouteStep>,
    pub total_weight: f64,
    pub estimated_output: f64,
}

impl RouteResult {
    pub fn hop_count(&self) -> usize {
        self.steps.len()
    }

    pub fn bridge_count(&self) -> usize {
        self.steps.iter().filter(|s| s.edge.is_bridge()).count()
    }

    pub fn total_gas(&self) -> f64 {
        self.steps.iter().map(|s| s.edge.gas).sum()
    }

    pub fn total_time_ms(&self) -> f64 {
        self.steps.iter().map(|s| s.edge.exec_time_ms).sum()
    }

    /// Formatted vertex path for logs: `WETH.ethereum -> USDC.ethereum`.
    pub fn token_path(&self) -> String {
        self.path
            .iter()
            .map(TokenKey::to_string)
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    /// One-line summary for logs.
    pub fn summary(&self) -> String {
        format!(
            "{} | {} hop(s), {} bridge(s) | weight {:.6} | out {:.6}",
            self.token_path(),
            self.hop_count(),
            self.bridge_count(),
            self.total_weight,
            self.estimated_output
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_key_round_trips_canonical_form() {
        let key = TokenKey::new("USDC", "ethereum");
        assert_eq!(key.to_string(), "USDC.ethereum");
        assert_eq!(TokenKey::parse("USDC.ethereum"), Some(key));
        assert_eq!(TokenKey::parse("USDC"), None);
        assert_eq!(TokenKey::parse(".ethereum"), None);
        assert_eq!(TokenKey::parse("USDC."), None);
    }

    #[test]
    fn token_keys_compare_exactly() {
        assert_ne!(
            TokenKey::new("usdc", "ethereum"),
            TokenKey::new("USDC", "ethereum")
        );
    }

    #[test]
    fn bridge_edges_never_expose_a_pool() {
        let edge = Edge::bridge(TokenKey::new("USDC", "polygon"), 0.001, 120.0, 0.0);
        assert!(edge.is_bridge());
        assert!(edge.pool().is_none());
        assert!(edge.nominal_rate().is_none());
        assert_eq!(edge.exec_time_ms, 120_000.0);
    }

    #[test]
    fn pool_reversal_mirrors_reserves() {
        let pool = LiquidityPool::constant_product(1_000.0, 4_000.0, 0.003).with_liquidity_usd(8_000.0);
        let rev = pool.reversed();
        assert_eq!(rev.reserve_base, 4_000.0);
        assert_eq!(rev.reserve_quote, 1_000.0);
        assert_eq!(rev.liquidity_usd, 8_000.0);
        assert_eq!(pool.spot_rate(), 4.0);
        assert_eq!(rev.spot_rate(), 0.25);
    }

    #[test]
    fn route_totals_sum_over_steps() {
        let a = TokenKey::new("A", "eth");
        let b = TokenKey::new("B", "eth");
        let b2 = TokenKey::new("B", "poly");
        let route = RouteResult {
            path: vec![a.clone(), b.clone(), b2.clone()],
            steps: vec![
                RouteStep {
                    from: a.clone(),
                    to: b.clone(),
                    weight: 0.1,
                    input_amount: 1.0,
                    output_amount: 0.9,
                    edge: Edge::swap_with_rate(b.clone(), 0.9, 2.0),
                },
                RouteStep {
                    from: b.clone(),
                    to: b2.clone(),
                    weight: 0.05,
                    input_amount: 0.9,
                    output_amount: 0.89,
                    edge: Edge::bridge(b2, 0.001, 60.0, 1.0),
                },
            ],
            total_weight: 0.15,
            estimated_output: 0.89,
        };
        assert_eq!(route.hop_count(), 2);
        assert_eq!(route.bridge_count(), 1);
        assert_eq!(route.total_gas(), 3.0);
        assert_eq!(route.total_time_ms(), DEFAULT_SWAP_TIME_MS + 60_000.0);
        assert_eq!(route.token_path(), "A.eth -> B.eth -> B.poly");
        assert!(route.summary().contains("2 hop(s), 1 bridge(s)"));
    }
}
