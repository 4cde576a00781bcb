//! Routing engine configuration.
//!
//! All tunables live here so a query is reproducible from a config value
//! alone. Defaults match the constants the cost model and tests are pinned
//! against; override per engine instance, not per query.

/// Tunables for the AMM kernel.
#[derive(Debug, Clone)]
pub struct AmmConfig {
    /// Fraction of a concentrated-liquidity pool's reserves treated as
    /// active around the current price.
    pub active_range_fraction: f64,
    /// Amplification coefficient used for stable-swap pools, which do not
    /// carry their own.
    pub default_stable_amp: f64,
    /// Largest input the kernel will quote, as a fraction of the base
    /// reserve. Inputs at or above this fail with `TradeTooLarge`.
    pub max_trade_fraction: f64,
}

impl Default for AmmConfig {
    fn default() -> Self {
        Self {
            active_range_fraction: 0.30,
            default_stable_amp: 100.0,
            max_trade_fraction: 0.90,
        }
    }
}

/// Top-level routing configuration shared by both solvers, the edge cost
/// function, and the validator.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Divisor that places gas (chain native units) on the same magnitude
    /// as log-rate weight contributions.
    pub gas_normalizer: f64,
    /// Weight added per second of bridge delay, so faster bridges win at
    /// equal fee.
    pub bridge_time_coefficient: f64,
    /// Hop cap applied when a query does not pass its own.
    pub default_max_hops: u32,
    /// Below this vertex count the engine prefers the classic solver; the
    /// pivot machinery only pays off on larger graphs.
    pub classic_threshold: usize,
    pub amm: AmmConfig,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            gas_normalizer: 1e9,
            bridge_time_coefficient: 1e-5,
            default_max_hops: 4,
            classic_threshold: 50,
            amm: AmmConfig::default(),
        }
    }
}

impl RouterConfig {
    /// Effective hop cap for a query: the explicit override if given,
    /// otherwise the configured default.
    pub fn max_hops_or_default(&self, max_hops: Option<u32>) -> u32 {
        max_hops.unwrap_or(self.default_max_hops)
    }
}
