//! Trade-size-aware edge cost.
//!
//! Every edge is priced in one log-space scalar so a single ordering
//! captures rate, gas, and latency: a path's weight is
//! `sum(-ln(rate_i))` plus normalized gas and bridge-delay terms, and
//! minimizing it maximizes the multiplicative output at the target.

use tracing::trace;

use super::types::{Edge, EdgeKind};
use crate::amm;
use crate::config::RouterConfig;

/// Sentinel weight for edges that cannot price the trade at all. Infinity
/// never wins a relaxation, so such edges are dead without special-casing
/// in the solvers.
pub const UNUSABLE_WEIGHT: f64 = f64::INFINITY;

/// Weight and realized output of pushing `amount_in` through one edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeCost {
    pub weight: f64,
    pub output: f64,
}

impl EdgeCost {
    pub fn unusable() -> Self {
        Self {
            weight: UNUSABLE_WEIGHT,
            output: 0.0,
        }
    }

    pub fn is_usable(&self) -> bool {
        self.weight < UNUSABLE_WEIGHT
    }
}

/// Price `amount_in` across `edge`.
///
/// Swap edges consult the pool's AMM closed form; kernel failures fall
/// back to the nominal rate when one exists, otherwise the edge is
/// unusable for this trade. Bridge edges charge a fixed fee plus a
/// latency penalty that makes faster bridges win at equal fee.
pub fn edge_cost(amount_in: f64, edge: &Edge, config: &RouterConfig) -> EdgeCost {
    let gas_term = edge.gas / config.gas_normalizer;

    match &edge.kind {
        EdgeKind::Swap { pool, rate } => {
            if let Some(pool) = pool {
                match amm::quote(pool, amount_in, &config.amm) {
                    Ok(quote) => {
                        return finite_or_unusable(EdgeCost {
                            weight: -quote.effective_rate.ln() + gas_term,
                            output: quote.output,
                        })
                    }
                    Err(err) => {
                        trace!("pool quote failed on edge to {}: {err}", edge.target);
                    }
                }
            }
            match rate {
                Some(rate) => finite_or_unusable(EdgeCost {
                    weight: -rate.ln() + gas_term,
                    output: amount_in * rate,
                }),
                None => EdgeCost::unusable(),
            }
        }
        EdgeKind::Bridge {
            fee_fraction,
            time_delay_s,
        } => {
            let retained = 1.0 - fee_fraction;
            finite_or_unusable(EdgeCost {
                weight: -retained.ln()
                    + time_delay_s * config.bridge_time_coefficient
                    + gas_term,
                output: amount_in * retained,
            })
        }
    }
}

fn finite_or_unusable(cost: EdgeCost) -> EdgeCost {
    if cost.weight.is_finite() && cost.output.is_finite() {
        cost
    } else {
        EdgeCost::unusable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::{LiquidityPool, TokenKey};

    fn config() -> RouterConfig {
        RouterConfig::default()
    }

    fn target() -> TokenKey {
        TokenKey::new("USDC", "ethereum")
    }

    #[test]
    fn nominal_swap_weight_is_log_rate_plus_gas() {
        let edge = Edge::swap_with_rate(target(), 0.5, 2e9);
        let cost = edge_cost(1.0, &edge, &config());
        assert!((cost.weight - (-(0.5f64).ln() + 2.0)).abs() < 1e-12);
        assert_eq!(cost.output, 0.5);
    }

    #[test]
    fn pooled_swap_prices_through_the_kernel() {
        let pool = LiquidityPool::constant_product(1_000.0, 1_000.0, 0.003);
        let edge = Edge::swap(target(), pool, 0.0);
        let cost = edge_cost(100.0, &edge, &config());
        let expected_out = 99_700.0 / 1099.7;
        assert!((cost.output - expected_out).abs() < 1e-9);
        assert!((cost.weight - (-(expected_out / 100.0f64).ln())).abs() < 1e-12);
    }

    #[test]
    fn oversized_trade_falls_back_to_nominal_rate() {
        let pool = LiquidityPool::constant_product(1_000.0, 1_000.0, 0.003);
        let edge = Edge::swap(target(), pool, 0.0).with_rate(0.95);
        let cost = edge_cost(950.0, &edge, &config());
        assert!((cost.weight - (-(0.95f64).ln())).abs() < 1e-12);
        assert!((cost.output - 950.0 * 0.95).abs() < 1e-12);
    }

    #[test]
    fn oversized_trade_without_fallback_is_unusable() {
        let pool = LiquidityPool::constant_product(1_000.0, 1_000.0, 0.003);
        let edge = Edge::swap(target(), pool, 0.0);
        let cost = edge_cost(950.0, &edge, &config());
        assert!(!cost.is_usable());
        assert_eq!(cost.weight, UNUSABLE_WEIGHT);
    }

    #[test]
    fn empty_swap_edge_is_unusable() {
        let edge = Edge {
            target: target(),
            kind: EdgeKind::Swap {
                pool: None,
                rate: None,
            },
            gas: 0.0,
            exec_time_ms: 0.0,
        };
        assert!(!edge_cost(1.0, &edge, &config()).is_usable());
    }

    #[test]
    fn bridge_weight_folds_fee_delay_and_gas() {
        let edge = Edge::bridge(TokenKey::new("USDC", "polygon"), 0.001, 120.0, 5e8);
        let cost = edge_cost(1_000.0, &edge, &config());
        let expected = -(0.999f64).ln() + 120.0 * 1e-5 + 0.5;
        assert!((cost.weight - expected).abs() < 1e-12);
        assert!((cost.output - 999.0).abs() < 1e-12);
    }

    #[test]
    fn weights_stay_non_negative_for_sub_unit_rates() {
        for rate in [0.1, 0.5, 0.9999, 1.0] {
            let edge = Edge::swap_with_rate(target(), rate, 0.0);
            assert!(edge_cost(1.0, &edge, &config()).weight >= 0.0);
        }
    }
}
