//! AMM cost kernel.
//!
//! Pure swap math for the three supported pool families:
//! - Constant product (`x * y = k`, Uniswap-V2 style)
//! - Stable swap (constant-sum/constant-product blend, Curve style)
//! - Concentrated liquidity (constant product over the active range,
//!   Uniswap-V3 style)
//!
//! No I/O, no shared state: every function maps `(input, pool state)` to a
//! quote. Errors are raised here and recovered by the edge cost layer.
//!
//! The solvers rely on one property of all three families: the per-unit
//! rate `output/input` is monotonically non-increasing in input size.
//! A pool family violating that (larger trades getting a better rate)
//! must not be wired into this kernel.

use crate::config::AmmConfig;
use crate::errors::AmmError;
use crate::graph::types::{LiquidityPool, PoolKind};

/// Fee fraction applied to stable-swap pools constructed without an
/// explicit fee (4 bp, the common stablecoin-pool tier).
pub const DEFAULT_STABLE_FEE: f64 = 0.0004;

/// Result of quoting a single swap against a pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwapQuote {
    /// Amount of the quote token leaving the pool.
    pub output: f64,
    /// Realized `output / input` at this trade size.
    pub effective_rate: f64,
    /// Relative loss versus the spot rate, in `[0, 1]`.
    pub price_impact: f64,
}

/// Quote a swap against `pool`, dispatching on the pool family.
pub fn quote(pool: &LiquidityPool, dx: f64, amm: &AmmConfig) -> Result<SwapQuote, AmmError> {
    match pool.pool_kind {
        PoolKind::ConstantProduct => constant_product_quote(
            dx,
            pool.reserve_base,
            pool.reserve_quote,
            pool.fee_fraction,
            amm.max_trade_fraction,
        ),
        PoolKind::StableSwap => stable_swap_quote(
            dx,
            pool.reserve_base,
            pool.reserve_quote,
            amm.default_stable_amp,
            pool.fee_fraction,
            amm.max_trade_fraction,
        ),
        PoolKind::ConcentratedLiquidity => concentrated_quote(
            dx,
            pool.reserve_base,
            pool.reserve_quote,
            amm.active_range_fraction,
            pool.fee_fraction,
            amm.max_trade_fraction,
        ),
    }
}

/// Constant-product swap: `out = y * dx * (1-f) / (x + dx * (1-f))`.
pub fn constant_product_quote(
    dx: f64,
    reserve_base: f64,
    reserve_quote: f64,
    fee_fraction: f64,
    max_trade_fraction: f64,
) -> Result<SwapQuote, AmmError> {
    if reserve_base <= 0.0 || reserve_quote <= 0.0 {
        return Err(AmmError::NonPositiveReserve {
            base: reserve_base,
            quote: reserve_quote,
        });
    }
    if dx <= 0.0 {
        return Err(AmmError::NonPositiveInput(dx));
    }
    if dx >= max_trade_fraction * reserve_base {
        return Err(AmmError::TradeTooLarge {
            amount: dx,
            reserve_base,
        });
    }

    let dx_after_fee = dx * (1.0 - fee_fraction);
    let output = reserve_quote * dx_after_fee / (reserve_base + dx_after_fee);
    let effective_rate = output / dx;
    let spot_rate = (reserve_quote / reserve_base) * (1.0 - fee_fraction);
    let price_impact = (1.0 - effective_rate / spot_rate).clamp(0.0, 1.0);

    Ok(SwapQuote {
        output,
        effective_rate,
        price_impact,
    })
}

/// Stable swap: blends a constant-sum output with the constant-product
/// output. The blend weight grows with amplification and with reserve
/// balance, so a balanced, highly amplified pool trades near 1:1.
pub fn stable_swap_quote(
    dx: f64,
    reserve_base: f64,
    reserve_quote: f64,
    amplification: f64,
    fee_fraction: f64,
    max_trade_fraction: f64,
) -> Result<SwapQuote, AmmError> {
    let cp = constant_product_quote(
        dx,
        reserve_base,
        reserve_quote,
        fee_fraction,
        max_trade_fraction,
    )?;

    let balance = reserve_base.min(reserve_quote) / reserve_base.max(reserve_quote);
    let weight = (amplification / 200.0).min(1.0) * balance;

    let constant_sum_out = dx * (1.0 - fee_fraction);
    let output = weight * constant_sum_out + (1.0 - weight) * cp.output;
    let effective_rate = output / dx;
    let spot_rate = (reserve_quote / reserve_base) * (1.0 - fee_fraction);
    let price_impact = (1.0 - effective_rate / spot_rate).clamp(0.0, 1.0);

    Ok(SwapQuote {
        output,
        effective_rate,
        price_impact,
    })
}

/// Concentrated liquidity: only the active range of the reserves backs the
/// trade, so the pool behaves like a smaller constant-product pool.
pub fn concentrated_quote(
    dx: f64,
    reserve_base: f64,
    reserve_quote: f64,
    active_range_fraction: f64,
    fee_fraction: f64,
    max_trade_fraction: f64,
) -> Result<SwapQuote, AmmError> {
    constant_product_quote(
        dx,
        reserve_base * active_range_fraction,
        reserve_quote * active_range_fraction,
        fee_fraction,
        max_trade_fraction,
    )
}
