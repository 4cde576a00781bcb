//! Quality metrics and the overall route score.
//!
//! Seven metrics in `[0, 1]`, combined with fixed weights into a 0-100
//! score rounded to one decimal. The weights are part of the crate's
//! stable surface; golden tests pin them.

use serde::Serialize;

use crate::graph::types::{EdgeKind, RouteResult};

use super::checks::RouteAudit;

const WEIGHT_OUTPUT_EFFICIENCY: f64 = 0.35;
const WEIGHT_GAS_EFFICIENCY: f64 = 0.15;
const WEIGHT_PRICE_IMPACT: f64 = 0.25;
const WEIGHT_LIQUIDITY: f64 = 0.10;
const WEIGHT_DIVERSIFICATION: f64 = 0.05;
const WEIGHT_RISK: f64 = 0.05;
const WEIGHT_TIME: f64 = 0.05;

/// Per-metric breakdown behind an overall score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityMetrics {
    /// Realized output relative to the zero-impact spot output.
    pub output_efficiency: f64,
    /// Output bought per gas dollar, saturated at 100:1.
    pub gas_efficiency: f64,
    /// One minus the accumulated price impact.
    pub price_impact_score: f64,
    /// Log-scaled average pool depth of the swap steps.
    pub liquidity_score: f64,
    /// Distinct pool families used, out of three.
    pub diversification_score: f64,
    /// Penalty for bridge hops and thin pools.
    pub risk_score: f64,
    /// Penalty for slow routes, zeroing out at ten minutes.
    pub time_score: f64,
}

pub(super) fn quality_metrics(
    route: &RouteResult,
    audit: &RouteAudit,
    input_amount: f64,
) -> QualityMetrics {
    let theoretical = theoretical_output(route, input_amount);
    let output_efficiency = if theoretical > 0.0 {
        (audit.final_output / theoretical).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let gas_efficiency = if audit.total_gas_usd > 0.0 {
        (audit.final_output / audit.total_gas_usd).min(100.0) / 100.0
    } else {
        1.0
    };

    let total_slippage: f64 = audit.step_impacts.iter().sum();
    let price_impact_score = (1.0 - total_slippage).max(0.0);

    let pool_depths: Vec<f64> = route
        .steps
        .iter()
        .filter_map(|s| s.edge.pool().map(|p| p.liquidity_usd))
        .collect();
    let avg_depth = if pool_depths.is_empty() {
        0.0
    } else {
        pool_depths.iter().sum::<f64>() / pool_depths.len() as f64
    };
    let liquidity_score = ((avg_depth + 1.0).log10() / 6.0).min(1.0);

    let mut kinds: Vec<_> = route
        .steps
        .iter()
        .filter_map(|s| s.edge.pool().map(|p| p.pool_kind))
        .collect();
    kinds.sort_unstable_by_key(|k| *k as u8);
    kinds.dedup();
    let diversification_score = (kinds.len() as f64 / 3.0).min(1.0);

    let bridge_count = route
        .steps
        .iter()
        .filter(|s| matches!(s.edge.kind, EdgeKind::Bridge { .. }))
        .count();
    let risk_score =
        (1.0 - (bridge_count as f64 * 0.2 + (1.0 - liquidity_score) * 0.3)).max(0.0);

    let time_score = (1.0 - audit.total_time_ms / 600_000.0).max(0.0);

    QualityMetrics {
        output_efficiency,
        gas_efficiency,
        price_impact_score,
        liquidity_score,
        diversification_score,
        risk_score,
        time_score,
    }
}

/// Weighted sum scaled to 0-100, one decimal.
pub(super) fn overall_score(quality: &QualityMetrics) -> f64 {
    let weighted = WEIGHT_OUTPUT_EFFICIENCY * quality.output_efficiency
        + WEIGHT_GAS_EFFICIENCY * quality.gas_efficiency
        + WEIGHT_PRICE_IMPACT * quality.price_impact_score
        + WEIGHT_LIQUIDITY * quality.liquidity_score
        + WEIGHT_DIVERSIFICATION * quality.diversification_score
        + WEIGHT_RISK * quality.risk_score
        + WEIGHT_TIME * quality.time_score;
    (weighted * 1_000.0).round() / 10.0
}

/// Output the route would produce at spot prices (fees included, no
/// size impact): the denominator of `output_efficiency`.
fn theoretical_output(route: &RouteResult, input_amount: f64) -> f64 {
    let mut amount = input_amount;
    for step in &route.steps {
        match &step.edge.kind {
            EdgeKind::Swap { pool: Some(pool), .. } => {
                amount *= pool.spot_rate() * (1.0 - pool.fee_fraction);
            }
            EdgeKind::Swap { pool: None, rate } => {
                amount *= rate.unwrap_or(1.0);
            }
            EdgeKind::Bridge { fee_fraction, .. } => {
                amount *= 1.0 - fee_fraction;
            }
        }
    }
    amount
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(value: f64) -> QualityMetrics {
        QualityMetrics {
            output_efficiency: value,
            gas_efficiency: value,
            price_impact_score: value,
            liquidity_score: value,
            diversification_score: value,
            risk_score: value,
            time_score: value,
        }
    }

    #[test]
    fn weights_sum_to_one() {
        assert!((overall_score(&flat(1.0)) - 100.0).abs() < 1e-9);
        assert_eq!(overall_score(&flat(0.0)), 0.0);
    }

    #[test]
    fn score_rounds_to_one_decimal() {
        let mut quality = flat(0.0);
        quality.output_efficiency = 0.333_33;
        // 0.35 * 0.33333 * 100 = 11.66655 -> 11.7
        assert_eq!(overall_score(&quality), 11.7);
    }

    #[test]
    fn liquidity_score_saturates_at_a_million() {
        // log10(1e6 + 1) / 6 ~= 1.0
        let depth: f64 = 1_000_000.0;
        let score = ((depth + 1.0).log10() / 6.0).min(1.0);
        assert!((score - 1.0).abs() < 1e-6);
    }
}
