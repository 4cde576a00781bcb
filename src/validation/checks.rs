//! Per-step route checks.
//!
//! Walks the route in order, re-pricing every hop with the same AMM and
//! bridge math the solvers use, and carrying the recomputed running
//! amount forward. Thresholds come from the caller's limits; severities
//! follow a fixed ladder (liquidity exhaustion is critical, slippage is
//! high but recoverable by reducing size, gas is medium).

use crate::amm;
use crate::config::RouterConfig;
use crate::graph::types::{EdgeKind, RouteResult};

use super::{FailureKind, RouteFailure, Severity, ValidationLimits};

/// Base-reserve fraction above which a trade is rejected outright.
const RESERVE_CRITICAL_FRACTION: f64 = 0.30;
/// Base-reserve fraction above which a warning is attached.
const RESERVE_WARN_FRACTION: f64 = 0.10;
/// Fraction of a limit at which a warning fires.
const WARN_AT_FRACTION_OF_LIMIT: f64 = 0.50;

/// Everything the scoring pass needs from the walk.
pub(super) struct RouteAudit {
    pub failures: Vec<RouteFailure>,
    pub warnings: Vec<String>,
    /// Recomputed price impact per step (zero for bridges and nominal
    /// rates).
    pub step_impacts: Vec<f64>,
    /// Recomputed output at the end of the route.
    pub final_output: f64,
    pub total_gas_usd: f64,
    pub total_time_ms: f64,
}

pub(super) fn audit_route(
    route: &RouteResult,
    input_amount: f64,
    native_price_usd: f64,
    limits: &ValidationLimits,
    config: &RouterConfig,
) -> RouteAudit {
    let mut audit = RouteAudit {
        failures: Vec::new(),
        warnings: Vec::new(),
        step_impacts: Vec::with_capacity(route.steps.len()),
        final_output: input_amount,
        total_gas_usd: 0.0,
        total_time_ms: 0.0,
    };

    let mut amount = input_amount;
    for (index, step) in route.steps.iter().enumerate() {
        let label = format!("{} -> {}", step.from, step.to);
        let mut impact = 0.0;

        match &step.edge.kind {
            EdgeKind::Swap {
                pool: None,
                rate: None,
            } => {
                audit.failures.push(RouteFailure {
                    kind: FailureKind::PoolUnavailable,
                    severity: Severity::Critical,
                    recoverable: false,
                    step: index,
                    message: format!("step {index} ({label}) has no pool and no nominal rate"),
                });
                // Nothing to price the hop with; the amount carries
                // through unchanged so later steps still get audited.
            }
            EdgeKind::Swap {
                pool: None,
                rate: Some(rate),
            } => {
                amount *= rate;
            }
            EdgeKind::Swap {
                pool: Some(pool),
                rate,
            } => {
                let consumed = if pool.reserve_base > 0.0 {
                    amount / pool.reserve_base
                } else {
                    1.0
                };
                if consumed > RESERVE_CRITICAL_FRACTION {
                    audit.failures.push(RouteFailure {
                        kind: FailureKind::InsufficientLiquidity,
                        severity: Severity::Critical,
                        recoverable: false,
                        step: index,
                        message: format!(
                            "step {index} ({label}) consumes {:.1}% of the base reserve",
                            consumed * 100.0
                        ),
                    });
                } else if consumed > RESERVE_WARN_FRACTION {
                    audit.warnings.push(format!(
                        "step {index} ({label}) consumes {:.1}% of the base reserve",
                        consumed * 100.0
                    ));
                }

                match amm::quote(pool, amount, &config.amm) {
                    Ok(quote) => {
                        impact = quote.price_impact;
                        amount = quote.output;
                    }
                    Err(_) => {
                        // The kernel refused the size; the reserve check
                        // above already recorded the critical failure.
                        impact = 1.0;
                        if let Some(rate) = rate {
                            amount *= rate;
                        }
                    }
                }

                if impact > limits.max_slippage {
                    audit.failures.push(RouteFailure {
                        kind: FailureKind::ExcessiveSlippage,
                        severity: Severity::High,
                        recoverable: true,
                        step: index,
                        message: format!(
                            "step {index} ({label}) price impact {:.2}% exceeds {:.2}%",
                            impact * 100.0,
                            limits.max_slippage * 100.0
                        ),
                    });
                } else if impact >= WARN_AT_FRACTION_OF_LIMIT * limits.max_slippage {
                    audit.warnings.push(format!(
                        "step {index} ({label}) price impact {:.2}% nears the {:.2}% limit",
                        impact * 100.0,
                        limits.max_slippage * 100.0
                    ));
                }
            }
            EdgeKind::Bridge { fee_fraction, .. } => {
                amount *= 1.0 - fee_fraction;
            }
        }

        let gas_usd = step.edge.gas * native_price_usd;
        if gas_usd > limits.max_gas_usd {
            audit.failures.push(RouteFailure {
                kind: FailureKind::GasTooHigh,
                severity: Severity::Medium,
                recoverable: true,
                step: index,
                message: format!(
                    "step {index} ({label}) gas ${gas_usd:.2} exceeds ${:.2}",
                    limits.max_gas_usd
                ),
            });
        } else if gas_usd >= WARN_AT_FRACTION_OF_LIMIT * limits.max_gas_usd {
            audit.warnings.push(format!(
                "step {index} ({label}) gas ${gas_usd:.2} nears the ${:.2} limit",
                limits.max_gas_usd
            ));
        }

        audit.step_impacts.push(impact);
        audit.total_gas_usd += gas_usd;
        audit.total_time_ms += step.edge.exec_time_ms;
    }

    if audit.total_time_ms > limits.max_time_ms {
        audit.warnings.push(format!(
            "total execution time {:.0} ms exceeds {:.0} ms",
            audit.total_time_ms, limits.max_time_ms
        ));
    }

    audit.final_output = amount;
    audit
}
