//! Route quality validation.
//!
//! The validator is the contract boundary behind the solvers: it re-runs
//! the AMM and bridge math step by step instead of trusting the solver's
//! recorded amounts, carries the running trade size through the route,
//! and reports structured failures plus a weighted 0-100 quality score.
//! Quality problems are never errors; a caller gets a report either way.

mod checks;
mod scoring;

use serde::Serialize;

pub use scoring::QualityMetrics;

use crate::config::RouterConfig;
use crate::graph::types::RouteResult;

/// Caller budgets for a route.
#[derive(Debug, Clone)]
pub struct ValidationLimits {
    /// Largest acceptable per-step price impact, as a fraction.
    pub max_slippage: f64,
    /// Largest acceptable per-step gas cost in USD.
    pub max_gas_usd: f64,
    /// Largest acceptable total execution time.
    pub max_time_ms: f64,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_slippage: 0.05,
            max_gas_usd: 50.0,
            max_time_ms: 600_000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Critical => write!(f, "critical"),
            Severity::High => write!(f, "high"),
            Severity::Medium => write!(f, "medium"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    PoolUnavailable,
    InsufficientLiquidity,
    ExcessiveSlippage,
    GasTooHigh,
}

/// A single check failure, tied to the step that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct RouteFailure {
    pub kind: FailureKind,
    pub severity: Severity,
    /// Whether shrinking the trade could clear the failure.
    pub recoverable: bool,
    pub step: usize,
    pub message: String,
}

/// Full validation report for one route at one trade size.
#[derive(Debug, Clone, Serialize)]
pub struct Validation {
    pub is_valid: bool,
    pub overall_score: f64,
    pub failures: Vec<RouteFailure>,
    pub warnings: Vec<String>,
    pub quality: QualityMetrics,
}

impl Validation {
    /// Compact report for logs.
    pub fn summary(&self) -> String {
        format!(
            "{} | score {:.1} | {} failure(s), {} warning(s)",
            if self.is_valid { "VALID" } else { "REJECTED" },
            self.overall_score,
            self.failures.len(),
            self.warnings.len()
        )
    }
}

/// Scores routes against caller limits.
pub struct RouteValidator {
    config: RouterConfig,
    limits: ValidationLimits,
}

impl RouteValidator {
    pub fn new(config: RouterConfig, limits: ValidationLimits) -> Self {
        Self { config, limits }
    }

    pub fn with_defaults() -> Self {
        Self::new(RouterConfig::default(), ValidationLimits::default())
    }

    /// Validate `route` for `input_amount`, converting gas with
    /// `native_price_usd`. Deterministic: identical inputs produce an
    /// identical report.
    pub fn validate(
        &self,
        route: &RouteResult,
        input_amount: f64,
        native_price_usd: f64,
    ) -> Validation {
        let audit = checks::audit_route(
            route,
            input_amount,
            native_price_usd,
            &self.limits,
            &self.config,
        );
        let quality = scoring::quality_metrics(route, &audit, input_amount);
        let overall_score = scoring::overall_score(&quality);

        let is_valid = !audit
            .failures
            .iter()
            .any(|f| f.severity == Severity::Critical);
        if !is_valid {
            tracing::debug!(
                "route {} rejected: {} critical failure(s)",
                route.token_path(),
                audit
                    .failures
                    .iter()
                    .filter(|f| f.severity == Severity::Critical)
                    .count()
            );
        }

        Validation {
            is_valid,
            overall_score,
            failures: audit.failures,
            warnings: audit.warnings,
            quality,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::{Edge, LiquidityPool, RouteStep, TokenKey};

    fn key(symbol: &str) -> TokenKey {
        TokenKey::new(symbol, "eth")
    }

    fn pooled_route(reserve: f64, dx: f64) -> RouteResult {
        let pool = LiquidityPool::constant_product(reserve, reserve, 0.003)
            .with_liquidity_usd(2.0 * reserve);
        let out = reserve * dx * 0.997 / (reserve + dx * 0.997);
        RouteResult {
            path: vec![key("A"), key("B")],
            steps: vec![RouteStep {
                from: key("A"),
                to: key("B"),
                weight: -(out / dx).ln(),
                input_amount: dx,
                output_amount: out,
                edge: Edge::swap(key("B"), pool, 0.0),
            }],
            total_weight: -(out / dx).ln(),
            estimated_output: out,
        }
    }

    #[test]
    fn clean_route_is_valid() {
        let route = pooled_route(1_000_000.0, 100.0);
        let report = RouteValidator::with_defaults().validate(&route, 100.0, 3_000.0);
        assert!(report.is_valid);
        assert!(report.failures.is_empty());
        assert!(report.warnings.is_empty());
        assert!(report.overall_score > 50.0);
    }

    #[test]
    fn deep_trade_is_critical() {
        // 35% of the base reserve.
        let route = pooled_route(1_000.0, 350.0);
        let report = RouteValidator::with_defaults().validate(&route, 350.0, 3_000.0);
        assert!(!report.is_valid);
        assert!(report
            .failures
            .iter()
            .any(|f| f.kind == FailureKind::InsufficientLiquidity
                && f.severity == Severity::Critical
                && !f.recoverable));
    }

    #[test]
    fn reports_are_deterministic() {
        let route = pooled_route(10_000.0, 1_500.0);
        let validator = RouteValidator::with_defaults();
        let a = validator.validate(&route, 1_500.0, 3_000.0);
        let b = validator.validate(&route, 1_500.0, 3_000.0);
        assert_eq!(a.overall_score, b.overall_score);
        assert_eq!(a.is_valid, b.is_valid);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn summary_mentions_verdict() {
        let route = pooled_route(1_000_000.0, 100.0);
        let report = RouteValidator::with_defaults().validate(&route, 100.0, 3_000.0);
        assert!(report.summary().starts_with("VALID"));
    }
}
