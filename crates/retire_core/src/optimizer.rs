//! Bracket-expand + bisection search for the largest integer annual
//! spending level whose success objective clears a target.

use crate::config::{Mode, OptimizeSuccessMetric, ScenarioConfig};
use crate::kernel::{self, KernelMetrics};
use crate::returns::ReturnsMatrix;

const BRACKET_CAP: i64 = 600_000;

/// Largest `E` found and the metrics of the last passing evaluation.
#[derive(Debug, Clone, Copy)]
pub struct OptimizeOutcome {
    pub e: i64,
    pub metrics: KernelMetrics,
    pub objective: f64,
}

/// Run the bracket-expand-then-bisect search described in spec.md §4.8.
///
/// All evaluations within one call share `returns`, per the determinism
/// contract: the success-vs-spending curve must be monotone apart from
/// discretization noise, which only holds if every candidate `E` sees the
/// same draws.
#[must_use]
pub fn optimize(
    cfg: &ScenarioConfig,
    returns: &ReturnsMatrix,
    start_portfolio: f64,
    reserve_years: f64,
    loan_amount: i64,
) -> OptimizeOutcome {
    let Mode::Optimize {
        target,
        e_lo,
        e_hi,
        e_search_iters,
        optimize_success_metric,
        both_weight,
    } = cfg.mode.clone()
    else {
        panic!("optimizer::optimize called with a non-Optimize mode");
    };

    let eval = |e: i64| -> (KernelMetrics, f64) {
        let m = kernel::simulate(cfg, returns, start_portfolio, reserve_years, loan_amount, e);
        let obj = optimize_success_metric.objective(
            m.p_success_death_weighted,
            m.p_success_to_age_99,
            both_weight,
        );
        (m, obj)
    };

    let (metrics_lo, obj_lo) = eval(e_lo);
    if obj_lo < target {
        return OptimizeOutcome {
            e: e_lo,
            metrics: metrics_lo,
            objective: obj_lo,
        };
    }

    let mut lo = e_lo;
    let mut last_passing_metrics = metrics_lo;
    let mut last_passing_objective = obj_lo;

    let mut hi = e_hi;
    let (mut metrics_hi, mut obj_hi) = eval(hi);
    while obj_hi >= target && hi < BRACKET_CAP {
        lo = hi;
        last_passing_metrics = metrics_hi;
        last_passing_objective = obj_hi;
        hi = ((hi as f64) * 1.25).floor() as i64;
        let (m, o) = eval(hi);
        metrics_hi = m;
        obj_hi = o;
    }

    for _ in 0..e_search_iters {
        if lo >= hi {
            break;
        }
        let mid = (lo + hi) / 2;
        let (m, o) = eval(mid);
        if o >= target {
            lo = mid;
            last_passing_metrics = m;
            last_passing_objective = o;
        } else {
            hi = mid - 1;
        }
    }

    OptimizeOutcome {
        e: lo,
        metrics: last_passing_metrics,
        objective: last_passing_objective,
    }
}
