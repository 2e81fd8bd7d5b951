//! Drives the Cartesian-product grid of `start_portfolios ×
//! reserve_years_list × loan_amounts`, dispatching each point to the
//! kernel (single mode) or the optimizer (optimize mode).

use serde::{Deserialize, Serialize};

use crate::config::{Mode, ScenarioConfig};
use crate::error::Result;
use crate::kernel::{self, KernelMetrics};
use crate::optimizer;
use crate::returns::ReturnsMatrix;

/// One row of sweep output: grid coordinates, the spending level used, and
/// the ten kernel metrics, per spec.md §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridPointResult {
    pub start_portfolio: f64,
    pub reserve_years: f64,
    pub loan_amount: i64,
    #[serde(rename = "E_real_per_year", skip_serializing_if = "Option::is_none")]
    pub e_real_per_year: Option<i64>,
    #[serde(rename = "max_E_real_per_year", skip_serializing_if = "Option::is_none")]
    pub max_e_real_per_year: Option<i64>,
    #[serde(flatten)]
    pub metrics: KernelMetrics,
}

/// Validate `cfg`, build the returns matrix once, and evaluate every grid
/// point in listed sweep order. With the `parallel` feature (the default),
/// grid points are dispatched across a rayon pool; output order always
/// matches input order regardless of completion order.
pub fn run(cfg: &ScenarioConfig) -> Result<Vec<GridPointResult>> {
    cfg.validate()?;

    let returns = ReturnsMatrix::generate(
        cfg.seed,
        cfg.n_sims,
        cfg.n_years(),
        cfg.return_mu_real,
        cfg.return_vol_real,
    );

    let grid: Vec<(f64, f64, i64)> = cfg
        .start_portfolios
        .iter()
        .flat_map(|&sp| {
            cfg.reserve_years_list.iter().flat_map(move |&ry| {
                cfg.loan_amounts.iter().map(move |&la| (sp, ry, la))
            })
        })
        .collect();

    tracing::debug!(grid_points = grid.len(), "dispatching sweep");

    #[cfg(feature = "parallel")]
    let results: Vec<GridPointResult> = {
        use rayon::prelude::*;
        grid.into_par_iter()
            .map(|(sp, ry, la)| evaluate_point(cfg, &returns, sp, ry, la))
            .collect()
    };

    #[cfg(not(feature = "parallel"))]
    let results: Vec<GridPointResult> = grid
        .into_iter()
        .map(|(sp, ry, la)| evaluate_point(cfg, &returns, sp, ry, la))
        .collect();

    Ok(results)
}

fn evaluate_point(
    cfg: &ScenarioConfig,
    returns: &ReturnsMatrix,
    start_portfolio: f64,
    reserve_years: f64,
    loan_amount: i64,
) -> GridPointResult {
    match cfg.mode {
        Mode::Single { e_fixed } => {
            let metrics = kernel::simulate(cfg, returns, start_portfolio, reserve_years, loan_amount, e_fixed);
            GridPointResult {
                start_portfolio,
                reserve_years,
                loan_amount,
                e_real_per_year: Some(e_fixed),
                max_e_real_per_year: None,
                metrics,
            }
        }
        Mode::Optimize { .. } => {
            let outcome = optimizer::optimize(cfg, returns, start_portfolio, reserve_years, loan_amount);
            GridPointResult {
                start_portfolio,
                reserve_years,
                loan_amount,
                e_real_per_year: None,
                max_e_real_per_year: Some(outcome.e),
                metrics: outcome.metrics,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OptimizeSuccessMetric, SurplusAllocation};

    fn base() -> ScenarioConfig {
        ScenarioConfig {
            seed: 7,
            n_sims: 200,
            start_age: 53,
            partial_year_fraction: 1.0,
            return_mu_real: 0.04,
            return_vol_real: 0.10,
            mode: Mode::Single { e_fixed: 80_000 },
            ss_annual_real: 0.0,
            ss_start_age: 63,
            earned_income_annual_real: 0.0,
            earned_income_start_age: 0,
            earned_income_end_age: 0,
            income_applies_to_actual_spend: true,
            allow_surplus_savings: false,
            surplus_allocation: SurplusAllocation::ReserveFirst,
            floor_annual_real: 60_000.0,
            reserve_cash_fraction: 0.5,
            safe_real_return: 0.01,
            dd1: 0.15,
            dd2: 0.25,
            cut1: 0.5,
            cut2: 1.0,
            baseline_e_for_flex: 99_300.0,
            baseline_flex_pre: 20_000.0,
            baseline_net_post_ss: 52_895.0,
            baseline_flex_post: 10_000.0,
            rm_open_age: 62,
            home_value_real: 0.0,
            plf_at_open: 0.40,
            rm_limit_real_growth: 0.015,
            rm_bal_real_rate: 0.015,
            rm_partial_cover: 0.5,
            rm_repay_rate: 0.15,
            payoff_dd_threshold: 0.05,
            loan_real_rate: 0.03,
            loan_term_years: 30,
            loan_bucket_real_return: 0.01,
            loan_bucket_use_dd: 0.15,
            loan_bucket_partial_cover: 0.5,
            start_portfolios: vec![1_000_000.0, 1_500_000.0],
            reserve_years_list: vec![1.0, 2.0],
            loan_amounts: vec![0, 100_000],
        }
    }

    #[test]
    fn emits_full_cartesian_product_in_listed_order() {
        let cfg = base();
        let results = run(&cfg).unwrap();
        assert_eq!(results.len(), 2 * 2 * 2);
        assert_eq!(results[0].start_portfolio, 1_000_000.0);
        assert_eq!(results[0].reserve_years, 1.0);
        assert_eq!(results[0].loan_amount, 0);
        assert_eq!(results[1].loan_amount, 100_000);
        assert_eq!(results[7].start_portfolio, 1_500_000.0);
    }

    #[test]
    fn single_mode_populates_e_real_per_year_only() {
        let cfg = base();
        let results = run(&cfg).unwrap();
        assert_eq!(results[0].e_real_per_year, Some(80_000));
        assert!(results[0].max_e_real_per_year.is_none());
    }

    #[test]
    fn optimize_mode_populates_max_e_real_per_year_only() {
        let mut cfg = base();
        cfg.mode = Mode::Optimize {
            target: 0.8,
            e_lo: 40_000,
            e_hi: 120_000,
            e_search_iters: 20,
            optimize_success_metric: OptimizeSuccessMetric::DeathWeighted,
            both_weight: 0.5,
        };
        let results = run(&cfg).unwrap();
        assert!(results[0].e_real_per_year.is_none());
        assert!(results[0].max_e_real_per_year.is_some());
    }

    #[test]
    fn rejects_invalid_config_before_dispatch() {
        let mut cfg = base();
        cfg.dd1 = 0.5;
        cfg.dd2 = 0.3;
        assert!(run(&cfg).is_err());
    }
}
