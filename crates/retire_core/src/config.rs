//! Scenario configuration: the single immutable input to the kernel and optimizer.
//!
//! Mirrors the grouping in the specification: timing, return moments, mode
//! selector, income, spending floor, reserve, guardrails, reverse mortgage,
//! loan, and sweep grid lists.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// How a grid point's annual spending is determined.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Mode {
    /// Evaluate the kernel once at a fixed annual spending level.
    Single { e_fixed: i64 },
    /// Binary-search for the maximum annual spending meeting `target`.
    Optimize {
        target: f64,
        e_lo: i64,
        e_hi: i64,
        e_search_iters: u32,
        optimize_success_metric: OptimizeSuccessMetric,
        both_weight: f64,
    },
}

/// Objective used by the optimizer when comparing a grid point's success
/// probability against `target`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizeSuccessMetric {
    DeathWeighted,
    Age99,
    BothMin,
    BothWeighted,
}

impl OptimizeSuccessMetric {
    /// Combine death-weighted and age-99 success into a single scalar
    /// objective per spec.md §4.8.
    #[must_use]
    pub fn objective(self, p_dw: f64, p99: f64, both_weight: f64) -> f64 {
        match self {
            OptimizeSuccessMetric::DeathWeighted => p_dw,
            OptimizeSuccessMetric::Age99 => p99,
            OptimizeSuccessMetric::BothMin => p_dw.min(p99),
            OptimizeSuccessMetric::BothWeighted => both_weight * p_dw + (1.0 - both_weight) * p99,
        }
    }
}

/// Where surplus income (income exceeding desired spending) is deposited.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurplusAllocation {
    ReserveFirst,
    RiskyFirst,
}

/// The full, immutable scenario passed by value into the kernel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    // --- Timing & return model ---
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_n_sims")]
    pub n_sims: usize,
    #[serde(default = "default_start_age")]
    pub start_age: u32,
    #[serde(default = "default_partial_year_fraction")]
    pub partial_year_fraction: f64,
    #[serde(default = "default_return_mu")]
    pub return_mu_real: f64,
    #[serde(default = "default_return_vol")]
    pub return_vol_real: f64,

    // --- Mode selector ---
    pub mode: Mode,

    // --- Income ---
    #[serde(default)]
    pub ss_annual_real: f64,
    #[serde(default = "default_ss_start_age")]
    pub ss_start_age: u32,
    #[serde(default)]
    pub earned_income_annual_real: f64,
    #[serde(default)]
    pub earned_income_start_age: u32,
    #[serde(default)]
    pub earned_income_end_age: u32,
    #[serde(default = "default_true")]
    pub income_applies_to_actual_spend: bool,
    #[serde(default)]
    pub allow_surplus_savings: bool,
    #[serde(default = "default_surplus_allocation")]
    pub surplus_allocation: SurplusAllocation,

    // --- Spending floor ---
    #[serde(default = "default_floor")]
    pub floor_annual_real: f64,

    // --- Reserve ---
    #[serde(default = "default_reserve_cash_fraction")]
    pub reserve_cash_fraction: f64,
    #[serde(default = "default_safe_real_return")]
    pub safe_real_return: f64,

    // --- Guardrails ---
    #[serde(default = "default_dd1")]
    pub dd1: f64,
    #[serde(default = "default_dd2")]
    pub dd2: f64,
    #[serde(default = "default_cut1")]
    pub cut1: f64,
    #[serde(default = "default_cut2")]
    pub cut2: f64,
    pub baseline_e_for_flex: f64,
    pub baseline_flex_pre: f64,
    pub baseline_net_post_ss: f64,
    pub baseline_flex_post: f64,

    // --- Reverse mortgage ---
    #[serde(default = "default_rm_open_age")]
    pub rm_open_age: u32,
    #[serde(default)]
    pub home_value_real: f64,
    #[serde(default = "default_plf_at_open")]
    pub plf_at_open: f64,
    #[serde(default = "default_rm_limit_real_growth")]
    pub rm_limit_real_growth: f64,
    #[serde(default = "default_rm_bal_real_rate")]
    pub rm_bal_real_rate: f64,
    #[serde(default = "default_rm_partial_cover")]
    pub rm_partial_cover: f64,
    #[serde(default = "default_rm_repay_rate")]
    pub rm_repay_rate: f64,
    #[serde(default = "default_payoff_dd_threshold")]
    pub payoff_dd_threshold: f64,

    // --- Loan ---
    #[serde(default = "default_loan_real_rate")]
    pub loan_real_rate: f64,
    #[serde(default = "default_loan_term_years")]
    pub loan_term_years: u32,
    #[serde(default = "default_loan_bucket_real_return")]
    pub loan_bucket_real_return: f64,
    #[serde(default = "default_loan_bucket_use_dd")]
    pub loan_bucket_use_dd: f64,
    #[serde(default = "default_loan_bucket_partial_cover")]
    pub loan_bucket_partial_cover: f64,

    // --- Sweep grid ---
    pub start_portfolios: Vec<f64>,
    pub reserve_years_list: Vec<f64>,
    pub loan_amounts: Vec<i64>,
}

fn default_seed() -> u64 {
    424_242
}
fn default_n_sims() -> usize {
    25_000
}
fn default_start_age() -> u32 {
    53
}
fn default_partial_year_fraction() -> f64 {
    0.894_444
}
fn default_return_mu() -> f64 {
    0.04
}
fn default_return_vol() -> f64 {
    0.10
}
fn default_ss_start_age() -> u32 {
    63
}
fn default_true() -> bool {
    true
}
fn default_surplus_allocation() -> SurplusAllocation {
    SurplusAllocation::ReserveFirst
}
fn default_floor() -> f64 {
    60_000.0
}
fn default_reserve_cash_fraction() -> f64 {
    0.5
}
fn default_safe_real_return() -> f64 {
    0.01
}
fn default_dd1() -> f64 {
    0.15
}
fn default_dd2() -> f64 {
    0.25
}
fn default_cut1() -> f64 {
    0.50
}
fn default_cut2() -> f64 {
    1.00
}
fn default_rm_open_age() -> u32 {
    62
}
fn default_plf_at_open() -> f64 {
    0.40
}
fn default_rm_limit_real_growth() -> f64 {
    0.015
}
fn default_rm_bal_real_rate() -> f64 {
    0.015
}
fn default_rm_partial_cover() -> f64 {
    0.50
}
fn default_rm_repay_rate() -> f64 {
    0.15
}
fn default_payoff_dd_threshold() -> f64 {
    0.05
}
fn default_loan_real_rate() -> f64 {
    0.03
}
fn default_loan_term_years() -> u32 {
    30
}
fn default_loan_bucket_real_return() -> f64 {
    0.01
}
fn default_loan_bucket_use_dd() -> f64 {
    0.15
}
fn default_loan_bucket_partial_cover() -> f64 {
    0.50
}

impl ScenarioConfig {
    /// Number of simulated years: ages `start_age..=99`.
    #[must_use]
    pub fn n_years(&self) -> usize {
        (99 - self.start_age + 1) as usize
    }

    /// Reject malformed configuration before it reaches the kernel.
    ///
    /// Per-path runtime failure is never validated here — it is a
    /// data-dependent outcome of the simulation, not a configuration error.
    pub fn validate(&self) -> Result<()> {
        if self.dd1 >= self.dd2 {
            return Err(EngineError::Dd1NotLessThanDd2 {
                dd1: self.dd1,
                dd2: self.dd2,
            });
        }
        for (which, value) in [("cut1", self.cut1), ("cut2", self.cut2)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(EngineError::CutOutOfRange { which, value });
            }
        }
        if !(0.0..=1.0).contains(&self.reserve_cash_fraction) {
            return Err(EngineError::ReserveCashFractionOutOfRange(
                self.reserve_cash_fraction,
            ));
        }
        if self.n_sims == 0 {
            return Err(EngineError::NonPositiveSimCount(0));
        }
        if self.start_age > 99 {
            return Err(EngineError::StartAgeTooHigh(self.start_age));
        }
        for (which, list) in [
            ("start_portfolios", self.start_portfolios.len()),
            ("reserve_years_list", self.reserve_years_list.len()),
            ("loan_amounts", self.loan_amounts.len()),
        ] {
            if list == 0 {
                return Err(EngineError::EmptySweepList { which });
            }
        }
        Ok(())
    }
}
