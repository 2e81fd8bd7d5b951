//! Cross-module integration tests for the retirement simulation engine.
//!
//! Tests are organized by topic:
//! - `scenarios` — the named end-to-end scenarios (S1-S6)
//! - `properties` — the universal testable properties that span more than
//!   one module (determinism, success-counting identity, optimizer
//!   correctness at the returned bound)


use crate::config::{Mode, ScenarioConfig, SurplusAllocation};

/// Shared scenario skeleton for the S1-S6 fixtures; individual tests
/// override only the fields the scenario calls out.
pub(crate) fn s1_base() -> ScenarioConfig {
    ScenarioConfig {
        seed: 424_242,
        n_sims: 3_000,
        start_age: 53,
        partial_year_fraction: 0.894_444,
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
        start_portfolios: vec![1_477_000.0],
        reserve_years_list: vec![1.0],
        loan_amounts: vec![0],
    }
}
