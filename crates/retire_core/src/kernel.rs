//! The year-by-year, vectorized-across-paths simulation kernel.
//!
//! All per-path quantities are contiguous `Vec<f64>`/`Vec<bool>`/`Vec<u32>`
//! buffers of length `n_sims` (a struct-of-arrays, [`PathArrays`]), and every
//! year step is lane-wise arithmetic over those buffers with boolean masks
//! for the conditional updates (drawdown bands, the `failed` latch, good
//! years). This is deliberate per the specification: rewriting this as an
//! outer loop over paths with an inner loop over years would quadruple
//! memory-bandwidth and break the guarantee that a failure on path `i`
//! never affects path `j`.
//!
//! The 14 year-substeps below execute in exactly the order given in the
//! specification — the order is semantic (reserves refill after spending,
//! RM repayment after refill), not a performance nicety.

use serde::{Deserialize, Serialize};

use crate::config::{ScenarioConfig, SurplusAllocation};
use crate::guardrails::cut;
use crate::loan::{amort_payment, balance_after_k};
use crate::mortality::weighted_success;
use crate::returns::ReturnsMatrix;
use crate::withdrawal::{build_withdrawals, safe_targets};

const EPS: f64 = 1e-9;

/// The ten scalar outputs of a single kernel call, per the fixed schema.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KernelMetrics {
    pub p_success_death_weighted: f64,
    pub p_success_to_age_99: f64,
    pub median_max_dd_risky: f64,
    pub median_max_dd_total: f64,
    pub home_equity_remaining_median: f64,
    pub p_any_rm_draw: f64,
    pub rm_balance_end_median: f64,
    pub risky_end_median: f64,
    pub total_net_end_median: f64,
    pub net_worth_end_median: f64,
}

/// Struct-of-arrays per-path state, allocated once per kernel call and
/// evolved in place for `n_years`, per spec.md §3 ("Lifecycle").
struct PathArrays {
    cash: Vec<f64>,
    base_treas: Vec<f64>,
    risky: Vec<f64>,
    hwm: Vec<f64>,
    total_net: Vec<f64>,
    hwm_total: Vec<f64>,
    max_dd_risky: Vec<f64>,
    max_dd_total: Vec<f64>,
    loan_bucket: Vec<f64>,
    loan_bal: Vec<f64>,
    rm_limit: Vec<f64>,
    rm_bal: Vec<f64>,
    rm_ever_used: Vec<bool>,
    failed: Vec<bool>,
    fail_idx: Vec<u32>,

    // Reusable per-year scratch, avoiding reallocation in the year loop.
    dd: Vec<f64>,
    dd_total: Vec<f64>,
    rem: Vec<f64>,
}

impl PathArrays {
    fn seed(n_sims: usize, start_portfolio: f64, loan_amount: f64, tgt_cash0: f64, tgt_base0: f64) -> Self {
        let init_safe = (tgt_cash0 + tgt_base0).min(start_portfolio);
        let cash0 = tgt_cash0.min(init_safe);
        let base0 = (init_safe - cash0).max(0.0);
        let risky0 = start_portfolio - init_safe;

        let cash = vec![cash0; n_sims];
        let base_treas = vec![base0; n_sims];
        let risky = vec![risky0; n_sims];
        let loan_bucket = vec![loan_amount; n_sims];
        let loan_bal = vec![loan_amount; n_sims];

        let total_net0 = cash0 + base0 + risky0 + loan_amount - loan_amount;

        Self {
            hwm: risky.clone(),
            total_net: vec![total_net0; n_sims],
            hwm_total: vec![total_net0; n_sims],
            max_dd_risky: vec![0.0; n_sims],
            max_dd_total: vec![0.0; n_sims],
            cash,
            base_treas,
            risky,
            loan_bucket,
            loan_bal,
            rm_limit: vec![0.0; n_sims],
            rm_bal: vec![0.0; n_sims],
            rm_ever_used: vec![false; n_sims],
            failed: vec![false; n_sims],
            fail_idx: vec![0; n_sims],
            dd: vec![0.0; n_sims],
            dd_total: vec![0.0; n_sims],
            rem: vec![0.0; n_sims],
        }
    }
}

/// Withdraw up to `rem[i]` from `arr[i]` across all lanes, floored at zero
/// balance; `rem` is reduced by the amount actually taken (spec.md §4.4).
/// Does not clamp `arr` itself at zero — callers rely on the `max(arr, 0)`
/// inside the take.
#[inline]
fn take_from(arr: &mut [f64], rem: &mut [f64]) {
    for i in 0..arr.len() {
        let take = rem[i].min(arr[i].max(0.0));
        arr[i] -= take;
        rem[i] -= take;
    }
}

/// Run one full kernel evaluation for a single grid point at a fixed
/// annual spending level `e`.
#[must_use]
pub fn simulate(
    cfg: &ScenarioConfig,
    returns: &ReturnsMatrix,
    start_portfolio: f64,
    reserve_years: f64,
    loan_amount: i64,
    e: i64,
) -> KernelMetrics {
    let n_sims = cfg.n_sims;
    let n_years = cfg.n_years();
    let horizon = n_years;

    let w = build_withdrawals(
        e as f64,
        n_years,
        cfg.start_age,
        cfg.partial_year_fraction,
        cfg.income_applies_to_actual_spend,
        cfg.ss_annual_real,
        cfg.ss_start_age,
        cfg.earned_income_annual_real,
        cfg.earned_income_start_age,
        cfg.earned_income_end_age,
    );

    let mut floor_assets = vec![cfg.floor_annual_real; n_years];
    if n_years > 0 {
        floor_assets[0] = cfg.floor_annual_real * cfg.partial_year_fraction;
    }

    let pre_flex_pct = if cfg.baseline_e_for_flex > 0.0 {
        cfg.baseline_flex_pre / cfg.baseline_e_for_flex
    } else {
        0.0
    };
    let post_flex_pct = if cfg.baseline_net_post_ss > 0.0 {
        cfg.baseline_flex_post / cfg.baseline_net_post_ss
    } else {
        0.0
    };

    let rm_open_t = cfg.rm_open_age as i64 - cfg.start_age as i64;
    let rm_limit_open = cfg.home_value_real * cfg.plf_at_open;

    let has_loan = loan_amount > 0;
    let loan_amount_f = loan_amount as f64;
    let pay = amort_payment(loan_amount_f, cfg.loan_real_rate, cfg.loan_term_years);

    let (tgt_cash0, tgt_base0) = safe_targets(&w, 0, reserve_years, cfg.reserve_cash_fraction);
    let mut s = PathArrays::seed(
        n_sims,
        start_portfolio,
        if has_loan { loan_amount_f } else { 0.0 },
        tgt_cash0,
        tgt_base0,
    );

    for t in 0..n_years {
        let age_t = cfg.start_age + t as u32;

        // 1. Growth.
        let year_returns = returns.year(t);
        for i in 0..n_sims {
            s.risky[i] *= 1.0 + year_returns[i];
            s.cash[i] *= 1.0 + cfg.safe_real_return;
            s.base_treas[i] *= 1.0 + cfg.safe_real_return;
            if has_loan {
                s.loan_bucket[i] *= 1.0 + cfg.loan_bucket_real_return;
            }
        }

        // 2. Drawdown update.
        for i in 0..n_sims {
            s.hwm[i] = s.hwm[i].max(s.risky[i]);
            s.dd[i] = if s.hwm[i] > 0.0 {
                1.0 - s.risky[i] / s.hwm[i]
            } else {
                0.0
            };
            s.max_dd_risky[i] = s.max_dd_risky[i].max(s.dd[i]);

            s.total_net[i] =
                s.cash[i] + s.base_treas[i] + s.risky[i] + s.loan_bucket[i] - s.loan_bal[i];
            s.hwm_total[i] = s.hwm_total[i].max(s.total_net[i]);
            s.dd_total[i] = if s.hwm_total[i] > 0.0 {
                1.0 - s.total_net[i] / s.hwm_total[i]
            } else {
                0.0
            };
            s.max_dd_total[i] = s.max_dd_total[i].max(s.dd_total[i]);
        }

        // 3. Pre-RM loan payment.
        if has_loan && (t as i64) < rm_open_t {
            s.rem.fill(pay);
            take_from(&mut s.cash, &mut s.rem);
            take_from(&mut s.base_treas, &mut s.rem);
            take_from(&mut s.risky, &mut s.rem);
            for i in 0..n_sims {
                if s.dd[i] >= cfg.loan_bucket_use_dd && !s.failed[i] && s.rem[i] > EPS {
                    let take = s.rem[i].min(s.loan_bucket[i]);
                    s.loan_bucket[i] -= take;
                    s.rem[i] -= take;
                }
                if !s.failed[i] && s.rem[i] > EPS {
                    s.failed[i] = true;
                    s.fail_idx[i] = t as u32;
                }
            }
            let k = t as u32 + 1;
            let new_bal = if k <= cfg.loan_term_years {
                balance_after_k(loan_amount_f, cfg.loan_real_rate, pay, k)
            } else {
                0.0
            };
            s.loan_bal.fill(new_bal);
        }

        // 4. RM open + lien payoff.
        if t as i64 == rm_open_t {
            let new_limit = rm_limit_open * (1.0 + cfg.rm_limit_real_growth);
            s.rm_limit.fill(new_limit);

            if has_loan {
                let mut payoff = s.loan_bal.clone();
                for i in 0..n_sims {
                    let risky_first = s.dd[i] <= cfg.payoff_dd_threshold;
                    if risky_first {
                        let take = payoff[i].min(s.risky[i].max(0.0));
                        s.risky[i] -= take;
                        payoff[i] -= take;
                        let avail_rm = (s.rm_limit[i] - s.rm_bal[i]).max(0.0);
                        let take_rm = payoff[i].min(avail_rm);
                        s.rm_bal[i] += take_rm;
                        payoff[i] -= take_rm;
                    } else {
                        let avail_rm = (s.rm_limit[i] - s.rm_bal[i]).max(0.0);
                        let take_rm = payoff[i].min(avail_rm);
                        s.rm_bal[i] += take_rm;
                        payoff[i] -= take_rm;
                        let take = payoff[i].min(s.risky[i].max(0.0));
                        s.risky[i] -= take;
                        payoff[i] -= take;
                    }
                }
                take_from(&mut s.base_treas, &mut payoff);
                take_from(&mut s.cash, &mut payoff);
                take_from(&mut s.loan_bucket, &mut payoff);

                for i in 0..n_sims {
                    if !s.failed[i] && payoff[i] > EPS {
                        s.failed[i] = true;
                        s.fail_idx[i] = t as u32;
                    }
                }
                s.loan_bal.fill(0.0);
            }
        }

        // 5. RM accrual.
        if t as i64 >= rm_open_t {
            for i in 0..n_sims {
                s.rm_limit[i] *= 1.0 + cfg.rm_limit_real_growth;
                s.rm_bal[i] *= 1.0 + cfg.rm_bal_real_rate;
            }
        }

        // 6. Desired spending.
        let flex_pct = if age_t < cfg.ss_start_age {
            pre_flex_pct
        } else {
            post_flex_pct
        };
        let w_t = w[t];
        let flex_amt = (flex_pct * w_t).min(w_t);
        let floor_amt = w_t - flex_amt;
        let floor_need = floor_assets[t];

        // Scalar income applied at t=0 with partial-year scaling.
        let income_scalar = if cfg.income_applies_to_actual_spend {
            let ei = if cfg.earned_income_annual_real > 0.0
                && age_t >= cfg.earned_income_start_age
                && age_t <= cfg.earned_income_end_age
            {
                cfg.earned_income_annual_real
            } else {
                0.0
            };
            let ss = if age_t >= cfg.ss_start_age {
                cfg.ss_annual_real
            } else {
                0.0
            };
            let (ei, ss) = if t == 0 {
                (ei * cfg.partial_year_fraction, ss * cfg.partial_year_fraction)
            } else {
                (ei, ss)
            };
            ss + ei
        } else {
            0.0
        };

        let mut asset_desired = vec![0.0; n_sims];
        let mut floor_need_assets = vec![0.0; n_sims];
        let mut max_feasible = vec![0.0; n_sims];

        let (tgt_cash_t, tgt_base_t) = safe_targets(&w, t, reserve_years, cfg.reserve_cash_fraction);

        for i in 0..n_sims {
            let cut_i = cut(s.dd[i], cfg.dd1, cfg.dd2, cfg.cut1, cfg.cut2);
            let desired = floor_amt + flex_amt * (1.0 - cut_i);

            // 7. Feasibility ceiling.
            let avail_rm = (s.rm_limit[i] - s.rm_bal[i]).max(0.0);
            let accessible_loan = if s.dd[i] >= cfg.loan_bucket_use_dd {
                s.loan_bucket[i]
            } else {
                0.0
            };
            max_feasible[i] =
                s.cash[i] + s.base_treas[i] + s.risky[i].max(0.0) + avail_rm + accessible_loan;

            // 8. Income application.
            if income_scalar > 0.0 {
                let ad = (desired - income_scalar).max(0.0);
                let fn_ = (floor_need - income_scalar).max(0.0);
                let surplus = (income_scalar - desired).max(0.0);
                asset_desired[i] = ad;
                floor_need_assets[i] = fn_;
                if surplus > 0.0 {
                    match cfg.surplus_allocation {
                        SurplusAllocation::RiskyFirst => {
                            s.risky[i] += surplus;
                        }
                        SurplusAllocation::ReserveFirst => {
                            let mut remaining = surplus;
                            let add_cash = (tgt_cash_t - s.cash[i]).max(0.0).min(remaining);
                            s.cash[i] += add_cash;
                            remaining -= add_cash;
                            let add_base = (tgt_base_t - s.base_treas[i]).max(0.0).min(remaining);
                            s.base_treas[i] += add_base;
                            remaining -= add_base;
                            s.risky[i] += remaining;
                        }
                    }
                }
            } else {
                asset_desired[i] = desired;
                floor_need_assets[i] = floor_need;
            }
        }

        // 9. Feasibility failure.
        for i in 0..n_sims {
            if !s.failed[i] && max_feasible[i] < floor_need_assets[i] - EPS {
                s.failed[i] = true;
                s.fail_idx[i] = t as u32;
            }
        }

        // 10. Spending.
        for i in 0..n_sims {
            s.rem[i] = if s.failed[i] {
                0.0
            } else {
                asset_desired[i].min(max_feasible[i]).max(floor_need_assets[i])
            };
        }

        // 11. Funding order.
        take_from(&mut s.cash, &mut s.rem);
        take_from(&mut s.base_treas, &mut s.rem);

        for i in 0..n_sims {
            if s.dd[i] >= cfg.loan_bucket_use_dd && !s.failed[i] && s.loan_bucket[i] > 0.0 {
                let take = (s.rem[i] * cfg.loan_bucket_partial_cover).min(s.loan_bucket[i]);
                s.loan_bucket[i] -= take;
                s.rem[i] -= take;
            }
        }
        for i in 0..n_sims {
            if s.dd[i] >= cfg.dd2 && !s.failed[i] {
                let avail_rm = (s.rm_limit[i] - s.rm_bal[i]).max(0.0);
                let take = (s.rem[i] * cfg.rm_partial_cover).min(avail_rm);
                s.rm_bal[i] += take;
                s.rem[i] -= take;
            }
        }

        take_from(&mut s.risky, &mut s.rem);

        for i in 0..n_sims {
            let avail_rm = (s.rm_limit[i] - s.rm_bal[i]).max(0.0);
            let take = s.rem[i].min(avail_rm);
            s.rm_bal[i] += take;
            s.rem[i] -= take;
        }
        for i in 0..n_sims {
            if s.dd[i] >= cfg.loan_bucket_use_dd && !s.failed[i] && s.rem[i] > EPS {
                let take = s.rem[i].min(s.loan_bucket[i]);
                s.loan_bucket[i] -= take;
                s.rem[i] -= take;
            }
        }

        // 12. Reserve refill in good years.
        for i in 0..n_sims {
            let good = s.dd[i] < cfg.dd1 && !s.failed[i];
            if good {
                let need_cash = (tgt_cash_t - s.cash[i]).max(0.0);
                let add_cash = need_cash.min(s.risky[i].max(0.0));
                s.risky[i] -= add_cash;
                s.cash[i] += add_cash;

                let need_base = (tgt_base_t - s.base_treas[i]).max(0.0);
                let add_base = need_base.min(s.risky[i].max(0.0));
                s.risky[i] -= add_base;
                s.base_treas[i] += add_base;

                // 13. RM repayment at new highs.
                if s.dd[i] < EPS && s.rm_bal[i] > 0.0 {
                    let repay = (s.rm_bal[i] * cfg.rm_repay_rate).min(s.risky[i].max(0.0));
                    s.risky[i] -= repay;
                    s.rm_bal[i] -= repay;
                }
            }

            // 14. Latch RM usage.
            s.rm_ever_used[i] = s.rm_ever_used[i] || s.rm_bal[i] > 0.0;
        }

        #[cfg(debug_assertions)]
        for i in 0..n_sims {
            debug_assert!(s.rm_bal[i] >= -EPS, "rm_bal went negative: {}", s.rm_bal[i]);
            debug_assert!(
                s.rm_bal[i] <= s.rm_limit[i] + EPS,
                "rm_bal exceeded rm_limit: {} > {}",
                s.rm_bal[i],
                s.rm_limit[i]
            );
        }
    }

    for i in 0..n_sims {
        if !s.failed[i] {
            s.fail_idx[i] = horizon as u32;
        }
    }

    let (p_dw, p99) = weighted_success(&s.fail_idx, cfg.start_age, horizon);

    let home_equity_remaining: Vec<f64> = s
        .rm_bal
        .iter()
        .map(|&rb| (cfg.home_value_real - rb).max(0.0))
        .collect();
    let total_net_end: Vec<f64> = (0..n_sims)
        .map(|i| s.cash[i] + s.base_treas[i] + s.risky[i] + s.loan_bucket[i] - s.loan_bal[i])
        .collect();
    let net_worth_end: Vec<f64> = (0..n_sims)
        .map(|i| total_net_end[i] + home_equity_remaining[i])
        .collect();
    let p_any_rm_draw =
        s.rm_ever_used.iter().filter(|&&u| u).count() as f64 / n_sims.max(1) as f64;

    KernelMetrics {
        p_success_death_weighted: p_dw,
        p_success_to_age_99: p99,
        median_max_dd_risky: median(s.max_dd_risky),
        median_max_dd_total: median(s.max_dd_total),
        home_equity_remaining_median: median(home_equity_remaining),
        p_any_rm_draw,
        rm_balance_end_median: median(s.rm_bal),
        risky_end_median: median(s.risky),
        total_net_end_median: median(total_net_end),
        net_worth_end_median: median(net_worth_end),
    }
}

/// Sample median (average of the two central elements on even length).
fn median(mut values: Vec<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}
