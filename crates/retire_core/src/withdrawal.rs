//! Builds the planned annual spending/withdrawal schedule and the reserve
//! sizing targets that depend on it.

/// Planned annual withdrawal schedule `w[0..n_years)`.
///
/// When `income_applies_to_actual_spend` is true, `w` is simply the
/// planned spending level `E` (income is applied later, against actual
/// spending, by the kernel). Otherwise `w` is the planned *asset*
/// withdrawal: `E` net of Social Security and earned income in force at
/// each year's age. Year 0 scales `E`, SS, and earned income by
/// `partial_year_fraction`.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn build_withdrawals(
    e: f64,
    n_years: usize,
    start_age: u32,
    partial_year_fraction: f64,
    income_applies_to_actual_spend: bool,
    ss_annual_real: f64,
    ss_start_age: u32,
    earned_income_annual_real: f64,
    earned_income_start_age: u32,
    earned_income_end_age: u32,
) -> Vec<f64> {
    let mut w = vec![0.0; n_years];

    if income_applies_to_actual_spend {
        if n_years > 0 {
            w[0] = (e * partial_year_fraction).max(0.0);
        }
        for slot in w.iter_mut().skip(1) {
            *slot = e.max(0.0);
        }
        return w;
    }

    let earned_income = |age: u32| -> f64 {
        if earned_income_annual_real <= 0.0 {
            return 0.0;
        }
        if age < earned_income_start_age || age > earned_income_end_age {
            return 0.0;
        }
        earned_income_annual_real
    };

    for (t, slot) in w.iter_mut().enumerate() {
        let age = start_age + t as u32;
        let ei = earned_income(age);
        let ss = if age >= ss_start_age { ss_annual_real } else { 0.0 };
        *slot = if t == 0 {
            ((e - ss - ei) * partial_year_fraction).max(0.0)
        } else {
            (e - ss - ei).max(0.0)
        };
    }

    w
}

/// Reserve cash/bond targets for year `t`, sized as `reserve_years` times
/// next year's planned withdrawal.
#[must_use]
pub fn safe_targets(w: &[f64], t: usize, reserve_years: f64, reserve_cash_fraction: f64) -> (f64, f64) {
    let next = w[(t + 1).min(w.len() - 1)];
    let target_total = reserve_years * next;
    let target_cash = reserve_cash_fraction * target_total;
    (target_cash, target_total - target_cash)
}
