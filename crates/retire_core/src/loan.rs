//! Closed-form amortizing loan math, used both for the up-front cash-out
//! loan bucket and the reverse-mortgage payoff calculation.

/// Level annual payment amortizing `principal` over `term_years` at real
/// rate `rate`. Zero when there is no principal to amortize.
#[must_use]
pub fn amort_payment(principal: f64, rate: f64, term_years: u32) -> f64 {
    if principal <= 0.0 {
        return 0.0;
    }
    let n = f64::from(term_years);
    (rate * principal) / (1.0 - (1.0 + rate).powf(-n))
}

/// Remaining principal after `k` level payments of `payment` against a
/// loan of `principal` at real rate `rate`.
#[must_use]
pub fn balance_after_k(principal: f64, rate: f64, payment: f64, k: u32) -> f64 {
    if principal <= 0.0 {
        return 0.0;
    }
    let growth = (1.0 + rate).powi(k as i32);
    principal * growth - payment * ((growth - 1.0) / rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn zero_principal_has_no_payment() {
        assert_eq!(amort_payment(0.0, 0.03, 30), 0.0);
        assert_eq!(balance_after_k(0.0, 0.03, 1000.0, 5), 0.0);
    }

    #[test]
    fn balance_at_k_zero_is_principal() {
        let bal = balance_after_k(150_000.0, 0.03, 7_650.0, 0);
        assert_eq!(bal, 150_000.0);
    }

    #[test]
    fn balance_at_full_term_is_near_zero() {
        let principal = 150_000.0;
        let rate = 0.03;
        let term = 30;
        let pay = amort_payment(principal, rate, term);
        let bal = balance_after_k(principal, rate, pay, term);
        assert_abs_diff_eq!(bal, 0.0, epsilon = 1e-6);
    }
}
