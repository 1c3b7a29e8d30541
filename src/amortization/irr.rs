//! Internal Rate of Return (IRR) of a loan's cash flows
//!
//! Used to express the true annual cost of a tiered schedule as a single rate

use super::schedule::PaymentRecord;

const TOLERANCE: f64 = 1e-12;
const MAX_ITERATIONS: usize = 1000;
const RATE_FLOOR: f64 = -0.99;
const RATE_CEILING: f64 = 10.0;

/// NPV of `cashflows` at a periodic `rate` and its derivative, in one pass.
/// Discount factors are built up by repeated multiplication.
fn npv_with_slope(cashflows: &[f64], rate: f64) -> (f64, f64) {
    let step = 1.0 / (1.0 + rate);
    let mut factor = 1.0;
    let mut npv = 0.0;
    let mut slope = 0.0;

    for (t, &cf) in cashflows.iter().enumerate() {
        npv += cf * factor;
        slope -= t as f64 * cf * factor * step;
        factor *= step;
    }

    (npv, slope)
}

/// Periodic IRR of a series of cash flows.
///
/// Newton-Raphson starting from `guess`; if the slope vanishes or the
/// iteration stalls, bisection over [-99%, 1000%] per period takes over.
/// None when the flows never change sign or no root is bracketed.
pub fn periodic_irr(cashflows: &[f64], guess: f64) -> Option<f64> {
    let has_inflow = cashflows.iter().any(|&cf| cf > 1e-10);
    let has_outflow = cashflows.iter().any(|&cf| cf < -1e-10);
    if !has_inflow || !has_outflow {
        return None;
    }

    let mut rate = guess.clamp(RATE_FLOOR, RATE_CEILING);
    for _ in 0..MAX_ITERATIONS {
        let (npv, slope) = npv_with_slope(cashflows, rate);
        if slope.abs() < 1e-20 {
            break;
        }

        let next = (rate - npv / slope).clamp(RATE_FLOOR, RATE_CEILING);
        if (next - rate).abs() < TOLERANCE {
            return Some(next);
        }
        rate = next;
    }

    let npv = |r: f64| npv_with_slope(cashflows, r).0;
    let (mut low, mut high) = (RATE_FLOOR, RATE_CEILING);
    let mut npv_low = npv(low);
    if npv_low * npv(high) > 0.0 {
        return None;
    }

    for _ in 0..MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        let npv_mid = npv(mid);
        if npv_mid.abs() < TOLERANCE || (high - low) / 2.0 < TOLERANCE {
            return Some(mid);
        }
        if npv_mid * npv_low < 0.0 {
            high = mid;
        } else {
            low = mid;
            npv_low = npv_mid;
        }
    }

    None
}

/// Borrower cash flows: principal received at month 0, payments out afterwards.
/// Any balance left when the term runs out is added to the last outflow.
pub fn borrower_cashflows(principal: f64, schedule: &[PaymentRecord]) -> Vec<f64> {
    let mut cashflows = Vec::with_capacity(schedule.len() + 1);
    cashflows.push(principal);
    cashflows.extend(schedule.iter().map(|r| -r.payment));

    if let (Some(last), Some(record)) = (cashflows.last_mut(), schedule.last()) {
        *last -= record.balance_after;
    }

    cashflows
}

/// Monthly IRR of a schedule, seeded with the rate charged in its first month
fn schedule_monthly_rate(principal: f64, schedule: &[PaymentRecord]) -> Option<f64> {
    let first = schedule.first()?;
    let guess = first.annual_rate_percent / 100.0 / 12.0;
    periodic_irr(&borrower_cashflows(principal, schedule), guess)
}

/// Nominal annual rate (monthly IRR × 12), as a decimal
pub fn nominal_annual_rate(principal: f64, schedule: &[PaymentRecord]) -> Option<f64> {
    schedule_monthly_rate(principal, schedule).map(|m| m * 12.0)
}

/// Effective annual rate (monthly IRR compounded over 12 months), as a decimal
pub fn effective_annual_rate(principal: f64, schedule: &[PaymentRecord]) -> Option<f64> {
    schedule_monthly_rate(principal, schedule).map(|m| (1.0 + m).powi(12) - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::run;
    use crate::loan::{FallbackRate, LoanInput, RatePeriod};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_simple_irr() {
        // 1000 out, 1100 back after 12 periods
        let mut cashflows = vec![-1000.0];
        cashflows.extend(vec![0.0; 11]);
        cashflows.push(1100.0);

        let monthly = periodic_irr(&cashflows, 0.0).unwrap();
        assert_abs_diff_eq!((1.0 + monthly).powi(12) - 1.0, 0.10, epsilon = 1e-6);
    }

    #[test]
    fn test_no_sign_change() {
        assert_eq!(periodic_irr(&[100.0, 50.0], 0.01), None);
        assert_eq!(periodic_irr(&[], 0.01), None);
    }

    #[test]
    fn test_npv_slope_matches_closed_form() {
        let cashflows = [1000.0, -300.0, -400.0, -500.0];
        let rate = 0.02;
        let (npv, slope) = npv_with_slope(&cashflows, rate);

        let expected_npv: f64 = cashflows
            .iter()
            .enumerate()
            .map(|(t, cf)| cf / (1.0 + rate).powi(t as i32))
            .sum();
        let expected_slope: f64 = cashflows
            .iter()
            .enumerate()
            .map(|(t, cf)| -(t as f64) * cf / (1.0 + rate).powi(t as i32 + 1))
            .sum();

        assert_abs_diff_eq!(npv, expected_npv, epsilon = 1e-9);
        assert_abs_diff_eq!(slope, expected_slope, epsilon = 1e-9);
    }

    #[test]
    fn test_poor_guess_still_converges() {
        let input = LoanInput::new(50_000.0, 60, FallbackRate::new(4.0, 1.0));
        let result = run(&input).unwrap();
        let cashflows = borrower_cashflows(input.principal, &result.schedule);

        let from_seed = periodic_irr(&cashflows, 0.05 / 12.0).unwrap();
        let from_far = periodic_irr(&cashflows, 5.0).unwrap();
        assert_abs_diff_eq!(from_seed, 0.05 / 12.0, epsilon = 1e-9);
        assert_abs_diff_eq!(from_far, from_seed, epsilon = 1e-9);
    }

    #[test]
    fn test_constant_rate_loan_recovers_rate() {
        let input = LoanInput::new(100_000.0, 240, FallbackRate::new(3.0, 2.5));
        let result = run(&input).unwrap();

        let nominal = nominal_annual_rate(input.principal, &result.schedule).unwrap();
        assert_abs_diff_eq!(nominal, 0.055, epsilon = 1e-7);

        let effective = effective_annual_rate(input.principal, &result.schedule).unwrap();
        assert_abs_diff_eq!(effective, (1.0 + 0.055 / 12.0_f64).powi(12) - 1.0, epsilon = 1e-7);
    }

    #[test]
    fn test_promotional_tier_lowers_cost() {
        let input = LoanInput::new(100_000.0, 240, FallbackRate::new(3.0, 2.5))
            .with_tiers(vec![RatePeriod::new(24, 1.0)]);
        let result = run(&input).unwrap();
        let nominal = nominal_annual_rate(input.principal, &result.schedule).unwrap();

        assert!(nominal > 0.01 && nominal < 0.055);
    }

    #[test]
    fn test_residual_balance_counted() {
        let schedule = vec![PaymentRecord {
            month: 1,
            payment: 60.0,
            principal: 50.0,
            interest: 10.0,
            balance_after: 50.0,
            annual_rate_percent: 120.0,
        }];
        let cashflows = borrower_cashflows(100.0, &schedule);
        assert_eq!(cashflows, vec![100.0, -110.0]);
    }

    #[test]
    fn test_empty_schedule_has_no_rate() {
        assert_eq!(nominal_annual_rate(1000.0, &[]), None);
        assert_eq!(effective_annual_rate(1000.0, &[]), None);
    }
}
