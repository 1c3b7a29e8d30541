//! Core amortization engine with month-by-month re-amortization

use super::schedule::{AmortizationResult, PaymentRecord};
use super::state::AmortizationState;
use crate::error::{LoanError, Result};
use crate::loan::{LoanInput, ReferenceRate};
use crate::rates::RateResolver;
use log::debug;

/// Balance below which the loan counts as repaid
pub const DEFAULT_BALANCE_TOLERANCE: f64 = 0.01;

/// Longest accepted term (100 years). Anything above is rejected as invalid input.
pub const MAX_TERM_MONTHS: i64 = 1200;

/// Configuration for an amortization run
#[derive(Debug, Clone)]
pub struct AmortizationConfig {
    /// Residual balance absorbed as floating-point drift
    pub balance_tolerance: f64,
}

impl Default for AmortizationConfig {
    fn default() -> Self {
        Self {
            balance_tolerance: DEFAULT_BALANCE_TOLERANCE,
        }
    }
}

/// Level payment that repays `balance` over `remaining_months` at `monthly_rate`.
///
/// A zero rate pays the balance off in equal principal instalments.
pub fn annuity_payment(balance: f64, monthly_rate: f64, remaining_months: u32) -> f64 {
    if monthly_rate == 0.0 {
        return balance / remaining_months as f64;
    }
    let growth = (1.0 + monthly_rate).powf(remaining_months as f64);
    balance * (monthly_rate * growth) / (growth - 1.0)
}

/// Main amortization engine
#[derive(Debug, Clone, Default)]
pub struct AmortizationEngine {
    config: AmortizationConfig,
}

impl AmortizationEngine {
    pub fn new(config: AmortizationConfig) -> Self {
        Self { config }
    }

    /// Build the payment schedule for one loan.
    ///
    /// Incomplete input (non-positive or non-numeric principal, zero term,
    /// non-numeric fallback) yields an empty result. A negative term or one
    /// longer than `MAX_TERM_MONTHS` is a caller bug and is rejected with
    /// `LoanError::InvalidInput`.
    pub fn run(&self, input: &LoanInput) -> Result<AmortizationResult> {
        if input.total_months < 0 {
            return Err(LoanError::InvalidInput(format!(
                "total_months must not be negative (got {})",
                input.total_months
            )));
        }
        if input.total_months > MAX_TERM_MONTHS {
            return Err(LoanError::InvalidInput(format!(
                "total_months {} exceeds the maximum of {}",
                input.total_months, MAX_TERM_MONTHS
            )));
        }
        let total_months = input.total_months as u32;

        if !input.is_computable() {
            debug!("incomplete loan input, returning empty schedule");
            return Ok(AmortizationResult::empty());
        }

        if input.fallback.reference == ReferenceRate::Treasury {
            debug!(
                "treasury-labelled fallback: variable rate is margin {}% + index {}%",
                input.fallback.margin_percent, input.fallback.index_percent
            );
        }

        let resolver = RateResolver::from_input(input);
        let mut state = AmortizationState::new(input.principal, total_months);
        let mut schedule = Vec::new();

        while state.has_next(self.config.balance_tolerance) {
            state.advance_month();
            let monthly_rate = resolver.rate_for(state.month);
            schedule.push(self.calculate_month(&mut state, monthly_rate));
        }

        let result = AmortizationResult::from_schedule(schedule);
        debug!(
            "amortized {:.2} over {} of {} months, residual {:.6}",
            input.principal,
            result.months(),
            total_months,
            state.balance
        );

        Ok(result)
    }

    /// Re-derive the annuity payment from the current balance, rate and
    /// remaining term, then apply it
    fn calculate_month(&self, state: &mut AmortizationState, monthly_rate: f64) -> PaymentRecord {
        let payment = annuity_payment(state.balance, monthly_rate, state.remaining_months());
        let interest = state.balance * monthly_rate;
        let principal = payment - interest;

        state.apply_principal(principal);

        PaymentRecord {
            month: state.month,
            payment,
            principal,
            interest,
            balance_after: state.balance,
            annual_rate_percent: monthly_rate * 12.0 * 100.0,
        }
    }
}

/// Run with the default configuration
pub fn run(input: &LoanInput) -> Result<AmortizationResult> {
    AmortizationEngine::default().run(input)
}
