//! Amortization engine and schedule analytics

mod state;
mod engine;
mod schedule;
mod irr;

pub use state::AmortizationState;
pub use engine::{annuity_payment, run, AmortizationConfig, AmortizationEngine, DEFAULT_BALANCE_TOLERANCE, MAX_TERM_MONTHS};
pub use schedule::{AmortizationResult, AmortizationSummary, PaymentRecord};
pub use irr::{borrower_cashflows, effective_annual_rate, nominal_annual_rate, periodic_irr};
