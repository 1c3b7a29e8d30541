//! Loan Amortization - monthly payment schedules under tiered interest rates
//!
//! This library provides:
//! - Rate resolution over fixed-rate promotional tiers and a variable fallback rate
//! - Month-by-month re-amortized payment schedules with summary totals
//! - Effective annual cost of a schedule (IRR)
//! - Parallel batch and index what-if runs

pub mod error;
pub mod loan;
pub mod rates;
pub mod amortization;
pub mod scenario;

// Re-export commonly used types
pub use error::{LoanError, Result};
pub use loan::{Currency, FallbackRate, LoanInput, RatePeriod, ReferenceRate, TermUnit};
pub use rates::{RateResolver, RateRegime};
pub use amortization::{AmortizationEngine, AmortizationResult, AmortizationSummary, PaymentRecord};
pub use scenario::ScenarioRunner;
