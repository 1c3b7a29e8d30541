//! Schedule output structures

use serde::{Deserialize, Serialize};

/// One month of the payment schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// 1-indexed month
    pub month: u32,

    /// Total paid this month (principal + interest)
    pub payment: f64,
    pub principal: f64,
    pub interest: f64,

    /// Outstanding balance after the payment, never negative
    pub balance_after: f64,

    /// Annualised rate applied this month, in percent
    pub annual_rate_percent: f64,
}

/// Totals over a whole schedule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSummary {
    pub total_payment: f64,
    pub total_interest: f64,
    pub average_monthly_payment: f64,
}

impl AmortizationSummary {
    pub fn from_schedule(schedule: &[PaymentRecord]) -> Self {
        let total_payment: f64 = schedule.iter().map(|r| r.payment).sum();
        let total_interest: f64 = schedule.iter().map(|r| r.interest).sum();

        let average_monthly_payment = if schedule.is_empty() {
            0.0
        } else {
            total_payment / schedule.len() as f64
        };

        Self {
            total_payment,
            total_interest,
            average_monthly_payment,
        }
    }
}

/// Complete amortization result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AmortizationResult {
    pub schedule: Vec<PaymentRecord>,
    pub summary: AmortizationSummary,
}

impl AmortizationResult {
    /// Empty schedule with a zero summary ("nothing to compute yet")
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_schedule(schedule: Vec<PaymentRecord>) -> Self {
        let summary = AmortizationSummary::from_schedule(&schedule);
        Self { schedule, summary }
    }

    pub fn is_empty(&self) -> bool {
        self.schedule.is_empty()
    }

    /// Number of months actually scheduled
    pub fn months(&self) -> usize {
        self.schedule.len()
    }

    /// Balance left after the last scheduled month
    pub fn final_balance(&self) -> Option<f64> {
        self.schedule.last().map(|r| r.balance_after)
    }

    /// Total principal repaid
    pub fn total_principal(&self) -> f64 {
        self.schedule.iter().map(|r| r.principal).sum()
    }
}
