//! Running state of one amortization

/// Balance and month counter carried between iterations
#[derive(Debug, Clone)]
pub struct AmortizationState {
    /// Current month (1-indexed; 0 before the first payment)
    pub month: u32,

    /// Total term in months
    pub total_months: u32,

    /// Outstanding balance before this month's payment
    pub balance: f64,
}

impl AmortizationState {
    /// State at origination: full principal outstanding, no payment made
    pub fn new(principal: f64, total_months: u32) -> Self {
        Self {
            month: 0,
            total_months,
            balance: principal,
        }
    }

    /// Whether another month should be scheduled.
    /// Stops once the balance is within `tolerance` of zero or the term is used up.
    pub fn has_next(&self, tolerance: f64) -> bool {
        self.balance > tolerance && self.month < self.total_months
    }

    /// Move to the next month
    pub fn advance_month(&mut self) {
        self.month += 1;
    }

    /// Months left including the current one
    pub fn remaining_months(&self) -> u32 {
        self.total_months - self.month + 1
    }

    /// Apply the principal part of a payment, flooring the balance at zero
    pub fn apply_principal(&mut self, principal: f64) {
        self.balance = (self.balance - principal).max(0.0);
    }
}
