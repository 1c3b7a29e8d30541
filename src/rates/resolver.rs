//! Month-to-rate resolution over promotional tiers and the fallback rate

use crate::loan::{FallbackRate, LoanInput, RatePeriod};
use serde::{Deserialize, Serialize};

/// Monthly rate applying to `month` (1-indexed).
///
/// Tiers are walked in order; disabled or malformed tiers are skipped and do
/// not advance the cumulative month count. The first tier whose cumulative
/// end reaches `month` wins, otherwise the fallback (margin + index) applies.
/// Durations may be fractional: a 12.5-month tier covers month 12, not 13.
pub fn rate_for(month: u32, tiers: &[RatePeriod], fallback: &FallbackRate) -> f64 {
    let mut cumulative_months = 0.0;

    for (duration, annual_rate) in tiers.iter().filter_map(RatePeriod::active_terms) {
        cumulative_months += duration;
        if month as f64 <= cumulative_months {
            return annual_rate / 100.0 / 12.0;
        }
    }

    fallback.monthly_rate()
}

/// Where a regime's rate comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateSource {
    /// Position of the tier in the configured list (disabled tiers included)
    Tier(usize),
    Fallback,
}

/// A contiguous run of months sharing one rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateRegime {
    pub start_month: u32,
    pub end_month: u32,
    pub annual_rate_percent: f64,
    pub source: RateSource,
}

impl RateRegime {
    pub fn months(&self) -> u32 {
        self.end_month - self.start_month + 1
    }

    pub fn monthly_rate(&self) -> f64 {
        self.annual_rate_percent / 100.0 / 12.0
    }
}

/// Rate lookup bound to one loan's tier list and fallback
#[derive(Debug, Clone, Copy)]
pub struct RateResolver<'a> {
    tiers: &'a [RatePeriod],
    fallback: &'a FallbackRate,
}

impl<'a> RateResolver<'a> {
    pub fn new(tiers: &'a [RatePeriod], fallback: &'a FallbackRate) -> Self {
        Self { tiers, fallback }
    }

    pub fn from_input(input: &'a LoanInput) -> Self {
        Self::new(&input.tiers, &input.fallback)
    }

    /// Monthly rate (fraction) for a 1-indexed month
    pub fn rate_for(&self, month: u32) -> f64 {
        rate_for(month, self.tiers, self.fallback)
    }

    /// Rate plan over `total_months`, one entry per contiguous regime.
    /// Tiers that cover no whole month produce no entry; everything is clipped to the term.
    pub fn regimes(&self, total_months: u32) -> Vec<RateRegime> {
        let mut regimes = Vec::new();
        let mut cumulative = 0.0;
        // Highest month already claimed by an earlier tier
        let mut covered: u32 = 0;

        for (idx, tier) in self.tiers.iter().enumerate() {
            if covered >= total_months {
                break;
            }
            let Some((duration, annual_rate)) = tier.active_terms() else {
                continue;
            };
            cumulative += duration;

            let end = whole_months(cumulative, total_months);
            if end <= covered {
                continue;
            }
            regimes.push(RateRegime {
                start_month: covered + 1,
                end_month: end,
                annual_rate_percent: annual_rate,
                source: RateSource::Tier(idx),
            });
            covered = end;
        }

        if covered < total_months {
            regimes.push(RateRegime {
                start_month: covered + 1,
                end_month: total_months,
                annual_rate_percent: self.fallback.annual_rate_percent(),
                source: RateSource::Fallback,
            });
        }

        regimes
    }
}

/// Last whole month reached by a cumulative duration, clamped to the term
fn whole_months(cumulative: f64, total_months: u32) -> u32 {
    cumulative.floor().clamp(0.0, total_months as f64) as u32
}
