//! Loan input structures: promotional tiers, the variable fallback rate and the loan itself

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

fn default_enabled() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

/// Deserialize a form field that may hold a number, numeric text, or junk.
///
/// Text is parsed leniently; anything that is not a finite number becomes `None`.
/// Use with `#[serde(default, deserialize_with = "...")]` on `Option<f64>` fields.
pub fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Option::<NumberOrText>::deserialize(deserializer)? {
        Some(NumberOrText::Number(n)) => Some(n),
        Some(NumberOrText::Text(s)) => parse_number(&s),
        Some(NumberOrText::Other(_)) | None => None,
    };
    Ok(value.filter(|n| n.is_finite()))
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// One fixed-rate promotional tier
///
/// Duration and rate are optional so a partially-filled row can be carried
/// through unchanged; such a row is skipped during rate resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatePeriod {
    /// Length of the tier in months. Fractional lengths are kept; a 12.5-month
    /// tier covers months 1 to 12.
    #[serde(default, deserialize_with = "lenient_number")]
    pub duration_months: Option<f64>,

    /// Nominal annual rate in percent (1.0 = 1%)
    #[serde(default, deserialize_with = "lenient_number")]
    pub annual_rate_percent: Option<f64>,

    /// Disabled tiers consume no months
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl RatePeriod {
    /// Create an enabled, well-formed tier
    pub fn new(duration_months: u32, annual_rate_percent: f64) -> Self {
        Self {
            duration_months: Some(duration_months as f64),
            annual_rate_percent: Some(annual_rate_percent),
            enabled: true,
        }
    }

    /// Same tier with the enabled flag replaced
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Build a tier from raw text fields, leaving unparsable fields empty
    pub fn parse(months: &str, rate: &str, enabled: bool) -> Self {
        Self {
            duration_months: parse_number(months),
            annual_rate_percent: parse_number(rate),
            enabled,
        }
    }

    /// Duration and annual rate, if this tier takes part in rate resolution
    pub fn active_terms(&self) -> Option<(f64, f64)> {
        if !self.enabled {
            return None;
        }
        self.numeric_terms()
    }

    /// True when both fields hold usable numbers
    pub fn is_well_formed(&self) -> bool {
        self.numeric_terms().is_some()
    }

    fn numeric_terms(&self) -> Option<(f64, f64)> {
        match (self.duration_months, self.annual_rate_percent) {
            (Some(months), Some(rate)) if months.is_finite() && rate.is_finite() => {
                Some((months, rate))
            }
            _ => None,
        }
    }
}

/// Reference index family shown next to the variable rate
///
/// This is a label only. The variable rate is always margin + index,
/// whatever the label says.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReferenceRate {
    #[default]
    Euribor,
    Treasury,
}

impl ReferenceRate {
    pub fn label(&self) -> &'static str {
        match self {
            ReferenceRate::Euribor => "Euribor",
            ReferenceRate::Treasury => "Treasury bonds",
        }
    }
}

/// Variable rate applied once every enabled tier has run out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackRate {
    /// Bank margin in percent
    pub margin_percent: f64,

    /// Reference index in percent, supplied by the caller
    pub index_percent: f64,

    #[serde(default)]
    pub reference: ReferenceRate,
}

impl FallbackRate {
    pub fn new(margin_percent: f64, index_percent: f64) -> Self {
        Self {
            margin_percent,
            index_percent,
            reference: ReferenceRate::default(),
        }
    }

    pub fn with_reference(mut self, reference: ReferenceRate) -> Self {
        self.reference = reference;
        self
    }

    /// Effective annual rate in percent
    pub fn annual_rate_percent(&self) -> f64 {
        self.margin_percent + self.index_percent
    }

    /// Periodic (monthly) rate as a fraction
    pub fn monthly_rate(&self) -> f64 {
        self.annual_rate_percent() / 100.0 / 12.0
    }

    pub fn is_numeric(&self) -> bool {
        self.margin_percent.is_finite() && self.index_percent.is_finite()
    }
}

/// Display currency. Selects a code and the default reference label, nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Eur,
    All,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::All => "ALL",
        }
    }

    /// Lek loans are quoted against treasury bonds, euro loans against Euribor
    pub fn reference_rate(&self) -> ReferenceRate {
        match self {
            Currency::Eur => ReferenceRate::Euribor,
            Currency::All => ReferenceRate::Treasury,
        }
    }

    /// Two-decimal amount followed by the currency code
    pub fn format(&self, amount: f64) -> String {
        format!("{:.2} {}", amount, self.code())
    }
}

/// Unit the caller entered the term in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermUnit {
    #[default]
    Years,
    Months,
}

impl TermUnit {
    /// Convert a term value to whole months.
    /// Returns None for non-finite or non-positive values.
    pub fn to_months(&self, value: f64) -> Option<i64> {
        if !value.is_finite() || value <= 0.0 {
            return None;
        }
        let months = match self {
            TermUnit::Years => value * 12.0,
            TermUnit::Months => value,
        };
        Some(months.round() as i64)
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "years" | "year" | "y" => Some(TermUnit::Years),
            "months" | "month" | "m" => Some(TermUnit::Months),
            _ => None,
        }
    }
}

/// Everything the engine needs for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanInput {
    pub principal: f64,

    /// Total term in months. Zero is "nothing to compute yet", negative is rejected.
    pub total_months: i64,

    /// Promotional tiers in evaluation order
    #[serde(default)]
    pub tiers: Vec<RatePeriod>,

    pub fallback: FallbackRate,
}

impl LoanInput {
    pub fn new(principal: f64, total_months: i64, fallback: FallbackRate) -> Self {
        Self {
            principal,
            total_months,
            tiers: Vec::new(),
            fallback,
        }
    }

    pub fn with_tiers(mut self, tiers: Vec<RatePeriod>) -> Self {
        self.tiers = tiers;
        self
    }

    pub fn with_principal(mut self, principal: f64) -> Self {
        self.principal = principal;
        self
    }

    /// The calculator's opening state: 100,000 over 20 years, a 12-month
    /// promotional tier at 1%, two disabled tiers, then 3% + 2.5%.
    pub fn calculator_defaults() -> Self {
        Self::new(100_000.0, 240, FallbackRate::new(3.0, 2.5)).with_tiers(vec![
            RatePeriod::new(12, 1.0),
            RatePeriod::new(12, 2.0).with_enabled(false),
            RatePeriod::new(12, 2.5).with_enabled(false),
        ])
    }

    /// True when there is enough input to produce a schedule
    pub fn is_computable(&self) -> bool {
        self.principal.is_finite()
            && self.principal > 0.0
            && self.total_months > 0
            && self.fallback.is_numeric()
    }

    /// Months covered by enabled, well-formed tiers (may be fractional)
    pub fn promotional_months(&self) -> f64 {
        self.tiers
            .iter()
            .filter_map(|t| t.active_terms())
            .map(|(months, _)| months)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tier_fields() {
        let tier = RatePeriod::parse(" 12 ", "1.5", true);
        assert_eq!(tier.active_terms(), Some((12.0, 1.5)));

        let blank = RatePeriod::parse("", "2", true);
        assert_eq!(blank.duration_months, None);
        assert!(!blank.is_well_formed());
        assert_eq!(blank.active_terms(), None);

        let fractional = RatePeriod::parse("12.5", "abc", true);
        assert_eq!(fractional.duration_months, Some(12.5));
        assert_eq!(fractional.annual_rate_percent, None);

        let fractional = RatePeriod::parse("12.5", "1", true);
        assert_eq!(fractional.active_terms(), Some((12.5, 1.0)));
    }

    #[test]
    fn test_disabled_tier_has_no_terms() {
        let tier = RatePeriod::new(12, 1.0).with_enabled(false);
        assert!(tier.is_well_formed());
        assert_eq!(tier.active_terms(), None);
    }

    #[test]
    fn test_nan_rate_not_active() {
        let tier = RatePeriod {
            duration_months: Some(6.0),
            annual_rate_percent: Some(f64::NAN),
            enabled: true,
        };
        assert_eq!(tier.active_terms(), None);
    }

    #[test]
    fn test_term_unit_conversion() {
        assert_eq!(TermUnit::Years.to_months(20.0), Some(240));
        assert_eq!(TermUnit::Years.to_months(2.5), Some(30));
        assert_eq!(TermUnit::Months.to_months(17.6), Some(18));
        assert_eq!(TermUnit::Months.to_months(0.0), None);
        assert_eq!(TermUnit::Years.to_months(f64::NAN), None);
        assert_eq!(TermUnit::parse("Months"), Some(TermUnit::Months));
        assert_eq!(TermUnit::parse("decades"), None);
    }

    #[test]
    fn test_currency_display() {
        assert_eq!(Currency::All.code(), "ALL");
        assert_eq!(Currency::All.reference_rate(), ReferenceRate::Treasury);
        assert_eq!(Currency::Eur.format(1234.5), "1234.50 EUR");
    }

    #[test]
    fn test_computable() {
        let input = LoanInput::calculator_defaults();
        assert!(input.is_computable());
        assert_eq!(input.promotional_months(), 12.0);

        let mut zero = input.clone();
        zero.principal = 0.0;
        assert!(!zero.is_computable());

        let mut nan_index = input.clone();
        nan_index.fallback.index_percent = f64::NAN;
        assert!(!nan_index.is_computable());

        let mut no_term = input;
        no_term.total_months = 0;
        assert!(!no_term.is_computable());
    }

    #[test]
    fn test_tier_from_form_json() {
        let tier: RatePeriod = serde_json::from_str(
            r#"{"duration_months": "12", "annual_rate_percent": 1.5, "enabled": true}"#,
        )
        .unwrap();
        assert_eq!(tier.active_terms(), Some((12.0, 1.5)));

        let fractional: RatePeriod =
            serde_json::from_str(r#"{"duration_months": 12.5, "annual_rate_percent": "2"}"#).unwrap();
        assert_eq!(fractional.active_terms(), Some((12.5, 2.0)));

        let garbled: RatePeriod = serde_json::from_str(
            r#"{"duration_months": "12a", "annual_rate_percent": true, "enabled": true}"#,
        )
        .unwrap();
        assert_eq!(garbled.duration_months, None);
        assert_eq!(garbled.annual_rate_percent, None);
        assert_eq!(garbled.active_terms(), None);

        let blank: RatePeriod = serde_json::from_str(r#"{"duration_months": null}"#).unwrap();
        assert!(blank.enabled);
        assert!(!blank.is_well_formed());
    }

    #[test]
    fn test_fallback_ignores_reference_label() {
        let euribor = FallbackRate::new(3.0, 2.5);
        let treasury = euribor.clone().with_reference(ReferenceRate::Treasury);
        assert_eq!(euribor.annual_rate_percent(), 5.5);
        assert_eq!(treasury.monthly_rate(), euribor.monthly_rate());
    }
}
