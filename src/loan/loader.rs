//! Load loans from CSV and parse the compact tier notation
//!
//! Tier notation is `MONTHS:RATE` with an optional `:on` / `:off` suffix,
//! e.g. `12:1.0`, `24:2.5:off`. Lists are `;`-separated.

use super::{FallbackRate, LoanInput, RatePeriod, TermUnit};
use crate::error::{LoanError, Result};
use csv::Reader;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Raw CSV row: `loan_id,principal,term,term_unit,margin,index,tiers`
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    loan_id: u32,
    #[serde(deserialize_with = "csv::invalid_option")]
    principal: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    term: Option<f64>,
    #[serde(default)]
    term_unit: String,
    #[serde(deserialize_with = "csv::invalid_option")]
    margin: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    index: Option<f64>,
    #[serde(default)]
    tiers: String,
}

/// A loan read from a batch file
#[derive(Debug, Clone)]
pub struct LoanRecord {
    pub loan_id: u32,
    pub input: LoanInput,
}

impl CsvRow {
    fn to_record(self) -> Result<LoanRecord> {
        let unit = if self.term_unit.trim().is_empty() {
            TermUnit::Years
        } else {
            TermUnit::parse(&self.term_unit).ok_or_else(|| {
                LoanError::Parse(format!(
                    "loan {}: unknown term unit '{}'",
                    self.loan_id, self.term_unit
                ))
            })?
        };

        // Blank or garbled numbers become a soft-empty input rather than an error
        let total_months = self.term.and_then(|t| unit.to_months(t)).unwrap_or(0);
        let fallback = FallbackRate::new(
            self.margin.unwrap_or(f64::NAN),
            self.index.unwrap_or(f64::NAN),
        );

        let input = LoanInput::new(self.principal.unwrap_or(f64::NAN), total_months, fallback)
            .with_tiers(parse_tier_list(&self.tiers)?);

        Ok(LoanRecord {
            loan_id: self.loan_id,
            input,
        })
    }
}

/// Parse one tier in `MONTHS:RATE[:on|off]` notation.
///
/// Unparsable months or rate are kept as empty fields; only a wrong
/// shape or an unknown flag is an error.
pub fn parse_tier_spec(spec: &str) -> Result<RatePeriod> {
    let parts: Vec<&str> = spec.trim().split(':').collect();
    let enabled = match parts.as_slice() {
        [_, _] => true,
        [_, _, flag] => match flag.trim().to_ascii_lowercase().as_str() {
            "on" | "enabled" => true,
            "off" | "disabled" => false,
            other => {
                return Err(LoanError::Parse(format!(
                    "tier '{}': unknown flag '{}'",
                    spec, other
                )))
            }
        },
        _ => {
            return Err(LoanError::Parse(format!(
                "tier '{}': expected MONTHS:RATE[:on|off]",
                spec
            )))
        }
    };

    Ok(RatePeriod::parse(parts[0], parts[1], enabled))
}

/// Parse a `;`-separated tier list, ignoring empty entries
pub fn parse_tier_list(list: &str) -> Result<Vec<RatePeriod>> {
    list.split(';')
        .filter(|s| !s.trim().is_empty())
        .map(parse_tier_spec)
        .collect()
}

/// Load all loans from a CSV file
pub fn load_loans<P: AsRef<Path>>(path: P) -> Result<Vec<LoanRecord>> {
    let file = File::open(path)?;
    read_records(Reader::from_reader(file))
}

/// Load loans from any reader (useful for embedded data or tests)
pub fn load_loans_from_reader<R: Read>(reader: R) -> Result<Vec<LoanRecord>> {
    read_records(Reader::from_reader(reader))
}

fn read_records<R: Read>(mut reader: Reader<R>) -> Result<Vec<LoanRecord>> {
    let mut loans = Vec::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        loans.push(row.to_record()?);
    }

    log::debug!("loaded {} loans", loans.len());
    Ok(loans)
}
