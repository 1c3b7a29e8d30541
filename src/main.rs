//! Loan calculator CLI
//!
//! Builds a loan from command-line flags, prints the rate plan, the first
//! months of the schedule and the summary. Full schedules go to CSV or JSON.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use loan_amortization::{
    amortization::{effective_annual_rate, nominal_annual_rate, AmortizationResult},
    loan::parse_tier_spec,
    rates::RateSource,
    Currency, FallbackRate, LoanInput, RateResolver, ScenarioRunner, TermUnit,
};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum CurrencyArg {
    Eur,
    All,
}

impl From<CurrencyArg> for Currency {
    fn from(arg: CurrencyArg) -> Self {
        match arg {
            CurrencyArg::Eur => Currency::Eur,
            CurrencyArg::All => Currency::All,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum UnitArg {
    Years,
    Months,
}

impl From<UnitArg> for TermUnit {
    fn from(arg: UnitArg) -> Self {
        match arg {
            UnitArg::Years => TermUnit::Years,
            UnitArg::Months => TermUnit::Months,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "loan-calc", version, about = "Monthly loan schedule with promotional rate tiers")]
struct Cli {
    /// Loan amount
    #[arg(long, default_value_t = 100_000.0)]
    principal: f64,

    /// Loan term, in --unit
    #[arg(long, default_value_t = 20.0)]
    term: f64,

    #[arg(long, value_enum, default_value_t = UnitArg::Years)]
    unit: UnitArg,

    /// Bank margin in percent
    #[arg(long, default_value_t = 3.0, allow_negative_numbers = true)]
    margin: f64,

    /// Reference index (Euribor / treasury) in percent
    #[arg(long, default_value_t = 2.5, allow_negative_numbers = true)]
    index: f64,

    /// Promotional tier as MONTHS:RATE[:on|off]; repeat in order
    #[arg(long = "tier")]
    tiers: Vec<String>,

    #[arg(long, value_enum, default_value_t = CurrencyArg::Eur)]
    currency: CurrencyArg,

    /// Schedule rows to print
    #[arg(long, default_value_t = 24)]
    rows: usize,

    /// Write the full schedule to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Print the full result as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Extra index values to compare against, in percent
    #[arg(long = "compare-index", allow_negative_numbers = true)]
    compare_index: Vec<f64>,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    currency: &'static str,
    reference_rate: &'static str,
    input: &'a LoanInput,
    nominal_annual_rate_pct: Option<f64>,
    effective_annual_rate_pct: Option<f64>,
    #[serde(flatten)]
    result: &'a AmortizationResult,
}

fn build_input(cli: &Cli) -> Result<LoanInput> {
    let currency = Currency::from(cli.currency);
    let total_months = TermUnit::from(cli.unit).to_months(cli.term).unwrap_or(0);

    let tiers = cli
        .tiers
        .iter()
        .map(|spec| parse_tier_spec(spec))
        .collect::<loan_amortization::Result<Vec<_>>>()
        .context("invalid --tier")?;

    let fallback = FallbackRate::new(cli.margin, cli.index).with_reference(currency.reference_rate());
    Ok(LoanInput::new(cli.principal, total_months, fallback).with_tiers(tiers))
}

fn write_csv(path: &PathBuf, result: &AmortizationResult) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("unable to create {}", path.display()))?;
    for record in &result.schedule {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

fn print_rate_plan(input: &LoanInput) {
    let resolver = RateResolver::from_input(input);
    println!("Rate plan:");
    for regime in resolver.regimes(input.total_months as u32) {
        let source = match regime.source {
            RateSource::Tier(idx) => format!("tier {}", idx + 1),
            RateSource::Fallback => format!(
                "variable ({}% + {} {}%)",
                input.fallback.margin_percent,
                input.fallback.reference.label(),
                input.fallback.index_percent
            ),
        };
        println!(
            "  months {:>3}-{:<3} {:>6.3}%  {}",
            regime.start_month, regime.end_month, regime.annual_rate_percent, source
        );
    }
    println!();
}

fn print_schedule(result: &AmortizationResult, rows: usize) {
    println!(
        "{:>5} {:>14} {:>14} {:>14} {:>16} {:>8}",
        "Month", "Payment", "Principal", "Interest", "Balance", "Rate%"
    );
    println!("{}", "-".repeat(76));

    for record in result.schedule.iter().take(rows) {
        println!(
            "{:>5} {:>14.2} {:>14.2} {:>14.2} {:>16.2} {:>8.3}",
            record.month,
            record.payment,
            record.principal,
            record.interest,
            record.balance_after,
            record.annual_rate_percent,
        );
    }

    if result.months() > rows {
        println!("... ({} more months)", result.months() - rows);
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let currency = Currency::from(cli.currency);
    let input = build_input(&cli)?;

    let runner = ScenarioRunner::new();
    let result = runner.run(&input)?;

    let nominal = nominal_annual_rate(input.principal, &result.schedule);
    let effective = effective_annual_rate(input.principal, &result.schedule);

    if let Some(path) = &cli.csv {
        write_csv(path, &result)?;
        log::info!("wrote {} rows to {}", result.months(), path.display());
    }

    if cli.json {
        let output = JsonOutput {
            currency: currency.code(),
            reference_rate: input.fallback.reference.label(),
            input: &input,
            nominal_annual_rate_pct: nominal.map(|r| r * 100.0),
            effective_annual_rate_pct: effective.map(|r| r * 100.0),
            result: &result,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Loan Calculator");
    println!("===============\n");

    if result.is_empty() {
        println!("Not enough input to compute a schedule.");
        return Ok(());
    }

    println!("Principal: {}", currency.format(input.principal));
    println!("Term: {} months", input.total_months);
    println!(
        "Variable rate: {}% + {}% ({}) = {:.2}%\n",
        input.fallback.margin_percent,
        input.fallback.index_percent,
        input.fallback.reference.label(),
        input.fallback.annual_rate_percent()
    );

    print_rate_plan(&input);
    print_schedule(&result, cli.rows);

    let summary = &result.summary;
    println!("\nSummary:");
    println!("  Months scheduled: {}", result.months());
    println!("  Total Payment: {}", currency.format(summary.total_payment));
    println!("  Total Principal: {}", currency.format(result.total_principal()));
    println!("  Total Interest: {}", currency.format(summary.total_interest));
    println!("  Average Monthly Payment: {}", currency.format(summary.average_monthly_payment));
    if let (Some(nominal), Some(effective)) = (nominal, effective) {
        println!("  Annual cost: {:.3}% nominal, {:.3}% effective", nominal * 100.0, effective * 100.0);
    }

    if !cli.compare_index.is_empty() {
        println!("\nIndex scenarios:");
        for scenario in runner.run_index_scenarios(&input, &cli.compare_index)? {
            println!(
                "  index {:>6.3}%: total interest {}, average payment {}",
                scenario.index_percent,
                currency.format(scenario.result.summary.total_interest),
                currency.format(scenario.result.summary.average_monthly_payment),
            );
        }
    }

    if let Some(path) = &cli.csv {
        println!("\nFull schedule written to: {}", path.display());
    }

    Ok(())
}
