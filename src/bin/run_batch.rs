//! Amortize every loan in a CSV file
//!
//! Input columns: loan_id,principal,term,term_unit,margin,index,tiers
//! Output: one summary row per loan, including the effective annual cost

use anyhow::{Context, Result};
use clap::Parser;
use loan_amortization::{
    amortization::effective_annual_rate,
    loan::load_loans,
    ScenarioRunner,
};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "run_batch", version, about = "Amortize a CSV batch of loans")]
struct Cli {
    /// Loans CSV
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// Summary CSV (default: stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct SummaryRow {
    loan_id: u32,
    months: usize,
    total_payment: f64,
    total_interest: f64,
    average_monthly_payment: f64,
    final_balance: f64,
    effective_annual_rate_pct: Option<f64>,
    error: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let start = Instant::now();
    let loans = load_loans(&cli.input)
        .with_context(|| format!("failed to load loans from {}", cli.input.display()))?;
    log::info!("loaded {} loans in {:?}", loans.len(), start.elapsed());

    let runner = ScenarioRunner::new();
    let inputs: Vec<_> = loans.iter().map(|l| l.input.clone()).collect();
    let results = runner.run_batch(&inputs);
    log::info!("amortized {} loans in {:?}", results.len(), start.elapsed());

    let rows = loans.iter().zip(results).map(|(loan, result)| match result {
        Ok(result) => SummaryRow {
            loan_id: loan.loan_id,
            months: result.months(),
            total_payment: result.summary.total_payment,
            total_interest: result.summary.total_interest,
            average_monthly_payment: result.summary.average_monthly_payment,
            final_balance: result.final_balance().unwrap_or(0.0),
            effective_annual_rate_pct: effective_annual_rate(loan.input.principal, &result.schedule)
                .map(|r| r * 100.0),
            error: None,
        },
        Err(e) => {
            log::warn!("loan {}: {}", loan.loan_id, e);
            SummaryRow {
                loan_id: loan.loan_id,
                months: 0,
                total_payment: 0.0,
                total_interest: 0.0,
                average_monthly_payment: 0.0,
                final_balance: 0.0,
                effective_annual_rate_pct: None,
                error: Some(e.to_string()),
            }
        }
    });

    let sink: Box<dyn std::io::Write> = match &cli.output {
        Some(path) => Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("unable to create {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout()),
    };
    let mut writer = csv::Writer::from_writer(sink);

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}
