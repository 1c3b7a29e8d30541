//! Scenario runner for batch and what-if amortizations
//!
//! Each run is independent, so batches are spread across threads with rayon.

use crate::amortization::{AmortizationConfig, AmortizationEngine, AmortizationResult};
use crate::error::Result;
use crate::loan::LoanInput;
use rayon::prelude::*;
use serde::Serialize;

/// Outcome of re-running a loan with a different reference index
#[derive(Debug, Clone, Serialize)]
pub struct IndexScenario {
    pub index_percent: f64,
    pub result: AmortizationResult,
}

/// Runs many amortizations with one shared configuration
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new();
/// for scenario in runner.run_index_scenarios(&input, &[2.0, 2.5, 3.0])? {
///     println!("{}: {:.2}", scenario.index_percent, scenario.result.summary.total_interest);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    engine: AmortizationEngine,
}

impl ScenarioRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AmortizationConfig) -> Self {
        Self {
            engine: AmortizationEngine::new(config),
        }
    }

    /// Run a single loan
    pub fn run(&self, input: &LoanInput) -> Result<AmortizationResult> {
        self.engine.run(input)
    }

    /// Run loans in parallel; results keep the input order
    pub fn run_batch(&self, inputs: &[LoanInput]) -> Vec<Result<AmortizationResult>> {
        inputs.par_iter().map(|input| self.engine.run(input)).collect()
    }

    /// Re-run one loan for each alternative reference index value
    pub fn run_index_scenarios(
        &self,
        input: &LoanInput,
        index_values: &[f64],
    ) -> Result<Vec<IndexScenario>> {
        index_values
            .par_iter()
            .map(|&index_percent| {
                let mut shifted = input.clone();
                shifted.fallback.index_percent = index_percent;
                let result = self.engine.run(&shifted)?;
                Ok(IndexScenario {
                    index_percent,
                    result,
                })
            })
            .collect()
    }
}
