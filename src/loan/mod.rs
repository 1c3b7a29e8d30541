//! Loan inputs and batch loading

mod data;
pub mod loader;

pub use data::{lenient_number, Currency, FallbackRate, LoanInput, RatePeriod, ReferenceRate, TermUnit};
pub use loader::{load_loans, load_loans_from_reader, parse_tier_list, parse_tier_spec, LoanRecord};
