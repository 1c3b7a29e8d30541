//! Interest-rate regimes: promotional tiers followed by a variable rate

mod resolver;

pub use resolver::{rate_for, RateRegime, RateResolver, RateSource};
