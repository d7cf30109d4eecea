//! Candidate scoring.
//!
//! A [`RuleTable`] of weighted signals is evaluated against every feature record;
//! the [`Scorer`] sums the contributions into an integer score with a per-signal
//! breakdown.

pub mod compat;
pub mod context;
pub mod rules;
pub mod scorer;
pub mod similarity;

pub use context::QueryContext;
pub use rules::{RecordView, Rule, RuleTable};
pub use scorer::{Scored, Scorer};
