//! `pinpoint-engine` — turns a natural-language query and a document snapshot
//! into ranked candidates with synthesized locators.
//!
//! The engine holds only immutable configuration (verb table, rule table,
//! thresholds), so one instance can serve concurrent requests.

pub mod engine;
mod ranking;

pub use engine::{Engine, LocateOptions};
