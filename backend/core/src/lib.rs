pub mod candidate;
pub mod error;
pub mod text;
pub mod types;

pub use candidate::{
    AttributeSummary, Candidate, LocatorKind, RankedResult, Signal, SignalScore, LITERAL_SCORE,
};
pub use error::LocateError;
pub use types::{ContainerClause, ContainerKind, Intent, Query, QueryTarget, TagHint};
