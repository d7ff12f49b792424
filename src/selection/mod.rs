//! Model search and comparison.
//!
//! Candidates from a [`SearchSpace`] are fitted on a training split, scored on
//! a hold-out and ranked into a [`ModelComparison`].

mod comparison;
mod search;
mod space;

pub use comparison::{CandidateModel, ComparisonRow, ModelComparison, SkippedCandidate};
pub use search::{ModelSearch, SearchConfig, SelectionMetric};
pub use space::{ModelFamily, SearchSpace, SeasonalSpace};
