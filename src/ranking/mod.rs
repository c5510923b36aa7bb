//! The ranking pipeline: window resolution, loading, substitution,
//! aggregation, rank assignment and result assembly.

pub mod aggregate;
pub mod builder;
pub mod engine;
pub mod filler;
pub mod loader;
pub mod rank;
pub mod types;
pub mod window;

pub use engine::{RankingEngine, RankingOptions, RankingRequest};
pub use rank::assign_ranks;
pub use types::{RankedEntry, RankingMeta, RankingResult, WindowLabels};
pub use window::{RoundSpan, RoundWindow};
