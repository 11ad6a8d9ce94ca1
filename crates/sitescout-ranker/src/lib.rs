//! sitescout-ranker: Site scoring engine and the rankers built on it.
//!
//! `scorer::score_sites` is the deterministic core. `ranker::Ranker` is the
//! capability the CLI selects by configuration: deterministic, narrative
//! (hosted model), or mock.

pub mod weights;
pub mod scorer;
pub mod ranker;
pub mod narrative;
pub mod mock;
pub mod export;

pub use ranker::{DeterministicRanker, Ranker};
pub use scorer::{score_site, score_sites, score_sites_with};
