//! The ranking capability.
//!
//! Every implementation turns a batch of sites into exactly one
//! `RankedSite` per input, ordered by score (highest first, stable on ties).
//! Ranking never fails: upstream problems degrade to fallback scores.

use async_trait::async_trait;
use sitescout_common::{RankedSite, Site};

use crate::scorer::score_sites_with;
use crate::weights::ScoringWeights;

#[async_trait]
pub trait Ranker: Send + Sync {
    fn name(&self) -> &str;

    async fn rank(&self, sites: &[Site]) -> Vec<RankedSite>;
}

/// Ranker backed by the deterministic scoring formula. No I/O.
#[derive(Debug, Clone, Default)]
pub struct DeterministicRanker {
    weights: ScoringWeights,
}

impl DeterministicRanker {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }
}

#[async_trait]
impl Ranker for DeterministicRanker {
    fn name(&self) -> &str {
        "deterministic"
    }

    async fn rank(&self, sites: &[Site]) -> Vec<RankedSite> {
        score_sites_with(sites, &self.weights)
    }
}
