//! Keyword-based stand-in used when no hosted model is available.

use async_trait::async_trait;
use sitescout_common::site::sort_by_score_desc;
use sitescout_common::{RankedSite, Site};

use crate::ranker::Ranker;

const KEYWORD_SCORES: [(&str, u8); 4] = [
    ("Virginia", 95),
    ("Texas", 88),
    ("Salt", 82),
    ("Phoenix", 75),
];
const DEFAULT_MOCK_SCORE: u8 = 70;

pub fn mock_score(name: &str) -> u8 {
    KEYWORD_SCORES
        .iter()
        .find(|(keyword, _)| name.contains(keyword))
        .map(|(_, score)| *score)
        .unwrap_or(DEFAULT_MOCK_SCORE)
}

#[derive(Debug, Clone, Default)]
pub struct MockRanker;

#[async_trait]
impl Ranker for MockRanker {
    fn name(&self) -> &str {
        "mock"
    }

    async fn rank(&self, sites: &[Site]) -> Vec<RankedSite> {
        let mut ranked: Vec<RankedSite> = sites
            .iter()
            .map(|s| {
                RankedSite::new(
                    s.clone(),
                    mock_score(&s.name),
                    format!("Mock: {} - Good power & low risk", s.name),
                )
            })
            .collect();
        sort_by_score_desc(&mut ranked);
        ranked
    }
}
