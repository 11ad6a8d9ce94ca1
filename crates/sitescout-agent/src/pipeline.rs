//! Load → sample → rank → export.
//!
//! Each stage absorbs its collaborator's failures: sampler errors leave
//! attributes absent, a missing LLM backend falls back to the mock ranker,
//! and rankers never fail. Only unreadable input and export I/O surface as
//! errors to the caller.

use std::path::Path;

use anyhow::Context;
use secrecy::SecretString;
use sitescout_common::{RankingStrategy, SamplerConfig, SamplerKind, ScoutConfig, Site};
use sitescout_geo::sampler::{sample_or_absent, NullSampler, ProxySampler};
use sitescout_geo::{load_boundary_file, AttributeSampler, BoundaryBatch};
use sitescout_llm::factory::build_backend;
use sitescout_ranker::export::export_to_path;
use sitescout_ranker::mock::MockRanker;
use sitescout_ranker::narrative::NarrativeRanker;
use sitescout_ranker::weights::ScoringWeights;
use sitescout_ranker::{DeterministicRanker, Ranker};
use tracing::{info, warn};

use crate::session::ScoutSession;

pub fn build_sampler(cfg: &SamplerConfig) -> Box<dyn AttributeSampler> {
    match cfg.kind {
        SamplerKind::Proxy => Box::new(ProxySampler::from_config(cfg)),
        SamplerKind::None => Box::new(NullSampler),
    }
}

/// Scoring weights from config, or the defaults when the table is invalid.
pub fn scoring_weights(config: &ScoutConfig) -> ScoringWeights {
    let weights = ScoringWeights::from(&config.scoring);
    if weights.validate() {
        weights
    } else {
        warn!("Invalid [scoring] coefficients (negative or non-finite), using defaults");
        ScoringWeights::default()
    }
}

pub fn build_ranker(config: &ScoutConfig, api_key: Option<SecretString>) -> Box<dyn Ranker> {
    match config.ranking.strategy {
        RankingStrategy::Deterministic => Box::new(DeterministicRanker::new(scoring_weights(config))),
        RankingStrategy::Mock => Box::new(MockRanker),
        RankingStrategy::Narrative => match build_backend(&config.llm, api_key) {
            Ok(backend) => {
                info!(model = backend.model_id(), backend = backend.backend_name(), "Narrative ranking enabled");
                Box::new(NarrativeRanker::from_settings(backend, &config.llm))
            }
            Err(e) => {
                warn!(error = %e, "Narrative ranking unavailable, using mock ranker");
                Box::new(MockRanker)
            }
        },
    }
}

/// Turn loaded boundaries into sites, filling whatever the sampler provides.
pub fn sites_from_batch(batch: &BoundaryBatch, sampler: &dyn AttributeSampler) -> Vec<Site> {
    batch
        .features
        .iter()
        .map(|feature| {
            let mut site = feature.to_site();
            sample_or_absent(sampler, feature).apply_to(&mut site);
            site
        })
        .collect()
}

/// Start a fresh session from a boundary batch.
pub fn load_session(session: ScoutSession, batch: &BoundaryBatch, sampler: &dyn AttributeSampler) -> ScoutSession {
    let sites = sites_from_batch(batch, sampler);
    info!(sites = sites.len(), sampler = sampler.name(), "Batch loaded");
    session.load_batch(sites, Some(batch.bounds))
}

pub fn load_file(path: &Path) -> anyhow::Result<BoundaryBatch> {
    load_boundary_file(path).with_context(|| format!("Failed to load boundaries from {}", path.display()))
}

/// Rank the session's batch if it has not been ranked yet.
pub async fn rank_session(session: ScoutSession, ranker: &dyn Ranker) -> ScoutSession {
    if !session.needs_ranking() {
        return session;
    }
    let ranked = ranker.rank(&session.sites).await;
    info!(ranker = ranker.name(), ranked = ranked.len(), "Ranking complete");
    session.with_ranking(ranked)
}

/// Write the ranking to the configured export path, if any.
pub fn export_session(session: &ScoutSession, config: &ScoutConfig) -> anyhow::Result<()> {
    if let Some(ref path) = config.export.path {
        export_to_path(path, config.export.format, &session.ranked)
            .with_context(|| format!("Failed to export ranking to {path}"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitescout_common::ExportFormat;
    use sitescout_geo::load_boundaries;
    use sitescout_geo::sampler::MockSampler;
    use sitescout_geo::SampledAttributes;

    const GEOJSON: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"name": "Ashburn"},
             "geometry": {"type": "Point", "coordinates": [-77.5, 39.0]}},
            {"type": "Feature", "properties": {},
             "geometry": {"type": "Polygon", "coordinates": [[[-112.2, 33.3], [-111.9, 33.3], [-111.9, 33.6], [-112.2, 33.6], [-112.2, 33.3]]]}}
        ]
    }"#;

    #[test]
    fn test_sampler_selection() {
        let mut cfg = SamplerConfig::default();
        assert_eq!(build_sampler(&cfg).name(), "proxy");
        cfg.kind = SamplerKind::None;
        assert_eq!(build_sampler(&cfg).name(), "none");
    }

    #[test]
    fn test_ranker_selection() {
        let mut config = ScoutConfig::default();
        assert_eq!(build_ranker(&config, None).name(), "deterministic");

        config.ranking.strategy = RankingStrategy::Mock;
        assert_eq!(build_ranker(&config, None).name(), "mock");

        // no key for the hosted model
        config.ranking.strategy = RankingStrategy::Narrative;
        assert_eq!(build_ranker(&config, None).name(), "mock");
        assert_eq!(build_ranker(&config, Some(SecretString::from("sk-test"))).name(), "narrative");
    }

    #[test]
    fn test_invalid_weights_fall_back() {
        let mut config = ScoutConfig::default();
        config.scoring.power_cap = -1.0;
        assert_eq!(scoring_weights(&config), ScoringWeights::default());
    }

    #[test]
    fn test_sampling_failure_leaves_attributes_absent() {
        let batch = load_boundaries(GEOJSON).unwrap();
        let sampler = MockSampler::new()
            .with("Ashburn", SampledAttributes { flood_pct: Some(1.2), ..Default::default() })
            .failing("Site");
        let sites = sites_from_batch(&batch, &sampler);
        assert_eq!(sites.len(), 2);
        assert_eq!(sites[0].flood_pct, Some(1.2));
        assert_eq!(sites[1].name, "Site");
        assert!(sites[1].flood_pct.is_none());
    }

    #[tokio::test]
    async fn test_end_to_end_with_export() {
        let batch = load_boundaries(GEOJSON).unwrap();
        let session = load_session(ScoutSession::new(), &batch, &ProxySampler::default());
        assert!(session.needs_ranking());
        assert_eq!(session.sites[0].latency_ms, Some(0.0));

        let ranker = DeterministicRanker::default();
        let session = rank_session(session, &ranker).await;
        assert_eq!(session.ranked.len(), 2);
        assert_eq!(session.ranked[0].name(), "Ashburn");

        let dir = tempfile::tempdir().unwrap();
        let mut config = ScoutConfig::default();
        config.export.path = Some(dir.path().join("out.csv").display().to_string());
        config.export.format = ExportFormat::Csv;
        export_session(&session, &config).unwrap();

        let csv = std::fs::read_to_string(dir.path().join("out.csv")).unwrap();
        assert_eq!(csv.lines().count(), 3);
        assert!(csv.lines().nth(1).unwrap().starts_with("1,Ashburn,"));
    }
}
