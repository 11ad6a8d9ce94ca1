//! Deterministic site score computation.
//!
//! score = 100
//!       − min(power_km × 3, 15)
//!       − min(flood_pct × 1.5, 25)
//!       − min((latency_ms − 5) × 0.8, 15)
//!       − min((cost − 40) × 0.3, 10)
//!       + 5 if elevation > 200 m
//!
//! then rounded and clamped to [0, 100]. The latency and cost terms are not
//! floored at zero: a site better than the baseline gains points.
//! Absent attributes use the defaults in `sitescout_common::site::defaults`.

use sitescout_common::site::sort_by_score_desc;
use sitescout_common::{RankedSite, Site};

use crate::weights::ScoringWeights;

/// Individual terms of one site's score, before rounding.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    pub power_penalty: f64,
    pub flood_penalty: f64,
    pub latency_penalty: f64,
    pub cost_penalty: f64,
    pub elevation_bonus: f64,
}

impl ScoreBreakdown {
    pub fn raw_score(&self) -> f64 {
        100.0
            - self.power_penalty
            - self.flood_penalty
            - self.latency_penalty
            - self.cost_penalty
            + self.elevation_bonus
    }
}

pub fn compute_breakdown(site: &Site, w: &ScoringWeights) -> ScoreBreakdown {
    let elevation_bonus = if site.scoring_elevation() > w.elevation_threshold_m {
        w.elevation_bonus
    } else {
        0.0
    };

    ScoreBreakdown {
        power_penalty:   (site.scoring_power_distance() * w.power_per_km).min(w.power_cap),
        flood_penalty:   (site.scoring_flood_pct() * w.flood_per_pct).min(w.flood_cap),
        latency_penalty: ((site.scoring_latency() - w.latency_baseline_ms) * w.latency_per_ms).min(w.latency_cap),
        cost_penalty:    ((site.scoring_energy_cost() - w.cost_baseline_usd) * w.cost_per_usd).min(w.cost_cap),
        elevation_bonus,
    }
}

/// Round half away from zero and clamp into [0, 100]. NaN maps to 0.
pub fn finalize_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}

fn fmt_metric(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v}"),
        None => "N/A".to_string(),
    }
}

/// Fixed-format rendering of the four scored metrics, "N/A" for absent ones.
pub fn build_justification(site: &Site) -> String {
    format!(
        "Power: {} km | Flood: {}% | Latency: {} ms | Cost: ${}/MWh",
        fmt_metric(site.power_distance_km),
        fmt_metric(site.flood_pct),
        fmt_metric(site.latency_ms),
        fmt_metric(site.energy_cost_usd_per_mwh),
    )
}

pub fn score_site_with(site: &Site, weights: &ScoringWeights) -> RankedSite {
    let score = finalize_score(compute_breakdown(site, weights).raw_score());
    RankedSite::new(site.clone(), score, build_justification(site))
}

pub fn score_site(site: &Site) -> RankedSite {
    score_site_with(site, &ScoringWeights::default())
}

/// Score every site and order by score, highest first (stable on ties).
pub fn score_sites_with(sites: &[Site], weights: &ScoringWeights) -> Vec<RankedSite> {
    let mut ranked: Vec<RankedSite> = sites.iter().map(|s| score_site_with(s, weights)).collect();
    sort_by_score_desc(&mut ranked);
    ranked
}

pub fn score_sites(sites: &[Site]) -> Vec<RankedSite> {
    score_sites_with(sites, &ScoringWeights::default())
}
