//! Penalty coefficients for the deterministic scoring formula.

use serde::{Deserialize, Serialize};
use sitescout_common::ScoringConfig;

/// Coefficients of the linear weighted-penalty formula.
/// `Default` is the reference formula; configs may override individual terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    /// Penalty per km to the nearest power plant
    pub power_per_km: f64,
    pub power_cap: f64,
    /// Penalty per percentage point of flood-prone land cover
    pub flood_per_pct: f64,
    pub flood_cap: f64,
    /// Latency below the baseline earns a bonus
    pub latency_baseline_ms: f64,
    pub latency_per_ms: f64,
    pub latency_cap: f64,
    /// Energy cost below the baseline earns a bonus
    pub cost_baseline_usd: f64,
    pub cost_per_usd: f64,
    pub cost_cap: f64,
    /// Bonus applies strictly above the threshold
    pub elevation_threshold_m: f64,
    pub elevation_bonus: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            power_per_km:          3.0,
            power_cap:             15.0,
            flood_per_pct:         1.5,
            flood_cap:             25.0,
            latency_baseline_ms:   5.0,
            latency_per_ms:        0.8,
            latency_cap:           15.0,
            cost_baseline_usd:     40.0,
            cost_per_usd:          0.3,
            cost_cap:              10.0,
            elevation_threshold_m: 200.0,
            elevation_bonus:       5.0,
        }
    }
}

impl From<&ScoringConfig> for ScoringWeights {
    fn from(cfg: &ScoringConfig) -> Self {
        Self {
            power_per_km:          cfg.power_per_km,
            power_cap:             cfg.power_cap,
            flood_per_pct:         cfg.flood_per_pct,
            flood_cap:             cfg.flood_cap,
            latency_baseline_ms:   cfg.latency_baseline_ms,
            latency_per_ms:        cfg.latency_per_ms,
            latency_cap:           cfg.latency_cap,
            cost_baseline_usd:     cfg.cost_baseline_usd,
            cost_per_usd:          cfg.cost_per_usd,
            cost_cap:              cfg.cost_cap,
            elevation_threshold_m: cfg.elevation_threshold_m,
            elevation_bonus:       cfg.elevation_bonus,
        }
    }
}

impl ScoringWeights {
    /// All coefficients finite and non-negative.
    pub fn validate(&self) -> bool {
        self.as_array().iter().all(|w| w.is_finite() && *w >= 0.0)
    }

    pub fn as_array(&self) -> [f64; 12] {
        [
            self.power_per_km,
            self.power_cap,
            self.flood_per_pct,
            self.flood_cap,
            self.latency_baseline_ms,
            self.latency_per_ms,
            self.latency_cap,
            self.cost_baseline_usd,
            self.cost_per_usd,
            self.cost_cap,
            self.elevation_threshold_m,
            self.elevation_bonus,
        ]
    }
}
