/// Core site types shared by the loader, samplers, rankers and exporters.
/// A `Site` is created per load event, scored once, and replaced on the next batch.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Scoring defaults for absent attributes
// ---------------------------------------------------------------------------

/// Values substituted for absent attributes during scoring only.
/// Justifications and exports still show absent attributes as "N/A".
pub mod defaults {
    pub const ELEVATION_M: f64 = 0.0;
    pub const FLOOD_PCT: f64 = 10.0;
    pub const POWER_DISTANCE_KM: f64 = 5.0;
    pub const LATENCY_MS: f64 = 20.0;
    pub const ENERGY_COST_USD_PER_MWH: f64 = 60.0;
}

// ---------------------------------------------------------------------------
// Site
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub elevation_m: Option<f64>,
    #[serde(default)]
    pub flood_pct: Option<f64>,            // 0–100, share of flood-prone land cover
    #[serde(default)]
    pub power_distance_km: Option<f64>,
    #[serde(default)]
    pub latency_ms: Option<f64>,           // round-trip proxy
    #[serde(default)]
    pub energy_cost_usd_per_mwh: Option<f64>,
}

impl Site {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lon,
            elevation_m: None,
            flood_pct: None,
            power_distance_km: None,
            latency_ms: None,
            energy_cost_usd_per_mwh: None,
        }
    }

    pub fn with_elevation(mut self, meters: f64) -> Self {
        self.elevation_m = Some(meters);
        self
    }

    pub fn with_flood_pct(mut self, pct: f64) -> Self {
        self.flood_pct = Some(pct);
        self
    }

    pub fn with_power_distance(mut self, km: f64) -> Self {
        self.power_distance_km = Some(km);
        self
    }

    pub fn with_latency(mut self, ms: f64) -> Self {
        self.latency_ms = Some(ms);
        self
    }

    pub fn with_energy_cost(mut self, usd_per_mwh: f64) -> Self {
        self.energy_cost_usd_per_mwh = Some(usd_per_mwh);
        self
    }

    pub fn scoring_elevation(&self) -> f64 {
        self.elevation_m.unwrap_or(defaults::ELEVATION_M)
    }

    pub fn scoring_flood_pct(&self) -> f64 {
        self.flood_pct.unwrap_or(defaults::FLOOD_PCT)
    }

    pub fn scoring_power_distance(&self) -> f64 {
        self.power_distance_km.unwrap_or(defaults::POWER_DISTANCE_KM)
    }

    pub fn scoring_latency(&self) -> f64 {
        self.latency_ms.unwrap_or(defaults::LATENCY_MS)
    }

    pub fn scoring_energy_cost(&self) -> f64 {
        self.energy_cost_usd_per_mwh.unwrap_or(defaults::ENERGY_COST_USD_PER_MWH)
    }
}

// ---------------------------------------------------------------------------
// Tier / risk / marker colour
// ---------------------------------------------------------------------------

pub const TIER1_MIN_SCORE: u8 = 85;
pub const TIER2_MIN_SCORE: u8 = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    Tier1,
    Tier2,
    Tier3,
}

impl Tier {
    pub fn from_score(score: u8) -> Self {
        if score >= TIER1_MIN_SCORE {
            Tier::Tier1
        } else if score >= TIER2_MIN_SCORE {
            Tier::Tier2
        } else {
            Tier::Tier3
        }
    }

    pub fn risk_level(&self) -> RiskLevel {
        match self {
            Tier::Tier1 => RiskLevel::Low,
            Tier::Tier2 => RiskLevel::Medium,
            Tier::Tier3 => RiskLevel::High,
        }
    }

    pub fn marker_color(&self) -> MarkerColor {
        match self {
            Tier::Tier1 => MarkerColor::Green,
            Tier::Tier2 => MarkerColor::Orange,
            Tier::Tier3 => MarkerColor::Red,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Tier1 => "Tier1",
            Tier::Tier2 => "Tier2",
            Tier::Tier3 => "Tier3",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low    => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High   => "High",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerColor {
    Green,
    Orange,
    Red,
}

impl MarkerColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerColor::Green  => "green",
            MarkerColor::Orange => "orange",
            MarkerColor::Red    => "red",
        }
    }
}

// ---------------------------------------------------------------------------
// RankedSite
// ---------------------------------------------------------------------------

/// A site after exactly one scoring pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSite {
    #[serde(flatten)]
    pub site: Site,
    pub score: u8,
    pub tier: Tier,
    pub risk_level: RiskLevel,
    pub justification: String,
}

impl RankedSite {
    /// Builds a ranked site, deriving tier and risk from the score.
    /// Scores above 100 are clamped.
    pub fn new(site: Site, score: u8, justification: impl Into<String>) -> Self {
        let score = score.min(100);
        let tier = Tier::from_score(score);
        Self {
            site,
            score,
            tier,
            risk_level: tier.risk_level(),
            justification: justification.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.site.name
    }

    pub fn marker_color(&self) -> MarkerColor {
        self.tier.marker_color()
    }
}

/// Sort ranked sites by score, highest first. Equal scores keep input order.
pub fn sort_by_score_desc(ranked: &mut [RankedSite]) {
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
}

// ── Tests ─────────────────────────────────────────────────────────────────────
