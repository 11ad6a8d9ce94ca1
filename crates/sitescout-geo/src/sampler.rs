//! Trait for site attribute sampling.
//!
//! A sampler looks at one loaded boundary and returns whichever optional
//! site attributes it can derive. Anything it cannot derive stays absent;
//! the scoring engine substitutes its defaults.
//!
//! Implementations:
//! - `ProxySampler`: latency proxy from great-circle distance to an anchor
//! - `NullSampler`: nothing at all
//! - `MockSampler`: fixed per-name values (testing, demos)

use std::collections::{HashMap, HashSet};

use sitescout_common::scout_config::SamplerConfig;
use sitescout_common::Site;
use tracing::warn;

use crate::boundary::BoundaryFeature;
use crate::distance::haversine_km;
use crate::error::GeoError;

/// Optional attributes for one site.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampledAttributes {
    pub elevation_m: Option<f64>,
    pub flood_pct: Option<f64>,
    pub power_distance_km: Option<f64>,
    pub latency_ms: Option<f64>,
    pub energy_cost_usd_per_mwh: Option<f64>,
}

impl SampledAttributes {
    /// Copy every present attribute onto `site`, leaving the rest untouched.
    pub fn apply_to(&self, site: &mut Site) {
        if let Some(v) = self.elevation_m { site.elevation_m = Some(v); }
        if let Some(v) = self.flood_pct { site.flood_pct = Some(v); }
        if let Some(v) = self.power_distance_km { site.power_distance_km = Some(v); }
        if let Some(v) = self.latency_ms { site.latency_ms = Some(v); }
        if let Some(v) = self.energy_cost_usd_per_mwh { site.energy_cost_usd_per_mwh = Some(v); }
    }
}

pub trait AttributeSampler: Send + Sync {
    fn name(&self) -> &str;

    /// Sample attributes for one boundary. Errors are recoverable: callers
    /// should use `sample_or_absent` to fall back to an empty sample.
    fn sample(&self, feature: &BoundaryFeature) -> Result<SampledAttributes, GeoError>;
}

/// Sample, logging and swallowing any failure.
pub fn sample_or_absent(sampler: &dyn AttributeSampler, feature: &BoundaryFeature) -> SampledAttributes {
    match sampler.sample(feature) {
        Ok(attrs) => attrs,
        Err(e) => {
            warn!(sampler = sampler.name(), site = %feature.name, error = %e, "Sampling failed, attributes left absent");
            SampledAttributes::default()
        }
    }
}

/// Round to one decimal place.
pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

// ── Proxy sampler ────────────────────────────────────────────────────────────

pub struct ProxySampler {
    pub anchor_lat: f64,
    pub anchor_lon: f64,
    pub meters_per_ms: f64,
}

impl ProxySampler {
    pub fn new(anchor_lat: f64, anchor_lon: f64, meters_per_ms: f64) -> Self {
        Self { anchor_lat, anchor_lon, meters_per_ms }
    }

    pub fn from_config(cfg: &SamplerConfig) -> Self {
        Self::new(cfg.anchor_lat, cfg.anchor_lon, cfg.meters_per_ms)
    }
}

impl Default for ProxySampler {
    fn default() -> Self {
        Self::from_config(&SamplerConfig::default())
    }
}

impl AttributeSampler for ProxySampler {
    fn name(&self) -> &str {
        "proxy"
    }

    fn sample(&self, feature: &BoundaryFeature) -> Result<SampledAttributes, GeoError> {
        if !(self.meters_per_ms > 0.0) {
            return Err(GeoError::Sampling(format!(
                "meters_per_ms must be positive, got {}",
                self.meters_per_ms
            )));
        }
        let meters = haversine_km(feature.lat, feature.lon, self.anchor_lat, self.anchor_lon) * 1000.0;
        Ok(SampledAttributes {
            latency_ms: Some(round1(meters / self.meters_per_ms)),
            ..Default::default()
        })
    }
}

// ── Null sampler ─────────────────────────────────────────────────────────────

pub struct NullSampler;

impl AttributeSampler for NullSampler {
    fn name(&self) -> &str {
        "none"
    }

    fn sample(&self, _feature: &BoundaryFeature) -> Result<SampledAttributes, GeoError> {
        Ok(SampledAttributes::default())
    }
}

// ── Mock sampler ─────────────────────────────────────────────────────────────

/// Mock sampler with hardcoded per-name data for unit tests and demos.
#[derive(Default)]
pub struct MockSampler {
    data: HashMap<String, SampledAttributes>,
    failing: HashSet<String>,
}

impl MockSampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, attrs: SampledAttributes) -> Self {
        self.data.insert(name.to_string(), attrs);
        self
    }

    /// Make sampling fail for `name`.
    pub fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }
}

impl AttributeSampler for MockSampler {
    fn name(&self) -> &str {
        "mock"
    }

    fn sample(&self, feature: &BoundaryFeature) -> Result<SampledAttributes, GeoError> {
        if self.failing.contains(&feature.name) {
            return Err(GeoError::Sampling(format!("no coverage for {}", feature.name)));
        }
        Ok(self.data.get(&feature.name).cloned().unwrap_or_default())
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
