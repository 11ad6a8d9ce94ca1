//! Built-in demo batch: five US candidate sites with canned attributes.

use sitescout_geo::boundary::GeometryKind;
use sitescout_geo::sampler::MockSampler;
use sitescout_geo::{Bounds, BoundaryBatch, BoundaryFeature, SampledAttributes};

struct DemoSite {
    name: &'static str,
    lat: f64,
    lon: f64,
    elevation_m: f64,
    flood_pct: f64,
    power_distance_km: f64,
    latency_ms: f64,
    energy_cost_usd_per_mwh: f64,
}

const DEMO_SITES: [DemoSite; 5] = [
    DemoSite { name: "Ashburn, Virginia", lat: 39.04, lon: -77.49, elevation_m: 85.0,   flood_pct: 1.2,  power_distance_km: 0.8, latency_ms: 8.0,  energy_cost_usd_per_mwh: 52.0 },
    DemoSite { name: "Dallas, Texas",     lat: 32.78, lon: -96.80, elevation_m: 131.0,  flood_pct: 6.5,  power_distance_km: 2.1, latency_ms: 12.0, energy_cost_usd_per_mwh: 45.0 },
    DemoSite { name: "Salt Lake City",    lat: 40.76, lon: -111.89, elevation_m: 1288.0, flood_pct: 2.0, power_distance_km: 3.4, latency_ms: 15.0, energy_cost_usd_per_mwh: 50.0 },
    DemoSite { name: "Phoenix, Arizona",  lat: 33.45, lon: -112.07, elevation_m: 215.0, flood_pct: 15.7, power_distance_km: 6.8, latency_ms: 14.0, energy_cost_usd_per_mwh: 68.0 },
    DemoSite { name: "Columbus, Ohio",    lat: 39.96, lon: -83.00, elevation_m: 275.0,  flood_pct: 4.0,  power_distance_km: 1.5, latency_ms: 10.0, energy_cost_usd_per_mwh: 58.0 },
];

pub fn demo_batch() -> BoundaryBatch {
    let mut bounds = Bounds::empty();
    let features = DEMO_SITES
        .iter()
        .map(|d| {
            bounds.extend(d.lon, d.lat);
            BoundaryFeature {
                name: d.name.to_string(),
                lat: d.lat,
                lon: d.lon,
                kind: GeometryKind::Point,
                outer_rings: vec![],
            }
        })
        .collect();
    BoundaryBatch { features, bounds }
}

/// Sampler returning the canned attributes for each demo site.
pub fn demo_sampler() -> MockSampler {
    DEMO_SITES.iter().fold(MockSampler::new(), |sampler, d| {
        sampler.with(
            d.name,
            SampledAttributes {
                elevation_m: Some(d.elevation_m),
                flood_pct: Some(d.flood_pct),
                power_distance_km: Some(d.power_distance_km),
                latency_ms: Some(d.latency_ms),
                energy_cost_usd_per_mwh: Some(d.energy_cost_usd_per_mwh),
            },
        )
    })
}
