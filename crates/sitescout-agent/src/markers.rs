//! Map markers for the loaded batch.

use sitescout_common::{MarkerColor, Site};

use crate::session::ScoutSession;

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub color: MarkerColor,
    pub popup: String,
}

fn or_na(value: Option<f64>) -> String {
    value.map(|v| format!("{v}")).unwrap_or_else(|| "N/A".to_string())
}

pub fn popup_text(site: &Site, score: Option<u8>) -> String {
    format!(
        "{} | Score: {} | Power: {} km | Flood: {}%",
        site.name,
        score.map(|s| s.to_string()).unwrap_or_else(|| "N/A".to_string()),
        or_na(site.power_distance_km),
        or_na(site.flood_pct),
    )
}

/// One marker per loaded site, in load order. Unranked sites are red.
pub fn build_markers(session: &ScoutSession) -> Vec<Marker> {
    session
        .sites
        .iter()
        .map(|site| {
            let ranked = session.ranked_by_name(&site.name);
            Marker {
                name: site.name.clone(),
                lat: site.lat,
                lon: site.lon,
                color: ranked.map(|r| r.marker_color()).unwrap_or(MarkerColor::Red),
                popup: popup_text(site, ranked.map(|r| r.score)),
            }
        })
        .collect()
}
