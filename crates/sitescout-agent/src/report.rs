//! Plain-text rendering of a ranked session for the terminal.

use std::fmt::Write;

use sitescout_common::RankedSite;
use sitescout_geo::MapView;

use crate::markers::Marker;

pub fn render_view(view: &MapView) -> String {
    format!(
        "Map view: center ({:.4}, {:.4}) zoom {}",
        view.center_lat, view.center_lon, view.zoom
    )
}

pub fn render_ranking(ranked: &[RankedSite]) -> String {
    if ranked.is_empty() {
        return "No sites ranked.".to_string();
    }
    let mut out = String::new();
    for (i, r) in ranked.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>2}. {:<28} {:>3}  {:<5}  {:<6}  {}",
            i + 1,
            r.name(),
            r.score,
            r.tier.as_str(),
            r.risk_level.as_str(),
            r.justification
        );
    }
    out
}

pub fn render_markers(markers: &[Marker]) -> String {
    let mut out = String::new();
    for m in markers {
        let _ = writeln!(out, "[{:<6}] ({:.4}, {:.4}) {}", m.color.as_str(), m.lat, m.lon, m.popup);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitescout_common::{MarkerColor, Site};

    #[test]
    fn test_render_ranking_lines() {
        let ranked = vec![
            RankedSite::new(Site::new("Ashburn", 39.0, -77.5), 90, "close to power"),
            RankedSite::new(Site::new("Phoenix", 33.4, -112.0), 51, "hot"),
        ];
        let text = render_ranking(&ranked);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(" 1. Ashburn"));
        assert!(lines[0].contains("90  Tier1  Low"));
        assert!(lines[1].contains("51  Tier3  High"));
        assert_eq!(render_ranking(&[]), "No sites ranked.");
    }

    #[test]
    fn test_render_view_and_markers() {
        assert_eq!(render_view(&MapView::default()), "Map view: center (38.0000, -98.0000) zoom 4");

        let markers = vec![Marker {
            name: "A".into(),
            lat: 1.0,
            lon: 2.0,
            color: MarkerColor::Green,
            popup: "A | Score: 90 | Power: N/A km | Flood: N/A%".into(),
        }];
        assert_eq!(
            render_markers(&markers),
            "[green ] (1.0000, 2.0000) A | Score: 90 | Power: N/A km | Flood: N/A%\n"
        );
    }
}
