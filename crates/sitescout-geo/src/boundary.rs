//! GeoJSON boundary loader.
//!
//! Turns an uploaded FeatureCollection (or a single Feature) into one
//! `BoundaryFeature` per entry:
//!   - name from `properties.name`, "Site" when absent
//!   - representative point: area-weighted centroid of the outer ring(s),
//!     the point itself for Point geometries
//!   - bounds accumulated over every outer-ring vertex
//!
//! Anything malformed is rejected here so the scoring core never sees it.

use std::path::Path;

use serde_json::Value;
use sitescout_common::Site;
use tracing::debug;

use crate::bounds::Bounds;
use crate::error::GeoError;

pub const DEFAULT_SITE_NAME: &str = "Site";

pub type Position = [f64; 2]; // [lon, lat]

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    Point,
    Polygon,
    MultiPolygon,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFeature {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub kind: GeometryKind,
    /// Outer ring of every polygon part; empty for points.
    pub outer_rings: Vec<Vec<Position>>,
}

impl BoundaryFeature {
    pub fn to_site(&self) -> Site {
        Site::new(self.name.clone(), self.lat, self.lon)
    }
}

#[derive(Debug, Clone, Default)]
pub struct BoundaryBatch {
    pub features: Vec<BoundaryFeature>,
    pub bounds: Bounds,
}

impl BoundaryBatch {
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }
}

/// Parse GeoJSON text.
pub fn load_boundaries(json: &str) -> Result<BoundaryBatch, GeoError> {
    let root: Value = serde_json::from_str(json)?;

    let features: Vec<&Value> = match root["type"].as_str() {
        Some("FeatureCollection") => root["features"]
            .as_array()
            .ok_or_else(|| GeoError::InvalidGeoJson("FeatureCollection without a features array".to_string()))?
            .iter()
            .collect(),
        Some("Feature") => vec![&root],
        Some(other) => {
            return Err(GeoError::InvalidGeoJson(format!(
                "expected FeatureCollection or Feature, found {other}"
            )))
        }
        None => return Err(GeoError::InvalidGeoJson("missing \"type\"".to_string())),
    };

    let mut batch = BoundaryBatch::default();
    for (idx, feature) in features.iter().enumerate() {
        let parsed = parse_feature(feature, idx)?;
        if parsed.outer_rings.is_empty() {
            batch.bounds.extend(parsed.lon, parsed.lat);
        }
        for ring in &parsed.outer_rings {
            for [lon, lat] in ring {
                batch.bounds.extend(*lon, *lat);
            }
        }
        batch.features.push(parsed);
    }

    debug!(count = batch.features.len(), "Boundary file parsed");
    Ok(batch)
}

/// Read and parse a GeoJSON file.
pub fn load_boundary_file(path: impl AsRef<Path>) -> Result<BoundaryBatch, GeoError> {
    let content = std::fs::read_to_string(path)?;
    load_boundaries(&content)
}

fn parse_feature(feature: &Value, idx: usize) -> Result<BoundaryFeature, GeoError> {
    let name = feature["properties"]["name"]
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SITE_NAME)
        .to_string();

    let geometry = &feature["geometry"];
    if !geometry.is_object() {
        return Err(GeoError::InvalidGeoJson(format!("feature {idx} has no geometry")));
    }
    let coords = &geometry["coordinates"];

    match geometry["type"].as_str() {
        Some("Point") => {
            let [lon, lat] = parse_position(coords, idx)?;
            Ok(BoundaryFeature { name, lat, lon, kind: GeometryKind::Point, outer_rings: vec![] })
        }
        Some("Polygon") => {
            let ring = parse_outer_ring(coords, idx)?;
            let ([lon, lat], _) = ring_centroid(&ring);
            Ok(BoundaryFeature { name, lat, lon, kind: GeometryKind::Polygon, outer_rings: vec![ring] })
        }
        Some("MultiPolygon") => {
            let parts = coords
                .as_array()
                .filter(|p| !p.is_empty())
                .ok_or_else(|| GeoError::InvalidGeoJson(format!("feature {idx}: empty MultiPolygon")))?;
            let rings = parts
                .iter()
                .map(|p| parse_outer_ring(p, idx))
                .collect::<Result<Vec<_>, _>>()?;
            let [lon, lat] = multi_centroid(&rings);
            Ok(BoundaryFeature { name, lat, lon, kind: GeometryKind::MultiPolygon, outer_rings: rings })
        }
        Some(other) => Err(GeoError::UnsupportedGeometry(other.to_string())),
        None => Err(GeoError::InvalidGeoJson(format!("feature {idx}: geometry without type"))),
    }
}

fn parse_position(v: &Value, idx: usize) -> Result<Position, GeoError> {
    let arr = v
        .as_array()
        .filter(|a| a.len() >= 2)
        .ok_or_else(|| GeoError::InvalidGeoJson(format!("feature {idx}: bad position")))?;
    match (arr[0].as_f64(), arr[1].as_f64()) {
        (Some(lon), Some(lat)) if lon.is_finite() && lat.is_finite() => Ok([lon, lat]),
        _ => Err(GeoError::InvalidGeoJson(format!("feature {idx}: non-numeric coordinate"))),
    }
}

/// First ring of a Polygon's coordinate array.
fn parse_outer_ring(polygon: &Value, idx: usize) -> Result<Vec<Position>, GeoError> {
    let ring = polygon
        .as_array()
        .and_then(|rings| rings.first())
        .and_then(Value::as_array)
        .filter(|r| !r.is_empty())
        .ok_or_else(|| GeoError::InvalidGeoJson(format!("feature {idx}: polygon without an outer ring")))?;
    ring.iter().map(|p| parse_position(p, idx)).collect()
}

/// Area-weighted centroid (shoelace) and absolute area of a ring.
/// Degenerate rings fall back to the vertex mean with zero area.
fn ring_centroid(ring: &[Position]) -> (Position, f64) {
    let n = ring.len();
    let mut twice_area = 0.0_f64;
    let mut cx = 0.0_f64;
    let mut cy = 0.0_f64;
    for i in 0..n {
        let [x0, y0] = ring[i];
        let [x1, y1] = ring[(i + 1) % n];
        let cross = x0 * y1 - x1 * y0;
        twice_area += cross;
        cx += (x0 + x1) * cross;
        cy += (y0 + y1) * cross;
    }

    if twice_area.abs() < 1e-12 {
        return (vertex_mean(ring), 0.0);
    }
    ([cx / (3.0 * twice_area), cy / (3.0 * twice_area)], (twice_area / 2.0).abs())
}

fn vertex_mean(ring: &[Position]) -> Position {
    // closed rings repeat the first vertex
    let open = if ring.len() > 1 && ring.first() == ring.last() {
        &ring[..ring.len() - 1]
    } else {
        ring
    };
    let n = open.len() as f64;
    let (sx, sy) = open
        .iter()
        .fold((0.0_f64, 0.0_f64), |(sx, sy), [x, y]| (sx + *x, sy + *y));
    [sx / n, sy / n]
}

fn multi_centroid(rings: &[Vec<Position>]) -> Position {
    let parts: Vec<(Position, f64)> = rings.iter().map(|r| ring_centroid(r)).collect();
    let total: f64 = parts.iter().map(|(_, a)| a).sum();

    if total < 1e-12 {
        let centres: Vec<Position> = parts.into_iter().map(|(c, _)| c).collect();
        return vertex_mean(&centres);
    }
    let (sx, sy) = parts
        .iter()
        .fold((0.0_f64, 0.0_f64), |(sx, sy), ([x, y], a)| (sx + x * a, sy + y * a));
    [sx / total, sy / total]
}
