//! Export of ranked results to CSV or JSON.
//!
//! Both formats carry the same flat rows in ranking order. Absent attributes
//! become empty CSV cells and JSON nulls.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use sitescout_common::{ExportFormat, RankedSite};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One output row. Field order is the CSV column order.
#[derive(Debug, Clone, Serialize)]
pub struct ExportRow<'a> {
    pub rank: usize,
    pub name: &'a str,
    pub lat: f64,
    pub lon: f64,
    pub score: u8,
    pub tier: &'static str,
    pub risk_level: &'static str,
    pub elevation_m: Option<f64>,
    pub flood_pct: Option<f64>,
    pub power_distance_km: Option<f64>,
    pub latency_ms: Option<f64>,
    pub energy_cost_usd_per_mwh: Option<f64>,
    pub justification: &'a str,
}

impl<'a> ExportRow<'a> {
    pub fn new(rank: usize, r: &'a RankedSite) -> Self {
        Self {
            rank,
            name: &r.site.name,
            lat: r.site.lat,
            lon: r.site.lon,
            score: r.score,
            tier: r.tier.as_str(),
            risk_level: r.risk_level.as_str(),
            elevation_m: r.site.elevation_m,
            flood_pct: r.site.flood_pct,
            power_distance_km: r.site.power_distance_km,
            latency_ms: r.site.latency_ms,
            energy_cost_usd_per_mwh: r.site.energy_cost_usd_per_mwh,
            justification: &r.justification,
        }
    }
}

pub fn rows(ranked: &[RankedSite]) -> Vec<ExportRow<'_>> {
    ranked.iter().enumerate().map(|(i, r)| ExportRow::new(i + 1, r)).collect()
}

pub fn write_csv<W: Write>(writer: W, ranked: &[RankedSite]) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    if ranked.is_empty() {
        // serde-driven headers only appear with the first record
        wtr.write_record([
            "rank", "name", "lat", "lon", "score", "tier", "risk_level",
            "elevation_m", "flood_pct", "power_distance_km", "latency_ms",
            "energy_cost_usd_per_mwh", "justification",
        ])?;
    }
    for row in rows(ranked) {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<W: Write>(writer: W, ranked: &[RankedSite]) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(writer, &rows(ranked))?;
    Ok(())
}

pub fn export_to_path(
    path: impl AsRef<Path>,
    format: ExportFormat,
    ranked: &[RankedSite],
) -> Result<(), ExportError> {
    let path = path.as_ref();
    let mut out = BufWriter::new(File::create(path)?);
    match format {
        ExportFormat::Csv => write_csv(&mut out, ranked)?,
        ExportFormat::Json => write_json(&mut out, ranked)?,
    }
    out.flush()?;
    info!(path = %path.display(), rows = ranked.len(), format = ?format, "Exported ranking");
    Ok(())
}
