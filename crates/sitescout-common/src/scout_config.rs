//! Scouting run configuration.
//!
//! Selects the ranker, the attribute sampler and the export sink, and carries
//! the scoring coefficients. Loadable from TOML, YAML or JSON; every field has
//! a default so an empty file is a valid configuration.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoutError};

/// Complete configuration for one scouting run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoutConfig {
    /// Which ranker scores the batch
    #[serde(default)]
    pub ranking: RankingConfig,

    /// Penalty coefficients for the deterministic engine
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Hosted model used by the narrative ranker
    #[serde(default)]
    pub llm: LlmSettings,

    /// Attribute sampling for loaded boundaries
    #[serde(default)]
    pub sampler: SamplerConfig,

    /// Export sink options
    #[serde(default)]
    pub export: ExportConfig,
}

// ── Ranking ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingStrategy {
    #[default]
    Deterministic,
    Narrative,
    Mock,
}

impl RankingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RankingStrategy::Deterministic => "deterministic",
            RankingStrategy::Narrative     => "narrative",
            RankingStrategy::Mock          => "mock",
        }
    }
}

impl FromStr for RankingStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "deterministic" => Ok(RankingStrategy::Deterministic),
            "narrative" | "llm" => Ok(RankingStrategy::Narrative),
            "mock" => Ok(RankingStrategy::Mock),
            other => Err(format!("unknown ranking strategy: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankingConfig {
    #[serde(default)]
    pub strategy: RankingStrategy,
}

// ── Scoring coefficients ─────────────────────────────────────────────────────

/// Penalty coefficients. Defaults reproduce the reference formula exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_power_per_km")]
    pub power_per_km: f64,
    #[serde(default = "default_power_cap")]
    pub power_cap: f64,

    #[serde(default = "default_flood_per_pct")]
    pub flood_per_pct: f64,
    #[serde(default = "default_flood_cap")]
    pub flood_cap: f64,

    #[serde(default = "default_latency_baseline")]
    pub latency_baseline_ms: f64,
    #[serde(default = "default_latency_per_ms")]
    pub latency_per_ms: f64,
    #[serde(default = "default_latency_cap")]
    pub latency_cap: f64,

    #[serde(default = "default_cost_baseline")]
    pub cost_baseline_usd: f64,
    #[serde(default = "default_cost_per_usd")]
    pub cost_per_usd: f64,
    #[serde(default = "default_cost_cap")]
    pub cost_cap: f64,

    #[serde(default = "default_elevation_threshold")]
    pub elevation_threshold_m: f64,
    #[serde(default = "default_elevation_bonus")]
    pub elevation_bonus: f64,
}

fn default_power_per_km() -> f64 { 3.0 }
fn default_power_cap() -> f64 { 15.0 }
fn default_flood_per_pct() -> f64 { 1.5 }
fn default_flood_cap() -> f64 { 25.0 }
fn default_latency_baseline() -> f64 { 5.0 }
fn default_latency_per_ms() -> f64 { 0.8 }
fn default_latency_cap() -> f64 { 15.0 }
fn default_cost_baseline() -> f64 { 40.0 }
fn default_cost_per_usd() -> f64 { 0.3 }
fn default_cost_cap() -> f64 { 10.0 }
fn default_elevation_threshold() -> f64 { 200.0 }
fn default_elevation_bonus() -> f64 { 5.0 }

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            power_per_km: default_power_per_km(),
            power_cap: default_power_cap(),
            flood_per_pct: default_flood_per_pct(),
            flood_cap: default_flood_cap(),
            latency_baseline_ms: default_latency_baseline(),
            latency_per_ms: default_latency_per_ms(),
            latency_cap: default_latency_cap(),
            cost_baseline_usd: default_cost_baseline(),
            cost_per_usd: default_cost_per_usd(),
            cost_cap: default_cost_cap(),
            elevation_threshold_m: default_elevation_threshold(),
            elevation_bonus: default_elevation_bonus(),
        }
    }
}

// ── LLM ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    #[default]
    Anthropic,
    OpenaiCompatible,
    Ollama,
}

/// Settings for the hosted model behind the narrative ranker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default)]
    pub provider: LlmProvider,

    #[serde(default = "default_model")]
    pub model: String,

    /// Required for openai_compatible and ollama
    pub base_url: Option<String>,

    /// Falls back to the environment when absent
    pub api_key: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Per-attempt timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Sites sent to the model per batch; the rest get the fallback score
    #[serde(default = "default_max_batch")]
    pub max_batch: usize,

    #[serde(default = "default_fallback_score")]
    pub fallback_score: u8,
}

fn default_model() -> String { "claude-3-haiku-20240307".to_string() }
fn default_temperature() -> f32 { 0.3 }
fn default_max_tokens() -> u32 { 1024 }
fn default_timeout_secs() -> u64 { 30 }
fn default_max_retries() -> u32 { 1 }
fn default_max_batch() -> usize { 5 }
fn default_fallback_score() -> u8 { 30 }

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            model: default_model(),
            base_url: None,
            api_key: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            max_batch: default_max_batch(),
            fallback_score: default_fallback_score(),
        }
    }
}

// ── Sampler ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplerKind {
    /// Distance-based latency proxy only
    #[default]
    Proxy,
    /// Leave every attribute absent
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplerConfig {
    #[serde(default)]
    pub kind: SamplerKind,

    /// Latency anchor (Ashburn, VA by default)
    #[serde(default = "default_anchor_lat")]
    pub anchor_lat: f64,
    #[serde(default = "default_anchor_lon")]
    pub anchor_lon: f64,

    /// Great-circle metres per millisecond of latency proxy
    #[serde(default = "default_meters_per_ms")]
    pub meters_per_ms: f64,
}

fn default_anchor_lat() -> f64 { 39.0 }
fn default_anchor_lon() -> f64 { -77.5 }
fn default_meters_per_ms() -> f64 { 3000.0 }

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            kind: SamplerKind::default(),
            anchor_lat: default_anchor_lat(),
            anchor_lon: default_anchor_lon(),
            meters_per_ms: default_meters_per_ms(),
        }
    }
}

// ── Export ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("unknown export format: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub format: ExportFormat,

    /// Written after every ranking pass when set
    pub path: Option<String>,
}

// ── Helper Methods ───────────────────────────────────────────────────────────

impl ScoutConfig {
    /// Load from TOML file
    pub fn from_toml(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load from YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Load from JSON file
    pub fn from_json(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Load by file extension; anything that is not .yaml/.yml/.json is read as TOML.
    /// The result is validated.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(path)?,
            Some("json") => Self::from_json(path)?,
            _ => Self::from_toml(path)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values that parse but cannot drive a run.
    pub fn validate(&self) -> Result<()> {
        if self.llm.max_batch == 0 {
            return Err(ScoutError::Config("llm.max_batch must be at least 1".to_string()));
        }
        if self.llm.fallback_score > 100 {
            return Err(ScoutError::Config(format!(
                "llm.fallback_score must be 0-100, got {}",
                self.llm.fallback_score
            )));
        }
        if self.llm.timeout_secs == 0 {
            return Err(ScoutError::Config("llm.timeout_secs must be at least 1".to_string()));
        }
        if !(self.sampler.meters_per_ms.is_finite() && self.sampler.meters_per_ms > 0.0) {
            return Err(ScoutError::Config(format!(
                "sampler.meters_per_ms must be positive, got {}",
                self.sampler.meters_per_ms
            )));
        }
        Ok(())
    }

    /// Save to TOML file
    pub fn to_toml(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
