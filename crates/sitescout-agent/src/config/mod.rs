//! Configuration loading for SiteScout.
//! Reads the path given by `--config`, else SITESCOUT_CONFIG, else sitescout.toml
//! in the current directory.

use std::path::{Path, PathBuf};

use secrecy::SecretString;
use sitescout_common::{ExportFormat, LlmSettings, RankingStrategy, ScoutConfig};
use tracing::{info, warn};

pub const CONFIG_ENV: &str = "SITESCOUT_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "sitescout.toml";

/// Checked in order when `llm.api_key` is empty.
pub const API_KEY_ENV_VARS: [&str; 2] = ["SITESCOUT_ANTHROPIC_API_KEY", "ANTHROPIC_API_KEY"];

mod tests;

/// Per-invocation overrides from the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub strategy: Option<RankingStrategy>,
    pub export_path: Option<PathBuf>,
    pub format: Option<ExportFormat>,
}

fn resolve_path(explicit: Option<&Path>, env_value: Option<String>) -> PathBuf {
    match (explicit, env_value) {
        (Some(p), _) => p.to_path_buf(),
        (None, Some(v)) if !v.is_empty() => PathBuf::from(v),
        _ => PathBuf::from(DEFAULT_CONFIG_FILE),
    }
}

/// Load the run configuration.
///
/// An explicit `--config` path must exist. An implicit one (env var or the
/// default file name) may be missing, in which case defaults apply.
pub fn load(explicit: Option<&Path>) -> anyhow::Result<ScoutConfig> {
    let path = resolve_path(explicit, std::env::var(CONFIG_ENV).ok());

    if !path.exists() {
        if explicit.is_some() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        warn!(
            path = %path.display(),
            "No config file found, using defaults. Copy sitescout.example.toml to sitescout.toml to customise."
        );
        return Ok(ScoutConfig::default());
    }

    let config = ScoutConfig::from_path(&path)?;
    info!(
        path = %path.display(),
        strategy = config.ranking.strategy.as_str(),
        "Configuration loaded"
    );
    Ok(config)
}

pub fn apply_overrides(mut config: ScoutConfig, overrides: &Overrides) -> ScoutConfig {
    if let Some(strategy) = overrides.strategy {
        config.ranking.strategy = strategy;
    }
    if let Some(ref path) = overrides.export_path {
        config.export.path = Some(path.display().to_string());
    }
    if let Some(format) = overrides.format {
        config.export.format = format;
    }
    config
}

/// Resolve the LLM API key: config first, then the environment.
pub fn resolve_api_key(settings: &LlmSettings) -> Option<SecretString> {
    resolve_api_key_with(settings, |name| std::env::var(name).ok())
}

fn resolve_api_key_with(
    settings: &LlmSettings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<SecretString> {
    if let Some(ref key) = settings.api_key {
        if !key.trim().is_empty() {
            return Some(SecretString::from(key.trim().to_string()));
        }
    }
    API_KEY_ENV_VARS
        .iter()
        .filter_map(|name| lookup(name))
        .find(|v| !v.trim().is_empty())
        .map(|v| SecretString::from(v.trim().to_string()))
}
