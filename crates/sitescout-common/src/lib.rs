//! sitescout-common: Shared site types, errors, and configuration used across all SiteScout crates.

pub mod error;
pub mod site;
pub mod scout_config;

// Re-export commonly used types
pub use site::{MarkerColor, RankedSite, RiskLevel, Site, Tier};
pub use scout_config::{
    ExportConfig, ExportFormat, LlmProvider, LlmSettings, RankingStrategy, SamplerConfig,
    SamplerKind, ScoringConfig, ScoutConfig,
};
