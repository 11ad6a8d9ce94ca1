//! Narrative ranking through a hosted language model.
//!
//! Flow for one batch:
//!   1. Clean the first `max_batch` sites into compact attribute tuples
//!   2. Ask the model for a JSON array of `{name, score, justification}`
//!   3. Extract the array between the first `[` and the last `]`
//!   4. Map entries back to input sites by name; clamp scores to [0, 100]
//!      and re-derive tier/risk from the fixed thresholds
//!
//! Any failure (transport, timeout after retry, malformed JSON, missing
//! sites) degrades to a fixed fallback score. Errors never reach the output.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use sitescout_common::site::sort_by_score_desc;
use sitescout_common::{LlmSettings, RankedSite, Site};
use sitescout_llm::audit::LlmAuditEntry;
use sitescout_llm::{complete_with_retry, LlmBackend, LlmRequest, Message, RetryPolicy};
use tracing::{debug, info, warn};

use crate::ranker::Ranker;

pub const SYSTEM_PROMPT: &str =
    "You are a data-center site expert. Respond ONLY with valid JSON array. No text outside.";

pub const FALLBACK_API_FAILED: &str = "Fallback: API failed";
pub const FALLBACK_INVALID_JSON: &str = "Fallback: invalid JSON";
pub const FALLBACK_NOT_RANKED: &str = "Fallback: not ranked by model";

/// Compact view of a site sent to the model. Absent attributes serialise as null.
#[derive(Debug, Clone, Serialize)]
pub struct PromptSite<'a> {
    pub name: &'a str,
    pub elev: Option<f64>,
    pub flood: Option<f64>,
    pub power: Option<f64>,
    pub latency: Option<f64>,
    pub cost: Option<f64>,
}

impl<'a> From<&'a Site> for PromptSite<'a> {
    fn from(site: &'a Site) -> Self {
        Self {
            name: &site.name,
            elev: site.elevation_m,
            flood: site.flood_pct,
            power: site.power_distance_km,
            latency: site.latency_ms,
            cost: site.energy_cost_usd_per_mwh,
        }
    }
}

/// One parsed model verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct NarrativeEntry {
    pub name: String,
    pub score: f64,
    pub justification: String,
}

pub struct NarrativeRanker {
    backend: Arc<dyn LlmBackend>,
    policy: RetryPolicy,
    max_batch: usize,
    fallback_score: u8,
    temperature: f32,
    max_tokens: u32,
}

impl NarrativeRanker {
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self::from_settings(backend, &LlmSettings::default())
    }

    pub fn from_settings(backend: Arc<dyn LlmBackend>, settings: &LlmSettings) -> Self {
        Self {
            backend,
            policy: RetryPolicy::new(Duration::from_secs(settings.timeout_secs), settings.max_retries),
            max_batch: settings.max_batch,
            fallback_score: settings.fallback_score,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_max_batch(mut self, max_batch: usize) -> Self {
        self.max_batch = max_batch;
        self
    }

    pub fn build_request(&self, sites: &[Site]) -> LlmRequest {
        let cleaned: Vec<PromptSite<'_>> = sites.iter().map(PromptSite::from).collect();
        // serialising plain structs of strings and floats cannot fail
        let listing = serde_json::to_string(&cleaned).unwrap_or_else(|_| "[]".to_string());
        let user = format!(
            "Rank these sites (power, flood, latency, cost):\n{listing}\n\n\
             Return ONLY:\n\
             [{{\"name\": \"Site\", \"score\": 0-100, \"justification\": \"1 sentence\"}}]"
        );
        LlmRequest {
            messages: vec![Message::system(SYSTEM_PROMPT), Message::user(user)],
            model: None,
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
        }
    }

    fn fallback_all(&self, sites: &[Site], reason: &str) -> Vec<RankedSite> {
        sites
            .iter()
            .map(|s| RankedSite::new(s.clone(), self.fallback_score, reason))
            .collect()
    }
}

#[async_trait]
impl Ranker for NarrativeRanker {
    fn name(&self) -> &str {
        "narrative"
    }

    async fn rank(&self, sites: &[Site]) -> Vec<RankedSite> {
        if sites.is_empty() {
            return vec![];
        }
        let batch = &sites[..sites.len().min(self.max_batch)];
        if batch.len() < sites.len() {
            info!(
                sent = batch.len(),
                total = sites.len(),
                "Batch cap reached, remaining sites get the fallback score"
            );
        }
        if batch.is_empty() {
            warn!("llm.max_batch is 0, no sites sent to the model");
            return merge_entries(sites, 0, &[], self.fallback_score);
        }

        let started = Instant::now();
        let request = self.build_request(batch);
        let mut ranked = match complete_with_retry(self.backend.as_ref(), request, &self.policy).await {
            Err(e) => {
                warn!(model = self.backend.model_id(), error = %e, "Narrative ranking failed");
                self.fallback_all(sites, FALLBACK_API_FAILED)
            }
            Ok(resp) => {
                LlmAuditEntry::new(
                    resp.model.clone(),
                    self.backend.backend_name().to_string(),
                    batch.len(),
                    resp.prompt_tokens,
                    resp.completion_tokens,
                    &resp.content,
                    started.elapsed().as_millis() as u64,
                )
                .record();

                match extract_json_array(&resp.content).map(|items| parse_entries(&items)) {
                    Some(entries) if !entries.is_empty() => {
                        debug!(entries = entries.len(), "Model ranked sites");
                        merge_entries(sites, batch.len(), &entries, self.fallback_score)
                    }
                    _ => {
                        let preview: String = resp.content.chars().take(200).collect();
                        warn!(raw = %preview, "Model returned invalid JSON");
                        self.fallback_all(sites, FALLBACK_INVALID_JSON)
                    }
                }
            }
        };

        sort_by_score_desc(&mut ranked);
        ranked
    }
}

/// Slice from the first `[` to the last `]` and parse it as a JSON array.
pub fn extract_json_array(text: &str) -> Option<Vec<Value>> {
    let text = text.trim();
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end < start {
        return None;
    }
    match serde_json::from_str::<Value>(&text[start..=end]).ok()? {
        Value::Array(items) => Some(items),
        _ => None,
    }
}

/// Keep entries with a name and a finite score; scores may arrive as numbers or numeric strings.
pub fn parse_entries(items: &[Value]) -> Vec<NarrativeEntry> {
    items
        .iter()
        .filter_map(|item| {
            let name = item["name"].as_str()?.trim().to_string();
            let score = match &item["score"] {
                Value::Number(n) => n.as_f64()?,
                Value::String(s) => s.trim().parse::<f64>().ok()?,
                _ => return None,
            };
            if !score.is_finite() {
                return None;
            }
            Some(NarrativeEntry {
                name,
                score,
                justification: item["justification"].as_str().unwrap_or("").to_string(),
            })
        })
        .collect()
}

/// Attach model verdicts to the first `sent` sites by name. Sites past the
/// cap, or missing from the response, get the fallback score. Output is in
/// input order; the caller sorts.
pub fn merge_entries(
    sites: &[Site],
    sent: usize,
    entries: &[NarrativeEntry],
    fallback_score: u8,
) -> Vec<RankedSite> {
    let mut by_name: HashMap<&str, &NarrativeEntry> = HashMap::new();
    for entry in entries {
        by_name.entry(entry.name.as_str()).or_insert(entry);
    }

    sites
        .iter()
        .enumerate()
        .map(|(idx, site)| {
            let verdict = if idx < sent { by_name.get(site.name.as_str()) } else { None };
            match verdict {
                Some(entry) => {
                    let score = entry.score.round().clamp(0.0, 100.0) as u8;
                    RankedSite::new(site.clone(), score, entry.justification.clone())
                }
                None => RankedSite::new(site.clone(), fallback_score, FALLBACK_NOT_RANKED),
            }
        })
        .collect()
}
