//! Audit records for LLM calls.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmAuditEntry {
    pub id: Uuid,
    pub model: String,
    pub backend: String,
    pub site_count: usize,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub output_hash: String,
    pub latency_ms: u64,
    pub called_at: chrono::DateTime<Utc>,
}

impl LlmAuditEntry {
    pub fn new(
        model: String,
        backend: String,
        site_count: usize,
        prompt_tokens: u32,
        completion_tokens: u32,
        output: &str,
        latency_ms: u64,
    ) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(output.as_bytes());
        let output_hash = format!("{:x}", hasher.finalize());

        Self {
            id: Uuid::new_v4(),
            model,
            backend,
            site_count,
            prompt_tokens,
            completion_tokens,
            output_hash,
            latency_ms,
            called_at: Utc::now(),
        }
    }

    /// Emit the entry on the `sitescout::audit` target.
    pub fn record(&self) {
        tracing::info!(
            target: "sitescout::audit",
            id = %self.id,
            model = %self.model,
            backend = %self.backend,
            sites = self.site_count,
            prompt_tokens = self.prompt_tokens,
            completion_tokens = self.completion_tokens,
            latency_ms = self.latency_ms,
            output_hash = %self.output_hash,
            "LLM call audited"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_hash_is_stable() {
        let a = LlmAuditEntry::new("m".into(), "b".into(), 2, 10, 5, "[]", 12);
        let b = LlmAuditEntry::new("m".into(), "b".into(), 2, 10, 5, "[]", 40);
        assert_eq!(a.output_hash, b.output_hash);
        assert_eq!(a.output_hash.len(), 64);
        assert_ne!(a.id, b.id);
    }
}
