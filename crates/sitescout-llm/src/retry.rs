//! Timeout and retry wrapper for backend calls.

use std::time::Duration;

use tracing::warn;

use crate::backend::{LlmBackend, LlmError, LlmRequest, LlmResponse};

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Applied to each attempt separately.
    pub timeout: Duration,
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 1,
        }
    }
}

impl RetryPolicy {
    pub fn new(timeout: Duration, max_retries: u32) -> Self {
        Self { timeout, max_retries }
    }
}

/// Call `backend.complete`, bounding every attempt by `policy.timeout` and
/// retrying retryable failures up to `policy.max_retries` times.
pub async fn complete_with_retry(
    backend: &dyn LlmBackend,
    req: LlmRequest,
    policy: &RetryPolicy,
) -> Result<LlmResponse, LlmError> {
    let mut attempt: u32 = 0;
    loop {
        let outcome = match tokio::time::timeout(policy.timeout, backend.complete(req.clone())).await {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout(policy.timeout)),
        };

        match outcome {
            Ok(resp) => return Ok(resp),
            Err(e) if attempt < policy.max_retries && e.is_retryable() => {
                attempt += 1;
                warn!(
                    model = backend.model_id(),
                    attempt,
                    error = %e,
                    "LLM call failed, retrying"
                );
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first `failures` calls, then answers.
    struct FlakyBackend {
        failures: u32,
        calls: AtomicU32,
        delay: Duration,
        error_status: u16,
    }

    impl FlakyBackend {
        fn new(failures: u32) -> Self {
            Self { failures, calls: AtomicU32::new(0), delay: Duration::ZERO, error_status: 503 }
        }
    }

    #[async_trait]
    impl LlmBackend for FlakyBackend {
        async fn complete(&self, _req: LlmRequest) -> Result<LlmResponse, LlmError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if n < self.failures {
                return Err(LlmError::ApiError { status: self.error_status, message: "down".into() });
            }
            Ok(LlmResponse {
                content: "ok".into(),
                model: "flaky".into(),
                prompt_tokens: 1,
                completion_tokens: 1,
            })
        }
        fn model_id(&self) -> &str { "flaky" }
        fn backend_name(&self) -> &str { "test" }
        fn is_local(&self) -> bool { true }
    }

    fn req() -> LlmRequest {
        LlmRequest { messages: vec![], model: None, max_tokens: None, temperature: None }
    }

    #[tokio::test]
    async fn test_single_retry_recovers() {
        let backend = FlakyBackend::new(1);
        let resp = complete_with_retry(&backend, req(), &RetryPolicy::default()).await.unwrap();
        assert_eq!(resp.content, "ok");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_gives_up_after_one_retry() {
        let backend = FlakyBackend::new(5);
        let err = complete_with_retry(&backend, req(), &RetryPolicy::default()).await.unwrap_err();
        assert!(matches!(err, LlmError::ApiError { status: 503, .. }));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let mut backend = FlakyBackend::new(5);
        backend.error_status = 400;
        let _ = complete_with_retry(&backend, req(), &RetryPolicy::default()).await;
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let mut backend = FlakyBackend::new(0);
        backend.delay = Duration::from_millis(500);
        let policy = RetryPolicy::new(Duration::from_millis(20), 1);
        let err = complete_with_retry(&backend, req(), &policy).await.unwrap_err();
        assert!(matches!(err, LlmError::Timeout(_)));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }
}
