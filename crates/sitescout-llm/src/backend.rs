//! LLM backend trait and concrete implementations.
//!
//! Backends:
//!   AnthropicBackend         Anthropic Messages API (claude-*)
//!   OpenAiCompatibleBackend  any OpenAI-compatible endpoint (OpenAI, LMStudio,
//!                             TogetherAI, Groq, OpenRouter, vLLM, …)
//!   OllamaBackend            local Ollama (OpenAI-compatible)

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    #[error("API error [{status}]: {message}")]
    ApiError { status: u16, message: String },
}

impl LlmError {
    /// Transport failures, timeouts, throttling and server errors are worth one more attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Http(_) | LlmError::Timeout(_) => true,
            LlmError::ApiError { status, .. } => *status == 429 || *status >= 500,
            LlmError::Serde(_) | LlmError::Unavailable(_) => false,
        }
    }
}

// ── Request / Response ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,   // "system" | "user" | "assistant"
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRequest {
    pub messages: Vec<Message>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: String,
    pub model: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

// ── Trait ─────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError>;
    fn model_id(&self) -> &str;
    fn backend_name(&self) -> &str;
    fn is_local(&self) -> bool;
}

// ── Helper: parse OpenAI-style response ──────────────────────────────────────

fn parse_openai_response(json: &serde_json::Value, fallback_model: &str) -> LlmResponse {
    LlmResponse {
        content: json["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string(),
        model: json["model"]
            .as_str()
            .unwrap_or(fallback_model)
            .to_string(),
        prompt_tokens:     json["usage"]["prompt_tokens"].as_u64().unwrap_or(0) as u32,
        completion_tokens: json["usage"]["completion_tokens"].as_u64().unwrap_or(0) as u32,
    }
}

const ERROR_BODY_PREVIEW_CHARS: usize = 200;

/// Message for an error response. Gateways and proxies often answer with
/// HTML or plain text, so the body is only treated as JSON when it parses.
fn api_error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(msg) = json["error"]["message"]
            .as_str()
            .or_else(|| json["message"].as_str())
            .or_else(|| json["error"].as_str())
        {
            return msg.to_string();
        }
    }
    let text = body.trim();
    if text.is_empty() {
        "empty error body".to_string()
    } else {
        text.chars().take(ERROR_BODY_PREVIEW_CHARS).collect()
    }
}

/// Status first, then body: a non-JSON 4xx/5xx must still surface as `ApiError`.
async fn check_response_status(resp: reqwest::Response) -> Result<serde_json::Value, LlmError> {
    let status = resp.status().as_u16();
    let body = resp.text().await?;
    if status >= 400 {
        return Err(LlmError::ApiError { status, message: api_error_message(&body) });
    }
    Ok(serde_json::from_str(&body)?)
}

/// POST to `{base_url}/v1/chat/completions`, shared by every OpenAI-style server.
async fn post_chat_completion(
    client: &reqwest::Client,
    base_url: &str,
    default_model: &str,
    api_key: Option<&SecretString>,
    req: LlmRequest,
) -> Result<LlmResponse, LlmError> {
    let url = format!("{}/v1/chat/completions", base_url.trim_end_matches('/'));
    let body = serde_json::json!({
        "model":       req.model.as_deref().unwrap_or(default_model),
        "messages":    req.messages,
        "max_tokens":  req.max_tokens.unwrap_or(1024),
        "temperature": req.temperature.unwrap_or(0.3),
    });
    let mut request = client.post(&url).json(&body);
    if let Some(key) = api_key {
        request = request.bearer_auth(key.expose_secret());
    }
    let json = check_response_status(request.send().await?).await?;
    Ok(parse_openai_response(&json, default_model))
}

// ── 1. Anthropic (claude-*) ───────────────────────────────────────────────────

pub const ANTHROPIC_MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";

pub struct AnthropicBackend {
    pub model: String,
    pub endpoint: String,
    api_key: SecretString,
    client: reqwest::Client,
}

impl AnthropicBackend {
    pub fn new(api_key: SecretString, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            endpoint: ANTHROPIC_MESSAGES_URL.to_string(),
            api_key,
            client: reqwest::Client::new(),
        }
    }

    /// Point at a proxy or gateway instead of the public endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl LlmBackend for AnthropicBackend {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        // Messages API takes the system prompt as a top-level field
        let system = req.messages.iter()
            .find(|m| m.role == "system")
            .map(|m| m.content.as_str())
            .unwrap_or("");

        let messages: Vec<serde_json::Value> = req.messages.iter()
            .filter(|m| m.role != "system")
            .map(|m| serde_json::json!({"role": m.role, "content": m.content}))
            .collect();

        let model = req.model.as_deref().unwrap_or(&self.model);

        let mut body = serde_json::json!({
            "model":       model,
            "messages":    messages,
            "max_tokens":  req.max_tokens.unwrap_or(1024),
            "temperature": req.temperature.unwrap_or(0.3),
        });
        if !system.is_empty() {
            body["system"] = serde_json::Value::String(system.to_string());
        }

        let resp = self.client
            .post(&self.endpoint)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let json = check_response_status(resp).await?;

        let content = json["content"]
            .as_array()
            .and_then(|blocks| blocks.first())
            .and_then(|b| b["text"].as_str())
            .unwrap_or("")
            .to_string();

        Ok(LlmResponse {
            content,
            model: json["model"].as_str().unwrap_or(model).to_string(),
            prompt_tokens:     json["usage"]["input_tokens"].as_u64().unwrap_or(0) as u32,
            completion_tokens: json["usage"]["output_tokens"].as_u64().unwrap_or(0) as u32,
        })
    }

    fn model_id(&self) -> &str { &self.model }
    fn backend_name(&self) -> &str { "anthropic" }
    fn is_local(&self) -> bool { false }
}

// ── 2. OpenAI-Compatible (OpenAI, LMStudio, TogetherAI, Groq, vLLM, …) ───────

pub struct OpenAiCompatibleBackend {
    pub base_url: String,
    pub model: String,
    api_key: Option<SecretString>,
    client: reqwest::Client,
}

impl OpenAiCompatibleBackend {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<SecretString>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl LlmBackend for OpenAiCompatibleBackend {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        post_chat_completion(&self.client, &self.base_url, &self.model, self.api_key.as_ref(), req).await
    }

    fn model_id(&self) -> &str { &self.model }
    fn backend_name(&self) -> &str { "openai_compatible" }
    fn is_local(&self) -> bool { false }
}

// ── 3. Ollama (local) ─────────────────────────────────────────────────────────

pub struct OllamaBackend {
    pub base_url: String,
    pub model: String,
    client: reqwest::Client,
}

impl OllamaBackend {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), model: model.into(), client: reqwest::Client::new() }
    }
}

#[async_trait]
impl LlmBackend for OllamaBackend {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        post_chat_completion(&self.client, &self.base_url, &self.model, None, req).await
    }

    fn model_id(&self) -> &str { &self.model }
    fn backend_name(&self) -> &str { "ollama" }
    fn is_local(&self) -> bool { true }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anthropic_backend_is_not_local() {
        let b = AnthropicBackend::new(SecretString::from("sk-ant-test"), "claude-3-haiku-20240307");
        assert!(!b.is_local());
        assert_eq!(b.model_id(), "claude-3-haiku-20240307");
        assert_eq!(b.endpoint, ANTHROPIC_MESSAGES_URL);
    }

    #[test]
    fn test_anthropic_endpoint_override() {
        let b = AnthropicBackend::new(SecretString::from("k"), "m")
            .with_endpoint("http://127.0.0.1:9/v1/messages");
        assert_eq!(b.endpoint, "http://127.0.0.1:9/v1/messages");
    }

    #[test]
    fn test_openai_compatible_with_no_key() {
        let b = OpenAiCompatibleBackend::new("http://localhost:1234", "local-model", None);
        assert_eq!(b.model_id(), "local-model");
        assert_eq!(b.backend_name(), "openai_compatible");
    }

    #[test]
    fn test_ollama_is_local() {
        let b = OllamaBackend::new("http://localhost:11434", "llama3:8b");
        assert!(b.is_local());
    }

    #[test]
    fn test_parse_openai_response() {
        let json = serde_json::json!({
            "model": "gpt-4o-mini",
            "choices": [{"message": {"content": "[]"}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3}
        });
        let resp = parse_openai_response(&json, "fallback");
        assert_eq!(resp.content, "[]");
        assert_eq!(resp.model, "gpt-4o-mini");
        assert_eq!(resp.prompt_tokens, 12);
    }

    #[test]
    fn test_retryable_classification() {
        assert!(LlmError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(LlmError::ApiError { status: 529, message: "overloaded".into() }.is_retryable());
        assert!(LlmError::ApiError { status: 429, message: "slow down".into() }.is_retryable());
        assert!(!LlmError::ApiError { status: 401, message: "bad key".into() }.is_retryable());
        assert!(!LlmError::Unavailable("none".into()).is_retryable());
    }

    #[test]
    fn test_api_error_message_json_and_text() {
        assert_eq!(
            api_error_message(r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#),
            "invalid x-api-key"
        );
        assert_eq!(api_error_message(r#"{"error":"model not found"}"#), "model not found");
        assert_eq!(api_error_message("<html>Unauthorized</html>\n"), "<html>Unauthorized</html>");
        assert_eq!(api_error_message("   "), "empty error body");
        assert_eq!(api_error_message(&"x".repeat(1000)).len(), ERROR_BODY_PREVIEW_CHARS);
    }

    // ── Local HTTP stub ──────────────────────────────────────────────────────

    use crate::retry::{complete_with_retry, RetryPolicy};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    /// Drain one request (headers plus content-length body) so the reply is not reset.
    async fn read_request(socket: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = match socket.read(&mut chunk).await {
                Ok(0) | Err(_) => return,
                Ok(n) => n,
            };
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let headers = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
                let body_len = headers
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + body_len {
                    return;
                }
            }
        }
    }

    /// Serve the same canned reply to every connection; returns the base URL and a hit counter.
    async fn serve(status_line: &'static str, content_type: &'static str, body: &'static str) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                read_request(&mut socket).await;
                let reply = format!(
                    "HTTP/1.1 {status_line}\r\ncontent-type: {content_type}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(reply.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        (format!("http://{addr}"), hits)
    }

    fn local_anthropic(base_url: String) -> AnthropicBackend {
        let mut backend = AnthropicBackend::new(SecretString::from("sk-ant-test"), "claude-3-haiku-20240307")
            .with_endpoint(format!("{base_url}/v1/messages"));
        backend.client = reqwest::Client::builder().no_proxy().build().unwrap();
        backend
    }

    fn ranking_request() -> LlmRequest {
        LlmRequest {
            messages: vec![Message::system("sys"), Message::user("rank")],
            model: None,
            max_tokens: Some(64),
            temperature: None,
        }
    }

    #[tokio::test]
    async fn test_html_unauthorized_is_not_retried() {
        let (url, hits) = serve("401 Unauthorized", "text/html", "<html>Unauthorized</html>").await;
        let backend = local_anthropic(url);

        let err = complete_with_retry(&backend, ranking_request(), &RetryPolicy::default())
            .await
            .unwrap_err();

        assert!(
            matches!(err, LlmError::ApiError { status: 401, ref message } if message == "<html>Unauthorized</html>"),
            "got {err:?}"
        );
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_plain_text_bad_gateway_is_retried_once() {
        let (url, hits) = serve("502 Bad Gateway", "text/plain", "upstream connect error").await;
        let backend = local_anthropic(url);

        let err = complete_with_retry(&backend, ranking_request(), &RetryPolicy::default())
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::ApiError { status: 502, .. }), "got {err:?}");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_anthropic_success_against_local_endpoint() {
        let (url, hits) = serve(
            "200 OK",
            "application/json",
            r#"{"model":"claude-3-haiku-20240307","content":[{"type":"text","text":"[]"}],"usage":{"input_tokens":7,"output_tokens":2}}"#,
        )
        .await;
        let backend = local_anthropic(url);

        let resp = backend.complete(ranking_request()).await.unwrap();
        assert_eq!(resp.content, "[]");
        assert_eq!(resp.prompt_tokens, 7);
        assert_eq!(resp.completion_tokens, 2);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_openai_compatible_against_local_endpoint() {
        let (url, hits) = serve(
            "200 OK",
            "application/json",
            r#"{"model":"local-model","choices":[{"message":{"content":"[]"}}],"usage":{"prompt_tokens":5,"completion_tokens":1}}"#,
        )
        .await;
        let mut backend = OpenAiCompatibleBackend::new(format!("{url}/"), "local-model", Some(SecretString::from("sk-local")));
        backend.client = reqwest::Client::builder().no_proxy().build().unwrap();

        let resp = backend.complete(ranking_request()).await.unwrap();
        assert_eq!(resp.content, "[]");
        assert_eq!(resp.model, "local-model");
        assert_eq!(resp.prompt_tokens, 5);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
