//! sitescout-llm: LLM backend abstraction layer used by the narrative ranker.

pub mod backend;
pub mod retry;
pub mod factory;
pub mod audit;

pub use backend::{LlmBackend, LlmError, LlmRequest, LlmResponse, Message};
pub use retry::{complete_with_retry, RetryPolicy};
