//! Origin completion service clients.

pub mod openai;

pub use openai::OpenAiProvider;

use async_trait::async_trait;

use crate::error::Result;

/// Instruction sent with every completion request. Queries are single-turn:
/// no conversation history, no streaming.
pub const SYSTEM_INSTRUCTION: &str = "You are a helpful assistant.";

/// User-safe text returned instead of an answer when the origin fails.
pub const FALLBACK_MESSAGE: &str = "Unfortunately, LLM querying is not available right now due to an internal error. Please try again later.";

/// A client for the external generative completion service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OriginProvider: Send + Sync {
    /// Complete a single query. Errors here are converted to the fixed
    /// fallback by the gateway; they never reach an HTTP caller.
    async fn complete(&self, query: &str) -> Result<String>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}
