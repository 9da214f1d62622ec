//! LLM provider trait.

use async_trait::async_trait;

use crate::error::LlmError;

/// A language model that turns a system instruction and a user instruction
/// into a reply.
///
/// Implementations do not retry; a failed call is reported to the caller.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Model identifier, for logging.
    fn model_name(&self) -> &str;

    /// Generate a reply. Fails on non-success responses, malformed payloads
    /// and empty replies.
    async fn generate(&self, system: &str, user: &str) -> Result<String, LlmError>;
}
