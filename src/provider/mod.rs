//! Completion provider seam
//!
//! The chat engine talks to this trait, not to a concrete HTTP client, so
//! tests can script replies and failures without a network.

mod openai;

pub use openai::OpenAiProvider;

use anyhow::Result;
use async_trait::async_trait;

use crate::conversation::Turn;

/// Stateless boundary to the text-generation service
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// One completion call: persona system prompt plus the full ordered
    /// conversation. Returns the generated text verbatim.
    async fn complete(&self, system_prompt: &str, turns: &[Turn]) -> Result<String>;
}
