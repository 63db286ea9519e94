//! Error taxonomy for hearth-chat
//!
//! Nothing here is allowed to propagate past the view layer: gateway and
//! credential failures are rendered as assistant-authored text, and the
//! remaining variants map to HTTP statuses in server mode.

use thiserror::Error;

/// Errors raised by the chat engine and its stores
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("unknown persona: {0}")]
    PersonaNotFound(String),

    #[error("OPENAI_API_KEY is not configured; set it via --openai-api-key, the environment, or ~/.hearth/config.toml")]
    MissingCredential,

    #[error("completion request failed: {0}")]
    Gateway(String),

    #[error("unknown session: {0}")]
    SessionNotFound(String),

    #[error("no persona selected")]
    NoActivePersona,
}
