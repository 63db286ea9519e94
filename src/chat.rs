//! Chat engine: the two-phase turn flow shared by the REPL and the server.
//!
//! Phase one appends the user turn so the caller can render it before any
//! network traffic. Phase two issues the completion call and appends exactly
//! one assistant turn: the reply on success, the error description on
//! failure. Failures never propagate past this module.

use crate::conversation::{ConversationStore, Role, Turn};
use crate::personas::Persona;
use crate::provider::CompletionProvider;

/// Greeting to display for a persona, shown only while its conversation is
/// empty. The greeting is never stored, so it is never sent back to the
/// gateway as context.
pub fn greeting_for<'a>(persona: &'a Persona, store: &ConversationStore) -> Option<&'a str> {
    let empty = store.peek(&persona.id).is_none_or(|c| c.is_empty());
    if empty && !persona.greeting.is_empty() {
        Some(&persona.greeting)
    } else {
        None
    }
}

/// Phase one: append the submitted text as a user turn. The caller renders
/// the echo before resolving, so the user sees their message ahead of the
/// gateway round trip.
pub fn submit_user(store: &mut ConversationStore, persona_id: &str, text: &str) -> Turn {
    let turn = Turn::user(text);
    store.append(persona_id, turn.clone());
    turn
}

/// Phase two: if the conversation's last turn is a user turn, call the
/// gateway with the persona's system prompt plus the full history and append
/// the reply. A gateway error becomes the assistant turn's content.
///
/// A no-op when the last turn is not a user turn, so re-rendering never
/// re-issues a completion call.
pub async fn resolve_pending(
    store: &mut ConversationStore,
    persona: &Persona,
    provider: &dyn CompletionProvider,
) -> Option<Turn> {
    let conversation = store.conversation(&persona.id);
    if conversation.last_role() != Some(Role::User) {
        return None;
    }

    let history = conversation.turns().to_vec();
    let content = match provider.complete(&persona.system_prompt, &history).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(persona = %persona.id, error = %e, "completion failed");
            format!("An error occurred: {e:#}")
        }
    };

    let turn = Turn::assistant(content);
    store.append(&persona.id, turn.clone());
    Some(turn)
}
