//! Per-session state: the view router and the conversation store.
//!
//! `Session` is the explicit context object every view reads from and writes
//! to: one per terminal run, one per HTTP session. Nothing here is shared
//! across sessions.

use serde::Serialize;

use crate::conversation::ConversationStore;
use crate::error::ChatError;
use crate::personas::{Persona, PersonaRegistry};

/// Which screen is displayed. A session always starts at `Home`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "view", content = "persona_id")]
pub enum View {
    Home,
    Chat(String),
}

impl Default for View {
    fn default() -> Self {
        View::Home
    }
}

/// One user session: router state plus conversation history
#[derive(Debug, Default)]
pub struct Session {
    view: View,
    pub store: ConversationStore,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    /// Persona id of the active chat, if any
    pub fn active_persona(&self) -> Option<&str> {
        match &self.view {
            View::Home => None,
            View::Chat(id) => Some(id),
        }
    }

    /// Home -> Chat(persona). Validates the id against the registry and
    /// lazily creates the persona's conversation.
    pub fn select<'r>(
        &mut self,
        registry: &'r PersonaRegistry,
        id: &str,
    ) -> Result<&'r Persona, ChatError> {
        let persona = registry.get(id)?;
        self.store.conversation(&persona.id);
        self.view = View::Chat(persona.id.clone());
        Ok(persona)
    }

    /// Chat -> Home. Conversations are kept; only the router state changes.
    pub fn back(&mut self) {
        self.view = View::Home;
    }
}
