//! Conversation store: per-persona, append-only, process-lifetime only.
//!
//! One `Conversation` per persona, created lazily on first access and never
//! deleted. There is no persistence here; a restart starts the session
//! fresh.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Who authored a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message in a conversation. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub created_at: i64,
}

impl Turn {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Ordered turn history for one persona. Append-only.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last_role(&self) -> Option<Role> {
        self.turns.last().map(|t| t.role)
    }
}

/// Process-lifetime mapping from persona id to its conversation
#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: HashMap<String, Conversation>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Access the conversation for a persona, creating an empty one on first
    /// visit. Repeat access returns the same conversation.
    pub fn conversation(&mut self, persona_id: &str) -> &mut Conversation {
        self.conversations.entry(persona_id.to_string()).or_default()
    }

    /// Read-only view that does not lazily create
    pub fn peek(&self, persona_id: &str) -> Option<&Conversation> {
        self.conversations.get(persona_id)
    }

    pub fn append(&mut self, persona_id: &str, turn: Turn) {
        self.conversation(persona_id).push(turn);
    }

    /// Number of turns stored per persona, for status displays
    pub fn turn_counts(&self) -> HashMap<String, usize> {
        self.conversations
            .iter()
            .map(|(id, c)| (id.clone(), c.len()))
            .collect()
    }
}
