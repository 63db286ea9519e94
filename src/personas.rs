//! Persona registry: the fixed table of advisors.
//!
//! Four advisors ship built in; an optional personas.toml overlay can replace
//! or extend them at startup. The registry is read-only after load.

use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::ChatError;

const MEDICAL_PROMPT: &str = r#"
You are "Dr. Leo", a kind and reassuring pediatrician. The person you are
talking to is a parent worried about their child's health. Answer their
concerns with medical knowledge, but never give a diagnosis. Above all, ease
the parent's anxiety: speak warmly, with patience, and close each reply with
a reassuring line. This is a consultation, not an examination — for anything
urgent, tell them to see a doctor right away.
"#;

const RECIPE_PROMPT: &str = r#"
You are "Chef Kai", a bright and enthusiastic recipe developer. The person you
are talking to is a parent wondering what to cook every day. Suggest recipes
that work with whatever is in their fridge and around their kids' likes and
dislikes, in a passionate, praise-heavy style. Use plenty of positive lines
like "Your cooking is always amazing!" and "The kids are going to love this!".
"#;

const ACADEMIC_PROMPT: &str = r#"
You are "Mr. Hart", a calm and knowledgeable tutor. The person you are talking
to is a parent worried about their child's grades, study habits, or school
path. Advise them logically but never coldly — be on their side. Remind them
of the importance of believing in their child's potential, and acknowledge the
effort the parent themselves is putting in. Keep a polite, formal register.
"#;

const LESSON_PROMPT: &str = r#"
You are "Coach Ren", an upbeat and energetic sports instructor. The person you
are talking to is a parent thinking about lessons, activities, or fitness for
their child. Be cheerful and positive, and give advice that pushes them
forward. Lean on encouraging lines like "It's fine to fail!" and "Consistency
is strength!". Keep the fresh, sporty tone throughout.
"#;

/// Presentation colors, carried through to API clients as-is
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub card: String,
    pub text: String,
    pub button: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            card: "#F3F4F6".into(),
            text: "#374151".into(),
            button: "#6B7280".into(),
        }
    }
}

/// A configured advisor identity. Immutable after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    pub id: String,
    pub name: String,
    pub role: String,
    /// Card title on the selection screen, e.g. "Medical advice"
    pub title: String,
    /// Short quote shown on the persona card
    #[serde(default)]
    pub tagline: String,
    /// One-time welcome line, shown only while the conversation is empty and
    /// never stored as a turn
    #[serde(default)]
    pub greeting: String,
    pub system_prompt: String,
    #[serde(default)]
    pub theme: Theme,
    /// Image file name under the assets directory; missing files degrade to
    /// no image
    #[serde(default)]
    pub image: Option<String>,
}

static BUILTIN: Lazy<Vec<Persona>> = Lazy::new(|| {
    vec![
        Persona {
            id: "medical".into(),
            name: "Dr. Leo".into(),
            role: "Pediatrician".into(),
            title: "Medical advice".into(),
            tagline: "\"Worried about something? Leave it to me. I'm on your side.\"".into(),
            greeting: "Hi, I'm Dr. Leo. Is something worrying you? You can tell me anything.".into(),
            system_prompt: MEDICAL_PROMPT.trim().into(),
            theme: Theme {
                card: "#EBF8FF".into(),
                text: "#2563EB".into(),
                button: "#3B82F6".into(),
            },
            image: Some("medical.png".into()),
        },
        Persona {
            id: "recipe".into(),
            name: "Chef Kai".into(),
            role: "Recipe developer".into(),
            title: "Recipe ideas".into(),
            tagline: "\"What's for dinner tonight? Let's cook something that makes you smile!\"".into(),
            greeting: "Hey, Chef Kai here! Tell me what's in your fridge and let's make something great.".into(),
            system_prompt: RECIPE_PROMPT.trim().into(),
            theme: Theme {
                card: "#FFEDD5".into(),
                text: "#EA580C".into(),
                button: "#FB923C".into(),
            },
            image: Some("recipe.png".into()),
        },
        Persona {
            id: "academic".into(),
            name: "Mr. Hart".into(),
            role: "Tutor".into(),
            title: "Study advice".into(),
            tagline: "\"School worries? Let's take our time and find an answer together.\"".into(),
            greeting: "Good to meet you, I'm Mr. Hart. What would you like to talk through today?".into(),
            system_prompt: ACADEMIC_PROMPT.trim().into(),
            theme: Theme {
                card: "#E0E7FF".into(),
                text: "#4F46E5".into(),
                button: "#6366F1".into(),
            },
            image: Some("academic.png".into()),
        },
        Persona {
            id: "lesson".into(),
            name: "Coach Ren".into(),
            role: "Sports instructor".into(),
            title: "Lessons & activities".into(),
            tagline: "\"Another great day! Let's bring out what your kid does best!\"".into(),
            greeting: "Coach Ren here! Ready when you are — what's on your mind?".into(),
            system_prompt: LESSON_PROMPT.trim().into(),
            theme: Theme {
                card: "#DCFCE7".into(),
                text: "#16A34A".into(),
                button: "#22C55E".into(),
            },
            image: Some("lesson.png".into()),
        },
    ]
});

/// Shape of a personas.toml overlay file
#[derive(Debug, Deserialize)]
struct PersonaFile {
    #[serde(default)]
    personas: Vec<Persona>,
}

/// Ordered, read-only persona table
#[derive(Debug, Clone)]
pub struct PersonaRegistry {
    personas: Vec<Persona>,
}

impl PersonaRegistry {
    /// Registry holding only the built-in advisors
    pub fn builtin() -> Self {
        Self {
            personas: BUILTIN.clone(),
        }
    }

    /// Built-ins merged with a TOML overlay: same-id entries replace, new ids
    /// append in file order.
    pub fn with_overlay(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let file: PersonaFile = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        let mut personas = BUILTIN.clone();
        for persona in file.personas {
            match personas.iter_mut().find(|p| p.id == persona.id) {
                Some(existing) => *existing = persona,
                None => personas.push(persona),
            }
        }
        Ok(Self { personas })
    }

    /// Load with warn-and-fallback semantics: a bad overlay file keeps the
    /// built-in table rather than aborting startup.
    pub fn load(overlay: Option<&Path>) -> Self {
        match overlay {
            Some(path) => match Self::with_overlay(path) {
                Ok(registry) => registry,
                Err(e) => {
                    eprintln!("Warning: {:#}; using built-in personas", e);
                    Self::builtin()
                }
            },
            None => Self::builtin(),
        }
    }

    pub fn get(&self, id: &str) -> Result<&Persona, ChatError> {
        self.personas
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| ChatError::PersonaNotFound(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Persona> {
        self.personas.iter()
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_personas() {
        let registry = PersonaRegistry::builtin();
        assert_eq!(registry.len(), 4);
        for id in ["medical", "recipe", "academic", "lesson"] {
            let persona = registry.get(id).unwrap();
            assert!(!persona.system_prompt.is_empty());
            assert!(!persona.greeting.is_empty());
        }
    }

    #[test]
    fn test_lookup_unknown_id() {
        let registry = PersonaRegistry::builtin();
        let err = registry.get("astrology").unwrap_err();
        assert!(matches!(err, ChatError::PersonaNotFound(_)));
    }

    #[test]
    fn test_overlay_replaces_and_appends() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[[personas]]
id = "medical"
name = "Dr. Mia"
role = "Pediatrician"
title = "Medical advice"
system_prompt = "You are Dr. Mia."

[[personas]]
id = "sleep"
name = "Luna"
role = "Sleep consultant"
title = "Sleep advice"
system_prompt = "You are Luna."
"#
        )
        .unwrap();

        let registry = PersonaRegistry::with_overlay(file.path()).unwrap();
        assert_eq!(registry.len(), 5);
        assert_eq!(registry.get("medical").unwrap().name, "Dr. Mia");
        assert_eq!(registry.get("sleep").unwrap().role, "Sleep consultant");
        // replaced entry keeps its position
        assert_eq!(registry.iter().next().unwrap().id, "medical");
    }

    #[test]
    fn test_load_with_bad_overlay_falls_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "this is not toml [[[").unwrap();

        let registry = PersonaRegistry::load(Some(file.path()));
        assert_eq!(registry.len(), 4);
    }
}
