//! Configuration file support for hearth-chat
//!
//! Loads config from ~/.hearth/config.toml

use serde::Deserialize;
use std::path::PathBuf;

/// Configuration for hearth-chat
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// OpenAI API key
    pub openai_api_key: Option<String>,

    /// Base URL for the completions API (OpenAI-compatible gateways)
    pub api_base: Option<String>,

    /// Model identifier, fixed for the lifetime of the process
    pub model: Option<String>,

    /// Path to a personas.toml overlay
    pub personas: Option<String>,

    /// Directory holding persona images
    pub assets: Option<String>,
}

impl Config {
    /// Load config from ~/.hearth/config.toml
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &std::path::Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Get a value with fallback to environment variable
    pub fn get_or_env(&self, field: Option<&String>, env_var: &str) -> Option<String> {
        field.cloned().or_else(|| std::env::var(env_var).ok())
    }
}

/// Get the config file path
pub fn config_path() -> PathBuf {
    hearth_dir().join("config.toml")
}

/// Directory for config, history, and the optional personas overlay
pub fn hearth_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_default().join(".hearth")
}
