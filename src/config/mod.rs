//! Environment-backed configuration.

use crate::error::{ChatError, Result};

pub const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";
pub const BASE_URL_VAR: &str = "ANTHROPIC_BASE_URL";
pub const MODEL_VAR: &str = "PAPERCHAT_MODEL";
pub const SERVER_URL_VAR: &str = "PAPERCHAT_SERVER_URL";

/// Settings resolved once at startup from the process environment, with a
/// `.env` file honored when present.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub server_url: Option<String>,
}

impl ChatConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup(API_KEY_VAR)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| {
                ChatError::Configuration(format!("{API_KEY_VAR} is not set"))
            })?;

        Ok(Self {
            api_key,
            base_url: lookup(BASE_URL_VAR).filter(|value| !value.trim().is_empty()),
            model: lookup(MODEL_VAR).filter(|value| !value.trim().is_empty()),
            server_url: lookup(SERVER_URL_VAR).filter(|value| !value.trim().is_empty()),
        })
    }
}
