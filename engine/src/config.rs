use std::fmt;

use thiserror::Error;

use crate::{EditorBox, image_model::Model};

pub const API_KEY_VAR: &str = "API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "The API_KEY environment variable is not set. Please configure it to use the Gemini API."
    )]
    MissingApiKey,
}

/// Validated startup configuration. Only exists if a credential was found.
#[derive(Clone)]
pub struct Config {
    api_key: String,
    pub model: Model,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .finish()
    }
}

impl Config {
    pub fn new(api_key: Option<String>, model: Model) -> Result<Self, ConfigError> {
        match api_key {
            Some(api_key) if !api_key.trim().is_empty() => Ok(Self {
                api_key: api_key.trim().to_string(),
                model,
            }),
            _ => Err(ConfigError::MissingApiKey),
        }
    }

    pub fn from_env(model: Model) -> Result<Self, ConfigError> {
        Self::new(std::env::var(API_KEY_VAR).ok(), model)
    }

    pub fn make_editor(&self) -> EditorBox {
        self.model.make(self.api_key.clone())
    }
}
