use serde::{Deserialize, Serialize};

use std::path::Path;

use crate::error::{ConfigurationError, GenerateError};
use crate::generate::DEFAULT_PROMPT_TEMPLATE;

/// The configuration file consulted when no explicit path is given. Its absence is not an
/// error, every setting has a default.
pub const DEFAULT_CONFIGURATION_FILE: &str = "abstractr.json";

/// The environment variable consulted when no API key is given explicitly or through the
/// configuration file.
pub const API_KEY_ENVIRONMENT_VARIABLE: &str = "OPENAI_API_KEY";

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

/// The optional configuration file: every field may be omitted and falls back to a default
/// at resolution time.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    /// The API key for the text generation service.
    pub api_key: Option<String>,
    /// The model asked of the text generation service.
    pub model: Option<String>,
    /// The chat-completions endpoint to call.
    pub endpoint: Option<String>,
    /// The prompt template, with a `{title}` placeholder for the document title.
    pub prompt_template: Option<String>,
    /// How long to wait for the service before giving up.
    pub timeout_seconds: Option<u64>,
}

impl Configuration {
    /// Loads a configuration from a JSON file.
    pub fn from_path(configuration_path: &Path) -> Result<Configuration, ConfigurationError> {
        let configuration_content = std::fs::read_to_string(configuration_path).map_err(|error| {
            ConfigurationError::Unreadable {
                path: configuration_path.to_path_buf(),
                source: error,
            }
        })?;
        let configuration: Configuration = serde_json::from_str(&configuration_content)
            .map_err(|error| ConfigurationError::Malformed {
                path: configuration_path.to_path_buf(),
                detail: error.to_string(),
            })?;

        Ok(configuration)
    }

    /// Loads the configuration to use for one invocation. An explicitly given path must be
    /// readable; the default file is consulted only when it exists, and its absence yields
    /// an empty configuration.
    pub fn load(explicit_path: Option<&Path>) -> Result<Configuration, ConfigurationError> {
        match explicit_path {
            Some(path) => Configuration::from_path(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIGURATION_FILE);
                if default_path.exists() {
                    Configuration::from_path(default_path)
                } else {
                    Ok(Configuration::default())
                }
            }
        }
    }
}

/// The fully resolved settings handed to the generator: no optional field remains.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub prompt_template: String,
    pub timeout_seconds: u64,
}

impl GenerationSettings {
    /// Resolves the settings for one generation call. The API key is searched in order of
    /// precedence: the explicitly given value, then the configuration file, then the
    /// `OPENAI_API_KEY` environment variable. Every other setting falls back to its default
    /// when the configuration file does not provide it.
    pub fn resolve(
        explicit_api_key: Option<String>,
        configuration: &Configuration,
    ) -> Result<GenerationSettings, GenerateError> {
        let api_key = explicit_api_key
            .or_else(|| configuration.api_key.clone())
            .or_else(|| {
                std::env::var(API_KEY_ENVIRONMENT_VARIABLE)
                    .ok()
                    .filter(|key| !key.is_empty())
            })
            .ok_or(GenerateError::MissingApiKey)?;

        Ok(GenerationSettings {
            api_key,
            model: configuration
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
            endpoint: configuration
                .endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_owned()),
            prompt_template: configuration
                .prompt_template
                .clone()
                .unwrap_or_else(|| DEFAULT_PROMPT_TEMPLATE.to_owned()),
            timeout_seconds: configuration
                .timeout_seconds
                .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
        })
    }
}
