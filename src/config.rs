use std::path::PathBuf;

use crate::errors::ConfigError;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

pub fn default_processed_path() -> PathBuf {
    std::env::temp_dir().join("processed_requests.json")
}

pub fn default_attachments_dir() -> PathBuf {
    std::env::temp_dir().join("llm_attachments")
}

/// `PROCESSED_PATH` from `lookup`, or the default when unset or blank.
pub fn processed_path_from<F>(lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    lookup("PROCESSED_PATH")
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(default_processed_path)
}

/// Request log location from the process environment, reading `.env` first.
pub fn processed_path_from_env() -> PathBuf {
    let _ = dotenvy::dotenv();
    processed_path_from(|key| std::env::var(key).ok())
}

/// Runtime configuration for pagesmith.
///
/// Loaded once at startup and handed to each component at construction.
/// Nothing reads the environment after this point.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Shared secret every webhook must echo back.
    pub user_secret: String,
    pub github_username: String,
    pub github_token: String,
    pub github_api_url: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    /// Request log location.
    pub processed_path: PathBuf,
    /// Where decoded attachments are written.
    pub attachments_dir: PathBuf,
}

impl AppConfig {
    /// Load configuration from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Used by `from_env` and by tests.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| -> Result<String, ConfigError> {
            match lookup(var) {
                Some(value) if value.trim().is_empty() => Err(ConfigError::EmptyVar { var }),
                Some(value) => Ok(value),
                None => Err(ConfigError::MissingVar(var)),
            }
        };
        let optional = |var: &str, default: &str| {
            lookup(var)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let processed_path = processed_path_from(&lookup);
        let attachments_dir = lookup("ATTACHMENTS_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_attachments_dir);

        Ok(Self {
            user_secret: required("USER_SECRET")?,
            github_username: required("GITHUB_USERNAME")?,
            github_token: required("GITHUB_TOKEN")?,
            github_api_url: optional("GITHUB_API_URL", DEFAULT_GITHUB_API_URL),
            openai_api_key: lookup("OPENAI_API_KEY").unwrap_or_default(),
            openai_base_url: optional("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
            openai_model: optional("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
            processed_path,
            attachments_dir,
        })
    }
}
