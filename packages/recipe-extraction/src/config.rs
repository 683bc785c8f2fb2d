//! Environment-driven configuration.
//!
//! ```text
//! OPENAI_API_KEY               key for the structured-output model
//! OPENAI_MODEL                 default gpt-4o-mini
//! OPENAI_BASE_URL              default https://api.openai.com/v1
//! INSTAGRAM_USERNAME           optional, must be paired with INSTAGRAM_PASSWORD
//! INSTAGRAM_PASSWORD
//! RECIPE_FETCH_TIMEOUT_SECS    default 10
//! INSTAGRAM_SESSION_TTL_SECS   default 1800
//! RECIPE_MAX_CONTENT_CHARS     unset = send untruncated content to the judge
//! YT_DLP_PATH                  default yt-dlp on PATH
//! ```

use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::security::{AICredentials, InstagramCredentials};
use crate::session::DEFAULT_SESSION_TTL;
use crate::types::config::{FetchConfig, PipelineConfig};

#[derive(Debug, Clone)]
pub struct RecipeConfig {
    /// Absent when `OPENAI_API_KEY` is unset; binaries that judge must require it.
    pub openai: Option<AICredentials>,
    pub instagram: Option<InstagramCredentials>,
    pub instagram_session_ttl: Duration,
    pub yt_dlp_path: String,
    pub fetch: FetchConfig,
    pub pipeline: PipelineConfig,
}

impl Default for RecipeConfig {
    fn default() -> Self {
        Self {
            openai: None,
            instagram: None,
            instagram_session_ttl: DEFAULT_SESSION_TTL,
            yt_dlp_path: "yt-dlp".to_string(),
            fetch: FetchConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl RecipeConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        config.openai = get("OPENAI_API_KEY").map(|key| {
            let mut creds = AICredentials::new(key);
            if let Some(model) = get("OPENAI_MODEL") {
                creds = creds.with_model(model);
            }
            if let Some(base_url) = get("OPENAI_BASE_URL") {
                creds = creds.with_base_url(base_url);
            }
            creds
        });

        config.instagram = match (get("INSTAGRAM_USERNAME"), get("INSTAGRAM_PASSWORD")) {
            (Some(username), Some(password)) => Some(InstagramCredentials::new(username, password)),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::IncompleteCredentials {
                    present: "INSTAGRAM_USERNAME",
                    missing: "INSTAGRAM_PASSWORD",
                })
            }
            (None, Some(_)) => {
                return Err(ConfigError::IncompleteCredentials {
                    present: "INSTAGRAM_PASSWORD",
                    missing: "INSTAGRAM_USERNAME",
                })
            }
        };

        if let Some(secs) = parse_var::<u64>(&get, "RECIPE_FETCH_TIMEOUT_SECS")? {
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    var: "RECIPE_FETCH_TIMEOUT_SECS",
                    reason: "must be greater than zero".to_string(),
                });
            }
            config.fetch.timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64>(&get, "INSTAGRAM_SESSION_TTL_SECS")? {
            config.instagram_session_ttl = Duration::from_secs(secs);
        }
        config.pipeline.max_content_chars = parse_var::<usize>(&get, "RECIPE_MAX_CONTENT_CHARS")?;
        if let Some(path) = get("YT_DLP_PATH") {
            config.yt_dlp_path = path;
        }

        Ok(config)
    }

    /// Credentials for the judge, or an error naming the missing variable.
    pub fn require_openai(&self) -> Result<&AICredentials, ConfigError> {
        self.openai.as_ref().ok_or(ConfigError::Missing("OPENAI_API_KEY"))
    }
}

fn parse_var<T>(get: &impl Fn(&str) -> Option<String>, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get(var)
        .map(|raw| {
            raw.parse::<T>().map_err(|e| ConfigError::Invalid {
                var,
                reason: format!("{:?}: {}", raw, e),
            })
        })
        .transpose()
}
