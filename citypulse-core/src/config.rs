use crate::ConfigError;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

pub const REDDIT_CLIENT_ID: &str = "REDDIT_CLIENT_ID";
pub const REDDIT_CLIENT_SECRET: &str = "REDDIT_CLIENT_SECRET";
pub const REDDIT_USER_AGENT: &str = "REDDIT_USER_AGENT";
pub const OPENROUTER_API_KEY: &str = "OPENROUTER_API_KEY";
pub const NEWS_API_KEY: &str = "NEWS_API_KEY";
pub const CONFIG_PATH_VAR: &str = "CITYPULSE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "citypulse.toml";

/// Fails with every missing credential named at once, in the order given.
pub fn require_credentials(credentials: &[(&str, Option<&str>)]) -> Result<(), ConfigError> {
    let names: Vec<String> = credentials
        .iter()
        .filter(|(_, value)| value.map_or(true, |v| v.trim().is_empty()))
        .map(|(name, _)| name.to_string())
        .collect();

    if names.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::MissingCredentials { names })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub retrieval: RetrievalSettings,
    pub llm: LlmSettings,
    pub http: HttpSettings,
    pub server: ServerSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub limit: u32,
    pub max_age_days: i64,
    pub comments_per_post: usize,
    pub community: String,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            limit: 5,
            max_age_days: 45,
            comments_per_post: 5,
            community: "all".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub base_url: String,
    /// Model used for the three analysis completions.
    pub model: String,
    /// Model used to turn a topic into a search query.
    pub query_model: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "microsoft/phi-3-mini-128k-instruct:free".to_string(),
            query_model: "openai/gpt-4o-mini-2024-07-18".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub request_timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind_addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
        }
    }
}

impl Settings {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(contents)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads settings from `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::FileUnreadable {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        info!("Loading settings from {}", path.display());
        Self::from_toml_str(&contents)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.retrieval.limit == 0 {
            return Err(invalid("retrieval.limit", self.retrieval.limit));
        }
        if self.retrieval.max_age_days < 0 {
            return Err(invalid("retrieval.max_age_days", self.retrieval.max_age_days));
        }
        if self.retrieval.community.trim().is_empty() {
            return Err(invalid("retrieval.community", "\"\""));
        }
        if self.http.request_timeout_secs == 0 {
            return Err(invalid(
                "http.request_timeout_secs",
                self.http.request_timeout_secs,
            ));
        }
        Ok(())
    }
}

fn invalid(field: &str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct RedditCredentials {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub user_agent: Option<String>,
}

/// Process configuration: secrets from the environment, tunables from TOML.
///
/// Absent secrets stay `None` here; each collaborator reports them as
/// [`ConfigError::MissingCredentials`] when it is first used.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub reddit: RedditCredentials,
    pub openrouter_api_key: Option<String>,
    pub news_api_key: Option<String>,
    pub settings: Settings,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        let settings = Settings::load(Path::new(&path))?;

        let config = Self::from_lookup(|name| std::env::var(name).ok(), settings);
        config.log_keys();
        Ok(config)
    }

    pub fn from_lookup<F>(lookup: F, settings: Settings) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Self {
            reddit: RedditCredentials {
                client_id: value(REDDIT_CLIENT_ID),
                client_secret: value(REDDIT_CLIENT_SECRET),
                user_agent: value(REDDIT_USER_AGENT),
            },
            openrouter_api_key: value(OPENROUTER_API_KEY),
            news_api_key: value(NEWS_API_KEY),
            settings,
        }
    }

    fn log_keys(&self) {
        let present = |value: &Option<String>| if value.is_some() { "set" } else { "missing" };

        info!(
            reddit_client_id = present(&self.reddit.client_id),
            reddit_client_secret = present(&self.reddit.client_secret),
            reddit_user_agent = present(&self.reddit.user_agent),
            openrouter_api_key = present(&self.openrouter_api_key),
            news_api_key = present(&self.news_api_key),
            "Loaded credentials"
        );
    }
}
