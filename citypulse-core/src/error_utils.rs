use crate::error::*;
use tracing::{error, warn};

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn log_warn(&self) -> &Self;
    fn is_retryable(&self) -> bool;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!(code = %self.error_code(), "CoreError: {}", self);
        match self {
            CoreError::RedditApi(e) => {
                error!("Reddit API error details: {:?}", e);
            }
            CoreError::Llm(e) => {
                error!("LLM error details: {:?}", e);
            }
            CoreError::News(e) => {
                error!("News API error details: {:?}", e);
            }
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            _ => {}
        }
        self
    }

    fn log_warn(&self) -> &Self {
        warn!(code = %self.error_code(), "CoreError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        match self {
            CoreError::RedditApi(e) => e.is_retryable(),
            CoreError::Llm(e) => e.is_retryable(),
            CoreError::News(e) => e.is_retryable(),
            CoreError::Config(e) => e.is_retryable(),
            CoreError::Network(_) => true,
            CoreError::InvalidInput { .. } => false,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::RedditApi(e) => e.user_friendly_message(),
            CoreError::Llm(e) => e.user_friendly_message(),
            CoreError::News(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Network(_) => {
                "Network connection error. Please check your internet connection.".to_string()
            }
            CoreError::InvalidInput { message } => {
                format!("Invalid input provided: {}", message)
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::RedditApi(e) => e.error_code(),
            CoreError::Llm(e) => e.error_code(),
            CoreError::News(e) => e.error_code(),
            CoreError::Config(e) => e.error_code(),
            CoreError::Network(_) => "NETWORK".to_string(),
            CoreError::InvalidInput { .. } => "INVALID_INPUT".to_string(),
        }
    }
}

impl ErrorExt for RedditApiError {
    fn log_error(&self) -> &Self {
        error!("RedditApiError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("RedditApiError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        match self {
            RedditApiError::RateLimitExceeded { .. } | RedditApiError::RequestTimeout => true,
            RedditApiError::UpstreamStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            RedditApiError::AuthenticationFailed { .. } => {
                "Reddit authentication failed. Please check your credentials.".to_string()
            }
            RedditApiError::RateLimitExceeded { retry_after } => format!(
                "Too many requests. Please wait {} seconds before trying again.",
                retry_after
            ),
            RedditApiError::Forbidden { resource } => format!(
                "Access denied to {}. You may not have permission to view this content.",
                resource
            ),
            RedditApiError::PostNotFound { .. } => {
                "The requested post could not be found.".to_string()
            }
            RedditApiError::InvalidToken => {
                "Reddit authentication token is invalid. Please re-authenticate.".to_string()
            }
            RedditApiError::RequestTimeout => {
                "Request to Reddit timed out. Please try again.".to_string()
            }
            _ => "Reddit API error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            RedditApiError::AuthenticationFailed { .. } => "REDDIT_AUTH_FAILED".to_string(),
            RedditApiError::RateLimitExceeded { .. } => "REDDIT_RATE_LIMIT".to_string(),
            RedditApiError::Forbidden { .. } => "REDDIT_FORBIDDEN".to_string(),
            RedditApiError::PostNotFound { .. } => "REDDIT_POST_NOT_FOUND".to_string(),
            RedditApiError::InvalidToken => "REDDIT_INVALID_TOKEN".to_string(),
            RedditApiError::RequestTimeout => "REDDIT_TIMEOUT".to_string(),
            RedditApiError::InvalidResponse { .. } => "REDDIT_INVALID_RESPONSE".to_string(),
            RedditApiError::UpstreamStatus { .. } => "REDDIT_UPSTREAM".to_string(),
        }
    }
}

impl ErrorExt for LlmError {
    fn log_error(&self) -> &Self {
        error!("LlmError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("LlmError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        match self {
            LlmError::RequestTimeout { .. } => true,
            LlmError::UpstreamStatus { status, .. } => *status == 429 || *status >= 500,
            LlmError::InvalidResponseFormat { .. } => false,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            LlmError::RequestTimeout { provider } => {
                format!("{} took too long to respond. Please try again.", provider)
            }
            LlmError::InvalidResponseFormat { provider, .. } => {
                format!("{} returned a response that could not be understood.", provider)
            }
            LlmError::UpstreamStatus {
                provider, status, ..
            } => format!("{} rejected the request with status {}.", provider, status),
        }
    }

    fn error_code(&self) -> String {
        match self {
            LlmError::RequestTimeout { .. } => "LLM_TIMEOUT".to_string(),
            LlmError::InvalidResponseFormat { .. } => "LLM_RESPONSE_FORMAT".to_string(),
            LlmError::UpstreamStatus { .. } => "LLM_UPSTREAM".to_string(),
        }
    }
}

impl ErrorExt for NewsError {
    fn log_error(&self) -> &Self {
        error!("NewsError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("NewsError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        matches!(self, NewsError::UpstreamStatus { status, .. } if *status == 429 || *status >= 500)
    }

    fn user_friendly_message(&self) -> String {
        match self {
            NewsError::Failed { .. } => "Failed to fetch news topics.".to_string(),
            NewsError::UpstreamStatus { status, .. } => {
                format!("The news service responded with status {}.", status)
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            NewsError::Failed { .. } => "NEWS_FAILED".to_string(),
            NewsError::UpstreamStatus { .. } => "NEWS_UPSTREAM".to_string(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("ConfigError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ConfigError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        false
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::MissingCredentials { names } => format!(
                "Please set the following environment variables: {}",
                names.join(", ")
            ),
            ConfigError::InvalidValue { field, value } => {
                format!("The value '{}' is not valid for {}.", value, field)
            }
            ConfigError::FileUnreadable { path, .. } => {
                format!("Could not read the configuration file at {}.", path)
            }
            ConfigError::Parse(_) => "The configuration file is not valid TOML.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::MissingCredentials { .. } => "CONFIG_MISSING_CREDENTIALS".to_string(),
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE".to_string(),
            ConfigError::FileUnreadable { .. } => "CONFIG_FILE_UNREADABLE".to_string(),
            ConfigError::Parse(_) => "CONFIG_PARSE".to_string(),
        }
    }
}
