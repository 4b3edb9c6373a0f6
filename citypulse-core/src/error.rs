use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Reddit API error: {0}")]
    RedditApi(#[from] RedditApiError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("News API error: {0}")]
    News(#[from] NewsError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Error, Debug, Clone)]
pub enum RedditApiError {
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Rate limit exceeded. Retry after {retry_after} seconds")]
    RateLimitExceeded { retry_after: u64 },

    #[error("Forbidden access to resource: {resource}")]
    Forbidden { resource: String },

    #[error("Post not found: {post_id}")]
    PostNotFound { post_id: String },

    #[error("Invalid OAuth token")]
    InvalidToken,

    #[error("Request timeout")]
    RequestTimeout,

    #[error("Invalid API response: {details}")]
    InvalidResponse { details: String },

    #[error("Reddit API call failed with status code {status}: {body}")]
    UpstreamStatus { status: u16, body: String },
}

#[derive(Error, Debug, Clone)]
pub enum LlmError {
    #[error("Request timeout for {provider}")]
    RequestTimeout { provider: String },

    #[error("Error processing the response from {provider}: {details}")]
    InvalidResponseFormat { provider: String, details: String },

    #[error("{provider} API call failed with status code {status}: {body}")]
    UpstreamStatus {
        provider: String,
        status: u16,
        body: String,
    },
}

#[derive(Error, Debug, Clone)]
pub enum NewsError {
    #[error("Failed to fetch news topics: {reason}")]
    Failed { reason: String },

    #[error("News API call failed with status code {status}: {body}")]
    UpstreamStatus { status: u16, body: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}", .names.join(", "))]
    MissingCredentials { names: Vec<String> },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Configuration file {path} could not be read: {reason}")]
    FileUnreadable { path: String, reason: String },

    #[error("Configuration parsing error: {0}")]
    Parse(#[from] toml::de::Error),
}
