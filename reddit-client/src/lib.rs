pub mod api;
pub mod rate_limiter;

#[cfg(test)]
mod tests;

use api::{CommentThing, RedditApiClient};
use async_trait::async_trait;
use citypulse_core::{
    require_credentials, CoreError, DiscussionComment, DiscussionPost, DiscussionSource,
    RedditApiError, RedditCredentials, SortStrategy, REDDIT_CLIENT_ID, REDDIT_CLIENT_SECRET,
    REDDIT_USER_AGENT,
};
use oauth2::basic::BasicClient;
use oauth2::http::header::USER_AGENT;
use oauth2::http::HeaderValue;
use oauth2::reqwest::async_http_client;
use oauth2::{AuthUrl, ClientId, ClientSecret, HttpRequest, TokenResponse, TokenUrl};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

pub const REDDIT_API_BASE: &str = "https://oauth.reddit.com";
pub const REDDIT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const REDDIT_AUTH_URL: &str = "https://www.reddit.com/api/v1/authorize";

/// Tokens this close to expiry are refreshed before use.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct RedditConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub user_agent: Option<String>,
    pub api_base: String,
    pub token_url: String,
    pub request_timeout: Duration,
}

impl RedditConfig {
    pub fn new(
        client_id: Option<String>,
        client_secret: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            client_id,
            client_secret,
            user_agent,
            api_base: REDDIT_API_BASE.to_string(),
            token_url: REDDIT_TOKEN_URL.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn from_credentials(credentials: &RedditCredentials) -> Self {
        Self::new(
            credentials.client_id.clone(),
            credentials.client_secret.clone(),
            credentials.user_agent.clone(),
        )
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Checks that all three credentials are present, naming every missing one.
    pub fn validate(&self) -> Result<(), CoreError> {
        require_credentials(&[
            (REDDIT_CLIENT_ID, self.client_id.as_deref()),
            (REDDIT_CLIENT_SECRET, self.client_secret.as_deref()),
            (REDDIT_USER_AGENT, self.user_agent.as_deref()),
        ])?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RedditToken {
    pub access_token: String,
    pub expires_at: Instant,
}

impl RedditToken {
    pub fn is_fresh(&self) -> bool {
        Instant::now() + TOKEN_EXPIRY_MARGIN < self.expires_at
    }
}

/// Application-only Reddit client: authenticates with the client-credentials
/// grant and exposes read-only search and comment listing.
#[derive(Debug)]
pub struct RedditClient {
    config: RedditConfig,
    api: RedditApiClient,
    token: Mutex<Option<RedditToken>>,
}

impl RedditClient {
    /// Builds the client. Credentials are only checked when Reddit is first called.
    pub fn new(config: RedditConfig) -> Result<Self, CoreError> {
        let api = RedditApiClient::new(
            config.api_base.clone(),
            config.user_agent.clone().unwrap_or_default(),
            config.request_timeout,
        )?;

        Ok(Self {
            config,
            api,
            token: Mutex::new(None),
        })
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token
            .lock()
            .await
            .as_ref()
            .map_or(false, RedditToken::is_fresh)
    }

    pub async fn set_token(&self, token: RedditToken) {
        *self.token.lock().await = Some(token);
    }

    /// Returns a usable access token, exchanging the client credentials when needed.
    pub async fn ensure_authenticated(&self) -> Result<String, CoreError> {
        self.config.validate()?;

        let mut token = self.token.lock().await;
        if let Some(current) = token.as_ref().filter(|t| t.is_fresh()) {
            return Ok(current.access_token.clone());
        }

        let fresh = self.authenticate().await?;
        let access_token = fresh.access_token.clone();
        *token = Some(fresh);
        Ok(access_token)
    }

    async fn authenticate(&self) -> Result<RedditToken, CoreError> {
        let client_id = self.config.client_id.clone().unwrap_or_default();
        let client_secret = self.config.client_secret.clone().unwrap_or_default();
        let user_agent = self.config.user_agent.as_deref().unwrap_or_default();

        let auth_failed =
            |reason: String| CoreError::RedditApi(RedditApiError::AuthenticationFailed { reason });

        let oauth_client = BasicClient::new(
            ClientId::new(client_id),
            Some(ClientSecret::new(client_secret)),
            AuthUrl::new(REDDIT_AUTH_URL.to_string()).map_err(|e| auth_failed(e.to_string()))?,
            Some(
                TokenUrl::new(self.config.token_url.clone())
                    .map_err(|e| auth_failed(e.to_string()))?,
            ),
        );

        // Reddit throttles token requests that carry no User-Agent
        let user_agent =
            HeaderValue::from_str(user_agent).map_err(|e| auth_failed(e.to_string()))?;
        let http_client = move |mut request: HttpRequest| {
            request.headers.insert(USER_AGENT, user_agent.clone());
            async_http_client(request)
        };

        info!("Requesting application-only Reddit access token");
        let response = oauth_client
            .exchange_client_credentials()
            .request_async(http_client)
            .await
            .map_err(|e| auth_failed(e.to_string()))?;

        let expires_in = response
            .expires_in()
            .unwrap_or_else(|| Duration::from_secs(3600));
        debug!("Reddit access token valid for {:?}", expires_in);

        Ok(RedditToken {
            access_token: response.access_token().secret().clone(),
            expires_at: Instant::now() + expires_in,
        })
    }
}

#[async_trait]
impl DiscussionSource for RedditClient {
    async fn search(
        &self,
        community: &str,
        query: &str,
        sort: SortStrategy,
        limit: u32,
    ) -> Result<Vec<DiscussionPost>, CoreError> {
        let access_token = self.ensure_authenticated().await?;
        let listing = self
            .api
            .search_posts(&access_token, community, query, sort, limit)
            .await?;

        listing
            .data
            .children
            .into_iter()
            .take(limit as usize)
            .map(|child| DiscussionPost::try_from(child.data))
            .collect()
    }

    async fn fetch_comments(
        &self,
        post_id: &str,
        limit: usize,
    ) -> Result<Vec<DiscussionComment>, CoreError> {
        let access_token = self.ensure_authenticated().await?;
        let listing = self.api.get_post_comments(&access_token, post_id).await?;

        listing
            .data
            .children
            .into_iter()
            .filter_map(|thing| match thing {
                CommentThing::Comment(comment) => Some(comment),
                CommentThing::More(_) => None,
            })
            .take(limit)
            .map(DiscussionComment::try_from)
            .collect()
    }
}
