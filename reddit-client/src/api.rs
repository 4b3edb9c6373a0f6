use crate::rate_limiter::{RateLimitConfig, RateLimiter};
use chrono::{DateTime, Utc};
use citypulse_core::{
    CoreError, DiscussionComment, DiscussionPost, RedditApiError, SortStrategy,
};
use reqwest::{Client, Method, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListing<T> {
    pub kind: String,
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingData<T> {
    pub children: Vec<T>,
    pub after: Option<String>,
    pub before: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingChild<T> {
    pub kind: String,
    pub data: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditPostData {
    pub id: String,
    pub title: String,
    pub subreddit: String,
    pub created_utc: f64,
    #[serde(default)]
    pub score: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditCommentData {
    pub id: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub score: i64,
    pub created_utc: f64,
}

/// Child of a comment tree listing: a concrete comment or a "load more" stub.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum CommentThing {
    #[serde(rename = "t1")]
    Comment(RedditCommentData),
    #[serde(rename = "more")]
    More(serde_json::Value),
}

pub type PostListing = RedditListing<RedditListingChild<RedditPostData>>;
pub type CommentListing = RedditListing<CommentThing>;

#[derive(Debug)]
pub struct RedditApiClient {
    http_client: Client,
    rate_limiter: Arc<RateLimiter>,
    api_base: String,
    user_agent: String,
}

impl RedditApiClient {
    pub fn new(
        api_base: String,
        user_agent: String,
        request_timeout: Duration,
    ) -> Result<Self, CoreError> {
        let rate_limiter = Arc::new(RateLimiter::new(RateLimitConfig::reddit_oauth()));

        let http_client = Client::builder().timeout(request_timeout).build()?;

        Ok(Self {
            http_client,
            rate_limiter,
            api_base: api_base.trim_end_matches('/').to_string(),
            user_agent,
        })
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub async fn make_request(
        &self,
        method: Method,
        endpoint: &str,
        access_token: &str,
        query_params: Option<&[(&str, &str)]>,
    ) -> Result<Response, CoreError> {
        let url = format!("{}{}", self.api_base, endpoint);

        let waited = self.rate_limiter.acquire_permit().await;
        debug!(
            "Acquired rate limit permit for {} {} after {:?}",
            method, endpoint, waited
        );

        let mut request_builder = self
            .http_client
            .request(method.clone(), &url)
            .bearer_auth(access_token)
            .header("User-Agent", &self.user_agent);

        if let Some(params) = query_params {
            request_builder = request_builder.query(params);
        }

        info!("Making Reddit API request: {} {}", method, endpoint);
        let response = match request_builder.send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Network error for {} {}: {}", method, endpoint, e);
                if e.is_timeout() {
                    return Err(CoreError::RedditApi(RedditApiError::RequestTimeout));
                }
                return Err(CoreError::Network(e));
            }
        };

        let status = response.status();
        if status.is_success() {
            debug!("Request successful: {} {}", status, endpoint);
            return Ok(response);
        }

        error!("Request failed with status: {} for {}", status, endpoint);
        let error = match status.as_u16() {
            429 => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.parse::<u64>().ok())
                    .unwrap_or(60);
                warn!("Rate limited, retry after {} seconds", retry_after);
                RedditApiError::RateLimitExceeded { retry_after }
            }
            401 => RedditApiError::InvalidToken,
            403 => RedditApiError::Forbidden {
                resource: endpoint.to_string(),
            },
            code => RedditApiError::UpstreamStatus {
                status: code,
                body: response.text().await.unwrap_or_default(),
            },
        };

        Err(CoreError::RedditApi(error))
    }

    pub async fn search_posts(
        &self,
        access_token: &str,
        community: &str,
        query: &str,
        sort: SortStrategy,
        limit: u32,
    ) -> Result<PostListing, CoreError> {
        let endpoint = format!("/r/{}/search", community);
        let limit_str = limit.to_string();
        let params = [
            ("q", query),
            ("sort", sort.as_str()),
            ("limit", limit_str.as_str()),
            ("restrict_sr", "true"),
            ("t", "all"),
            ("type", "link"),
            ("raw_json", "1"),
        ];

        let response = self
            .make_request(Method::GET, &endpoint, access_token, Some(&params))
            .await?;

        let listing: PostListing = response.json().await.map_err(|e| {
            error!("Failed to parse search results: {}", e);
            CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("Failed to parse search results for r/{}", community),
            })
        })?;

        info!(
            "Search '{}' ({}) returned {} posts from r/{}",
            query,
            sort,
            listing.data.children.len(),
            community
        );
        Ok(listing)
    }

    /// Fetches the top-level comment tree of a post, "load more" stubs included.
    pub async fn get_post_comments(
        &self,
        access_token: &str,
        post_id: &str,
    ) -> Result<CommentListing, CoreError> {
        let endpoint = format!("/comments/{}", post_id);
        let params = [("depth", "1"), ("sort", "confidence"), ("raw_json", "1")];

        let response = self
            .make_request(Method::GET, &endpoint, access_token, Some(&params))
            .await
            .map_err(|e| match e {
                CoreError::RedditApi(RedditApiError::UpstreamStatus { status: 404, .. }) => {
                    CoreError::RedditApi(RedditApiError::PostNotFound {
                        post_id: post_id.to_string(),
                    })
                }
                other => other,
            })?;

        // The endpoint answers with [post listing, comment listing]
        let (_post, comments): (serde_json::Value, CommentListing) =
            response.json().await.map_err(|e| {
                error!("Failed to parse comments: {}", e);
                CoreError::RedditApi(RedditApiError::InvalidResponse {
                    details: format!("Failed to parse comments for post {}", post_id),
                })
            })?;

        debug!(
            "Retrieved {} comment tree entries for post {}",
            comments.data.children.len(),
            post_id
        );
        Ok(comments)
    }

    pub async fn available_tokens(&self) -> u32 {
        self.rate_limiter.available_tokens().await
    }
}

fn timestamp(created_utc: f64) -> Result<DateTime<Utc>, CoreError> {
    DateTime::<Utc>::from_timestamp(created_utc as i64, 0).ok_or_else(|| {
        CoreError::RedditApi(RedditApiError::InvalidResponse {
            details: format!("Invalid creation timestamp: {}", created_utc),
        })
    })
}

impl TryFrom<RedditPostData> for DiscussionPost {
    type Error = CoreError;

    fn try_from(post_data: RedditPostData) -> Result<Self, Self::Error> {
        Ok(Self {
            created_utc: timestamp(post_data.created_utc)?,
            id: post_data.id,
            title: post_data.title,
            subreddit: post_data.subreddit,
            score: post_data.score,
        })
    }
}

impl TryFrom<RedditCommentData> for DiscussionComment {
    type Error = CoreError;

    fn try_from(comment_data: RedditCommentData) -> Result<Self, Self::Error> {
        Ok(Self {
            created_utc: timestamp(comment_data.created_utc)?,
            body: comment_data.body,
            author: comment_data.author,
            score: comment_data.score,
        })
    }
}
