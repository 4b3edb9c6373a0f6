//! Headline lookup against NewsAPI's `/everything` endpoint.

use async_trait::async_trait;
use citypulse_core::{require_credentials, CoreError, HeadlineSource, NewsError, NEWS_API_KEY};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info};

pub const NEWS_API_BASE: &str = "https://newsapi.org/v2";

/// Number of headlines returned per city.
pub const HEADLINE_COUNT: usize = 5;

#[derive(Debug, Clone)]
pub struct NewsConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub request_timeout: Duration,
}

impl NewsConfig {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            base_url: NEWS_API_BASE.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug)]
pub struct NewsApiClient {
    config: NewsConfig,
    http: Client,
}

impl NewsApiClient {
    pub fn new(config: NewsConfig) -> Result<Self, CoreError> {
        let http = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self { config, http })
    }
}

#[async_trait]
impl HeadlineSource for NewsApiClient {
    async fn top_headlines(&self, city: &str) -> Result<Vec<String>, CoreError> {
        require_credentials(&[(NEWS_API_KEY, self.config.api_key.as_deref())])?;
        let api_key = self.config.api_key.as_deref().unwrap_or_default();

        let city = city.trim();
        if city.is_empty() {
            return Err(CoreError::InvalidInput {
                message: "city must not be empty".to_string(),
            });
        }

        let url = format!("{}/everything", self.config.base_url.trim_end_matches('/'));
        debug!("Fetching headlines for '{}'", city);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("q", city),
                ("sortBy", "relevancy"),
                ("language", "en"),
                ("apiKey", api_key),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("News API error ({}): {}", status, body);
            return Err(NewsError::UpstreamStatus {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let payload: EverythingResponse = response.json().await.map_err(|e| NewsError::Failed {
            reason: format!("unreadable response body: {}", e),
        })?;

        if payload.status != "ok" {
            return Err(NewsError::Failed {
                reason: payload
                    .message
                    .unwrap_or_else(|| format!("status '{}'", payload.status)),
            }
            .into());
        }

        let headlines: Vec<String> = payload
            .articles
            .into_iter()
            .filter_map(|article| article.title)
            .filter(|title| !title.trim().is_empty())
            .take(HEADLINE_COUNT)
            .collect();

        info!("Found {} headlines for '{}'", headlines.len(), city);
        Ok(headlines)
    }
}
