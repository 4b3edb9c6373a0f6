mod server;

use citypulse_core::{AppConfig, ErrorExt};
use discourse::{DiscoursePipeline, Retriever, RetrieverOptions};
use llm_interface::{AnalysisPipeline, OpenRouterConfig, OpenRouterProvider, QuerySynthesizer};
use news_client::{NewsApiClient, NewsConfig};
use reddit_client::{RedditClient, RedditConfig};
use server::AppState;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str =
    "citypulse=info,discourse=info,reddit_client=info,llm_interface=info,news_client=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    tracing::info!("Starting CityPulse");

    let config = AppConfig::from_env().map_err(|e| {
        e.log_error();
        anyhow::anyhow!(e.user_friendly_message())
    })?;
    let settings = &config.settings;
    let timeout = Duration::from_secs(settings.http.request_timeout_secs);

    let reddit = RedditClient::new(
        RedditConfig::from_credentials(&config.reddit).with_request_timeout(timeout),
    )?;

    let llm_config = OpenRouterConfig::new(config.openrouter_api_key.clone(), &settings.llm.model)
        .with_base_url(&settings.llm.base_url)
        .with_request_timeout(timeout);
    let query_model =
        OpenRouterProvider::new(llm_config.clone().with_model(&settings.llm.query_model))?;
    let analysis_model = OpenRouterProvider::new(llm_config)?;

    let headlines = NewsApiClient::new(
        NewsConfig::new(config.news_api_key.clone()).with_request_timeout(timeout),
    )?;

    let retriever = Retriever::new(
        Arc::new(reddit),
        QuerySynthesizer::new(Arc::new(query_model)),
        RetrieverOptions::from(&settings.retrieval),
    );
    let discourse = DiscoursePipeline::new(
        retriever,
        AnalysisPipeline::new(Arc::new(analysis_model)),
    );

    let state = AppState {
        headlines: Arc::new(headlines),
        discourse: Arc::new(discourse),
    };

    server::serve(&settings.server.bind_addr, state).await
}
