//! HTTP facade over headline lookup and the discourse pipeline.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Liveness check |
//! | `GET`  | `/fetch-news/?city=` | Top headlines for a city |
//! | `POST` | `/fetch-comments/` | Comments and analysis for `{topic, city}` |
//!
//! Errors are returned as `{"error": "<message>"}`: 400 for missing
//! parameters, 500 for any failure further down.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use citypulse_core::{CoreError, ErrorExt, HeadlineSource, Topic};
use discourse::{CityDiscourse, DiscoursePipeline};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub headlines: Arc<dyn HeadlineSource>,
    pub discourse: Arc<DiscoursePipeline>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/fetch-news/", get(handle_fetch_news))
        .route("/fetch-comments/", post(handle_fetch_comments))
        .layer(cors)
        .with_state(state)
}

pub async fn serve(bind_addr: &str, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state)).await?;
    Ok(())
}

struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        err.log_error();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Treats absent and blank parameters alike.
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

async fn handle_health() -> Json<serde_json::Value> {
    Json(json!({ "status": "api working successfully" }))
}

#[derive(Debug, Deserialize)]
struct NewsParams {
    city: Option<String>,
}

#[derive(Debug, Serialize)]
struct NewsResponse {
    top_news: Vec<String>,
}

async fn handle_fetch_news(
    State(state): State<AppState>,
    Query(params): Query<NewsParams>,
) -> Result<Json<NewsResponse>, ApiError> {
    let city = present(params.city).ok_or_else(|| ApiError::bad_request("City name is required"))?;

    let top_news = state.headlines.top_headlines(&city).await?;
    Ok(Json(NewsResponse { top_news }))
}

#[derive(Debug, Deserialize)]
struct CommentsRequest {
    topic: Option<String>,
    city: Option<String>,
}

async fn handle_fetch_comments(
    State(state): State<AppState>,
    body: Result<Json<CommentsRequest>, JsonRejection>,
) -> Result<Json<CityDiscourse>, ApiError> {
    let Json(request) = body.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    let topic = present(request.topic).ok_or_else(|| ApiError::bad_request("Topic is required"))?;
    let city = present(request.city).ok_or_else(|| ApiError::bad_request("city is required"))?;

    let discourse = state.discourse.run(&Topic::new(topic), &city).await?;
    Ok(Json(discourse))
}
