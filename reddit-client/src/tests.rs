use crate::{RedditClient, RedditConfig, RedditToken};
use citypulse_core::{ConfigError, CoreError, DiscussionSource, RedditApiError, SortStrategy};
use serde_json::json;
use std::time::{Duration, Instant};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_config() -> RedditConfig {
    RedditConfig::new(
        Some("test_client_id".to_string()),
        Some("test_client_secret".to_string()),
        Some("citypulse/1.0 by test_user".to_string()),
    )
}

async fn mock_reddit() -> (MockServer, RedditClient) {
    mock_reddit_with_timeout(Duration::from_secs(5)).await
}

async fn mock_reddit_with_timeout(request_timeout: Duration) -> (MockServer, RedditClient) {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test_access_token",
            "token_type": "bearer",
            "expires_in": 86400,
            "scope": "*"
        })))
        .mount(&server)
        .await;

    let config = create_test_config()
        .with_api_base(server.uri())
        .with_token_url(format!("{}/api/v1/access_token", server.uri()))
        .with_request_timeout(request_timeout);
    let client = RedditClient::new(config).unwrap();

    (server, client)
}

fn post_listing(posts: serde_json::Value) -> serde_json::Value {
    json!({
        "kind": "Listing",
        "data": { "after": null, "before": null, "children": posts }
    })
}

#[test]
fn test_config_creation() {
    let config = create_test_config();
    assert_eq!(config.client_id.as_deref(), Some("test_client_id"));
    assert_eq!(config.client_secret.as_deref(), Some("test_client_secret"));
    assert_eq!(config.user_agent.as_deref(), Some("citypulse/1.0 by test_user"));
    assert_eq!(config.api_base, "https://oauth.reddit.com");
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_names_every_missing_credential() {
    let config = RedditConfig::new(None, Some("secret".to_string()), None);

    match config.validate() {
        Err(CoreError::Config(ConfigError::MissingCredentials { names })) => {
            assert_eq!(names, vec!["REDDIT_CLIENT_ID", "REDDIT_USER_AGENT"]);
        }
        other => panic!("Expected MissingCredentials error, got {:?}", other),
    }
}

#[test]
fn test_client_creation_without_credentials() {
    // Construction succeeds; missing credentials surface on first use
    let client = RedditClient::new(RedditConfig::new(None, None, None));
    assert!(client.is_ok());
}

#[tokio::test]
async fn test_token_expiry() {
    let client = RedditClient::new(create_test_config()).unwrap();
    assert!(!client.is_authenticated().await);

    client
        .set_token(RedditToken {
            access_token: "valid_token".to_string(),
            expires_at: Instant::now() + Duration::from_secs(3600),
        })
        .await;
    assert!(client.is_authenticated().await);

    client
        .set_token(RedditToken {
            access_token: "nearly_expired".to_string(),
            expires_at: Instant::now() + Duration::from_secs(10),
        })
        .await;
    assert!(!client.is_authenticated().await);
}

#[test]
fn test_search_without_credentials_fails_before_network() {
    let client = RedditClient::new(RedditConfig::new(None, None, None)).unwrap();

    let result = tokio_test::block_on(client.search("all", "metro strike", SortStrategy::Hot, 5));
    match result {
        Err(CoreError::Config(ConfigError::MissingCredentials { names })) => {
            assert_eq!(names.len(), 3);
        }
        other => panic!("Expected MissingCredentials error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_search_maps_posts() {
    let (server, client) = mock_reddit().await;

    Mock::given(method("GET"))
        .and(path("/r/all/search"))
        .and(query_param("q", "water shortage Springfield"))
        .and(query_param("sort", "relevance"))
        .and(query_param("limit", "5"))
        .and(header("authorization", "Bearer test_access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(post_listing(json!([
            {"kind": "t3", "data": {
                "id": "abc123",
                "title": "Springfield taps run dry",
                "subreddit": "springfield",
                "created_utc": 1700000000.0,
                "score": 120
            }}
        ]))))
        .mount(&server)
        .await;

    let posts = client
        .search("all", "water shortage Springfield", SortStrategy::Relevance, 5)
        .await
        .unwrap();

    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, "abc123");
    assert_eq!(posts[0].subreddit, "springfield");
    assert_eq!(posts[0].score, 120);
    assert_eq!(posts[0].created_utc.timestamp(), 1700000000);
    assert!(client.is_authenticated().await);
}

#[tokio::test]
async fn test_fetch_comments_drops_load_more_stubs() {
    let (server, client) = mock_reddit().await;

    Mock::given(method("GET"))
        .and(path("/comments/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            post_listing(json!([])),
            post_listing(json!([
                {"kind": "t1", "data": {"id": "c1", "body": "Boil your water", "author": "resident", "score": 10, "created_utc": 1700000100.0}},
                {"kind": "more", "data": {"count": 40, "children": ["c5", "c6"]}},
                {"kind": "t1", "data": {"id": "c2", "body": "Council knew for weeks", "author": "[deleted]", "score": -3, "created_utc": 1700000200.0}},
                {"kind": "t1", "data": {"id": "c3", "body": "Third", "author": null, "score": 1, "created_utc": 1700000300.0}}
            ]))
        ])))
        .mount(&server)
        .await;

    let comments = client.fetch_comments("abc123", 2).await.unwrap();

    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].body, "Boil your water");
    assert_eq!(comments[0].author.as_deref(), Some("resident"));
    assert_eq!(comments[1].body, "Council knew for weeks");
    assert_eq!(comments[1].score, -3);
}

#[tokio::test]
async fn test_upstream_status_is_reported() {
    let (server, client) = mock_reddit().await;

    Mock::given(method("GET"))
        .and(path("/r/all/search"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let result = client.search("all", "query", SortStrategy::Hot, 5).await;
    match result {
        Err(CoreError::RedditApi(RedditApiError::UpstreamStatus { status, body })) => {
            assert_eq!(status, 503);
            assert_eq!(body, "Service Unavailable");
        }
        other => panic!("Expected UpstreamStatus error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rate_limited_response() {
    let (server, client) = mock_reddit().await;

    Mock::given(method("GET"))
        .and(path("/comments/abc123"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "17"))
        .mount(&server)
        .await;

    let result = client.fetch_comments("abc123", 5).await;
    assert!(matches!(
        result,
        Err(CoreError::RedditApi(RedditApiError::RateLimitExceeded { retry_after: 17 }))
    ));
}

#[tokio::test]
async fn test_slow_search_times_out() {
    let (server, client) = mock_reddit_with_timeout(Duration::from_secs(1)).await;

    Mock::given(method("GET"))
        .and(path("/r/all/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(post_listing(json!([])))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let result = client.search("all", "metro strike", SortStrategy::Relevance, 5).await;
    assert!(matches!(
        result,
        Err(CoreError::RedditApi(RedditApiError::RequestTimeout))
    ));
}

#[tokio::test]
async fn test_missing_post_maps_to_post_not_found() {
    let (server, client) = mock_reddit().await;

    Mock::given(method("GET"))
        .and(path("/comments/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = client.fetch_comments("gone", 5).await;
    assert!(matches!(
        result,
        Err(CoreError::RedditApi(RedditApiError::PostNotFound { ref post_id })) if post_id == "gone"
    ));
}

#[tokio::test]
async fn test_rejected_credentials_fail_authentication() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "invalid_client"})))
        .mount(&server)
        .await;

    let config = create_test_config()
        .with_api_base(server.uri())
        .with_token_url(format!("{}/api/v1/access_token", server.uri()));
    let client = RedditClient::new(config).unwrap();

    let result = client.ensure_authenticated().await;
    assert!(matches!(
        result,
        Err(CoreError::RedditApi(RedditApiError::AuthenticationFailed { .. }))
    ));
}
