use crate::ranker::rank;
use chrono::{DateTime, Duration, Utc};
use citypulse_core::{
    resolve_author, whole_days_between, CommentRecord, CoreError, DiscussionSource, ErrorExt,
    RetrievalSettings, SortStrategy, Topic,
};
use llm_interface::QuerySynthesizer;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct RetrieverOptions {
    /// Posts requested per search, and records kept after ranking.
    pub limit: u32,
    pub max_age_days: i64,
    pub comments_per_post: usize,
    pub community: String,
    /// Tried in order; a later strategy runs only when every earlier one found nothing.
    pub strategies: Vec<SortStrategy>,
}

impl Default for RetrieverOptions {
    fn default() -> Self {
        Self::from(&RetrievalSettings::default())
    }
}

impl From<&RetrievalSettings> for RetrieverOptions {
    fn from(settings: &RetrievalSettings) -> Self {
        Self {
            limit: settings.limit,
            max_age_days: settings.max_age_days,
            comments_per_post: settings.comments_per_post,
            community: settings.community.clone(),
            strategies: vec![SortStrategy::Relevance, SortStrategy::Hot],
        }
    }
}

/// Collects recent comments about a topic from the discussion network.
///
/// Retrieval is best effort: any failure on the way (query synthesis,
/// credentials, network) is logged and reported as an empty result.
#[derive(Clone)]
pub struct Retriever {
    source: Arc<dyn DiscussionSource>,
    synthesizer: QuerySynthesizer,
    options: RetrieverOptions,
}

impl Retriever {
    pub fn new(
        source: Arc<dyn DiscussionSource>,
        synthesizer: QuerySynthesizer,
        options: RetrieverOptions,
    ) -> Self {
        Self {
            source,
            synthesizer,
            options,
        }
    }

    pub async fn retrieve(&self, topic: &Topic, city: &str) -> Vec<CommentRecord> {
        self.retrieve_at(topic, city, Utc::now()).await
    }

    /// Like [`Retriever::retrieve`], measuring ages against `now`.
    pub async fn retrieve_at(
        &self,
        topic: &Topic,
        city: &str,
        now: DateTime<Utc>,
    ) -> Vec<CommentRecord> {
        match self.collect(topic, city, now).await {
            Ok(records) => {
                info!(
                    "Retrieved {} comments for topic '{}' in {}",
                    records.len(),
                    topic,
                    city
                );
                records
            }
            Err(e) => {
                e.log_warn();
                warn!(
                    retryable = e.is_retryable(),
                    "Discussion retrieval for topic '{}' failed, continuing without discourse",
                    topic
                );
                Vec::new()
            }
        }
    }

    async fn collect(
        &self,
        topic: &Topic,
        city: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<CommentRecord>, CoreError> {
        let query = self.synthesizer.synthesize_query(topic).await?;
        let query = format!("{} {}", query, city.trim());

        let mut records = Vec::new();
        for &strategy in &self.options.strategies {
            records = self.collect_tier(topic, &query, strategy, now).await?;
            if !records.is_empty() {
                break;
            }
            debug!("No comments found with {} sort", strategy);
        }

        Ok(rank(records, self.options.limit as usize))
    }

    async fn collect_tier(
        &self,
        topic: &Topic,
        query: &str,
        strategy: SortStrategy,
        now: DateTime<Utc>,
    ) -> Result<Vec<CommentRecord>, CoreError> {
        let posts = self
            .source
            .search(&self.options.community, query, strategy, self.options.limit)
            .await?;
        debug!(
            "{} sort search for '{}' returned {} posts",
            strategy,
            query,
            posts.len()
        );

        let max_age = Duration::days(self.options.max_age_days);
        let mut records = Vec::new();

        for post in posts {
            if now - post.created_utc > max_age {
                debug!("Skipping post {} older than {} days", post.id, self.options.max_age_days);
                continue;
            }

            let post_age_days = whole_days_between(post.created_utc, now);
            let comments = self
                .source
                .fetch_comments(&post.id, self.options.comments_per_post)
                .await?;

            records.extend(
                comments
                    .into_iter()
                    .take(self.options.comments_per_post)
                    .map(|comment| CommentRecord {
                        topic: topic.clone(),
                        community: format!("r/{}", post.subreddit),
                        post_title: post.title.clone(),
                        comment_body: comment.body,
                        author: resolve_author(comment.author.as_deref()),
                        score: comment.score,
                        post_age_days,
                        comment_age_days: whole_days_between(comment.created_utc, now),
                    }),
            );
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use citypulse_core::{ConfigError, DiscussionComment, DiscussionPost, LlmError, Sampling};
    use llm_interface::LlmProvider;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    struct QueryProvider {
        reply: Result<String, LlmError>,
        calls: Mutex<usize>,
    }

    impl QueryProvider {
        fn replying(query: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(format!(r#"{{"query": "{}"}}"#, query)),
                calls: Mutex::new(0),
            })
        }
    }

    #[async_trait]
    impl LlmProvider for QueryProvider {
        fn name(&self) -> &str {
            "query"
        }

        async fn complete(&self, _prompt: &str, _sampling: Sampling) -> Result<String, CoreError> {
            *self.calls.lock().unwrap() += 1;
            self.reply.clone().map_err(CoreError::Llm)
        }
    }

    #[derive(Default)]
    struct FakeSource {
        posts: HashMap<SortStrategy, Vec<DiscussionPost>>,
        comments: HashMap<String, Vec<DiscussionComment>>,
        failure: Option<fn() -> CoreError>,
        searches: Mutex<Vec<(String, String, SortStrategy, u32)>>,
        fetched: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl DiscussionSource for FakeSource {
        async fn search(
            &self,
            community: &str,
            query: &str,
            sort: SortStrategy,
            limit: u32,
        ) -> Result<Vec<DiscussionPost>, CoreError> {
            self.searches.lock().unwrap().push((
                community.to_string(),
                query.to_string(),
                sort,
                limit,
            ));
            if let Some(failure) = self.failure {
                return Err(failure());
            }
            Ok(self.posts.get(&sort).cloned().unwrap_or_default())
        }

        async fn fetch_comments(
            &self,
            post_id: &str,
            limit: usize,
        ) -> Result<Vec<DiscussionComment>, CoreError> {
            self.fetched.lock().unwrap().push(post_id.to_string());
            let comments = self.comments.get(post_id).cloned().unwrap_or_default();
            Ok(comments.into_iter().take(limit).collect())
        }
    }

    fn post(id: &str, days_old: i64) -> DiscussionPost {
        DiscussionPost {
            id: id.to_string(),
            title: format!("Post {}", id),
            subreddit: "springfield".to_string(),
            score: 100,
            created_utc: now() - Duration::days(days_old),
        }
    }

    fn comment(body: &str, author: Option<&str>, score: i64, hours_old: i64) -> DiscussionComment {
        DiscussionComment {
            body: body.to_string(),
            author: author.map(str::to_string),
            score,
            created_utc: now() - Duration::hours(hours_old),
        }
    }

    fn retriever(source: Arc<FakeSource>, provider: Arc<QueryProvider>) -> Retriever {
        Retriever::new(
            source,
            QuerySynthesizer::new(provider),
            RetrieverOptions::default(),
        )
    }

    #[tokio::test]
    async fn test_falls_back_to_hot_and_caps_records() {
        let mut source = FakeSource::default();
        source.posts.insert(SortStrategy::Hot, vec![post("p1", 3)]);
        source.comments.insert(
            "p1".to_string(),
            vec![
                comment("one", Some("a"), 4, 30),
                comment("two", Some("b"), 40, 50),
                comment("three", Some("c"), -2, 10),
                comment("four", Some("d"), 15, 5),
                comment("five", Some("e"), 15, 1),
                comment("six", Some("f"), 99, 2),
            ],
        );
        let source = Arc::new(source);
        let provider = QueryProvider::replying("water shortage");

        let records = retriever(source.clone(), provider.clone())
            .retrieve_at(&Topic::new("water shortage"), "Springfield", now())
            .await;

        assert_eq!(records.len(), 5);
        assert!(records.iter().all(|r| r.community == "r/springfield"));
        assert!(records.windows(2).all(|w| w[0].score >= w[1].score));
        let bodies: Vec<_> = records.iter().map(|r| r.comment_body.as_str()).collect();
        assert_eq!(bodies, vec!["two", "four", "five", "one", "three"]);
        assert_eq!(records[0].post_age_days, 3);
        assert_eq!(records[0].comment_age_days, 2);

        let searches = source.searches.lock().unwrap();
        assert_eq!(searches.len(), 2);
        assert_eq!(searches[0].2, SortStrategy::Relevance);
        assert_eq!(searches[1].2, SortStrategy::Hot);
        assert!(searches
            .iter()
            .all(|(community, query, _, limit)| community == "all"
                && query == "water shortage Springfield"
                && *limit == 5));
        assert_eq!(*provider.calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_stale_posts_are_skipped_before_fetching_comments() {
        let mut source = FakeSource::default();
        source
            .posts
            .insert(SortStrategy::Relevance, vec![post("old", 46), post("fresh", 45)]);
        source
            .comments
            .insert("old".to_string(), vec![comment("ancient", Some("a"), 50, 1)]);
        source
            .comments
            .insert("fresh".to_string(), vec![comment("recent", Some("b"), 1, 1)]);
        let source = Arc::new(source);

        let records = retriever(source.clone(), QueryProvider::replying("q"))
            .retrieve_at(&Topic::new("metro strike"), "Lagos", now())
            .await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].comment_body, "recent");
        assert_eq!(records[0].post_age_days, 45);
        assert_eq!(*source.fetched.lock().unwrap(), vec!["fresh".to_string()]);
    }

    #[tokio::test]
    async fn test_hot_tier_not_tried_when_relevance_finds_comments() {
        let mut source = FakeSource::default();
        source.posts.insert(SortStrategy::Relevance, vec![post("p1", 1)]);
        source.posts.insert(SortStrategy::Hot, vec![post("p2", 1)]);
        source
            .comments
            .insert("p1".to_string(), vec![comment("hello", None, 2, 1)]);
        let source = Arc::new(source);

        let records = retriever(source.clone(), QueryProvider::replying("q"))
            .retrieve_at(&Topic::new("metro strike"), "Lagos", now())
            .await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].author, "Unknown");
        assert_eq!(source.searches.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_posts_without_comments_trigger_fallback() {
        let mut source = FakeSource::default();
        source.posts.insert(SortStrategy::Relevance, vec![post("quiet", 1)]);
        let source = Arc::new(source);

        let records = retriever(source.clone(), QueryProvider::replying("q"))
            .retrieve_at(&Topic::new("metro strike"), "Lagos", now())
            .await;

        assert!(records.is_empty());
        assert_eq!(source.searches.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_query_still_searches_by_city() {
        let mut source = FakeSource::default();
        source.posts.insert(SortStrategy::Relevance, vec![post("p1", 1)]);
        source
            .comments
            .insert("p1".to_string(), vec![comment("hello", Some("a"), 2, 1)]);
        let source = Arc::new(source);

        let records = retriever(source.clone(), QueryProvider::replying(""))
            .retrieve_at(&Topic::new("metro strike"), "Lagos", now())
            .await;

        assert_eq!(records.len(), 1);
        let searches = source.searches.lock().unwrap();
        assert_eq!(searches[0].1, " Lagos");
    }

    #[tokio::test]
    async fn test_missing_credentials_degrade_to_empty() {
        let source = Arc::new(FakeSource {
            failure: Some(|| {
                CoreError::Config(ConfigError::MissingCredentials {
                    names: vec!["REDDIT_CLIENT_ID".to_string()],
                })
            }),
            ..FakeSource::default()
        });

        let records = retriever(source, QueryProvider::replying("q"))
            .retrieve_at(&Topic::new("metro strike"), "Lagos", now())
            .await;

        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_query_failure_degrades_to_empty() {
        let source = Arc::new(FakeSource::default());
        let provider = Arc::new(QueryProvider {
            reply: Err(LlmError::InvalidResponseFormat {
                provider: "query".to_string(),
                details: "garbage".to_string(),
            }),
            calls: Mutex::new(0),
        });

        let records = retriever(source.clone(), provider)
            .retrieve_at(&Topic::new("metro strike"), "Lagos", now())
            .await;

        assert!(records.is_empty());
        assert!(source.searches.lock().unwrap().is_empty());
    }

    #[test]
    fn test_options_follow_settings() {
        let settings = RetrievalSettings {
            limit: 8,
            max_age_days: 10,
            comments_per_post: 3,
            community: "nyc".to_string(),
        };
        let options = RetrieverOptions::from(&settings);

        assert_eq!(options.limit, 8);
        assert_eq!(options.max_age_days, 10);
        assert_eq!(options.comments_per_post, 3);
        assert_eq!(options.community, "nyc");
        assert_eq!(
            options.strategies,
            vec![SortStrategy::Relevance, SortStrategy::Hot]
        );
    }
}
