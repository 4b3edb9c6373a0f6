use crate::{CoreError, DiscussionComment, DiscussionPost, SortStrategy};
use async_trait::async_trait;

/// A discussion network that can be searched for posts and their comments.
#[async_trait]
pub trait DiscussionSource: Send + Sync {
    /// Searches `community` for posts matching `query`, returning at most `limit` posts.
    async fn search(
        &self,
        community: &str,
        query: &str,
        sort: SortStrategy,
        limit: u32,
    ) -> Result<Vec<DiscussionPost>, CoreError>;

    /// Fetches up to `limit` concrete top-level comments of a post.
    async fn fetch_comments(
        &self,
        post_id: &str,
        limit: usize,
    ) -> Result<Vec<DiscussionComment>, CoreError>;
}

/// Source of the headlines currently trending for a city.
#[async_trait]
pub trait HeadlineSource: Send + Sync {
    async fn top_headlines(&self, city: &str) -> Result<Vec<String>, CoreError>;
}
