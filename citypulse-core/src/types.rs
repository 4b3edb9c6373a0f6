use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Author name recorded when a comment's account was deleted or removed.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// A news headline the discourse is gathered for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topic(String);

impl Topic {
    pub fn new(topic: impl Into<String>) -> Self {
        Self(topic.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ranking mode requested from the discussion network's search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortStrategy {
    Relevance,
    Hot,
}

impl SortStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortStrategy::Relevance => "relevance",
            SortStrategy::Hot => "hot",
        }
    }
}

impl fmt::Display for SortStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct DiscussionPost {
    pub id: String,
    pub title: String,
    pub subreddit: String,
    pub score: i64,
    pub created_utc: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct DiscussionComment {
    pub body: String,
    pub author: Option<String>,
    pub score: i64,
    pub created_utc: DateTime<Utc>,
}

/// One retrieved comment, flattened with the post it belongs to.
///
/// Field names on the wire match what the web frontend consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    #[serde(rename = "newsTopic")]
    pub topic: Topic,
    #[serde(rename = "Subreddit")]
    pub community: String,
    #[serde(rename = "PostTitle")]
    pub post_title: String,
    #[serde(rename = "CommentBody")]
    pub comment_body: String,
    #[serde(rename = "Author")]
    pub author: String,
    #[serde(rename = "Score")]
    pub score: i64,
    #[serde(rename = "PostAge")]
    pub post_age_days: i64,
    #[serde(rename = "CommentAge")]
    pub comment_age_days: i64,
}

impl CommentRecord {
    /// Renders the record as a single line of discussion for the analysis prompts.
    pub fn discussion_line(&self) -> String {
        format!(
            "Main News Topic: {} | Reddit-Post on this news: {} | Comment on this post by people: {}",
            self.topic, self.post_title, self.comment_body
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub topic: Topic,
    pub summary: String,
    pub sentiment: String,
    pub actionable_needs: String,
}

/// Sampling parameters sent with a completion request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sampling {
    pub top_p: f32,
    pub temperature: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
}

impl Sampling {
    pub const fn deterministic() -> Self {
        Self {
            top_p: 1.0,
            temperature: 0.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        }
    }

    pub const fn new(top_p: f32, temperature: f32) -> Self {
        Self {
            top_p,
            temperature,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        }
    }

    pub const fn with_penalties(self, frequency_penalty: f32, presence_penalty: f32) -> Self {
        Self {
            frequency_penalty,
            presence_penalty,
            ..self
        }
    }
}

impl Default for Sampling {
    fn default() -> Self {
        Self::deterministic()
    }
}

/// Whole days elapsed between `earlier` and `now`, rounded toward negative infinity.
pub fn whole_days_between(earlier: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - earlier).num_seconds().div_euclid(86_400)
}

/// Resolves a comment author, mapping deleted or missing accounts to [`UNKNOWN_AUTHOR`].
pub fn resolve_author(author: Option<&str>) -> String {
    match author.map(str::trim) {
        Some(name) if !name.is_empty() && name != "[deleted]" && name != "[removed]" => {
            name.to_string()
        }
        _ => UNKNOWN_AUTHOR.to_string(),
    }
}
