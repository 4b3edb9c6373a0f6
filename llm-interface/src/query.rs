use crate::LlmProvider;
use citypulse_core::{CoreError, LlmError, Sampling, Topic};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct QueryReply {
    query: String,
}

/// Builds the prompt asking for a bare `{"query": ...}` object for `topic`.
pub fn search_prompt(topic: &Topic) -> String {
    format!(
        "Please generate a JSON object with a single field named \"query\". The value of this \
         field should be a concise and effective search query for the topic '{}' to use on \
         Reddit. Return only the JSON object without any additional text, explanations, or \
         formatting. The output should look exactly like this: \n{{ \"query\": \"your search \
         query here\" }}",
        topic
    )
}

/// Extracts the trimmed `query` field from a completion.
///
/// An empty field is accepted; the caller still has its own search terms.
pub fn parse_query(provider: &str, completion: &str) -> Result<String, LlmError> {
    let invalid = |details: String| LlmError::InvalidResponseFormat {
        provider: provider.to_string(),
        details,
    };

    let reply: QueryReply = serde_json::from_str(completion.trim())
        .map_err(|e| invalid(format!("invalid JSON or missing 'query' field ({})", e)))?;

    Ok(reply.query.trim().to_string())
}

/// Turns a news topic into a discussion-network search query.
#[derive(Clone)]
pub struct QuerySynthesizer {
    provider: Arc<dyn LlmProvider>,
}

impl QuerySynthesizer {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    pub async fn synthesize_query(&self, topic: &Topic) -> Result<String, CoreError> {
        if topic.as_str().trim().is_empty() {
            return Err(CoreError::InvalidInput {
                message: "topic must not be empty".to_string(),
            });
        }

        let completion = self
            .provider
            .complete(&search_prompt(topic), Sampling::deterministic())
            .await?;
        debug!("Query completion for '{}': {}", topic, completion);

        let query = parse_query(self.provider.name(), &completion)?;
        info!("Synthesized search query '{}' for topic '{}'", query, topic);
        Ok(query)
    }
}
