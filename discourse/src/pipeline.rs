use crate::retriever::Retriever;
use citypulse_core::{CommentRecord, CoreError, Topic};
use llm_interface::AnalysisPipeline;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Retrieved discourse together with its analysis, as served to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityDiscourse {
    pub comments: Vec<CommentRecord>,
    pub summary: String,
    pub sentiment: String,
    pub actionable_needs: String,
}

/// Retrieval followed by analysis.
///
/// An empty retrieval still goes through analysis; only analysis failures
/// surface to the caller.
#[derive(Clone)]
pub struct DiscoursePipeline {
    retriever: Retriever,
    analysis: AnalysisPipeline,
}

impl DiscoursePipeline {
    pub fn new(retriever: Retriever, analysis: AnalysisPipeline) -> Self {
        Self {
            retriever,
            analysis,
        }
    }

    pub async fn run(&self, topic: &Topic, city: &str) -> Result<CityDiscourse, CoreError> {
        let comments = self.retriever.retrieve(topic, city).await;
        let lines: Vec<String> = comments.iter().map(CommentRecord::discussion_line).collect();

        let report = self.analysis.analyze(topic, &lines).await?;
        info!(
            "Analyzed {} comments for topic '{}' in {}",
            comments.len(),
            topic,
            city
        );

        Ok(CityDiscourse {
            comments,
            summary: report.summary,
            sentiment: report.sentiment,
            actionable_needs: report.actionable_needs,
        })
    }
}
