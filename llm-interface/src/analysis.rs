//! Three-stage analysis of gathered discussion: summary, sentiment and
//! actionable needs.
//!
//! Each stage is one completion with its own prompt and sampling. The stages
//! are independent, so they run concurrently; the first failure aborts the
//! whole analysis and no partial report is produced.

use crate::LlmProvider;
use citypulse_core::{AnalysisReport, CoreError, Sampling, Topic};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStage {
    Summary,
    Sentiment,
    ActionableNeeds,
}

impl AnalysisStage {
    pub const ALL: [AnalysisStage; 3] = [
        AnalysisStage::Summary,
        AnalysisStage::Sentiment,
        AnalysisStage::ActionableNeeds,
    ];

    pub fn sampling(&self) -> Sampling {
        match self {
            AnalysisStage::Summary => Sampling::new(0.9, 0.5),
            AnalysisStage::Sentiment => Sampling::deterministic(),
            AnalysisStage::ActionableNeeds => Sampling::new(0.9, 0.2).with_penalties(0.5, 0.5),
        }
    }

    fn instructions(&self) -> &'static str {
        match self {
            AnalysisStage::Summary => {
                "Summarize the key themes, arguments, or points from the following discussion in \
                 2-3 sentences. Focus only on relevant and on-topic information while ignoring \
                 unrelated or humorous remarks. For example, if the discussion is about a \
                 logistics challenge, prioritize comments that discuss the challenge itself, such \
                 as 'It was difficult to transport due to narrow roads.' Ignore off-topic comments \
                 like jokes ('This reminds me of a scene from a movie!') or pop culture references \
                 ('This looks like something from Fast & Furious.')."
            }
            AnalysisStage::Sentiment => {
                "Analyze the sentiment of the following discussion, classifying it as positive, \
                 neutral, or negative. Focus on comments relevant to the primary topic, and \
                 provide a brief reasoning for your classification. For example, if the \
                 discussion is generally supportive, like 'This process was well executed,' the \
                 sentiment is positive. Exclude any irrelevant jokes ('This sounds like a comedy \
                 sketch') or unrelated cultural references ('This could be in a superhero movie')."
            }
            AnalysisStage::ActionableNeeds => {
                "Review the following discussion and identify any actionable needs, concerns, or \
                 relevant suggestions. Focus on comments directly related to the topic and that \
                 point out issues or recommendations, such as 'The equipment should be tested \
                 more thoroughly next time.' Ignore irrelevant or humorous comments like jokes \
                 ('Someone should turn this into a meme!') or unrelated pop culture references \
                 ('This is straight out of a sci-fi movie.')."
            }
        }
    }

    pub fn prompt(&self, discussion: &str) -> String {
        format!(
            "{} Here's the discussion: {}",
            self.instructions(),
            discussion
        )
    }
}

#[derive(Clone)]
pub struct AnalysisPipeline {
    provider: Arc<dyn LlmProvider>,
}

impl AnalysisPipeline {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    /// Analyzes pre-formatted discussion lines; `topic` only labels the report.
    pub async fn analyze(
        &self,
        topic: &Topic,
        discussion_lines: &[String],
    ) -> Result<AnalysisReport, CoreError> {
        let discussion = discussion_lines.join(" ");
        info!(
            "Analyzing {} discussion lines for topic '{}'",
            discussion_lines.len(),
            topic
        );

        let (summary, sentiment, actionable_needs) = tokio::try_join!(
            self.run_stage(AnalysisStage::Summary, &discussion),
            self.run_stage(AnalysisStage::Sentiment, &discussion),
            self.run_stage(AnalysisStage::ActionableNeeds, &discussion),
        )?;

        Ok(AnalysisReport {
            topic: topic.clone(),
            summary,
            sentiment,
            actionable_needs,
        })
    }

    async fn run_stage(&self, stage: AnalysisStage, discussion: &str) -> Result<String, CoreError> {
        debug!("Running {:?} analysis stage", stage);
        self.provider
            .complete(&stage.prompt(discussion), stage.sampling())
            .await
    }
}
