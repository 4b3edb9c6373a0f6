pub mod analysis;
pub mod openrouter;
pub mod query;

pub use analysis::{AnalysisPipeline, AnalysisStage};
pub use openrouter::{OpenRouterConfig, OpenRouterProvider};
pub use query::QuerySynthesizer;

use async_trait::async_trait;
use citypulse_core::{CoreError, Sampling};

/// A language-model backend that turns a prompt into free text.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Sends one completion request and returns the raw completion text.
    async fn complete(&self, prompt: &str, sampling: Sampling) -> Result<String, CoreError>;
}
