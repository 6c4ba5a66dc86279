//! Reasoning/query-optimization step.
//!
//! Raw user questions are often poor retrieval inputs (colloquial phrasing,
//! ambiguous pronouns). Before any retrieval call, the model restates the
//! question as a retrieval-friendly query. This runs exactly once per
//! request.

use crate::core::traits::{GenerationParams, SharedLanguageModel};
use crate::core::{ReasoningStep, Result};
use crate::llm::{prompts, structured};

/// Produces the per-request [`ReasoningStep`].
pub struct QueryOptimizer {
    llm: SharedLanguageModel,
}

impl QueryOptimizer {
    /// Create an optimizer over the given model handle.
    pub fn new(llm: SharedLanguageModel) -> Self {
        Self { llm }
    }

    /// Restate the question as an optimized search query.
    pub async fn reason(&self, question: &str) -> Result<ReasoningStep> {
        let prompt = prompts::reasoning_prompt(question);
        let completion = self
            .llm
            .complete_with_params(&prompt, GenerationParams::deterministic())
            .await?;

        let step = structured::parse_reasoning(&completion)?;
        tracing::debug!("optimized search query: {}", step.search_query);
        Ok(step)
    }
}
