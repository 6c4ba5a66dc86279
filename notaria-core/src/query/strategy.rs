//! Retrieval strategy classification.

use crate::core::traits::{GenerationParams, SharedLanguageModel};
use crate::core::Result;
use crate::llm::{prompts, structured};

/// The retrieval plan chosen once per request.
///
/// A closed enumeration: classification payloads carrying any other value
/// are rejected at the parse boundary instead of silently misrouting
/// retrieval. The wire form is the screaming-snake string
/// (`VECTOR_ONLY`, `GRAPH_FIRST`, `HYBRID`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RetrievalStrategy {
    /// Vector similarity search only
    VectorOnly,
    /// Graph path-finding between extracted entities
    GraphFirst,
    /// Concurrent vector and full-text search, merged
    Hybrid,
}

/// Classifies an incoming question into a [`RetrievalStrategy`].
///
/// The decision heuristic is encoded in the prompt, not in code; this type
/// only owns the call and the parse. A malformed or unrecognized
/// classification payload is a caller-visible failure; there is no silent
/// default strategy.
pub struct StrategySelector {
    llm: SharedLanguageModel,
}

impl StrategySelector {
    /// Create a selector over the given model handle.
    pub fn new(llm: SharedLanguageModel) -> Self {
        Self { llm }
    }

    /// Classify the raw question.
    pub async fn select(&self, question: &str) -> Result<RetrievalStrategy> {
        let prompt = prompts::strategy_prompt(question);
        let completion = self
            .llm
            .complete_with_params(&prompt, GenerationParams::deterministic())
            .await?;

        let strategy = structured::parse_strategy(&completion)?;
        tracing::debug!("classified question as {strategy}");
        Ok(strategy)
    }
}
