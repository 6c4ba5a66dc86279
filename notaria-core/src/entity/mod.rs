//! Query-time entity extraction.
//!
//! The graph-first and hybrid paths need the named entities mentioned in the
//! optimized query before they can ask the store for paths. Extraction is a
//! structured model call; finding no entities is a valid outcome, not an
//! error, and degrades graph-first retrieval to the empty-result path.

use indexmap::IndexSet;

use crate::core::traits::{GenerationParams, SharedLanguageModel};
use crate::core::Result;
use crate::llm::{prompts, structured};

/// Extracts named entities from an optimized query string.
pub struct QueryEntityExtractor {
    llm: SharedLanguageModel,
}

impl QueryEntityExtractor {
    /// Create an extractor over the given model handle.
    pub fn new(llm: SharedLanguageModel) -> Self {
        Self { llm }
    }

    /// Return the entities named in the query, deduplicated and in order of
    /// first mention.
    pub async fn extract(&self, query: &str) -> Result<Vec<String>> {
        let prompt = prompts::entities_prompt(query);
        let completion = self
            .llm
            .complete_with_params(&prompt, GenerationParams::deterministic())
            .await?;

        let raw = structured::parse_entities(&completion)?;
        let deduplicated: IndexSet<String> = raw
            .into_iter()
            .map(|entity| entity.trim().to_string())
            .filter(|entity| !entity.is_empty())
            .collect();

        tracing::debug!("extracted {} entities from query", deduplicated.len());
        Ok(deduplicated.into_iter().collect())
    }
}
