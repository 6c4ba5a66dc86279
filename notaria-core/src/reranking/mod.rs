//! Reranking of the merged candidate pool.
//!
//! Vector and full-text scores are not comparable on the same scale, and
//! graph-path chunks carry no native score at all. The reranker is the
//! single point where cross-source candidates are normalized into one
//! relevance ordering: the model judges relevance, and the raw scores only
//! break ties and fill gaps.

use std::collections::HashMap;

use indexmap::IndexSet;

use crate::core::traits::{GenerationParams, SharedLanguageModel};
use crate::core::{Chunk, Result};
use crate::llm::{prompts, structured};

/// Default cap on the ranked set.
pub const DEFAULT_TOP_K: usize = 5;

/// Model-judged reranker with a score-order fallback.
pub struct LlmReranker {
    llm: SharedLanguageModel,
    top_k: usize,
}

impl LlmReranker {
    /// Create a reranker capping output at `top_k` chunks.
    pub fn new(llm: SharedLanguageModel, top_k: usize) -> Self {
        Self { llm, top_k }
    }

    /// Reduce the merged pool to at most `top_k` chunks ordered by relevance
    /// to the query, ties broken by descending original score.
    ///
    /// A model call that *fails* propagates like any provider failure. A
    /// model reply that cannot be parsed falls back to pure score ordering:
    /// the rerank payload is judgment, not evidence, and a malformed
    /// judgment must not fail the request.
    pub async fn rerank(&self, query: &str, pool: Vec<Chunk>) -> Result<Vec<Chunk>> {
        if pool.is_empty() {
            return Ok(Vec::new());
        }

        let prompt = prompts::rerank_prompt(query, &pool, self.top_k);
        let completion = self
            .llm
            .complete_with_params(&prompt, GenerationParams::deterministic())
            .await?;

        match structured::parse_rerank(&completion) {
            Ok(preferred_ids) => Ok(self.order_by_preference(pool, preferred_ids)),
            Err(err) => {
                tracing::warn!("rerank payload unusable ({err}); falling back to score order");
                Ok(self.order_by_score(pool))
            },
        }
    }

    /// Apply the model's preferred id ordering. Ids not present in the pool
    /// are discarded; pool members the model omitted are appended in score
    /// order until the cap is reached.
    fn order_by_preference(&self, pool: Vec<Chunk>, preferred_ids: Vec<String>) -> Vec<Chunk> {
        let mut by_id: HashMap<String, Chunk> = pool
            .into_iter()
            .map(|chunk| (chunk.chunk_id.clone(), chunk))
            .collect();

        let unique_ids: IndexSet<String> = preferred_ids.into_iter().collect();
        let mut ranked: Vec<Chunk> = unique_ids
            .into_iter()
            .filter_map(|id| by_id.remove(&id))
            .collect();

        let mut remainder: Vec<Chunk> = by_id.into_values().collect();
        sort_by_score(&mut remainder);
        ranked.extend(remainder);

        ranked.truncate(self.top_k);
        ranked
    }

    fn order_by_score(&self, mut pool: Vec<Chunk>) -> Vec<Chunk> {
        sort_by_score(&mut pool);
        pool.truncate(self.top_k);
        pool
    }
}

fn sort_by_score(chunks: &mut [Chunk]) {
    chunks.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.chunk_id.cmp(&b.chunk_id))
    });
}
