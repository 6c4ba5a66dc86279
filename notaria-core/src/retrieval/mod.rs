//! Retrieval orchestration.
//!
//! Given the chosen strategy and the optimized query, this module executes
//! the corresponding combination of vector, full-text, and graph-path reads
//! and produces one merged, deduplicated candidate pool.
//!
//! The failure semantics follow a strict split: a provider that *raises*
//! propagates uncaught, while a provider that *finds nothing* (no embedding
//! vector, no entities, empty result lists) is a defined outcome that flows
//! to the empty pool and, downstream, the no-evidence answer.

/// Pool merging and deduplication
pub mod fusion;

use crate::core::traits::{SharedEmbedder, SharedGraphReader, SharedLanguageModel};
use crate::core::{Chunk, Result};
use crate::entity::QueryEntityExtractor;
use crate::query::RetrievalStrategy;

/// Executes the retrieval plan for one request.
pub struct RetrievalOrchestrator {
    embedder: SharedEmbedder,
    graph: SharedGraphReader,
    entity_extractor: QueryEntityExtractor,
    candidate_limit: usize,
}

impl RetrievalOrchestrator {
    /// Create an orchestrator over the given provider handles.
    ///
    /// `candidate_limit` caps each individual read; the merged pool may be
    /// smaller after deduplication.
    pub fn new(
        embedder: SharedEmbedder,
        graph: SharedGraphReader,
        llm: SharedLanguageModel,
        candidate_limit: usize,
    ) -> Self {
        Self {
            embedder,
            graph,
            entity_extractor: QueryEntityExtractor::new(llm),
            candidate_limit,
        }
    }

    /// Run the strategy's retrieval calls and return the merged pool.
    pub async fn retrieve(
        &self,
        strategy: RetrievalStrategy,
        query: &str,
    ) -> Result<Vec<Chunk>> {
        let pool = match strategy {
            RetrievalStrategy::VectorOnly => self.vector_only(query).await?,
            RetrievalStrategy::GraphFirst => self.graph_first(query).await?,
            RetrievalStrategy::Hybrid => self.hybrid(query).await?,
        };

        tracing::debug!(
            "retrieval ({strategy}) produced {} candidate chunk(s)",
            pool.len()
        );
        Ok(pool)
    }

    async fn vector_only(&self, query: &str) -> Result<Vec<Chunk>> {
        match self.embedder.embed(query).await? {
            Some(embedding) => {
                self.graph
                    .search_by_vector(&embedding, self.candidate_limit)
                    .await
            },
            None => {
                // No vector is a defined empty outcome, not a failure.
                tracing::debug!("embedding produced no vector; empty pool");
                Ok(Vec::new())
            },
        }
    }

    async fn graph_first(&self, query: &str) -> Result<Vec<Chunk>> {
        let entities = self.entity_extractor.extract(query).await?;
        if entities.is_empty() {
            tracing::debug!("no entities extracted; empty pool");
            return Ok(Vec::new());
        }
        self.graph.find_paths(&entities, self.candidate_limit).await
    }

    /// Hybrid fires the vector and full-text reads concurrently; they are
    /// independent reads against the same store. When the embedding step
    /// yields no vector, retrieval still proceeds with full-text-only
    /// results rather than aborting. That degradation is a deliberate
    /// decision, not an incidental fallback.
    async fn hybrid(&self, query: &str) -> Result<Vec<Chunk>> {
        match self.embedder.embed(query).await? {
            Some(embedding) => {
                let (vector_chunks, fulltext_chunks) = tokio::try_join!(
                    self.graph.search_by_vector(&embedding, self.candidate_limit),
                    self.graph.search_by_fulltext(query, self.candidate_limit),
                )?;
                Ok(fusion::merge_pools(vec![vector_chunks, fulltext_chunks]))
            },
            None => {
                tracing::warn!("embedding produced no vector; hybrid degrades to full-text only");
                let fulltext_chunks = self
                    .graph
                    .search_by_fulltext(query, self.candidate_limit)
                    .await?;
                Ok(fusion::merge_pools(vec![fulltext_chunks]))
            },
        }
    }
}
