//! The RAG service: the public entry point composing the pipeline.
//!
//! One request flows strictly forward: question → reasoning/query
//! optimization → strategy classification → retrieval → merge → rerank →
//! synthesis. No stage calls back into an earlier one, and no stage's error
//! is caught here; a calling layer (an HTTP handler, a chat front-end)
//! translates failures into user-facing responses. A request that merely
//! finds no evidence is not a failure: it returns the fixed no-evidence
//! answer.
//!
//! The service is stateless across requests; the provider handles are
//! shared, read-mostly `Arc`s safe to reuse concurrently.

use std::sync::Arc;

use crate::config::{Config, RetrievalConfig};
use crate::core::traits::{SharedEmbedder, SharedGraphReader, SharedLanguageModel};
use crate::core::{Answer, Result};
use crate::generation::{no_evidence_answer, AnswerSynthesizer};
use crate::graph::Neo4jReader;
use crate::llm::OpenAiClient;
use crate::query::{QueryOptimizer, StrategySelector};
use crate::reranking::LlmReranker;
use crate::retrieval::RetrievalOrchestrator;

/// Top-level RAG query service.
pub struct RagService {
    optimizer: QueryOptimizer,
    selector: StrategySelector,
    retriever: RetrievalOrchestrator,
    reranker: LlmReranker,
    synthesizer: AnswerSynthesizer,
}

impl RagService {
    /// Build a service from injected provider handles.
    ///
    /// This is also the seam the tests use: any of the handles can be a
    /// deterministic fake.
    pub fn new(
        embedder: SharedEmbedder,
        graph: SharedGraphReader,
        llm: SharedLanguageModel,
        retrieval: RetrievalConfig,
    ) -> Self {
        Self {
            optimizer: QueryOptimizer::new(llm.clone()),
            selector: StrategySelector::new(llm.clone()),
            retriever: RetrievalOrchestrator::new(
                embedder,
                graph,
                llm.clone(),
                retrieval.candidate_limit,
            ),
            reranker: LlmReranker::new(llm.clone(), retrieval.top_k),
            synthesizer: AnswerSynthesizer::new(llm),
        }
    }

    /// Build a service wired to the real providers named in the config.
    pub fn from_config(config: &Config) -> Self {
        let client = Arc::new(OpenAiClient::new(config.llm.clone()));
        let graph = Arc::new(Neo4jReader::new(config.graph.clone()));
        Self::new(
            client.clone(),
            graph,
            client,
            config.retrieval.clone(),
        )
    }

    /// Answer one question.
    ///
    /// Sequence: reasoning step on the question, strategy classification on
    /// the raw question, retrieval with the optimized query, then either the
    /// no-evidence short-circuit or rerank + synthesis.
    pub async fn query(&self, question: &str) -> Result<Answer> {
        let step = self.optimizer.reason(question).await?;
        let strategy = self.selector.select(question).await?;
        tracing::info!("answering with strategy {strategy}");

        let pool = self
            .retriever
            .retrieve(strategy, &step.search_query)
            .await?;

        if pool.is_empty() {
            tracing::info!("retrieval found no evidence");
            return Ok(no_evidence_answer());
        }

        let ranked = self.reranker.rerank(&step.search_query, pool).await?;
        self.synthesizer
            .synthesize(&step.search_query, &ranked)
            .await
    }
}
