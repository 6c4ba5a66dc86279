//! Core types for the RAG query pipeline.
//!
//! This module defines the data model shared by every pipeline stage (the
//! retrieved [`Chunk`], the transient [`ReasoningStep`], the terminal
//! [`Answer`]) together with the unified error type and the provider traits.

/// Unified error handling
pub mod error;
/// Deterministic mock providers for tests
pub mod mock_providers;
/// Provider traits (embedder, graph reader, language model)
pub mod traits;

pub use error::{ErrorContext, RagError, Result};

/// A unit of retrieved evidence.
///
/// Chunks are produced by the graph store and are read-only to the rest of
/// the pipeline. The same `chunk_id` may be returned by both vector and
/// full-text retrieval within one request; the merge step collapses such
/// duplicates, keeping the instance with the highest score.
///
/// Field names follow the store's camelCase wire form (`documentPath`,
/// `chunkId`, ...).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    /// Passage content
    pub text: String,
    /// Locator used for citations
    pub document_path: String,
    /// Identifier of the source document
    pub document_id: String,
    /// Identifier unique within the document
    pub chunk_id: String,
    /// Retrieval confidence on the producing provider's scale; higher is
    /// assumed better
    pub score: f32,
}

/// The reasoning/query-optimization record produced once per request.
///
/// `search_query` is the string actually sent to retrieval; it may differ
/// from the raw question (expanded, normalized). The `thought` is internal
/// rationale and is never shown to the end user. The step is owned by the
/// orchestrator for the duration of one request and discarded after use.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ReasoningStep {
    /// Free-text rationale, not user-visible
    pub thought: String,
    /// The retrieval-friendly restatement of the question
    pub search_query: String,
}

/// The terminal result of one request.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Answer {
    /// Synthesized prose
    pub text: String,
    /// Deduplicated `document_path` values in first-mention order; always a
    /// subset of the chunk set used for synthesis
    pub citations: Vec<String>,
}
