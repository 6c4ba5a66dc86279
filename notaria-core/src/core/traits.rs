//! Provider traits for the RAG query pipeline.
//!
//! Each external collaborator (embedding provider, graph store, language
//! model) is reached through one async capability trait. The pipeline only
//! ever holds `Arc<dyn ...>` handles, so deterministic fakes substitute in
//! tests without touching pipeline logic.
//!
//! All graph operations are reads; nothing in this pipeline mutates graph
//! data.

use async_trait::async_trait;
use std::sync::Arc;

use crate::core::{Chunk, Result};

/// Text embedding abstraction for converting a query into a vector.
#[async_trait]
pub trait AsyncEmbedder: Send + Sync {
    /// Embed a single text.
    ///
    /// `Ok(None)` means the provider produced no vector for this input. That
    /// is a defined empty outcome, not a failure: callers route it to the
    /// no-evidence path instead of erroring.
    async fn embed(&self, text: &str) -> Result<Option<Vec<f32>>>;

    /// Dimensionality of the vectors this embedder produces.
    fn dimension(&self) -> usize;
}

/// Read-only access to the document graph store.
///
/// The three operations cover the retrieval strategies: vector similarity
/// over chunk embeddings, full-text search over chunk text, and path-finding
/// between named entities.
#[async_trait]
pub trait AsyncGraphReader: Send + Sync {
    /// Vector similarity search over chunk embeddings.
    async fn search_by_vector(&self, embedding: &[f32], limit: usize) -> Result<Vec<Chunk>>;

    /// Full-text search over chunk text.
    async fn search_by_fulltext(&self, query: &str, limit: usize) -> Result<Vec<Chunk>>;

    /// Chunks reachable via paths between the given entities.
    async fn find_paths(&self, entities: &[String], limit: usize) -> Result<Vec<Chunk>>;

    /// Health check for the store connection.
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}

/// Large language model abstraction for text completion.
#[async_trait]
pub trait AsyncLanguageModel: Send + Sync {
    /// Generate a text completion.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Generate a completion with custom parameters.
    async fn complete_with_params(&self, prompt: &str, params: GenerationParams) -> Result<String>;

    /// Check if the model is available.
    async fn is_available(&self) -> bool;

    /// Get model information.
    async fn model_info(&self) -> ModelInfo;
}

/// Parameters for text generation
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct GenerationParams {
    /// Maximum number of tokens to generate
    pub max_tokens: Option<usize>,
    /// Temperature for sampling (0.0 = deterministic, 1.0 = random)
    pub temperature: Option<f32>,
    /// Top-p nucleus sampling threshold
    pub top_p: Option<f32>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: Some(1000),
            temperature: Some(0.2),
            top_p: Some(0.9),
        }
    }
}

impl GenerationParams {
    /// Low-temperature parameters for classification and extraction calls,
    /// where consistent structured output matters more than variety.
    pub fn deterministic() -> Self {
        Self {
            max_tokens: Some(500),
            temperature: Some(0.0),
            top_p: Some(1.0),
        }
    }
}

/// Information about a language model
#[derive(Debug, Clone)]
pub struct ModelInfo {
    /// Name of the model
    pub name: String,
    /// Version of the model
    pub version: Option<String>,
    /// Maximum context length in tokens
    pub max_context_length: Option<usize>,
}

/// Shared embedder handle for dynamic dispatch
pub type SharedEmbedder = Arc<dyn AsyncEmbedder>;
/// Shared graph reader handle for dynamic dispatch
pub type SharedGraphReader = Arc<dyn AsyncGraphReader>;
/// Shared language model handle for dynamic dispatch
pub type SharedLanguageModel = Arc<dyn AsyncLanguageModel>;
