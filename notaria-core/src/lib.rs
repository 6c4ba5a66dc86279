//! # Notaria Core
//!
//! RAG query core for a French notarial document corpus.
//!
//! This crate implements the query-side pipeline the chat front-end calls:
//! - Strategy selection: vector-only, graph-first, or hybrid retrieval per
//!   question
//! - Reasoning/query optimization before any retrieval call
//! - Multi-source retrieval: vector similarity, full-text, and graph paths
//!   between named entities, merged and deduplicated
//! - Reranking of the candidate pool to a small relevance-ordered set
//! - Citation-grounded answer synthesis with a fixed no-evidence fallback
//!
//! External collaborators (the embedding provider, the graph store, the
//! language model) are trait boundaries in `core::traits`, so the pipeline
//! runs identically against production services and deterministic fakes.
//!
//! ## Quick start
//!
//! ```no_run
//! use notaria_core::{Config, RagService};
//!
//! # async fn example() -> notaria_core::Result<()> {
//! let config = Config::from_file("notaria.toml")?;
//! let service = RagService::from_config(&config);
//! let answer = service.query("Qu'est-ce qu'un acte authentique ?").await?;
//! println!("{} (sources: {:?})", answer.text, answer.citations);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Configuration management and loading
pub mod config;
/// Core types, errors, provider traits, and mock providers
pub mod core;
/// Query-time entity extraction
pub mod entity;
/// Answer synthesis
pub mod generation;
/// Graph store access
pub mod graph;
/// Language model client, prompts, and structured-output parsing
pub mod llm;
/// Strategy classification and query optimization
pub mod query;
/// Reranking of merged candidate pools
pub mod reranking;
/// Retrieval orchestration and pool merging
pub mod retrieval;
/// The top-level query service
pub mod service;

/// Prelude module containing the most commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::core::{Answer, Chunk, RagError, ReasoningStep, Result};
    pub use crate::query::RetrievalStrategy;
    pub use crate::service::RagService;
}

// Re-export core types
pub use crate::config::Config;
pub use crate::core::{Answer, Chunk, ErrorContext, RagError, ReasoningStep, Result};
pub use crate::generation::NOT_AVAILABLE_ANSWER;
pub use crate::query::RetrievalStrategy;
pub use crate::service::RagService;

// Re-export provider traits for implementors
pub use crate::core::traits::{AsyncEmbedder, AsyncGraphReader, AsyncLanguageModel};
