//! Configuration for the RAG query core.
//!
//! A single typed [`Config`] covers the provider endpoints and the retrieval
//! tuning knobs. Defaults are usable against local services; TOML files
//! override them.

use std::fs;
use std::path::Path;

use crate::core::{ErrorContext, RagError, Result};
use crate::graph::Neo4jConfig;
use crate::llm::OpenAiConfig;
use crate::reranking::DEFAULT_TOP_K;

/// Top-level configuration
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    /// Language model and embedding provider
    pub llm: OpenAiConfig,
    /// Graph store connection
    pub graph: Neo4jConfig,
    /// Retrieval tuning
    pub retrieval: RetrievalConfig,
}

/// Retrieval tuning knobs
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Maximum candidates requested from each individual read
    pub candidate_limit: usize,
    /// Cap on the reranked set handed to synthesis
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            candidate_limit: 20,
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)
            .map_err(RagError::from)
            .with_context(&format!("loading {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values that would only fail later, at
    /// request time.
    pub fn validate(&self) -> Result<()> {
        if self.llm.api_base.is_empty() {
            return Err(RagError::Validation {
                message: "llm.api_base must not be empty".to_string(),
            });
        }
        if self.llm.chat_model.is_empty() {
            return Err(RagError::Validation {
                message: "llm.chat_model must not be empty".to_string(),
            });
        }
        if self.llm.embedding_model.is_empty() {
            return Err(RagError::Validation {
                message: "llm.embedding_model must not be empty".to_string(),
            });
        }
        if self.graph.uri.is_empty() {
            return Err(RagError::Validation {
                message: "graph.uri must not be empty".to_string(),
            });
        }
        if self.retrieval.candidate_limit == 0 {
            return Err(RagError::Validation {
                message: "retrieval.candidate_limit must be at least 1".to_string(),
            });
        }
        if self.retrieval.top_k == 0 {
            return Err(RagError::Validation {
                message: "retrieval.top_k must be at least 1".to_string(),
            });
        }
        if self.retrieval.top_k > self.retrieval.candidate_limit {
            return Err(RagError::Validation {
                message: format!(
                    "retrieval.top_k ({}) exceeds retrieval.candidate_limit ({})",
                    self.retrieval.top_k, self.retrieval.candidate_limit
                ),
            });
        }
        Ok(())
    }
}
