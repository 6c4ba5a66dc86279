//! Deterministic mock providers for tests.
//!
//! Each external collaborator gets a fake that is scripted per test:
//! canned chunk pools for the graph reader, a fixed vector (or the defined
//! "no vector" outcome, or a failure) for the embedder, and prompt-marker
//! routing for the language model. Every fake keeps a call journal so tests
//! can assert not only on results but on which calls were, or were not,
//! made.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::core::traits::{AsyncEmbedder, AsyncGraphReader, AsyncLanguageModel, GenerationParams, ModelInfo};
use crate::core::{Chunk, RagError, Result};

/// Convenience constructor for test chunks.
pub fn test_chunk(chunk_id: &str, document_path: &str, text: &str, score: f32) -> Chunk {
    Chunk {
        text: text.to_string(),
        document_path: document_path.to_string(),
        document_id: document_path
            .trim_end_matches(".pdf")
            .replace('/', "-"),
        chunk_id: chunk_id.to_string(),
        score,
    }
}

// ---------------------------------------------------------------------------
// Embedder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum EmbedBehavior {
    Vector(Vec<f32>),
    NoVector,
    Fail(String),
}

/// Scripted embedding provider.
pub struct MockEmbedder {
    behavior: EmbedBehavior,
    journal: Mutex<Vec<String>>,
}

impl MockEmbedder {
    /// Always return the given vector.
    pub fn returning(vector: Vec<f32>) -> Self {
        Self {
            behavior: EmbedBehavior::Vector(vector),
            journal: Mutex::new(Vec::new()),
        }
    }

    /// Always return the defined "no vector" outcome.
    pub fn no_vector() -> Self {
        Self {
            behavior: EmbedBehavior::NoVector,
            journal: Mutex::new(Vec::new()),
        }
    }

    /// Always fail with an embedding provider error.
    pub fn failing(message: &str) -> Self {
        Self {
            behavior: EmbedBehavior::Fail(message.to_string()),
            journal: Mutex::new(Vec::new()),
        }
    }

    /// Number of embed calls observed.
    pub fn calls(&self) -> usize {
        self.journal.lock().len()
    }
}

#[async_trait]
impl AsyncEmbedder for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Option<Vec<f32>>> {
        self.journal.lock().push(text.to_string());
        match &self.behavior {
            EmbedBehavior::Vector(vector) => Ok(Some(vector.clone())),
            EmbedBehavior::NoVector => Ok(None),
            EmbedBehavior::Fail(message) => Err(RagError::Embedding {
                message: message.clone(),
            }),
        }
    }

    fn dimension(&self) -> usize {
        match &self.behavior {
            EmbedBehavior::Vector(vector) => vector.len(),
            _ => 3,
        }
    }
}

// ---------------------------------------------------------------------------
// Graph reader
// ---------------------------------------------------------------------------

/// One observed graph store call.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphCall {
    /// `search_by_vector`
    Vector,
    /// `search_by_fulltext` with the query text
    Fulltext(String),
    /// `find_paths` with the entity list
    Paths(Vec<String>),
}

/// Scripted graph store with canned pools and per-operation failure
/// injection.
#[derive(Default)]
pub struct MockGraphReader {
    vector_chunks: Vec<Chunk>,
    fulltext_chunks: Vec<Chunk>,
    path_chunks: Vec<Chunk>,
    fail_vector: Option<String>,
    fail_fulltext: Option<String>,
    fail_paths: Option<String>,
    journal: Mutex<Vec<GraphCall>>,
}

impl MockGraphReader {
    /// Create a reader whose every operation returns an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chunks returned by vector search.
    pub fn with_vector_chunks(mut self, chunks: Vec<Chunk>) -> Self {
        self.vector_chunks = chunks;
        self
    }

    /// Set the chunks returned by full-text search.
    pub fn with_fulltext_chunks(mut self, chunks: Vec<Chunk>) -> Self {
        self.fulltext_chunks = chunks;
        self
    }

    /// Set the chunks returned by path-finding.
    pub fn with_path_chunks(mut self, chunks: Vec<Chunk>) -> Self {
        self.path_chunks = chunks;
        self
    }

    /// Make vector search fail.
    pub fn fail_vector_with(mut self, message: &str) -> Self {
        self.fail_vector = Some(message.to_string());
        self
    }

    /// Make full-text search fail.
    pub fn fail_fulltext_with(mut self, message: &str) -> Self {
        self.fail_fulltext = Some(message.to_string());
        self
    }

    /// Make path-finding fail.
    pub fn fail_paths_with(mut self, message: &str) -> Self {
        self.fail_paths = Some(message.to_string());
        self
    }

    /// All observed calls, in order.
    pub fn calls(&self) -> Vec<GraphCall> {
        self.journal.lock().clone()
    }

    /// Number of vector search calls observed.
    pub fn vector_calls(&self) -> usize {
        self.journal
            .lock()
            .iter()
            .filter(|call| matches!(call, GraphCall::Vector))
            .count()
    }

    /// Number of full-text search calls observed.
    pub fn fulltext_calls(&self) -> usize {
        self.journal
            .lock()
            .iter()
            .filter(|call| matches!(call, GraphCall::Fulltext(_)))
            .count()
    }

    /// Number of path-finding calls observed.
    pub fn path_calls(&self) -> usize {
        self.journal
            .lock()
            .iter()
            .filter(|call| matches!(call, GraphCall::Paths(_)))
            .count()
    }
}

#[async_trait]
impl AsyncGraphReader for MockGraphReader {
    async fn search_by_vector(&self, _embedding: &[f32], _limit: usize) -> Result<Vec<Chunk>> {
        self.journal.lock().push(GraphCall::Vector);
        if let Some(message) = &self.fail_vector {
            return Err(RagError::GraphStore {
                message: message.clone(),
            });
        }
        Ok(self.vector_chunks.clone())
    }

    async fn search_by_fulltext(&self, query: &str, _limit: usize) -> Result<Vec<Chunk>> {
        self.journal.lock().push(GraphCall::Fulltext(query.to_string()));
        if let Some(message) = &self.fail_fulltext {
            return Err(RagError::GraphStore {
                message: message.clone(),
            });
        }
        Ok(self.fulltext_chunks.clone())
    }

    async fn find_paths(&self, entities: &[String], _limit: usize) -> Result<Vec<Chunk>> {
        self.journal.lock().push(GraphCall::Paths(entities.to_vec()));
        if let Some(message) = &self.fail_paths {
            return Err(RagError::GraphStore {
                message: message.clone(),
            });
        }
        Ok(self.path_chunks.clone())
    }
}

// ---------------------------------------------------------------------------
// Language model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Script {
    Reply(String),
    Fail(String),
}

/// Language model fake that routes on prompt markers.
///
/// Rules are checked in registration order against `prompt.contains(marker)`;
/// the pipeline's prompt builders open with stable headers precisely so this
/// routing stays reliable. A prompt matching no rule is an error: a test
/// that triggers an unscripted call should fail loudly.
#[derive(Default)]
pub struct ScriptedLanguageModel {
    rules: Vec<(String, Script)>,
    journal: Mutex<Vec<String>>,
}

impl ScriptedLanguageModel {
    /// Create a model with no rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `response` to prompts containing `marker`.
    pub fn on(mut self, marker: &str, response: &str) -> Self {
        self.rules
            .push((marker.to_string(), Script::Reply(response.to_string())));
        self
    }

    /// Fail with a language model error on prompts containing `marker`.
    pub fn fail_on(mut self, marker: &str, message: &str) -> Self {
        self.rules
            .push((marker.to_string(), Script::Fail(message.to_string())));
        self
    }

    /// All prompts observed, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.journal.lock().clone()
    }

    /// Number of observed prompts containing `marker`.
    pub fn calls_matching(&self, marker: &str) -> usize {
        self.journal
            .lock()
            .iter()
            .filter(|prompt| prompt.contains(marker))
            .count()
    }
}

#[async_trait]
impl AsyncLanguageModel for ScriptedLanguageModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.journal.lock().push(prompt.to_string());
        for (marker, script) in &self.rules {
            if prompt.contains(marker.as_str()) {
                return match script {
                    Script::Reply(response) => Ok(response.clone()),
                    Script::Fail(message) => Err(RagError::LanguageModel {
                        message: message.clone(),
                    }),
                };
            }
        }
        Err(RagError::LanguageModel {
            message: format!(
                "no scripted response for prompt: {}",
                prompt.chars().take(80).collect::<String>()
            ),
        })
    }

    async fn complete_with_params(&self, prompt: &str, _params: GenerationParams) -> Result<String> {
        self.complete(prompt).await
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn model_info(&self) -> ModelInfo {
        ModelInfo {
            name: "scripted".to_string(),
            version: None,
            max_context_length: None,
        }
    }
}
