//! Language model integration.
//!
//! Three concerns live here: the OpenAI-compatible HTTP client, the prompt
//! builders for the pipeline's five model calls, and the structured-output
//! parse boundary that validates every JSON payload a model returns.

/// OpenAI-compatible chat and embeddings client
pub mod openai;
/// Prompt builders for the pipeline's model calls
pub mod prompts;
/// Parse-and-validate boundary for structured completions
pub mod structured;

pub use openai::{OpenAiClient, OpenAiConfig};
pub use structured::StructuredParseError;
