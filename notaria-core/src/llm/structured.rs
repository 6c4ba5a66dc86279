//! Parse-and-validate boundary for structured language model output.
//!
//! Model completions are untrusted text. Every pipeline call that expects a
//! JSON payload (strategy classification, entity extraction, reasoning,
//! reranking, synthesis) goes through this one module, so shape validation
//! happens in exactly one place and invalid values are rejected before they
//! can misroute the pipeline.
//!
//! Extraction ladder, in order:
//! 1. the completion is the JSON object itself
//! 2. the object is inside a fenced ``` block
//! 3. the object is embedded in surrounding prose

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::core::ReasoningStep;
use crate::query::RetrievalStrategy;

/// Errors produced while validating a structured completion.
#[derive(Debug, Error)]
pub enum StructuredParseError {
    /// The completion contained no parseable JSON object
    #[error("no JSON object found in completion (preview: {preview:?})")]
    NoJson {
        /// Truncated completion text for diagnostics
        preview: String,
    },

    /// A JSON object was found but did not match the expected shape
    #[error("invalid structured payload: {source} (preview: {preview:?})")]
    InvalidPayload {
        /// Underlying deserialization error
        source: serde_json::Error,
        /// Truncated completion text for diagnostics
        preview: String,
    },

    /// The `strategy` field held a value outside the closed enumeration
    #[error("unrecognized strategy value {value:?}")]
    UnknownStrategy {
        /// The offending value
        value: String,
    },
}

#[derive(Debug, serde::Deserialize)]
struct StrategyPayload {
    strategy: String,
}

#[derive(Debug, serde::Deserialize)]
struct EntitiesPayload {
    entities: Vec<String>,
}

#[derive(Debug, serde::Deserialize)]
struct ReasoningPayload {
    thought: String,
    search_query: String,
}

#[derive(Debug, serde::Deserialize)]
struct RerankPayload {
    chunk_ids: Vec<String>,
}

/// Validated synthesis payload: prose plus the document paths the model
/// claims to cite. The synthesizer still filters the citations against the
/// actual chunk set.
#[derive(Debug, serde::Deserialize)]
pub struct SynthesisPayload {
    /// Synthesized answer prose
    pub answer: String,
    /// Document paths the model cited
    #[serde(default)]
    pub citations: Vec<String>,
}

/// Parse a strategy classification completion into the closed enum.
pub fn parse_strategy(completion: &str) -> Result<RetrievalStrategy, StructuredParseError> {
    let payload: StrategyPayload = parse_payload(completion)?;
    let value = payload.strategy.trim();
    value
        .parse()
        .map_err(|_| StructuredParseError::UnknownStrategy {
            value: value.to_string(),
        })
}

/// Parse an entity extraction completion. An empty list is valid.
pub fn parse_entities(completion: &str) -> Result<Vec<String>, StructuredParseError> {
    let payload: EntitiesPayload = parse_payload(completion)?;
    Ok(payload.entities)
}

/// Parse a reasoning/query-optimization completion.
pub fn parse_reasoning(completion: &str) -> Result<ReasoningStep, StructuredParseError> {
    let payload: ReasoningPayload = parse_payload(completion)?;
    Ok(ReasoningStep {
        thought: payload.thought,
        search_query: payload.search_query,
    })
}

/// Parse a rerank completion into the model's preferred chunk id ordering.
pub fn parse_rerank(completion: &str) -> Result<Vec<String>, StructuredParseError> {
    let payload: RerankPayload = parse_payload(completion)?;
    Ok(payload.chunk_ids)
}

/// Parse a synthesis completion.
pub fn parse_synthesis(completion: &str) -> Result<SynthesisPayload, StructuredParseError> {
    parse_payload(completion)
}

/// Run the extraction ladder and deserialize into `T`.
fn parse_payload<T: DeserializeOwned>(completion: &str) -> Result<T, StructuredParseError> {
    let trimmed = completion.trim();

    // Strategy 1: the completion is the payload
    match serde_json::from_str::<T>(trimmed) {
        Ok(payload) => return Ok(payload),
        Err(first_err) => {
            // Strategy 2: fenced code block
            if let Some(block) = extract_fenced_block(trimmed) {
                if let Ok(payload) = serde_json::from_str::<T>(block) {
                    return Ok(payload);
                }
            }

            // Strategy 3: first balanced object embedded in prose
            if let Some(object) = find_balanced_object(trimmed) {
                return serde_json::from_str::<T>(object).map_err(|source| {
                    StructuredParseError::InvalidPayload {
                        source,
                        preview: preview(trimmed),
                    }
                });
            }

            if trimmed.starts_with('{') {
                // A lone malformed object: report the shape mismatch, not
                // "no JSON".
                return Err(StructuredParseError::InvalidPayload {
                    source: first_err,
                    preview: preview(trimmed),
                });
            }
        },
    }

    Err(StructuredParseError::NoJson {
        preview: preview(trimmed),
    })
}

/// Look for ```json ... ``` or ``` ... ``` and return the inner text.
fn extract_fenced_block(text: &str) -> Option<&str> {
    if let Some(start) = text.find("```json") {
        let body = &text[start + 7..];
        if let Some(end) = body.find("```") {
            return Some(body[..end].trim());
        }
    }
    if let Some(start) = text.find("```") {
        let body = &text[start + 3..];
        if let Some(end) = body.find("```") {
            return Some(body[..end].trim());
        }
    }
    None
}

/// Return the first brace-balanced object in the text, respecting strings.
fn find_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            },
            _ => {},
        }
    }
    None
}

fn preview(text: &str) -> String {
    const PREVIEW_LEN: usize = 120;
    if text.len() <= PREVIEW_LEN {
        text.to_string()
    } else {
        let cut = text
            .char_indices()
            .take_while(|(i, _)| *i < PREVIEW_LEN)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}...", &text[..cut])
    }
}
