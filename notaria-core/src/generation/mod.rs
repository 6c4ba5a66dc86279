//! Citation-grounded answer synthesis.
//!
//! The terminal stage of the pipeline has exactly two outcomes: the fixed
//! no-evidence answer when the ranked set is empty (without spending a model
//! call), or a synthesis call grounded in the ranked chunks. Citations are
//! always derived from the chunk set passed in, never taken from the model
//! on trust, so a fabricated citation cannot escape this module.

use std::collections::HashSet;

use indexmap::IndexSet;

use crate::core::traits::SharedLanguageModel;
use crate::core::{Answer, Chunk, Result};
use crate::llm::{prompts, structured};

/// Fixed text of the no-evidence answer.
pub const NOT_AVAILABLE_ANSWER: &str =
    "The information is not available in the provided documents.";

/// The canonical answer for a request that found no evidence.
pub fn no_evidence_answer() -> Answer {
    Answer {
        text: NOT_AVAILABLE_ANSWER.to_string(),
        citations: Vec::new(),
    }
}

/// Produces the final [`Answer`] from the ranked chunk set.
pub struct AnswerSynthesizer {
    llm: SharedLanguageModel,
}

impl AnswerSynthesizer {
    /// Create a synthesizer over the given model handle.
    pub fn new(llm: SharedLanguageModel) -> Self {
        Self { llm }
    }

    /// Synthesize an answer grounded in `chunks`.
    ///
    /// An empty ranked set short-circuits to the no-evidence answer with no
    /// model call. Otherwise the model is asked for prose plus the document
    /// paths it cited; the returned citations are filtered against the input
    /// chunk set and deduplicated in first-mention order.
    pub async fn synthesize(&self, query: &str, chunks: &[Chunk]) -> Result<Answer> {
        if chunks.is_empty() {
            tracing::debug!("no evidence; returning the fixed no-evidence answer");
            return Ok(no_evidence_answer());
        }

        let prompt = prompts::synthesis_prompt(query, chunks);
        let completion = self.llm.complete(&prompt).await?;
        let payload = structured::parse_synthesis(&completion)?;

        let allowed: HashSet<&str> = chunks
            .iter()
            .map(|chunk| chunk.document_path.as_str())
            .collect();

        let citations: IndexSet<String> = payload
            .citations
            .into_iter()
            .filter(|path| allowed.contains(path.as_str()))
            .collect();

        Ok(Answer {
            text: payload.answer,
            citations: citations.into_iter().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::mock_providers::{test_chunk, ScriptedLanguageModel};
    use crate::llm::prompts::SYNTHESIS_HEADER;

    #[tokio::test]
    async fn empty_ranked_set_returns_sentinel_without_model_call() {
        let llm = Arc::new(ScriptedLanguageModel::new());
        let synthesizer = AnswerSynthesizer::new(llm.clone());

        let answer = synthesizer.synthesize("requête", &[]).await.unwrap();

        assert_eq!(answer.text, NOT_AVAILABLE_ANSWER);
        assert!(answer.citations.is_empty());
        assert!(llm.prompts().is_empty());
    }

    #[tokio::test]
    async fn citations_outside_the_chunk_set_are_discarded() {
        let llm = ScriptedLanguageModel::new().on(
            SYNTHESIS_HEADER,
            r#"{"answer": "Réponse.", "citations": ["doc1.pdf", "fabricated.pdf"]}"#,
        );
        let synthesizer = AnswerSynthesizer::new(Arc::new(llm));

        let chunks = vec![test_chunk("c1", "doc1.pdf", "texte", 0.9)];
        let answer = synthesizer.synthesize("requête", &chunks).await.unwrap();

        assert_eq!(answer.citations, vec!["doc1.pdf"]);
    }

    #[tokio::test]
    async fn citations_deduplicate_in_first_mention_order() {
        let llm = ScriptedLanguageModel::new().on(
            SYNTHESIS_HEADER,
            r#"{"answer": "Réponse.", "citations": ["doc2.pdf", "doc1.pdf", "doc2.pdf"]}"#,
        );
        let synthesizer = AnswerSynthesizer::new(Arc::new(llm));

        let chunks = vec![
            test_chunk("c1", "doc1.pdf", "premier", 0.9),
            test_chunk("c2", "doc2.pdf", "second", 0.8),
        ];
        let answer = synthesizer.synthesize("requête", &chunks).await.unwrap();

        assert_eq!(answer.citations, vec!["doc2.pdf", "doc1.pdf"]);
    }
}
