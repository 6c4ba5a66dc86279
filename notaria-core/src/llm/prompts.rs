//! Prompt builders for the five language model calls the pipeline makes.
//!
//! Each prompt opens with a fixed header line so that scripted test models
//! can route on it, and instructs the model to answer with a single JSON
//! object matching the shape expected by [`crate::llm::structured`].

use crate::core::Chunk;

/// Header of the strategy classification prompt.
pub const CLASSIFY_HEADER: &str = "Classify the question into a retrieval strategy.";
/// Header of the reasoning/query-optimization prompt.
pub const REASONING_HEADER: &str = "Rewrite the question as a retrieval-friendly search query.";
/// Header of the entity extraction prompt.
pub const ENTITIES_HEADER: &str = "Extract the named entities mentioned in the query.";
/// Header of the rerank prompt.
pub const RERANK_HEADER: &str = "Rank the passages by relevance to the query.";
/// Header of the answer synthesis prompt.
pub const SYNTHESIS_HEADER: &str = "Answer the question using only the numbered sources.";

/// Build the strategy classification prompt.
///
/// The decision heuristic lives here, in the prompt, not in code:
/// definitional/lookup questions go to vector search, questions about named
/// entities or their relationships go graph-first, compound questions go
/// hybrid.
pub fn strategy_prompt(question: &str) -> String {
    format!(
        "{CLASSIFY_HEADER}\n\
         The corpus is a collection of French notarial documents (deeds, \
         doctrine, professional regulations).\n\
         \n\
         Strategies:\n\
         - VECTOR_ONLY: definitional or lookup questions answered by a single \
         passage (\"What is the definition of ...?\")\n\
         - GRAPH_FIRST: questions about named entities (persons, offices, \
         organizations) or the relationships between them (\"Who is ...?\")\n\
         - HYBRID: compound or multi-faceted questions needing both\n\
         \n\
         Question: {question}\n\
         \n\
         Respond with a single JSON object: {{\"strategy\": \"VECTOR_ONLY\" | \
         \"GRAPH_FIRST\" | \"HYBRID\"}}"
    )
}

/// Build the reasoning/query-optimization prompt.
pub fn reasoning_prompt(question: &str) -> String {
    format!(
        "{REASONING_HEADER}\n\
         User questions are often colloquial or ambiguous; restate this one \
         as a precise query suited to vector and full-text matching over \
         French notarial documents. Keep names, dates and legal terms.\n\
         \n\
         Question: {question}\n\
         \n\
         Respond with a single JSON object: {{\"thought\": \"...\", \
         \"search_query\": \"...\"}}"
    )
}

/// Build the entity extraction prompt.
pub fn entities_prompt(query: &str) -> String {
    format!(
        "{ENTITIES_HEADER}\n\
         List the persons, organizations, offices and places named in the \
         query, in order of appearance. Return an empty list if there are \
         none.\n\
         \n\
         Query: {query}\n\
         \n\
         Respond with a single JSON object: {{\"entities\": [\"...\"]}}"
    )
}

/// Build the rerank prompt over a merged candidate pool.
pub fn rerank_prompt(query: &str, chunks: &[Chunk], top_k: usize) -> String {
    let mut prompt = format!(
        "{RERANK_HEADER}\n\
         Select the {top_k} passages most relevant to the query and return \
         their ids from most to least relevant.\n\
         \n\
         Query: {query}\n\
         \n\
         Passages:\n"
    );
    for chunk in chunks {
        prompt.push_str(&format!("[{}] {}\n", chunk.chunk_id, chunk.text));
    }
    prompt.push_str("\nRespond with a single JSON object: {\"chunk_ids\": [\"...\"]}");
    prompt
}

/// Build the grounded synthesis prompt.
///
/// Sources are numbered and carry their document path; the model must ground
/// the answer exclusively in them and list the paths it actually cited.
pub fn synthesis_prompt(query: &str, chunks: &[Chunk]) -> String {
    let mut prompt = format!(
        "{SYNTHESIS_HEADER}\n\
         If the sources do not contain the answer, say so. Do not use outside \
         knowledge. List under \"citations\" the document paths of the \
         sources you actually relied on.\n\
         \n\
         Question: {query}\n\
         \n\
         Sources:\n"
    );
    for (index, chunk) in chunks.iter().enumerate() {
        prompt.push_str(&format!(
            "Source {} - Document: {}\n{}\n\n",
            index + 1,
            chunk.document_path,
            chunk.text
        ));
    }
    prompt.push_str(
        "Respond with a single JSON object: {\"answer\": \"...\", \"citations\": [\"...\"]}",
    );
    prompt
}
