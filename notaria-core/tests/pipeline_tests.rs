//! End-to-end pipeline tests over deterministic mock providers.
//!
//! Every external collaborator is stubbed independently, so each test pins
//! one behavior of the pipeline: strategy routing, merge semantics, the
//! no-evidence path, error propagation, and the citation invariant.

use std::sync::Arc;

use notaria_core::config::RetrievalConfig;
use notaria_core::core::mock_providers::{
    test_chunk, GraphCall, MockEmbedder, MockGraphReader, ScriptedLanguageModel,
};
use notaria_core::llm::prompts::{
    CLASSIFY_HEADER, ENTITIES_HEADER, REASONING_HEADER, RERANK_HEADER, SYNTHESIS_HEADER,
};
use notaria_core::query::StrategySelector;
use notaria_core::{RagError, RagService, RetrievalStrategy, NOT_AVAILABLE_ANSWER};

const REASONING_REPLY: &str = r#"{"thought": "Test thought", "search_query": "optimized query"}"#;

fn base_llm() -> ScriptedLanguageModel {
    ScriptedLanguageModel::new().on(REASONING_HEADER, REASONING_REPLY)
}

fn service(
    embedder: MockEmbedder,
    graph: MockGraphReader,
    llm: ScriptedLanguageModel,
) -> (
    RagService,
    Arc<MockEmbedder>,
    Arc<MockGraphReader>,
    Arc<ScriptedLanguageModel>,
) {
    let embedder = Arc::new(embedder);
    let graph = Arc::new(graph);
    let llm = Arc::new(llm);
    let service = RagService::new(
        embedder.clone(),
        graph.clone(),
        llm.clone(),
        RetrievalConfig::default(),
    );
    (service, embedder, graph, llm)
}

// ---------------------------------------------------------------------------
// Strategy selection (Scenarios A and B)
// ---------------------------------------------------------------------------

#[tokio::test]
async fn definitional_question_classifies_vector_only() {
    let llm = ScriptedLanguageModel::new().on(CLASSIFY_HEADER, r#"{"strategy": "VECTOR_ONLY"}"#);
    let selector = StrategySelector::new(Arc::new(llm));

    let strategy = selector
        .select("What is the definition of X?")
        .await
        .unwrap();
    assert_eq!(strategy, RetrievalStrategy::VectorOnly);
}

#[tokio::test]
async fn entity_question_classifies_graph_first() {
    let llm = ScriptedLanguageModel::new().on(CLASSIFY_HEADER, r#"{"strategy": "GRAPH_FIRST"}"#);
    let selector = StrategySelector::new(Arc::new(llm));

    let strategy = selector.select("Who is John Doe?").await.unwrap();
    assert_eq!(strategy, RetrievalStrategy::GraphFirst);
}

#[tokio::test]
async fn compound_question_classifies_hybrid() {
    let llm = ScriptedLanguageModel::new().on(CLASSIFY_HEADER, r#"{"strategy": "HYBRID"}"#);
    let selector = StrategySelector::new(Arc::new(llm));

    let strategy = selector.select("Complex legal question").await.unwrap();
    assert_eq!(strategy, RetrievalStrategy::Hybrid);
}

#[tokio::test]
async fn malformed_classification_payload_propagates() {
    let llm = base_llm().on(CLASSIFY_HEADER, r#"{"strategy": "KEYWORD_ONLY"}"#);
    let (service, _, _, _) = service(MockEmbedder::no_vector(), MockGraphReader::new(), llm);

    let err = service.query("Question").await.unwrap_err();
    assert!(matches!(err, RagError::StructuredOutput { .. }));
}

// ---------------------------------------------------------------------------
// Full pipeline (Scenario C and variants)
// ---------------------------------------------------------------------------

#[tokio::test]
async fn hybrid_query_merges_sources_and_cites_from_the_ranked_set() {
    let llm = base_llm()
        .on(CLASSIFY_HEADER, r#"{"strategy": "HYBRID"}"#)
        .on(RERANK_HEADER, r#"{"chunk_ids": ["chunk1", "chunk2"]}"#)
        .on(
            SYNTHESIS_HEADER,
            r#"{"answer": "Test response based on Source 1 - Document: doc1.pdf", "citations": ["doc1.pdf"]}"#,
        );
    let graph = MockGraphReader::new()
        .with_vector_chunks(vec![test_chunk("chunk1", "doc1.pdf", "Vector result 1", 0.9)])
        .with_fulltext_chunks(vec![test_chunk(
            "chunk2",
            "doc2.pdf",
            "Fulltext result 1",
            0.8,
        )]);
    let (service, _, graph, _) =
        service(MockEmbedder::returning(vec![0.1, 0.2, 0.3]), graph, llm);

    let answer = service.query("Test question").await.unwrap();

    assert!(answer.text.contains("Test response"));
    assert_eq!(answer.citations, vec!["doc1.pdf"]);
    assert_eq!(graph.vector_calls(), 1);
    assert_eq!(graph.fulltext_calls(), 1);
    // Retrieval saw the optimized query, not the raw question.
    assert!(graph
        .calls()
        .contains(&GraphCall::Fulltext("optimized query".to_string())));
}

#[tokio::test]
async fn multiple_sources_yield_multiple_citations() {
    let llm = base_llm()
        .on(CLASSIFY_HEADER, r#"{"strategy": "HYBRID"}"#)
        .on(
            RERANK_HEADER,
            r#"{"chunk_ids": ["chunk1", "chunk2", "chunk3"]}"#,
        )
        .on(
            SYNTHESIS_HEADER,
            r#"{"answer": "Response citing Source 1 - Document: doc1.pdf and Source 2 - Document: doc2.pdf", "citations": ["doc1.pdf", "doc2.pdf"]}"#,
        );
    let graph = MockGraphReader::new()
        .with_vector_chunks(vec![
            test_chunk("chunk1", "doc1.pdf", "First result", 0.9),
            test_chunk("chunk2", "doc2.pdf", "Second result", 0.8),
        ])
        .with_fulltext_chunks(vec![test_chunk("chunk3", "doc3.pdf", "Third result", 0.7)]);
    let (service, _, _, _) = service(MockEmbedder::returning(vec![0.1, 0.2, 0.3]), graph, llm);

    let answer = service.query("Complex question").await.unwrap();

    assert!(answer.text.contains("Response citing"));
    assert_eq!(answer.citations.len(), 2);
    assert!(answer.citations.contains(&"doc1.pdf".to_string()));
    assert!(answer.citations.contains(&"doc2.pdf".to_string()));
}

#[tokio::test]
async fn duplicate_chunk_across_sources_keeps_highest_score() {
    let llm = base_llm()
        .on(CLASSIFY_HEADER, r#"{"strategy": "HYBRID"}"#)
        .on(RERANK_HEADER, r#"{"chunk_ids": ["chunk1"]}"#)
        .on(
            SYNTHESIS_HEADER,
            r#"{"answer": "Réponse.", "citations": ["doc1.pdf"]}"#,
        );
    let graph = MockGraphReader::new()
        .with_vector_chunks(vec![test_chunk("chunk1", "doc1.pdf", "via vector", 0.6)])
        .with_fulltext_chunks(vec![test_chunk("chunk1", "doc1.pdf", "via fulltext", 0.9)]);
    let (service, _, _, llm) = service(MockEmbedder::returning(vec![0.1]), graph, llm);

    let answer = service.query("Question").await.unwrap();
    assert_eq!(answer.citations, vec!["doc1.pdf"]);

    // The rerank prompt saw one deduplicated candidate, the 0.9 instance.
    let rerank_prompt = llm
        .prompts()
        .into_iter()
        .find(|p| p.contains(RERANK_HEADER))
        .unwrap();
    assert!(rerank_prompt.contains("via fulltext"));
    assert!(!rerank_prompt.contains("via vector"));
}

// ---------------------------------------------------------------------------
// No-evidence paths (Scenarios D and E)
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_search_results_return_the_sentinel_answer() {
    let llm = base_llm().on(CLASSIFY_HEADER, r#"{"strategy": "HYBRID"}"#);
    let (service, _, _, _) = service(
        MockEmbedder::returning(vec![0.1, 0.2, 0.3]),
        MockGraphReader::new(),
        llm,
    );

    let answer = service.query("Question sans résultat").await.unwrap();

    assert_eq!(answer.text, NOT_AVAILABLE_ANSWER);
    assert!(answer.citations.is_empty());
}

#[tokio::test]
async fn embedding_without_vector_short_circuits_without_synthesis() {
    let llm = base_llm().on(CLASSIFY_HEADER, r#"{"strategy": "VECTOR_ONLY"}"#);
    let (service, embedder, graph, llm) =
        service(MockEmbedder::no_vector(), MockGraphReader::new(), llm);

    let answer = service.query("Test question").await.unwrap();

    assert_eq!(answer.text, NOT_AVAILABLE_ANSWER);
    assert!(answer.citations.is_empty());
    assert_eq!(embedder.calls(), 1);
    assert!(graph.calls().is_empty());
    assert_eq!(llm.calls_matching(SYNTHESIS_HEADER), 0);
    assert_eq!(llm.calls_matching(RERANK_HEADER), 0);
}

#[tokio::test]
async fn graph_first_without_entities_returns_the_sentinel_answer() {
    let llm = base_llm()
        .on(CLASSIFY_HEADER, r#"{"strategy": "GRAPH_FIRST"}"#)
        .on(ENTITIES_HEADER, r#"{"entities": []}"#);
    let (service, _, graph, llm) = service(
        MockEmbedder::no_vector(),
        MockGraphReader::new().with_path_chunks(vec![test_chunk("p1", "doc.pdf", "x", 0.5)]),
        llm,
    );

    let answer = service.query("Question").await.unwrap();

    assert_eq!(answer.text, NOT_AVAILABLE_ANSWER);
    assert_eq!(graph.path_calls(), 0);
    assert_eq!(llm.calls_matching(SYNTHESIS_HEADER), 0);
}

// ---------------------------------------------------------------------------
// Strategy isolation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn vector_only_issues_no_fulltext_or_path_calls() {
    let llm = base_llm()
        .on(CLASSIFY_HEADER, r#"{"strategy": "VECTOR_ONLY"}"#)
        .on(RERANK_HEADER, r#"{"chunk_ids": ["chunk1"]}"#)
        .on(
            SYNTHESIS_HEADER,
            r#"{"answer": "Réponse.", "citations": ["doc1.pdf"]}"#,
        );
    let graph = MockGraphReader::new()
        .with_vector_chunks(vec![test_chunk("chunk1", "doc1.pdf", "texte", 0.9)]);
    let (service, _, graph, _) = service(MockEmbedder::returning(vec![0.1]), graph, llm);

    service.query("What is the definition of X?").await.unwrap();

    assert_eq!(graph.vector_calls(), 1);
    assert_eq!(graph.fulltext_calls(), 0);
    assert_eq!(graph.path_calls(), 0);
}

#[tokio::test]
async fn graph_first_routes_through_entity_paths() {
    let llm = base_llm()
        .on(CLASSIFY_HEADER, r#"{"strategy": "GRAPH_FIRST"}"#)
        .on(
            ENTITIES_HEADER,
            r#"{"entities": ["John Doe", "Company ABC"]}"#,
        )
        .on(RERANK_HEADER, r#"{"chunk_ids": ["p1"]}"#)
        .on(
            SYNTHESIS_HEADER,
            r#"{"answer": "Réponse.", "citations": ["paths.pdf"]}"#,
        );
    let graph = MockGraphReader::new()
        .with_path_chunks(vec![test_chunk("p1", "paths.pdf", "chemin", 0.0)]);
    let (service, _, graph, _) = service(MockEmbedder::no_vector(), graph, llm);

    let answer = service.query("Who is John Doe?").await.unwrap();

    assert_eq!(answer.citations, vec!["paths.pdf"]);
    assert_eq!(
        graph.calls(),
        vec![GraphCall::Paths(vec![
            "John Doe".to_string(),
            "Company ABC".to_string()
        ])]
    );
}

// ---------------------------------------------------------------------------
// Failure propagation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn graph_store_failure_propagates_instead_of_becoming_a_sentinel() {
    let llm = base_llm().on(CLASSIFY_HEADER, r#"{"strategy": "VECTOR_ONLY"}"#);
    let (service, _, _, llm) = service(
        MockEmbedder::returning(vec![0.1, 0.2, 0.3]),
        MockGraphReader::new().fail_vector_with("Database error"),
        llm,
    );

    let err = service.query("Test question").await.unwrap_err();

    match err {
        RagError::GraphStore { message } => assert!(message.contains("Database error")),
        other => panic!("expected a graph store error, got {other:?}"),
    }
    assert_eq!(llm.calls_matching(SYNTHESIS_HEADER), 0);
}

#[tokio::test]
async fn embedding_provider_failure_propagates() {
    let llm = base_llm().on(CLASSIFY_HEADER, r#"{"strategy": "VECTOR_ONLY"}"#);
    let (service, _, _, _) = service(
        MockEmbedder::failing("embedding backend down"),
        MockGraphReader::new(),
        llm,
    );

    let err = service.query("Test question").await.unwrap_err();
    assert!(matches!(err, RagError::Embedding { .. }));
}

#[tokio::test]
async fn language_model_failure_during_reasoning_propagates() {
    let llm = ScriptedLanguageModel::new().fail_on(REASONING_HEADER, "model unavailable");
    let (service, embedder, _, _) = service(
        MockEmbedder::returning(vec![0.1]),
        MockGraphReader::new(),
        llm,
    );

    let err = service.query("Test question").await.unwrap_err();
    assert!(matches!(err, RagError::LanguageModel { .. }));
    // Reasoning runs before anything else, so nothing downstream fired.
    assert_eq!(embedder.calls(), 0);
}

// ---------------------------------------------------------------------------
// Idempotence and the citation invariant
// ---------------------------------------------------------------------------

#[tokio::test]
async fn identical_stubbed_providers_yield_identical_answers() {
    let build = || {
        let llm = base_llm()
            .on(CLASSIFY_HEADER, r#"{"strategy": "HYBRID"}"#)
            .on(RERANK_HEADER, r#"{"chunk_ids": ["chunk1", "chunk2"]}"#)
            .on(
                SYNTHESIS_HEADER,
                r#"{"answer": "Réponse stable.", "citations": ["doc1.pdf"]}"#,
            );
        let graph = MockGraphReader::new()
            .with_vector_chunks(vec![test_chunk("chunk1", "doc1.pdf", "premier", 0.9)])
            .with_fulltext_chunks(vec![test_chunk("chunk2", "doc2.pdf", "second", 0.8)]);
        service(MockEmbedder::returning(vec![0.1, 0.2, 0.3]), graph, llm).0
    };

    let first = build().query("Test question").await.unwrap();
    let second = build().query("Test question").await.unwrap();
    assert_eq!(first, second);

    // And the same service instance answers repeat questions identically.
    let service = build();
    let a = service.query("Test question").await.unwrap();
    let b = service.query("Test question").await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn fabricated_citations_never_reach_the_answer() {
    let llm = base_llm()
        .on(CLASSIFY_HEADER, r#"{"strategy": "HYBRID"}"#)
        .on(RERANK_HEADER, r#"{"chunk_ids": ["chunk1"]}"#)
        .on(
            SYNTHESIS_HEADER,
            r#"{"answer": "Réponse.", "citations": ["doc1.pdf", "invented.pdf"]}"#,
        );
    let graph = MockGraphReader::new()
        .with_vector_chunks(vec![test_chunk("chunk1", "doc1.pdf", "texte", 0.9)]);
    let (service, _, _, _) = service(MockEmbedder::returning(vec![0.1]), graph, llm);

    let answer = service.query("Question").await.unwrap();

    assert_eq!(answer.citations, vec!["doc1.pdf"]);
}
