//! Neo4j read adapter.
//!
//! Implements [`AsyncGraphReader`] over Neo4j's HTTP transaction endpoint.
//! The three reads map onto the store's indexes: the chunk vector index, the
//! chunk full-text index, and a path query between named entities that
//! returns the chunks mentioning path members.
//!
//! Graph reads do not retry: a store failure propagates on first occurrence,
//! per the pipeline's propagation policy. Only the per-call timeout is
//! configured here.

use async_trait::async_trait;

use crate::core::traits::AsyncGraphReader;
use crate::core::{Chunk, RagError, Result};

/// Neo4j connection configuration
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Neo4jConfig {
    /// HTTP endpoint of the server, e.g. `http://localhost:7474`
    pub uri: String,
    /// Database name
    pub database: String,
    /// Username for basic auth
    pub user: String,
    /// Password for basic auth
    pub password: String,
    /// Name of the chunk embedding vector index
    pub vector_index: String,
    /// Name of the chunk full-text index
    pub fulltext_index: String,
    /// Maximum path length between entities
    pub max_path_length: usize,
    /// Per-call timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for Neo4jConfig {
    fn default() -> Self {
        Self {
            uri: "http://localhost:7474".to_string(),
            database: "neo4j".to_string(),
            user: "neo4j".to_string(),
            password: String::new(),
            vector_index: "chunk_embeddings".to_string(),
            fulltext_index: "chunk_fulltext".to_string(),
            max_path_length: 3,
            timeout_seconds: 10,
        }
    }
}

/// Read-only Neo4j client for the document graph.
#[derive(Debug, Clone)]
pub struct Neo4jReader {
    config: Neo4jConfig,
    agent: ureq::Agent,
}

/// The chunk projection for a given Cypher variable, aliased to the wire
/// names `Chunk` deserializes from.
fn chunk_projection(var: &str) -> String {
    format!(
        "{var}.text AS text, {var}.documentPath AS documentPath, \
         {var}.documentId AS documentId, {var}.chunkId AS chunkId"
    )
}

impl Neo4jReader {
    /// Create a reader with a per-call timeout taken from the config.
    pub fn new(config: Neo4jConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build();
        Self { config, agent }
    }

    /// Run one Cypher statement and map the result rows into chunks.
    fn run_chunk_query(
        &self,
        statement: &str,
        parameters: serde_json::Value,
    ) -> Result<Vec<Chunk>> {
        let endpoint = format!(
            "{}/db/{}/tx/commit",
            self.config.uri, self.config.database
        );
        let body = serde_json::json!({
            "statements": [{
                "statement": statement,
                "parameters": parameters,
            }]
        });

        let response: serde_json::Value = self
            .agent
            .post(&endpoint)
            .set("Content-Type", "application/json")
            .set(
                "Authorization",
                &basic_auth_header(&self.config.user, &self.config.password),
            )
            .send_json(&body)?
            .into_json()
            .map_err(|e| RagError::GraphStore {
                message: format!("failed to parse transaction response: {e}"),
            })?;

        if let Some(error) = response["errors"].as_array().and_then(|e| e.first()) {
            return Err(RagError::GraphStore {
                message: format!(
                    "cypher error {}: {}",
                    error["code"].as_str().unwrap_or("unknown"),
                    error["message"].as_str().unwrap_or("no message")
                ),
            });
        }

        let result = &response["results"][0];
        let columns: Vec<String> = serde_json::from_value(result["columns"].clone())?;

        let mut chunks = Vec::new();
        for entry in result["data"].as_array().into_iter().flatten() {
            let row = entry["row"].as_array().ok_or_else(|| RagError::GraphStore {
                message: "transaction row is not an array".to_string(),
            })?;

            // Rebuild a column-keyed object so the chunk's camelCase wire
            // names deserialize directly.
            let object: serde_json::Map<String, serde_json::Value> = columns
                .iter()
                .cloned()
                .zip(row.iter().cloned())
                .collect();
            chunks.push(serde_json::from_value(serde_json::Value::Object(object))?);
        }

        Ok(chunks)
    }
}

#[async_trait]
impl AsyncGraphReader for Neo4jReader {
    async fn search_by_vector(&self, embedding: &[f32], limit: usize) -> Result<Vec<Chunk>> {
        let statement = format!(
            "CALL db.index.vector.queryNodes($index, $limit, $embedding) \
             YIELD node, score \
             RETURN {}, score AS score",
            chunk_projection("node")
        );
        self.run_chunk_query(
            &statement,
            serde_json::json!({
                "index": self.config.vector_index,
                "limit": limit,
                "embedding": embedding,
            }),
        )
    }

    async fn search_by_fulltext(&self, query: &str, limit: usize) -> Result<Vec<Chunk>> {
        let statement = format!(
            "CALL db.index.fulltext.queryNodes($index, $query, {{limit: $limit}}) \
             YIELD node, score \
             RETURN {}, score AS score",
            chunk_projection("node")
        );
        self.run_chunk_query(
            &statement,
            serde_json::json!({
                "index": self.config.fulltext_index,
                "query": query,
                "limit": limit,
            }),
        )
    }

    async fn find_paths(&self, entities: &[String], limit: usize) -> Result<Vec<Chunk>> {
        // Path-reachable chunks carry no native retrieval score; the
        // reranker is responsible for ordering them.
        let statement = format!(
            "MATCH (a:Entity), (b:Entity) \
             WHERE a.name IN $entities AND b.name IN $entities AND a.name < b.name \
             MATCH p = shortestPath((a)-[*..{}]-(b)) \
             UNWIND nodes(p) AS member \
             MATCH (c:Chunk)-[:MENTIONNE]->(member) \
             RETURN DISTINCT {}, 0.0 AS score \
             LIMIT $limit",
            self.config.max_path_length,
            chunk_projection("c")
        );
        self.run_chunk_query(
            &statement,
            serde_json::json!({
                "entities": entities,
                "limit": limit,
            }),
        )
    }

    async fn health_check(&self) -> Result<bool> {
        let endpoint = format!("{}/db/{}/tx/commit", self.config.uri, self.config.database);
        let body = serde_json::json!({"statements": [{"statement": "RETURN 1"}]});
        let outcome = self
            .agent
            .post(&endpoint)
            .set(
                "Authorization",
                &basic_auth_header(&self.config.user, &self.config.password),
            )
            .send_json(&body);
        Ok(outcome.is_ok())
    }
}

/// Build the basic auth header value. Scoped here because nothing else in
/// the crate speaks basic auth.
fn basic_auth_header(user: &str, password: &str) -> String {
    format!("Basic {}", base64_encode(format!("{user}:{password}").as_bytes()))
}

fn base64_encode(input: &[u8]) -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
    let mut output = String::with_capacity(input.len().div_ceil(3) * 4);

    for block in input.chunks(3) {
        let b0 = block[0] as u32;
        let b1 = block.get(1).copied().unwrap_or(0) as u32;
        let b2 = block.get(2).copied().unwrap_or(0) as u32;
        let triple = (b0 << 16) | (b1 << 8) | b2;

        output.push(ALPHABET[(triple >> 18) as usize & 0x3f] as char);
        output.push(ALPHABET[(triple >> 12) as usize & 0x3f] as char);
        output.push(if block.len() > 1 {
            ALPHABET[(triple >> 6) as usize & 0x3f] as char
        } else {
            '='
        });
        output.push(if block.len() > 2 {
            ALPHABET[triple as usize & 0x3f] as char
        } else {
            '='
        });
    }

    output
}
