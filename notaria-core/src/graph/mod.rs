//! Graph store access.
//!
//! The pipeline only ever reads the graph; population and schema management
//! belong to the surrounding ETL tooling.

/// Neo4j HTTP read adapter
pub mod neo4j;

pub use neo4j::{Neo4jConfig, Neo4jReader};
