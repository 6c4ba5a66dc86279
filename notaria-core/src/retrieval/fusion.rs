//! Merging of multi-source chunk pools.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::core::Chunk;

/// Merge chunk pools into one deduplicated candidate pool.
///
/// Duplicates are collapsed by `chunk_id`, keeping the instance with the
/// highest score. The output is ordered by descending score with a stable id
/// tiebreak so merging is deterministic, though callers must not rely on any
/// ordering beyond score.
pub fn merge_pools(pools: Vec<Vec<Chunk>>) -> Vec<Chunk> {
    let mut merged: HashMap<String, Chunk> = HashMap::new();

    for chunk in pools.into_iter().flatten() {
        match merged.entry(chunk.chunk_id.clone()) {
            Entry::Occupied(mut entry) => {
                if chunk.score > entry.get().score {
                    entry.insert(chunk);
                }
            },
            Entry::Vacant(entry) => {
                entry.insert(chunk);
            },
        }
    }

    let mut pool: Vec<Chunk> = merged.into_values().collect();
    pool.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.chunk_id.cmp(&b.chunk_id))
    });
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mock_providers::test_chunk;

    #[test]
    fn merge_keeps_union_of_distinct_chunks() {
        let merged = merge_pools(vec![
            vec![test_chunk("chunk1", "doc1.pdf", "vecteur", 0.9)],
            vec![test_chunk("chunk2", "doc2.pdf", "plein texte", 0.8)],
        ]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].chunk_id, "chunk1");
        assert_eq!(merged[1].chunk_id, "chunk2");
    }

    #[test]
    fn duplicate_keeps_highest_score_instance() {
        let merged = merge_pools(vec![
            vec![test_chunk("chunk1", "doc1.pdf", "via vecteur", 0.6)],
            vec![test_chunk("chunk1", "doc1.pdf", "via plein texte", 0.9)],
        ]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].score, 0.9);
        assert_eq!(merged[0].text, "via plein texte");
    }

    #[test]
    fn equal_scores_tie_break_on_id() {
        let merged = merge_pools(vec![vec![
            test_chunk("b", "doc1.pdf", "x", 0.5),
            test_chunk("a", "doc2.pdf", "y", 0.5),
        ]]);

        assert_eq!(merged[0].chunk_id, "a");
        assert_eq!(merged[1].chunk_id, "b");
    }

    #[test]
    fn empty_pools_merge_to_empty() {
        assert!(merge_pools(vec![Vec::new(), Vec::new()]).is_empty());
    }
}
