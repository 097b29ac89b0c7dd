//! Reciprocal Rank Fusion of two ranked result lists.

use std::collections::HashMap;

use paperdb_core::types::{ChunkId, RankedResult, RetrievalSource};

struct FusedEntry {
    result: RankedResult,
    score: f32,
}

/// Merges the vector and keyword rankings into one deduplicated ranking.
///
/// Each list contributes `weight * 1/(k + rank)` per item, where rank is
/// the 1-based position in that list, `alpha` weights the vector side and
/// `1 - alpha` the keyword side. A chunk present in both lists accumulates
/// both terms. Output is sorted by fused score descending; `score` holds
/// the fused total, `rank` the 1-based fused position.
///
/// Ties: the vector list is processed first, and the final stable sort
/// preserves first-encountered order for equal scores. Callers that depend
/// on tie ordering must keep that processing order fixed regardless of
/// which backend answered first.
///
/// An empty list on either side degrades to ranking by the other side
/// alone. Pure and deterministic for fixed inputs.
pub fn reciprocal_rank_fusion(
    vector_results: Vec<RankedResult>,
    keyword_results: Vec<RankedResult>,
    alpha: f32,
    k: u32,
) -> Vec<RankedResult> {
    let mut slot_by_id: HashMap<ChunkId, usize> = HashMap::new();
    let mut fused: Vec<FusedEntry> =
        Vec::with_capacity(vector_results.len() + keyword_results.len());

    for (weight, results) in [(alpha, vector_results), (1.0 - alpha, keyword_results)] {
        for (position, result) in results.into_iter().enumerate() {
            let rank = (position + 1) as f32;
            let contribution = weight * (1.0 / (k as f32 + rank));
            match slot_by_id.get(&result.chunk.chunk_id) {
                Some(&slot) => fused[slot].score += contribution,
                None => {
                    slot_by_id.insert(result.chunk.chunk_id.clone(), fused.len());
                    fused.push(FusedEntry { result, score: contribution });
                }
            }
        }
    }

    // Stable sort: entries sit in first-encountered order, so equal scores
    // keep it.
    fused.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    fused
        .into_iter()
        .enumerate()
        .map(|(position, entry)| {
            let mut result = entry.result;
            result.score = entry.score;
            result.rank = position + 1;
            result.source = RetrievalSource::Fused;
            result
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperdb_core::types::Chunk;

    const K: u32 = 60;

    fn chunk(id: &str) -> Chunk {
        Chunk {
            chunk_id: id.to_string(),
            paper_id: format!("paper-{id}"),
            chunk_index: 0,
            content: format!("content of {id}"),
            start_char: 0,
            end_char: 10,
            embedding: None,
            paper_title: format!("Title {id}"),
            paper_authors: vec![],
            paper_categories: vec!["cs.IR".to_string()],
        }
    }

    fn ranked(ids: &[&str], source: RetrievalSource) -> Vec<RankedResult> {
        ids.iter()
            .enumerate()
            .map(|(i, id)| RankedResult {
                chunk: chunk(id),
                score: 1.0 - i as f32 * 0.1,
                rank: i + 1,
                source,
            })
            .collect()
    }

    fn vector(ids: &[&str]) -> Vec<RankedResult> {
        ranked(ids, RetrievalSource::Vector)
    }

    fn keyword(ids: &[&str]) -> Vec<RankedResult> {
        ranked(ids, RetrievalSource::Keyword)
    }

    fn ids(results: &[RankedResult]) -> Vec<&str> {
        results.iter().map(|r| r.chunk.chunk_id.as_str()).collect()
    }

    fn rrf(rank: usize) -> f32 {
        1.0 / (K as f32 + rank as f32)
    }

    #[test]
    fn both_empty_yields_empty() {
        let fused = reciprocal_rank_fusion(vec![], vec![], 0.5, K);
        assert!(fused.is_empty());
    }

    #[test]
    fn empty_keyword_side_degrades_to_vector_ranking() {
        let fused = reciprocal_rank_fusion(vector(&["a", "b", "c"]), vec![], 0.5, K);
        assert_eq!(ids(&fused), vec!["a", "b", "c"]);
        for (i, result) in fused.iter().enumerate() {
            assert!((result.score - 0.5 * rrf(i + 1)).abs() < 1e-9);
            assert_eq!(result.rank, i + 1);
            assert_eq!(result.source, RetrievalSource::Fused);
        }
    }

    #[test]
    fn union_is_complete_and_deduplicated() {
        let fused =
            reciprocal_rank_fusion(vector(&["a", "b", "c"]), keyword(&["b", "d"]), 0.5, K);
        let mut seen = ids(&fused);
        seen.sort_unstable();
        assert_eq!(seen, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn deterministic_across_calls() {
        let run = || {
            reciprocal_rank_fusion(
                vector(&["a", "b", "c"]),
                keyword(&["c", "d", "a"]),
                0.3,
                K,
            )
        };
        let first = run();
        let second = run();
        assert_eq!(ids(&first), ids(&second));
        for (x, y) in first.iter().zip(&second) {
            assert_eq!(x.score, y.score);
            assert_eq!(x.rank, y.rank);
        }
    }

    #[test]
    fn dual_presence_outranks_single_presence() {
        // Scenario: A and B appear in both lists, C and D in one each.
        let fused = reciprocal_rank_fusion(
            vector(&["a", "b", "c"]),
            keyword(&["b", "a", "d"]),
            0.5,
            K,
        );
        let order = ids(&fused);
        let pos = |id: &str| order.iter().position(|x| *x == id).expect("present");
        assert!(pos("a") < pos("c"));
        assert!(pos("a") < pos("d"));
        assert!(pos("b") < pos("c"));
        assert!(pos("b") < pos("d"));
        // A: vector rank 1 + keyword rank 2; B: vector rank 2 + keyword
        // rank 1. Equal sums, so the tie goes to A, encountered first in
        // the vector list.
        assert_eq!(fused[0].chunk.chunk_id, "a");
        assert_eq!(fused[1].chunk.chunk_id, "b");
        assert_eq!(fused[0].score, fused[1].score);
    }

    #[test]
    fn moving_up_a_list_never_lowers_the_fused_score() {
        let baseline =
            reciprocal_rank_fusion(vector(&["a", "b", "c"]), keyword(&["d", "e"]), 0.4, K);
        let improved =
            reciprocal_rank_fusion(vector(&["b", "a", "c"]), keyword(&["d", "e"]), 0.4, K);
        let score_of = |results: &[RankedResult], id: &str| {
            results
                .iter()
                .find(|r| r.chunk.chunk_id == id)
                .map(|r| r.score)
                .expect("present")
        };
        assert!(score_of(&improved, "b") > score_of(&baseline, "b"));
    }

    #[test]
    fn alpha_one_preserves_vector_order_and_floors_keyword_only_items() {
        let fused = reciprocal_rank_fusion(
            vector(&["a", "b", "c"]),
            keyword(&["x", "b", "y"]),
            1.0,
            K,
        );
        let order = ids(&fused);
        // Vector items keep their relative order.
        let pos = |id: &str| order.iter().position(|x| *x == id).expect("present");
        assert!(pos("a") < pos("b"));
        assert!(pos("b") < pos("c"));
        // Keyword-only items score zero and cannot outrank any scored item.
        let score_of = |id: &str| fused[pos(id)].score;
        assert_eq!(score_of("x"), 0.0);
        assert_eq!(score_of("y"), 0.0);
        assert!(pos("x") > pos("c"));
        assert!(pos("y") > pos("c"));
        // Zero-scored ties resolve by encounter order within the keyword list.
        assert!(pos("x") < pos("y"));
    }

    #[test]
    fn alpha_zero_mirrors_to_keyword_order() {
        let fused = reciprocal_rank_fusion(
            vector(&["a", "b"]),
            keyword(&["c", "d", "e"]),
            0.0,
            K,
        );
        let order = ids(&fused);
        let pos = |id: &str| order.iter().position(|x| *x == id).expect("present");
        assert!(pos("c") < pos("d"));
        assert!(pos("d") < pos("e"));
        assert!(pos("a") > pos("e"));
    }

    #[test]
    fn swapped_lists_with_mirrored_alpha_agree_on_scores() {
        let forward = reciprocal_rank_fusion(
            vector(&["a", "b", "c"]),
            keyword(&["c", "d"]),
            0.3,
            K,
        );
        let mirrored = reciprocal_rank_fusion(
            vector(&["c", "d"]),
            keyword(&["a", "b", "c"]),
            0.7,
            K,
        );
        let score_of = |results: &[RankedResult], id: &str| {
            results
                .iter()
                .find(|r| r.chunk.chunk_id == id)
                .map(|r| r.score)
                .expect("present")
        };
        for id in ["a", "b", "c", "d"] {
            assert!((score_of(&forward, id) - score_of(&mirrored, id)).abs() < 1e-6);
        }
    }

    #[test]
    fn larger_k_flattens_rank_influence() {
        let gap = |k: u32| {
            let fused = reciprocal_rank_fusion(vector(&["a", "b"]), vec![], 1.0, k);
            fused[0].score - fused[1].score
        };
        assert!(gap(600) < gap(6));
    }
}
