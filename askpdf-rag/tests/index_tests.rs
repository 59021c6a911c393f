//! Property tests for document index search ordering.

use std::collections::HashMap;

use askpdf_rag::{Chunk, DocumentIndex};
use proptest::prelude::*;

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map(
        "non-zero embedding",
        |mut v| {
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm < 1e-8 {
                return None;
            }
            for val in &mut v {
                *val /= norm;
            }
            Some(v)
        },
    )
}

fn arb_chunks(dim: usize) -> impl Strategy<Value = Vec<Chunk>> {
    proptest::collection::vec(("[a-z ]{5,30}", arb_normalized_embedding(dim)), 1..20).prop_map(
        |items| {
            items
                .into_iter()
                .enumerate()
                .map(|(position, (text, embedding))| Chunk {
                    id: format!("doc_{position}"),
                    text,
                    position,
                    embedding,
                    metadata: HashMap::new(),
                    document_id: "doc".to_string(),
                })
                .collect()
        },
    )
}

mod prop_index_search_ordering {
    use super::*;

    const DIM: usize = 16;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn results_ordered_descending_and_bounded_by_top_k(
            chunks in arb_chunks(DIM),
            query in arb_normalized_embedding(DIM),
            top_k in 1usize..25,
        ) {
            let total = chunks.len();
            let index = DocumentIndex::from_chunks("doc", "doc.pdf", DIM, chunks).unwrap();
            let results = index.search(&query, top_k).unwrap();

            prop_assert_eq!(results.len(), top_k.min(total));
            for pair in results.windows(2) {
                prop_assert!(
                    pair[0].score > pair[1].score
                        || (pair[0].score == pair[1].score
                            && pair[0].chunk.position < pair[1].chunk.position),
                    "results not ordered: {} (pos {}) before {} (pos {})",
                    pair[0].score,
                    pair[0].chunk.position,
                    pair[1].score,
                    pair[1].chunk.position,
                );
            }
        }

        #[test]
        fn returned_chunks_are_the_best_scoring(
            chunks in arb_chunks(DIM),
            query in arb_normalized_embedding(DIM),
            top_k in 1usize..10,
        ) {
            let index = DocumentIndex::from_chunks("doc", "doc.pdf", DIM, chunks).unwrap();
            let results = index.search(&query, top_k).unwrap();
            let everything = index.search(&query, index.len()).unwrap();

            let cutoff = results.last().map(|r| r.score).unwrap();
            let returned: Vec<usize> = results.iter().map(|r| r.chunk.position).collect();
            for other in everything.iter().filter(|r| !returned.contains(&r.chunk.position)) {
                prop_assert!(other.score <= cutoff);
            }
        }

        #[test]
        fn scores_are_cosine_bounded(
            chunks in arb_chunks(DIM),
            query in arb_normalized_embedding(DIM),
        ) {
            let index = DocumentIndex::from_chunks("doc", "doc.pdf", DIM, chunks).unwrap();
            for result in index.search(&query, index.len()).unwrap() {
                prop_assert!((-1.0001..=1.0001).contains(&result.score));
            }
        }
    }
}

#[test]
fn searching_twice_gives_identical_results() {
    let chunks = (0..5)
        .map(|i| Chunk {
            id: format!("doc_{i}"),
            text: format!("chunk {i}"),
            position: i,
            embedding: vec![1.0, i as f32],
            metadata: HashMap::new(),
            document_id: "doc".into(),
        })
        .collect();
    let index = DocumentIndex::from_chunks("doc", "doc.pdf", 2, chunks).unwrap();

    let first: Vec<usize> =
        index.search(&[0.0, 1.0], 3).unwrap().iter().map(|r| r.chunk.position).collect();
    let second: Vec<usize> =
        index.search(&[0.0, 1.0], 3).unwrap().iter().map(|r| r.chunk.position).collect();
    assert_eq!(first, second);
    assert_eq!(first, vec![4, 3, 2]);
}
