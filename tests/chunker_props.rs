//! Property tests for chunking and index ordering.

use doc_qa::domain::{ports::VectorIndex, split_into_chunks, ChunkingConfig, Embedding};
use doc_qa::infrastructure::{CosineIndex, ExactIndex};
use proptest::prelude::*;

fn arb_config() -> impl Strategy<Value = ChunkingConfig> {
    (2usize..60)
        .prop_flat_map(|size| (Just(size), 0..size))
        .prop_map(|(size, overlap)| ChunkingConfig::new(size, overlap).unwrap())
}

fn arb_text() -> impl Strategy<Value = String> {
    "[a-zA-Zé .!?\n]{0,300}"
}

mod prop_chunking {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn chunks_are_trimmed_non_empty_and_bounded(text in arb_text(), config in arb_config()) {
            let chunks = split_into_chunks(&text, &config);

            if text.trim().is_empty() {
                prop_assert!(chunks.is_empty());
            } else {
                prop_assert!(!chunks.is_empty());
            }
            for chunk in &chunks {
                prop_assert!(!chunk.text.is_empty());
                prop_assert_eq!(chunk.text.trim(), chunk.text.as_str());
                prop_assert!(chunk.text.chars().count() <= config.chunk_size + 1);
            }
        }

        #[test]
        fn chunk_starts_strictly_increase(text in arb_text(), config in arb_config()) {
            let chunks = split_into_chunks(&text, &config);
            for (i, pair) in chunks.windows(2).enumerate() {
                prop_assert!(pair[1].start > pair[0].start);
                prop_assert_eq!(pair[0].index, i);
            }
        }

        #[test]
        fn every_visible_character_is_covered(text in arb_text(), config in arb_config()) {
            let chunks = split_into_chunks(&text, &config);

            for (pos, c) in text.chars().enumerate() {
                if c.is_whitespace() {
                    continue;
                }
                prop_assert!(
                    chunks.iter().any(|ch| ch.start <= pos && pos < ch.end),
                    "character {:?} at {} not covered", c, pos
                );
            }
        }

        #[test]
        fn chunk_text_comes_from_its_span(text in arb_text(), config in arb_config()) {
            let chars: Vec<char> = text.chars().collect();
            for chunk in split_into_chunks(&text, &config) {
                let window: String = chars[chunk.start..chunk.end].iter().collect();
                prop_assert_eq!(window.trim(), chunk.text.as_str());
            }
        }
    }
}

fn arb_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim)
}

mod prop_index_ordering {
    use super::*;

    const DIM: usize = 8;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn results_are_best_first_and_bounded(
            vectors in proptest::collection::vec(arb_embedding(DIM), 1..20),
            query in arb_embedding(DIM),
            top_k in 1usize..25,
        ) {
            let embeddings: Vec<Embedding> = vectors.into_iter().map(Embedding::new).collect();
            let query = Embedding::new(query);
            let rt = tokio::runtime::Runtime::new().unwrap();

            let (exact, cosine) = rt.block_on(async {
                let mut exact = ExactIndex::new();
                exact.build(&embeddings).await.unwrap();
                let mut cosine = CosineIndex::new();
                cosine.build(&embeddings).await.unwrap();
                (
                    exact.search(&query, top_k).await.unwrap(),
                    cosine.search(&query, top_k).await.unwrap(),
                )
            });

            let expected = top_k.min(embeddings.len());
            prop_assert_eq!(exact.len(), expected);
            prop_assert_eq!(cosine.len(), expected);

            for results in [&exact, &cosine] {
                for pair in results.windows(2) {
                    prop_assert!(pair[0].score >= pair[1].score);
                }
            }
            for pair in cosine.windows(2) {
                if pair[0].score == pair[1].score {
                    prop_assert!(pair[0].position < pair[1].position);
                }
            }
            prop_assert!(exact.iter().all(|n| n.score > 0.0 && n.score <= 1.0));
        }
    }
}
