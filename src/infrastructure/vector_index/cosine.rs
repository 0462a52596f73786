use async_trait::async_trait;

use crate::domain::{ports::VectorIndex, DomainError, Embedding, Neighbor};

use super::{check_query, uniform_dimension};

/// Brute-force cosine scan. Used when no exact-distance backend is
/// available; vectors with zero norm score 0.0.
#[derive(Debug, Default)]
pub struct CosineIndex {
    vectors: Vec<Embedding>,
    dimension: Option<usize>,
}

impl CosineIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorIndex for CosineIndex {
    async fn build(&mut self, embeddings: &[Embedding]) -> Result<(), DomainError> {
        let dimension = uniform_dimension(embeddings)?;
        self.vectors = embeddings.to_vec();
        self.dimension = Some(dimension);
        Ok(())
    }

    async fn search(&self, query: &Embedding, top_k: usize) -> Result<Vec<Neighbor>, DomainError> {
        if !check_query(self.dimension, query)? {
            return Ok(Vec::new());
        }

        let mut results: Vec<Neighbor> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, embedding)| {
                Neighbor::new(position, query.cosine_similarity(embedding))
            })
            .collect();

        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(top_k);

        Ok(results)
    }

    async fn clear(&mut self) -> Result<(), DomainError> {
        self.vectors.clear();
        self.dimension = None;
        Ok(())
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    fn backend(&self) -> &'static str {
        "cosine"
    }
}
