use async_trait::async_trait;

use crate::domain::{ports::VectorIndex, DomainError, Embedding, Neighbor};

use super::{check_query, uniform_dimension};

/// Converts a squared Euclidean distance into a score in (0, 1].
pub fn distance_to_score(distance: f32) -> f32 {
    1.0 / (1.0 + distance)
}

/// Flat index answering exact squared-L2 nearest-neighbor queries.
#[derive(Debug, Default)]
pub struct ExactIndex {
    vectors: Vec<Embedding>,
    dimension: Option<usize>,
}

impl ExactIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorIndex for ExactIndex {
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

        let mut distances: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, embedding)| (position, query.squared_distance(embedding)))
            .collect();

        distances.sort_by(|a, b| a.1.total_cmp(&b.1));

        Ok(distances
            .into_iter()
            .take(top_k)
            .map(|(position, distance)| Neighbor::new(position, distance_to_score(distance)))
            .collect())
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
        "exact"
    }
}
