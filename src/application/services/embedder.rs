use std::sync::Arc;
use tracing::instrument;

use crate::domain::{ports::EmbeddingService, DomainError, Embedding};

/// Embeddings for a batch of texts, co-indexed with the input.
#[derive(Debug, Clone)]
pub struct EmbeddedBatch {
    pub embeddings: Vec<Embedding>,
    /// Positions whose embedding failed and were replaced by zero vectors.
    pub degraded: Vec<usize>,
    pub dimension: usize,
}

impl EmbeddedBatch {
    pub fn is_degraded(&self, position: usize) -> bool {
        self.degraded.binary_search(&position).is_ok()
    }
}

/// Replaces every failed outcome by a zero vector.
///
/// The batch dimension is that of the first successful embedding, or
/// `fallback_dimension` when nothing succeeded. A success with a different
/// dimension counts as a failure.
pub fn substitute_failures(
    outcomes: Vec<Result<Embedding, DomainError>>,
    fallback_dimension: usize,
) -> EmbeddedBatch {
    let dimension = outcomes
        .iter()
        .find_map(|o| o.as_ref().ok().map(Embedding::dimension))
        .unwrap_or(fallback_dimension);

    let mut embeddings = Vec::with_capacity(outcomes.len());
    let mut degraded = Vec::new();

    for (position, outcome) in outcomes.into_iter().enumerate() {
        let failure = match outcome {
            Ok(embedding) if embedding.dimension() == dimension => {
                embeddings.push(embedding);
                continue;
            }
            Ok(embedding) => DomainError::dimension_mismatch(dimension, embedding.dimension()),
            Err(e) => e,
        };

        tracing::warn!(position, error = %failure, "embedding failed, substituting zero vector");
        embeddings.push(Embedding::zeros(dimension));
        degraded.push(position);
    }

    EmbeddedBatch {
        embeddings,
        degraded,
        dimension,
    }
}

pub struct Embedder {
    service: Arc<dyn EmbeddingService>,
}

impl Embedder {
    pub fn new(service: Arc<dyn EmbeddingService>) -> Self {
        Self { service }
    }

    /// One provider request per text, in order.
    pub async fn embed_each(&self, texts: &[&str]) -> Vec<Result<Embedding, DomainError>> {
        let mut outcomes = Vec::with_capacity(texts.len());
        for text in texts {
            outcomes.push(self.service.embed(text).await);
        }
        outcomes
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    pub async fn embed_many(&self, texts: &[&str]) -> EmbeddedBatch {
        let outcomes = self.embed_each(texts).await;
        substitute_failures(outcomes, self.service.dimension())
    }

    /// Embeds a query. Failures propagate since a zero query matches nothing.
    pub async fn embed_one(&self, text: &str) -> Result<Embedding, DomainError> {
        self.service.embed(text).await
    }
}
