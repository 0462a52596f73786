mod cosine;
mod exact;
mod qdrant;

pub use cosine::CosineIndex;
pub use exact::{distance_to_score, ExactIndex};
pub use qdrant::QdrantIndex;

use serde::{Deserialize, Serialize};

use crate::domain::{ports::VectorIndex, DomainError, Embedding};

/// Which index implementation a retriever builds into.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndexBackend {
    /// In-process exact squared-L2 search.
    #[default]
    Exact,
    /// In-process cosine scan.
    Cosine,
    /// Exact Euclidean search on a Qdrant server, falling back to
    /// [`IndexBackend::Cosine`] when the server cannot be reached.
    Qdrant {
        url: String,
        #[serde(default = "default_collection_prefix")]
        collection_prefix: String,
    },
}

fn default_collection_prefix() -> String {
    "docqa".to_string()
}

impl IndexBackend {
    pub fn qdrant(url: impl Into<String>) -> Self {
        Self::Qdrant {
            url: url.into(),
            collection_prefix: default_collection_prefix(),
        }
    }

    /// Creates an empty index for this backend.
    pub async fn create(&self) -> Box<dyn VectorIndex> {
        match self {
            Self::Exact => Box::new(ExactIndex::new()),
            Self::Cosine => Box::new(CosineIndex::new()),
            Self::Qdrant {
                url,
                collection_prefix,
            } => match QdrantIndex::connect(url, collection_prefix).await {
                Ok(index) => Box::new(index),
                Err(e) => {
                    tracing::warn!(error = %e, "qdrant unavailable, falling back to cosine index");
                    Box::new(CosineIndex::new())
                }
            },
        }
    }
}

/// Returns the shared dimension of `embeddings`.
pub(crate) fn uniform_dimension(embeddings: &[Embedding]) -> Result<usize, DomainError> {
    let first = embeddings.first().ok_or(DomainError::EmptyIndex)?;
    let dimension = first.dimension();

    if let Some(other) = embeddings.iter().find(|e| e.dimension() != dimension) {
        return Err(DomainError::dimension_mismatch(dimension, other.dimension()));
    }

    Ok(dimension)
}

/// `Ok(false)` when the index is unbuilt, an error when the query does not
/// match the index dimension.
pub(crate) fn check_query(
    dimension: Option<usize>,
    query: &Embedding,
) -> Result<bool, DomainError> {
    match dimension {
        None => Ok(false),
        Some(d) if d != query.dimension() => {
            Err(DomainError::dimension_mismatch(d, query.dimension()))
        }
        Some(_) => Ok(true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_local_backends() {
        assert_eq!(IndexBackend::Exact.create().await.backend(), "exact");
        assert_eq!(IndexBackend::Cosine.create().await.backend(), "cosine");
        assert_eq!(IndexBackend::default(), IndexBackend::Exact);
    }

    #[tokio::test]
    async fn test_unreachable_qdrant_falls_back_to_cosine() {
        let backend = IndexBackend::qdrant("http://127.0.0.1:1");
        assert_eq!(backend.create().await.backend(), "cosine");
    }

    #[test]
    fn test_backend_from_yaml() {
        let backend: IndexBackend = serde_yaml::from_str("kind: cosine").unwrap();
        assert_eq!(backend, IndexBackend::Cosine);

        let backend: IndexBackend =
            serde_yaml::from_str("kind: qdrant\nurl: http://localhost:6334").unwrap();
        assert_eq!(backend, IndexBackend::qdrant("http://localhost:6334"));
    }

    #[test]
    fn test_uniform_dimension() {
        assert!(matches!(uniform_dimension(&[]), Err(DomainError::EmptyIndex)));
        let same = [Embedding::zeros(3), Embedding::zeros(3)];
        assert_eq!(uniform_dimension(&same).unwrap(), 3);
    }
}
