use crate::domain::{errors::DomainError, Embedding, Neighbor};
use async_trait::async_trait;

/// Nearest-neighbor index over the embeddings of one document.
///
/// Positions are the order in which vectors were passed to [`build`], which
/// is also the chunk order. Results are best-first, ties broken by position.
///
/// [`build`]: VectorIndex::build
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Replaces any previous contents. Fails on an empty slice or on vectors
    /// of differing dimension.
    async fn build(&mut self, embeddings: &[Embedding]) -> Result<(), DomainError>;

    /// Returns at most `top_k` neighbors; an unbuilt index returns none.
    async fn search(&self, query: &Embedding, top_k: usize)
        -> Result<Vec<Neighbor>, DomainError>;

    async fn clear(&mut self) -> Result<(), DomainError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn dimension(&self) -> Option<usize>;

    fn backend(&self) -> &'static str;
}
