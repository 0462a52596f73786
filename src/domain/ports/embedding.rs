use crate::domain::{errors::DomainError, Embedding};
use async_trait::async_trait;

#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError>;

    /// Dimension the provider's model produces, used to size placeholder
    /// vectors when no text in a batch could be embedded.
    fn dimension(&self) -> usize;
}
