use async_trait::async_trait;
use rig::client::{EmbeddingsClient, ProviderClient};
use rig::embeddings::EmbeddingModel;
use rig::providers::openai;

use crate::domain::{ports::EmbeddingService, DomainError, Embedding};
use crate::infrastructure::config::EmbeddingConfig;

const API_KEY_VAR: &str = "OPENAI_API_KEY";

pub struct OpenAiEmbedding {
    client: openai::Client,
    model: String,
    dimension: usize,
}

impl OpenAiEmbedding {
    /// Builds a client from `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self, DomainError> {
        let key_set = std::env::var(API_KEY_VAR).is_ok_and(|k| !k.is_empty());
        if !key_set {
            return Err(DomainError::validation(format!(
                "{API_KEY_VAR} environment variable not set"
            )));
        }

        let defaults = EmbeddingConfig::default();
        Ok(Self {
            client: openai::Client::from_env(),
            model: defaults.model,
            dimension: defaults.dimension,
        })
    }

    pub fn from_config(config: &EmbeddingConfig) -> Result<Self, DomainError> {
        Ok(Self::from_env()?
            .with_model(&config.model)
            .with_dimension(config.dimension))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }
}

#[async_trait]
impl EmbeddingService for OpenAiEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        tracing::debug!(model = %self.model, text_len = text.len(), "embedding text");

        let model = self.client.embedding_model(&self.model);
        let embedding = model
            .embed_text(text)
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        Ok(Embedding::new(
            embedding.vec.into_iter().map(|x| x as f32).collect(),
        ))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
