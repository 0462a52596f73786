pub mod config;
pub mod embedding;
pub mod llm;
pub mod vector_index;

pub use config::{AppConfig, EmbeddingConfig, LlmConfig, PromptsConfig, RetrievalConfig};
pub use embedding::OpenAiEmbedding;
pub use llm::OpenAiLlm;
pub use vector_index::{CosineIndex, ExactIndex, IndexBackend, QdrantIndex};
