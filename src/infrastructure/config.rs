use serde::Deserialize;
use std::path::Path;

use crate::application::services::DEFAULT_TOP_K;
use crate::domain::{ChunkingConfig, DomainError};
use crate::infrastructure::vector_index::IndexBackend;

pub const CONFIG_PATH_VAR: &str = "DOCQA_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "docqa.yaml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub prompts: PromptsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model: String,
    pub dimension: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    /// Used for image questions when `model` cannot read images.
    pub vision_model: String,
    pub temperature: f64,
    pub max_tokens: u64,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub enabled: bool,
    pub top_k: usize,
    pub backend: IndexBackend,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    pub system: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimension: 1536,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            vision_model: "gpt-4o".to_string(),
            temperature: 0.2,
            max_tokens: 2000,
            timeout_seconds: 120,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            top_k: DEFAULT_TOP_K,
            backend: IndexBackend::default(),
        }
    }
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            system: "You are an assistant that answers questions based on the content of the \
                     documents or images provided."
                .to_string(),
        }
    }
}

impl AppConfig {
    /// Reads the YAML file named by `DOCQA_CONFIG` (or `docqa.yaml` when it
    /// exists), applies environment overrides and validates the result.
    pub fn load() -> Result<Self, DomainError> {
        let path = std::env::var(CONFIG_PATH_VAR).ok();
        let mut config = match path.as_deref() {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(DEFAULT_CONFIG_PATH)?
            }
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DomainError::validation(format!("cannot read config {}: {e}", path.display()))
        })?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, DomainError> {
        serde_yaml::from_str(raw)
            .map_err(|e| DomainError::validation(format!("invalid config: {e}")))
    }

    /// Overrides fields from `lookup`, which maps an environment variable
    /// name to its value.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = lookup("EMBEDDING_MODEL") {
            self.embedding.model = model;
        }
        if let Some(model) = lookup("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(model) = lookup("LLM_VISION_MODEL") {
            self.llm.vision_model = model;
        }
        if let Some(top_k) = lookup("RAG_TOP_K") {
            self.retrieval.top_k = top_k.parse().map_err(|_| {
                DomainError::validation(format!("RAG_TOP_K is not a number: {top_k}"))
            })?;
        }
        if let Some(backend) = lookup("INDEX_BACKEND") {
            self.retrieval.backend = match backend.as_str() {
                "exact" => IndexBackend::Exact,
                "cosine" => IndexBackend::Cosine,
                "qdrant" => {
                    let url = lookup("QDRANT_URL")
                        .unwrap_or_else(|| "http://localhost:6334".to_string());
                    IndexBackend::qdrant(url)
                }
                other => {
                    return Err(DomainError::validation(format!(
                        "unknown INDEX_BACKEND: {other}"
                    )))
                }
            };
        } else if let Some(url) = lookup("QDRANT_URL") {
            self.retrieval.backend = IndexBackend::qdrant(url);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        self.chunking.validate()?;
        if self.retrieval.top_k == 0 {
            return Err(DomainError::validation("top_k must be greater than zero"));
        }
        if self.embedding.dimension == 0 {
            return Err(DomainError::validation(
                "embedding dimension must be greater than zero",
            ));
        }
        Ok(())
    }
}
