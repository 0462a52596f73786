use std::sync::Arc;
use tracing::instrument;

use crate::application::services::context::format_context;
use crate::application::services::embedder::Embedder;
use crate::domain::{
    ports::{EmbeddingService, VectorIndex},
    split_into_chunks, Chunk, ChunkingConfig, DomainError, Embedding, Neighbor, SearchResult,
};
use crate::infrastructure::vector_index::IndexBackend;

pub const DEFAULT_TOP_K: usize = 3;

/// Summary of a successful [`Retriever::build_index`].
#[derive(Debug, Clone, PartialEq)]
pub struct BuildReport {
    pub chunks: usize,
    pub dimension: usize,
    pub degraded: Vec<usize>,
    pub backend: &'static str,
}

struct IndexedDocument {
    chunks: Vec<Chunk>,
    embeddings: Vec<Embedding>,
    degraded: Vec<usize>,
    index: Box<dyn VectorIndex>,
}

/// Chunk, embed and index one document, then answer similarity queries
/// against it.
///
/// The retriever owns its index. `build_index` and `reset` take `&mut self`,
/// so callers sharing one retriever must serialize builds against searches
/// themselves, e.g. behind a `tokio::sync::RwLock`.
pub struct Retriever {
    embedder: Embedder,
    chunking: ChunkingConfig,
    backend: IndexBackend,
    state: Option<IndexedDocument>,
}

impl Retriever {
    /// Fails when `chunking` does not pass [`ChunkingConfig::validate`].
    pub fn new(
        embedding: Arc<dyn EmbeddingService>,
        chunking: ChunkingConfig,
        backend: IndexBackend,
    ) -> Result<Self, DomainError> {
        chunking.validate()?;
        Ok(Self {
            embedder: Embedder::new(embedding),
            chunking,
            backend,
            state: None,
        })
    }

    pub fn with_defaults(embedding: Arc<dyn EmbeddingService>) -> Self {
        Self {
            embedder: Embedder::new(embedding),
            chunking: ChunkingConfig::default(),
            backend: IndexBackend::default(),
            state: None,
        }
    }

    /// Replaces any previous document with `document_text`.
    ///
    /// Texts that fail to embed are indexed as zero vectors and reported in
    /// [`BuildReport::degraded`]. On error the previous index is kept.
    #[instrument(skip(self, document_text), fields(len = document_text.len()))]
    pub async fn build_index(&mut self, document_text: &str) -> Result<BuildReport, DomainError> {
        let chunks = split_into_chunks(document_text, &self.chunking);
        if chunks.is_empty() {
            return Err(DomainError::EmptyDocument);
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let batch = self.embedder.embed_many(&texts).await;

        let mut index = self.backend.create().await;
        index.build(&batch.embeddings).await?;

        let report = BuildReport {
            chunks: chunks.len(),
            dimension: batch.dimension,
            degraded: batch.degraded.clone(),
            backend: index.backend(),
        };

        let previous = self.state.replace(IndexedDocument {
            chunks,
            embeddings: batch.embeddings,
            degraded: batch.degraded,
            index,
        });
        if let Some(previous) = previous {
            release(previous).await;
        }

        tracing::info!(
            chunks = report.chunks,
            dimension = report.dimension,
            degraded = report.degraded.len(),
            backend = report.backend,
            "index built"
        );
        Ok(report)
    }

    /// Returns up to `top_k` chunks best-first. Empty when nothing is built.
    #[instrument(skip(self, query))]
    pub async fn search(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let Some(state) = &self.state else {
            return Ok(Vec::new());
        };
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed_one(query).await?;

        // Over-fetch so demoting degraded chunks cannot push valid ones out.
        let fetch = top_k
            .saturating_add(state.degraded.len())
            .min(state.chunks.len());
        let neighbors = state.index.search(&query_embedding, fetch).await?;

        let results = demote_degraded(neighbors, &state.degraded, top_k)
            .into_iter()
            .map(|n| {
                state
                    .chunks
                    .get(n.position)
                    .map(|chunk| SearchResult::new(&chunk.text, n.score))
                    .ok_or_else(|| {
                        DomainError::internal(format!(
                            "index returned unknown position {}",
                            n.position
                        ))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(results = results.len(), "search completed");
        Ok(results)
    }

    /// `search` rendered as prompt-ready excerpts.
    pub async fn get_context(&self, question: &str, top_k: usize) -> Result<String, DomainError> {
        let results = self.search(question, top_k).await?;
        Ok(format_context(&results))
    }

    /// Drops the current document. Searching afterwards yields nothing until
    /// the next successful build.
    pub async fn reset(&mut self) {
        if let Some(state) = self.state.take() {
            release(state).await;
            tracing::info!("retriever reset");
        }
    }

    pub fn is_built(&self) -> bool {
        self.state.is_some()
    }

    pub fn chunks(&self) -> &[Chunk] {
        self.state
            .as_ref()
            .map(|s| s.chunks.as_slice())
            .unwrap_or_default()
    }

    pub fn embeddings(&self) -> &[Embedding] {
        self.state
            .as_ref()
            .map(|s| s.embeddings.as_slice())
            .unwrap_or_default()
    }

    pub fn degraded(&self) -> &[usize] {
        self.state
            .as_ref()
            .map(|s| s.degraded.as_slice())
            .unwrap_or_default()
    }

    pub fn index_len(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.index.len())
    }
}

async fn release(mut state: IndexedDocument) {
    if let Err(e) = state.index.clear().await {
        tracing::warn!(error = %e, backend = state.index.backend(), "failed to release index");
    }
}

/// Moves degraded positions behind every other neighbor and caps their score
/// at the lowest non-degraded score (or 0.0 if that is higher).
fn demote_degraded(neighbors: Vec<Neighbor>, degraded: &[usize], top_k: usize) -> Vec<Neighbor> {
    if degraded.is_empty() {
        let mut neighbors = neighbors;
        neighbors.truncate(top_k);
        return neighbors;
    }

    let (mut ranked, demoted): (Vec<Neighbor>, Vec<Neighbor>) = neighbors
        .into_iter()
        .partition(|n| degraded.binary_search(&n.position).is_err());

    let floor = ranked.last().map_or(0.0, |n| n.score.min(0.0));
    ranked.extend(
        demoted
            .into_iter()
            .map(|n| Neighbor::new(n.position, n.score.min(floor))),
    );
    ranked.truncate(top_k);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demote_moves_degraded_last() {
        let neighbors = vec![
            Neighbor::new(1, 0.9),
            Neighbor::new(0, 0.5),
            Neighbor::new(2, 0.4),
        ];
        let out = demote_degraded(neighbors, &[1], 3);

        let positions: Vec<usize> = out.iter().map(|n| n.position).collect();
        assert_eq!(positions, vec![0, 2, 1]);
        assert_eq!(out[2].score, 0.0);
    }

    #[test]
    fn test_demote_respects_negative_scores() {
        let neighbors = vec![Neighbor::new(0, 0.0), Neighbor::new(1, -0.3)];
        let out = demote_degraded(neighbors, &[0], 2);

        assert_eq!(out[0].position, 1);
        assert_eq!(out[1].position, 0);
        assert!(out[1].score <= out[0].score);
    }

    #[test]
    fn test_demote_truncates() {
        let neighbors = vec![
            Neighbor::new(0, 0.9),
            Neighbor::new(1, 0.8),
            Neighbor::new(2, 0.7),
        ];
        assert_eq!(demote_degraded(neighbors.clone(), &[], 2).len(), 2);

        let out = demote_degraded(neighbors, &[0], 2);
        let positions: Vec<usize> = out.iter().map(|n| n.position).collect();
        assert_eq!(positions, vec![1, 2]);
    }
}
