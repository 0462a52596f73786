use async_trait::async_trait;
use qdrant_client::qdrant::{
    point_id::PointIdOptions, CreateCollectionBuilder, Distance, PointStruct, ScoredPoint,
    SearchParamsBuilder, SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use uuid::Uuid;

use crate::domain::{ports::VectorIndex, DomainError, Embedding, Neighbor};

use super::exact::distance_to_score;
use super::{check_query, uniform_dimension};

/// Qdrant reports the plain Euclidean distance for `Distance::Euclid`; the
/// in-memory exact index scores the squared distance, so square it first.
fn euclid_score(distance: f32) -> f32 {
    distance_to_score(distance * distance)
}

/// Exact Euclidean search delegated to a Qdrant server.
///
/// Every build goes into a fresh collection named `{prefix}-{uuid}`; the
/// previous collection is dropped once the new one is populated.
pub struct QdrantIndex {
    client: Qdrant,
    prefix: String,
    collection: Option<String>,
    len: usize,
    dimension: Option<usize>,
}

impl QdrantIndex {
    /// Connects and verifies the server answers a health check.
    pub async fn connect(url: &str, prefix: &str) -> Result<Self, DomainError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| DomainError::external(e.to_string()))?;

        client
            .health_check()
            .await
            .map_err(|e| DomainError::external(format!("Qdrant unavailable at {url}: {e}")))?;

        Ok(Self {
            client,
            prefix: prefix.to_string(),
            collection: None,
            len: 0,
            dimension: None,
        })
    }

    async fn drop_collection(&self, name: &str) -> Result<(), DomainError> {
        self.client
            .delete_collection(name)
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;
        Ok(())
    }

    async fn populate(&self, name: &str, embeddings: &[Embedding]) -> Result<(), DomainError> {
        let dimension = embeddings.first().map(Embedding::dimension).unwrap_or_default();

        self.client
            .create_collection(
                CreateCollectionBuilder::new(name)
                    .vectors_config(VectorParamsBuilder::new(dimension as u64, Distance::Euclid)),
            )
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        // Point ids are the positions, so no payload is stored.
        let points: Vec<PointStruct> = embeddings
            .iter()
            .enumerate()
            .map(|(position, embedding)| {
                PointStruct::new(
                    position as u64,
                    embedding.as_slice().to_vec(),
                    Payload::new(),
                )
            })
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(name, points).wait(true))
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        Ok(())
    }

    fn point_position(point: &ScoredPoint) -> Option<usize> {
        match point.id.as_ref()?.point_id_options.as_ref()? {
            PointIdOptions::Num(n) => Some(*n as usize),
            PointIdOptions::Uuid(_) => None,
        }
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn build(&mut self, embeddings: &[Embedding]) -> Result<(), DomainError> {
        let dimension = uniform_dimension(embeddings)?;
        let name = format!("{}-{}", self.prefix, Uuid::new_v4());

        if let Err(e) = self.populate(&name, embeddings).await {
            // The collection may not exist yet.
            if let Err(cleanup) = self.drop_collection(&name).await {
                tracing::debug!(
                    collection = %name,
                    error = %cleanup,
                    "failed to drop partial collection"
                );
            }
            return Err(e);
        }

        if let Some(previous) = self.collection.replace(name) {
            if let Err(e) = self.drop_collection(&previous).await {
                tracing::warn!(
                    collection = %previous,
                    error = %e,
                    "failed to drop previous collection"
                );
            }
        }
        self.len = embeddings.len();
        self.dimension = Some(dimension);

        Ok(())
    }

    async fn search(&self, query: &Embedding, top_k: usize) -> Result<Vec<Neighbor>, DomainError> {
        let Some(collection) = self.collection.as_deref() else {
            return Ok(Vec::new());
        };
        if top_k == 0 || !check_query(self.dimension, query)? {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(collection, query.as_slice().to_vec(), top_k as u64)
                    .params(SearchParamsBuilder::default().exact(true)),
            )
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        let mut neighbors: Vec<Neighbor> = response
            .result
            .iter()
            .filter_map(|point| {
                let position = Self::point_position(point)?;
                Some(Neighbor::new(position, euclid_score(point.score)))
            })
            .collect();

        neighbors.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.position.cmp(&b.position))
        });

        Ok(neighbors)
    }

    async fn clear(&mut self) -> Result<(), DomainError> {
        self.len = 0;
        self.dimension = None;
        match self.collection.take() {
            Some(name) => self.drop_collection(&name).await,
            None => Ok(()),
        }
    }

    fn len(&self) -> usize {
        self.len
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    fn backend(&self) -> &'static str {
        "qdrant"
    }
}
