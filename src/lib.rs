//! Question answering over a single document with retrieval-augmented
//! generation.
//!
//! A [`Retriever`] splits a document into overlapping chunks, embeds them
//! through an [`EmbeddingService`](domain::ports::EmbeddingService) and
//! indexes the vectors; questions are then answered from the best-matching
//! excerpts.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{format_context, BuildReport, QuestionAnswerer, Retriever};
pub use domain::{DomainError, Result};
