//! Application layer - Use cases and orchestration.
//!
//! Services here depend on domain ports (traits) rather than concrete
//! providers: the retriever builds and queries a document index, the
//! question answerer turns retrieved context into an LLM prompt.

pub mod services;

pub use services::{format_context, BuildReport, Embedder, QuestionAnswerer, Retriever};
