mod answer;
mod context;
mod embedder;
mod retriever;

pub use answer::{excerpts_prompt, full_document_prompt, image_prompt, QuestionAnswerer};
pub use context::format_context;
pub use embedder::{substitute_failures, EmbeddedBatch, Embedder};
pub use retriever::{BuildReport, Retriever, DEFAULT_TOP_K};
