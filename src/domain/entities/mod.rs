mod document;
mod embedding;
mod image;

pub use document::{split_into_chunks, Chunk, ChunkingConfig, Neighbor, SearchResult};
pub use embedding::Embedding;
pub use image::{ImageFormat, ImageInput};
