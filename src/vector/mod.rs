//! Vector search: embedding generation and per-project collection storage.

mod embedding;
mod store;

pub use embedding::{EmbeddingGenerator, FastEmbedGenerator};
pub use store::{SemanticHit, VectorRecord, VectorStore, collection_name};

#[cfg(test)]
pub use embedding::MockEmbeddingGenerator;

use thiserror::Error;

/// Errors from embedding generation and vector storage.
#[derive(Error, Debug)]
pub enum VectorError {
    #[error("failed to initialize embedding model: {0}")]
    ModelInit(String),

    #[error("unknown embedding model '{model}'. Supported: AllMiniLML6V2, BGESmallENV15")]
    UnknownModel { model: String },

    #[error("failed to generate embeddings: {0}")]
    EmbeddingFailed(String),

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("collection '{name}' does not exist")]
    CollectionNotFound { name: String },

    #[error("failed to read collection '{name}': {reason}")]
    CollectionRead { name: String, reason: String },

    #[error("failed to write collection '{name}': {reason}")]
    CollectionWrite { name: String, reason: String },
}
