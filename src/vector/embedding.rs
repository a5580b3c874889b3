//! Embedding generation for snippet bodies and queries.
//!
//! The trait boundary exists so the indexing pipeline and search router can be
//! exercised in tests without downloading a model.

use crate::vector::VectorError;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::path::Path;
use std::sync::Mutex;

/// Trait for generating embeddings from text.
///
/// Implementations must be thread-safe and handle batches efficiently.
pub trait EmbeddingGenerator: Send + Sync {
    /// Generate one embedding per input text, in input order.
    fn generate_embeddings(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, VectorError>;

    /// Dimension of the embeddings this generator produces.
    fn dimension(&self) -> usize;
}

/// fastembed-backed generator.
///
/// The model is resolved from its configured name; first use downloads it into
/// the configured cache directory.
pub struct FastEmbedGenerator {
    model: Mutex<TextEmbedding>,
    dimension: usize,
}

impl std::fmt::Debug for FastEmbedGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedGenerator")
            .field("dimension", &self.dimension)
            .finish()
    }
}

fn resolve_model(name: &str) -> Result<EmbeddingModel, VectorError> {
    match name {
        "AllMiniLML6V2" => Ok(EmbeddingModel::AllMiniLML6V2),
        "BGESmallENV15" => Ok(EmbeddingModel::BGESmallENV15),
        other => Err(VectorError::UnknownModel {
            model: other.to_string(),
        }),
    }
}

impl FastEmbedGenerator {
    /// Initialize the named model, downloading it on first use.
    pub fn new(model_name: &str, cache_dir: &Path) -> Result<Self, VectorError> {
        let model = resolve_model(model_name)?;
        let mut text_model = TextEmbedding::try_new(
            InitOptions::new(model)
                .with_cache_dir(cache_dir.to_path_buf())
                .with_show_download_progress(true),
        )
        .map_err(|e| {
            VectorError::ModelInit(format!(
                "{e}. Ensure you have an internet connection for the first-time model download"
            ))
        })?;

        // Probe the model once; fastembed does not expose the dimension
        // directly for every model variant.
        let probe = text_model
            .embed(vec!["probe".to_string()], None)
            .map_err(|e| VectorError::EmbeddingFailed(e.to_string()))?;
        let dimension = probe
            .into_iter()
            .next()
            .map(|v| v.len())
            .ok_or_else(|| VectorError::ModelInit("model produced no probe embedding".into()))?;

        Ok(Self {
            model: Mutex::new(text_model),
            dimension,
        })
    }
}

impl EmbeddingGenerator for FastEmbedGenerator {
    fn generate_embeddings(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, VectorError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let text_strings: Vec<String> = texts.iter().map(|&s| s.to_string()).collect();

        let embeddings = self
            .model
            .lock()
            .map_err(|_| {
                VectorError::EmbeddingFailed("embedding model lock poisoned".to_string())
            })?
            .embed(text_strings, None)
            .map_err(|e| VectorError::EmbeddingFailed(e.to_string()))?;

        for embedding in &embeddings {
            if embedding.len() != self.dimension {
                return Err(VectorError::DimensionMismatch {
                    expected: self.dimension,
                    actual: embedding.len(),
                });
            }
        }

        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Deterministic generator for tests. Embeddings are derived from text
/// content so similar inputs land near each other without any model.
#[cfg(test)]
pub struct MockEmbeddingGenerator {
    dimension: usize,
}

#[cfg(test)]
impl MockEmbeddingGenerator {
    pub fn new() -> Self {
        Self { dimension: 8 }
    }
}

#[cfg(test)]
impl EmbeddingGenerator for MockEmbeddingGenerator {
    fn generate_embeddings(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, VectorError> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            let mut embedding = vec![0.1_f32; self.dimension];
            for (i, byte) in text.bytes().enumerate() {
                embedding[i % self.dimension] += f32::from(byte) / 255.0;
            }
            let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
            for val in &mut embedding {
                *val /= magnitude;
            }
            embeddings.push(embedding);
        }
        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
