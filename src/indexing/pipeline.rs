//! Semantic indexing pipeline.
//!
//! Composes file discovery, method extraction, embedding generation, and the
//! vector store into a batch refresh of one project's semantic index.

use crate::error::{IndexError, IndexResult};
use crate::indexing::{ProjectLocks, SourceWalker};
use crate::parsing::JavaParser;
use crate::registry::ProjectRegistry;
use crate::vector::{EmbeddingGenerator, VectorRecord, VectorStore, collection_name};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of a successful indexing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexReport {
    pub snippets_indexed: usize,
    pub files_processed: usize,
    pub files_skipped: usize,
}

pub struct IndexPipeline {
    registry: ProjectRegistry,
    store: VectorStore,
    embedder: Arc<dyn EmbeddingGenerator>,
    locks: ProjectLocks,
}

impl IndexPipeline {
    pub fn new(
        registry: ProjectRegistry,
        store: VectorStore,
        embedder: Arc<dyn EmbeddingGenerator>,
    ) -> Self {
        Self {
            registry,
            store,
            embedder,
            locks: ProjectLocks::new(),
        }
    }

    /// Refresh the semantic index for one registered project.
    ///
    /// All snippets from a file are embedded and upserted as one batch. A file
    /// that cannot be read or parsed is logged and skipped; one malformed
    /// source file must not block indexing of an entire project. The registry
    /// timestamp is updated once, after all files were attempted.
    pub fn run(&self, project_name: &str) -> IndexResult<IndexReport> {
        let _guard =
            self.locks
                .try_acquire(project_name)
                .ok_or_else(|| IndexError::IndexInProgress {
                    name: project_name.to_string(),
                })?;

        let root = self.registry.resolve(project_name)?;

        let files: Vec<PathBuf> = SourceWalker::new().walk(&root).collect();
        if files.is_empty() {
            return Err(IndexError::NoSourceFiles { root });
        }

        let collection = collection_name(project_name);
        let mut parser = JavaParser::new()?;
        let mut report = IndexReport {
            snippets_indexed: 0,
            files_processed: 0,
            files_skipped: 0,
        };

        for file in &files {
            let code = match std::fs::read_to_string(file) {
                Ok(code) => code,
                Err(e) => {
                    warn!(file = %file.display(), error = %e, "skipping unreadable file");
                    report.files_skipped += 1;
                    continue;
                }
            };

            let snippets = match parser.extract(&code, file) {
                Ok(snippets) => snippets,
                Err(e) => {
                    warn!(file = %file.display(), error = %e, "skipping unparseable file");
                    report.files_skipped += 1;
                    continue;
                }
            };

            report.files_processed += 1;
            if snippets.is_empty() {
                continue;
            }

            let bodies: Vec<&str> = snippets.iter().map(|s| s.body.as_str()).collect();
            let embeddings = self.embedder.generate_embeddings(&bodies)?;

            let records: Vec<VectorRecord> = snippets
                .iter()
                .zip(embeddings)
                .map(|(snippet, embedding)| VectorRecord {
                    id: snippet.fingerprint(),
                    embedding,
                    document: snippet.body.clone(),
                    metadata: snippet.metadata(),
                })
                .collect();

            let count = records.len();
            self.store.upsert(&collection, records)?;
            report.snippets_indexed += count;
            info!(file = %file.display(), methods = count, "indexed");
        }

        self.registry.touch(project_name)?;
        info!(
            project = project_name,
            snippets = report.snippets_indexed,
            "semantic index refreshed"
        );
        Ok(report)
    }
}
