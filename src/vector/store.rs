//! File-backed vector collections, one per project.
//!
//! A collection is a single JSON file keyed by snippet fingerprint, so an
//! index run upserts: unchanged declarations overwrite themselves, changed
//! bodies replace the stored document under the same id. Queries are a
//! brute-force cosine scan — collections hold one record per method, which
//! stays comfortably small for the project sizes the registry serves.

use crate::parsing::SnippetMetadata;
use crate::vector::VectorError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One stored snippet: identity, embedding, document text, typed metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub embedding: Vec<f32>,
    pub document: String,
    pub metadata: SnippetMetadata,
}

/// A semantic query hit, ascending distance = best first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticHit {
    pub document: String,
    pub metadata: SnippetMetadata,
    pub distance: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct CollectionFile {
    dimension: usize,
    records: BTreeMap<String, VectorRecord>,
}

/// Deterministic, store-safe collection name for a project.
///
/// Project names are unique in the registry, so sanitizing characters that
/// are unsafe in file names keeps the mapping collision-resistant.
pub fn collection_name(project_name: &str) -> String {
    let sanitized: String = project_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    format!("snippets-{sanitized}")
}

/// Directory of per-project collection files.
#[derive(Debug, Clone)]
pub struct VectorStore {
    root: PathBuf,
}

impl VectorStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.root.join(format!("{collection}.json"))
    }

    /// Insert or replace records by id, creating the collection on first use.
    pub fn upsert(&self, collection: &str, records: Vec<VectorRecord>) -> Result<(), VectorError> {
        if records.is_empty() {
            return Ok(());
        }

        let dimension = records[0].embedding.len();
        let mut data = match self.load(collection) {
            Ok(data) => data,
            Err(VectorError::CollectionNotFound { .. }) => CollectionFile {
                dimension,
                records: BTreeMap::new(),
            },
            Err(other) => return Err(other),
        };

        for record in records {
            if record.embedding.len() != data.dimension {
                return Err(VectorError::DimensionMismatch {
                    expected: data.dimension,
                    actual: record.embedding.len(),
                });
            }
            data.records.insert(record.id.clone(), record);
        }

        self.save(collection, &data)
    }

    /// Rank all records in the collection against the query vector.
    ///
    /// Returns `CollectionNotFound` for a collection that was never indexed —
    /// callers need to tell "never indexed" apart from "indexed, no match".
    pub fn query(
        &self,
        collection: &str,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SemanticHit>, VectorError> {
        let data = self.load(collection)?;

        if query_embedding.len() != data.dimension {
            return Err(VectorError::DimensionMismatch {
                expected: data.dimension,
                actual: query_embedding.len(),
            });
        }

        let mut hits: Vec<SemanticHit> = data
            .records
            .into_values()
            .map(|record| SemanticHit {
                distance: cosine_distance(query_embedding, &record.embedding),
                document: record.document,
                metadata: record.metadata,
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(top_k);
        Ok(hits)
    }

    /// Whether the collection exists on disk.
    pub fn exists(&self, collection: &str) -> bool {
        self.collection_path(collection).is_file()
    }

    fn load(&self, collection: &str) -> Result<CollectionFile, VectorError> {
        let path = self.collection_path(collection);
        if !path.is_file() {
            return Err(VectorError::CollectionNotFound {
                name: collection.to_string(),
            });
        }
        let bytes = std::fs::read(&path).map_err(|e| VectorError::CollectionRead {
            name: collection.to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_slice(&bytes).map_err(|e| VectorError::CollectionRead {
            name: collection.to_string(),
            reason: e.to_string(),
        })
    }

    fn save(&self, collection: &str, data: &CollectionFile) -> Result<(), VectorError> {
        let write_err = |e: std::io::Error| VectorError::CollectionWrite {
            name: collection.to_string(),
            reason: e.to_string(),
        };

        std::fs::create_dir_all(&self.root).map_err(write_err)?;

        let bytes = serde_json::to_vec(data).map_err(|e| VectorError::CollectionWrite {
            name: collection.to_string(),
            reason: e.to_string(),
        })?;

        // Write-then-rename so a crashed run never leaves a torn collection.
        let path = self.collection_path(collection);
        let tmp = self.root.join(format!("{collection}.json.tmp"));
        std::fs::write(&tmp, bytes).map_err(write_err)?;
        std::fs::rename(&tmp, &path).map_err(write_err)?;
        Ok(())
    }
}

fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a == 0.0 || mag_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (mag_a * mag_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(method: &str, start_line: u32) -> SnippetMetadata {
        SnippetMetadata {
            file_path: "/proj/Main.java".to_string(),
            class_name: Some("Main".to_string()),
            method_name: method.to_string(),
            parameters: None,
            return_type: None,
            start_line,
            end_line: start_line + 2,
        }
    }

    fn record(id: &str, embedding: Vec<f32>, document: &str) -> VectorRecord {
        VectorRecord {
            id: id.to_string(),
            embedding,
            document: document.to_string(),
            metadata: metadata(id, 1),
        }
    }

    #[test]
    fn collection_names_are_sanitized_and_deterministic() {
        assert_eq!(collection_name("demo"), "snippets-demo");
        assert_eq!(collection_name("my.proj/v2"), "snippets-my-proj-v2");
        assert_eq!(collection_name("my.proj/v2"), collection_name("my.proj/v2"));
    }

    #[test]
    fn query_missing_collection_is_explicit() {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::new(dir.path().to_path_buf());
        let err = store.query("snippets-ghost", &[1.0, 0.0], 5).unwrap_err();
        assert!(matches!(err, VectorError::CollectionNotFound { .. }));
    }

    #[test]
    fn upsert_then_query_ranks_by_distance() {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::new(dir.path().to_path_buf());

        store
            .upsert(
                "snippets-demo",
                vec![
                    record("a", vec![1.0, 0.0], "exact match"),
                    record("b", vec![0.0, 1.0], "orthogonal"),
                    record("c", vec![0.7, 0.7], "diagonal"),
                ],
            )
            .unwrap();

        let hits = store.query("snippets-demo", &[1.0, 0.0], 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].document, "exact match");
        assert!(hits[0].distance < 1e-6);
        assert_eq!(hits[1].document, "diagonal");
        assert!(hits[0].distance <= hits[1].distance);
    }

    #[test]
    fn upsert_overwrites_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::new(dir.path().to_path_buf());

        store
            .upsert("snippets-demo", vec![record("a", vec![1.0, 0.0], "old body")])
            .unwrap();
        store
            .upsert("snippets-demo", vec![record("a", vec![1.0, 0.0], "new body")])
            .unwrap();

        let hits = store.query("snippets-demo", &[1.0, 0.0], 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document, "new body");
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::new(dir.path().to_path_buf());

        store
            .upsert("snippets-demo", vec![record("a", vec![1.0, 0.0], "doc")])
            .unwrap();

        let err = store
            .upsert("snippets-demo", vec![record("b", vec![1.0, 0.0, 0.0], "doc")])
            .unwrap_err();
        assert!(matches!(err, VectorError::DimensionMismatch { .. }));

        let err = store.query("snippets-demo", &[1.0, 0.0, 0.0], 5).unwrap_err();
        assert!(matches!(err, VectorError::DimensionMismatch { .. }));
    }
}
