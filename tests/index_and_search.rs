//! End-to-end flow: register a project, run the semantic pipeline, query it
//! through the router. Uses a deterministic embedder so no model is ever
//! downloaded in CI.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use trawl::vector::{EmbeddingGenerator, VectorError, VectorStore, collection_name};
use trawl::{
    IndexError, IndexPipeline, ProjectRegistry, SearchMatch, SearchRouter, SearchType, Settings,
};

/// Deterministic stand-in for the fastembed generator: identical text maps to
/// identical vectors, so exact-body queries rank their own method first.
struct HashEmbedder;

impl EmbeddingGenerator for HashEmbedder {
    fn generate_embeddings(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, VectorError> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            let mut embedding = vec![0.1_f32; 8];
            for (i, byte) in text.bytes().enumerate() {
                embedding[i % 8] += f32::from(byte) / 255.0;
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
        8
    }
}

fn fixture_project() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/java_sample")
}

fn workspace_settings(workspace: &tempfile::TempDir) -> Arc<Settings> {
    let mut settings = Settings::default();
    settings.workspace_root = Some(workspace.path().to_path_buf());
    Arc::new(settings)
}

fn pipeline(settings: &Arc<Settings>) -> IndexPipeline {
    IndexPipeline::new(
        ProjectRegistry::open(&settings.registry_db_path()).unwrap(),
        VectorStore::new(settings.vector_path()),
        Arc::new(HashEmbedder),
    )
}

#[test]
fn register_index_and_search_round_trip() {
    let workspace = tempfile::tempdir().unwrap();
    let settings = workspace_settings(&workspace);

    let registry = ProjectRegistry::open(&settings.registry_db_path()).unwrap();
    registry.register("sample-java", &fixture_project()).unwrap();

    let report = pipeline(&settings).run("sample-java").unwrap();
    // Main.java has three method bodies; the Greeter interface method has no
    // body and is not a search target.
    assert_eq!(report.snippets_indexed, 3);
    assert_eq!(report.files_skipped, 0);
    assert!(registry.list().unwrap()[0].last_indexed_at.is_some());

    let router = SearchRouter::with_embedder(Arc::clone(&settings), Arc::new(HashEmbedder));
    let response = router
        .route("sample-java", SearchType::Semantic, "greeting text", 5)
        .unwrap();

    assert_eq!(response.results.len(), 3);
    assert_eq!(response.message, "Success");

    let mut last_distance = f32::MIN;
    let mut method_names = Vec::new();
    for result in &response.results {
        match result {
            SearchMatch::Semantic {
                metadata, distance, ..
            } => {
                assert!(*distance >= last_distance, "results must be ascending");
                last_distance = *distance;
                assert!(metadata.file_path.ends_with("Main.java"));
                assert_eq!(metadata.class_name.as_deref(), Some("Main"));
                method_names.push(metadata.method_name.clone());
            }
            other => panic!("expected semantic matches, got {other:?}"),
        }
    }
    method_names.sort();
    assert_eq!(method_names, vec!["greet", "helperMethod", "main"]);
}

#[test]
fn reindexing_keeps_collection_stable() {
    let workspace = tempfile::tempdir().unwrap();
    let settings = workspace_settings(&workspace);

    ProjectRegistry::open(&settings.registry_db_path())
        .unwrap()
        .register("sample-java", &fixture_project())
        .unwrap();

    pipeline(&settings).run("sample-java").unwrap();
    let report = pipeline(&settings).run("sample-java").unwrap();
    assert_eq!(report.snippets_indexed, 3);

    let query = HashEmbedder.generate_embeddings(&["anything"]).unwrap();
    let hits = VectorStore::new(settings.vector_path())
        .query(&collection_name("sample-java"), &query[0], 10)
        .unwrap();
    assert_eq!(hits.len(), 3, "reindexing must upsert, not append");
}

#[test]
fn project_without_sources_reports_no_source_files() {
    let workspace = tempfile::tempdir().unwrap();
    let empty_project = tempfile::tempdir().unwrap();
    let settings = workspace_settings(&workspace);

    let registry = ProjectRegistry::open(&settings.registry_db_path()).unwrap();
    registry.register("empty", empty_project.path()).unwrap();

    let err = pipeline(&settings).run("empty").unwrap_err();
    assert!(matches!(err, IndexError::NoSourceFiles { .. }));
    assert!(registry.list().unwrap()[0].last_indexed_at.is_none());
}
