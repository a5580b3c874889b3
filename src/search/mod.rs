//! Search router: one entry point over the semantic, literal, and structural
//! backends.
//!
//! The router resolves the project name to its filesystem location once,
//! dispatches by modality, and maps every backend failure into [`SearchError`]
//! so no backend-specific error type escapes this boundary.

pub mod literal;
pub mod structural;

pub use literal::{LiteralMatch, LiteralOutcome, RipgrepSearcher, Submatch};
pub use structural::{QueryTooShort, StructuralMatch, SymbolQuery};

use crate::config::Settings;
use crate::error::{QueryResult, SearchError};
use crate::indexing::ScipIndexer;
use crate::parsing::SnippetMetadata;
use crate::registry::ProjectRegistry;
use crate::vector::{EmbeddingGenerator, FastEmbedGenerator, VectorError, VectorStore, collection_name};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

/// The search modality requested by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Semantic,
    Literal,
    Structural,
}

/// One match, tagged by modality; each variant carries only that modality's
/// well-typed fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SearchMatch {
    Semantic {
        document: String,
        metadata: SnippetMetadata,
        distance: f32,
    },
    Literal(LiteralMatch),
    Structural(StructuralMatch),
}

/// The normalized response envelope shared by all modalities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub search_type: SearchType,
    pub results: Vec<SearchMatch>,
    pub message: String,
}

/// Routes queries to the backend matching the requested modality.
pub struct SearchRouter {
    settings: Arc<Settings>,
    // The embedding model is expensive to load and only needed for semantic
    // queries, so it is initialized lazily and shared afterwards.
    embedder: Mutex<Option<Arc<dyn EmbeddingGenerator>>>,
}

impl std::fmt::Debug for SearchRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchRouter").finish_non_exhaustive()
    }
}

impl SearchRouter {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self {
            settings,
            embedder: Mutex::new(None),
        }
    }

    /// Construct with a preloaded embedding generator. Used by tests and by
    /// callers that already hold a model.
    pub fn with_embedder(settings: Arc<Settings>, embedder: Arc<dyn EmbeddingGenerator>) -> Self {
        Self {
            settings,
            embedder: Mutex::new(Some(embedder)),
        }
    }

    /// Execute one search against a registered project.
    pub fn route(
        &self,
        project_name: &str,
        search_type: SearchType,
        query: &str,
        top_k: usize,
    ) -> QueryResult<SearchResponse> {
        let registry = ProjectRegistry::open(&self.settings.registry_db_path())?;
        let project_root = registry.resolve(project_name)?;

        info!(project = project_name, ?search_type, query, "routing search");

        let results = match search_type {
            SearchType::Semantic => self.semantic(project_name, query, top_k)?,
            SearchType::Literal => self.literal(&project_root, query)?,
            SearchType::Structural => self.structural(project_name, &project_root, query)?,
        };

        Ok(SearchResponse {
            search_type,
            results,
            message: "Success".to_string(),
        })
    }

    fn embedder(&self) -> QueryResult<Arc<dyn EmbeddingGenerator>> {
        let mut slot = self
            .embedder
            .lock()
            .map_err(|_| SearchError::Internal("embedder lock poisoned".to_string()))?;
        if let Some(embedder) = slot.as_ref() {
            return Ok(Arc::clone(embedder));
        }
        let generator = FastEmbedGenerator::new(
            &self.settings.indexing.embedding_model,
            &self.settings.model_cache_path(),
        )?;
        let embedder: Arc<dyn EmbeddingGenerator> = Arc::new(generator);
        *slot = Some(Arc::clone(&embedder));
        Ok(embedder)
    }

    fn semantic(
        &self,
        project_name: &str,
        query: &str,
        top_k: usize,
    ) -> QueryResult<Vec<SearchMatch>> {
        let embedder = self.embedder()?;
        let mut embeddings = embedder.generate_embeddings(&[query])?;
        let query_embedding = embeddings
            .pop()
            .ok_or_else(|| SearchError::Internal("embedder returned no vector".to_string()))?;

        let store = VectorStore::new(self.settings.vector_path());
        let hits = store
            .query(&collection_name(project_name), &query_embedding, top_k)
            .map_err(|e| match e {
                VectorError::CollectionNotFound { .. } => SearchError::CollectionNotFound {
                    name: project_name.to_string(),
                },
                other => other.into(),
            })?;

        Ok(hits
            .into_iter()
            .map(|hit| SearchMatch::Semantic {
                document: hit.document,
                metadata: hit.metadata,
                distance: hit.distance,
            })
            .collect())
    }

    fn literal(&self, project_root: &Path, query: &str) -> QueryResult<Vec<SearchMatch>> {
        let searcher = RipgrepSearcher::new(self.settings.literal.bin.clone());
        match searcher.search(project_root, query) {
            LiteralOutcome::Matches(matches) => {
                Ok(matches.into_iter().map(SearchMatch::Literal).collect())
            }
            LiteralOutcome::NoMatches => Ok(Vec::new()),
            LiteralOutcome::ToolMissing => Err(SearchError::BackendUnavailable {
                tool: self.settings.literal.bin.clone(),
            }),
            LiteralOutcome::ToolError { code, stderr } => Err(SearchError::BackendProcessFailure {
                tool: self.settings.literal.bin.clone(),
                code,
                stderr,
            }),
        }
    }

    fn structural(
        &self,
        project_name: &str,
        project_root: &Path,
        query: &str,
    ) -> QueryResult<Vec<SearchMatch>> {
        let index_path = ScipIndexer::index_path(&self.settings.scip_index_dir(), project_name);
        let matches = structural::search(&index_path, project_root, query)?;
        Ok(matches.into_iter().map(SearchMatch::Structural).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::SnippetMetadata;
    use crate::vector::{MockEmbeddingGenerator, VectorRecord};
    use protobuf::Message;
    use scip::types::{Document, Index, Occurrence, SymbolRole};

    struct TestEnv {
        _workspace: tempfile::TempDir,
        project: tempfile::TempDir,
        settings: Arc<Settings>,
    }

    fn env() -> TestEnv {
        let workspace = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();

        let mut settings = Settings::default();
        settings.workspace_root = Some(workspace.path().to_path_buf());
        settings.literal.bin = "trawl-no-such-rg".to_string();
        let settings = Arc::new(settings);

        let registry = ProjectRegistry::open(&settings.registry_db_path()).unwrap();
        registry.register("demo", project.path()).unwrap();

        TestEnv {
            _workspace: workspace,
            project,
            settings,
        }
    }

    fn router(env: &TestEnv) -> SearchRouter {
        SearchRouter::with_embedder(
            Arc::clone(&env.settings),
            Arc::new(MockEmbeddingGenerator::new()),
        )
    }

    #[test]
    fn unknown_project_is_not_found_for_every_modality() {
        let env = env();
        let router = router(&env);
        for search_type in [SearchType::Semantic, SearchType::Literal, SearchType::Structural] {
            let err = router.route("ghost", search_type, "anything", 5).unwrap_err();
            assert!(matches!(err, SearchError::ProjectNotFound { name } if name == "ghost"));
        }
    }

    #[test]
    fn semantic_route_without_index_reports_collection_not_found() {
        let env = env();
        let err = router(&env)
            .route("demo", SearchType::Semantic, "greeting", 5)
            .unwrap_err();
        assert!(matches!(err, SearchError::CollectionNotFound { name } if name == "demo"));
    }

    #[test]
    fn semantic_route_returns_ranked_typed_matches() {
        let env = env();
        let embedder = MockEmbeddingGenerator::new();
        let embedding = |text: &str| {
            embedder.generate_embeddings(&[text]).unwrap().pop().unwrap()
        };

        let store = VectorStore::new(env.settings.vector_path());
        store
            .upsert(
                &collection_name("demo"),
                vec![
                    VectorRecord {
                        id: "fp-1".to_string(),
                        embedding: embedding("return \"Hello, \" + name;"),
                        document: "return \"Hello, \" + name;".to_string(),
                        metadata: SnippetMetadata {
                            file_path: "Main.java".to_string(),
                            class_name: Some("Main".to_string()),
                            method_name: "greet".to_string(),
                            parameters: None,
                            return_type: Some("String".to_string()),
                            start_line: 10,
                            end_line: 12,
                        },
                    },
                    VectorRecord {
                        id: "fp-2".to_string(),
                        embedding: embedding("int total = a + b;"),
                        document: "int total = a + b;".to_string(),
                        metadata: SnippetMetadata {
                            file_path: "Calc.java".to_string(),
                            class_name: Some("Calc".to_string()),
                            method_name: "add".to_string(),
                            parameters: None,
                            return_type: Some("int".to_string()),
                            start_line: 4,
                            end_line: 6,
                        },
                    },
                ],
            )
            .unwrap();

        let response = router(&env)
            .route("demo", SearchType::Semantic, "return \"Hello, \" + name;", 1)
            .unwrap();
        assert_eq!(response.results.len(), 1);
        match &response.results[0] {
            SearchMatch::Semantic {
                metadata, distance, ..
            } => {
                assert_eq!(metadata.method_name, "greet");
                assert!(*distance < 1e-6);
            }
            other => panic!("expected semantic match, got {other:?}"),
        }
    }

    #[test]
    fn literal_route_with_missing_tool_is_backend_unavailable() {
        let env = env();
        let err = router(&env)
            .route("demo", SearchType::Literal, "System.out", 5)
            .unwrap_err();
        assert!(matches!(err, SearchError::BackendUnavailable { tool } if tool == "trawl-no-such-rg"));
    }

    #[test]
    fn structural_route_reads_index_by_naming_convention() {
        let env = env();

        let mut occ = Occurrence::new();
        occ.symbol = "semanticdb maven maven/d/d 1.0 com/example/Main#greet().".to_string();
        occ.symbol_roles = SymbolRole::Definition as i32;
        occ.range = vec![25, 4, 30];
        let mut doc = Document::new();
        doc.relative_path = "src/Main.java".to_string();
        doc.occurrences.push(occ);
        let mut index = Index::new();
        index.documents.push(doc);

        let scip_dir = env.settings.scip_index_dir();
        std::fs::create_dir_all(&scip_dir).unwrap();
        std::fs::write(scip_dir.join("demo.scip"), index.write_to_bytes().unwrap()).unwrap();

        let response = router(&env)
            .route("demo", SearchType::Structural, "com.example.Main.greet", 5)
            .unwrap();
        assert_eq!(response.results.len(), 1);
        match &response.results[0] {
            SearchMatch::Structural(m) => {
                assert_eq!(m.start_line, 26);
                assert!(m.file_path.ends_with("src/Main.java"));
                let canonical_root = env.project.path().canonicalize().unwrap();
                assert!(m.file_path.starts_with(&canonical_root.display().to_string()));
            }
            other => panic!("expected structural match, got {other:?}"),
        }
    }

    #[test]
    fn structural_route_without_index_is_a_typed_error() {
        let env = env();
        let err = router(&env)
            .route("demo", SearchType::Structural, "com.example.Main.greet", 5)
            .unwrap_err();
        assert!(matches!(err, SearchError::StructuralIndexMissing { .. }));
    }
}
