//! Configuration module for trawl.
//!
//! Layered configuration:
//! - Default values
//! - `.trawl/settings.toml` (found by walking up from the current directory)
//! - Environment variable overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `TRAWL_` and use double
//! underscores to separate nested levels:
//! - `TRAWL_INDEXING__EMBEDDING_MODEL=BGESmallENV15` sets `indexing.embedding_model`
//! - `TRAWL_SERVER__BIND=0.0.0.0:9000` sets `server.bind`
//!
//! Settings are constructed once at process start and passed by reference into
//! each component; nothing reads configuration through global state.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Workspace root directory (where .trawl is located)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_root: Option<PathBuf>,

    /// Project registry settings
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Semantic indexing settings
    #[serde(default)]
    pub indexing: IndexingConfig,

    /// Literal search settings
    #[serde(default)]
    pub literal: LiteralConfig,

    /// Structural index settings
    #[serde(default)]
    pub structural: StructuralConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RegistryConfig {
    /// Path to the SQLite registry database
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IndexingConfig {
    /// Model to use for embeddings
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Directory holding per-project vector collections
    #[serde(default = "default_vector_path")]
    pub vector_path: PathBuf,

    /// Cache directory for downloaded embedding models
    #[serde(default = "default_model_cache_path")]
    pub model_cache_path: PathBuf,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LiteralConfig {
    /// The ripgrep binary to invoke
    #[serde(default = "default_ripgrep_bin")]
    pub bin: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StructuralConfig {
    /// Directory holding per-project SCIP index files
    #[serde(default = "default_scip_index_dir")]
    pub index_dir: PathBuf,

    /// The SCIP indexer binary to invoke for index-scip
    #[serde(default = "default_scip_bin")]
    pub indexer_bin: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    /// HTTP server bind address
    #[serde(default = "default_bind_address")]
    pub bind: String,

    /// Per-request timeout for blocking backend calls (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_db_path() -> PathBuf {
    PathBuf::from(".trawl/registry.db")
}
fn default_embedding_model() -> String {
    "AllMiniLML6V2".to_string()
}
fn default_vector_path() -> PathBuf {
    PathBuf::from(".trawl/vectors")
}
fn default_model_cache_path() -> PathBuf {
    PathBuf::from(".trawl/models")
}
fn default_ripgrep_bin() -> String {
    "rg".to_string()
}
fn default_scip_index_dir() -> PathBuf {
    PathBuf::from(".trawl/scip")
}
fn default_scip_bin() -> String {
    "scip-java".to_string()
}
fn default_bind_address() -> String {
    "127.0.0.1:8000".to_string()
}
fn default_request_timeout() -> u64 {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            workspace_root: None,
            registry: RegistryConfig::default(),
            indexing: IndexingConfig::default(),
            literal: LiteralConfig::default(),
            structural: StructuralConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            embedding_model: default_embedding_model(),
            vector_path: default_vector_path(),
            model_cache_path: default_model_cache_path(),
        }
    }
}

impl Default for LiteralConfig {
    fn default() -> Self {
        Self {
            bin: default_ripgrep_bin(),
        }
    }
}

impl Default for StructuralConfig {
    fn default() -> Self {
        Self {
            index_dir: default_scip_index_dir(),
            indexer_bin: default_scip_bin(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind_address(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(".trawl/settings.toml"));

        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(config_path))
            // Double underscore becomes a dot; single underscores stay inside
            // field names.
            .merge(Env::prefixed("TRAWL_").map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
            .extract()
            .map_err(Box::new)
            .map(|mut settings: Settings| {
                if settings.workspace_root.is_none() {
                    settings.workspace_root = Self::workspace_root();
                }
                settings
            })
    }

    /// Find the workspace settings file by looking for a .trawl directory,
    /// searching from the current directory up to the filesystem root.
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(".trawl");
            if config_dir.is_dir() {
                return Some(config_dir.join("settings.toml"));
            }
        }
        None
    }

    /// The directory containing the .trawl directory, if one exists above cwd.
    pub fn workspace_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        for ancestor in current.ancestors() {
            if ancestor.join(".trawl").is_dir() {
                return Some(ancestor.to_path_buf());
            }
        }
        None
    }

    /// Resolve a configured path against the workspace root when it is
    /// relative, so commands behave the same from any subdirectory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        match &self.workspace_root {
            Some(root) => root.join(path),
            None => path.to_path_buf(),
        }
    }

    /// Resolved path to the registry database.
    pub fn registry_db_path(&self) -> PathBuf {
        self.resolve_path(&self.registry.db_path)
    }

    /// Resolved directory for vector collections.
    pub fn vector_path(&self) -> PathBuf {
        self.resolve_path(&self.indexing.vector_path)
    }

    /// Resolved cache directory for embedding models.
    pub fn model_cache_path(&self) -> PathBuf {
        self.resolve_path(&self.indexing.model_cache_path)
    }

    /// Resolved directory for SCIP index files.
    pub fn scip_index_dir(&self) -> PathBuf {
        self.resolve_path(&self.structural.index_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_stable() {
        let settings = Settings::default();
        assert_eq!(settings.version, 1);
        assert_eq!(settings.registry.db_path, PathBuf::from(".trawl/registry.db"));
        assert_eq!(settings.indexing.embedding_model, "AllMiniLML6V2");
        assert_eq!(settings.literal.bin, "rg");
        assert_eq!(settings.structural.indexer_bin, "scip-java");
        assert_eq!(settings.server.request_timeout_secs, 30);
    }

    #[test]
    fn resolve_path_honors_workspace_root() {
        let mut settings = Settings::default();
        settings.workspace_root = Some(PathBuf::from("/workspace"));
        assert_eq!(
            settings.registry_db_path(),
            PathBuf::from("/workspace/.trawl/registry.db")
        );
        assert_eq!(
            settings.resolve_path(Path::new("/abs/path")),
            PathBuf::from("/abs/path")
        );
    }
}
