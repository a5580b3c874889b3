//! trawl — multi-modal code search.
//!
//! Register source projects once, then query them three ways: semantically
//! (embedding similarity over method bodies), literally (ripgrep), or
//! structurally (symbol definitions from a SCIP index). The registry gives
//! every project a stable identity; the router resolves that identity to a
//! filesystem location and dispatches to the backend for the requested
//! modality.

pub mod config;
pub mod error;
pub mod indexing;
pub mod io;
pub mod parsing;
pub mod registry;
pub mod search;
pub mod server;
pub mod vector;

// Explicit exports for better API clarity
pub use config::Settings;
pub use error::{
    IndexError, IndexResult, ParseError, ParseResult, QueryResult, RegistryError, RegistryResult,
    SearchError,
};
pub use indexing::{IndexPipeline, IndexReport};
pub use parsing::{JavaParser, Snippet, SnippetMetadata};
pub use registry::{Project, ProjectRegistry};
pub use search::{SearchMatch, SearchResponse, SearchRouter, SearchType};
