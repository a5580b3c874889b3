//! Structural search backend: symbol-definition lookup over a SCIP index.
//!
//! The index file is an immutable snapshot produced by the external indexer;
//! it is parsed fresh on every query. Callers needing repeated queries can
//! cache above this layer.

use crate::error::{QueryResult, SearchError};
use protobuf::Message;
use scip::types::{Index, SymbolRole};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

/// A definition site, with 1-based line and character numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralMatch {
    pub symbol: String,
    pub file_path: String,
    pub start_line: u32,
    pub start_character: u32,
    pub end_line: u32,
    pub end_character: u32,
}

/// A dotted query with fewer than two segments cannot name a type member.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "query '{query}' needs at least two dot-separated segments (e.g. 'com.example.Main.greet')"
)]
pub struct QueryTooShort {
    pub query: String,
}

/// A parsed dotted symbol query.
///
/// Grammar of the descriptor suffix it resolves to:
///
/// ```text
/// package := segment ('/' segment)*     // may be empty
/// suffix  := package '/' Type '#' method '().'
/// ```
///
/// The last query segment is taken as a method name, the second-to-last as
/// the enclosing type, and everything before that as the package path. SCIP
/// symbol strings carry a scheme/package/version prefix the caller does not
/// know, so matching is by suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolQuery {
    package: Vec<String>,
    type_name: String,
    method_name: String,
}

impl SymbolQuery {
    /// Parse a dotted query like `com.example.Main.greet`.
    ///
    /// At least two segments (type and method) are required; this is a hard
    /// floor of the heuristic, not configurable.
    pub fn parse(query: &str) -> Result<Self, QueryTooShort> {
        let segments: Vec<&str> = query.split('.').collect();
        if segments.len() < 2 {
            return Err(QueryTooShort {
                query: query.to_string(),
            });
        }

        let method_name = segments[segments.len() - 1].to_string();
        let type_name = segments[segments.len() - 2].to_string();
        let package = segments[..segments.len() - 2]
            .iter()
            .map(|s| s.to_string())
            .collect();

        Ok(Self {
            package,
            type_name,
            method_name,
        })
    }

    /// The descriptor suffix a matching SCIP symbol must end with.
    ///
    /// An empty package yields a leading `/`, which keeps a two-segment query
    /// from matching a longer type name by accident.
    pub fn descriptor_suffix(&self) -> String {
        format!(
            "{}/{}#{}().",
            self.package.join("/"),
            self.type_name,
            self.method_name
        )
    }
}

/// Scan a SCIP index for definitions matching a dotted query.
///
/// A too-short query yields an empty result, not an error. Occurrences whose
/// range encoding is neither 3 nor 4 integers are skipped as malformed. All
/// matches for an overloaded method share a descriptor suffix and are
/// returned unranked; disambiguation is the caller's concern.
pub fn search(
    index_path: &Path,
    project_root: &Path,
    query: &str,
) -> QueryResult<Vec<StructuralMatch>> {
    let query = match SymbolQuery::parse(query) {
        Ok(query) => query,
        Err(e) => {
            warn!(error = %e, "rejecting structural query");
            return Ok(Vec::new());
        }
    };
    let suffix = query.descriptor_suffix();

    let index = load_index(index_path)?;

    let mut results = Vec::new();
    for document in &index.documents {
        for occurrence in &document.occurrences {
            if occurrence.symbol_roles & (SymbolRole::Definition as i32) == 0 {
                continue;
            }
            if !occurrence.symbol.ends_with(&suffix) {
                continue;
            }
            let Some([start_line, start_character, end_line, end_character]) =
                decode_range(&occurrence.range)
            else {
                warn!(symbol = %occurrence.symbol, "skipping occurrence with malformed range");
                continue;
            };

            // The index is 0-based; report 1-based positions.
            results.push(StructuralMatch {
                symbol: occurrence.symbol.clone(),
                file_path: project_root
                    .join(&document.relative_path)
                    .display()
                    .to_string(),
                start_line: start_line + 1,
                start_character: start_character + 1,
                end_line: end_line + 1,
                end_character: end_character + 1,
            });
        }
    }
    Ok(results)
}

fn load_index(index_path: &Path) -> QueryResult<Index> {
    if !index_path.is_file() {
        return Err(SearchError::StructuralIndexMissing {
            path: index_path.to_path_buf(),
        });
    }
    let bytes = std::fs::read(index_path).map_err(|e| SearchError::StructuralIndexLoad {
        path: index_path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Index::parse_from_bytes(&bytes).map_err(|e| SearchError::StructuralIndexLoad {
        path: index_path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Decode a SCIP range into 0-based `[start_line, start_char, end_line,
/// end_char]`. Three-element ranges imply the end line equals the start line.
fn decode_range(range: &[i32]) -> Option<[u32; 4]> {
    let to_u32 = |v: i32| u32::try_from(v).ok();
    match *range {
        [sl, sc, el, ec] => Some([to_u32(sl)?, to_u32(sc)?, to_u32(el)?, to_u32(ec)?]),
        [sl, sc, ec] => Some([to_u32(sl)?, to_u32(sc)?, to_u32(sl)?, to_u32(ec)?]),
        _ => None,
    }
}
