//! Unit-of-search snippet and its content-addressed identity.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A method-like declaration extracted from a source file.
///
/// Line numbers are 1-based and refer to the method *body*, matching what the
/// vector store serves back as match locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub file_path: String,
    pub class_name: Option<String>,
    pub method_name: String,
    pub parameters: Option<String>,
    pub return_type: Option<String>,
    pub start_line: u32,
    pub end_line: u32,
    pub body: String,
}

/// The non-body fields of a snippet, stored as vector-record metadata and
/// returned with semantic matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetMetadata {
    pub file_path: String,
    pub class_name: Option<String>,
    pub method_name: String,
    pub parameters: Option<String>,
    pub return_type: Option<String>,
    pub start_line: u32,
    pub end_line: u32,
}

impl Snippet {
    /// Stable identity token for upserts.
    ///
    /// Hex SHA-256 of `file_path|class_name|method_name|start_line`, with an
    /// empty string for a missing class. Identity deliberately excludes the
    /// body: re-extracting an unchanged declaration at the same location maps
    /// to the same vector-store entry, and a changed body overwrites it.
    pub fn fingerprint(&self) -> String {
        let identity = format!(
            "{}|{}|{}|{}",
            self.file_path,
            self.class_name.as_deref().unwrap_or(""),
            self.method_name,
            self.start_line
        );
        let digest = Sha256::digest(identity.as_bytes());
        format!("{digest:x}")
    }

    pub fn metadata(&self) -> SnippetMetadata {
        SnippetMetadata {
            file_path: self.file_path.clone(),
            class_name: self.class_name.clone(),
            method_name: self.method_name.clone(),
            parameters: self.parameters.clone(),
            return_type: self.return_type.clone(),
            start_line: self.start_line,
            end_line: self.end_line,
        }
    }
}
