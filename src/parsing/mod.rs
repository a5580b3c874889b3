//! Source parsing and snippet extraction.

mod java;
mod snippet;

pub use java::JavaParser;
pub use snippet::{Snippet, SnippetMetadata};
