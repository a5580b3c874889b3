//! Java method extraction via tree-sitter.

use crate::error::{ParseError, ParseResult};
use crate::parsing::Snippet;
use std::path::Path;
use tree_sitter::{Node, Parser};

/// Extracts method snippets from Java source files.
pub struct JavaParser {
    parser: Parser,
}

impl std::fmt::Debug for JavaParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JavaParser")
            .field("language", &"Java")
            .finish()
    }
}

impl JavaParser {
    pub fn new() -> ParseResult<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_java::LANGUAGE.into())
            .map_err(|e| ParseError::ParserInit {
                language: "Java".to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self { parser })
    }

    /// Extract one snippet per method declaration that has both a name and a
    /// body. Abstract and interface declarations without bodies are not search
    /// targets and are skipped.
    pub fn extract(&mut self, code: &str, file_path: &Path) -> ParseResult<Vec<Snippet>> {
        let tree = self
            .parser
            .parse(code, None)
            .ok_or_else(|| ParseError::Unparseable {
                path: file_path.to_path_buf(),
            })?;

        let mut snippets = Vec::new();
        collect_methods(tree.root_node(), code, file_path, &mut snippets);
        Ok(snippets)
    }
}

fn collect_methods(node: Node, code: &str, file_path: &Path, out: &mut Vec<Snippet>) {
    if node.kind() == "method_declaration" {
        if let Some(snippet) = snippet_from_method(node, code, file_path) {
            out.push(snippet);
        }
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_methods(child, code, file_path, out);
    }
}

fn snippet_from_method(node: Node, code: &str, file_path: &Path) -> Option<Snippet> {
    // Both a name and a body are required for a declaration to be indexable.
    let name_node = node.child_by_field_name("name")?;
    let body_node = node.child_by_field_name("body")?;

    let parameters = node
        .child_by_field_name("parameters")
        .map(|n| node_text(n, code).to_string());
    let return_type = node
        .child_by_field_name("type")
        .map(|n| node_text(n, code).to_string());

    Some(Snippet {
        file_path: file_path.display().to_string(),
        class_name: enclosing_class_name(node, code),
        method_name: node_text(name_node, code).to_string(),
        parameters,
        return_type,
        start_line: body_node.start_position().row as u32 + 1,
        end_line: body_node.end_position().row as u32 + 1,
        body: node_text(body_node, code).to_string(),
    })
}

/// Walk ancestor nodes until a class declaration is found. A method outside
/// any class (or inside an anonymous one) has no recorded container.
fn enclosing_class_name(node: Node, code: &str) -> Option<String> {
    let mut parent = node.parent();
    while let Some(p) = parent {
        if p.kind() == "class_declaration" {
            return p
                .child_by_field_name("name")
                .map(|n| node_text(n, code).to_string());
        }
        parent = p.parent();
    }
    None
}

fn node_text<'a>(node: Node, code: &'a str) -> &'a str {
    &code[node.byte_range()]
}
