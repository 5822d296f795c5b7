//! Static discovery of type declarations in Rust source text.
//!
//! Files are parsed with tree-sitter, never compiled or loaded. Only
//! module-level `struct`, `enum`, `union` and `trait` items count as
//! declarations; names that merely appear in paths or expressions are
//! references and are never reported.

use std::path::Path;
use tracing::debug;
use tree_sitter::{Node, Parser};

const TYPE_ITEMS: [&str; 4] = ["struct_item", "enum_item", "union_item", "trait_item"];

/// Type names declared in `source`, qualified by any inline `mod` blocks
/// they sit in (`inner::Foo`). `None` when the text does not parse cleanly.
pub fn declared_types(source: &str) -> Option<Vec<String>> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_rust::LANGUAGE.into())
        .ok()?;
    let tree = parser.parse(source, None)?;
    let root = tree.root_node();
    if root.has_error() {
        return None;
    }

    let mut scope = Vec::new();
    let mut found = Vec::new();
    collect(&root, source.as_bytes(), &mut scope, &mut found);
    Some(found)
}

/// Fully-qualified names declared in the file at `path` under `namespace`.
///
/// Unreadable or malformed files yield nothing.
pub fn scan_file(path: &Path, namespace: &[String]) -> Vec<String> {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "skipping unreadable source file");
            return Vec::new();
        }
    };

    let Some(types) = declared_types(&source) else {
        debug!(path = %path.display(), "skipping source file that does not parse");
        return Vec::new();
    };

    types
        .into_iter()
        .map(|name| qualify(namespace, &name))
        .collect()
}

/// `namespace::name` with any leading separator trimmed.
pub fn qualify(namespace: &[String], name: &str) -> String {
    let mut full = namespace.join("::");
    full.push_str("::");
    full.push_str(name);
    full.trim_start_matches(':').to_string()
}

fn collect(node: &Node, source: &[u8], scope: &mut Vec<String>, found: &mut Vec<String>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        let kind = child.kind();
        if TYPE_ITEMS.contains(&kind) {
            if let Some(name) = child.child_by_field_name("name") {
                let name = node_text(&name, source);
                if !name.is_empty() {
                    found.push(qualify(scope, name));
                }
            }
            continue;
        }

        if kind == "mod_item"
            && let (Some(name), Some(body)) =
                (child.child_by_field_name("name"), child.child_by_field_name("body"))
        {
            scope.push(node_text(&name, source).to_string());
            collect(&body, source, scope, found);
            scope.pop();
        }
    }
}

fn node_text<'a>(node: &Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}
