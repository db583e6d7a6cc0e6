// Rust use-declaration parsing into import references.

use tree_sitter::Node;

use crate::extractors::base::{ImportKind, ImportReference};

use super::RustExtractor;

pub(super) fn collect_imports(x: &mut RustExtractor, root: Node) {
    let nodes = x.base.find_nodes_by_type(&root, "use_declaration");
    for node in nodes {
        if let Some(argument) = node.child_by_field_name("argument") {
            let mut imports = Vec::new();
            flatten_use(x, argument, "", &mut imports);
            x.base.imports.extend(imports);
        }
    }
}

/// Flatten one use-tree into individual import references. `prefix` carries
/// the accumulated path for grouped imports (`use a::{b, c::D}`).
fn flatten_use(x: &RustExtractor, node: Node, prefix: &str, out: &mut Vec<ImportReference>) {
    match node.kind() {
        "identifier" | "crate" | "self" | "super" => {
            let name = x.base.get_node_text(&node);
            if prefix.is_empty() {
                // `use serde;` - the module itself is the binding.
                out.push(make_import(&name, name.clone(), None, ImportKind::Namespace));
            } else {
                out.push(make_import(prefix, name, None, ImportKind::Named));
            }
        }
        "scoped_identifier" => {
            let path = node
                .child_by_field_name("path")
                .map(|p| x.base.get_node_text(&p))
                .unwrap_or_default();
            let name = node
                .child_by_field_name("name")
                .map(|n| x.base.get_node_text(&n))
                .unwrap_or_default();
            let source = join_path(prefix, &path);
            out.push(make_import(&source, name, None, ImportKind::Named));
        }
        "use_as_clause" => {
            let alias = node
                .child_by_field_name("alias")
                .map(|a| x.base.get_node_text(&a));
            if let Some(inner) = node.child_by_field_name("path") {
                let mut inner_imports = Vec::new();
                flatten_use(x, inner, prefix, &mut inner_imports);
                for mut import in inner_imports {
                    import.alias = alias.clone();
                    out.push(import);
                }
            }
        }
        "scoped_use_list" => {
            let path = node
                .child_by_field_name("path")
                .map(|p| x.base.get_node_text(&p))
                .unwrap_or_default();
            let combined = join_path(prefix, &path);
            if let Some(list) = node.child_by_field_name("list") {
                flatten_use(x, list, &combined, out);
            }
        }
        "use_list" => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                if child.is_named() {
                    flatten_use(x, child, prefix, out);
                }
            }
        }
        "use_wildcard" => {
            let path = node
                .child(0)
                .filter(|c| c.is_named())
                .map(|p| x.base.get_node_text(&p))
                .unwrap_or_default();
            let source = join_path(prefix, &path);
            let imported = source
                .rsplit("::")
                .next()
                .unwrap_or(&source)
                .to_string();
            out.push(make_import(&source, imported, None, ImportKind::Namespace));
        }
        _ => {}
    }
}

fn make_import(
    source: &str,
    imported: String,
    alias: Option<String>,
    kind: ImportKind,
) -> ImportReference {
    let root = source.split("::").next().unwrap_or(source);
    let is_local = matches!(root, "crate" | "self" | "super");
    ImportReference {
        source: source.to_string(),
        imported,
        alias,
        kind,
        is_local,
    }
}

fn join_path(prefix: &str, path: &str) -> String {
    if prefix.is_empty() {
        path.to_string()
    } else if path.is_empty() {
        prefix.to_string()
    } else {
        format!("{}::{}", prefix, path)
    }
}
