// Python import parsing: plain imports, aliased imports and from-imports
// with relative module prefixes.

use tree_sitter::Node;

use crate::extractors::base::{ImportKind, ImportReference};

use super::PythonExtractor;

pub(super) fn collect_imports(x: &mut PythonExtractor, root: Node) {
    let mut imports = Vec::new();
    // Imports nested in function bodies count the same as top-level ones.
    for node in x.base.find_nodes_by_type(&root, "import_statement") {
        parse_import(x, node, &mut imports);
    }
    for node in x.base.find_nodes_by_type(&root, "import_from_statement") {
        parse_from_import(x, node, &mut imports);
    }
    x.base.imports.extend(imports);
}

/// `import a.b.c` binds the root package name; `import x as y` binds the
/// alias to the whole module.
fn parse_import(x: &PythonExtractor, node: Node, out: &mut Vec<ImportReference>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "dotted_name" => {
                let source = x.base.get_node_text(&child);
                let root_segment = source.split('.').next().unwrap_or(&source).to_string();
                out.push(ImportReference {
                    source,
                    imported: root_segment,
                    alias: None,
                    kind: ImportKind::Namespace,
                    is_local: false,
                });
            }
            "aliased_import" => {
                let Some(name) = x.base.get_field_text(&child, "name") else {
                    continue;
                };
                out.push(ImportReference {
                    source: name.clone(),
                    imported: name,
                    alias: x.base.get_field_text(&child, "alias"),
                    kind: ImportKind::Namespace,
                    is_local: false,
                });
            }
            _ => {}
        }
    }
}

fn parse_from_import(x: &PythonExtractor, node: Node, out: &mut Vec<ImportReference>) {
    let Some(module) = node.child_by_field_name("module_name") else {
        return;
    };
    let source = x.base.get_node_text(&module);
    let is_local = source.starts_with('.');

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        // the module_name field also matches dotted_name; skip it
        if child.id() == module.id() {
            continue;
        }
        match child.kind() {
            "dotted_name" => out.push(ImportReference {
                source: source.clone(),
                imported: x.base.get_node_text(&child),
                alias: None,
                kind: ImportKind::Named,
                is_local,
            }),
            "aliased_import" => {
                let Some(name) = x.base.get_field_text(&child, "name") else {
                    continue;
                };
                out.push(ImportReference {
                    source: source.clone(),
                    imported: name,
                    alias: x.base.get_field_text(&child, "alias"),
                    kind: ImportKind::Named,
                    is_local,
                });
            }
            "wildcard_import" => out.push(ImportReference {
                source: source.clone(),
                imported: "*".to_string(),
                alias: None,
                kind: ImportKind::Namespace,
                is_local,
            }),
            _ => {}
        }
    }
}
