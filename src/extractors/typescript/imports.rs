// ES module import parsing: default, named (with aliases), namespace
// and bare side-effect imports.

use tree_sitter::Node;

use crate::extractors::base::{ImportKind, ImportReference};

use super::TypeScriptExtractor;

pub(super) fn collect_imports(x: &mut TypeScriptExtractor, root: Node) {
    let statements = x.base.find_nodes_by_type(&root, "import_statement");
    let mut imports = Vec::new();
    for statement in statements {
        parse_import_statement(x, statement, &mut imports);
    }
    x.base.imports.extend(imports);
}

fn parse_import_statement(
    x: &TypeScriptExtractor,
    statement: Node,
    out: &mut Vec<ImportReference>,
) {
    let Some(source_node) = statement.child_by_field_name("source") else {
        return;
    };
    let source = x
        .base
        .get_node_text(&source_node)
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();
    let is_local = source.starts_with('.') || source.starts_with('/');

    let Some(clause) = x.base.find_child_by_type(&statement, "import_clause") else {
        out.push(ImportReference {
            imported: source.clone(),
            source,
            alias: None,
            kind: ImportKind::SideEffect,
            is_local,
        });
        return;
    };

    let mut cursor = clause.walk();
    for child in clause.named_children(&mut cursor) {
        match child.kind() {
            // `import Default from "..."`
            "identifier" => out.push(ImportReference {
                source: source.clone(),
                imported: x.base.get_node_text(&child),
                alias: None,
                kind: ImportKind::Default,
                is_local,
            }),
            // `import * as ns from "..."`
            "namespace_import" => {
                if let Some(name) = x.base.find_child_by_type(&child, "identifier") {
                    out.push(ImportReference {
                        source: source.clone(),
                        imported: x.base.get_node_text(&name),
                        alias: None,
                        kind: ImportKind::Namespace,
                        is_local,
                    });
                }
            }
            // `import { A, B as C } from "..."`
            "named_imports" => {
                for specifier in x.base.find_children_by_type(&child, "import_specifier") {
                    let Some(name) = x.base.get_field_text(&specifier, "name") else {
                        continue;
                    };
                    out.push(ImportReference {
                        source: source.clone(),
                        imported: name,
                        alias: x.base.get_field_text(&specifier, "alias"),
                        kind: ImportKind::Named,
                        is_local,
                    });
                }
            }
            _ => {}
        }
    }
}
