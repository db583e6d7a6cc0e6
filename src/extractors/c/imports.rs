// C import parsing: preprocessor includes. Quoted paths are project-local,
// angle-bracket paths come from system include directories.

use tree_sitter::Node;

use crate::extractors::base::{ImportKind, ImportReference};

use super::CExtractor;

pub(super) fn collect_imports(x: &mut CExtractor, root: Node) {
    let includes = x.base.find_nodes_by_type(&root, "preproc_include");
    let mut imports = Vec::new();
    for include in includes {
        if let Some(import) = parse_include(x, include) {
            imports.push(import);
        }
    }
    x.base.imports.extend(imports);
}

fn parse_include(x: &CExtractor, include: Node) -> Option<ImportReference> {
    let path_node = include.child_by_field_name("path")?;
    let raw = x.base.get_node_text(&path_node);
    let is_local = path_node.kind() == "string_literal";
    let source = raw
        .trim_matches(|c| c == '"' || c == '<' || c == '>')
        .to_string();
    let stem = source
        .rsplit('/')
        .next()
        .unwrap_or(&source)
        .trim_end_matches(".h")
        .to_string();

    Some(ImportReference {
        source,
        imported: stem,
        alias: None,
        // Inclusion is textual; every name the header declares arrives.
        kind: ImportKind::Namespace,
        is_local,
    })
}
