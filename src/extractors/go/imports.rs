// Go import parsing: single and grouped import declarations.

use tree_sitter::Node;

use crate::extractors::base::{ImportKind, ImportReference};

use super::GoExtractor;

pub(super) fn collect_imports(x: &mut GoExtractor, root: Node) {
    let specs = x.base.find_nodes_by_type(&root, "import_spec");
    let mut imports = Vec::new();
    for spec in specs {
        if let Some(import) = parse_import_spec(x, spec) {
            imports.push(import);
        }
    }
    x.base.imports.extend(imports);
}

fn parse_import_spec(x: &GoExtractor, spec: Node) -> Option<ImportReference> {
    let path_node = spec.child_by_field_name("path")?;
    let source = x
        .base
        .get_node_text(&path_node)
        .trim_matches('"')
        .to_string();
    let last_segment = source.rsplit('/').next().unwrap_or(&source).to_string();

    let name = spec
        .child_by_field_name("name")
        .map(|n| x.base.get_node_text(&n));

    let (alias, kind) = match name.as_deref() {
        Some("_") => (None, ImportKind::SideEffect),
        // Dot imports splice the package's names into the file scope.
        Some(".") => (None, ImportKind::Namespace),
        Some(_) => (name.clone(), ImportKind::Namespace),
        None => (None, ImportKind::Namespace),
    };

    Some(ImportReference {
        // Local-vs-package is refined by the import resolver once the
        // go.mod module path is known.
        is_local: source.starts_with("./") || source.starts_with("../"),
        source,
        imported: last_segment,
        alias,
        kind,
    })
}
