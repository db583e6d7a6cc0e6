/// Python scope extractor with support for:
/// - Classes with superclass lists, functions, methods, lambdas
/// - Decorators folded into the decorated definition's references
/// - import / from-import statements, including relative forms
/// - Underscore-prefix visibility conventions, async functions
use std::collections::HashSet;

use once_cell::sync::Lazy;
use tree_sitter::{Node, Tree};

use crate::extractors::base::{BaseExtractor, ParentContext, ScopeFileAnalysis};
use crate::extractors::config::{NodeTypeConfig, PYTHON};

mod declarations;
mod imports;

static KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
        "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
        "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
        "try", "while", "with", "yield", "self", "cls",
    ]
    .into_iter()
    .collect()
});

static BUILTINS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "abs", "all", "any", "bool", "bytes", "callable", "chr", "dict", "dir", "divmod",
        "enumerate", "filter", "float", "format", "frozenset", "getattr", "hasattr", "hash",
        "hex", "id", "int", "isinstance", "issubclass", "iter", "len", "list", "map", "max",
        "min", "next", "object", "open", "ord", "pow", "print", "range", "repr", "reversed",
        "round", "set", "setattr", "sorted", "str", "sum", "super", "tuple", "type", "vars",
        "zip", "Exception", "ValueError", "TypeError", "KeyError", "IndexError", "RuntimeError",
        "StopIteration", "AttributeError", "NotImplementedError", "OSError",
    ]
    .into_iter()
    .collect()
});

pub struct PythonExtractor {
    pub(crate) base: BaseExtractor,
}

impl PythonExtractor {
    pub fn new(file_path: String, content: String) -> Self {
        Self {
            base: BaseExtractor::new("python", file_path, content),
        }
    }

    pub fn extract(mut self, tree: &Tree) -> ScopeFileAnalysis {
        let root = tree.root_node();
        imports::collect_imports(&mut self, root);
        self.walk(root, None);
        self.base.finish(tree)
    }

    pub(crate) fn config(&self) -> &'static NodeTypeConfig {
        &PYTHON
    }

    pub(crate) fn keywords(&self) -> &'static HashSet<&'static str> {
        &KEYWORDS
    }

    pub(crate) fn builtins(&self) -> &'static HashSet<&'static str> {
        &BUILTINS
    }

    /// Leading underscore marks a name module-private by convention.
    pub(crate) fn is_public(name: &str) -> bool {
        !name.starts_with('_')
    }

    fn walk(&mut self, node: Node, parent: Option<&ParentContext>) {
        let child_ctx = self.extract_scope(node, parent);

        let next_parent = child_ctx.as_ref().or(parent);
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk(child, next_parent);
        }
    }

    fn extract_scope(&mut self, node: Node, parent: Option<&ParentContext>) -> Option<ParentContext> {
        // Decorated definitions extract through the wrapper so decorator
        // references land on the definition's scope.
        if node.parent().is_some_and(|p| p.kind() == "decorated_definition") {
            return None;
        }
        match node.kind() {
            "decorated_definition" => declarations::extract_decorated(self, node, parent),
            "class_definition" => declarations::extract_class(self, node, parent, Vec::new()),
            "function_definition" => declarations::extract_function(self, node, parent, Vec::new()),
            "lambda" => declarations::extract_lambda(self, node, parent),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::base::{HeritageKind, Modifier, ScopeType};

    fn parse(source: &str) -> ScopeFileAnalysis {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .unwrap();
        let tree = parser.parse(source, None).unwrap();
        PythonExtractor::new("pkg/models.py".into(), source.to_string()).extract(&tree)
    }

    #[test]
    fn superclasses_become_extends_heritage() {
        let analysis = parse(
            r#"
class Shape:
    def area(self):
        return 0

class Circle(Shape):
    def area(self):
        return self.radius * self.radius * 3.14
"#,
        );
        let circle = analysis.scopes.iter().find(|s| s.name == "Circle").unwrap();
        assert_eq!(circle.scope_type, ScopeType::Class);
        assert!(circle
            .heritage_clauses
            .iter()
            .any(|h| h.kind == HeritageKind::Extends && h.target == "Shape"));
        assert!(circle
            .identifier_references
            .iter()
            .any(|r| r.name == "Shape" && r.heritage == Some(HeritageKind::Extends)));

        let methods: Vec<_> = analysis
            .scopes
            .iter()
            .filter(|s| s.name == "area")
            .collect();
        assert_eq!(methods.len(), 2);
        assert!(methods.iter().all(|m| m.scope_type == ScopeType::Method));
        // `self` never leaks into references.
        assert!(methods
            .iter()
            .all(|m| !m.identifier_references.iter().any(|r| r.name == "self")));
    }

    #[test]
    fn decorators_attach_to_the_decorated_scope() {
        let analysis = parse(
            r#"
@register
class Handler:
    @staticmethod
    def run():
        pass
"#,
        );
        let handler = analysis.scopes.iter().find(|s| s.name == "Handler").unwrap();
        assert!(handler
            .identifier_references
            .iter()
            .any(|r| r.name == "register" && r.heritage == Some(HeritageKind::Decorator)));
        let run = analysis.scopes.iter().find(|s| s.name == "run").unwrap();
        assert!(run
            .identifier_references
            .iter()
            .any(|r| r.name == "staticmethod" && r.heritage == Some(HeritageKind::Decorator)));
    }

    #[test]
    fn relative_imports_are_local() {
        let analysis = parse(
            r#"
import os.path
import numpy as np
from .models import Shape, Circle as Round
from ..core import engine
"#,
        );
        let os_import = analysis.imports.iter().find(|i| i.source == "os.path").unwrap();
        assert_eq!(os_import.imported, "os");
        assert!(!os_import.is_local);

        let np = analysis.imports.iter().find(|i| i.imported == "numpy").unwrap();
        assert_eq!(np.alias.as_deref(), Some("np"));

        let shape = analysis.imports.iter().find(|i| i.imported == "Shape").unwrap();
        assert_eq!(shape.source, ".models");
        assert!(shape.is_local);

        let round = analysis.imports.iter().find(|i| i.imported == "Circle").unwrap();
        assert_eq!(round.alias.as_deref(), Some("Round"));
        assert_eq!(round.local_name(), "Round");

        let engine = analysis.imports.iter().find(|i| i.imported == "engine").unwrap();
        assert_eq!(engine.source, "..core");
        assert!(engine.is_local);
    }

    #[test]
    fn underscore_prefix_is_private_and_unexported() {
        let analysis = parse(
            r#"
def public_api():
    return _helper()

def _helper():
    return 1
"#,
        );
        assert!(analysis.exports.contains(&"public_api".to_string()));
        assert!(!analysis.exports.contains(&"_helper".to_string()));
        let helper = analysis.scopes.iter().find(|s| s.name == "_helper").unwrap();
        assert!(helper.modifiers.contains(&Modifier::Private));
        // Private names still resolve as references.
        let public = analysis.scopes.iter().find(|s| s.name == "public_api").unwrap();
        assert!(public
            .identifier_references
            .iter()
            .any(|r| r.name == "_helper"));
    }

    #[test]
    fn async_functions_and_defaults() {
        let analysis = parse(
            r#"
async def fetch(url, timeout=30, *args, **kwargs):
    return url
"#,
        );
        let fetch = analysis.scopes.iter().find(|s| s.name == "fetch").unwrap();
        assert!(fetch.modifiers.contains(&Modifier::Async));
        let timeout = fetch.parameters.iter().find(|p| p.name == "timeout").unwrap();
        assert!(timeout.optional);
        let args = fetch.parameters.iter().find(|p| p.name == "args").unwrap();
        assert!(args.rest);
        let kwargs = fetch.parameters.iter().find(|p| p.name == "kwargs").unwrap();
        assert!(kwargs.rest);
    }

    #[test]
    fn lambdas_are_anonymous_scopes() {
        let analysis = parse("key = lambda item: item.weight\n");
        let lambda = analysis
            .scopes
            .iter()
            .find(|s| s.scope_type == ScopeType::Lambda)
            .expect("lambda scope");
        assert!(lambda.name.starts_with("Anonymous"));
        assert!(lambda.parameters.iter().any(|p| p.name == "item"));
    }
}
