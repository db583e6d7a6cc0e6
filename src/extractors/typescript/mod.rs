/// TypeScript and TSX scope extractor with support for:
/// - Classes with extends/implements heritage, abstract classes, decorators
/// - Interfaces, enums, type aliases, namespaces
/// - Functions, methods, arrow functions named through their declarator
/// - ES module imports (default, named, namespace, side-effect) and
///   export-statement detection
use std::collections::HashSet;

use once_cell::sync::Lazy;
use tree_sitter::{Node, Tree};

use crate::extractors::base::{BaseExtractor, ParentContext, ScopeFileAnalysis};
use crate::extractors::config::{NodeTypeConfig, TYPESCRIPT};

mod declarations;
mod imports;

static KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "abstract", "any", "as", "async", "await", "boolean", "break", "case", "catch", "class",
        "const", "continue", "debugger", "declare", "default", "delete", "do", "else", "enum",
        "export", "extends", "false", "finally", "for", "from", "function", "if", "implements",
        "import", "in", "instanceof", "interface", "is", "keyof", "let", "namespace", "never",
        "new", "null", "number", "object", "of", "private", "protected", "public", "readonly",
        "return", "satisfies", "static", "string", "super", "switch", "this", "throw", "true",
        "try", "type", "typeof", "undefined", "unknown", "var", "void", "while", "with", "yield",
    ]
    .into_iter()
    .collect()
});

static BUILTINS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "console", "window", "document", "globalThis", "Math", "JSON", "Object", "Array",
        "String", "Number", "Boolean", "Symbol", "BigInt", "Promise", "Map", "Set", "WeakMap",
        "WeakSet", "Error", "TypeError", "RangeError", "SyntaxError", "RegExp", "Date", "Proxy",
        "Reflect", "Infinity", "NaN", "parseInt", "parseFloat", "isNaN", "isFinite",
        "encodeURIComponent", "decodeURIComponent", "structuredClone", "setTimeout",
        "setInterval", "clearTimeout", "clearInterval", "queueMicrotask", "fetch", "require",
        "module", "process", "Buffer", "__dirname", "__filename",
    ]
    .into_iter()
    .collect()
});

pub struct TypeScriptExtractor {
    pub(crate) base: BaseExtractor,
}

impl TypeScriptExtractor {
    pub fn new(language: &'static str, file_path: String, content: String) -> Self {
        Self {
            base: BaseExtractor::new(language, file_path, content),
        }
    }

    pub fn extract(mut self, tree: &Tree) -> ScopeFileAnalysis {
        let root = tree.root_node();
        imports::collect_imports(&mut self, root);
        self.walk(root, None);
        self.base.finish(tree)
    }

    pub(crate) fn config(&self) -> &'static NodeTypeConfig {
        &TYPESCRIPT
    }

    pub(crate) fn keywords(&self) -> &'static HashSet<&'static str> {
        &KEYWORDS
    }

    pub(crate) fn builtins(&self) -> &'static HashSet<&'static str> {
        &BUILTINS
    }

    /// A declaration wrapped in an export_statement is part of the
    /// module's public surface.
    pub(crate) fn is_exported(node: Node) -> bool {
        node.parent()
            .is_some_and(|p| p.kind() == "export_statement")
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
        match node.kind() {
            "class_declaration" | "abstract_class_declaration" => {
                declarations::extract_class(self, node, parent)
            }
            "interface_declaration" => declarations::extract_interface(self, node, parent),
            "enum_declaration" => declarations::extract_enum(self, node, parent),
            "function_declaration" | "generator_function_declaration" => {
                declarations::extract_function(self, node, parent)
            }
            "method_definition" => declarations::extract_method(self, node, parent),
            "arrow_function" | "function_expression" => {
                declarations::extract_function_value(self, node, parent)
            }
            "type_alias_declaration" => declarations::extract_type_alias(self, node, parent),
            "internal_module" => declarations::extract_namespace(self, node, parent),
            "lexical_declaration" | "variable_declaration" => {
                declarations::extract_variable_declaration(self, node, parent)
            }
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
            .set_language(&tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())
            .unwrap();
        let tree = parser.parse(source, None).unwrap();
        TypeScriptExtractor::new("typescript", "src/shapes.ts".into(), source.to_string())
            .extract(&tree)
    }

    #[test]
    fn class_heritage_splits_extends_and_implements() {
        let analysis = parse(
            r#"
interface Drawable {
    draw(): void;
}

class Shape {}

export class Circle extends Shape implements Drawable {
    radius: number;
    draw(): void {}
}
"#,
        );
        let circle = analysis.scopes.iter().find(|s| s.name == "Circle").unwrap();
        assert!(circle
            .heritage_clauses
            .iter()
            .any(|h| h.kind == HeritageKind::Extends && h.target == "Shape"));
        assert!(circle
            .heritage_clauses
            .iter()
            .any(|h| h.kind == HeritageKind::Implements && h.target == "Drawable"));
        assert!(circle
            .identifier_references
            .iter()
            .any(|r| r.name == "Shape" && r.heritage == Some(HeritageKind::Extends)));
        assert!(circle.members.iter().any(|m| m.name == "radius"));
        assert!(analysis.exports.contains(&"Circle".to_string()));
        assert!(!analysis.exports.contains(&"Shape".to_string()));

        let draw = analysis
            .scopes
            .iter()
            .find(|s| s.name == "draw" && s.parent.as_deref() == Some("Circle"))
            .unwrap();
        assert_eq!(draw.scope_type, ScopeType::Method);
    }

    #[test]
    fn interfaces_collect_member_signatures() {
        let analysis = parse(
            r#"
interface Store<T> {
    get(key: string): T | undefined;
    size: number;
}
"#,
        );
        let store = analysis.scopes.iter().find(|s| s.name == "Store").unwrap();
        assert_eq!(store.scope_type, ScopeType::Interface);
        assert!(store.members.iter().any(|m| m.name == "get"));
        assert!(store.members.iter().any(|m| m.name == "size"));
        assert!(store.generic_parameters.iter().any(|g| g.name == "T"));
    }

    #[test]
    fn arrow_functions_take_their_declarator_name() {
        let analysis = parse(
            r#"
export const area = (radius: number): number => radius * radius * 3.14;

const anonymousUser = [1, 2].map(n => n + 1);
"#,
        );
        let area = analysis.scopes.iter().find(|s| s.name == "area").unwrap();
        assert_eq!(area.scope_type, ScopeType::Function);
        assert!(area.parameters.iter().any(|p| p.name == "radius"));
        assert!(analysis.exports.contains(&"area".to_string()));
        // Arrows without a declarator stay anonymous.
        assert!(analysis
            .scopes
            .iter()
            .any(|s| s.scope_type == ScopeType::Lambda && s.name.starts_with("Anonymous")));
    }

    #[test]
    fn enums_and_namespaces() {
        let analysis = parse(
            r#"
enum Direction {
    Up = 1,
    Down,
}

namespace Geometry {
    export function distance(): number { return 0; }
}
"#,
        );
        let direction = analysis.scopes.iter().find(|s| s.name == "Direction").unwrap();
        assert_eq!(direction.scope_type, ScopeType::Enum);
        let up = direction.enum_members.iter().find(|m| m.name == "Up").unwrap();
        assert_eq!(up.value.as_deref(), Some("1"));

        let geometry = analysis.scopes.iter().find(|s| s.name == "Geometry").unwrap();
        assert_eq!(geometry.scope_type, ScopeType::Namespace);
        let distance = analysis.scopes.iter().find(|s| s.name == "distance").unwrap();
        assert_eq!(distance.parent.as_deref(), Some("Geometry"));
    }

    #[test]
    fn import_forms_parse_into_references() {
        let analysis = parse(
            r#"
import Default from "./default";
import { Shape, Circle as Round } from "./shapes";
import * as geometry from "../geometry";
import "reflect-metadata";
import axios from "axios";
"#,
        );
        use crate::extractors::base::ImportKind;

        let default = analysis.imports.iter().find(|i| i.imported == "Default").unwrap();
        assert_eq!(default.kind, ImportKind::Default);
        assert!(default.is_local);

        let round = analysis.imports.iter().find(|i| i.imported == "Circle").unwrap();
        assert_eq!(round.kind, ImportKind::Named);
        assert_eq!(round.local_name(), "Round");

        let ns = analysis.imports.iter().find(|i| i.imported == "geometry").unwrap();
        assert_eq!(ns.kind, ImportKind::Namespace);

        let side_effect = analysis
            .imports
            .iter()
            .find(|i| i.source == "reflect-metadata")
            .unwrap();
        assert_eq!(side_effect.kind, ImportKind::SideEffect);
        assert!(!side_effect.is_local);

        assert!(analysis.dependencies.contains(&"axios".to_string()));
        assert!(!analysis.dependencies.contains(&"shapes".to_string()));
    }

    #[test]
    fn method_modifiers_carry_accessibility() {
        let analysis = parse(
            r#"
class Repo {
    private cache: string[] = [];
    static of(): Repo { return new Repo(); }
    async load(): Promise<void> {}
}
"#,
        );
        let of = analysis
            .scopes
            .iter()
            .find(|s| s.name == "of" && s.parent.as_deref() == Some("Repo"))
            .unwrap();
        assert!(of.modifiers.contains(&Modifier::Static));
        let load = analysis.scopes.iter().find(|s| s.name == "load").unwrap();
        assert!(load.modifiers.contains(&Modifier::Async));
        let repo = analysis.scopes.iter().find(|s| s.name == "Repo").unwrap();
        let cache = repo.members.iter().find(|m| m.name == "cache").unwrap();
        assert_eq!(cache.accessibility, Some(Modifier::Private));
    }

    #[test]
    fn class_decorators_surface_as_heritage() {
        let analysis = parse(
            r#"
@injectable()
class Service {}
"#,
        );
        let service = analysis.scopes.iter().find(|s| s.name == "Service").unwrap();
        assert!(service
            .heritage_clauses
            .iter()
            .any(|h| h.kind == HeritageKind::Decorator && h.target == "injectable"));
        assert!(service
            .identifier_references
            .iter()
            .any(|r| r.name == "injectable" && r.heritage == Some(HeritageKind::Decorator)));
    }
}
