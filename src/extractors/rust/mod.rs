/// Rust scope extractor with support for:
/// - Structs, enums, traits, unions, type aliases
/// - Functions, methods, impl blocks (extracted under the target type's name)
/// - Modules, constants, statics, closures
/// - Generic parameters with bounds, trait-implementation heritage
use std::collections::HashSet;

use once_cell::sync::Lazy;
use tree_sitter::{Node, Tree};

use crate::extractors::base::{BaseExtractor, ParentContext, ScopeFileAnalysis};
use crate::extractors::config::{NodeTypeConfig, RUST};

mod declarations;
mod imports;

static KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
        "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
        "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait",
        "true", "type", "unsafe", "use", "where", "while",
    ]
    .into_iter()
    .collect()
});

/// Prelude symbols that never need an import; anything that does need one
/// (HashMap, PathBuf, ...) is deliberately absent so import linkage works.
static BUILTINS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "Vec", "String", "Option", "Some", "None", "Result", "Ok", "Err", "Box", "Default",
        "Clone", "Copy", "Debug", "Drop", "Send", "Sync", "Sized", "Iterator", "IntoIterator",
        "From", "Into", "TryFrom", "TryInto", "ToString", "AsRef", "AsMut", "FnOnce", "FnMut",
        "Fn", "PartialEq", "Eq", "PartialOrd", "Ord", "Hash", "println", "print", "eprintln",
        "eprint", "format", "write", "writeln", "vec", "panic", "assert", "assert_eq",
        "assert_ne", "todo", "unimplemented", "unreachable", "dbg", "matches", "bool", "char",
        "str", "i8", "i16", "i32", "i64", "i128", "u8", "u16", "u32", "u64", "u128", "f32",
        "f64", "usize", "isize",
    ]
    .into_iter()
    .collect()
});

pub struct RustExtractor {
    pub(crate) base: BaseExtractor,
}

impl RustExtractor {
    pub fn new(file_path: String, content: String) -> Self {
        Self {
            base: BaseExtractor::new("rust", file_path, content),
        }
    }

    pub fn extract(mut self, tree: &Tree) -> ScopeFileAnalysis {
        imports::collect_imports(&mut self, tree.root_node());
        self.walk(tree.root_node(), None);
        self.base.finish(tree)
    }

    pub(crate) fn config(&self) -> &'static NodeTypeConfig {
        &RUST
    }

    pub(crate) fn keywords(&self) -> &'static HashSet<&'static str> {
        &KEYWORDS
    }

    pub(crate) fn builtins(&self) -> &'static HashSet<&'static str> {
        &BUILTINS
    }

    fn walk(&mut self, node: Node, parent: Option<&ParentContext>) {
        let child_ctx = self.extract_scope(node, parent);

        let next_parent = child_ctx.as_ref().or(parent);
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk(child, next_parent);
        }
    }

    /// Dispatch one node; returns the context nested scopes should inherit
    /// when this node produced a scope.
    fn extract_scope(&mut self, node: Node, parent: Option<&ParentContext>) -> Option<ParentContext> {
        match node.kind() {
            "struct_item" => declarations::extract_struct(self, node, parent),
            "union_item" => declarations::extract_struct(self, node, parent),
            "enum_item" => declarations::extract_enum(self, node, parent),
            "trait_item" => declarations::extract_trait(self, node, parent),
            "impl_item" => declarations::extract_impl(self, node, parent),
            "function_item" | "function_signature_item" => {
                declarations::extract_function(self, node, parent)
            }
            "closure_expression" => declarations::extract_closure(self, node, parent),
            "mod_item" => declarations::extract_module(self, node, parent),
            "type_item" | "associated_type" => declarations::extract_type_alias(self, node, parent),
            "const_item" | "static_item" => declarations::extract_const(self, node, parent),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::base::{HeritageKind, ScopeType};

    fn parse(source: &str) -> ScopeFileAnalysis {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_rust::LANGUAGE.into())
            .unwrap();
        let tree = parser.parse(source, None).unwrap();
        RustExtractor::new("src/lib.rs".into(), source.to_string()).extract(&tree)
    }

    #[test]
    fn extracts_struct_with_members() {
        let analysis = parse(
            r#"
pub struct Point {
    pub x: f64,
    y: f64,
}
"#,
        );
        let point = analysis
            .scopes
            .iter()
            .find(|s| s.name == "Point")
            .expect("Point scope");
        assert_eq!(point.scope_type, ScopeType::Struct);
        assert_eq!(point.members.len(), 2);
        assert_eq!(point.members[0].name, "x");
        assert!(analysis.exports.contains(&"Point".to_string()));
    }

    #[test]
    fn impl_block_is_named_after_target_type() {
        let analysis = parse(
            r#"
trait Shape { fn area(&self) -> f64; }
struct Circle { radius: f64 }
impl Shape for Circle {
    fn area(&self) -> f64 { self.radius * self.radius }
}
"#,
        );
        let impl_scope = analysis
            .scopes
            .iter()
            .find(|s| s.name == "Circle" && s.scope_type == ScopeType::Class)
            .expect("impl scope named after Circle");
        assert!(impl_scope
            .identifier_references
            .iter()
            .any(|r| r.name == "Shape" && r.heritage == Some(HeritageKind::Implements)));

        // Both the trait signature and the impl body produce a method scope;
        // each hangs under its own declaring type.
        let area_parents: Vec<&str> = analysis
            .scopes
            .iter()
            .filter(|s| s.name == "area" && s.scope_type == ScopeType::Method)
            .filter_map(|s| s.parent.as_deref())
            .collect();
        assert!(area_parents.contains(&"Shape"));
        assert!(area_parents.contains(&"Circle"));
    }

    #[test]
    fn references_exclude_own_name_params_and_receiver() {
        let analysis = parse(
            r#"
fn process(input: Payload) -> Summary {
    let local = transform(input);
    finish(local)
}
"#,
        );
        let process = analysis.scopes.iter().find(|s| s.name == "process").unwrap();
        let names: Vec<&str> = process
            .identifier_references
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert!(!names.contains(&"process"));
        assert!(!names.contains(&"input"));
        assert!(!names.contains(&"local"));
        assert!(names.contains(&"transform"));
        assert!(names.contains(&"finish"));
        assert!(names.contains(&"Payload"));
        assert!(names.contains(&"Summary"));
    }

    #[test]
    fn nested_generics_yield_each_type_argument() {
        let analysis = parse("fn load() -> Container<Pair<User, Error2>> { todo!() }");
        let load = analysis.scopes.iter().find(|s| s.name == "load").unwrap();
        for expected in ["Container", "Pair", "User", "Error2"] {
            assert!(
                load.identifier_references.iter().any(|r| r.name == expected),
                "missing reference to {}",
                expected
            );
        }
    }

    #[test]
    fn use_declarations_become_imports() {
        let analysis = parse(
            r#"
use crate::model::Payload;
use serde::{Serialize, Deserialize};
use std::collections::HashMap as Map;

fn handle(p: Payload) -> Map<String, String> { todo!() }
"#,
        );
        assert!(analysis
            .imports
            .iter()
            .any(|i| i.imported == "Payload" && i.source == "crate::model" && i.is_local));
        assert!(analysis
            .imports
            .iter()
            .any(|i| i.imported == "Serialize" && i.source == "serde" && !i.is_local));
        let map = analysis
            .imports
            .iter()
            .find(|i| i.imported == "HashMap")
            .unwrap();
        assert_eq!(map.alias.as_deref(), Some("Map"));

        // Import linkage: `handle` uses Payload and Map, so both imports
        // cross-reference into the scope.
        let handle = analysis.scopes.iter().find(|s| s.name == "handle").unwrap();
        assert!(handle.import_references.iter().any(|i| i.imported == "Payload"));
        assert!(handle.import_references.iter().any(|i| i.imported == "HashMap"));
        assert!(handle.dependencies.is_empty() || handle.dependencies.contains(&"std".to_string()));
    }

    #[test]
    fn malformed_source_degrades_not_fails() {
        let analysis = parse("fn broken( { let x = ; }\nfn fine() { done(); }");
        assert!(!analysis.ast_valid);
        assert!(!analysis.ast_issues.is_empty());
        // The walk continued past the damage.
        assert!(analysis.scopes.iter().any(|s| s.name == "fine"));
    }

    #[test]
    fn recovered_tokens_surface_as_notes() {
        let analysis = parse("fn incomplete() {\n    let x = 1;\n");
        let scope = analysis
            .scopes
            .iter()
            .find(|s| s.name == "incomplete")
            .expect("scope survives the unclosed block");
        assert!(!scope.ast_valid);
        assert!(scope.ast_notes.iter().any(|n| n.starts_with("missing")));
    }

    #[test]
    fn extraction_is_idempotent() {
        let source = "pub fn stable(a: u32) -> u32 { helper(a) }";
        let first = parse(source);
        let second = parse(source);
        assert_eq!(first.scopes, second.scopes);
        assert_eq!(first.content_hash, second.content_hash);
    }

    #[test]
    fn all_scopes_hold_line_invariants() {
        let analysis = parse(
            r#"
mod geometry {
    pub struct Vec2 { x: f64, y: f64 }
    impl Vec2 {
        pub fn length(&self) -> f64 { (self.x * self.x + self.y * self.y).sqrt() }
    }
}
"#,
        );
        for scope in &analysis.scopes {
            assert!(scope.start_line <= scope.end_line, "{}", scope.name);
            assert!(!scope.name.is_empty());
        }
        let length = analysis.scopes.iter().find(|s| s.name == "length").unwrap();
        assert_eq!(length.parent.as_deref(), Some("Vec2"));
        assert!(length.depth >= 2);
    }
}
