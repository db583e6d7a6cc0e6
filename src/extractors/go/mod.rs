/// Go scope extractor with support for:
/// - Structs, interfaces, type aliases (via type_declaration specs)
/// - Functions and receiver methods (parented under the receiver's type)
/// - Package clause, file-level consts and vars
/// - Capitalization-based export rules, struct/interface embedding
use std::collections::HashSet;

use once_cell::sync::Lazy;
use tree_sitter::{Node, Tree};

use crate::extractors::base::{BaseExtractor, ParentContext, ScopeFileAnalysis};
use crate::extractors::config::{NodeTypeConfig, GO};

mod declarations;
mod imports;

static KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
        "for", "func", "go", "goto", "if", "import", "interface", "map", "package", "range",
        "return", "select", "struct", "switch", "type", "var", "nil", "true", "false", "iota",
    ]
    .into_iter()
    .collect()
});

static BUILTINS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "append", "cap", "clear", "close", "complex", "copy", "delete", "imag", "len", "make",
        "max", "min", "new", "panic", "print", "println", "real", "recover", "error", "string",
        "int", "int8", "int16", "int32", "int64", "uint", "uint8", "uint16", "uint32", "uint64",
        "uintptr", "float32", "float64", "complex64", "complex128", "byte", "rune", "bool",
        "any", "comparable",
    ]
    .into_iter()
    .collect()
});

pub struct GoExtractor {
    pub(crate) base: BaseExtractor,
}

impl GoExtractor {
    pub fn new(file_path: String, content: String) -> Self {
        Self {
            base: BaseExtractor::new("go", file_path, content),
        }
    }

    pub fn extract(mut self, tree: &Tree) -> ScopeFileAnalysis {
        let root = tree.root_node();
        imports::collect_imports(&mut self, root);

        // The package clause is a sibling of every other top-level
        // declaration; extract it first so the rest nests under it.
        let mut package_ctx = None;
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            if child.kind() == "package_clause" {
                package_ctx = declarations::extract_package(&mut self, child);
                break;
            }
        }

        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            if child.kind() != "package_clause" {
                self.walk(child, package_ctx.as_ref());
            }
        }
        self.base.finish(tree)
    }

    pub(crate) fn config(&self) -> &'static NodeTypeConfig {
        &GO
    }

    pub(crate) fn keywords(&self) -> &'static HashSet<&'static str> {
        &KEYWORDS
    }

    pub(crate) fn builtins(&self) -> &'static HashSet<&'static str> {
        &BUILTINS
    }

    /// Exported-by-convention: a name is public iff its first character is
    /// uppercase. No visibility keyword exists.
    pub(crate) fn is_exported(name: &str) -> bool {
        name.chars().next().is_some_and(char::is_uppercase)
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
            "type_declaration" => declarations::extract_type_declaration(self, node, parent),
            "function_declaration" => declarations::extract_function(self, node, parent),
            "method_declaration" => declarations::extract_method(self, node, parent),
            "func_literal" => declarations::extract_func_literal(self, node, parent),
            "const_declaration" | "var_declaration" => {
                declarations::extract_value_declaration(self, node, parent)
            }
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
            .set_language(&tree_sitter_go::LANGUAGE.into())
            .unwrap();
        let tree = parser.parse(source, None).unwrap();
        GoExtractor::new("pkg/shapes.go".into(), source.to_string()).extract(&tree)
    }

    #[test]
    fn receiver_methods_parent_under_receiver_type() {
        let analysis = parse(
            r#"
package shapes

type Circle struct {
    Radius float64
}

func (c *Circle) Area() float64 {
    return c.Radius * c.Radius * 3.14
}
"#,
        );
        let area = analysis
            .scopes
            .iter()
            .find(|s| s.name == "Area")
            .expect("Area method");
        assert_eq!(area.scope_type, ScopeType::Method);
        assert_eq!(area.parent.as_deref(), Some("Circle"));
        // The receiver binding never shows up as a reference.
        assert!(!area.identifier_references.iter().any(|r| r.name == "c"));
    }

    #[test]
    fn capitalization_decides_exports() {
        let analysis = parse(
            r#"
package shapes

func Exported() {}
func internal() {}
"#,
        );
        assert!(analysis.exports.contains(&"Exported".to_string()));
        assert!(!analysis.exports.contains(&"internal".to_string()));
    }

    #[test]
    fn struct_embedding_becomes_extends_heritage() {
        let analysis = parse(
            r#"
package shapes

type Base struct{}

type Derived struct {
    Base
    Name string
}
"#,
        );
        let derived = analysis.scopes.iter().find(|s| s.name == "Derived").unwrap();
        assert!(derived
            .heritage_clauses
            .iter()
            .any(|h| h.kind == HeritageKind::Extends && h.target == "Base"));
        assert!(derived
            .identifier_references
            .iter()
            .any(|r| r.name == "Base" && r.heritage == Some(HeritageKind::Extends)));
        assert!(derived.members.iter().any(|m| m.name == "Name"));
    }

    #[test]
    fn imports_record_alias_and_side_effect_forms() {
        let analysis = parse(
            r#"
package main

import (
    "fmt"
    log "github.com/rs/zerolog"
    _ "net/http/pprof"
)

func main() {
    fmt.Println("hi")
    log.Print("hi")
}
"#,
        );
        assert!(analysis
            .imports
            .iter()
            .any(|i| i.source == "fmt" && i.imported == "fmt"));
        let zerolog = analysis
            .imports
            .iter()
            .find(|i| i.source == "github.com/rs/zerolog")
            .unwrap();
        assert_eq!(zerolog.alias.as_deref(), Some("log"));
        assert!(analysis.imports.iter().any(|i| {
            i.source == "net/http/pprof"
                && i.kind == crate::extractors::base::ImportKind::SideEffect
        }));

        // The package scope is also named "main"; pick the function.
        let main_fn = analysis
            .scopes
            .iter()
            .find(|s| s.name == "main" && s.scope_type == ScopeType::Function)
            .unwrap();
        assert!(main_fn.import_references.iter().any(|i| i.source == "fmt"));
        assert!(main_fn
            .import_references
            .iter()
            .any(|i| i.source == "github.com/rs/zerolog"));
        assert!(main_fn
            .dependencies
            .contains(&"github".to_string()) || main_fn.dependencies.contains(&"fmt".to_string()));
    }

    #[test]
    fn interfaces_collect_method_members() {
        let analysis = parse(
            r#"
package shapes

type Shape interface {
    Area() float64
    Perimeter() float64
}
"#,
        );
        let shape = analysis.scopes.iter().find(|s| s.name == "Shape").unwrap();
        assert_eq!(shape.scope_type, ScopeType::Interface);
        assert_eq!(shape.members.len(), 2);
        assert!(shape.members.iter().any(|m| m.name == "Area"));
    }
}
