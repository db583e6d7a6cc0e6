/// C scope extractor with support for:
/// - Function definitions (names recovered through pointer/array declarators)
/// - Structs, unions, enums, typedefs
/// - File-level variable and constant declarations
/// - Preprocessor includes as imports, static linkage as visibility
use std::collections::HashSet;

use once_cell::sync::Lazy;
use tree_sitter::{Node, Tree};

use crate::extractors::base::{BaseExtractor, ParentContext, ScopeFileAnalysis};
use crate::extractors::config::{NodeTypeConfig, C};

mod declarations;
mod imports;

static KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
        "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long", "register",
        "restrict", "return", "short", "signed", "sizeof", "static", "struct", "switch",
        "typedef", "union", "unsigned", "void", "volatile", "while", "_Bool", "_Complex",
        "_Atomic", "_Static_assert", "_Thread_local",
    ]
    .into_iter()
    .collect()
});

static BUILTINS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "printf", "fprintf", "sprintf", "snprintf", "scanf", "sscanf", "puts", "putchar",
        "getchar", "malloc", "calloc", "realloc", "free", "memcpy", "memmove", "memset",
        "memcmp", "strcmp", "strncmp", "strcpy", "strncpy", "strcat", "strncat", "strlen",
        "strchr", "strrchr", "strstr", "strtol", "strtoul", "strtod", "atoi", "atol", "atof",
        "fopen", "fclose", "fread", "fwrite", "fseek", "ftell", "fgets", "fputs", "exit",
        "abort", "assert", "abs", "labs", "qsort", "bsearch", "NULL", "EOF", "FILE", "size_t",
        "ssize_t", "ptrdiff_t", "intptr_t", "uintptr_t", "int8_t", "int16_t", "int32_t",
        "int64_t", "uint8_t", "uint16_t", "uint32_t", "uint64_t", "bool", "true", "false",
        "stdin", "stdout", "stderr", "errno", "va_list", "va_start", "va_end", "va_arg",
    ]
    .into_iter()
    .collect()
});

pub struct CExtractor {
    pub(crate) base: BaseExtractor,
}

impl CExtractor {
    pub fn new(file_path: String, content: String) -> Self {
        Self {
            base: BaseExtractor::new("c", file_path, content),
        }
    }

    pub fn extract(mut self, tree: &Tree) -> ScopeFileAnalysis {
        let root = tree.root_node();
        imports::collect_imports(&mut self, root);
        self.walk(root, None);
        self.base.finish(tree)
    }

    pub(crate) fn config(&self) -> &'static NodeTypeConfig {
        &C
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

    fn extract_scope(&mut self, node: Node, parent: Option<&ParentContext>) -> Option<ParentContext> {
        match node.kind() {
            "function_definition" => declarations::extract_function(self, node, parent),
            "struct_specifier" | "union_specifier" => {
                declarations::extract_record(self, node, parent)
            }
            "enum_specifier" => declarations::extract_enum(self, node, parent),
            "type_definition" => declarations::extract_typedef(self, node, parent),
            "declaration" => declarations::extract_file_declaration(self, node, parent),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::base::ScopeType;

    fn parse(source: &str) -> ScopeFileAnalysis {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_c::LANGUAGE.into())
            .unwrap();
        let tree = parser.parse(source, None).unwrap();
        CExtractor::new("src/util.c".into(), source.to_string()).extract(&tree)
    }

    #[test]
    fn function_name_survives_pointer_declarators() {
        let analysis = parse(
            r#"
char *duplicate(const char *input) {
    return 0;
}

int (*selector(int mode))(int) {
    return 0;
}
"#,
        );
        let dup = analysis
            .scopes
            .iter()
            .find(|s| s.name == "duplicate")
            .expect("pointer-returning function");
        assert_eq!(dup.scope_type, ScopeType::Function);
        assert!(dup.parameters.iter().any(|p| p.name == "input"));
        // Function-pointer return types still unwrap to the inner name.
        assert!(analysis.scopes.iter().any(|s| s.name == "selector"));
    }

    #[test]
    fn typedef_struct_yields_single_named_struct() {
        let analysis = parse(
            r#"
typedef struct {
    double x;
    double y;
} Point;

struct Node {
    struct Node *next;
    int value;
};
"#,
        );
        let point = analysis.scopes.iter().find(|s| s.name == "Point").unwrap();
        assert_eq!(point.scope_type, ScopeType::Struct);
        assert!(point.members.iter().any(|m| m.name == "x"));
        // The anonymous inner specifier never becomes its own scope.
        assert_eq!(
            analysis
                .scopes
                .iter()
                .filter(|s| s.scope_type == ScopeType::Struct)
                .count(),
            2
        );
        let node = analysis.scopes.iter().find(|s| s.name == "Node").unwrap();
        assert!(node.members.iter().any(|m| m.name == "next"));
    }

    #[test]
    fn includes_split_local_from_system() {
        let analysis = parse(
            r#"
#include <stdio.h>
#include "parser.h"

void run(void) {
    printf("ok");
}
"#,
        );
        let stdio = analysis.imports.iter().find(|i| i.source == "stdio.h").unwrap();
        assert!(!stdio.is_local);
        let parser = analysis.imports.iter().find(|i| i.source == "parser.h").unwrap();
        assert!(parser.is_local);
        assert_eq!(parser.imported, "parser");
        // Only non-local includes surface as dependency roots.
        assert!(analysis.dependencies.contains(&"stdio".to_string()));
        assert!(!analysis.dependencies.iter().any(|d| d.starts_with("parser")));
    }

    #[test]
    fn static_linkage_is_private() {
        let analysis = parse(
            r#"
static int helper(int a) { return a; }
int entry(int a) { return helper(a); }
"#,
        );
        let helper = analysis.scopes.iter().find(|s| s.name == "helper").unwrap();
        assert!(helper
            .modifiers
            .iter()
            .any(|m| matches!(m, crate::extractors::base::Modifier::Static)));
        assert!(!analysis.exports.contains(&"helper".to_string()));
        assert!(analysis.exports.contains(&"entry".to_string()));

        let entry = analysis.scopes.iter().find(|s| s.name == "entry").unwrap();
        assert!(entry
            .identifier_references
            .iter()
            .any(|r| r.name == "helper"));
    }

    #[test]
    fn enums_capture_members_and_values() {
        let analysis = parse(
            r#"
enum Color {
    RED = 1,
    GREEN,
    BLUE = 4,
};
"#,
        );
        let color = analysis.scopes.iter().find(|s| s.name == "Color").unwrap();
        assert_eq!(color.scope_type, ScopeType::Enum);
        let red = color.enum_members.iter().find(|m| m.name == "RED").unwrap();
        assert_eq!(red.value.as_deref(), Some("1"));
        assert!(color.enum_members.iter().any(|m| m.name == "GREEN"));
    }

    #[test]
    fn file_level_const_becomes_constant_scope() {
        let analysis = parse(
            r#"
const int MAX_DEPTH = 32;
int counter = 0;

void bump(void) {
    int local = 1;
    counter += local;
}
"#,
        );
        let max = analysis.scopes.iter().find(|s| s.name == "MAX_DEPTH").unwrap();
        assert_eq!(max.scope_type, ScopeType::Constant);
        let counter = analysis.scopes.iter().find(|s| s.name == "counter").unwrap();
        assert_eq!(counter.scope_type, ScopeType::Variable);
        // Locals inside function bodies never become scopes.
        assert!(!analysis.scopes.iter().any(|s| s.name == "local"));
    }
}
