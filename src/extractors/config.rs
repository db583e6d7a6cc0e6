//! Node-Type Configuration - per-language grammar tables
//!
//! One table per language mapping abstract scope-construct categories to the
//! concrete node-type tags that language's tree-sitter grammar uses. Pure
//! data: every "is this a function node" decision in the shared walk goes
//! through these tables instead of scattered string comparisons.

/// Per-language mapping from abstract construct categories to grammar node
/// kinds. All slices are `'static`; tables are consts below.
#[derive(Debug, Clone, Copy)]
pub struct NodeTypeConfig {
    pub language: &'static str,
    /// Class/struct/trait/interface declarations
    pub class_like: &'static [&'static str],
    /// Function/method/lambda declarations
    pub function_like: &'static [&'static str],
    pub enum_like: &'static [&'static str],
    pub module_like: &'static [&'static str],
    pub type_alias_like: &'static [&'static str],
    /// File-level variable/constant declarations
    pub variable_like: &'static [&'static str],
    pub import_like: &'static [&'static str],
    /// Leaf identifier node kinds eligible as references
    pub identifier: &'static [&'static str],
    /// Call-expression node kinds (special-cased during reference collection)
    pub call: &'static [&'static str],
    /// Member-access node kinds (`a.b` / `a::b` forms)
    pub member_access: &'static [&'static str],
    pub decorator: &'static [&'static str],
    /// Branching/loop nodes counted toward complexity
    pub branch: &'static [&'static str],
    /// Binary-expression kinds whose `&&`/`||`/`and`/`or` operators count
    /// toward complexity
    pub logical_binary: &'static [&'static str],
    /// Nodes that declare local bindings (seed the reference-exclusion set)
    pub binding: &'static [&'static str],
    /// Subtrees never searched for references (comments, literals)
    pub skip: &'static [&'static str],
}

impl NodeTypeConfig {
    /// Look up the table for a language name (`tsx` shares the
    /// typescript table).
    pub fn for_language(language: &str) -> Option<&'static NodeTypeConfig> {
        match language {
            "rust" => Some(&RUST),
            "go" => Some(&GO),
            "c" => Some(&C),
            "python" => Some(&PYTHON),
            "typescript" | "tsx" => Some(&TYPESCRIPT),
            _ => None,
        }
    }

    pub fn is_scope_construct(&self, kind: &str) -> bool {
        self.class_like.contains(&kind)
            || self.function_like.contains(&kind)
            || self.enum_like.contains(&kind)
            || self.module_like.contains(&kind)
            || self.type_alias_like.contains(&kind)
            || self.variable_like.contains(&kind)
    }
}

pub static RUST: NodeTypeConfig = NodeTypeConfig {
    language: "rust",
    class_like: &["struct_item", "trait_item", "union_item"],
    function_like: &[
        "function_item",
        "function_signature_item",
        "closure_expression",
    ],
    enum_like: &["enum_item"],
    module_like: &["mod_item"],
    type_alias_like: &["type_item", "associated_type"],
    variable_like: &["const_item", "static_item"],
    import_like: &["use_declaration"],
    identifier: &["identifier", "type_identifier", "field_identifier"],
    call: &["call_expression"],
    member_access: &["field_expression", "scoped_identifier"],
    decorator: &["attribute_item"],
    branch: &[
        "if_expression",
        "match_arm",
        "while_expression",
        "for_expression",
        "loop_expression",
    ],
    logical_binary: &["binary_expression"],
    binding: &["let_declaration"],
    skip: &[
        "line_comment",
        "block_comment",
        "string_literal",
        "raw_string_literal",
        "char_literal",
    ],
};

pub static GO: NodeTypeConfig = NodeTypeConfig {
    language: "go",
    class_like: &["type_declaration"],
    function_like: &["function_declaration", "method_declaration", "func_literal"],
    enum_like: &[],
    module_like: &[],
    type_alias_like: &[],
    variable_like: &["const_declaration", "var_declaration"],
    import_like: &["import_declaration"],
    identifier: &[
        "identifier",
        "type_identifier",
        "field_identifier",
        "package_identifier",
    ],
    call: &["call_expression"],
    member_access: &["selector_expression"],
    decorator: &[],
    branch: &[
        "if_statement",
        "for_statement",
        "expression_case",
        "type_case",
        "communication_case",
    ],
    logical_binary: &["binary_expression"],
    binding: &["short_var_declaration", "var_spec", "const_spec", "range_clause"],
    skip: &[
        "comment",
        "interpreted_string_literal",
        "raw_string_literal",
        "rune_literal",
    ],
};

pub static C: NodeTypeConfig = NodeTypeConfig {
    language: "c",
    class_like: &["struct_specifier", "union_specifier"],
    function_like: &["function_definition"],
    enum_like: &["enum_specifier"],
    module_like: &[],
    type_alias_like: &["type_definition"],
    variable_like: &["declaration"],
    import_like: &["preproc_include"],
    identifier: &["identifier", "type_identifier", "field_identifier"],
    call: &["call_expression"],
    member_access: &["field_expression"],
    decorator: &[],
    branch: &[
        "if_statement",
        "for_statement",
        "while_statement",
        "do_statement",
        "case_statement",
        "conditional_expression",
    ],
    logical_binary: &["binary_expression"],
    binding: &["init_declarator"],
    skip: &["comment", "string_literal", "char_literal", "preproc_arg"],
};

pub static PYTHON: NodeTypeConfig = NodeTypeConfig {
    language: "python",
    class_like: &["class_definition"],
    function_like: &["function_definition", "lambda"],
    enum_like: &[],
    module_like: &[],
    type_alias_like: &[],
    variable_like: &[],
    import_like: &["import_statement", "import_from_statement"],
    identifier: &["identifier"],
    call: &["call"],
    member_access: &["attribute"],
    decorator: &["decorator"],
    branch: &[
        "if_statement",
        "elif_clause",
        "for_statement",
        "while_statement",
        "except_clause",
        "conditional_expression",
        "case_clause",
        "boolean_operator",
    ],
    logical_binary: &[],
    binding: &["assignment", "named_expression"],
    skip: &["comment", "string"],
};

pub static TYPESCRIPT: NodeTypeConfig = NodeTypeConfig {
    language: "typescript",
    class_like: &[
        "class_declaration",
        "abstract_class_declaration",
        "interface_declaration",
    ],
    function_like: &[
        "function_declaration",
        "generator_function_declaration",
        "method_definition",
        "arrow_function",
        "function_expression",
    ],
    enum_like: &["enum_declaration"],
    module_like: &["internal_module"],
    type_alias_like: &["type_alias_declaration"],
    variable_like: &["lexical_declaration", "variable_declaration"],
    import_like: &["import_statement"],
    identifier: &["identifier", "type_identifier"],
    call: &["call_expression", "new_expression"],
    member_access: &["member_expression"],
    decorator: &["decorator"],
    branch: &[
        "if_statement",
        "for_statement",
        "for_in_statement",
        "while_statement",
        "do_statement",
        "switch_case",
        "ternary_expression",
        "catch_clause",
    ],
    logical_binary: &["binary_expression"],
    binding: &["variable_declarator"],
    skip: &["comment", "string", "template_string", "regex"],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_supported_language_has_a_table() {
        for language in ["rust", "go", "c", "python", "typescript", "tsx"] {
            assert!(
                NodeTypeConfig::for_language(language).is_some(),
                "missing node-type table for '{}'",
                language
            );
        }
        assert!(NodeTypeConfig::for_language("ruby").is_none());
    }

    #[test]
    fn tsx_shares_the_typescript_table() {
        let ts = NodeTypeConfig::for_language("typescript").unwrap();
        let tsx = NodeTypeConfig::for_language("tsx").unwrap();
        assert!(std::ptr::eq(ts, tsx));
    }

    #[test]
    fn scope_construct_lookup_covers_all_categories() {
        let rust = NodeTypeConfig::for_language("rust").unwrap();
        assert!(rust.is_scope_construct("struct_item"));
        assert!(rust.is_scope_construct("function_item"));
        assert!(rust.is_scope_construct("enum_item"));
        assert!(rust.is_scope_construct("mod_item"));
        assert!(!rust.is_scope_construct("call_expression"));
    }
}
