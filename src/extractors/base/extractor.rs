// BaseExtractor - shared machinery for all language extractors
//
// Owns the per-file mutable state (flat scope list, file-level imports and
// exports) and the utility methods every construct builder leans on: node
// text, doc comments, content-addressed ids, AST-issue collection, and the
// final assembly of a ScopeFileAnalysis.

use tracing::debug;
use tree_sitter::Node;

use super::references;
use super::types::{
    ImportReference, ScopeFileAnalysis, ScopeInfo, ScopeOptions, ScopeType,
};
use crate::extractors::config::NodeTypeConfig;

/// Most issues a broken file produces are repetitive; keep the ledger short.
const MAX_AST_ISSUES: usize = 25;

pub struct BaseExtractor {
    pub language: &'static str,
    pub file_path: String,
    pub content: String,
    /// Flat, pre-order scope list (parents precede children)
    pub scopes: Vec<ScopeInfo>,
    /// File-level imports in declaration order
    pub imports: Vec<ImportReference>,
    /// File-level exported names
    pub exports: Vec<String>,
    file_issues: Vec<String>,
}

impl BaseExtractor {
    pub fn new(language: &'static str, file_path: String, content: String) -> Self {
        Self {
            language,
            file_path,
            content,
            scopes: Vec::new(),
            imports: Vec::new(),
            exports: Vec::new(),
            file_issues: Vec::new(),
        }
    }

    /// Get text from a tree-sitter node, tolerating out-of-range spans.
    pub fn get_node_text(&self, node: &Node) -> String {
        let start_byte = node.start_byte();
        let end_byte = node.end_byte();

        let content_bytes = self.content.as_bytes();
        if start_byte < content_bytes.len() && end_byte <= content_bytes.len() {
            String::from_utf8_lossy(&content_bytes[start_byte..end_byte]).to_string()
        } else {
            String::new()
        }
    }

    /// The source line at a 0-based row, trimmed of trailing whitespace.
    pub fn line_text(&self, row: usize) -> String {
        self.content
            .lines()
            .nth(row)
            .map(|l| l.trim_end().to_string())
            .unwrap_or_default()
    }

    /// Content-addressed scope identity: md5 of path + name + span + content.
    /// Identical input always yields an identical id.
    pub fn generate_id(&self, name: &str, start_line: u32, end_line: u32, content: &str) -> String {
        let input = format!(
            "{}:{}:{}:{}:{}",
            self.file_path, name, start_line, end_line, content
        );
        let digest = md5::compute(input.as_bytes());
        format!("{:x}", digest)
    }

    /// Placeholder name for anonymous constructs, never empty.
    pub fn anonymous_name(&self, scope_type: ScopeType) -> String {
        let kind = match scope_type {
            ScopeType::Function => "Function",
            ScopeType::Lambda => "Lambda",
            ScopeType::Class => "Class",
            ScopeType::Struct => "Struct",
            ScopeType::Enum => "Enum",
            ScopeType::Module => "Module",
            ScopeType::Namespace => "Namespace",
            _ => "Scope",
        };
        "Anonymous".to_string() + kind
    }

    /// Find a documentation comment preceding a node by scanning previous
    /// named siblings, then up to three ancestor levels.
    pub fn find_doc_comment(&self, node: &Node) -> Option<String> {
        let mut comments = Vec::new();

        let is_doc_comment = |text: &str| {
            let trimmed = text.trim_start();
            trimmed.starts_with("///")
                || trimmed.starts_with("/**")
                || trimmed.starts_with("/*")
                || trimmed.starts_with("//")
                || trimmed.starts_with("#")
        };

        let mut current = node.prev_named_sibling();
        while let Some(sibling) = current {
            if sibling.kind().contains("comment") {
                let comment_text = self.get_node_text(&sibling);
                if is_doc_comment(&comment_text) {
                    comments.push(comment_text);
                    current = sibling.prev_named_sibling();
                } else {
                    break;
                }
            } else {
                break;
            }
        }

        if comments.is_empty() {
            let mut current_node = *node;
            for _ in 0..3 {
                if let Some(parent) = current_node.parent() {
                    current = parent.prev_named_sibling();
                    while let Some(sibling) = current {
                        if sibling.kind().contains("comment") {
                            let comment_text = self.get_node_text(&sibling);
                            if is_doc_comment(&comment_text) {
                                comments.push(comment_text);
                                current = sibling.prev_named_sibling();
                            } else {
                                break;
                            }
                        } else {
                            break;
                        }
                    }
                    if !comments.is_empty() {
                        break;
                    }
                    current_node = parent;
                } else {
                    break;
                }
            }
        }

        if comments.is_empty() {
            None
        } else {
            comments.reverse();
            Some(comments.join("\n"))
        }
    }

    /// Strip the common leading indentation from a body text. Indentation
    /// is measured in characters, not bytes; multi-byte whitespace counts
    /// as one column.
    pub fn dedent(text: &str) -> String {
        let indent_chars =
            |line: &str| line.chars().take_while(|c| c.is_whitespace()).count();
        let min_indent = text
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(indent_chars)
            .min()
            .unwrap_or(0);
        if min_indent == 0 {
            return text.to_string();
        }
        text.lines()
            .map(|l| {
                let cut = l
                    .char_indices()
                    .nth(min_indent)
                    .map(|(byte, _)| byte)
                    .unwrap_or(l.len());
                &l[cut..]
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Collect parse problems inside a subtree as positioned strings. Hard
    /// syntax errors land in the issue list; tokens the parser inserted to
    /// recover land in the note list. A malformed subtree degrades the
    /// output, it never aborts the walk.
    pub fn collect_ast_diagnostics(&self, node: &Node) -> (Vec<String>, Vec<String>) {
        let mut issues = Vec::new();
        let mut notes = Vec::new();
        self.collect_ast_diagnostics_recursive(node, &mut issues, &mut notes);
        (issues, notes)
    }

    /// Issues and notes for a subtree, flattened into one list.
    pub fn collect_ast_issues(&self, node: &Node) -> Vec<String> {
        let (mut issues, notes) = self.collect_ast_diagnostics(node);
        issues.extend(notes);
        issues
    }

    fn collect_ast_diagnostics_recursive(
        &self,
        node: &Node,
        issues: &mut Vec<String>,
        notes: &mut Vec<String>,
    ) {
        if issues.len() + notes.len() >= MAX_AST_ISSUES {
            return;
        }
        if node.is_error() {
            let pos = node.start_position();
            issues.push(format!(
                "syntax error at {}:{}",
                pos.row + 1,
                pos.column
            ));
            return;
        }
        if node.is_missing() {
            let pos = node.start_position();
            notes.push(format!(
                "missing '{}' at {}:{}",
                node.kind(),
                pos.row + 1,
                pos.column
            ));
            return;
        }
        if !node.has_error() {
            return;
        }
        for i in 0..node.child_count() {
            if let Some(child) = node.child(i) {
                self.collect_ast_diagnostics_recursive(&child, issues, notes);
            }
        }
    }

    /// Record a file-level parse issue (outside any scope).
    pub fn add_file_issue(&mut self, issue: String) {
        if self.file_issues.len() < MAX_AST_ISSUES {
            self.file_issues.push(issue);
        }
    }

    /// Create a scope record for a construct node and push it onto the flat
    /// list. References are attached afterwards by the caller.
    pub fn create_scope(
        &mut self,
        node: &Node,
        name: String,
        scope_type: ScopeType,
        config: &NodeTypeConfig,
        options: ScopeOptions,
    ) -> usize {
        let start_pos = node.start_position();
        let end_pos = node.end_position();
        let start_line = (start_pos.row + 1) as u32;
        let end_line = (end_pos.row + 1) as u32;

        let content = self.get_node_text(node);
        let dedented_content = Self::dedent(&content);
        let id = self.generate_id(&name, start_line, end_line, &content);
        let (ast_issues, ast_notes) = self.collect_ast_diagnostics(node);
        let ast_valid = ast_issues.is_empty() && ast_notes.is_empty();
        let complexity = references::compute_complexity(self, *node, config);
        let lines_of_code = content.lines().count() as u32;
        let doc_comment = options.doc_comment.or_else(|| self.find_doc_comment(node));

        let scope = ScopeInfo {
            id,
            name,
            scope_type,
            file_path: self.file_path.clone(),
            start_line,
            end_line,
            signature: options.signature,
            parameters: options.parameters,
            return_type: options.return_type,
            modifiers: options.modifiers,
            generic_parameters: options.generic_parameters,
            heritage_clauses: options.heritage_clauses,
            content,
            dedented_content,
            doc_comment,
            members: options.members,
            enum_members: options.enum_members,
            variables: Vec::new(),
            identifier_references: Vec::new(),
            import_references: Vec::new(),
            dependencies: Vec::new(),
            exports: Vec::new(),
            ast_valid,
            ast_issues,
            ast_notes,
            complexity,
            lines_of_code,
            parent: options.parent,
            depth: options.depth,
        };

        self.scopes.push(scope);
        self.scopes.len() - 1
    }

    /// Finish a freshly created scope: build its reference-exclusion set
    /// (own name + parameters/receiver passed in `exclude` + local bindings),
    /// collect identifier references, prepend synthetic heritage references,
    /// and cross-reference the file's imports into the scope.
    #[allow(clippy::too_many_arguments)]
    pub fn finalize_scope(
        &mut self,
        scope_index: usize,
        node: Node,
        config: &NodeTypeConfig,
        keywords: &std::collections::HashSet<&'static str>,
        builtins: &std::collections::HashSet<&'static str>,
        mut exclude: std::collections::HashSet<String>,
        synthetic: Vec<super::types::IdentifierReference>,
    ) {
        exclude.insert(self.scopes[scope_index].name.clone());
        let bindings = references::collect_local_bindings(self, node, config);
        exclude.extend(bindings.iter().cloned());

        let mut refs = synthetic;
        refs.extend(references::collect_references(
            self, node, config, keywords, builtins, &exclude,
        ));

        let mut variables: Vec<String> = bindings.into_iter().collect();
        variables.sort_unstable();

        let scope = &mut self.scopes[scope_index];
        scope.identifier_references = refs;
        scope.variables = variables;
        self.cross_reference_imports(scope_index);
    }

    /// Record a name as exported both on the scope and at file level.
    pub fn mark_export(&mut self, scope_index: usize) {
        let name = self.scopes[scope_index].name.clone();
        self.scopes[scope_index].exports.push(name.clone());
        if !self.exports.contains(&name) {
            self.exports.push(name);
        }
    }

    /// Cross-reference a scope's identifier references against the file's
    /// already-collected import list: matches by local name or qualifier
    /// populate the scope's own import_references and dependency names.
    pub fn cross_reference_imports(&mut self, scope_index: usize) {
        let scope = &self.scopes[scope_index];
        let mut matched: Vec<ImportReference> = Vec::new();
        let mut dependencies: Vec<String> = Vec::new();

        for import in &self.imports {
            let local = import.local_name();
            let used = scope.identifier_references.iter().any(|r| {
                r.name == local || r.qualifier.as_deref() == Some(local)
            });
            if !used {
                continue;
            }
            if !matched.contains(import) {
                matched.push(import.clone());
            }
            if !import.is_local {
                let root = import
                    .source
                    .split(['/', ':', '.'])
                    .next()
                    .unwrap_or(&import.source)
                    .to_string();
                if !root.is_empty() && !dependencies.contains(&root) {
                    dependencies.push(root);
                }
            }
        }

        let scope = &mut self.scopes[scope_index];
        scope.import_references = matched;
        scope.dependencies = dependencies;
    }

    /// Assemble the per-file analysis from everything extracted so far.
    pub fn finish(mut self, tree: &tree_sitter::Tree) -> ScopeFileAnalysis {
        let root = tree.root_node();
        if root.has_error() {
            for issue in self.collect_ast_issues(&root) {
                self.add_file_issue(issue);
            }
        }

        let mut dependencies: Vec<String> = Vec::new();
        for import in &self.imports {
            if import.is_local {
                continue;
            }
            let root_name = import
                .source
                .split(['/', ':', '.'])
                .next()
                .unwrap_or(&import.source)
                .to_string();
            if !root_name.is_empty() && !dependencies.contains(&root_name) {
                dependencies.push(root_name);
            }
        }

        let total_lines = self.content.lines().count() as u32;
        let content_hash = blake3::hash(self.content.as_bytes()).to_hex().to_string();
        let ast_valid = self.file_issues.is_empty();

        debug!(
            "extracted {} scopes, {} imports from {} file: {}",
            self.scopes.len(),
            self.imports.len(),
            self.language,
            self.file_path
        );

        ScopeFileAnalysis {
            file_path: self.file_path,
            language: self.language.to_string(),
            scopes: self.scopes,
            total_lines,
            imports: self.imports,
            exports: self.exports,
            dependencies,
            ast_valid,
            ast_issues: self.file_issues,
            content_hash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedent_strips_common_indentation() {
        let text = "    fn inner() {\n        body();\n    }";
        let dedented = BaseExtractor::dedent(text);
        assert_eq!(dedented, "fn inner() {\n    body();\n}");
    }

    #[test]
    fn dedent_handles_multibyte_indentation() {
        let text = "\u{a0}\u{a0}first\n\u{a0}\u{a0}\u{a0}second";
        assert_eq!(BaseExtractor::dedent(text), "first\n\u{a0}second");
    }

    #[test]
    fn dedent_leaves_flush_text_alone() {
        let text = "a\n  b\nc";
        assert_eq!(BaseExtractor::dedent(text), text);
    }

    #[test]
    fn generated_ids_are_content_addressed() {
        let a = BaseExtractor::new("rust", "src/a.rs".into(), String::new());
        let b = BaseExtractor::new("rust", "src/a.rs".into(), String::new());
        assert_eq!(
            a.generate_id("foo", 1, 10, "fn foo() {}"),
            b.generate_id("foo", 1, 10, "fn foo() {}")
        );
        assert_ne!(
            a.generate_id("foo", 1, 10, "fn foo() {}"),
            a.generate_id("foo", 1, 10, "fn foo() { changed(); }")
        );
    }

    #[test]
    fn anonymous_names_are_never_empty() {
        let base = BaseExtractor::new("python", "a.py".into(), String::new());
        assert_eq!(base.anonymous_name(ScopeType::Lambda), "AnonymousLambda");
        assert_eq!(base.anonymous_name(ScopeType::Variable), "AnonymousScope");
    }
}
