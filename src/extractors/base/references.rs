// Generic identifier-reference collection
//
// Language-agnostic walk over a construct's subtree that records every leaf
// identifier use: plain references, call targets, and member accesses with
// their qualifiers. Driven entirely by the per-language NodeTypeConfig plus
// the language's keyword and builtin sets; nothing here matches node-kind
// strings directly.

use std::collections::HashSet;

use tree_sitter::Node;

use super::extractor::BaseExtractor;
use super::types::{HeritageKind, IdentifierReference, ReferenceKind};
use crate::extractors::config::NodeTypeConfig;

/// Member-access field-name pairs across the supported grammars:
/// (object field, member field).
const MEMBER_FIELDS: &[(&str, &str)] = &[
    ("value", "field"),    // rust field_expression
    ("argument", "field"), // c field_expression
    ("object", "property"), // typescript member_expression
    ("object", "attribute"), // python attribute
    ("operand", "field"),  // go selector_expression
];

/// Collect identifier references inside `node`, excluding names in `exclude`
/// (the construct's own name, parameters, local bindings, receiver), language
/// keywords, and known built-in symbols. Nested scope constructs are not
/// descended into; they collect their own references.
pub fn collect_references(
    base: &BaseExtractor,
    node: Node,
    config: &NodeTypeConfig,
    keywords: &HashSet<&'static str>,
    builtins: &HashSet<&'static str>,
    exclude: &HashSet<String>,
) -> Vec<IdentifierReference> {
    let mut collector = Collector {
        base,
        config,
        keywords,
        builtins,
        exclude,
        handled: HashSet::new(),
        seen: HashSet::new(),
        refs: Vec::new(),
    };
    collector.walk(node, true);
    collector.refs
}

/// Build an unclassified reference for `name` at `node`'s position. Used by
/// the collector and by language extractors injecting synthetic references
/// for impl/extends/implements/decorator targets.
pub fn make_reference(
    base: &BaseExtractor,
    node: &Node,
    name: String,
    qualifier: Option<String>,
    heritage: Option<HeritageKind>,
) -> IdentifierReference {
    let pos = node.start_position();
    IdentifierReference {
        name,
        qualifier,
        line: (pos.row + 1) as u32,
        column: pos.column as u32,
        context_line: base.line_text(pos.row),
        kind: ReferenceKind::Unknown,
        source: None,
        is_local_import: None,
        target_scope: None,
        heritage,
    }
}

/// Cyclomatic-style complexity: 1 plus every branching/loop construct and
/// short-circuit logical operator inside the subtree.
pub fn compute_complexity(base: &BaseExtractor, node: Node, config: &NodeTypeConfig) -> u32 {
    1 + count_branches(base, node, config)
}

fn count_branches(base: &BaseExtractor, node: Node, config: &NodeTypeConfig) -> u32 {
    let mut count = 0;
    let kind = node.kind();
    if config.branch.contains(&kind) {
        count += 1;
    } else if config.logical_binary.contains(&kind) {
        if let Some(op) = node.child_by_field_name("operator") {
            let text = base.get_node_text(&op);
            if text == "&&" || text == "||" {
                count += 1;
            }
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        count += count_branches(base, child, config);
    }
    count
}

/// A construct node that actually introduces a nested scope. Some kinds
/// double as type references when they have no body.
fn is_nested_scope(config: &NodeTypeConfig, node: Node) -> bool {
    config.is_scope_construct(node.kind()) && node.child_by_field_name("body").is_some()
}

/// Names bound locally inside a construct's body (let/var/assignment
/// targets). Seeds the reference-exclusion set.
pub fn collect_local_bindings(
    base: &BaseExtractor,
    node: Node,
    config: &NodeTypeConfig,
) -> HashSet<String> {
    let mut bindings = HashSet::new();
    collect_bindings_recursive(base, node, config, true, &mut bindings);
    bindings
}

fn collect_bindings_recursive(
    base: &BaseExtractor,
    node: Node,
    config: &NodeTypeConfig,
    is_root: bool,
    bindings: &mut HashSet<String>,
) {
    let kind = node.kind();
    if !is_root && is_nested_scope(config, node) {
        return;
    }
    if config.binding.contains(&kind) {
        let target = node
            .child_by_field_name("name")
            .or_else(|| node.child_by_field_name("left"))
            .or_else(|| node.child_by_field_name("pattern"))
            .or_else(|| node.child(0));
        if let Some(target) = target {
            collect_identifier_leaves(base, target, config, bindings);
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_bindings_recursive(base, child, config, false, bindings);
    }
}

fn collect_identifier_leaves(
    base: &BaseExtractor,
    node: Node,
    config: &NodeTypeConfig,
    out: &mut HashSet<String>,
) {
    if config.identifier.contains(&node.kind()) {
        out.insert(base.get_node_text(&node));
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_identifier_leaves(base, child, config, out);
    }
}

struct Collector<'a> {
    base: &'a BaseExtractor,
    config: &'a NodeTypeConfig,
    keywords: &'a HashSet<&'static str>,
    builtins: &'a HashSet<&'static str>,
    exclude: &'a HashSet<String>,
    /// Node ids already consumed by call/member special-casing
    handled: HashSet<usize>,
    /// (name, line, column) dedup
    seen: HashSet<(String, u32, u32)>,
    refs: Vec<IdentifierReference>,
}

impl<'a> Collector<'a> {
    fn walk(&mut self, node: Node, is_root: bool) {
        let kind = node.kind();
        if self.config.skip.contains(&kind) {
            return;
        }
        // Nested scope constructs collect their own references; a bodyless
        // occurrence of the same node kind (e.g. `struct Point` as a type
        // use in C) is a reference site, not a declaration.
        if !is_root && is_nested_scope(self.config, node) {
            return;
        }
        // Import statements declare bindings; their path segments are not
        // identifier uses.
        if self.config.import_like.contains(&kind) {
            return;
        }

        if self.config.call.contains(&kind) {
            self.handle_call(node);
        } else if self.config.member_access.contains(&kind) {
            self.handle_member_access(node);
        } else if self.config.decorator.contains(&kind) {
            self.handle_decorator(node);
        } else if self.config.identifier.contains(&kind) {
            self.handle_identifier(node);
            return;
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk(child, false);
        }
    }

    fn handle_call(&mut self, node: Node) {
        let Some(func) = node
            .child_by_field_name("function")
            .or_else(|| node.child_by_field_name("constructor"))
        else {
            return;
        };
        let func_kind = func.kind();
        if self.config.member_access.contains(&func_kind) {
            self.handle_member_access(func);
        } else if func_kind == "scoped_identifier" {
            self.handle_scoped_path(func);
        } else if self.config.identifier.contains(&func_kind) {
            self.push_plain(func, None);
            self.handled.insert(func.id());
        }
    }

    fn handle_member_access(&mut self, node: Node) {
        if self.handled.contains(&node.id()) {
            return;
        }
        self.handled.insert(node.id());

        if node.kind() == "scoped_identifier" {
            self.handle_scoped_path(node);
            return;
        }

        for (object_field, member_field) in MEMBER_FIELDS {
            let (Some(object), Some(member)) = (
                node.child_by_field_name(object_field),
                node.child_by_field_name(member_field),
            ) else {
                continue;
            };

            let qualifier = if self.config.identifier.contains(&object.kind()) {
                Some(self.base.get_node_text(&object))
            } else {
                None
            };
            let member_name = self.base.get_node_text(&member);
            self.handled.insert(member.id());
            if !self.is_excluded(&member_name) {
                self.push(&member, member_name, qualifier, None);
            }
            return;
        }
    }

    /// `a::b::c` paths: record the final segment with its qualifier, plus the
    /// root segment as a plain reference so local type names still index.
    fn handle_scoped_path(&mut self, node: Node) {
        self.handled.insert(node.id());
        let text = self.base.get_node_text(&node);
        let segments: Vec<&str> = text.split("::").collect();
        if segments.len() < 2 {
            return;
        }
        let name = segments[segments.len() - 1].to_string();
        let qualifier = segments[..segments.len() - 1].join("::");
        let root = segments[0].to_string();

        if !self.is_excluded(&name) {
            self.push(&node, name, Some(qualifier), None);
        }
        if !self.is_excluded(&root) && root.chars().next().is_some_and(char::is_alphabetic) {
            self.push(&node, root, None, None);
        }
        // Walk type arguments inside the path so nested generics still yield
        // their own references.
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "type_arguments" {
                self.walk(child, false);
            }
        }
    }

    fn handle_decorator(&mut self, node: Node) {
        // Innermost name of the decorator expression; calls unwrap to their
        // function, attributes keep their member name.
        let mut target = node;
        loop {
            if self.config.call.contains(&target.kind()) {
                if let Some(func) = target.child_by_field_name("function") {
                    target = func;
                    continue;
                }
            }
            break;
        }
        let name = if self.config.member_access.contains(&target.kind()) {
            MEMBER_FIELDS
                .iter()
                .find_map(|(_, member_field)| target.child_by_field_name(member_field))
                .map(|m| self.base.get_node_text(&m))
        } else {
            let mut found = None;
            let mut cursor = target.walk();
            for child in target.children(&mut cursor) {
                if self.config.identifier.contains(&child.kind()) {
                    found = Some(self.base.get_node_text(&child));
                    break;
                }
            }
            if self.config.identifier.contains(&target.kind()) {
                found = Some(self.base.get_node_text(&target));
            }
            found
        };

        if let Some(name) = name {
            if !self.is_excluded(&name) {
                self.push(&node, name, None, Some(HeritageKind::Decorator));
            }
        }
        self.handled.insert(node.id());
        // Leave the subtree marked so the plain-identifier pass skips it.
        mark_subtree(&mut self.handled, node);
    }

    fn handle_identifier(&mut self, node: Node) {
        if self.handled.contains(&node.id()) {
            return;
        }
        // Skip definition positions: the name field of a construct/binding.
        if let Some(parent) = node.parent() {
            if let Some(name_child) = parent.child_by_field_name("name") {
                if name_child.id() == node.id()
                    && (self.config.is_scope_construct(parent.kind())
                        || self.config.binding.contains(&parent.kind()))
                {
                    return;
                }
            }
        }
        self.push_plain(node, None);
    }

    fn push_plain(&mut self, node: Node, heritage: Option<HeritageKind>) {
        let name = self.base.get_node_text(&node);
        if self.is_excluded(&name) {
            return;
        }
        self.push(&node, name, None, heritage);
    }

    fn is_excluded(&self, name: &str) -> bool {
        name.is_empty()
            || !name
                .chars()
                .next()
                .is_some_and(|c| c.is_alphabetic() || c == '_')
            || self.keywords.contains(name)
            || self.builtins.contains(name)
            || self.exclude.contains(name)
    }

    fn push(
        &mut self,
        node: &Node,
        name: String,
        qualifier: Option<String>,
        heritage: Option<HeritageKind>,
    ) {
        let pos = node.start_position();
        let key = (name.clone(), (pos.row + 1) as u32, pos.column as u32);
        if !self.seen.insert(key) {
            return;
        }
        self.refs
            .push(make_reference(self.base, node, name, qualifier, heritage));
    }
}

fn mark_subtree(handled: &mut HashSet<usize>, node: Node) {
    handled.insert(node.id());
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        mark_subtree(handled, child);
    }
}
