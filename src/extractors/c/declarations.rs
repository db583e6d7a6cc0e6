// C construct builders: functions, records, enums, typedefs and
// file-level declarations. Names sit at the bottom of declarator
// chains (pointer, array, function, parenthesized), so every builder
// funnels through the same unwrap loop.

use std::collections::HashSet;

use tree_sitter::Node;

use crate::extractors::base::types::depth_under;
use crate::extractors::base::{
    EnumMember, IdentifierReference, Member, Modifier, Parameter, ParentContext, ScopeOptions,
    ScopeType,
};

use super::CExtractor;

const DECLARATOR_KINDS: &[&str] = &[
    "pointer_declarator",
    "array_declarator",
    "function_declarator",
    "parenthesized_declarator",
    "init_declarator",
    "attributed_declarator",
];

/// Walks a declarator chain down to the identifier it declares.
pub(super) fn innermost_declarator(node: Node) -> Option<Node> {
    let mut current = node;
    loop {
        match current.kind() {
            "identifier" | "field_identifier" | "type_identifier" => return Some(current),
            kind if DECLARATOR_KINDS.contains(&kind) => {
                current = current
                    .child_by_field_name("declarator")
                    .or_else(|| current.named_child(0))?;
            }
            _ => return None,
        }
    }
}

/// The declarator chain of a function definition, resolved to the declared
/// name and the function_declarator that carries its parameter list. For
/// function-pointer-returning definitions the innermost declarator wins.
fn unwrap_function(declarator: Node) -> Option<(Node, Node)> {
    let mut current = declarator;
    let mut fn_decl = None;
    loop {
        match current.kind() {
            "identifier" => return fn_decl.map(|f| (current, f)),
            kind if DECLARATOR_KINDS.contains(&kind) => {
                if kind == "function_declarator" {
                    fn_decl = Some(current);
                }
                current = current
                    .child_by_field_name("declarator")
                    .or_else(|| current.named_child(0))?;
            }
            _ => return None,
        }
    }
}

pub(super) fn extract_function(
    x: &mut CExtractor,
    node: Node,
    parent: Option<&ParentContext>,
) -> Option<ParentContext> {
    let declarator = node.child_by_field_name("declarator")?;
    let (name_node, fn_decl) = unwrap_function(declarator)?;
    let name = x.base.get_node_text(&name_node);
    let parameters = extract_parameters(x, fn_decl.child_by_field_name("parameters"));

    let options = ScopeOptions {
        signature: Some(signature_text(x, node)),
        parameters: parameters.clone(),
        return_type: x.base.get_field_text(&node, "type"),
        modifiers: linkage_modifiers(x, node),
        parent: parent.map(|p| p.name.clone()),
        depth: depth_under(parent),
        ..Default::default()
    };
    let idx = x
        .base
        .create_scope(&node, name.clone(), ScopeType::Function, x.config(), options);

    let exclude: HashSet<String> = parameters.into_iter().map(|p| p.name).collect();
    finalize(x, idx, node, exclude, Vec::new());
    if !is_static(x, node) {
        x.base.mark_export(idx);
    }
    Some(ParentContext::new(name, false, depth_under(parent)))
}

/// Struct and union specifiers with a body. Bodyless occurrences are type
/// references; specifiers directly under a type_definition are handled by
/// the typedef builder so the name comes from the typedef.
pub(super) fn extract_record(
    x: &mut CExtractor,
    node: Node,
    parent: Option<&ParentContext>,
) -> Option<ParentContext> {
    let body = node.child_by_field_name("body")?;
    if node.parent().is_some_and(|p| p.kind() == "type_definition") {
        return None;
    }
    let name = x
        .base
        .get_field_text(&node, "name")
        .unwrap_or_else(|| x.base.anonymous_name(ScopeType::Struct));

    build_record(x, node, node, body, name, parent)
}

pub(super) fn extract_enum(
    x: &mut CExtractor,
    node: Node,
    parent: Option<&ParentContext>,
) -> Option<ParentContext> {
    let body = node.child_by_field_name("body")?;
    if node.parent().is_some_and(|p| p.kind() == "type_definition") {
        return None;
    }
    let name = x
        .base
        .get_field_text(&node, "name")
        .unwrap_or_else(|| x.base.anonymous_name(ScopeType::Enum));

    build_enum(x, node, body, name, parent)
}

/// A typedef names whatever its type child declares. Record and enum
/// bodies fold into a single scope under the typedef name; anything else
/// becomes a type alias.
pub(super) fn extract_typedef(
    x: &mut CExtractor,
    node: Node,
    parent: Option<&ParentContext>,
) -> Option<ParentContext> {
    let declarator = node.child_by_field_name("declarator")?;
    let name = x.base.get_node_text(&innermost_declarator(declarator)?);
    let type_node = node.child_by_field_name("type")?;

    match type_node.kind() {
        "struct_specifier" | "union_specifier" => {
            if let Some(body) = type_node.child_by_field_name("body") {
                return build_record(x, node, type_node, body, name, parent);
            }
        }
        "enum_specifier" => {
            if let Some(body) = type_node.child_by_field_name("body") {
                return build_enum(x, node, body, name, parent);
            }
        }
        _ => {}
    }

    let options = ScopeOptions {
        signature: Some(x.base.get_node_text(&node).trim_end_matches(';').trim().to_string()),
        return_type: Some(x.base.get_node_text(&type_node)),
        modifiers: vec![Modifier::Public],
        parent: parent.map(|p| p.name.clone()),
        depth: depth_under(parent),
        ..Default::default()
    };
    let idx = x
        .base
        .create_scope(&node, name.clone(), ScopeType::TypeAlias, x.config(), options);
    finalize(x, idx, node, HashSet::new(), Vec::new());
    x.base.mark_export(idx);
    Some(ParentContext::new(name, true, depth_under(parent)))
}

/// File-level variable and constant declarations. Locals inside function
/// bodies and function prototypes stay out.
pub(super) fn extract_file_declaration(
    x: &mut CExtractor,
    node: Node,
    parent: Option<&ParentContext>,
) -> Option<ParentContext> {
    if x.base.find_parent_of_type(&node, "function_definition").is_some() {
        return None;
    }

    let is_const = x
        .base
        .find_children_by_type(&node, "type_qualifier")
        .iter()
        .any(|q| x.base.get_node_text(q) == "const");
    let scope_type = if is_const {
        ScopeType::Constant
    } else {
        ScopeType::Variable
    };

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if !DECLARATOR_KINDS.contains(&child.kind()) && child.kind() != "identifier" {
            continue;
        }
        // A prototype declares a function elsewhere, not a variable here.
        if child.kind() == "function_declarator"
            || !x.base.find_nodes_by_type(&child, "function_declarator").is_empty()
        {
            continue;
        }
        let Some(name_node) = innermost_declarator(child) else {
            continue;
        };
        let name = x.base.get_node_text(&name_node);
        let options = ScopeOptions {
            signature: Some(x.base.get_node_text(&node).trim_end_matches(';').trim().to_string()),
            return_type: x.base.get_field_text(&node, "type"),
            modifiers: linkage_modifiers(x, node),
            parent: parent.map(|p| p.name.clone()),
            depth: depth_under(parent),
            ..Default::default()
        };
        let idx = x
            .base
            .create_scope(&node, name.clone(), scope_type, x.config(), options);
        finalize(x, idx, node, HashSet::new(), Vec::new());
        if !is_static(x, node) {
            x.base.mark_export(idx);
        }
    }
    None
}

// --- shared helpers ---

fn build_record(
    x: &mut CExtractor,
    scope_node: Node,
    specifier: Node,
    body: Node,
    name: String,
    parent: Option<&ParentContext>,
) -> Option<ParentContext> {
    let members = extract_record_members(x, body);
    let options = ScopeOptions {
        signature: Some(signature_text(x, specifier)),
        members,
        modifiers: vec![Modifier::Public],
        parent: parent.map(|p| p.name.clone()),
        depth: depth_under(parent),
        ..Default::default()
    };
    let idx = x
        .base
        .create_scope(&scope_node, name.clone(), ScopeType::Struct, x.config(), options);
    // References come off the specifier so member types inside the body
    // are visible even when the scope node is the enclosing typedef.
    finalize(x, idx, specifier, HashSet::new(), Vec::new());
    x.base.mark_export(idx);
    Some(ParentContext::new(name, true, depth_under(parent)))
}

fn build_enum(
    x: &mut CExtractor,
    scope_node: Node,
    body: Node,
    name: String,
    parent: Option<&ParentContext>,
) -> Option<ParentContext> {
    let mut enum_members = Vec::new();
    for enumerator in x.base.find_children_by_type(&body, "enumerator") {
        let Some(member_name) = x.base.get_field_text(&enumerator, "name") else {
            continue;
        };
        enum_members.push(EnumMember {
            name: member_name,
            value: x.base.get_field_text(&enumerator, "value"),
            line: (enumerator.start_position().row + 1) as u32,
        });
    }

    let options = ScopeOptions {
        signature: Some(format!("enum {}", name)),
        enum_members,
        modifiers: vec![Modifier::Public],
        parent: parent.map(|p| p.name.clone()),
        depth: depth_under(parent),
        ..Default::default()
    };
    let idx = x
        .base
        .create_scope(&scope_node, name.clone(), ScopeType::Enum, x.config(), options);
    finalize(x, idx, scope_node, HashSet::new(), Vec::new());
    x.base.mark_export(idx);
    Some(ParentContext::new(name, true, depth_under(parent)))
}

fn extract_record_members(x: &CExtractor, body: Node) -> Vec<Member> {
    let mut members = Vec::new();
    for field in x.base.find_children_by_type(&body, "field_declaration") {
        let type_text = x.base.get_field_text(&field, "type");
        let mut cursor = field.walk();
        for child in field.named_children(&mut cursor) {
            if !DECLARATOR_KINDS.contains(&child.kind()) && child.kind() != "field_identifier" {
                continue;
            }
            if let Some(name_node) = innermost_declarator(child) {
                members.push(Member {
                    name: x.base.get_node_text(&name_node),
                    declared_type: type_text.clone(),
                    accessibility: Some(Modifier::Public),
                    line: (field.start_position().row + 1) as u32,
                });
            }
        }
    }
    members
}

fn extract_parameters(x: &CExtractor, list: Option<Node>) -> Vec<Parameter> {
    let Some(list) = list else {
        return Vec::new();
    };
    let mut parameters = Vec::new();
    let mut cursor = list.walk();
    for child in list.named_children(&mut cursor) {
        match child.kind() {
            "parameter_declaration" => {
                let Some(name_node) = child
                    .child_by_field_name("declarator")
                    .and_then(innermost_declarator)
                else {
                    // `void` or an abstract declarator, nothing is named.
                    continue;
                };
                parameters.push(Parameter {
                    name: x.base.get_node_text(&name_node),
                    declared_type: x.base.get_field_text(&child, "type"),
                    optional: false,
                    rest: false,
                    line: (child.start_position().row + 1) as u32,
                    column: child.start_position().column as u32,
                });
            }
            "variadic_parameter" => {
                parameters.push(Parameter {
                    name: "...".to_string(),
                    declared_type: None,
                    optional: false,
                    rest: true,
                    line: (child.start_position().row + 1) as u32,
                    column: child.start_position().column as u32,
                });
            }
            _ => {}
        }
    }
    parameters
}

fn linkage_modifiers(x: &CExtractor, node: Node) -> Vec<Modifier> {
    let mut modifiers = Vec::new();
    for spec in x.base.find_children_by_type(&node, "storage_class_specifier") {
        match x.base.get_node_text(&spec).as_str() {
            "static" => {
                modifiers.push(Modifier::Static);
                modifiers.push(Modifier::Private);
            }
            "extern" => modifiers.push(Modifier::Public),
            _ => {}
        }
    }
    if !modifiers.contains(&Modifier::Private) {
        modifiers.push(Modifier::Public);
        modifiers.push(Modifier::Export);
    }
    modifiers
}

fn is_static(x: &CExtractor, node: Node) -> bool {
    x.base
        .find_children_by_type(&node, "storage_class_specifier")
        .iter()
        .any(|s| x.base.get_node_text(s) == "static")
}

fn signature_text(x: &CExtractor, node: Node) -> String {
    let text = x.base.get_node_text(&node);
    let end = node
        .child_by_field_name("body")
        .map(|b| b.start_byte().saturating_sub(node.start_byte()))
        .unwrap_or(text.len())
        .min(text.len());
    text[..end].trim().trim_end_matches('{').trim().to_string()
}

fn finalize(
    x: &mut CExtractor,
    idx: usize,
    node: Node,
    exclude: HashSet<String>,
    synthetic: Vec<IdentifierReference>,
) {
    let (config, keywords, builtins) = (x.config(), x.keywords(), x.builtins());
    x.base
        .finalize_scope(idx, node, config, keywords, builtins, exclude, synthetic);
}
