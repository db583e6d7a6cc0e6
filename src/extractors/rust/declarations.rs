// Rust construct builders: structs, enums, traits, impl blocks, functions,
// modules, type aliases, constants, closures.

use std::collections::HashSet;

use tree_sitter::Node;

use crate::extractors::base::references::make_reference;
use crate::extractors::base::types::depth_under;
use crate::extractors::base::{
    EnumMember, GenericParameter, HeritageClause, HeritageKind, IdentifierReference, Member,
    Modifier, Parameter, ParentContext, ScopeOptions, ScopeType,
};

use super::RustExtractor;

pub(super) fn extract_struct(
    x: &mut RustExtractor,
    node: Node,
    parent: Option<&ParentContext>,
) -> Option<ParentContext> {
    let name = x.base.get_field_text(&node, "name")?;
    let modifiers = extract_modifiers(x, node);
    let members = node
        .child_by_field_name("body")
        .map(|body| extract_struct_members(x, body))
        .unwrap_or_default();

    let options = ScopeOptions {
        signature: Some(signature_text(x, node)),
        modifiers: modifiers.clone(),
        generic_parameters: extract_generics(x, node),
        members,
        parent: parent.map(|p| p.name.clone()),
        depth: depth_under(parent),
        ..Default::default()
    };
    let idx = x
        .base
        .create_scope(&node, name.clone(), ScopeType::Struct, x.config(), options);
    finalize(x, idx, node, HashSet::new(), Vec::new());
    mark_export(x, idx, &modifiers);
    Some(ParentContext::new(name, true, depth_under(parent)))
}

pub(super) fn extract_enum(
    x: &mut RustExtractor,
    node: Node,
    parent: Option<&ParentContext>,
) -> Option<ParentContext> {
    let name = x.base.get_field_text(&node, "name")?;
    let modifiers = extract_modifiers(x, node);
    let enum_members = node
        .child_by_field_name("body")
        .map(|body| extract_enum_members(x, body))
        .unwrap_or_default();

    let options = ScopeOptions {
        signature: Some(signature_text(x, node)),
        modifiers: modifiers.clone(),
        generic_parameters: extract_generics(x, node),
        enum_members,
        parent: parent.map(|p| p.name.clone()),
        depth: depth_under(parent),
        ..Default::default()
    };
    let idx = x
        .base
        .create_scope(&node, name.clone(), ScopeType::Enum, x.config(), options);
    finalize(x, idx, node, HashSet::new(), Vec::new());
    mark_export(x, idx, &modifiers);
    Some(ParentContext::new(name, true, depth_under(parent)))
}

pub(super) fn extract_trait(
    x: &mut RustExtractor,
    node: Node,
    parent: Option<&ParentContext>,
) -> Option<ParentContext> {
    let name = x.base.get_field_text(&node, "name")?;
    let modifiers = extract_modifiers(x, node);

    // `trait A: B + C` - supertraits become extends heritage.
    let mut heritage_clauses = Vec::new();
    let mut synthetic = Vec::new();
    if let Some(bounds) = x.base.find_child_by_type(&node, "trait_bounds") {
        for target in x.base.find_nodes_by_type(&bounds, "type_identifier") {
            let target_name = x.base.get_node_text(&target);
            heritage_clauses.push(HeritageClause {
                kind: HeritageKind::Extends,
                target: target_name.clone(),
            });
            synthetic.push(make_reference(
                &x.base,
                &target,
                target_name,
                None,
                Some(HeritageKind::Extends),
            ));
        }
    }

    let options = ScopeOptions {
        signature: Some(signature_text(x, node)),
        modifiers: modifiers.clone(),
        generic_parameters: extract_generics(x, node),
        heritage_clauses,
        parent: parent.map(|p| p.name.clone()),
        depth: depth_under(parent),
        ..Default::default()
    };
    let idx = x
        .base
        .create_scope(&node, name.clone(), ScopeType::Trait, x.config(), options);
    finalize(x, idx, node, HashSet::new(), synthetic);
    mark_export(x, idx, &modifiers);
    Some(ParentContext::new(name, true, depth_under(parent)))
}

/// Impl blocks are extracted as a scope named after the *target type*, not
/// the block itself; a trait impl also injects a synthetic reference to the
/// trait name so relationship resolution discovers the implements edge
/// without special-casing impls.
pub(super) fn extract_impl(
    x: &mut RustExtractor,
    node: Node,
    parent: Option<&ParentContext>,
) -> Option<ParentContext> {
    let type_name = node
        .child_by_field_name("type")
        .map(|t| base_type_name(&x.base.get_node_text(&t)))?;

    let mut heritage_clauses = Vec::new();
    let mut synthetic = Vec::new();
    if let Some(trait_node) = node.child_by_field_name("trait") {
        let trait_name = base_type_name(&x.base.get_node_text(&trait_node));
        heritage_clauses.push(HeritageClause {
            kind: HeritageKind::Implements,
            target: trait_name.clone(),
        });
        synthetic.push(make_reference(
            &x.base,
            &trait_node,
            trait_name,
            None,
            Some(HeritageKind::Implements),
        ));
    }

    let options = ScopeOptions {
        signature: Some(signature_text(x, node)),
        generic_parameters: extract_generics(x, node),
        heritage_clauses,
        parent: parent.map(|p| p.name.clone()),
        depth: depth_under(parent),
        ..Default::default()
    };
    let idx = x.base.create_scope(
        &node,
        type_name.clone(),
        ScopeType::Class,
        x.config(),
        options,
    );
    let mut exclude = HashSet::new();
    exclude.insert(type_name.clone());
    finalize(x, idx, node, exclude, synthetic);
    Some(ParentContext::new(type_name, true, depth_under(parent)))
}

pub(super) fn extract_function(
    x: &mut RustExtractor,
    node: Node,
    parent: Option<&ParentContext>,
) -> Option<ParentContext> {
    let name = x.base.get_field_text(&node, "name")?;
    let modifiers = extract_modifiers(x, node);
    let parameters = extract_parameters(x, node);
    let return_type = x.base.get_field_text(&node, "return_type");

    let scope_type = if parent.is_some_and(|p| p.is_type) {
        ScopeType::Method
    } else {
        ScopeType::Function
    };

    let options = ScopeOptions {
        signature: Some(signature_text(x, node)),
        parameters: parameters.clone(),
        return_type,
        modifiers: modifiers.clone(),
        generic_parameters: extract_generics(x, node),
        parent: parent.map(|p| p.name.clone()),
        depth: depth_under(parent),
        ..Default::default()
    };
    let idx = x
        .base
        .create_scope(&node, name.clone(), scope_type, x.config(), options);

    let mut exclude: HashSet<String> = parameters.into_iter().map(|p| p.name).collect();
    exclude.insert(name.clone());
    finalize(x, idx, node, exclude, Vec::new());
    mark_export(x, idx, &modifiers);
    Some(ParentContext::new(name, false, depth_under(parent)))
}

pub(super) fn extract_closure(
    x: &mut RustExtractor,
    node: Node,
    parent: Option<&ParentContext>,
) -> Option<ParentContext> {
    let name = x.base.anonymous_name(ScopeType::Lambda);
    let parameters = extract_parameters(x, node);

    let options = ScopeOptions {
        signature: Some(signature_text(x, node)),
        parameters: parameters.clone(),
        parent: parent.map(|p| p.name.clone()),
        depth: depth_under(parent),
        ..Default::default()
    };
    let idx = x
        .base
        .create_scope(&node, name.clone(), ScopeType::Lambda, x.config(), options);
    let exclude: HashSet<String> = parameters.into_iter().map(|p| p.name).collect();
    finalize(x, idx, node, exclude, Vec::new());
    Some(ParentContext::new(name, false, depth_under(parent)))
}

pub(super) fn extract_module(
    x: &mut RustExtractor,
    node: Node,
    parent: Option<&ParentContext>,
) -> Option<ParentContext> {
    let name = x.base.get_field_text(&node, "name")?;
    let modifiers = extract_modifiers(x, node);
    let options = ScopeOptions {
        signature: Some(format!("mod {}", name)),
        modifiers: modifiers.clone(),
        parent: parent.map(|p| p.name.clone()),
        depth: depth_under(parent),
        ..Default::default()
    };
    let idx = x
        .base
        .create_scope(&node, name.clone(), ScopeType::Module, x.config(), options);
    finalize(x, idx, node, HashSet::new(), Vec::new());
    mark_export(x, idx, &modifiers);
    Some(ParentContext::new(name, false, depth_under(parent)))
}

pub(super) fn extract_type_alias(
    x: &mut RustExtractor,
    node: Node,
    parent: Option<&ParentContext>,
) -> Option<ParentContext> {
    let name = x.base.get_field_text(&node, "name")?;
    let modifiers = extract_modifiers(x, node);
    let options = ScopeOptions {
        signature: Some(x.base.get_node_text(&node).trim_end_matches(';').trim().to_string()),
        modifiers: modifiers.clone(),
        generic_parameters: extract_generics(x, node),
        parent: parent.map(|p| p.name.clone()),
        depth: depth_under(parent),
        ..Default::default()
    };
    let idx = x
        .base
        .create_scope(&node, name.clone(), ScopeType::TypeAlias, x.config(), options);
    finalize(x, idx, node, HashSet::new(), Vec::new());
    mark_export(x, idx, &modifiers);
    None
}

pub(super) fn extract_const(
    x: &mut RustExtractor,
    node: Node,
    parent: Option<&ParentContext>,
) -> Option<ParentContext> {
    let name = x.base.get_field_text(&node, "name")?;
    let modifiers = extract_modifiers(x, node);
    let scope_type = if node.kind() == "const_item" {
        ScopeType::Constant
    } else {
        ScopeType::Variable
    };
    let options = ScopeOptions {
        signature: Some(x.base.get_node_text(&node).trim_end_matches(';').trim().to_string()),
        return_type: x.base.get_field_text(&node, "type"),
        modifiers: modifiers.clone(),
        parent: parent.map(|p| p.name.clone()),
        depth: depth_under(parent),
        ..Default::default()
    };
    let idx = x
        .base
        .create_scope(&node, name.clone(), scope_type, x.config(), options);
    finalize(x, idx, node, HashSet::new(), Vec::new());
    mark_export(x, idx, &modifiers);
    None
}

// --- shared helpers ---

fn finalize(
    x: &mut RustExtractor,
    idx: usize,
    node: Node,
    exclude: HashSet<String>,
    synthetic: Vec<IdentifierReference>,
) {
    let (config, keywords, builtins) = (x.config(), x.keywords(), x.builtins());
    x.base
        .finalize_scope(idx, node, config, keywords, builtins, exclude, synthetic);
}

fn mark_export(x: &mut RustExtractor, idx: usize, modifiers: &[Modifier]) {
    if modifiers.contains(&Modifier::Public) {
        x.base.mark_export(idx);
    }
}

/// Rendered signature: the construct's text up to (not including) its body.
fn signature_text(x: &RustExtractor, node: Node) -> String {
    let text = x.base.get_node_text(&node);
    let end = node
        .child_by_field_name("body")
        .map(|b| b.start_byte().saturating_sub(node.start_byte()))
        .unwrap_or(text.len())
        .min(text.len());
    text[..end].trim().trim_end_matches('{').trim().to_string()
}

fn extract_modifiers(x: &RustExtractor, node: Node) -> Vec<Modifier> {
    let mut modifiers = Vec::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "visibility_modifier" => {
                modifiers.push(Modifier::Public);
                modifiers.push(Modifier::Export);
            }
            "function_modifiers" => {
                let text = x.base.get_node_text(&child);
                if text.contains("async") {
                    modifiers.push(Modifier::Async);
                }
                if text.contains("unsafe") {
                    modifiers.push(Modifier::Unsafe);
                }
                if text.contains("const") {
                    modifiers.push(Modifier::Const);
                }
            }
            _ => {}
        }
    }
    modifiers
}

fn extract_parameters(x: &RustExtractor, node: Node) -> Vec<Parameter> {
    let Some(params) = node.child_by_field_name("parameters") else {
        return Vec::new();
    };
    let mut out = Vec::new();
    let mut cursor = params.walk();
    for child in params.children(&mut cursor) {
        match child.kind() {
            "parameter" => {
                let Some(pattern) = child.child_by_field_name("pattern") else {
                    continue;
                };
                let pos = child.start_position();
                out.push(Parameter {
                    name: x.base.get_node_text(&pattern).trim_start_matches("mut ").to_string(),
                    declared_type: x.base.get_field_text(&child, "type"),
                    optional: false,
                    rest: false,
                    line: (pos.row + 1) as u32,
                    column: pos.column as u32,
                });
            }
            // Receiver parameters (`&self`, `&mut self`) are implicit
            // bindings, never part of the parameter list.
            "self_parameter" => {}
            _ => {}
        }
    }
    out
}

fn extract_generics(x: &RustExtractor, node: Node) -> Vec<GenericParameter> {
    let Some(params) = node.child_by_field_name("type_parameters") else {
        return Vec::new();
    };
    let mut out = Vec::new();
    let mut cursor = params.walk();
    for child in params.children(&mut cursor) {
        match child.kind() {
            "type_identifier" => out.push(GenericParameter {
                name: x.base.get_node_text(&child),
                constraint: None,
                default: None,
            }),
            "constrained_type_parameter" => {
                let name = x
                    .base
                    .get_field_text(&child, "left")
                    .unwrap_or_else(|| x.base.get_node_text(&child));
                let constraint = x
                    .base
                    .find_child_by_type(&child, "trait_bounds")
                    .map(|b| x.base.get_node_text(&b).trim_start_matches(':').trim().to_string());
                out.push(GenericParameter {
                    name,
                    constraint,
                    default: None,
                });
            }
            "optional_type_parameter" => {
                let name = x
                    .base
                    .get_field_text(&child, "name")
                    .unwrap_or_else(|| x.base.get_node_text(&child));
                out.push(GenericParameter {
                    name,
                    constraint: None,
                    default: x.base.get_field_text(&child, "default_type"),
                });
            }
            _ => {}
        }
    }
    out
}

fn extract_struct_members(x: &RustExtractor, body: Node) -> Vec<Member> {
    let mut members = Vec::new();
    let mut cursor = body.walk();
    for child in body.children(&mut cursor) {
        if child.kind() != "field_declaration" {
            continue;
        }
        let Some(name) = x.base.get_field_text(&child, "name") else {
            continue;
        };
        let accessibility = if x
            .base
            .find_child_by_type(&child, "visibility_modifier")
            .is_some()
        {
            Some(Modifier::Public)
        } else {
            Some(Modifier::Private)
        };
        members.push(Member {
            name,
            declared_type: x.base.get_field_text(&child, "type"),
            accessibility,
            line: (child.start_position().row + 1) as u32,
        });
    }
    members
}

fn extract_enum_members(x: &RustExtractor, body: Node) -> Vec<EnumMember> {
    let mut members = Vec::new();
    let mut cursor = body.walk();
    for child in body.children(&mut cursor) {
        if child.kind() != "enum_variant" {
            continue;
        }
        let Some(name) = x.base.get_field_text(&child, "name") else {
            continue;
        };
        members.push(EnumMember {
            name,
            value: x.base.get_field_text(&child, "value"),
            line: (child.start_position().row + 1) as u32,
        });
    }
    members
}

/// Strip generic arguments and reference sigils from a type's rendered text:
/// `&mut Vec<T>` -> `Vec`.
pub(super) fn base_type_name(text: &str) -> String {
    let text = text.trim_start_matches('&').trim_start_matches("mut ").trim();
    match text.find('<') {
        Some(pos) => text[..pos].to_string(),
        None => text.to_string(),
    }
}
