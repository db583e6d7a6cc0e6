// Go construct builders: package clause, type declarations, functions,
// receiver methods, func literals, const/var declarations.

use std::collections::HashSet;

use tree_sitter::Node;

use crate::extractors::base::references::make_reference;
use crate::extractors::base::types::depth_under;
use crate::extractors::base::{
    GenericParameter, HeritageClause, HeritageKind, IdentifierReference, Member, Modifier,
    Parameter, ParentContext, ScopeOptions, ScopeType,
};

use super::GoExtractor;

pub(super) fn extract_package(x: &mut GoExtractor, node: Node) -> Option<ParentContext> {
    let name_node = x.base.find_child_by_type(&node, "package_identifier")?;
    let name = x.base.get_node_text(&name_node);
    let options = ScopeOptions {
        signature: Some(format!("package {}", name)),
        ..Default::default()
    };
    let idx = x
        .base
        .create_scope(&node, name.clone(), ScopeType::Module, x.config(), options);
    finalize(x, idx, node, HashSet::new(), Vec::new());
    Some(ParentContext::new(name, false, 0))
}

pub(super) fn extract_type_declaration(
    x: &mut GoExtractor,
    node: Node,
    parent: Option<&ParentContext>,
) -> Option<ParentContext> {
    // A type_declaration carries one or more type_specs; the last spec's
    // context wins for nesting, which matches the common single-spec form.
    let mut ctx = None;
    for spec in x.base.find_children_by_type(&node, "type_spec") {
        ctx = extract_type_spec(x, spec, parent);
    }
    ctx
}

fn extract_type_spec(
    x: &mut GoExtractor,
    spec: Node,
    parent: Option<&ParentContext>,
) -> Option<ParentContext> {
    let name = x.base.get_field_text(&spec, "name")?;
    let type_node = spec.child_by_field_name("type")?;

    let (scope_type, members, heritage, synthetic) = match type_node.kind() {
        "struct_type" => {
            let (members, heritage, synthetic) = extract_struct_body(x, type_node);
            (ScopeType::Struct, members, heritage, synthetic)
        }
        "interface_type" => {
            let (members, heritage, synthetic) = extract_interface_body(x, type_node);
            (ScopeType::Interface, members, heritage, synthetic)
        }
        _ => (ScopeType::TypeAlias, Vec::new(), Vec::new(), Vec::new()),
    };

    let modifiers = if GoExtractor::is_exported(&name) {
        vec![Modifier::Public, Modifier::Export]
    } else {
        vec![Modifier::Private]
    };

    let options = ScopeOptions {
        signature: Some(format!("type {} {}", name, type_head(x, type_node))),
        modifiers,
        generic_parameters: extract_generics(x, spec),
        heritage_clauses: heritage,
        members,
        parent: parent.map(|p| p.name.clone()),
        depth: depth_under(parent),
        ..Default::default()
    };
    let idx = x
        .base
        .create_scope(&spec, name.clone(), scope_type, x.config(), options);
    finalize(x, idx, spec, HashSet::new(), synthetic);
    if GoExtractor::is_exported(&name) {
        x.base.mark_export(idx);
    }
    Some(ParentContext::new(name, true, depth_under(parent)))
}

pub(super) fn extract_function(
    x: &mut GoExtractor,
    node: Node,
    parent: Option<&ParentContext>,
) -> Option<ParentContext> {
    let name = x.base.get_field_text(&node, "name")?;
    let parameters = extract_parameters(x, node.child_by_field_name("parameters"));
    build_callable(x, node, name, ScopeType::Function, parameters, None, parent)
}

/// Receiver methods hang off the receiver's type name even though the
/// grammar never nests them under a type declaration.
pub(super) fn extract_method(
    x: &mut GoExtractor,
    node: Node,
    parent: Option<&ParentContext>,
) -> Option<ParentContext> {
    let name = x.base.get_field_text(&node, "name")?;
    let parameters = extract_parameters(x, node.child_by_field_name("parameters"));

    let receiver_list = node.child_by_field_name("receiver");
    let receiver = receiver_list.and_then(|list| {
        let decl = x.base.find_child_by_type(&list, "parameter_declaration")?;
        let receiver_name = x.base.get_field_text(&decl, "name");
        let receiver_type = x
            .base
            .get_field_text(&decl, "type")
            .map(|t| t.trim_start_matches('*').to_string());
        Some((receiver_name, receiver_type))
    });
    let (receiver_name, receiver_type) = receiver.unwrap_or((None, None));

    let effective_parent = receiver_type
        .clone()
        .map(|t| ParentContext::new(t, true, parent.map(|p| p.depth).unwrap_or(0)));
    build_callable(
        x,
        node,
        name,
        ScopeType::Method,
        parameters,
        receiver_name,
        effective_parent.as_ref().or(parent),
    )
}

pub(super) fn extract_func_literal(
    x: &mut GoExtractor,
    node: Node,
    parent: Option<&ParentContext>,
) -> Option<ParentContext> {
    let name = x.base.anonymous_name(ScopeType::Lambda);
    let parameters = extract_parameters(x, node.child_by_field_name("parameters"));

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

/// Top-level const/var groups: one Variable/Constant scope per declared name.
pub(super) fn extract_value_declaration(
    x: &mut GoExtractor,
    node: Node,
    parent: Option<&ParentContext>,
) -> Option<ParentContext> {
    // Locals inside function bodies are bindings, not scopes.
    if x.base.find_parent_of_type(&node, "function_declaration").is_some()
        || x.base.find_parent_of_type(&node, "method_declaration").is_some()
        || x.base.find_parent_of_type(&node, "func_literal").is_some()
    {
        return None;
    }

    let scope_type = if node.kind() == "const_declaration" {
        ScopeType::Constant
    } else {
        ScopeType::Variable
    };
    let spec_kind = if scope_type == ScopeType::Constant {
        "const_spec"
    } else {
        "var_spec"
    };

    for spec in x.base.find_nodes_by_type(&node, spec_kind) {
        for name_node in x.base.find_children_by_type(&spec, "identifier") {
            let name = x.base.get_node_text(&name_node);
            let modifiers = if GoExtractor::is_exported(&name) {
                vec![Modifier::Public, Modifier::Export]
            } else {
                vec![Modifier::Private]
            };
            let options = ScopeOptions {
                signature: Some(x.base.get_node_text(&spec).trim().to_string()),
                return_type: x.base.get_field_text(&spec, "type"),
                modifiers,
                parent: parent.map(|p| p.name.clone()),
                depth: depth_under(parent),
                ..Default::default()
            };
            let idx = x
                .base
                .create_scope(&spec, name.clone(), scope_type, x.config(), options);
            finalize(x, idx, spec, HashSet::new(), Vec::new());
            if GoExtractor::is_exported(&name) {
                x.base.mark_export(idx);
            }
        }
    }
    None
}

// --- shared helpers ---

fn build_callable(
    x: &mut GoExtractor,
    node: Node,
    name: String,
    scope_type: ScopeType,
    parameters: Vec<Parameter>,
    receiver_name: Option<String>,
    parent: Option<&ParentContext>,
) -> Option<ParentContext> {
    let modifiers = if GoExtractor::is_exported(&name) {
        vec![Modifier::Public, Modifier::Export]
    } else {
        vec![Modifier::Private]
    };

    let options = ScopeOptions {
        signature: Some(signature_text(x, node)),
        parameters: parameters.clone(),
        return_type: x.base.get_field_text(&node, "result"),
        modifiers,
        generic_parameters: extract_generics(x, node),
        parent: parent.map(|p| p.name.clone()),
        depth: depth_under(parent),
        ..Default::default()
    };
    let idx = x
        .base
        .create_scope(&node, name.clone(), scope_type, x.config(), options);

    let mut exclude: HashSet<String> = parameters.into_iter().map(|p| p.name).collect();
    if let Some(receiver) = receiver_name {
        exclude.insert(receiver);
    }
    finalize(x, idx, node, exclude, Vec::new());
    if GoExtractor::is_exported(&name) {
        x.base.mark_export(idx);
    }
    Some(ParentContext::new(name, false, depth_under(parent)))
}

fn finalize(
    x: &mut GoExtractor,
    idx: usize,
    node: Node,
    exclude: HashSet<String>,
    synthetic: Vec<IdentifierReference>,
) {
    let (config, keywords, builtins) = (x.config(), x.keywords(), x.builtins());
    x.base
        .finalize_scope(idx, node, config, keywords, builtins, exclude, synthetic);
}

fn signature_text(x: &GoExtractor, node: Node) -> String {
    let text = x.base.get_node_text(&node);
    let end = node
        .child_by_field_name("body")
        .map(|b| b.start_byte().saturating_sub(node.start_byte()))
        .unwrap_or(text.len())
        .min(text.len());
    text[..end].trim().trim_end_matches('{').trim().to_string()
}

/// Struct body: named fields become members; embedded types become extends
/// heritage plus a synthetic reference so resolution sees the edge.
fn extract_struct_body(
    x: &GoExtractor,
    struct_type: Node,
) -> (Vec<Member>, Vec<HeritageClause>, Vec<IdentifierReference>) {
    let mut members = Vec::new();
    let mut heritage = Vec::new();
    let mut synthetic = Vec::new();

    let Some(field_list) = x.base.find_child_by_type(&struct_type, "field_declaration_list")
    else {
        return (members, heritage, synthetic);
    };

    for field in x.base.find_children_by_type(&field_list, "field_declaration") {
        let names = x.base.find_children_by_type(&field, "field_identifier");
        if names.is_empty() {
            // Embedded field: the type itself is the member.
            if let Some(type_node) = field.child_by_field_name("type") {
                let target = x
                    .base
                    .get_node_text(&type_node)
                    .trim_start_matches('*')
                    .to_string();
                heritage.push(HeritageClause {
                    kind: HeritageKind::Extends,
                    target: target.clone(),
                });
                synthetic.push(make_reference(
                    &x.base,
                    &type_node,
                    target,
                    None,
                    Some(HeritageKind::Extends),
                ));
            }
            continue;
        }
        for name_node in names {
            let name = x.base.get_node_text(&name_node);
            let accessibility = if GoExtractor::is_exported(&name) {
                Some(Modifier::Public)
            } else {
                Some(Modifier::Private)
            };
            members.push(Member {
                name,
                declared_type: x.base.get_field_text(&field, "type"),
                accessibility,
                line: (field.start_position().row + 1) as u32,
            });
        }
    }
    (members, heritage, synthetic)
}

/// Interface body: method specs become members; embedded interfaces become
/// extends heritage.
fn extract_interface_body(
    x: &GoExtractor,
    interface_type: Node,
) -> (Vec<Member>, Vec<HeritageClause>, Vec<IdentifierReference>) {
    let mut members = Vec::new();
    let mut heritage = Vec::new();
    let mut synthetic = Vec::new();

    let mut cursor = interface_type.walk();
    for child in interface_type.children(&mut cursor) {
        match child.kind() {
            "method_spec" | "method_elem" => {
                if let Some(name) = x.base.get_field_text(&child, "name") {
                    members.push(Member {
                        name: name.clone(),
                        declared_type: Some(x.base.get_node_text(&child)),
                        accessibility: if GoExtractor::is_exported(&name) {
                            Some(Modifier::Public)
                        } else {
                            Some(Modifier::Private)
                        },
                        line: (child.start_position().row + 1) as u32,
                    });
                }
            }
            "type_identifier" | "qualified_type" | "type_elem" => {
                let target = x.base.get_node_text(&child);
                heritage.push(HeritageClause {
                    kind: HeritageKind::Extends,
                    target: target.clone(),
                });
                synthetic.push(make_reference(
                    &x.base,
                    &child,
                    target,
                    None,
                    Some(HeritageKind::Extends),
                ));
            }
            _ => {}
        }
    }
    (members, heritage, synthetic)
}

fn extract_parameters(x: &GoExtractor, list: Option<Node>) -> Vec<Parameter> {
    let Some(list) = list else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for decl in x.base.find_children_by_type(&list, "parameter_declaration") {
        let declared_type = x.base.get_field_text(&decl, "type");
        let names = x.base.find_children_by_type(&decl, "identifier");
        let pos = decl.start_position();
        if names.is_empty() {
            continue; // unnamed parameter, type only
        }
        for name_node in names {
            out.push(Parameter {
                name: x.base.get_node_text(&name_node),
                declared_type: declared_type.clone(),
                optional: false,
                rest: false,
                line: (pos.row + 1) as u32,
                column: pos.column as u32,
            });
        }
    }
    for decl in x.base.find_children_by_type(&list, "variadic_parameter_declaration") {
        if let Some(name_node) = x.base.find_child_by_type(&decl, "identifier") {
            let pos = decl.start_position();
            out.push(Parameter {
                name: x.base.get_node_text(&name_node),
                declared_type: x.base.get_field_text(&decl, "type"),
                optional: false,
                rest: true,
                line: (pos.row + 1) as u32,
                column: pos.column as u32,
            });
        }
    }
    out
}

fn extract_generics(x: &GoExtractor, node: Node) -> Vec<GenericParameter> {
    let Some(list) = node
        .child_by_field_name("type_parameters")
        .or_else(|| x.base.find_child_by_type(&node, "type_parameter_list"))
    else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for decl in x.base.find_nodes_by_type(&list, "type_parameter_declaration") {
        let names = x.base.find_children_by_type(&decl, "identifier");
        let constraint = decl
            .child_by_field_name("type")
            .map(|t| x.base.get_node_text(&t));
        for name_node in names {
            out.push(GenericParameter {
                name: x.base.get_node_text(&name_node),
                constraint: constraint.clone(),
                default: None,
            });
        }
    }
    out
}

fn type_head(x: &GoExtractor, type_node: Node) -> String {
    match type_node.kind() {
        "struct_type" => "struct".to_string(),
        "interface_type" => "interface".to_string(),
        _ => x.base.get_node_text(&type_node),
    }
}
