// TypeScript construct builders: classes, interfaces, enums, functions,
// methods, arrow functions, type aliases, namespaces and module-level
// variable declarations.

use std::collections::HashSet;

use tree_sitter::Node;

use crate::extractors::base::references::make_reference;
use crate::extractors::base::types::depth_under;
use crate::extractors::base::{
    EnumMember, GenericParameter, HeritageClause, HeritageKind, IdentifierReference, Member,
    Modifier, Parameter, ParentContext, ScopeOptions, ScopeType,
};

use super::TypeScriptExtractor;

pub(super) fn extract_class(
    x: &mut TypeScriptExtractor,
    node: Node,
    parent: Option<&ParentContext>,
) -> Option<ParentContext> {
    let name = x.base.get_field_text(&node, "name")?;

    let mut heritage = Vec::new();
    let mut synthetic = Vec::new();
    if let Some(class_heritage) = x.base.find_child_by_type(&node, "class_heritage") {
        collect_class_heritage(x, class_heritage, &mut heritage, &mut synthetic);
    }
    for decorator in x.base.find_children_by_type(&node, "decorator") {
        if let Some(target) = decorator_target(x, decorator) {
            heritage.push(HeritageClause {
                kind: HeritageKind::Decorator,
                target: target.clone(),
            });
            synthetic.push(heritage_reference(x, decorator, target, HeritageKind::Decorator));
        }
    }

    let mut modifiers = vec![export_visibility(node)];
    if node.kind() == "abstract_class_declaration" {
        modifiers.push(Modifier::Abstract);
    }
    if TypeScriptExtractor::is_exported(node) {
        modifiers.push(Modifier::Export);
    }

    let options = ScopeOptions {
        signature: Some(signature_text(x, node)),
        modifiers,
        generic_parameters: extract_generics(x, node),
        heritage_clauses: heritage,
        members: extract_class_members(x, node),
        parent: parent.map(|p| p.name.clone()),
        depth: depth_under(parent),
        ..Default::default()
    };
    let idx = x
        .base
        .create_scope(&node, name.clone(), ScopeType::Class, x.config(), options);
    finalize(x, idx, node, HashSet::new(), synthetic);
    if TypeScriptExtractor::is_exported(node) {
        x.base.mark_export(idx);
    }
    Some(ParentContext::new(name, true, depth_under(parent)))
}

pub(super) fn extract_interface(
    x: &mut TypeScriptExtractor,
    node: Node,
    parent: Option<&ParentContext>,
) -> Option<ParentContext> {
    let name = x.base.get_field_text(&node, "name")?;

    let mut heritage = Vec::new();
    let mut synthetic = Vec::new();
    if let Some(extends) = x.base.find_child_by_type(&node, "extends_type_clause") {
        let mut cursor = extends.walk();
        for ty in extends.named_children(&mut cursor) {
            let target = x.base.get_node_text(&ty);
            heritage.push(HeritageClause {
                kind: HeritageKind::Extends,
                target: target.clone(),
            });
            synthetic.push(heritage_reference(x, ty, target, HeritageKind::Extends));
        }
    }

    let mut modifiers = vec![export_visibility(node)];
    if TypeScriptExtractor::is_exported(node) {
        modifiers.push(Modifier::Export);
    }

    let options = ScopeOptions {
        signature: Some(signature_text(x, node)),
        modifiers,
        generic_parameters: extract_generics(x, node),
        heritage_clauses: heritage,
        members: extract_interface_members(x, node),
        parent: parent.map(|p| p.name.clone()),
        depth: depth_under(parent),
        ..Default::default()
    };
    let idx =
        x.base
            .create_scope(&node, name.clone(), ScopeType::Interface, x.config(), options);
    finalize(x, idx, node, HashSet::new(), synthetic);
    if TypeScriptExtractor::is_exported(node) {
        x.base.mark_export(idx);
    }
    Some(ParentContext::new(name, true, depth_under(parent)))
}

pub(super) fn extract_enum(
    x: &mut TypeScriptExtractor,
    node: Node,
    parent: Option<&ParentContext>,
) -> Option<ParentContext> {
    let name = x.base.get_field_text(&node, "name")?;
    let body = node.child_by_field_name("body")?;

    let mut enum_members = Vec::new();
    let mut cursor = body.walk();
    for child in body.named_children(&mut cursor) {
        match child.kind() {
            "property_identifier" => enum_members.push(EnumMember {
                name: x.base.get_node_text(&child),
                value: None,
                line: (child.start_position().row + 1) as u32,
            }),
            "enum_assignment" => {
                let Some(member_name) = x.base.get_field_text(&child, "name") else {
                    continue;
                };
                enum_members.push(EnumMember {
                    name: member_name,
                    value: x.base.get_field_text(&child, "value"),
                    line: (child.start_position().row + 1) as u32,
                });
            }
            _ => {}
        }
    }

    let options = ScopeOptions {
        signature: Some(format!("enum {}", name)),
        modifiers: vec![export_visibility(node)],
        enum_members,
        parent: parent.map(|p| p.name.clone()),
        depth: depth_under(parent),
        ..Default::default()
    };
    let idx = x
        .base
        .create_scope(&node, name.clone(), ScopeType::Enum, x.config(), options);
    finalize(x, idx, node, HashSet::new(), Vec::new());
    if TypeScriptExtractor::is_exported(node) {
        x.base.mark_export(idx);
    }
    Some(ParentContext::new(name, true, depth_under(parent)))
}

pub(super) fn extract_function(
    x: &mut TypeScriptExtractor,
    node: Node,
    parent: Option<&ParentContext>,
) -> Option<ParentContext> {
    let name = x.base.get_field_text(&node, "name")?;
    build_callable(x, node, node, name, ScopeType::Function, parent)
}

pub(super) fn extract_method(
    x: &mut TypeScriptExtractor,
    node: Node,
    parent: Option<&ParentContext>,
) -> Option<ParentContext> {
    let name = x.base.get_field_text(&node, "name")?;
    build_callable(x, node, node, name, ScopeType::Method, parent)
}

/// Arrow functions and function expressions take the name of the
/// variable declarator they initialize; the rest stay anonymous lambdas.
pub(super) fn extract_function_value(
    x: &mut TypeScriptExtractor,
    node: Node,
    parent: Option<&ParentContext>,
) -> Option<ParentContext> {
    let declarator = node
        .parent()
        .filter(|p| p.kind() == "variable_declarator");
    match declarator {
        Some(decl) => {
            let name = x.base.get_field_text(&decl, "name")?;
            build_callable(x, node, decl, name, ScopeType::Function, parent)
        }
        None => {
            let name = x.base.anonymous_name(ScopeType::Lambda);
            build_callable(x, node, node, name, ScopeType::Lambda, parent)
        }
    }
}

pub(super) fn extract_type_alias(
    x: &mut TypeScriptExtractor,
    node: Node,
    parent: Option<&ParentContext>,
) -> Option<ParentContext> {
    let name = x.base.get_field_text(&node, "name")?;
    let options = ScopeOptions {
        signature: Some(x.base.get_node_text(&node).trim_end_matches(';').trim().to_string()),
        modifiers: vec![export_visibility(node)],
        generic_parameters: extract_generics(x, node),
        return_type: x.base.get_field_text(&node, "value"),
        parent: parent.map(|p| p.name.clone()),
        depth: depth_under(parent),
        ..Default::default()
    };
    let idx =
        x.base
            .create_scope(&node, name.clone(), ScopeType::TypeAlias, x.config(), options);
    finalize(x, idx, node, HashSet::new(), Vec::new());
    if TypeScriptExtractor::is_exported(node) {
        x.base.mark_export(idx);
    }
    Some(ParentContext::new(name, true, depth_under(parent)))
}

pub(super) fn extract_namespace(
    x: &mut TypeScriptExtractor,
    node: Node,
    parent: Option<&ParentContext>,
) -> Option<ParentContext> {
    let name = x.base.get_field_text(&node, "name")?;
    let options = ScopeOptions {
        signature: Some(format!("namespace {}", name)),
        modifiers: vec![export_visibility(node)],
        parent: parent.map(|p| p.name.clone()),
        depth: depth_under(parent),
        ..Default::default()
    };
    let idx =
        x.base
            .create_scope(&node, name.clone(), ScopeType::Namespace, x.config(), options);
    finalize(x, idx, node, HashSet::new(), Vec::new());
    if TypeScriptExtractor::is_exported(node) {
        x.base.mark_export(idx);
    }
    Some(ParentContext::new(name, false, depth_under(parent)))
}

/// Module-level const/let/var declarations. Declarators initialized with
/// function values are handled by the arrow/function-expression path.
pub(super) fn extract_variable_declaration(
    x: &mut TypeScriptExtractor,
    node: Node,
    parent: Option<&ParentContext>,
) -> Option<ParentContext> {
    if inside_callable(x, node) {
        return None;
    }
    let is_const = node
        .child(0)
        .is_some_and(|first| first.kind() == "const");
    let scope_type = if is_const {
        ScopeType::Constant
    } else {
        ScopeType::Variable
    };

    for decl in x.base.find_children_by_type(&node, "variable_declarator") {
        if decl
            .child_by_field_name("value")
            .is_some_and(|v| matches!(v.kind(), "arrow_function" | "function_expression"))
        {
            continue;
        }
        let Some(name) = x.base.get_field_text(&decl, "name") else {
            continue;
        };
        let mut modifiers = vec![export_visibility(node)];
        if is_const {
            modifiers.push(Modifier::Const);
        }
        if TypeScriptExtractor::is_exported(node) {
            modifiers.push(Modifier::Export);
        }
        let options = ScopeOptions {
            signature: Some(x.base.get_node_text(&node).trim_end_matches(';').trim().to_string()),
            return_type: x.base.get_field_text(&decl, "type"),
            modifiers,
            parent: parent.map(|p| p.name.clone()),
            depth: depth_under(parent),
            ..Default::default()
        };
        let idx = x
            .base
            .create_scope(&decl, name.clone(), scope_type, x.config(), options);
        finalize(x, idx, decl, HashSet::new(), Vec::new());
        if TypeScriptExtractor::is_exported(node) {
            x.base.mark_export(idx);
        }
    }
    None
}

// --- shared helpers ---

fn build_callable(
    x: &mut TypeScriptExtractor,
    node: Node,
    export_probe: Node,
    name: String,
    scope_type: ScopeType,
    parent: Option<&ParentContext>,
) -> Option<ParentContext> {
    // Single-parameter arrows carry a bare identifier in the `parameter`
    // field instead of a formal_parameters list.
    let list = node
        .child_by_field_name("parameters")
        .or_else(|| node.child_by_field_name("parameter"));
    let parameters = extract_parameters(x, list);
    let exported = exported_through(export_probe);

    let mut modifiers = modifier_tokens(x, node);
    if !modifiers.contains(&Modifier::Private) && !modifiers.contains(&Modifier::Protected) {
        modifiers.push(Modifier::Public);
    }
    if exported {
        modifiers.push(Modifier::Export);
    }

    let options = ScopeOptions {
        signature: Some(signature_text(x, node)),
        parameters: parameters.clone(),
        return_type: x
            .base
            .get_field_text(&node, "return_type")
            .map(|t| t.trim_start_matches(':').trim().to_string()),
        modifiers,
        generic_parameters: extract_generics(x, node),
        parent: parent.map(|p| p.name.clone()),
        depth: depth_under(parent),
        ..Default::default()
    };
    let idx = x
        .base
        .create_scope(&node, name.clone(), scope_type, x.config(), options);

    let exclude: HashSet<String> = parameters.into_iter().map(|p| p.name).collect();
    finalize(x, idx, node, exclude, Vec::new());
    if exported {
        x.base.mark_export(idx);
    }
    Some(ParentContext::new(name, false, depth_under(parent)))
}

fn collect_class_heritage(
    x: &TypeScriptExtractor,
    class_heritage: Node,
    heritage: &mut Vec<HeritageClause>,
    synthetic: &mut Vec<IdentifierReference>,
) {
    let mut cursor = class_heritage.walk();
    for clause in class_heritage.named_children(&mut cursor) {
        let kind = match clause.kind() {
            "extends_clause" => HeritageKind::Extends,
            "implements_clause" => HeritageKind::Implements,
            _ => continue,
        };
        let mut inner = clause.walk();
        for ty in clause.named_children(&mut inner) {
            if !matches!(
                ty.kind(),
                "identifier" | "type_identifier" | "member_expression" | "nested_type_identifier" | "generic_type"
            ) {
                continue;
            }
            // Generic arguments stay out of the heritage target name.
            let target = match ty.kind() {
                "generic_type" => ty
                    .child_by_field_name("name")
                    .map(|n| x.base.get_node_text(&n))
                    .unwrap_or_else(|| x.base.get_node_text(&ty)),
                _ => x.base.get_node_text(&ty),
            };
            heritage.push(HeritageClause {
                kind,
                target: target.clone(),
            });
            synthetic.push(heritage_reference(x, ty, target, kind));
        }
    }
}

fn heritage_reference(
    x: &TypeScriptExtractor,
    node: Node,
    target: String,
    kind: HeritageKind,
) -> IdentifierReference {
    let (qualifier, name) = match target.rsplit_once('.') {
        Some((head, tail)) => (Some(head.to_string()), tail.to_string()),
        None => (None, target),
    };
    make_reference(&x.base, &node, name, qualifier, Some(kind))
}

fn decorator_target(x: &TypeScriptExtractor, decorator: Node) -> Option<String> {
    let mut expr = decorator.named_child(0)?;
    if expr.kind() == "call_expression" {
        expr = expr.child_by_field_name("function")?;
    }
    match expr.kind() {
        "identifier" | "member_expression" => Some(x.base.get_node_text(&expr)),
        _ => None,
    }
}

fn extract_class_members(x: &TypeScriptExtractor, node: Node) -> Vec<Member> {
    let Some(body) = node.child_by_field_name("body") else {
        return Vec::new();
    };
    let mut members = Vec::new();
    for field in x.base.find_children_by_type(&body, "public_field_definition") {
        let Some(name) = x.base.get_field_text(&field, "name") else {
            continue;
        };
        members.push(Member {
            name,
            declared_type: x
                .base
                .get_field_text(&field, "type")
                .map(|t| t.trim_start_matches(':').trim().to_string()),
            accessibility: accessibility(x, field),
            line: (field.start_position().row + 1) as u32,
        });
    }
    members
}

fn extract_interface_members(x: &TypeScriptExtractor, node: Node) -> Vec<Member> {
    let Some(body) = node.child_by_field_name("body") else {
        return Vec::new();
    };
    let mut members = Vec::new();
    let mut cursor = body.walk();
    for child in body.named_children(&mut cursor) {
        if !matches!(child.kind(), "property_signature" | "method_signature") {
            continue;
        }
        let Some(name) = x.base.get_field_text(&child, "name") else {
            continue;
        };
        members.push(Member {
            name,
            declared_type: x
                .base
                .get_field_text(&child, "type")
                .map(|t| t.trim_start_matches(':').trim().to_string()),
            accessibility: Some(Modifier::Public),
            line: (child.start_position().row + 1) as u32,
        });
    }
    members
}

fn extract_parameters(x: &TypeScriptExtractor, list: Option<Node>) -> Vec<Parameter> {
    let Some(list) = list else {
        return Vec::new();
    };
    let mut parameters = Vec::new();
    if list.kind() == "identifier" {
        parameters.push(Parameter {
            name: x.base.get_node_text(&list),
            declared_type: None,
            optional: false,
            rest: false,
            line: (list.start_position().row + 1) as u32,
            column: list.start_position().column as u32,
        });
        return parameters;
    }
    let mut cursor = list.walk();
    for child in list.named_children(&mut cursor) {
        let optional = child.kind() == "optional_parameter";
        if !optional && child.kind() != "required_parameter" && child.kind() != "identifier" {
            continue;
        }
        let pattern = child
            .child_by_field_name("pattern")
            .unwrap_or(child);
        let rest = pattern.kind() == "rest_pattern";
        let name_node = if rest {
            pattern.named_child(0).unwrap_or(pattern)
        } else {
            pattern
        };
        parameters.push(Parameter {
            name: x.base.get_node_text(&name_node),
            declared_type: x
                .base
                .get_field_text(&child, "type")
                .map(|t| t.trim_start_matches(':').trim().to_string()),
            optional: optional || child.child_by_field_name("value").is_some(),
            rest,
            line: (child.start_position().row + 1) as u32,
            column: child.start_position().column as u32,
        });
    }
    parameters
}

fn extract_generics(x: &TypeScriptExtractor, node: Node) -> Vec<GenericParameter> {
    let Some(params) = node.child_by_field_name("type_parameters") else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for child in x.base.find_children_by_type(&params, "type_parameter") {
        let Some(name) = x.base.get_field_text(&child, "name") else {
            continue;
        };
        out.push(GenericParameter {
            name,
            constraint: x
                .base
                .get_field_text(&child, "constraint")
                .map(|c| c.trim_start_matches("extends").trim().to_string()),
            default: x
                .base
                .get_field_text(&child, "value")
                .map(|v| v.trim_start_matches('=').trim().to_string()),
        });
    }
    out
}

fn modifier_tokens(x: &TypeScriptExtractor, node: Node) -> Vec<Modifier> {
    let mut modifiers = Vec::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "accessibility_modifier" => match x.base.get_node_text(&child).as_str() {
                "private" => modifiers.push(Modifier::Private),
                "protected" => modifiers.push(Modifier::Protected),
                _ => modifiers.push(Modifier::Public),
            },
            "static" => modifiers.push(Modifier::Static),
            "async" => modifiers.push(Modifier::Async),
            "readonly" => modifiers.push(Modifier::Readonly),
            "abstract" => modifiers.push(Modifier::Abstract),
            _ => {}
        }
    }
    modifiers
}

fn accessibility(x: &TypeScriptExtractor, field: Node) -> Option<Modifier> {
    let modifier = x
        .base
        .find_child_by_type(&field, "accessibility_modifier")
        .map(|m| x.base.get_node_text(&m));
    match modifier.as_deref() {
        Some("private") => Some(Modifier::Private),
        Some("protected") => Some(Modifier::Protected),
        _ => Some(Modifier::Public),
    }
}

fn export_visibility(node: Node) -> Modifier {
    if TypeScriptExtractor::is_exported(node) {
        Modifier::Public
    } else {
        Modifier::Private
    }
}

fn exported_through(node: Node) -> bool {
    let mut current = node;
    while let Some(parent) = current.parent() {
        match parent.kind() {
            "export_statement" => return true,
            "variable_declarator" | "lexical_declaration" | "variable_declaration" => {
                current = parent;
            }
            _ => return false,
        }
    }
    false
}

fn inside_callable(x: &TypeScriptExtractor, node: Node) -> bool {
    x.config()
        .function_like
        .iter()
        .any(|kind| x.base.find_parent_of_type(&node, kind).is_some())
}

fn signature_text(x: &TypeScriptExtractor, node: Node) -> String {
    let text = x.base.get_node_text(&node);
    let end = node
        .child_by_field_name("body")
        .map(|b| b.start_byte().saturating_sub(node.start_byte()))
        .unwrap_or(text.len())
        .min(text.len());
    text[..end].trim().trim_end_matches('{').trim().to_string()
}

fn finalize(
    x: &mut TypeScriptExtractor,
    idx: usize,
    node: Node,
    exclude: HashSet<String>,
    synthetic: Vec<IdentifierReference>,
) {
    let (config, keywords, builtins) = (x.config(), x.keywords(), x.builtins());
    x.base
        .finalize_scope(idx, node, config, keywords, builtins, exclude, synthetic);
}
