// Python construct builders: classes, functions, lambdas and the
// decorated_definition wrapper that carries decorators for all of them.

use std::collections::HashSet;

use tree_sitter::Node;

use crate::extractors::base::references::make_reference;
use crate::extractors::base::types::depth_under;
use crate::extractors::base::{
    HeritageClause, HeritageKind, IdentifierReference, Modifier, Parameter, ParentContext,
    ScopeOptions, ScopeType,
};

use super::PythonExtractor;

/// Unwraps a decorated_definition: decorator expressions become synthetic
/// references and heritage clauses on the inner definition's scope.
pub(super) fn extract_decorated(
    x: &mut PythonExtractor,
    node: Node,
    parent: Option<&ParentContext>,
) -> Option<ParentContext> {
    let mut decorators = Vec::new();
    for decorator in x.base.find_children_by_type(&node, "decorator") {
        if let Some(target) = decorator_target(x, decorator) {
            decorators.push(target);
        }
    }
    let definition = node.child_by_field_name("definition")?;
    match definition.kind() {
        "class_definition" => extract_class(x, definition, parent, decorators),
        "function_definition" => extract_function(x, definition, parent, decorators),
        _ => None,
    }
}

pub(super) fn extract_class(
    x: &mut PythonExtractor,
    node: Node,
    parent: Option<&ParentContext>,
    decorators: Vec<(Node, String)>,
) -> Option<ParentContext> {
    let name = x.base.get_field_text(&node, "name")?;

    let mut heritage = Vec::new();
    let mut synthetic = Vec::new();
    if let Some(superclasses) = node.child_by_field_name("superclasses") {
        let mut cursor = superclasses.walk();
        for arg in superclasses.named_children(&mut cursor) {
            // keyword arguments (metaclass=...) are configuration, not bases
            if !matches!(arg.kind(), "identifier" | "attribute") {
                continue;
            }
            let target = x.base.get_node_text(&arg);
            heritage.push(HeritageClause {
                kind: HeritageKind::Extends,
                target: target.clone(),
            });
            synthetic.push(heritage_reference(x, arg, target, HeritageKind::Extends));
        }
    }
    append_decorators(x, &decorators, &mut heritage, &mut synthetic);

    let options = ScopeOptions {
        signature: Some(signature_text(x, node)),
        modifiers: visibility(&name),
        heritage_clauses: heritage,
        parent: parent.map(|p| p.name.clone()),
        depth: depth_under(parent),
        ..Default::default()
    };
    let idx = x
        .base
        .create_scope(&node, name.clone(), ScopeType::Class, x.config(), options);
    finalize(x, idx, node, HashSet::new(), synthetic);
    if parent.is_none() && PythonExtractor::is_public(&name) {
        x.base.mark_export(idx);
    }
    Some(ParentContext::new(name, true, depth_under(parent)))
}

pub(super) fn extract_function(
    x: &mut PythonExtractor,
    node: Node,
    parent: Option<&ParentContext>,
    decorators: Vec<(Node, String)>,
) -> Option<ParentContext> {
    let name = x.base.get_field_text(&node, "name")?;
    let parameters = extract_parameters(x, node.child_by_field_name("parameters"));

    let scope_type = if parent.is_some_and(|p| p.is_type) {
        ScopeType::Method
    } else {
        ScopeType::Function
    };

    let mut modifiers = visibility(&name);
    if node
        .child(0)
        .is_some_and(|first| first.kind() == "async") {
        modifiers.push(Modifier::Async);
    }

    let mut heritage = Vec::new();
    let mut synthetic = Vec::new();
    append_decorators(x, &decorators, &mut heritage, &mut synthetic);

    let options = ScopeOptions {
        signature: Some(signature_text(x, node)),
        parameters: parameters.clone(),
        return_type: x.base.get_field_text(&node, "return_type"),
        modifiers,
        heritage_clauses: heritage,
        parent: parent.map(|p| p.name.clone()),
        depth: depth_under(parent),
        ..Default::default()
    };
    let idx = x
        .base
        .create_scope(&node, name.clone(), scope_type, x.config(), options);

    let exclude: HashSet<String> = parameters.into_iter().map(|p| p.name).collect();
    finalize(x, idx, node, exclude, synthetic);
    if parent.is_none() && PythonExtractor::is_public(&name) {
        x.base.mark_export(idx);
    }
    Some(ParentContext::new(name, false, depth_under(parent)))
}

pub(super) fn extract_lambda(
    x: &mut PythonExtractor,
    node: Node,
    parent: Option<&ParentContext>,
) -> Option<ParentContext> {
    let name = x.base.anonymous_name(ScopeType::Lambda);
    let parameters = extract_parameters(x, node.child_by_field_name("parameters"));

    let options = ScopeOptions {
        signature: Some(x.base.get_node_text(&node).trim().to_string()),
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

// --- shared helpers ---

/// The callable or class expression a decorator names, with call
/// arguments stripped: `@app.route("/")` yields `app.route`.
fn decorator_target<'t>(x: &PythonExtractor, decorator: Node<'t>) -> Option<(Node<'t>, String)> {
    let mut expr = decorator.named_child(0)?;
    if expr.kind() == "call" {
        expr = expr.child_by_field_name("function")?;
    }
    match expr.kind() {
        "identifier" | "attribute" => Some((expr, x.base.get_node_text(&expr))),
        _ => None,
    }
}

fn append_decorators(
    x: &PythonExtractor,
    decorators: &[(Node, String)],
    heritage: &mut Vec<HeritageClause>,
    synthetic: &mut Vec<IdentifierReference>,
) {
    for (node, target) in decorators {
        heritage.push(HeritageClause {
            kind: HeritageKind::Decorator,
            target: target.clone(),
        });
        synthetic.push(heritage_reference(
            x,
            *node,
            target.clone(),
            HeritageKind::Decorator,
        ));
    }
}

/// Dotted targets split into qualifier and final name so resolution can
/// match the base name against imports.
fn heritage_reference(
    x: &PythonExtractor,
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

fn extract_parameters(x: &PythonExtractor, list: Option<Node>) -> Vec<Parameter> {
    let Some(list) = list else {
        return Vec::new();
    };
    let mut parameters = Vec::new();
    let mut cursor = list.walk();
    for child in list.named_children(&mut cursor) {
        let (name_node, declared_type, optional, rest) = match child.kind() {
            "identifier" => (Some(child), None, false, false),
            "typed_parameter" => (child.named_child(0), x.base.get_field_text(&child, "type"), false, false),
            "default_parameter" => (child.child_by_field_name("name"), None, true, false),
            "typed_default_parameter" => (
                child.child_by_field_name("name"),
                x.base.get_field_text(&child, "type"),
                true,
                false,
            ),
            "list_splat_pattern" | "dictionary_splat_pattern" => {
                (child.named_child(0), None, false, true)
            }
            _ => continue,
        };
        let Some(name_node) = name_node else { continue };
        parameters.push(Parameter {
            name: x.base.get_node_text(&name_node),
            declared_type,
            optional,
            rest,
            line: (child.start_position().row + 1) as u32,
            column: child.start_position().column as u32,
        });
    }
    parameters
}

fn visibility(name: &str) -> Vec<Modifier> {
    if PythonExtractor::is_public(name) {
        vec![Modifier::Public]
    } else {
        vec![Modifier::Private]
    }
}

fn signature_text(x: &PythonExtractor, node: Node) -> String {
    let text = x.base.get_node_text(&node);
    let end = node
        .child_by_field_name("body")
        .map(|b| b.start_byte().saturating_sub(node.start_byte()))
        .unwrap_or(text.len())
        .min(text.len());
    text[..end].trim().trim_end_matches(':').trim().to_string()
}

fn finalize(
    x: &mut PythonExtractor,
    idx: usize,
    node: Node,
    exclude: HashSet<String>,
    synthetic: Vec<IdentifierReference>,
) {
    let (config, keywords, builtins) = (x.config(), x.keywords(), x.builtins());
    x.base
        .finalize_scope(idx, node, config, keywords, builtins, exclude, synthetic);
}
