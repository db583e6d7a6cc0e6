// Tree navigation helpers for BaseExtractor

use super::extractor::BaseExtractor;
use tree_sitter::Node;

impl BaseExtractor {
    /// Find the nearest ancestor with the given kind.
    pub fn find_parent_of_type<'a>(&self, node: &Node<'a>, parent_type: &str) -> Option<Node<'a>> {
        let mut current = node.parent();
        while let Some(parent) = current {
            if parent.kind() == parent_type {
                return Some(parent);
            }
            current = parent.parent();
        }
        None
    }

    /// First direct child with the given kind.
    pub fn find_child_by_type<'a>(&self, node: &Node<'a>, child_type: &str) -> Option<Node<'a>> {
        for i in 0..node.child_count() {
            if let Some(child) = node.child(i) {
                if child.kind() == child_type {
                    return Some(child);
                }
            }
        }
        None
    }

    /// All direct children with the given kind.
    pub fn find_children_by_type<'a>(&self, node: &Node<'a>, child_type: &str) -> Vec<Node<'a>> {
        let mut results = Vec::new();
        for i in 0..node.child_count() {
            if let Some(child) = node.child(i) {
                if child.kind() == child_type {
                    results.push(child);
                }
            }
        }
        results
    }

    /// All descendants with the given kind.
    pub fn find_nodes_by_type<'a>(&self, node: &Node<'a>, node_type: &str) -> Vec<Node<'a>> {
        let mut nodes = Vec::new();
        self.find_nodes_by_type_recursive(node, node_type, &mut nodes);
        nodes
    }

    #[allow(clippy::only_used_in_recursion)] // &self used in recursive calls
    fn find_nodes_by_type_recursive<'a>(
        &self,
        node: &Node<'a>,
        node_type: &str,
        nodes: &mut Vec<Node<'a>>,
    ) {
        if node.kind() == node_type {
            nodes.push(*node);
        }
        for i in 0..node.child_count() {
            if let Some(child) = node.child(i) {
                self.find_nodes_by_type_recursive(&child, node_type, nodes);
            }
        }
    }

    /// Text of a named field, when present.
    pub fn get_field_text(&self, node: &Node, field_name: &str) -> Option<String> {
        node.child_by_field_name(field_name)
            .map(|field_node| self.get_node_text(&field_node))
    }
}
