//! On-screen text for a composed query, e.g. `Name = "Acme" OR (Section 8 filed IS TRUE AND ...)`.
//!
//! Parentheses mark the first two levels of grouping below the root. Anything nested deeper
//! is written inline, joined by its own operator. This only affects the text; the tree and
//! its payload keep full nesting.

use crate::tree::FilterTree;
use crate::types::{Condition, Group, Node, QueryValue};

/// Nesting levels below the root that still get their own parentheses.
const PARENTHESIZED_DEPTH: usize = 2;

pub fn render_condition(condition: &Condition) -> String {
    match &condition.query {
        QueryValue::Flag => format!("{} IS TRUE", condition.display_label()),
        QueryValue::Text(text) => format!("{} = \"{}\"", condition.display_label(), text),
    }
}

/// Render a node as it appears directly under the root.
pub fn render_node(node: &Node) -> String {
    render_at(node, 1)
}

pub fn render_tree(tree: &FilterTree) -> String {
    join(tree.root(), 1)
}

fn render_at(node: &Node, depth: usize) -> String {
    match node {
        Node::Condition(condition) => render_condition(condition),
        Node::Group(group) if depth <= PARENTHESIZED_DEPTH => {
            format!("({})", join(group, depth + 1))
        }
        Node::Group(group) => join(group, depth + 1),
    }
}

fn join(group: &Group, depth: usize) -> String {
    group
        .operands
        .iter()
        .map(|operand| render_at(operand, depth))
        .collect::<Vec<_>>()
        .join(&format!(" {} ", group.operator))
}
