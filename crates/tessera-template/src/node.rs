/*
 * node.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Nodes produced by the node-list builder.

use crate::compiler::CompiledExpression;
use std::sync::Arc;

/// A structural unit of a parsed template.
#[derive(Debug, Clone)]
pub enum Node {
    /// Literal text to be output as-is.
    Text(String),

    /// Expression interpolation: `{{ user.name|upper }}`
    Variable(Arc<CompiledExpression>),

    /// A tag produced by a registered tag handler.
    Tag(TagNode),
}

/// A tag with compiled arguments and an optional body.
#[derive(Debug, Clone)]
pub struct TagNode {
    /// Tag name (e.g., "block").
    pub name: String,
    /// Compiled arguments, in source order.
    pub args: Vec<Arc<CompiledExpression>>,
    /// Nodes between the tag and its closing tag. Empty for tags without a
    /// body.
    pub body: NodeList,
}

/// An ordered sequence of nodes.
#[derive(Debug, Clone, Default)]
pub struct NodeList {
    nodes: Vec<Node>,
}

impl NodeList {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    pub fn into_vec(self) -> Vec<Node> {
        self.nodes
    }

    /// All expressions in this list and in nested tag bodies, depth first.
    pub fn expressions(&self) -> Vec<&Arc<CompiledExpression>> {
        let mut out = Vec::new();
        for node in &self.nodes {
            match node {
                Node::Text(_) => {}
                Node::Variable(expr) => out.push(expr),
                Node::Tag(tag) => {
                    out.extend(tag.args.iter());
                    out.extend(tag.body.expressions());
                }
            }
        }
        out
    }
}

impl<'a> IntoIterator for &'a NodeList {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

impl IntoIterator for NodeList {
    type Item = Node;
    type IntoIter = std::vec::IntoIter<Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}
