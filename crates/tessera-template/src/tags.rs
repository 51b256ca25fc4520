/*
 * tags.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Tag registration.
//!
//! A [`TagRegistry`] maps tag names to handlers. When the node-list builder
//! meets a tag token it hands the token and itself to the handler, which may
//! consume further tokens (for example, recursively parsing a body up to a
//! closing tag) before returning a node.

use crate::error::{TemplateError, TemplateResult};
use crate::node::{Node, NodeList, TagNode};
use crate::parser::Parser;
use crate::token::TagToken;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A tag implementation.
pub type TagHandler =
    Arc<dyn Fn(TagToken, &mut Parser<'_>) -> TemplateResult<Option<Node>> + Send + Sync>;

/// Table of tag handlers, keyed by tag name.
#[derive(Clone, Default)]
pub struct TagRegistry {
    handlers: HashMap<String, TagHandler>,
}

impl fmt::Debug for TagRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("TagRegistry").field("tags", &names).finish()
    }
}

impl TagRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a tag handler.
    pub fn register<F>(&mut self, name: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(TagToken, &mut Parser<'_>) -> TemplateResult<Option<Node>> + Send + Sync + 'static,
    {
        self.handlers.insert(name.into(), Arc::new(handler));
        self
    }

    /// Register a tag with a body that runs until the tag named `end`.
    ///
    /// The tag's arguments are compiled as expressions, the body is parsed
    /// until `end`, and the closing tag is consumed.
    pub fn register_block(
        &mut self,
        name: impl Into<String>,
        end: impl Into<String>,
    ) -> &mut Self {
        let end = end.into();
        self.register(name, move |tag, parser| parse_block(tag, &end, parser))
    }

    /// Register a tag that produces no node (a pure control marker).
    pub fn register_marker(&mut self, name: impl Into<String>) -> &mut Self {
        self.register(name, |_, _| Ok(None))
    }

    /// Look up a handler by tag name.
    pub fn get(&self, name: &str) -> Option<&TagHandler> {
        self.handlers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }
}

fn parse_block(tag: TagToken, end: &str, parser: &mut Parser<'_>) -> TemplateResult<Option<Node>> {
    let compiler = parser.compiler();
    let args = tag
        .args()
        .into_iter()
        .map(|arg| compiler.compile(arg))
        .collect::<TemplateResult<Vec<_>>>()?;

    let body: NodeList = parser.parse_until(|token| token.is_tag(&[end]))?;

    // parse_until only stops early on the closing tag
    if parser.next_token().is_none() {
        return Err(TemplateError::UnclosedTag {
            name: tag.name,
            expected: end.to_string(),
        });
    }

    Ok(Some(Node::Tag(TagNode {
        name: tag.name,
        args,
        body,
    })))
}
