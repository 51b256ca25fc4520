/*
 * token.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template tokens and the token stream consumed by the node-list builder.
//!
//! Tokens come from an external tokenizer. Each token knows how to turn
//! itself into zero or one [`Node`] given the active [`Parser`].

use crate::error::{TemplateError, TemplateResult};
use crate::node::Node;
use crate::parser::Parser;
use std::collections::VecDeque;

/// The kind of a token, for stop-matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Text,
    Variable,
    Tag,
    Comment,
}

/// A tag token: `{% name content %}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagToken {
    /// Tag name (e.g., "block", "endblock").
    pub name: String,
    /// Everything after the name, untrimmed.
    pub content: String,
}

impl TagToken {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Whitespace-separated arguments of the tag.
    ///
    /// Whitespace inside a quoted string does not split an argument.
    pub fn args(&self) -> Vec<&str> {
        let mut args = Vec::new();
        let mut start = None;
        let mut quote = None;
        let mut escaped = false;

        for (i, c) in self.content.char_indices() {
            if escaped {
                escaped = false;
                continue;
            }
            match (quote, c) {
                (Some(_), '\\') => escaped = true,
                (Some(q), _) if c == q => quote = None,
                (Some(_), _) => {}
                (None, '\'' | '"') => {
                    quote = Some(c);
                    start.get_or_insert(i);
                }
                (None, _) if c.is_whitespace() => {
                    if let Some(s) = start.take() {
                        args.push(&self.content[s..i]);
                    }
                }
                (None, _) => {
                    start.get_or_insert(i);
                }
            }
        }
        if let Some(s) = start {
            args.push(&self.content[s..]);
        }
        args
    }
}

/// A unit of pre-lexed template source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Literal text.
    Text(String),
    /// An expression to interpolate: the content of `{{ ... }}`.
    Variable(String),
    /// A tag: `{% ... %}`.
    Tag(TagToken),
    /// A comment: `{# ... #}`. Produces no node.
    Comment(String),
}

impl Token {
    pub fn text(text: impl Into<String>) -> Self {
        Token::Text(text.into())
    }

    pub fn variable(source: impl Into<String>) -> Self {
        Token::Variable(source.into())
    }

    pub fn tag(name: impl Into<String>, content: impl Into<String>) -> Self {
        Token::Tag(TagToken::new(name, content))
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Token::Comment(text.into())
    }

    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Text(_) => TokenKind::Text,
            Token::Variable(_) => TokenKind::Variable,
            Token::Tag(_) => TokenKind::Tag,
            Token::Comment(_) => TokenKind::Comment,
        }
    }

    /// Whether this is a tag token named one of `names`.
    pub fn is_tag(&self, names: &[&str]) -> bool {
        match self {
            Token::Tag(tag) => names.contains(&tag.name.as_str()),
            _ => false,
        }
    }

    /// Turn this token into a node.
    ///
    /// Text becomes a text node, a variable is compiled with the parser's
    /// compiler, a tag is handed to its registered handler, and a comment
    /// produces nothing.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Compile`] for an invalid variable expression,
    /// [`TemplateError::UnknownTag`] for an unregistered tag, or whatever the
    /// tag handler returns.
    pub fn into_node(self, parser: &mut Parser<'_>) -> TemplateResult<Option<Node>> {
        match self {
            Token::Text(text) => Ok(Some(Node::Text(text))),
            Token::Variable(source) => Ok(Some(Node::Variable(
                parser.compiler().compile(source.trim())?,
            ))),
            Token::Comment(_) => Ok(None),
            Token::Tag(tag) => {
                let handler = parser.tags().get(&tag.name).ok_or_else(|| {
                    TemplateError::UnknownTag {
                        name: tag.name.clone(),
                    }
                })?;
                handler(tag, parser)
            }
        }
    }
}

/// A front-poppable queue of tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    tokens: VecDeque<Token>,
}

impl TokenStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return the first token.
    pub fn pop_front(&mut self) -> Option<Token> {
        self.tokens.pop_front()
    }

    /// Put a token back at the front of the stream.
    pub fn push_front(&mut self, token: Token) {
        self.tokens.push_front(token);
    }

    pub fn push_back(&mut self, token: Token) {
        self.tokens.push_back(token);
    }

    pub fn front(&self) -> Option<&Token> {
        self.tokens.front()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }
}

impl From<Vec<Token>> for TokenStream {
    fn from(tokens: Vec<Token>) -> Self {
        Self {
            tokens: tokens.into(),
        }
    }
}

impl FromIterator<Token> for TokenStream {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().collect(),
        }
    }
}
