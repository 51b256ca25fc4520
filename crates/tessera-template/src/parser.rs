/*
 * parser.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Node-list builder.
//!
//! The [`Parser`] pops tokens off the front of a [`TokenStream`] and asks
//! each one to produce a node. Tags with a body re-enter the parser with a
//! stop matcher for their closing tag; the closing tag is left at the front
//! of the stream for the tag to consume.

use crate::compiler::Compiler;
use crate::error::TemplateResult;
use crate::node::NodeList;
use crate::tags::TagRegistry;
use crate::token::{Token, TokenStream};

/// Builds node lists from a token stream.
#[derive(Debug)]
pub struct Parser<'c> {
    /// Tokens not yet consumed.
    tokens: TokenStream,

    /// Compiler for variable and tag expressions.
    compiler: &'c Compiler,

    /// Handlers for tag tokens.
    tags: &'c TagRegistry,
}

impl<'c> Parser<'c> {
    pub fn new(
        tokens: impl Into<TokenStream>,
        compiler: &'c Compiler,
        tags: &'c TagRegistry,
    ) -> Self {
        Self {
            tokens: tokens.into(),
            compiler,
            tags,
        }
    }

    pub fn compiler(&self) -> &'c Compiler {
        self.compiler
    }

    pub fn tags(&self) -> &'c TagRegistry {
        self.tags
    }

    /// Remove and return the next token.
    pub fn next_token(&mut self) -> Option<Token> {
        self.tokens.pop_front()
    }

    /// The next token, without consuming it.
    pub fn peek_token(&self) -> Option<&Token> {
        self.tokens.front()
    }

    /// The tokens not yet consumed.
    pub fn tokens(&self) -> &TokenStream {
        &self.tokens
    }

    pub fn into_tokens(self) -> TokenStream {
        self.tokens
    }

    /// Parse all remaining tokens.
    pub fn parse(&mut self) -> TemplateResult<NodeList> {
        self.parse_until(|_| false)
    }

    /// Parse tokens until one matches `until`.
    ///
    /// The matching token is left at the front of the stream. Tokens that
    /// produce no node are skipped.
    ///
    /// # Errors
    ///
    /// Propagates the first error raised while turning a token into a node.
    pub fn parse_until(&mut self, until: impl Fn(&Token) -> bool) -> TemplateResult<NodeList> {
        let mut nodes = Vec::new();

        while let Some(token) = self.tokens.pop_front() {
            if until(&token) {
                tracing::debug!(kind = ?token.kind(), "node list stopped at sentinel");
                self.tokens.push_front(token);
                break;
            }
            if let Some(node) = token.into_node(self)? {
                nodes.push(node);
            }
        }

        Ok(NodeList::new(nodes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CompileError, TemplateError};
    use crate::node::Node;
    use pretty_assertions::assert_eq;

    fn text_of(node: &Node) -> &str {
        match node {
            Node::Text(text) => text,
            other => panic!("expected text node, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_all() {
        let compiler = Compiler::default();
        let tags = TagRegistry::new();
        let mut parser = Parser::new(
            vec![
                Token::text("Hello, "),
                Token::variable(" name|upper "),
                Token::comment("ignored"),
                Token::text("!"),
            ],
            &compiler,
            &tags,
        );

        let nodes = parser.parse().unwrap();
        assert_eq!(nodes.len(), 3);
        assert_eq!(text_of(&nodes.nodes()[0]), "Hello, ");
        match &nodes.nodes()[1] {
            Node::Variable(expr) => assert_eq!(expr.to_string(), "name|upper"),
            other => panic!("expected variable node, got {:?}", other),
        }
        assert_eq!(text_of(&nodes.nodes()[2]), "!");
        assert!(parser.tokens().is_empty());
    }

    #[test]
    fn test_parse_until_leaves_sentinel() {
        let compiler = Compiler::default();
        let tags = TagRegistry::new();
        let mut parser = Parser::new(
            vec![
                Token::text("X"),
                Token::text("Y"),
                Token::tag("stop", ""),
                Token::text("Z"),
            ],
            &compiler,
            &tags,
        );

        let nodes = parser.parse_until(|t| t.is_tag(&["stop"])).unwrap();
        let texts: Vec<&str> = nodes.iter().map(text_of).collect();
        assert_eq!(texts, vec!["X", "Y"]);

        assert_eq!(
            parser.into_tokens(),
            TokenStream::from(vec![Token::tag("stop", ""), Token::text("Z")])
        );
    }

    #[test]
    fn test_sentinel_first_yields_empty_list() {
        let compiler = Compiler::default();
        let tags = TagRegistry::new();
        let mut parser = Parser::new(vec![Token::tag("stop", "")], &compiler, &tags);

        let nodes = parser.parse_until(|t| t.is_tag(&["stop"])).unwrap();
        assert!(nodes.is_empty());
        assert_eq!(parser.peek_token(), Some(&Token::tag("stop", "")));
    }

    #[test]
    fn test_variables_share_compiler_cache() {
        let compiler = Compiler::default();
        let tags = TagRegistry::new();
        let mut parser = Parser::new(
            vec![Token::variable("a.b"), Token::variable("a.b")],
            &compiler,
            &tags,
        );

        let nodes = parser.parse().unwrap().into_vec();
        match (&nodes[0], &nodes[1]) {
            (Node::Variable(first), Node::Variable(second)) => {
                assert!(std::sync::Arc::ptr_eq(first, second));
            }
            other => panic!("expected two variables, got {:?}", other),
        }
    }

    #[test]
    fn test_marker_tag_produces_nothing() {
        let compiler = Compiler::default();
        let mut tags = TagRegistry::new();
        tags.register_marker("load");
        let mut parser = Parser::new(
            vec![Token::tag("load", "static"), Token::text("a")],
            &compiler,
            &tags,
        );

        assert_eq!(parser.parse().unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_tag() {
        let compiler = Compiler::default();
        let tags = TagRegistry::new();
        let mut parser = Parser::new(vec![Token::tag("nope", "")], &compiler, &tags);

        assert_eq!(
            parser.parse().unwrap_err(),
            TemplateError::UnknownTag {
                name: "nope".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_variable_propagates() {
        let compiler = Compiler::default();
        let tags = TagRegistry::new();
        let mut parser = Parser::new(
            vec![Token::text("a"), Token::variable("x|")],
            &compiler,
            &tags,
        );

        assert_eq!(
            parser.parse().unwrap_err(),
            TemplateError::Compile {
                source_text: "x|".to_string(),
                error: CompileError::EmptyFilterName { offset: 2 },
            }
        );
    }

    // ========================================================================
    // Block tag tests
    // ========================================================================

    #[test]
    fn test_block_tag_parses_body() {
        let compiler = Compiler::default();
        let mut tags = TagRegistry::new();
        tags.register_block("block", "endblock");
        let mut parser = Parser::new(
            vec![
                Token::text("before"),
                Token::tag("block", "content"),
                Token::text("inside"),
                Token::variable("title"),
                Token::tag("endblock", ""),
                Token::text("after"),
            ],
            &compiler,
            &tags,
        );

        let nodes = parser.parse().unwrap().into_vec();
        assert_eq!(nodes.len(), 3);
        assert_eq!(text_of(&nodes[0]), "before");
        assert_eq!(text_of(&nodes[2]), "after");

        let Node::Tag(block) = &nodes[1] else {
            panic!("expected tag node, got {:?}", nodes[1]);
        };
        assert_eq!(block.name, "block");
        assert_eq!(block.args.len(), 1);
        assert_eq!(block.args[0].source(), "content");
        assert_eq!(block.body.len(), 2);
        assert_eq!(text_of(&block.body.nodes()[0]), "inside");
    }

    #[test]
    fn test_nested_blocks() {
        let compiler = Compiler::default();
        let mut tags = TagRegistry::new();
        tags.register_block("block", "endblock");
        let mut parser = Parser::new(
            vec![
                Token::tag("block", "outer"),
                Token::tag("block", "inner"),
                Token::text("deep"),
                Token::tag("endblock", ""),
                Token::text("shallow"),
                Token::tag("endblock", ""),
            ],
            &compiler,
            &tags,
        );

        let nodes = parser.parse().unwrap().into_vec();
        assert_eq!(nodes.len(), 1);
        let Node::Tag(outer) = &nodes[0] else {
            panic!("expected tag node");
        };
        assert_eq!(outer.body.len(), 2);
        let Node::Tag(inner) = &outer.body.nodes()[0] else {
            panic!("expected nested tag node");
        };
        assert_eq!(inner.args[0].source(), "inner");
        assert_eq!(text_of(&inner.body.nodes()[0]), "deep");
        assert_eq!(text_of(&outer.body.nodes()[1]), "shallow");
    }

    #[test]
    fn test_unclosed_block() {
        let compiler = Compiler::default();
        let mut tags = TagRegistry::new();
        tags.register_block("block", "endblock");
        let mut parser = Parser::new(
            vec![Token::tag("block", "content"), Token::text("dangling")],
            &compiler,
            &tags,
        );

        assert_eq!(
            parser.parse().unwrap_err(),
            TemplateError::UnclosedTag {
                name: "block".to_string(),
                expected: "endblock".to_string(),
            }
        );
    }
}
