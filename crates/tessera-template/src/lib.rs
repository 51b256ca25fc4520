/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Expression compiler and node-list builder for the Tessera template engine.
//!
//! Templates embed expressions of the form `value.path|filterA|filterB:arg`.
//! This crate provides:
//!
//! - An expression compiler: a hand-written scanner that turns expression
//!   source into an [`Expression`] tree, memoized by source text
//! - Literals: integers `42`, decimals `3.5`, strings `'a'` / `"a"` with
//!   backslash escapes
//! - Dotted lookups into the rendering context: `user.address.city`
//! - Filter chains with optional arguments: `name|default:'anon'|upper`,
//!   `text|slice:1, 3`
//! - A node-list builder that turns a token stream into [`Node`]s, with
//!   pluggable tags that can parse a body up to a closing tag
//!
//! Tokenizing template source and rendering node lists are the job of the
//! surrounding engine.
//!
//! # Example
//!
//! ```ignore
//! use tessera_template::{Compiler, TemplateContext};
//!
//! let compiler = Compiler::default();
//! let expr = compiler.compile("user.name|default:'anonymous'|upper")?;
//!
//! let mut ctx = TemplateContext::new();
//! ctx.insert("user", serde_json::json!({ "name": "ada" }));
//!
//! assert_eq!(expr.render(&ctx)?, "ADA");
//! ```

pub mod ast;
pub mod cache;
pub mod compiler;
pub mod context;
pub mod error;
pub mod filters;
pub mod node;
pub mod options;
pub mod parser;
mod scanner;
pub mod tags;
pub mod token;

// Re-export main types at crate root
pub use ast::{Expression, FilterApplication, Fragment, Lookup, Number, Operand};
pub use cache::ExpressionCache;
pub use compiler::{CompiledExpression, Compiler};
pub use context::{TemplateContext, TemplateValue};
pub use error::{CompileError, TemplateError, TemplateResult};
pub use filters::{FilterFn, FilterRegistry, FilterResult};
pub use node::{Node, NodeList, TagNode};
pub use options::CompilerOptions;
pub use parser::Parser;
pub use tags::{TagHandler, TagRegistry};
pub use token::{TagToken, Token, TokenKind, TokenStream};
