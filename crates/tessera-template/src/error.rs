/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for expression compilation, evaluation and node building.

use thiserror::Error;

/// Errors raised by the expression scanner.
///
/// Every variant except [`CompileError::EmptyExpression`] carries the byte
/// offset into the expression source at which the problem was detected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The source is empty or contains only whitespace.
    #[error("empty expression")]
    EmptyExpression,

    /// A quoted string reached end of input before its closing quote.
    #[error("unterminated string literal starting at offset {offset}")]
    UnterminatedStringLiteral { offset: usize },

    /// A `|` not followed by a filter name.
    #[error("missing filter name at offset {offset}")]
    EmptyFilterName { offset: usize },

    /// A numeric literal that cannot be represented.
    #[error("malformed number at offset {offset}: {reason}")]
    MalformedNumber { offset: usize, reason: String },

    /// A comma or whitespace where the expression must continue, or
    /// content after the expression has ended.
    #[error("unexpected {found:?} at offset {offset}")]
    UnexpectedTerminator { found: char, offset: usize },

    /// A character that cannot appear at this position.
    #[error("unexpected character {found:?} at offset {offset}")]
    UnexpectedCharacter { found: char, offset: usize },

    /// A dotted lookup with an empty segment (`a..b`, `a.`).
    #[error("empty lookup segment at offset {offset}")]
    EmptyLookupSegment { offset: usize },

    /// A `:` after a filter name with no argument following it.
    #[error("filter '{filter}' expects an argument at offset {offset}")]
    MissingFilterArgument { filter: String, offset: usize },
}

impl CompileError {
    /// Byte offset of the error in the expression source, if any.
    pub fn offset(&self) -> Option<usize> {
        match self {
            CompileError::EmptyExpression => None,
            CompileError::UnterminatedStringLiteral { offset }
            | CompileError::EmptyFilterName { offset }
            | CompileError::MalformedNumber { offset, .. }
            | CompileError::UnexpectedTerminator { offset, .. }
            | CompileError::UnexpectedCharacter { offset, .. }
            | CompileError::EmptyLookupSegment { offset }
            | CompileError::MissingFilterArgument { offset, .. } => Some(*offset),
        }
    }
}

/// Errors that can occur during template operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TemplateError {
    /// Error compiling an expression.
    #[error("in expression `{source_text}`: {error}")]
    Compile {
        source_text: String,
        #[source]
        error: CompileError,
    },

    /// A filter name with no entry in the compiler's filter registry.
    #[error("Unknown filter: {name}")]
    UnknownFilter { name: String },

    /// A filter rejected its input or arguments.
    #[error("Filter '{name}' failed: {message}")]
    FilterFailed { name: String, message: String },

    /// A tag name with no entry in the tag registry.
    #[error("Unknown tag: {name}")]
    UnknownTag { name: String },

    /// A body tag whose closing tag never appeared.
    #[error("Unclosed tag '{name}': expected '{expected}'")]
    UnclosedTag { name: String, expected: String },
}

/// Result type for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;
