/*
 * scanner.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Hand-written recursive-descent scanner for filter expressions.
//!
//! The scanner walks a single [`Cursor`] over the expression source. Each
//! production advances the cursor and appends exactly one [`Fragment`] to a
//! shared output buffer; the filter production re-enters the top-level scan
//! in argument mode and splices off whatever that call appended.
//!
//! Grammar:
//!
//! ```text
//! expression := operand ( '|' filter )*
//! filter     := name ( ':' operand ( ',' operand )* )?
//! operand    := number | string | lookup
//! number     := digit* ( '.' digit* )?
//! string     := quote ( '\' any | not-quote )* quote
//! lookup     := name ( '.' name )*
//! name       := [A-Za-z0-9_]+
//! ```
//!
//! Whitespace or a comma ends an expression. Inside a filter argument list a
//! `|` also ends the list, so that the enclosing scan picks up the next
//! filter in the chain.

use crate::ast::{Expression, FilterApplication, Fragment, Lookup, Number, Operand};
use crate::error::CompileError;
use crate::options::CompilerOptions;

/// A forward-only position in the expression source.
#[derive(Debug, Clone)]
pub(crate) struct Cursor<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    /// Current byte offset.
    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    /// The character under the cursor, without consuming it.
    pub(crate) fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    /// Consume and return the character under the cursor.
    pub(crate) fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    pub(crate) fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    /// Consume a maximal run of characters matching `pred`.
    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let source = self.source;
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
        &source[start..self.pos]
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

impl Fragment {
    fn into_operand(self) -> Option<Operand> {
        match self {
            Fragment::Operand(operand) => Some(operand),
            Fragment::Filter(_) => None,
        }
    }

    fn into_filter(self) -> Option<FilterApplication> {
        match self {
            Fragment::Filter(filter) => Some(filter),
            Fragment::Operand(_) => None,
        }
    }
}

/// Scanner state for compiling one expression.
pub(crate) struct Scanner<'a> {
    cursor: Cursor<'a>,
    options: &'a CompilerOptions,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(source: &'a str, options: &'a CompilerOptions) -> Self {
        Self {
            cursor: Cursor::new(source),
            options,
        }
    }

    /// Scan the whole source as one expression.
    ///
    /// Trailing whitespace is allowed; anything else after the expression
    /// ends is an [`CompileError::UnexpectedTerminator`].
    pub(crate) fn scan_expression(mut self) -> Result<Expression, CompileError> {
        let mut output = Vec::new();
        self.scan_full(&mut output, None)?;

        let end = self.cursor.pos();
        let terminator = self.cursor.peek();
        self.cursor.skip_whitespace();
        if let (Some(found), Some(_)) = (terminator, self.cursor.peek()) {
            return Err(CompileError::UnexpectedTerminator { found, offset: end });
        }

        let mut fragments = output.into_iter();
        let operand = fragments
            .next()
            .and_then(Fragment::into_operand)
            .ok_or(CompileError::EmptyExpression)?;
        Ok(Expression {
            operand,
            filters: fragments.filter_map(Fragment::into_filter).collect(),
        })
    }

    /// Top-level scan loop.
    ///
    /// With `argument_of` set, this is the argument list of that filter: a
    /// `|` ends the loop without being consumed, and (when enabled) commas
    /// separate further arguments.
    fn scan_full(
        &mut self,
        output: &mut Vec<Fragment>,
        argument_of: Option<&str>,
    ) -> Result<(), CompileError> {
        self.cursor.skip_whitespace();

        let mut expect_operand = true;
        while let Some(c) = self.cursor.peek() {
            let offset = self.cursor.pos();

            if c == ',' {
                if argument_of.is_some()
                    && self.options.multiple_filter_arguments
                    && !expect_operand
                {
                    self.cursor.bump();
                    self.cursor.skip_whitespace();
                    expect_operand = true;
                    continue;
                }
                break;
            }
            if c.is_whitespace() {
                break;
            }
            if c == '|' {
                if argument_of.is_some() {
                    break;
                }
                if expect_operand {
                    return Err(CompileError::UnexpectedCharacter { found: c, offset });
                }
                self.scan_filter(output)?;
                continue;
            }

            if !expect_operand {
                return Err(CompileError::UnexpectedCharacter { found: c, offset });
            }
            match c {
                '0'..='9' | '.' => {
                    self.scan_number(output)?;
                    self.check_number_end()?;
                }
                '\'' | '"' => self.scan_string(output)?,
                _ => self.scan_lookup(output)?,
            }
            expect_operand = false;
        }

        if expect_operand {
            let offset = self.cursor.pos();
            return Err(match (argument_of, self.cursor.peek()) {
                (Some(filter), _) => CompileError::MissingFilterArgument {
                    filter: filter.to_string(),
                    offset,
                },
                (None, None) => CompileError::EmptyExpression,
                (None, Some(found)) => CompileError::UnexpectedTerminator { found, offset },
            });
        }

        Ok(())
    }

    /// Number literal: digits with at most one decimal point.
    ///
    /// A second `.` ends the literal without being consumed. A leading `.`
    /// reads as `0.`.
    fn scan_number(&mut self, output: &mut Vec<Fragment>) -> Result<(), CompileError> {
        let offset = self.cursor.pos();
        let mut text = String::new();
        let mut decimal = false;

        if self.cursor.peek() == Some('.') {
            text.push('0');
        }

        while let Some(c) = self.cursor.peek() {
            match c {
                '.' if decimal => break,
                '.' => decimal = true,
                '0'..='9' => {}
                _ => break,
            }
            text.push(c);
            self.cursor.bump();
        }

        let number = if decimal {
            let value = text
                .parse::<f64>()
                .map_err(|e| CompileError::MalformedNumber {
                    offset,
                    reason: e.to_string(),
                })?;
            if !value.is_finite() {
                return Err(CompileError::MalformedNumber {
                    offset,
                    reason: "out of range".to_string(),
                });
            }
            Number::Decimal(value)
        } else {
            text.parse::<i64>()
                .map(Number::Integer)
                .map_err(|e| CompileError::MalformedNumber {
                    offset,
                    reason: e.to_string(),
                })?
        };

        output.push(Fragment::Operand(Operand::Number(number)));
        Ok(())
    }

    /// Reject a number literal that runs straight into a second decimal
    /// point or a word character (`3.1.4`, `12ab`).
    fn check_number_end(&self) -> Result<(), CompileError> {
        let offset = self.cursor.pos();
        match self.cursor.peek() {
            Some('.') => Err(CompileError::MalformedNumber {
                offset,
                reason: "second decimal point".to_string(),
            }),
            Some(c) if is_word_char(c) => Err(CompileError::MalformedNumber {
                offset,
                reason: format!("unexpected {:?} in number", c),
            }),
            _ => Ok(()),
        }
    }

    /// Quoted string literal.
    ///
    /// A backslash before a quote or another backslash yields that
    /// character; before anything else both characters are kept.
    fn scan_string(&mut self, output: &mut Vec<Fragment>) -> Result<(), CompileError> {
        let offset = self.cursor.pos();
        let quote = self.cursor.bump();
        let mut text = String::new();
        let mut escaped = false;

        loop {
            let c = self
                .cursor
                .bump()
                .ok_or(CompileError::UnterminatedStringLiteral { offset })?;

            if escaped {
                if !matches!(c, '\'' | '"' | '\\') {
                    text.push('\\');
                }
                text.push(c);
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if Some(c) == quote {
                break;
            } else {
                text.push(c);
            }
        }

        output.push(Fragment::Operand(Operand::String(text)));
        Ok(())
    }

    /// Maximal run of word characters; empty if none.
    fn scan_name(&mut self) -> &'a str {
        self.cursor.take_while(is_word_char)
    }

    /// Dotted lookup path.
    fn scan_lookup(&mut self, output: &mut Vec<Fragment>) -> Result<(), CompileError> {
        let mut path = Vec::new();

        loop {
            let offset = self.cursor.pos();
            let name = self.scan_name();
            if name.is_empty() {
                return Err(match (path.is_empty(), self.cursor.peek()) {
                    (true, Some(found)) => CompileError::UnexpectedCharacter { found, offset },
                    _ => CompileError::EmptyLookupSegment { offset },
                });
            }
            path.push(name.to_string());

            if self.cursor.peek() != Some('.') {
                break;
            }
            self.cursor.bump();
        }

        output.push(Fragment::Operand(Operand::Lookup(Lookup { path })));
        Ok(())
    }

    /// Filter application: `|name` with an optional `:argument` list.
    fn scan_filter(&mut self, output: &mut Vec<Fragment>) -> Result<(), CompileError> {
        self.cursor.bump();

        let offset = self.cursor.pos();
        let name = self.scan_name();
        if name.is_empty() {
            return Err(CompileError::EmptyFilterName { offset });
        }

        if self.cursor.peek() != Some(':') {
            output.push(Fragment::Filter(FilterApplication::new(name)));
            return Ok(());
        }
        self.cursor.bump();

        let start = output.len();
        self.scan_full(output, Some(name))?;
        // Argument mode stops at `|`, so only operands were appended.
        let args = output
            .split_off(start)
            .into_iter()
            .filter_map(Fragment::into_operand)
            .collect();

        output.push(Fragment::Filter(FilterApplication::with_args(name, args)));
        Ok(())
    }
}
