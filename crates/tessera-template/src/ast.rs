/*
 * ast.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Expression tree types.
//!
//! An expression is a single operand (a literal or a dotted lookup) optionally
//! piped through a chain of filter applications:
//!
//! ```text
//! user.name|default:'anonymous'|upper
//! ```
//!
//! The `Display` implementations render a normalized expression string that
//! compiles back to an equal tree.

use serde::Serialize;
use std::fmt;

/// A numeric literal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Number {
    /// A literal with no decimal point (e.g., `42`).
    Integer(i64),
    /// A literal containing one decimal point (e.g., `3.14`, `.5`).
    Decimal(f64),
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{}", i),
            Number::Decimal(d) => {
                // f64's Display drops the point for whole values, which would
                // read back as an integer.
                let text = d.to_string();
                if text.contains('.') {
                    f.write_str(&text)
                } else {
                    write!(f, "{}.0", text)
                }
            }
        }
    }
}

/// A dotted path into the rendering context (e.g., `a.b.c`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Lookup {
    /// Path segments, outermost first.
    pub path: Vec<String>,
}

impl Lookup {
    /// Create a lookup from its path segments.
    pub fn new<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path.join("."))
    }
}

/// A value-producing term: the head of an expression or a filter argument.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Operand {
    Number(Number),
    String(String),
    Lookup(Lookup),
}

impl Operand {
    /// Shorthand for a lookup operand.
    pub fn lookup<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Operand::Lookup(Lookup::new(path))
    }

    /// Shorthand for a string literal operand.
    pub fn string(value: impl Into<String>) -> Self {
        Operand::String(value.into())
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Number(n) => write!(f, "{}", n),
            Operand::Lookup(l) => write!(f, "{}", l),
            Operand::String(s) => {
                f.write_str("'")?;
                for c in s.chars() {
                    if c == '\\' || c == '\'' {
                        f.write_str("\\")?;
                    }
                    write!(f, "{}", c)?;
                }
                f.write_str("'")
            }
        }
    }
}

/// A filter applied with `|name` or `|name:arg[,arg...]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterApplication {
    /// Filter name, resolved against a filter registry at evaluation time.
    pub name: String,
    /// Argument operands, in source order.
    pub args: Vec<Operand>,
}

impl FilterApplication {
    /// Create a filter application with no arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Create a filter application with arguments.
    pub fn with_args(name: impl Into<String>, args: Vec<Operand>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

impl fmt::Display for FilterApplication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "|{}", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            f.write_str(if i == 0 { ":" } else { "," })?;
            write!(f, "{}", arg)?;
        }
        Ok(())
    }
}

/// A single unit produced by the scanner, in source order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Fragment {
    Operand(Operand),
    Filter(FilterApplication),
}

/// A complete expression: an operand followed by zero or more filters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expression {
    pub operand: Operand,
    pub filters: Vec<FilterApplication>,
}

impl Expression {
    /// Create an expression with no filters.
    pub fn new(operand: Operand) -> Self {
        Self {
            operand,
            filters: Vec::new(),
        }
    }

    /// Append a filter application to the chain.
    pub fn with_filter(mut self, filter: FilterApplication) -> Self {
        self.filters.push(filter);
        self
    }

    /// The expression's fragments in source order.
    pub fn fragments(&self) -> Vec<Fragment> {
        std::iter::once(Fragment::Operand(self.operand.clone()))
            .chain(self.filters.iter().cloned().map(Fragment::Filter))
            .collect()
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.operand)?;
        for filter in &self.filters {
            write!(f, "{}", filter)?;
        }
        Ok(())
    }
}
