/*
 * compiler.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Expression compiler entry point.
//!
//! [`Compiler::compile`] turns expression source text such as
//! `user.name|default:'anonymous'|upper` into a [`CompiledExpression`],
//! memoized by exact source text. A compiled expression stays bound to the
//! filter registry of the compiler that produced it, so filter names are
//! resolved against that registry when it is evaluated.

use crate::ast::{Expression, Operand};
use crate::cache::ExpressionCache;
use crate::context::{TemplateContext, TemplateValue};
use crate::error::{TemplateError, TemplateResult};
use crate::filters::FilterRegistry;
use crate::options::CompilerOptions;
use crate::scanner::Scanner;
use std::fmt;
use std::sync::Arc;

/// The result of compiling one expression string.
#[derive(Debug)]
pub struct CompiledExpression {
    /// The exact source text this was compiled from.
    source: String,

    /// The expression tree.
    expression: Expression,

    /// Filters of the compiler that produced this expression.
    filters: Arc<FilterRegistry>,
}

impl CompiledExpression {
    /// The source text this expression was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The expression tree.
    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    /// The filter registry filter names resolve against.
    pub fn filters(&self) -> &FilterRegistry {
        &self.filters
    }

    /// Evaluate this expression against a context.
    ///
    /// The operand is evaluated first (a lookup that does not resolve yields
    /// `Null`), then each filter is applied in order to the running value.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::UnknownFilter`] if a filter name is not in
    /// the bound registry, or [`TemplateError::FilterFailed`] if a filter
    /// rejects its input.
    pub fn evaluate(&self, context: &TemplateContext) -> TemplateResult<TemplateValue> {
        let mut value = evaluate_operand(&self.expression.operand, context);

        for filter in &self.expression.filters {
            let apply = self
                .filters
                .get(&filter.name)
                .ok_or_else(|| TemplateError::UnknownFilter {
                    name: filter.name.clone(),
                })?;
            let args: Vec<TemplateValue> = filter
                .args
                .iter()
                .map(|arg| evaluate_operand(arg, context))
                .collect();

            value = apply(&value, &args).map_err(|message| TemplateError::FilterFailed {
                name: filter.name.clone(),
                message,
            })?;
        }

        Ok(value)
    }

    /// Evaluate this expression and render the result as a string.
    pub fn render(&self, context: &TemplateContext) -> TemplateResult<String> {
        Ok(self.evaluate(context)?.render())
    }
}

impl fmt::Display for CompiledExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expression)
    }
}

fn evaluate_operand(operand: &Operand, context: &TemplateContext) -> TemplateValue {
    match operand {
        Operand::Number(n) => TemplateValue::from(*n),
        Operand::String(s) => TemplateValue::String(s.clone()),
        Operand::Lookup(lookup) => {
            let path: Vec<&str> = lookup.path.iter().map(String::as_str).collect();
            context.get_path(&path).cloned().unwrap_or_default()
        }
    }
}

/// Compiles expression strings and memoizes the results.
///
/// Cloning a compiler is cheap; clones share the filter registry and the
/// cache.
#[derive(Debug, Clone)]
pub struct Compiler {
    options: CompilerOptions,
    filters: Arc<FilterRegistry>,
    cache: ExpressionCache,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(CompilerOptions::default(), FilterRegistry::with_builtins())
    }
}

impl Compiler {
    /// Create a compiler with its own private cache.
    pub fn new(options: CompilerOptions, filters: FilterRegistry) -> Self {
        Self::with_cache(options, filters, ExpressionCache::new())
    }

    /// Create a compiler that stores compiled expressions in `cache`.
    ///
    /// Entries are kept apart per argument mode, so compilers with
    /// different [`CompilerOptions`] never see each other's results. A
    /// cached expression stays bound to the filters of the compiler that
    /// compiled it, so compilers sharing a cache should also agree on their
    /// filters.
    pub fn with_cache(
        options: CompilerOptions,
        filters: FilterRegistry,
        cache: ExpressionCache,
    ) -> Self {
        Self {
            options,
            filters: Arc::new(filters),
            cache,
        }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn filters(&self) -> &FilterRegistry {
        &self.filters
    }

    pub fn cache(&self) -> &ExpressionCache {
        &self.cache
    }

    /// Compile an expression string.
    ///
    /// Compiling the same string again returns the same `Arc` (compare with
    /// [`Arc::ptr_eq`]) while the cache is enabled. Failed compilations are
    /// not cached.
    ///
    /// Malformed input is rejected rather than partially accepted. A number
    /// running into a second decimal point or a word character (`3.1.4`,
    /// `12ab`) is a [`MalformedNumber`](crate::CompileError::MalformedNumber)
    /// error at the offending character, even though the number itself
    /// scans as `3.1` or `12`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Compile`] if the source is not a valid
    /// expression.
    pub fn compile(&self, source: &str) -> TemplateResult<Arc<CompiledExpression>> {
        if self.options.cache_enabled {
            if let Some(compiled) = self.cache.get(&self.options, source) {
                tracing::trace!(source, "expression cache hit");
                return Ok(compiled);
            }
        }

        tracing::debug!(source, "compiling expression");
        let expression = Scanner::new(source, &self.options)
            .scan_expression()
            .map_err(|error| TemplateError::Compile {
                source_text: source.to_string(),
                error,
            })?;

        let compiled = Arc::new(CompiledExpression {
            source: source.to_string(),
            expression,
            filters: Arc::clone(&self.filters),
        });

        if self.options.cache_enabled {
            Ok(self.cache.insert(&self.options, source, compiled))
        } else {
            Ok(compiled)
        }
    }
}
