/*
 * filters.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Filter registry and built-in filters.
//!
//! Compiled expressions refer to filters by name only. Names are resolved
//! against the [`FilterRegistry`] of the compiler that produced the
//! expression when the expression is evaluated.

use crate::context::TemplateValue;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Result of applying a filter. The error is a human-readable message.
pub type FilterResult = Result<TemplateValue, String>;

/// A filter implementation: receives the input value and the evaluated
/// arguments.
pub type FilterFn = Arc<dyn Fn(&TemplateValue, &[TemplateValue]) -> FilterResult + Send + Sync>;

/// Table of filters available to compiled expressions, keyed by name.
#[derive(Clone, Default)]
pub struct FilterRegistry {
    filters: HashMap<String, FilterFn>,
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = self.names();
        names.sort_unstable();
        f.debug_struct("FilterRegistry")
            .field("filters", &names)
            .finish()
    }
}

impl FilterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in filters.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry
            .register("escape", |input, _| Ok(escape_html(&input.render()).into()))
            .register("linebreaksbr", |input, _| {
                Ok(escape_html(&input.render()).replace('\n', "<br />").into())
            })
            .register("upper", |input, _| Ok(input.render().to_uppercase().into()))
            .register("lower", |input, _| Ok(input.render().to_lowercase().into()))
            .register("default", default_filter)
            .register("length", length_filter)
            .register("join", join_filter);
        registry
    }

    /// Add (or replace) a filter.
    pub fn register<F>(&mut self, name: impl Into<String>, filter: F) -> &mut Self
    where
        F: Fn(&TemplateValue, &[TemplateValue]) -> FilterResult + Send + Sync + 'static,
    {
        self.filters.insert(name.into(), Arc::new(filter));
        self
    }

    /// Look up a filter by name.
    pub fn get(&self, name: &str) -> Option<&FilterFn> {
        self.filters.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// Names of all registered filters, in no particular order.
    pub fn names(&self) -> Vec<&str> {
        self.filters.keys().map(String::as_str).collect()
    }
}

/// Escape the HTML special characters `& < > " '`.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn default_filter(input: &TemplateValue, args: &[TemplateValue]) -> FilterResult {
    let fallback = args
        .first()
        .ok_or_else(|| "expects one argument".to_string())?;
    if input.is_truthy() {
        Ok(input.clone())
    } else {
        Ok(fallback.clone())
    }
}

fn length_filter(input: &TemplateValue, _args: &[TemplateValue]) -> FilterResult {
    let len = match input {
        TemplateValue::String(s) => s.chars().count(),
        TemplateValue::List(items) => items.len(),
        TemplateValue::Map(m) => m.len(),
        _ => 0,
    };
    i64::try_from(len)
        .map(TemplateValue::Integer)
        .map_err(|e| e.to_string())
}

fn join_filter(input: &TemplateValue, args: &[TemplateValue]) -> FilterResult {
    let separator = args.first().map(TemplateValue::render).unwrap_or_default();
    match input {
        TemplateValue::List(items) => Ok(items
            .iter()
            .map(TemplateValue::render)
            .collect::<Vec<_>>()
            .join(separator.as_str())
            .into()),
        other => Ok(other.clone()),
    }
}
