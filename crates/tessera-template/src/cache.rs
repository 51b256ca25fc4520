/*
 * cache.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Memoization of compiled expressions by source text.
//!
//! An [`ExpressionCache`] is a cheap, cloneable handle: clones share the
//! same entries. Each [`Compiler`](crate::Compiler) owns one; to share
//! compiled expressions between compilers, pass the same handle to
//! [`Compiler::with_cache`](crate::Compiler::with_cache).
//!
//! The same text can scan differently depending on
//! [`CompilerOptions::multiple_filter_arguments`], so entries are kept
//! separately per argument mode. Compilers with different options can share
//! a cache without seeing each other's results.
//!
//! Entries are never evicted. Two threads compiling the same unseen source
//! may both do the work, but [`ExpressionCache::insert`] keeps whichever
//! entry landed first and hands it to both, so every caller observes the
//! same instance.

use crate::compiler::CompiledExpression;
use crate::options::CompilerOptions;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

type Entries = HashMap<String, Arc<CompiledExpression>>;

/// Shared map from argument mode and source text to a compiled expression.
#[derive(Debug, Clone, Default)]
pub struct ExpressionCache {
    /// Keyed by `multiple_filter_arguments`, then by source text.
    entries: Arc<RwLock<HashMap<bool, Entries>>>,
}

impl ExpressionCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the expression compiled from exactly `source` under `options`.
    pub fn get(&self, options: &CompilerOptions, source: &str) -> Option<Arc<CompiledExpression>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&options.multiple_filter_arguments)
            .and_then(|entries| entries.get(source))
            .cloned()
    }

    /// Insert `compiled` under `options` and `source` unless an entry
    /// already exists.
    ///
    /// Returns the entry that is in the cache afterwards.
    pub fn insert(
        &self,
        options: &CompilerOptions,
        source: &str,
        compiled: Arc<CompiledExpression>,
    ) -> Arc<CompiledExpression> {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let kept = entries
            .entry(options.multiple_filter_arguments)
            .or_default()
            .entry(source.to_string())
            .or_insert(compiled);
        Arc::clone(kept)
    }

    pub fn contains(&self, options: &CompilerOptions, source: &str) -> bool {
        self.get(options, source).is_some()
    }

    /// Number of cached expressions across all argument modes.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(HashMap::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `other` is a handle to the same underlying cache.
    pub fn shares_with(&self, other: &ExpressionCache) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }
}
