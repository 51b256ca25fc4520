/*
 * options.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Compiler configuration.

/// Options controlling how expressions are compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Allow a filter to take several comma-separated arguments
    /// (`|slice:1, 3`). When disabled, the first comma ends the argument
    /// list and the rest of the expression is rejected.
    pub multiple_filter_arguments: bool,

    /// Memoize compiled expressions by their source text.
    pub cache_enabled: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            multiple_filter_arguments: true,
            cache_enabled: true,
        }
    }
}

impl CompilerOptions {
    /// Create options with the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable multiple filter arguments.
    pub fn with_multiple_filter_arguments(mut self, enabled: bool) -> Self {
        self.multiple_filter_arguments = enabled;
        self
    }

    /// Enable or disable the compilation cache.
    pub fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CompilerOptions::new();
        assert!(options.multiple_filter_arguments);
        assert!(options.cache_enabled);
    }

    #[test]
    fn test_builder_methods() {
        let options = CompilerOptions::new()
            .with_multiple_filter_arguments(false)
            .with_cache_enabled(false);
        assert!(!options.multiple_filter_arguments);
        assert!(!options.cache_enabled);
    }
}
