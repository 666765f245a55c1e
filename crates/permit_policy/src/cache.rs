//! Caller-owned cache of parsed rules.
//!
//! Parsing is a pure function of the rule text, so hosts that check the
//! same rules repeatedly can keep one of these and share it between
//! threads. Nothing in this crate holds a cache of its own.

use crate::binding::Binding;
use crate::lexer::tokenize;
use crate::parser::parse;
use crate::program::Program;
use indexmap::IndexMap;
use permit_core::PermitResult;
use std::sync::{Arc, PoisonError, RwLock};

/// Default number of rules kept
pub const DEFAULT_CAPACITY: usize = 256;

/// Thread-safe cache of parsed programs keyed by rule text.
///
/// When full, the oldest inserted rule is evicted. Rules that fail to parse
/// are never stored.
#[derive(Debug)]
pub struct ParseCache {
    capacity: usize,
    entries: RwLock<IndexMap<String, Arc<Program>>>,
}

impl ParseCache {
    /// Create a cache holding up to [`DEFAULT_CAPACITY`] rules
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a cache holding up to `capacity` rules. A capacity of zero
    /// disables storage.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            entries: RwLock::new(IndexMap::with_capacity(capacity.min(DEFAULT_CAPACITY))),
        }
    }

    /// Maximum number of rules kept
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Cached program for `text`, if any
    #[must_use]
    pub fn get(&self, text: &str) -> Option<Arc<Program>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(text).cloned()
    }

    /// Cached program for `text`, parsing and storing it on a miss
    ///
    /// # Errors
    ///
    /// Returns the parse error for unbalanced rules
    pub fn get_or_parse(&self, text: &str) -> PermitResult<Arc<Program>> {
        if let Some(program) = self.get(text) {
            tracing::trace!(rule = text, "parse cache hit");
            return Ok(program);
        }

        let program = Arc::new(parse(tokenize(text))?);
        if self.capacity == 0 {
            return Ok(program);
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        // another thread may have parsed the same rule meanwhile
        if let Some(existing) = entries.get(text) {
            return Ok(Arc::clone(existing));
        }
        while entries.len() >= self.capacity {
            if let Some((evicted, _)) = entries.shift_remove_index(0) {
                tracing::debug!(rule = %evicted, "evicted parsed rule");
            }
        }
        entries.insert(text.to_string(), Arc::clone(&program));
        Ok(program)
    }

    /// Evaluate `text` against `binding`, parsing through the cache
    ///
    /// # Errors
    ///
    /// See [`crate::evaluate`] and [`ParseCache::get_or_parse`]
    pub fn permitted(&self, text: &str, binding: &Binding) -> PermitResult<bool> {
        self.get_or_parse(text)?.evaluate(binding)
    }

    /// Number of cached rules
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether the cache is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached rule
    pub fn clear(&self) {
        self.entries.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl Default for ParseCache {
    fn default() -> Self {
        Self::new()
    }
}
