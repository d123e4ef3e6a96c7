use std::collections::HashMap;

use crate::foundation::error::PagevisResult;

/// Per-renderer cache of decoded images keyed by source URL.
///
/// Entries live until [`ImageCache::clear`]; there is no eviction. Failed loads are not stored, so
/// a later render retries them.
#[derive(Debug)]
pub struct ImageCache<T> {
    entries: HashMap<String, T>,
}

impl<T> Default for ImageCache<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T: Clone> ImageCache<T> {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value for `src`, or the result of `load` stored on success.
    pub fn get_or_try_insert_with(
        &mut self,
        src: &str,
        load: impl FnOnce() -> PagevisResult<T>,
    ) -> PagevisResult<T> {
        if let Some(v) = self.entries.get(src) {
            return Ok(v.clone());
        }
        let v = load()?;
        self.entries.insert(src.to_string(), v.clone());
        Ok(v)
    }

    /// Number of cached sources.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/cache.rs"]
mod tests;
