//! Process-wide cache of compiled patterns, keyed on the raw pattern text
//! plus the flags and platform it was compiled under. Mirrors the teacher's
//! read-then-upgrade `RwLock<LruCache<_,_>>` strategy: a cheap read lock
//! covers the common "already compiled" path, and only a miss pays for the
//! write lock.

use std::num::NonZeroUsize;
use std::sync::{Arc, RwLock};

use lru::LruCache;

use crate::flags::MatchFlags;
use crate::platform::Platform;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    pattern: String,
    flags: MatchFlags,
    platform: Platform,
    is_exclude: bool,
}

/// A thread-safe LRU cache from `(pattern, flags, platform)` to an already
/// compiled `fancy_regex::Regex`, shared behind an `Arc` so a [`Config`]'s
/// cache can be cloned cheaply into worker closures.
///
/// [`Config`]: crate::config::Config
pub struct PatternCache {
    inner: RwLock<LruCache<CacheKey, Arc<fancy_regex::Regex>>>,
}

impl PatternCache {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).expect("capacity clamped to at least 1");
        PatternCache {
            inner: RwLock::new(LruCache::new(cap)),
        }
    }

    /// Fetch a cached compiled regex, or compile and insert it via `compile`
    /// on a cache miss. `is_exclude` is part of the key because `NEGATE`
    /// makes the same pattern text translate differently depending on its
    /// polarity (see [`crate::flags::MatchFlags::dotglob_for`]).
    pub fn get_or_compile<F>(
        &self,
        pattern: &str,
        flags: MatchFlags,
        platform: Platform,
        is_exclude: bool,
        compile: F,
    ) -> crate::error::Result<Arc<fancy_regex::Regex>>
    where
        F: FnOnce() -> crate::error::Result<fancy_regex::Regex>,
    {
        let key = CacheKey {
            pattern: pattern.to_string(),
            flags,
            platform,
            is_exclude,
        };

        if let Some(hit) = self
            .inner
            .read()
            .expect("pattern cache lock poisoned")
            .peek(&key)
        {
            return Ok(Arc::clone(hit));
        }

        let compiled = Arc::new(compile()?);
        self.inner
            .write()
            .expect("pattern cache lock poisoned")
            .put(key, Arc::clone(&compiled));
        Ok(compiled)
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("pattern cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.inner.write().expect("pattern cache lock poisoned").clear();
    }
}

impl Default for PatternCache {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_CACHE_SIZE)
    }
}

impl std::fmt::Debug for PatternCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternCache").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_once_on_repeated_hits() {
        let cache = PatternCache::new(4);
        let mut calls = 0;
        for _ in 0..3 {
            cache
                .get_or_compile("*.md", MatchFlags::empty(), Platform::Unix, false, || {
                    calls += 1;
                    Ok(fancy_regex::Regex::new("^.*$").unwrap())
                })
                .unwrap();
        }
        assert_eq!(calls, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn distinct_flags_are_distinct_keys() {
        let cache = PatternCache::new(4);
        cache
            .get_or_compile("*.md", MatchFlags::empty(), Platform::Unix, false, || {
                Ok(fancy_regex::Regex::new("^a$").unwrap())
            })
            .unwrap();
        cache
            .get_or_compile("*.md", MatchFlags::IGNORECASE, Platform::Unix, false, || {
                Ok(fancy_regex::Regex::new("^b$").unwrap())
            })
            .unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn distinct_polarity_is_a_distinct_key() {
        let cache = PatternCache::new(4);
        cache
            .get_or_compile("*.md", MatchFlags::NEGATE, Platform::Unix, false, || {
                Ok(fancy_regex::Regex::new("^a$").unwrap())
            })
            .unwrap();
        cache
            .get_or_compile("*.md", MatchFlags::NEGATE, Platform::Unix, true, || {
                Ok(fancy_regex::Regex::new("^b$").unwrap())
            })
            .unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn evicts_least_recently_used() {
        let cache = PatternCache::new(1);
        cache
            .get_or_compile("a", MatchFlags::empty(), Platform::Unix, false, || {
                Ok(fancy_regex::Regex::new("^a$").unwrap())
            })
            .unwrap();
        cache
            .get_or_compile("b", MatchFlags::empty(), Platform::Unix, false, || {
                Ok(fancy_regex::Regex::new("^b$").unwrap())
            })
            .unwrap();
        assert_eq!(cache.len(), 1);
    }
}
