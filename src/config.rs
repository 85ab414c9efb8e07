//! Crate-wide configuration: default flags and the sizing knobs for the
//! compiled-pattern cache and the walker's readdir dedup set. Grounded in
//! the teacher's `GlobOptions`, split out into its own module the way
//! `tokf-server`'s config layer separates runtime tuning from per-call
//! options.

use std::num::NonZeroUsize;

use crate::expand::DEFAULT_LIMIT;
use crate::flags::MatchFlags;

/// Default capacity of the LRU cache of compiled patterns, matching the
/// teacher's own `DEFAULT_CACHE_SIZE` literal (§4.10).
pub const DEFAULT_CACHE_SIZE: usize = 1024;

/// Default capacity hint for the walker's per-directory dedup set, matching
/// the teacher's own `DEFAULT_READDIR_CACHE_SIZE` literal (§4.10).
pub const DEFAULT_READDIR_CACHE_SIZE: usize = 512;

fn nonzero(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap_or(NonZeroUsize::MIN)
}

/// Process-wide defaults applied to every call unless the caller overrides
/// them with explicit [`MatchFlags`] or a per-call limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub default_flags: MatchFlags,
    pub pattern_cache_capacity: NonZeroUsize,
    pub readdir_cache_capacity: NonZeroUsize,
    pub default_expansion_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_flags: MatchFlags::empty(),
            pattern_cache_capacity: nonzero(DEFAULT_CACHE_SIZE),
            readdir_cache_capacity: nonzero(DEFAULT_READDIR_CACHE_SIZE),
            default_expansion_limit: DEFAULT_LIMIT,
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Alias kept for call sites that only care about the expansion limit
    /// under its pipeline-stage name.
    pub fn expansion_limit(&self) -> usize {
        self.default_expansion_limit
    }
}

/// Builder for [`Config`], following the same fluent style the teacher used
/// for its own options type.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    inner: Config,
}

impl ConfigBuilder {
    pub fn default_flags(mut self, flags: MatchFlags) -> Self {
        self.inner.default_flags = flags;
        self
    }

    pub fn pattern_cache_capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.inner.pattern_cache_capacity = capacity;
        self
    }

    pub fn readdir_cache_capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.inner.readdir_cache_capacity = capacity;
        self
    }

    pub fn expansion_limit(mut self, limit: usize) -> Self {
        self.inner.default_expansion_limit = limit;
        self
    }

    pub fn build(self) -> Config {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.pattern_cache_capacity.get(), DEFAULT_CACHE_SIZE);
        assert_eq!(cfg.readdir_cache_capacity.get(), DEFAULT_READDIR_CACHE_SIZE);
        assert_eq!(cfg.default_expansion_limit, DEFAULT_LIMIT);
        assert_eq!(cfg.default_flags, MatchFlags::empty());
    }

    #[test]
    fn builder_overrides_apply() {
        let cfg = Config::builder()
            .pattern_cache_capacity(nonzero(10))
            .readdir_cache_capacity(nonzero(20))
            .expansion_limit(5)
            .default_flags(MatchFlags::GLOBSTAR)
            .build();
        assert_eq!(cfg.pattern_cache_capacity.get(), 10);
        assert_eq!(cfg.readdir_cache_capacity.get(), 20);
        assert_eq!(cfg.default_expansion_limit, 5);
        assert_eq!(cfg.default_flags, MatchFlags::GLOBSTAR);
    }
}
