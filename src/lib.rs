//! A Bash/Zsh-flavored glob pattern engine: compile, match, filter, and walk.
//!
//! The pipeline a pattern travels through is: pre-expansion ([`expand`]) →
//! lexing into a typed AST ([`ast`], [`lexer`]) → translation to a regex
//! ([`translate`]) → a cached, compiled [`matcher::Matcher`] → optionally,
//! [`walk::Walker`] drives that matcher over a real directory tree.

pub mod ast;
pub mod cache;
pub mod config;
pub mod error;
pub mod escape;
pub mod expand;
pub mod flags;
pub mod lexer;
pub mod matcher;
pub mod platform;
pub mod translate;
pub mod walk;

pub use cache::PatternCache;
pub use config::{Config, ConfigBuilder};
pub use error::{GlobError, Result};
pub use escape::{escape, is_magic};
pub use expand::RawPattern;
pub use flags::MatchFlags;
pub use matcher::Matcher;
pub use platform::Platform;
pub use translate::translate_batch;
pub use walk::{CancelToken, Walker};

use std::path::Path;

use once_cell::sync::Lazy;

/// Process-wide default cache backing the top-level convenience functions,
/// so repeated calls to [`is_match`]/[`glob`] with the same pattern don't
/// each pay for a fresh compile.
static DEFAULT_CACHE: Lazy<PatternCache> =
    Lazy::new(|| PatternCache::new(config::DEFAULT_CACHE_SIZE));

/// One-shot convenience: does `candidate` match `pattern` under `flags`?
/// Compiled patterns are kept in a process-wide cache; callers matching
/// many paths against the same pattern set should still prefer building a
/// [`Matcher`] once via [`Matcher::compile`] and reusing it directly.
pub fn is_match(pattern: &str, candidate: &str, flags: MatchFlags) -> Result<bool> {
    let config = Config::default();
    let matcher = Matcher::compile(&[pattern.to_string()], flags, &config, &DEFAULT_CACHE)?;
    matcher.is_match(candidate)
}

/// Walk `root`, returning every path accepted by `patterns` under `flags`,
/// using process defaults for cache sizing and the expansion limit.
pub fn glob<P: AsRef<Path>>(
    patterns: &[String],
    flags: MatchFlags,
    root: P,
) -> Result<Vec<String>> {
    let config = Config::default();
    let matcher = Matcher::compile(patterns, flags, &config, &DEFAULT_CACHE)?;
    Walker::with_config(&matcher, root.as_ref(), &config).run()
}
