//! The public-facing matcher facade (§C5): compiles and caches patterns,
//! and exposes `is_match`/`filter` over candidate path strings.

use std::path::Path;
use std::sync::Arc;

use crate::ast::Ast;
use crate::cache::PatternCache;
use crate::config::Config;
use crate::error::{GlobError, Result};
use crate::expand::{self, ExpandedPattern, RawPattern};
use crate::flags::MatchFlags;
use crate::lexer;
use crate::platform::{FsAccess, Platform, RealFs};
use crate::translate;

/// One compiled pattern: its source text (for diagnostics), whether it is
/// an exclude, and the regex that implements it.
struct CompiledPattern {
    source: String,
    is_exclude: bool,
    regex: Arc<fancy_regex::Regex>,
}

/// A compiled matcher built from one or more raw patterns. Cheap to clone
/// (everything behind it is reference counted) and safe to share across
/// threads.
pub struct Matcher {
    patterns: Vec<CompiledPattern>,
    /// True if `NEGATEALL` applied and there were excludes but no includes,
    /// meaning "everything not excluded" should match.
    implicit_include_all: bool,
    flags: MatchFlags,
    platform: Platform,
}

impl Matcher {
    /// Compile `raw_patterns` against `flags`, using `cache` to avoid
    /// recompiling identical `(pattern, flags, platform)` triples.
    pub fn compile(
        raw_patterns: &[String],
        flags: MatchFlags,
        config: &Config,
        cache: &PatternCache,
    ) -> Result<Matcher> {
        let flags = (config.default_flags | flags).normalize();
        let expanded = expand::expand_all(raw_patterns, flags, config.default_expansion_limit)?;
        Matcher::from_expanded(expanded, flags, cache)
    }

    /// Like [`Self::compile`], but accepts [`RawPattern`]s so a batch of
    /// byte-string patterns (or candidate paths with non-UTF-8 bytes) can be
    /// compiled directly. Returns [`GlobError::TypeMismatch`] if
    /// `raw_patterns` mixes `RawPattern::Text` and `RawPattern::Bytes`.
    pub fn compile_raw(
        raw_patterns: &[RawPattern],
        flags: MatchFlags,
        config: &Config,
        cache: &PatternCache,
    ) -> Result<Matcher> {
        let flags = (config.default_flags | flags).normalize();
        let expanded = expand::expand_all_typed(raw_patterns, flags, config.default_expansion_limit)?;
        Matcher::from_expanded(expanded, flags, cache)
    }

    fn from_expanded(
        expanded: Vec<ExpandedPattern>,
        flags: MatchFlags,
        cache: &PatternCache,
    ) -> Result<Matcher> {
        let platform = Platform::effective(flags);
        let mut patterns = Vec::with_capacity(expanded.len());
        let mut has_include = false;

        for ExpandedPattern { text, is_exclude } in &expanded {
            let regex = compile_one(text, flags, platform, *is_exclude, cache)?;
            if !is_exclude {
                has_include = true;
            }
            patterns.push(CompiledPattern {
                source: text.clone(),
                is_exclude: *is_exclude,
                regex,
            });
        }

        let implicit_include_all =
            flags.contains(MatchFlags::NEGATEALL) && !has_include && !patterns.is_empty();

        Ok(Matcher {
            patterns,
            implicit_include_all,
            flags,
            platform,
        })
    }

    /// Convenience one-shot: compile `pattern` against `text` without a
    /// shared cache (callers matching many paths against the same pattern
    /// should build a [`Config`]/[`PatternCache`] once and reuse it).
    pub fn is_match_once(pattern: &str, text: &str, flags: MatchFlags) -> Result<bool> {
        let config = Config::default();
        let cache = PatternCache::new(1);
        let matcher = Matcher::compile(&[pattern.to_string()], flags, &config, &cache)?;
        matcher.is_match(text)
    }

    /// Whether `candidate` matches this compiled pattern set, honoring
    /// include/exclude precedence: a path matches if at least one include
    /// pattern matches it and no exclude pattern matches it (or, under
    /// `NEGATEALL` with only excludes, if no exclude matches it).
    pub fn is_match(&self, candidate: &str) -> Result<bool> {
        let mut matched_include = self.implicit_include_all;

        for pattern in &self.patterns {
            if pattern.is_exclude {
                continue;
            }
            if pattern.regex.is_match(candidate).map_err(|source| {
                GlobError::RegexCompilation {
                    pattern: pattern.source.clone(),
                    source: Box::new(source),
                }
            })? {
                matched_include = true;
                break;
            }
        }

        if !matched_include {
            return Ok(false);
        }

        for pattern in &self.patterns {
            if !pattern.is_exclude {
                continue;
            }
            if pattern.regex.is_match(candidate).map_err(|source| {
                GlobError::RegexCompilation {
                    pattern: pattern.source.clone(),
                    source: Box::new(source),
                }
            })? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Filter `candidates` down to the ones this matcher accepts,
    /// preserving input order.
    pub fn filter<'a, I>(&self, candidates: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut out = Vec::new();
        for candidate in candidates {
            if self.is_match(candidate)? {
                out.push(candidate.to_string());
            }
        }
        Ok(out)
    }

    pub fn flags(&self) -> MatchFlags {
        self.flags
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// True if this matcher has no include patterns at all (only excludes,
    /// without `NEGATEALL` set) — such a matcher can never match anything,
    /// which callers may want to diagnose rather than silently walk nothing.
    pub fn matches_nothing(&self) -> bool {
        !self.implicit_include_all && self.patterns.iter().all(|p| p.is_exclude)
    }

    /// `REALPATH`-aware match: like [`Self::is_match`], but when `REALPATH`
    /// is set also consults the filesystem rooted at `root` (§4.5). A
    /// candidate that does not exist never matches, and a candidate that
    /// crosses a symlinked directory is rejected unless `FOLLOW` or
    /// `GLOBSTARLONG` is set. Plain `is_match` is used when `REALPATH` is
    /// not set, so this is always safe to call.
    pub fn is_match_real_fs(&self, candidate: &str, root: &Path) -> Result<bool> {
        self.is_match_real(candidate, root, &RealFs)
    }

    /// Same as [`Self::is_match_real_fs`] but over an injected [`FsAccess`],
    /// so tests can exercise `REALPATH` semantics without touching disk.
    pub fn is_match_real<F: FsAccess>(&self, candidate: &str, root: &Path, fs: &F) -> Result<bool> {
        if self.flags.contains(MatchFlags::REALPATH) {
            let full = root.join(candidate);
            if !fs.exists(&full) {
                return Ok(false);
            }
            let crossing_allowed =
                self.flags.contains(MatchFlags::FOLLOW) || self.flags.contains(MatchFlags::GLOBSTARLONG);
            if !crossing_allowed && crosses_symlink_dir(candidate, root, fs) {
                return Ok(false);
            }
        }
        self.is_match(candidate)
    }
}

/// True if any directory component of `candidate` (excluding the final
/// component, which may itself be a symlink without that counting as a
/// "crossing") is a symlink under `root`.
fn crosses_symlink_dir<F: FsAccess>(candidate: &str, root: &Path, fs: &F) -> bool {
    let parts: Vec<&str> = candidate
        .split(|c| c == '/' || c == '\\')
        .filter(|s| !s.is_empty())
        .collect();
    if parts.len() <= 1 {
        return false;
    }
    let mut acc = root.to_path_buf();
    for part in &parts[..parts.len() - 1] {
        acc.push(part);
        if fs.is_symlink(&acc) {
            return true;
        }
    }
    false
}

fn compile_one(
    text: &str,
    flags: MatchFlags,
    platform: Platform,
    is_exclude: bool,
    cache: &PatternCache,
) -> Result<Arc<fancy_regex::Regex>> {
    cache.get_or_compile(text, flags, platform, is_exclude, || {
        let ast: Ast = lexer::parse(text, platform, flags, false)?;
        let ast = apply_matchbase(ast, flags);
        let body = translate::translate(&ast, platform, flags, is_exclude);
        fancy_regex::Regex::new(&body).map_err(|source| GlobError::RegexCompilation {
            pattern: text.to_string(),
            source: Box::new(source),
        })
    })
}

/// `MATCHBASE`: a pattern with no separator gets an implicit globstar
/// prefix so it matches at any depth, following whichever globstar variant
/// (`**` vs `***`) the caller's flags already enable (§9 decided).
fn apply_matchbase(ast: Ast, flags: MatchFlags) -> Ast {
    if !flags.contains(MatchFlags::MATCHBASE) || ast.has_separator() {
        return ast;
    }
    use crate::ast::{GlobstarKind, Node};
    let kind = if flags.contains(MatchFlags::GLOBSTARLONG) {
        GlobstarKind::Long
    } else {
        GlobstarKind::Normal
    };
    let mut nodes = vec![Node::Globstar(kind), Node::Separator];
    nodes.extend(ast.nodes);
    Ast::new(nodes)
}
