//! The single error type returned by every fallible public operation.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while expanding, parsing, translating, compiling, or
/// walking a glob pattern.
///
/// Filesystem errors encountered mid-walk are not necessarily fatal: the
/// walker routes them through its configured error hook (see
/// [`crate::walk::Walker::on_error`]) and only surfaces them here when
/// the hook asks the walk to abort.
#[derive(Debug, Error)]
pub enum GlobError {
    /// Malformed pattern syntax: an unterminated extended-glob header, a
    /// non-ASCII POSIX class name, or a brace expression that cannot be
    /// parsed.
    #[error("invalid pattern syntax in `{pattern}`: {reason}")]
    Syntax {
        pattern: String,
        reason: &'static str,
    },

    /// Brace/split expansion produced more patterns than the configured
    /// `limit` allows.
    #[error("pattern expansion of `{pattern}` exceeded the limit of {limit}")]
    PatternLimit { pattern: String, limit: usize },

    /// A batch mixed `String` and byte-string patterns or candidate paths.
    #[error("cannot mix string and byte-string inputs in a single call")]
    TypeMismatch,

    /// Conflicting or nonsensical flag/argument combinations that the
    /// library declines to silently resolve (most flag conflicts instead
    /// resolve to a documented winner and never reach this variant — see
    /// [`crate::flags::MatchFlags`]).
    #[error("invalid arguments: {0}")]
    Argument(&'static str),

    /// An OS-level error while reading directory entries or stat-ing a
    /// path, surfaced because the walker's error hook requested an abort.
    #[error("filesystem error at {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The translator produced a regex the configured engine rejected, or
    /// was asked to lower an AST shape it cannot represent. This indicates
    /// a bug in the translator, not bad user input.
    #[error("internal regex compilation error for `{pattern}`: {source}")]
    RegexCompilation {
        pattern: String,
        #[source]
        source: Box<fancy_regex::Error>,
    },
}

pub type Result<T> = std::result::Result<T, GlobError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_display_names_pattern() {
        let err = GlobError::Syntax {
            pattern: "a{b".into(),
            reason: "unbalanced brace",
        };
        assert!(err.to_string().contains("a{b"));
        assert!(err.to_string().contains("unbalanced brace"));
    }

    #[test]
    fn pattern_limit_display() {
        let err = GlobError::PatternLimit {
            pattern: "{a,b,c}".into(),
            limit: 2,
        };
        assert!(err.to_string().contains('2'));
    }

    #[test]
    fn type_mismatch_display() {
        assert!(GlobError::TypeMismatch.to_string().contains("mix"));
    }

    #[test]
    fn filesystem_display_includes_path() {
        let err = GlobError::Filesystem {
            path: PathBuf::from("/tmp/missing"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().contains("/tmp/missing"));
    }
}
