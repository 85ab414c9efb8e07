//! OS detection, separator/drive/UNC handling, tilde resolution, and thin
//! wrappers over the filesystem primitives the rest of the crate needs.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{GlobError, Result};
use crate::flags::MatchFlags;

/// The two path dialects this crate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Unix,
    Windows,
}

impl Platform {
    /// Detect the platform the process is actually running on.
    pub fn host() -> Platform {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }

    /// Resolve the effective platform for a call, honoring `REALPATH`'s
    /// override of `FORCEWIN`/`FORCEUNIX` (§3: `REALPATH` forces the host's
    /// real platform regardless of the forcing flags).
    pub fn effective(flags: MatchFlags) -> Platform {
        if flags.contains(MatchFlags::REALPATH) {
            return Platform::host();
        }
        if flags.contains(MatchFlags::FORCEWIN) {
            return Platform::Windows;
        }
        if flags.contains(MatchFlags::FORCEUNIX) {
            return Platform::Unix;
        }
        Platform::host()
    }

    /// Whether this platform treats paths case-insensitively by default.
    pub fn case_insensitive_by_default(self) -> bool {
        matches!(self, Platform::Windows)
    }

    /// Whether `c` is a path separator on this platform.
    #[inline]
    pub fn is_separator(self, c: char) -> bool {
        match self {
            Platform::Unix => c == '/',
            Platform::Windows => c == '/' || c == '\\',
        }
    }

    /// Normalize separators to `/`. A no-op on Unix; replaces `\` with `/`
    /// on Windows.
    pub fn normalize_separators<'a>(self, path: &'a str) -> Cow<'a, str> {
        match self {
            Platform::Unix => Cow::Borrowed(path),
            Platform::Windows => {
                if path.contains('\\') {
                    Cow::Owned(path.replace('\\', "/"))
                } else {
                    Cow::Borrowed(path)
                }
            }
        }
    }
}

/// The recognized drive/root prefix at the start of a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootPrefix {
    /// No drive or UNC root: `None` for a purely relative (or POSIX
    /// absolute) path.
    None,
    /// A POSIX-style absolute path: a leading `/`.
    PosixRoot,
    /// A Windows drive letter, e.g. `C:`.
    Drive(char),
    /// A Windows UNC sharepoint, e.g. `//server/share`.
    Unc { server: String, share: String },
}

/// Recognize a drive or UNC root at the start of `path` (already
/// separator-normalized to `/`). Returns the prefix and the byte length it
/// occupies in `path`.
pub fn detect_root_prefix(platform: Platform, path: &str) -> (RootPrefix, usize) {
    if platform == Platform::Windows {
        if path.starts_with("//") {
            let rest = &path[2..];
            let mut parts = rest.splitn(3, '/');
            if let (Some(server), Some(share)) = (parts.next(), parts.next()) {
                if !server.is_empty() && !share.is_empty() {
                    let consumed = 2 + server.len() + 1 + share.len();
                    return (
                        RootPrefix::Unc {
                            server: server.to_string(),
                            share: share.to_string(),
                        },
                        consumed,
                    );
                }
            }
        }
        let bytes = path.as_bytes();
        if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
            return (RootPrefix::Drive(bytes[0] as char), 2);
        }
    }
    if path.starts_with('/') {
        return (RootPrefix::PosixRoot, 1);
    }
    (RootPrefix::None, 0)
}

/// Resolve `~` or `~user` at the start of a pattern to the corresponding
/// home directory. Only returns `Some` when the leading segment is exactly
/// `~` (current user) or `~name` immediately followed by `/` or end of
/// string, per §4.2 stage 4.
///
/// `~user` for a user other than the caller is not resolvable through the
/// portable home-directory lookup this crate uses (see DESIGN.md) and is
/// reported as a [`GlobError::Argument`] rather than silently left alone.
pub fn expand_tilde(pattern: &str) -> Result<Option<String>> {
    if !pattern.starts_with('~') {
        return Ok(None);
    }
    let rest = &pattern[1..];
    let (name, remainder) = match rest.find('/') {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, ""),
    };

    if name.is_empty() {
        let home = dirs::home_dir()
            .ok_or(GlobError::Argument("could not determine home directory"))?;
        return Ok(Some(format!("{}{}", home.to_string_lossy(), remainder)));
    }

    // `~user` for a user other than the current one: unsupported, since the
    // portable home-directory crate this code uses has no user database
    // lookup. Flagged explicitly rather than silently matched literally.
    Err(GlobError::Argument(
        "~user (for a user other than the current one) is not supported",
    ))
}

/// Thin wrapper over the filesystem primitives the matcher facade and
/// walker need. A trait (rather than free functions) so tests can swap in a
/// fake for deterministic `REALPATH` behavior without touching disk.
pub trait FsAccess {
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn is_symlink(&self, path: &Path) -> bool;
    fn read_dir(&self, path: &Path) -> std::io::Result<Vec<std::fs::DirEntry>>;
}

/// The real, OS-backed filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFs;

impl FsAccess for RealFs {
    fn exists(&self, path: &Path) -> bool {
        path.symlink_metadata().is_ok()
    }

    fn is_dir(&self, path: &Path) -> bool {
        fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
    }

    fn is_symlink(&self, path: &Path) -> bool {
        fs::symlink_metadata(path)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false)
    }

    fn read_dir(&self, path: &Path) -> std::io::Result<Vec<std::fs::DirEntry>> {
        fs::read_dir(path)?.collect()
    }
}

/// Accepts a string, a byte path, or anything that can be converted via
/// `AsRef<Path>`, and returns the lossless string/bytes representation
/// needed to run a pattern against it. Mirrors the teacher's `fspath`
/// contract without depending on a path-like object wrapper (out of scope
/// per §1).
pub fn fspath<P: AsRef<Path>>(path: P) -> Cow<'static, str> {
    Cow::Owned(path.as_ref().to_string_lossy().into_owned())
}

pub fn root_dir(root: Option<&Path>) -> PathBuf {
    match root {
        Some(p) => p.to_path_buf(),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_posix_root() {
        assert_eq!(
            detect_root_prefix(Platform::Unix, "/foo/bar"),
            (RootPrefix::PosixRoot, 1)
        );
    }

    #[test]
    fn detects_windows_drive() {
        assert_eq!(
            detect_root_prefix(Platform::Windows, "C:/foo"),
            (RootPrefix::Drive('C'), 2)
        );
    }

    #[test]
    fn detects_unc_share() {
        let (prefix, len) = detect_root_prefix(Platform::Windows, "//server/share/foo");
        assert_eq!(
            prefix,
            RootPrefix::Unc {
                server: "server".to_string(),
                share: "share".to_string(),
            }
        );
        assert_eq!(&"//server/share/foo"[..len], "//server/share");
    }

    #[test]
    fn no_root_for_relative_path() {
        assert_eq!(
            detect_root_prefix(Platform::Unix, "foo/bar"),
            (RootPrefix::None, 0)
        );
    }

    #[test]
    fn tilde_user_unsupported() {
        assert!(expand_tilde("~otheruser/foo").is_err());
    }

    #[test]
    fn non_tilde_pattern_passes_through() {
        assert_eq!(expand_tilde("foo/bar").unwrap(), None);
    }
}
