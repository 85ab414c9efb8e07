//! The flag bitfield that controls every stage of the pipeline.

use bitflags::bitflags;

bitflags! {
    /// Options controlling pattern expansion, translation, and matching.
    ///
    /// Mirrors the flag set glob engines of this family (minimatch, wcmatch,
    /// globlin) expose as individual booleans, collapsed into one bitfield
    /// per the typed-reimplementation note in the design: callers compose
    /// flags with `|` instead of threading a dozen `Option<bool>` fields
    /// through every call.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MatchFlags: u32 {
        /// Force case-sensitive matching on all platforms.
        const CASE          = 1 << 0;
        /// Force case-insensitive matching.
        const IGNORECASE    = 1 << 1;
        /// Decode language-style string escapes inside patterns before expansion.
        const RAWCHARS      = 1 << 2;
        /// Patterns starting with the negate sigil become excludes.
        const NEGATE         = 1 << 3;
        /// A lone exclude implies "match everything not excluded".
        const NEGATEALL      = 1 << 4;
        /// Use `-` instead of `!` as the negate sigil.
        const MINUSNEGATE    = 1 << 5;
        /// Enable `**`.
        const GLOBSTAR       = 1 << 6;
        /// Enable `***` (traverses symlinks).
        const GLOBSTARLONG   = 1 << 7;
        /// Allow `**` to traverse symlink directories.
        const FOLLOW         = 1 << 8;
        /// Consult the filesystem during matching.
        const REALPATH       = 1 << 9;
        /// Wildcards may match leading dots.
        const DOTGLOB        = 1 << 10;
        /// Wildcards never match `.` or `..` even as exact segments.
        const NODOTDIR       = 1 << 11;
        /// Inject `.` and `..` during directory scanning.
        const SCANDOTDIR     = 1 << 12;
        /// Enable `?(...)`,`*(...)`,`+(...)`,`@(...)`,`!(...)`.
        const EXTGLOB        = 1 << 13;
        /// Enable `{a,b}` and `{n..m[..s]}`.
        const BRACE          = 1 << 14;
        /// Treat `|` at top level as a pattern separator.
        const SPLIT          = 1 << 15;
        /// Do not dedupe results or patterns.
        const NOUNIQUE       = 1 << 16;
        /// `~` and `~user` expand to home directories.
        const GLOBTILDE      = 1 << 17;
        /// Append separator to directory results from walks.
        const MARK           = 1 << 18;
        /// Basename-only matching when pattern has no separator.
        const MATCHBASE      = 1 << 19;
        /// Walks omit directories.
        const NODIR          = 1 << 20;
        /// Force windows path semantics.
        const FORCEWIN       = 1 << 21;
        /// Force unix path semantics.
        const FORCEUNIX      = 1 << 22;
    }
}

/// `DOTMATCH` is a documented alias for [`MatchFlags::DOTGLOB`]; `EXTMATCH`
/// is a documented alias for [`MatchFlags::EXTGLOB`]. Kept as constants
/// rather than bitflags variants so the underlying bit is shared, not
/// duplicated.
impl MatchFlags {
    pub const DOTMATCH: MatchFlags = MatchFlags::DOTGLOB;
    pub const EXTMATCH: MatchFlags = MatchFlags::EXTGLOB;

    /// Apply the documented precedence rules and return the effective flag
    /// set used by the rest of the pipeline.
    ///
    /// - `CASE` wins over `IGNORECASE` when both are set.
    /// - `REALPATH` forces platform detection to the host's real platform,
    ///   so it is left set here; callers consult [`Self::effective_platform`]
    ///   rather than `FORCEWIN`/`FORCEUNIX` directly once `REALPATH` is set.
    /// - `GLOBSTARLONG` implies `GLOBSTAR`.
    pub fn normalize(self) -> MatchFlags {
        let mut flags = self;
        if flags.contains(MatchFlags::CASE) && flags.contains(MatchFlags::IGNORECASE) {
            flags.remove(MatchFlags::IGNORECASE);
        }
        if flags.contains(MatchFlags::GLOBSTARLONG) {
            flags.insert(MatchFlags::GLOBSTAR);
        }
        flags
    }

    /// True if patterns should be matched case-insensitively, given
    /// explicit flags and the host platform's default policy.
    pub fn case_insensitive(self, platform: crate::platform::Platform) -> bool {
        if self.contains(MatchFlags::CASE) {
            return false;
        }
        if self.contains(MatchFlags::IGNORECASE) {
            return true;
        }
        platform.case_insensitive_by_default()
    }

    /// The sigil used to mark an exclude pattern when `NEGATE` is set.
    pub fn negate_sigil(self) -> char {
        if self.contains(MatchFlags::MINUSNEGATE) {
            '-'
        } else {
            '!'
        }
    }

    /// True when wildcards are allowed to match a leading dot.
    pub fn dotglob(self) -> bool {
        self.contains(MatchFlags::DOTGLOB)
    }

    /// Like [`Self::dotglob`], but resolved for one pattern's polarity:
    /// `NEGATE` implicitly enables dot-matching within exclude patterns only,
    /// so an exclude pattern sees `dotglob` as set even when the caller never
    /// passed `DOTGLOB` explicitly.
    pub fn dotglob_for(self, is_exclude: bool) -> bool {
        self.dotglob() || (is_exclude && self.contains(MatchFlags::NEGATE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;

    #[test]
    fn case_wins_over_ignorecase() {
        let flags = (MatchFlags::CASE | MatchFlags::IGNORECASE).normalize();
        assert!(flags.contains(MatchFlags::CASE));
        assert!(!flags.contains(MatchFlags::IGNORECASE));
    }

    #[test]
    fn globstarlong_implies_globstar() {
        let flags = MatchFlags::GLOBSTARLONG.normalize();
        assert!(flags.contains(MatchFlags::GLOBSTAR));
    }

    #[test]
    fn explicit_case_beats_platform_default() {
        let flags = MatchFlags::CASE;
        assert!(!flags.case_insensitive(Platform::Windows));
        let flags = MatchFlags::IGNORECASE;
        assert!(flags.case_insensitive(Platform::Unix));
    }

    #[test]
    fn negate_sigil_defaults_to_bang() {
        assert_eq!(MatchFlags::empty().negate_sigil(), '!');
        assert_eq!(MatchFlags::MINUSNEGATE.negate_sigil(), '-');
    }

    #[test]
    fn negate_enables_dotglob_for_excludes_only() {
        let flags = MatchFlags::NEGATE;
        assert!(flags.dotglob_for(true));
        assert!(!flags.dotglob_for(false));
    }

    #[test]
    fn dotglob_for_ignores_negate_when_not_set() {
        let flags = MatchFlags::empty();
        assert!(!flags.dotglob_for(true));
    }
}
