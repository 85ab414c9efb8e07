//! Stand-alone escaping and magic-detection helpers (§C7), usable without
//! compiling a full pattern.

use crate::flags::MatchFlags;

const MAGIC_CHARS_BASIC: &str = "*?[]\\";
const MAGIC_CHARS_EXTGLOB: &str = "*?[]\\!+@(){}";

/// Escape every glob-magic character in `text` so it matches itself
/// literally when embedded in a pattern. `unix` selects which characters are
/// considered magic on that platform (Windows does not treat `\` as an
/// escape-eligible character here, matching [`crate::lexer`]'s own
/// platform split).
pub fn escape(text: &str, unix: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        let is_magic = if unix {
            matches!(c, '-' | '!' | '*' | '?' | '(' | ')' | '[' | ']' | '|' | '{' | '}' | '\\')
        } else {
            matches!(c, '-' | '!' | '*' | '?' | '(' | ')' | '[' | ']' | '|' | '{' | '}')
        };
        if is_magic {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// True if `pattern` contains any character that the active `flags` would
/// treat as magic, i.e. whether compiling it could produce something other
/// than a literal-equality match.
pub fn is_magic(pattern: &str, flags: MatchFlags) -> bool {
    let magic_set = if flags.contains(MatchFlags::EXTGLOB) || flags.contains(MatchFlags::BRACE) {
        MAGIC_CHARS_EXTGLOB
    } else {
        MAGIC_CHARS_BASIC
    };

    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            chars.next();
            continue;
        }
        if magic_set.contains(c) {
            return true;
        }
        if flags.contains(MatchFlags::GLOBTILDE) && c == '~' {
            return true;
        }
    }
    false
}
