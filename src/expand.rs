//! Pre-expansion: raw-char decoding, brace expansion, `|`-splitting, tilde
//! expansion, and negate-sigil tagging. Runs once per raw pattern before the
//! lexer ever sees it (§4.2).

use crate::error::{GlobError, Result};
use crate::flags::MatchFlags;
use crate::platform::expand_tilde;

/// Default cross-product budget for brace/split expansion, matching the
/// spec's documented default (`limit`: 0 means unbounded).
pub const DEFAULT_LIMIT: usize = 1000;

/// One pattern after pre-expansion, tagged with its polarity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedPattern {
    pub text: String,
    pub is_exclude: bool,
}

/// A raw pattern as the caller supplied it: either a `String`, or the raw
/// bytes of a path that may not be valid UTF-8 (an arbitrary Unix path, for
/// instance). A batch must be entirely one variant or the other (§4.1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawPattern {
    Text(String),
    Bytes(Vec<u8>),
}

impl RawPattern {
    /// Lossily decode to text for the (entirely text-based) expansion,
    /// lexing, and translation pipeline. Invalid UTF-8 sequences become
    /// `U+FFFD`; exact byte-for-byte candidate matching against such
    /// sequences is out of scope for the regex-based engine this crate
    /// builds on (see DESIGN.md).
    fn as_text(&self) -> std::borrow::Cow<'_, str> {
        match self {
            RawPattern::Text(s) => std::borrow::Cow::Borrowed(s),
            RawPattern::Bytes(b) => String::from_utf8_lossy(b),
        }
    }
}

/// Expand a batch of raw patterns into a bounded list of concrete patterns.
///
/// `limit` of `0` means unbounded. De-duplication (byte-equal, case
/// sensitive) happens unless `NOUNIQUE` is set, as the very last step so
/// that limit-checking sees the same counts the caller would.
pub fn expand_all(
    raw_patterns: &[String],
    flags: MatchFlags,
    limit: usize,
) -> Result<Vec<ExpandedPattern>> {
    let mut out = Vec::new();
    let mut seen = std::collections::HashSet::new();
    let nounique = flags.contains(MatchFlags::NOUNIQUE);

    for raw in raw_patterns {
        for expanded in expand_one(raw, flags, limit)? {
            if nounique || seen.insert((expanded.text.clone(), expanded.is_exclude)) {
                out.push(expanded);
            }
        }
    }

    Ok(out)
}

/// Like [`expand_all`], but over [`RawPattern`]s so byte-string patterns are
/// accepted. Fails with [`GlobError::TypeMismatch`] if `raw_patterns` mixes
/// `Text` and `Bytes` variants within one call, per the invariant that a
/// batch is one type or the other.
pub fn expand_all_typed(
    raw_patterns: &[RawPattern],
    flags: MatchFlags,
    limit: usize,
) -> Result<Vec<ExpandedPattern>> {
    let mut variants = raw_patterns.iter().map(|p| matches!(p, RawPattern::Bytes(_)));
    if let Some(first) = variants.next() {
        if variants.any(|is_bytes| is_bytes != first) {
            return Err(GlobError::TypeMismatch);
        }
    }

    let texts: Vec<String> = raw_patterns.iter().map(|p| p.as_text().into_owned()).collect();
    expand_all(&texts, flags, limit)
}

fn expand_one(raw: &str, flags: MatchFlags, limit: usize) -> Result<Vec<ExpandedPattern>> {
    let decoded = if flags.contains(MatchFlags::RAWCHARS) {
        decode_raw_chars(raw)
    } else {
        raw.to_string()
    };

    let braced: Vec<String> = if flags.contains(MatchFlags::BRACE) {
        expand_braces(&decoded, limit)?
    } else {
        vec![decoded]
    };

    let mut split_patterns = Vec::new();
    if flags.contains(MatchFlags::SPLIT) {
        for pattern in braced {
            split_patterns.extend(split_on_pipe(&pattern));
        }
    } else {
        split_patterns = braced;
    }

    if limit != 0 && split_patterns.len() > limit {
        return Err(GlobError::PatternLimit {
            pattern: raw.to_string(),
            limit,
        });
    }

    let mut out = Vec::with_capacity(split_patterns.len());
    for pattern in split_patterns {
        let tilde_expanded = if flags.contains(MatchFlags::GLOBTILDE) {
            expand_tilde(&pattern)?.unwrap_or(pattern)
        } else {
            pattern
        };
        out.push(apply_negate_tagging(tilde_expanded, flags));
    }

    Ok(out)
}

/// Strip a leading negate sigil and mark the pattern as an exclude, unless
/// the pattern is actually an extglob negation group (`!(...)`) under the
/// combined `NEGATE+EXTGLOB` rule (§4.2 stage 5).
fn apply_negate_tagging(pattern: String, flags: MatchFlags) -> ExpandedPattern {
    if !flags.contains(MatchFlags::NEGATE) {
        return ExpandedPattern {
            text: pattern,
            is_exclude: false,
        };
    }

    let sigil = flags.negate_sigil();
    if flags.contains(MatchFlags::EXTGLOB) && pattern.starts_with(&format!("{sigil}(")) {
        return ExpandedPattern {
            text: pattern,
            is_exclude: false,
        };
    }

    if let Some(stripped) = pattern.strip_prefix(sigil) {
        ExpandedPattern {
            text: stripped.to_string(),
            is_exclude: true,
        }
    } else {
        ExpandedPattern {
            text: pattern,
            is_exclude: false,
        }
    }
}

/// Decode `\uXXXX`, `\xXX`, `\N{NAME}`, and the single-letter C escapes.
/// Undecodable sequences are left intact rather than raising an error,
/// matching §4.2 stage 1.
fn decode_raw_chars(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] != '\\' || i + 1 >= chars.len() {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        match chars[i + 1] {
            'a' => {
                out.push('\u{07}');
                i += 2;
            }
            'b' => {
                out.push('\u{08}');
                i += 2;
            }
            'f' => {
                out.push('\u{0C}');
                i += 2;
            }
            'n' => {
                out.push('\n');
                i += 2;
            }
            'r' => {
                out.push('\r');
                i += 2;
            }
            't' => {
                out.push('\t');
                i += 2;
            }
            'v' => {
                out.push('\u{0B}');
                i += 2;
            }
            'u' => match decode_hex_escape(&chars, i + 2, 4) {
                Some((ch, consumed)) => {
                    out.push(ch);
                    i += 2 + consumed;
                }
                None => {
                    out.push(chars[i]);
                    i += 1;
                }
            },
            'x' => match decode_hex_escape(&chars, i + 2, 2) {
                Some((ch, consumed)) => {
                    out.push(ch);
                    i += 2 + consumed;
                }
                None => {
                    out.push(chars[i]);
                    i += 1;
                }
            },
            'N' if chars.get(i + 2) == Some(&'{') => {
                if let Some(close) = chars[i + 3..].iter().position(|&c| c == '}') {
                    // Named Unicode escapes require a name database this
                    // crate does not carry; left intact, per stage 1's
                    // "undecodable sequences are left intact" rule.
                    out.extend(chars[i..i + 3 + close + 1].iter());
                    i += 3 + close + 1;
                } else {
                    out.push(chars[i]);
                    i += 1;
                }
            }
            _ => {
                out.push(chars[i]);
                i += 1;
            }
        }
    }
    out
}

fn decode_hex_escape(chars: &[char], start: usize, digits: usize) -> Option<(char, usize)> {
    if start + digits > chars.len() {
        return None;
    }
    let hex: String = chars[start..start + digits].iter().collect();
    let code = u32::from_str_radix(&hex, 16).ok()?;
    char::from_u32(code).map(|c| (c, digits))
}

/// Expand `{a,b}` and `{n..m[..step]}` braces, including nesting, honoring
/// `limit` as an early-abort budget (§4.2 stage 2). `{`/`}` inside `[...]`
/// or extended groups are handled by the caller never invoking this on
/// those spans — brace expansion runs over the whole pattern text before
/// the lexer exists, so this function itself must recognize `[...]` and
/// `(...)` spans as inert for brace purposes.
pub fn expand_braces(pattern: &str, limit: usize) -> Result<Vec<String>> {
    let mut budget = if limit == 0 { usize::MAX } else { limit };
    expand_braces_inner(pattern, &mut budget).ok_or_else(|| GlobError::PatternLimit {
        pattern: pattern.to_string(),
        limit,
    })
}

fn expand_braces_inner(pattern: &str, budget: &mut usize) -> Option<Vec<String>> {
    match find_top_level_brace(pattern) {
        None => {
            if *budget == 0 {
                return None;
            }
            *budget -= 1;
            Some(vec![pattern.to_string()])
        }
        Some((prefix, body, suffix)) => {
            let alternatives = expand_brace_body(&body)?;
            let mut results = Vec::new();
            for alt in alternatives {
                let expanded_suffix = expand_braces_inner(&suffix, budget)?;
                for tail in &expanded_suffix {
                    if *budget == 0 {
                        return None;
                    }
                    results.push(format!("{prefix}{alt}{tail}"));
                }
            }
            Some(results)
        }
    }
}

/// Split a numeric/alpha range `{n..m}` or `{n..m..step}`, or a comma list
/// `{a,b,c}`, into its literal alternatives.
fn expand_brace_body(body: &str) -> Option<Vec<String>> {
    if let Some(range) = expand_range(body) {
        return Some(range);
    }
    let parts = split_top_level_commas(body);
    if parts.len() < 2 {
        // A brace with no comma and no valid range is not an expansion;
        // treated as literal braces around its (possibly brace-containing)
        // body.
        return Some(vec![format!("{{{body}}}")]);
    }
    let mut out = Vec::new();
    for part in parts {
        out.extend(expand_braces_top(&part)?);
    }
    Some(out)
}

fn expand_braces_top(s: &str) -> Option<Vec<String>> {
    let mut budget = usize::MAX;
    expand_braces_inner(s, &mut budget)
}

fn expand_range(body: &str) -> Option<Vec<String>> {
    let segments: Vec<&str> = body.splitn(3, "..").collect();
    if segments.len() < 2 {
        return None;
    }
    let (lo, hi) = (segments[0], segments[1]);
    let step: i64 = if segments.len() == 3 {
        segments[2].parse().ok()?
    } else {
        1
    };
    if step == 0 {
        return None;
    }

    if let (Ok(lo_n), Ok(hi_n)) = (lo.parse::<i64>(), hi.parse::<i64>()) {
        let width = lo.trim_start_matches('-').len().max(hi.trim_start_matches('-').len());
        let padded = lo.trim_start_matches('-').starts_with('0') && lo.trim_start_matches('-').len() > 1
            || hi.trim_start_matches('-').starts_with('0') && hi.trim_start_matches('-').len() > 1;
        let mut out = Vec::new();
        let step = if hi_n < lo_n && step > 0 { -step } else { step };
        let mut n = lo_n;
        loop {
            let formatted = if padded {
                format!("{:0width$}", n.abs(), width = width)
            } else {
                n.abs().to_string()
            };
            out.push(if n < 0 {
                format!("-{formatted}")
            } else {
                formatted
            });
            if step > 0 && n >= hi_n {
                break;
            }
            if step < 0 && n <= hi_n {
                break;
            }
            n += step;
        }
        return Some(out);
    }

    if lo.chars().count() == 1 && hi.chars().count() == 1 {
        let (lo_c, hi_c) = (lo.chars().next()?, hi.chars().next()?);
        let lo_u = lo_c as i64;
        let hi_u = hi_c as i64;
        let step = if hi_u < lo_u && step > 0 { -step } else { step };
        let mut out = Vec::new();
        let mut n = lo_u;
        loop {
            out.push(char::from_u32(n as u32)?.to_string());
            if step > 0 && n >= hi_u {
                break;
            }
            if step < 0 && n <= hi_u {
                break;
            }
            n += step;
        }
        return Some(out);
    }

    None
}

/// Find the first top-level `{...}` span, skipping any nested inside
/// `[...]` (sequences) or `(...)` (extended groups), which are inert for
/// brace purposes per §4.2. Returns owned `(prefix, body, suffix)` pieces.
fn find_top_level_brace(pattern: &str) -> Option<(String, String, String)> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;
    let mut in_seq = false;
    let mut paren_depth = 0i32;
    while i < chars.len() {
        match chars[i] {
            '\\' if i + 1 < chars.len() => {
                i += 2;
                continue;
            }
            '[' if !in_seq => in_seq = true,
            ']' if in_seq => in_seq = false,
            '(' if !in_seq => paren_depth += 1,
            ')' if !in_seq => paren_depth -= 1,
            '{' if !in_seq && paren_depth == 0 => {
                let mut depth = 1;
                let mut j = i + 1;
                let mut inner_seq = false;
                while j < chars.len() && depth > 0 {
                    match chars[j] {
                        '\\' if j + 1 < chars.len() => j += 1,
                        '[' if !inner_seq => inner_seq = true,
                        ']' if inner_seq => inner_seq = false,
                        '{' if !inner_seq => depth += 1,
                        '}' if !inner_seq => depth -= 1,
                        _ => {}
                    }
                    j += 1;
                }
                if depth == 0 {
                    let prefix: String = chars[..i].iter().collect();
                    let body: String = chars[i + 1..j - 1].iter().collect();
                    let suffix: String = chars[j..].iter().collect();
                    return Some((prefix, body, suffix));
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn split_top_level_commas(body: &str) -> Vec<String> {
    let chars: Vec<char> = body.chars().collect();
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut in_seq = false;
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\\' if i + 1 < chars.len() => {
                current.push(chars[i]);
                current.push(chars[i + 1]);
                i += 2;
                continue;
            }
            '[' if !in_seq => {
                in_seq = true;
                current.push(chars[i]);
            }
            ']' if in_seq => {
                in_seq = false;
                current.push(chars[i]);
            }
            '{' if !in_seq => {
                depth += 1;
                current.push(chars[i]);
            }
            '}' if !in_seq => {
                depth -= 1;
                current.push(chars[i]);
            }
            ',' if depth == 0 && !in_seq => {
                parts.push(std::mem::take(&mut current));
            }
            _ => current.push(chars[i]),
        }
        i += 1;
    }
    parts.push(current);
    parts
}

fn split_on_pipe(pattern: &str) -> Vec<String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_seq = false;
    let mut ext_depth = 0i32;
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\\' if i + 1 < chars.len() => {
                current.push(chars[i + 1]);
                i += 2;
                continue;
            }
            '[' if !in_seq => {
                in_seq = true;
                current.push(chars[i]);
            }
            ']' if in_seq => {
                in_seq = false;
                current.push(chars[i]);
            }
            '(' if !in_seq => {
                ext_depth += 1;
                current.push(chars[i]);
            }
            ')' if !in_seq => {
                ext_depth -= 1;
                current.push(chars[i]);
            }
            '|' if !in_seq && ext_depth == 0 => {
                parts.push(std::mem::take(&mut current));
            }
            _ => current.push(chars[i]),
        }
        i += 1;
    }
    parts.push(current);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(p: &str, flags: MatchFlags) -> Vec<String> {
        expand_one(p, flags, 0)
            .unwrap()
            .into_iter()
            .map(|e| e.text)
            .collect()
    }

    #[test]
    fn brace_expands_comma_list() {
        let mut out = expand("a{b,c}", MatchFlags::BRACE);
        out.sort();
        assert_eq!(out, vec!["ab".to_string(), "ac".to_string()]);
    }

    #[test]
    fn brace_expands_numeric_range() {
        let out = expand("{1..3}", MatchFlags::BRACE);
        assert_eq!(out, vec!["1", "2", "3"]);
    }

    #[test]
    fn brace_expands_stepped_range() {
        let out = expand("{0..10..5}", MatchFlags::BRACE);
        assert_eq!(out, vec!["0", "5", "10"]);
    }

    #[test]
    fn brace_expands_alpha_range() {
        let out = expand("{a..c}", MatchFlags::BRACE);
        assert_eq!(out, vec!["a", "b", "c"]);
    }

    #[test]
    fn split_on_pipe_top_level_only() {
        let out = expand("a|b", MatchFlags::SPLIT);
        assert_eq!(out, vec!["a", "b"]);
    }

    #[test]
    fn split_ignores_escaped_pipe() {
        let out = expand("a\\|b", MatchFlags::SPLIT);
        assert_eq!(out, vec!["a|b"]);
    }

    #[test]
    fn negate_tagging_strips_sigil() {
        let expanded = expand_one("!foo", MatchFlags::NEGATE, 0).unwrap();
        assert_eq!(expanded[0].text, "foo");
        assert!(expanded[0].is_exclude);
    }

    #[test]
    fn negate_extglob_group_is_not_exclude() {
        let expanded =
            expand_one("!(foo)", MatchFlags::NEGATE | MatchFlags::EXTGLOB, 0).unwrap();
        assert_eq!(expanded[0].text, "!(foo)");
        assert!(!expanded[0].is_exclude);
    }

    #[test]
    fn minusnegate_uses_dash_sigil() {
        let expanded =
            expand_one("-foo", MatchFlags::NEGATE | MatchFlags::MINUSNEGATE, 0).unwrap();
        assert!(expanded[0].is_exclude);
        assert_eq!(expanded[0].text, "foo");
    }

    #[test]
    fn rawchars_decodes_escapes() {
        let out = decode_raw_chars("a\\tb\\u0041");
        assert_eq!(out, "a\tbA");
    }

    #[test]
    fn limit_exceeded_errors() {
        let err = expand_one("{a,b,c}", MatchFlags::BRACE, 2);
        assert!(err.is_err());
    }

    #[test]
    fn dedup_across_patterns_unless_nounique() {
        let result = expand_all(
            &["*.md".to_string(), "*.md".to_string()],
            MatchFlags::empty(),
            0,
        )
        .unwrap();
        assert_eq!(result.len(), 1);

        let result = expand_all(
            &["*.md".to_string(), "*.md".to_string()],
            MatchFlags::NOUNIQUE,
            0,
        )
        .unwrap();
        assert_eq!(result.len(), 2);
    }
}
