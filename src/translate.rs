//! Lowers a parsed [`crate::ast::Ast`] into `fancy_regex` source text (§4.4).
//!
//! One regex is produced per concrete pattern; the matcher facade is
//! responsible for combining includes/excludes and compiling the result.

use crate::ast::{Ast, ExtGroupKind, GlobstarKind, Node, PosixClass, SequenceItem};
use crate::flags::MatchFlags;
use crate::platform::Platform;

/// The separator character class used inside the generated regex. On
/// Windows both `/` and `\` are accepted in the *candidate path* being
/// matched, regardless of how the pattern itself was written (§4.4); on
/// Unix only `/` is a separator.
fn separator_class(platform: Platform) -> &'static str {
    match platform {
        Platform::Unix => "/",
        Platform::Windows => "/\\\\",
    }
}

/// Translate an [`Ast`] into an anchored `fancy_regex` pattern string that
/// matches a whole candidate path.
///
/// `is_exclude` selects the polarity `dotglob` is resolved under: `NEGATE`
/// implicitly enables dot-matching within exclude patterns only (spec
/// invariant), so the same AST can translate to a stricter include regex and
/// a looser exclude regex depending on which pattern it came from.
pub fn translate(ast: &Ast, platform: Platform, flags: MatchFlags, is_exclude: bool) -> String {
    let sep_class = separator_class(platform);
    let dotglob = flags.dotglob_for(is_exclude);
    let nodotdir = flags.contains(MatchFlags::NODOTDIR);
    let mut body = String::new();
    emit_nodes(&ast.nodes, sep_class, dotglob, nodotdir, &mut body);

    let mut out = String::with_capacity(body.len() + 8);
    if flags.case_insensitive(platform) {
        out.push_str("(?si)^");
    } else {
        out.push_str("(?s)^");
    }
    out.push_str(&body);
    out.push('$');
    out
}

/// Translate a batch of already-expanded, polarity-tagged patterns into their
/// regex source text, split by polarity: `(includes, excludes)`. This is the
/// batch-level counterpart to [`translate`], which operates on one AST at a
/// time; callers that only need per-pattern regex source (e.g. diagnostics,
/// or embedding the regex in another tool) can use this instead of going
/// through [`crate::matcher::Matcher`].
pub fn translate_batch(
    patterns: &[(Ast, bool)],
    platform: Platform,
    flags: MatchFlags,
) -> (Vec<String>, Vec<String>) {
    let mut includes = Vec::new();
    let mut excludes = Vec::new();
    for (ast, is_exclude) in patterns {
        let regex = translate(ast, platform, flags, *is_exclude);
        if *is_exclude {
            excludes.push(regex);
        } else {
            includes.push(regex);
        }
    }
    (includes, excludes)
}

/// Wrap a translated include pattern's regex source in the exclude-pattern
/// negative-lookahead idiom the project uses to reject matches instead of
/// hand-rolling set difference (§4.4, requires look-around hence
/// `fancy_regex` over the plain `regex` crate).
pub fn wrap_exclude(body_regex: &str) -> String {
    // body_regex already begins with "(?...)^" and ends with "$"; splice the
    // negative lookahead in right after the anchor so the whole candidate
    // still has to match end-to-end for the lookahead to apply.
    if let Some(caret) = body_regex.find('^') {
        let (prefix, rest) = body_regex.split_at(caret + 1);
        let without_dollar = rest.strip_suffix('$').unwrap_or(rest);
        format!("{prefix}(?!{without_dollar}$).*$")
    } else {
        format!("^(?!{body_regex}).*$")
    }
}

fn emit_nodes(nodes: &[Node], sep_class: &str, dotglob: bool, nodotdir: bool, out: &mut String) {
    let mut segment_start = true;
    let mut i = 0;
    while i < nodes.len() {
        // A globstar immediately followed by a separator forms one optional
        // unit: "**/" can also match zero path segments, so the separator
        // it introduces must be optional too, not just the globstar's own
        // content. Without this, "**/*.md" would require at least one "/"
        // and miss top-level matches.
        if nodes[i].is_globstar() && nodes.get(i + 1).map(Node::is_separator).unwrap_or(false) {
            out.push_str(&globstar_body_with_sep(sep_class, dotglob, nodotdir));
            i += 2;
            segment_start = true;
            continue;
        }
        emit_node(&nodes[i], sep_class, dotglob, nodotdir, segment_start, out);
        segment_start = nodes[i].is_separator();
        i += 1;
    }
}

fn emit_node(
    node: &Node,
    sep_class: &str,
    dotglob: bool,
    nodotdir: bool,
    at_segment_start: bool,
    out: &mut String,
) {
    match node {
        Node::Literal(s) => {
            for c in s.chars() {
                out.push_str(&fancy_regex_escape_char(c));
            }
        }
        Node::Separator => {
            out.push_str(&format!("[{sep_class}]"));
        }
        Node::DriveOrUnc(s) => {
            for c in s.chars() {
                out.push_str(&fancy_regex_escape_char(c));
            }
        }
        Node::AnyChar => {
            out.push_str(&non_separator_class(sep_class, dotglob, at_segment_start, false));
        }
        Node::AnyRun => {
            if nodotdir && at_segment_start {
                out.push_str(&dotdir_guard(sep_class));
            }
            out.push_str(&non_separator_class(sep_class, dotglob, at_segment_start, false));
            out.push('*');
        }
        Node::Globstar(kind) => {
            // `**` matches zero or more whole segments, including the
            // separators between them; `***` (GlobstarKind::Long) is
            // semantically identical in the regex (the symlink-following
            // distinction belongs to the walker, not the matcher).
            let _ = kind;
            out.push_str(&globstar_body(sep_class, dotglob, nodotdir));
        }
        Node::Sequence { negated, items } => {
            emit_sequence(*negated, items, sep_class, out);
        }
        Node::ExtGroup { kind, alternatives } => {
            emit_ext_group(
                *kind,
                alternatives,
                sep_class,
                dotglob,
                nodotdir,
                at_segment_start,
                out,
            );
        }
    }
}

/// `NODOTDIR`: forbid a magic, segment-matching token (`*`, `**`) from
/// producing exactly `.` or `..` as the whole segment it starts. Scoped to
/// `AnyRun`/`Globstar` rather than every magic construct, since those are
/// the tokens that can actually span a bare dot-segment on their own.
fn dotdir_guard(sep_class: &str) -> String {
    format!("(?!\\.\\.?(?:[{sep_class}]|$))")
}

/// The character class matching "one non-separator character", optionally
/// excluding a leading dot at the start of a path segment (hidden-file
/// semantics, §4.1) unless `DOTGLOB` is set.
fn non_separator_class(sep_class: &str, dotglob: bool, at_segment_start: bool, _in_ext: bool) -> String {
    if at_segment_start && !dotglob {
        format!("(?!\\.)[^{sep_class}]")
    } else {
        format!("[^{sep_class}]")
    }
}

/// One whole path segment as a globstar may produce it: a run of
/// non-separator characters, rejecting a leading dot unless `DOTGLOB` is set
/// (§4.1/§4.6.2 — the hidden-file rule applies to *every* segment a globstar
/// spans, not just its first or last).
fn globstar_segment(sep_class: &str, dotglob: bool) -> String {
    if dotglob {
        format!("[^{sep_class}]*")
    } else {
        format!("(?!\\.)[^{sep_class}]*")
    }
}

/// `**` not immediately followed by a separator: zero or more whole
/// segments joined by separators, each one individually subject to the
/// hidden-dot rule.
fn globstar_body(sep_class: &str, dotglob: bool, nodotdir: bool) -> String {
    let seg = globstar_segment(sep_class, dotglob);
    let guard = if nodotdir { dotdir_guard(sep_class) } else { String::new() };
    format!("(?:{guard}{seg}(?:[{sep_class}]{guard}{seg})*)?")
}

/// `**/`: the separator the globstar introduces is part of each repeated
/// segment rather than trailing the whole group, since `**/` alone must
/// still be able to match zero segments.
fn globstar_body_with_sep(sep_class: &str, dotglob: bool, nodotdir: bool) -> String {
    let seg = globstar_segment(sep_class, dotglob);
    let guard = if nodotdir { dotdir_guard(sep_class) } else { String::new() };
    format!("(?:{guard}{seg}[{sep_class}])*")
}

fn emit_sequence(negated: bool, items: &[SequenceItem], _sep_class: &str, out: &mut String) {
    out.push('[');
    if negated {
        out.push('^');
    }
    for item in items {
        match item {
            SequenceItem::Char(c) => out.push_str(&class_escape_char(*c)),
            SequenceItem::Range(lo, hi) => {
                out.push_str(&class_escape_char(*lo));
                out.push('-');
                out.push_str(&class_escape_char(*hi));
            }
            SequenceItem::Posix(class) => out.push_str(posix_class_regex(*class)),
        }
    }
    out.push(']');
}

fn posix_class_regex(class: PosixClass) -> &'static str {
    match class {
        PosixClass::Alnum => "a-zA-Z0-9",
        PosixClass::Alpha => "a-zA-Z",
        PosixClass::Ascii => "\\x00-\\x7F",
        PosixClass::Blank => " \\t",
        PosixClass::Cntrl => "\\x00-\\x1F\\x7F",
        PosixClass::Digit => "0-9",
        PosixClass::Graph => "\\x21-\\x7E",
        PosixClass::Lower => "a-z",
        PosixClass::Print => "\\x20-\\x7E",
        PosixClass::Punct => "!-/:-@\\[-`{-~",
        PosixClass::Space => " \\t\\r\\n\\v\\f",
        PosixClass::Upper => "A-Z",
        PosixClass::Word => "a-zA-Z0-9_",
        PosixClass::Xdigit => "0-9a-fA-F",
    }
}

fn emit_ext_group(
    kind: ExtGroupKind,
    alternatives: &[Vec<Node>],
    sep_class: &str,
    dotglob: bool,
    nodotdir: bool,
    at_segment_start: bool,
    out: &mut String,
) {
    let mut alt_bodies = Vec::with_capacity(alternatives.len());
    for alt in alternatives {
        let mut buf = String::new();
        emit_nodes_at(alt, sep_class, dotglob, nodotdir, at_segment_start, &mut buf);
        alt_bodies.push(buf);
    }
    let joined = alt_bodies.join("|");

    match kind {
        // Every positive form is a capturing group so callers that run the
        // translated regex directly (rather than going through `Matcher`)
        // can introspect which alternative matched and what it consumed
        // (§4.4, exercised by the `@(file)+([[:digit:]])@(.*)` scenario).
        ExtGroupKind::ZeroOrOne => {
            out.push('(');
            out.push_str(&joined);
            out.push_str(")?");
        }
        ExtGroupKind::ZeroOrMore => {
            // The `*` has to sit *inside* the capturing group, not outside
            // it, or only the group's last repetition would be captured
            // instead of the whole repeated span.
            out.push_str("((?:");
            out.push_str(&joined);
            out.push_str(")*)");
        }
        ExtGroupKind::OneOrMore => {
            out.push_str("((?:");
            out.push_str(&joined);
            out.push_str(")+)");
        }
        ExtGroupKind::ExactlyOne => {
            out.push('(');
            out.push_str(&joined);
            out.push(')');
        }
        ExtGroupKind::None => {
            // Negative match: none of the alternatives may match at this
            // position, but *something* non-separator-ish still has to be
            // consumed. Lookahead requires fancy_regex.
            out.push_str("(?:(?!");
            out.push_str(&joined);
            out.push(')');
            out.push_str(&non_separator_class(sep_class, dotglob, at_segment_start, true));
            out.push_str("*)");
        }
    }
}

fn emit_nodes_at(
    nodes: &[Node],
    sep_class: &str,
    dotglob: bool,
    nodotdir: bool,
    mut at_segment_start: bool,
    out: &mut String,
) {
    let mut i = 0;
    while i < nodes.len() {
        if nodes[i].is_globstar() && nodes.get(i + 1).map(Node::is_separator).unwrap_or(false) {
            out.push_str(&globstar_body_with_sep(sep_class, dotglob, nodotdir));
            i += 2;
            at_segment_start = true;
            continue;
        }
        emit_node(&nodes[i], sep_class, dotglob, nodotdir, at_segment_start, out);
        at_segment_start = nodes[i].is_separator();
        i += 1;
    }
}

/// Escape a literal character for use outside a character class.
fn fancy_regex_escape_char(c: char) -> String {
    if "\\^$.|?*+()[]{}".contains(c) {
        format!("\\{c}")
    } else {
        c.to_string()
    }
}

/// Escape a literal character for use inside a `[...]` character class.
fn class_escape_char(c: char) -> String {
    if "\\^]-".contains(c) {
        format!("\\{c}")
    } else {
        c.to_string()
    }
}
