//! The typed AST a parsed pattern is lowered into, and the translator lowers
//! out of. See the Design Notes: this replaces the teacher's stringly-typed
//! `PatternPart`/regex mix with an explicit tagged-variant tree.

use smallvec::SmallVec;

/// Character sequences (`[...]`) are almost always a handful of chars or
/// ranges; inline storage avoids a heap allocation for the common case.
pub type SequenceItems = SmallVec<[SequenceItem; 8]>;

/// One of the closed set of POSIX character class names usable inside a
/// `[...]` sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PosixClass {
    Alnum,
    Alpha,
    Ascii,
    Blank,
    Cntrl,
    Digit,
    Graph,
    Lower,
    Print,
    Punct,
    Space,
    Upper,
    Word,
    Xdigit,
}

impl PosixClass {
    pub fn from_name(name: &str) -> Option<PosixClass> {
        Some(match name {
            "alnum" => PosixClass::Alnum,
            "alpha" => PosixClass::Alpha,
            "ascii" => PosixClass::Ascii,
            "blank" => PosixClass::Blank,
            "cntrl" => PosixClass::Cntrl,
            "digit" => PosixClass::Digit,
            "graph" => PosixClass::Graph,
            "lower" => PosixClass::Lower,
            "print" => PosixClass::Print,
            "punct" => PosixClass::Punct,
            "space" => PosixClass::Space,
            "upper" => PosixClass::Upper,
            "word" => PosixClass::Word,
            "xdigit" => PosixClass::Xdigit,
            _ => return None,
        })
    }
}

/// One member of a `[...]` sequence: either a single character, an
/// inclusive range, or a named POSIX class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceItem {
    Char(char),
    Range(char, char),
    Posix(PosixClass),
}

/// The kind of an extended-glob group, named after its sigil.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtGroupKind {
    /// `?(...)`: zero or one.
    ZeroOrOne,
    /// `*(...)`: zero or more.
    ZeroOrMore,
    /// `+(...)`: one or more.
    OneOrMore,
    /// `@(...)`: exactly one.
    ExactlyOne,
    /// `!(...)`: none of the alternatives (negative).
    None,
}

/// Whether a globstar token was spelled `**` or (with `GLOBSTARLONG`) `***`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlobstarKind {
    Normal,
    Long,
}

/// A single node of a parsed pattern's AST.
///
/// A full pattern is a `Vec<Node>` read left to right; `Separator` nodes
/// mark path-segment boundaries (the translator and walker both use them to
/// decide "segment start" for the hidden-dot rule).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A run of characters with no special meaning.
    Literal(String),
    /// `?`: exactly one non-separator character.
    AnyChar,
    /// `*`: zero or more non-separator characters.
    AnyRun,
    /// `[...]`: a character sequence, optionally negated.
    Sequence {
        negated: bool,
        items: SequenceItems,
    },
    /// An extended-glob group with its recursively-parsed alternatives.
    /// Each alternative is itself a sub-pattern (owned AST), not a callback.
    ExtGroup {
        kind: ExtGroupKind,
        alternatives: Vec<Vec<Node>>,
    },
    /// A path separator.
    Separator,
    /// `**` or `***`.
    Globstar(GlobstarKind),
    /// A literal drive letter or UNC-share prefix, consumed before the rest
    /// of the pattern is parsed; never contains magic characters.
    DriveOrUnc(String),
}

impl Node {
    pub fn is_separator(&self) -> bool {
        matches!(self, Node::Separator)
    }

    pub fn is_globstar(&self) -> bool {
        matches!(self, Node::Globstar(_))
    }
}

/// A fully parsed pattern: an optional root prefix plus the AST for the
/// remainder.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ast {
    pub nodes: Vec<Node>,
}

impl Ast {
    pub fn new(nodes: Vec<Node>) -> Self {
        Ast { nodes }
    }

    /// True if the pattern contains no path separator (relevant to
    /// `MATCHBASE`).
    pub fn has_separator(&self) -> bool {
        self.nodes.iter().any(Node::is_separator)
    }
}
