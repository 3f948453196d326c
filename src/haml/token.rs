//! Token types produced by the haml scanner.
//!
//! Every token records its source position and the nesting depth of the
//! line it was produced on. The parser decides where a node belongs by
//! comparing the depth recorded on the node's first token against the
//! stack of currently open nodes, so depth is part of the token itself
//! rather than a side channel.

use serde::Serialize;

/// One lexed token with its source location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    /// 1-based source line.
    pub line: usize,
    /// 0-based byte column within the line.
    pub column: usize,
    /// Indentation-derived nesting depth of the source line.
    pub depth: usize,
}

/// The classification of a token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TokenKind {
    /// Logical line break. Runs of blank lines collapse into one.
    Newline,
    /// The `!!!` doctype introducer.
    Doctype,
    /// A doctype subtype keyword (`strict`, `frameset`, ...).
    HtmlType(String),
    /// An XML prolog request with its encoding (empty means default).
    XmlType(String),
    /// `%name`.
    TagName(String),
    /// `#name` shorthand.
    Id(String),
    /// `.name` shorthand.
    ClassName(String),
    /// Literal text content or a tag's trailing value.
    Value(String),
    /// Whitespace trim marker on a tag.
    Trim(Trim),
    /// A raw attribute-dict fragment, braces included.
    AttrDict(String),
    /// The marker introducing an evaluated script fragment.
    ScriptMarker(ScriptKind),
    /// An evaluated host-language expression fragment.
    Script(String),
    /// A host-language statement fragment introduced by `-`.
    SilentScript(String),
    /// `/` comment introducer.
    Comment,
    /// `/[...]` conditional comment with its condition text.
    CondComment(String),
    /// `/` self-close marker inside a tag head.
    SelfClose,
    /// Filter head carrying the filter name. The token's `depth` is the
    /// depth of the filter line itself; content lines must sit one level
    /// deeper.
    Filter(String),
    /// One raw content line belonging to a filter block.
    FilterLine(String),
}

impl TokenKind {
    /// Short description used in grammar error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Newline => "line break",
            TokenKind::Doctype => "doctype",
            TokenKind::HtmlType(_) => "doctype subtype",
            TokenKind::XmlType(_) => "xml doctype",
            TokenKind::TagName(_) => "tag name",
            TokenKind::Id(_) => "id shorthand",
            TokenKind::ClassName(_) => "class shorthand",
            TokenKind::Value(_) => "value",
            TokenKind::Trim(_) => "trim marker",
            TokenKind::AttrDict(_) => "attribute dict",
            TokenKind::ScriptMarker(_) => "script marker",
            TokenKind::Script(_) => "script fragment",
            TokenKind::SilentScript(_) => "silent script",
            TokenKind::Comment => "comment",
            TokenKind::CondComment(_) => "conditional comment",
            TokenKind::SelfClose => "self-close marker",
            TokenKind::Filter(_) => "filter",
            TokenKind::FilterLine(_) => "filter content",
        }
    }
}

/// Trim markers: `<` trims inside the tag, `>` trims around it, `<>` and
/// `><` trim both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trim {
    Inner,
    Outer,
    Both,
}

impl Trim {
    pub fn inner(self) -> bool {
        matches!(self, Trim::Inner | Trim::Both)
    }

    pub fn outer(self) -> bool {
        matches!(self, Trim::Outer | Trim::Both)
    }
}

/// The flavor of an evaluated script fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScriptKind {
    /// `=` — escaped or not according to the escape-by-default option.
    Plain,
    /// `&=` — always HTML-escaped.
    Escaped,
    /// `!=` — never escaped.
    Unescaped,
    /// `~` — like `=`, but newlines in the result are entity-encoded so
    /// preformatted content survives re-indentation.
    Preserve,
}
