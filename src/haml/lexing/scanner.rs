//! The mode-stacked line scanner.
//!
//!     Scanning is line-oriented. Each logical line is classified by its
//!     leading character, which selects the lexing mode for the rest of
//!     the line: `%`/`#`/`.` enter tag mode, `!!!` doctype mode, `/`
//!     comment mode, `:` filter mode, `-` reads a statement fragment and
//!     `-#` opens a silent comment. Anything else is literal content.
//!
//!     The mode stack holds the current mode plus, after every line
//!     break, the indentation-measuring mode that computes the next
//!     line's depth before normal scanning resumes. Silent comments and
//!     filters swallow whole lines; the indentation tracker decides when
//!     their block ends.
//!
//!     All state lives in the `Lexer` value, constructed fresh for every
//!     compile. Carriage returns are dropped up front so CRLF input
//!     behaves exactly like LF input.

use crate::haml::error::LexicalError;
use crate::haml::lexing::fragments;
use crate::haml::lexing::indentation::IndentationTracker;
use crate::haml::token::{ScriptKind, Token, TokenKind, Trim};
use once_cell::sync::Lazy;
use regex::Regex;

static TAG_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^%[a-zA-Z][a-zA-Z0-9]*").unwrap());
static ID_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#[a-zA-Z][a-zA-Z0-9]*").unwrap());
static CLASS_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\.[a-zA-Z-][a-zA-Z0-9-]*").unwrap());
static COND_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^/\[[^\]\n]+\]").unwrap());
static HTML_SUBTYPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ +(strict|frameset|mobile|basic|transitional)").unwrap());
static XML_SUBTYPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ +XML( +[^\n]+)?").unwrap());

/// Characters that cannot start a literal value at the beginning of a
/// line; they all introduce some other construct.
const VALUE_EXCLUDED: &[char] = &[
    ':', '=', '&', '/', '#', '!', '.', '%', '\n', '\t', ' ', '-',
];

/// Characters that cannot start a trailing value in tag mode.
const TAG_VALUE_EXCLUDED: &[char] = &[
    '{', '}', '<', '>', '=', '&', '/', '#', '!', '.', '%', '\n', '\t', ' ', '-',
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Initial,
    Tag,
    Doctype,
    Comment,
    Multi,
    Silent,
    Filter,
    /// Transient mode measuring the indentation of a fresh line.
    Tabs,
}

/// The scanner. One instance per compile.
pub struct Lexer {
    src: String,
    pos: usize,
    line: usize,
    line_start: usize,
    modes: Vec<Mode>,
    indent: IndentationTracker,
    /// A token produced together with the previous one (a script
    /// fragment follows its marker immediately).
    pending: Option<Token>,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            src: source.replace('\r', ""),
            pos: 0,
            line: 1,
            line_start: 0,
            modes: vec![Mode::Initial],
            indent: IndentationTracker::new(),
            pending: None,
        }
    }

    /// Produce the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Result<Option<Token>, LexicalError> {
        loop {
            if let Some(tok) = self.pending.take() {
                return Ok(Some(tok));
            }
            if self.mode() == Mode::Tabs {
                self.measure_line()?;
                continue;
            }
            if self.pos >= self.src.len() {
                return Ok(None);
            }
            let produced = match self.mode() {
                Mode::Initial => self.lex_initial()?,
                Mode::Tag => self.lex_tag()?,
                Mode::Doctype => self.lex_doctype()?,
                Mode::Comment => self.lex_comment()?,
                Mode::Multi => self.lex_multi()?,
                Mode::Silent => {
                    self.lex_silent();
                    None
                }
                Mode::Filter => self.lex_filter()?,
                Mode::Tabs => unreachable!("handled above"),
            };
            if let Some(tok) = produced {
                return Ok(Some(tok));
            }
        }
    }

    fn mode(&self) -> Mode {
        *self.modes.last().expect("mode stack is never empty")
    }

    /// Replace the current mode.
    fn begin(&mut self, mode: Mode) {
        *self.modes.last_mut().expect("mode stack is never empty") = mode;
    }

    fn rest(&self) -> &str {
        &self.src[self.pos..]
    }

    fn rest_of_line(&self) -> &str {
        let rest = self.rest();
        match rest.find('\n') {
            Some(i) => &rest[..i],
            None => rest,
        }
    }

    fn column(&self) -> usize {
        self.pos - self.line_start
    }

    fn token_at(&self, kind: TokenKind, line: usize, column: usize) -> Token {
        Token {
            kind,
            line,
            column,
            depth: self.indent.depth(),
        }
    }

    /// Move past `n` bytes, keeping the line counter in sync.
    fn advance(&mut self, n: usize) {
        let (newlines, last_newline) = {
            let chunk = &self.src[self.pos..self.pos + n];
            (chunk.matches('\n').count(), chunk.rfind('\n'))
        };
        if let Some(i) = last_newline {
            self.line += newlines;
            self.line_start = self.pos + i + 1;
        }
        self.pos += n;
    }

    /// Consume a newline together with any blank lines that follow it,
    /// stopping after the last newline of the run.
    fn consume_line_break(&mut self) {
        debug_assert!(self.rest().starts_with('\n'));
        let bytes = self.src.as_bytes();
        let mut end = self.pos + 1;
        let mut scan = end;
        while scan < bytes.len() {
            match bytes[scan] {
                b'\n' => {
                    scan += 1;
                    end = scan;
                }
                b' ' | b'\t' => scan += 1,
                _ => break,
            }
        }
        self.advance(end - self.pos);
    }

    /// A line break in a token-producing mode: emit a Newline token and
    /// queue indentation measuring for the next line.
    fn lex_line_break(&mut self) -> Token {
        let tok = self.token_at(TokenKind::Newline, self.line, self.column());
        self.consume_line_break();
        self.begin(Mode::Initial);
        self.modes.push(Mode::Tabs);
        tok
    }

    /// Measure the indentation of a fresh line and leave Tabs mode.
    fn measure_line(&mut self) -> Result<(), LexicalError> {
        self.modes.pop();
        if self.pos >= self.src.len() {
            return Ok(());
        }
        let run_len = self
            .rest()
            .bytes()
            .take_while(|b| *b == b' ' || *b == b'\t')
            .count();
        if run_len == 0 {
            if self.indent.measure_unindented().block_ended {
                self.begin(Mode::Initial);
            }
        } else {
            let run = self.src[self.pos..self.pos + run_len].to_string();
            let m = self.indent.measure(&run, self.line)?;
            if m.block_ended {
                self.begin(Mode::Initial);
            }
            self.advance(m.consumed);
        }
        Ok(())
    }

    fn lex_initial(&mut self) -> Result<Option<Token>, LexicalError> {
        let line = self.line;
        let column = self.column();
        let c = self.rest().chars().next().expect("caller checked EOF");

        if c == '\n' {
            return Ok(Some(self.lex_line_break()));
        }
        if self.rest().starts_with("-#") {
            // Silent comment: drop the line and swallow the indented
            // block below it.
            let n = self.rest_of_line().len();
            self.advance(n);
            self.indent.set_block(self.indent.depth() + 1);
            self.begin(Mode::Silent);
            return Ok(None);
        }
        if c == '-' {
            self.advance(1);
            let scan = fragments::scan_script(self.rest(), line, column)?;
            self.advance(scan.consumed);
            return Ok(Some(self.token_at(
                TokenKind::SilentScript(scan.text),
                line,
                column,
            )));
        }
        if self.rest().starts_with("!!!") {
            self.advance(3);
            self.begin(Mode::Doctype);
            return Ok(Some(self.token_at(TokenKind::Doctype, line, column)));
        }
        if let Some((kind, len)) = script_marker(self.rest()) {
            return self.lex_script(kind, len, line, column).map(Some);
        }
        match c {
            '%' => {
                let end = match TAG_NAME.find(self.rest()) {
                    Some(m) => m.end(),
                    None => return Err(self.unexpected(c, line, column)),
                };
                let name = self.rest()[1..end].to_string();
                self.advance(end);
                self.begin(Mode::Tag);
                Ok(Some(self.token_at(TokenKind::TagName(name), line, column)))
            }
            '#' => {
                let tok = self.lex_id(line, column)?;
                self.begin(Mode::Tag);
                Ok(Some(tok))
            }
            '.' => {
                let tok = self.lex_class(line, column)?;
                self.begin(Mode::Tag);
                Ok(Some(tok))
            }
            '/' => {
                if let Some(end) = COND_COMMENT.find(self.rest()).map(|m| m.end()) {
                    let condition = self.rest()[2..end - 1].to_string();
                    self.advance(end);
                    self.begin(Mode::Comment);
                    Ok(Some(self.token_at(
                        TokenKind::CondComment(condition),
                        line,
                        column,
                    )))
                } else {
                    self.advance(1);
                    self.begin(Mode::Comment);
                    Ok(Some(self.token_at(TokenKind::Comment, line, column)))
                }
            }
            ':' => {
                let raw = self.rest_of_line();
                if raw.len() < 2 {
                    return Err(self.unexpected(c, line, column));
                }
                let name = raw[1..].to_string();
                let n = raw.len();
                self.advance(n);
                self.indent.set_block(self.indent.depth() + 1);
                self.begin(Mode::Filter);
                Ok(Some(self.token_at(TokenKind::Filter(name), line, column)))
            }
            _ if VALUE_EXCLUDED.contains(&c) => Err(self.unexpected(c, line, column)),
            _ => self.lex_value(line, column).map(Some),
        }
    }

    fn lex_tag(&mut self) -> Result<Option<Token>, LexicalError> {
        let line = self.line;
        let column = self.column();
        let c = self.rest().chars().next().expect("caller checked EOF");

        match c {
            '\n' => return Ok(Some(self.lex_line_break())),
            '#' => return self.lex_id(line, column).map(Some),
            '.' => return self.lex_class(line, column).map(Some),
            '{' => return self.lex_dict(line, column).map(Some),
            '<' | '>' => {
                let trim = if self.rest().starts_with("<>") || self.rest().starts_with("><") {
                    self.advance(2);
                    Trim::Both
                } else if c == '<' {
                    self.advance(1);
                    Trim::Inner
                } else {
                    self.advance(1);
                    Trim::Outer
                };
                return Ok(Some(self.token_at(TokenKind::Trim(trim), line, column)));
            }
            '/' => {
                self.advance(1);
                return Ok(Some(self.token_at(TokenKind::SelfClose, line, column)));
            }
            _ => {}
        }
        if let Some((kind, len)) = script_marker(self.rest()) {
            return self.lex_script(kind, len, line, column).map(Some);
        }

        // The space-tolerant forms: an attribute dict, a script marker
        // or a trailing value may sit after horizontal whitespace.
        let ws = self
            .rest()
            .bytes()
            .take_while(|b| *b == b' ' || *b == b'\t')
            .count();
        let after = &self.rest()[ws..];
        if after.starts_with('{') {
            self.advance(ws);
            return self.lex_dict(line, column).map(Some);
        }
        if let Some((kind, len)) = script_marker(after) {
            self.advance(ws);
            return self.lex_script(kind, len, line, column).map(Some);
        }
        match after.chars().next() {
            Some(vc) if !TAG_VALUE_EXCLUDED.contains(&vc) => self.lex_value(line, column).map(Some),
            Some(vc) => Err(self.unexpected(vc, line, column)),
            None => {
                // Trailing whitespace before end of input.
                self.advance(ws);
                Ok(None)
            }
        }
    }

    fn lex_doctype(&mut self) -> Result<Option<Token>, LexicalError> {
        let line = self.line;
        let column = self.column();
        let c = self.rest().chars().next().expect("caller checked EOF");

        if c == '\n' {
            return Ok(Some(self.lex_line_break()));
        }
        if let Some(end) = XML_SUBTYPE.find(self.rest()).map(|m| m.end()) {
            let encoding = self.rest()[..end]
                .trim_start()
                .strip_prefix("XML")
                .expect("matched the XML pattern")
                .trim()
                .to_string();
            self.advance(end);
            return Ok(Some(self.token_at(
                TokenKind::XmlType(encoding),
                line,
                column,
            )));
        }
        if let Some(end) = HTML_SUBTYPE.find(self.rest()).map(|m| m.end()) {
            let subtype = self.rest()[..end].trim().to_string();
            self.advance(end);
            return Ok(Some(self.token_at(
                TokenKind::HtmlType(subtype),
                line,
                column,
            )));
        }
        Err(self.unexpected(c, line, column))
    }

    fn lex_comment(&mut self) -> Result<Option<Token>, LexicalError> {
        let line = self.line;
        let column = self.column();
        if self.rest().starts_with('\n') {
            return Ok(Some(self.lex_line_break()));
        }
        let raw = self.rest_of_line();
        let value = raw.trim().to_string();
        let n = raw.len();
        self.advance(n);
        Ok(Some(self.token_at(TokenKind::Value(value), line, column)))
    }

    fn lex_multi(&mut self) -> Result<Option<Token>, LexicalError> {
        if self.rest().starts_with('\n') {
            self.consume_line_break();
            return Ok(None);
        }
        let line = self.line;
        let column = self.column();
        let raw = self.rest_of_line();
        let trimmed = raw.trim();
        if trimmed.ends_with(" |") || trimmed.ends_with("\t|") {
            let value = trimmed[..trimmed.len() - 1].trim_end().to_string();
            let n = raw.len();
            self.advance(n);
            Ok(Some(self.token_at(TokenKind::Value(value), line, column)))
        } else {
            // First line without the continuation marker: leave it in
            // place and re-lex it as a fresh line.
            let tok = self.token_at(TokenKind::Newline, line, column);
            self.begin(Mode::Initial);
            self.modes.push(Mode::Tabs);
            Ok(Some(tok))
        }
    }

    fn lex_silent(&mut self) {
        if self.rest().starts_with('\n') {
            self.consume_line_break();
            self.modes.push(Mode::Tabs);
        } else {
            let n = self.rest_of_line().len();
            self.advance(n);
        }
    }

    fn lex_filter(&mut self) -> Result<Option<Token>, LexicalError> {
        if self.rest().starts_with('\n') {
            self.consume_line_break();
            self.modes.push(Mode::Tabs);
            return Ok(None);
        }
        let line = self.line;
        let column = self.column();
        let raw = self.rest_of_line().to_string();
        self.advance(raw.len());
        Ok(Some(self.token_at(TokenKind::FilterLine(raw), line, column)))
    }

    fn lex_id(&mut self, line: usize, column: usize) -> Result<Token, LexicalError> {
        let end = match ID_NAME.find(self.rest()) {
            Some(m) => m.end(),
            None => return Err(self.unexpected('#', line, column)),
        };
        let name = self.rest()[1..end].to_string();
        self.advance(end);
        Ok(self.token_at(TokenKind::Id(name), line, column))
    }

    fn lex_class(&mut self, line: usize, column: usize) -> Result<Token, LexicalError> {
        let end = match CLASS_NAME.find(self.rest()) {
            Some(m) => m.end(),
            None => return Err(self.unexpected('.', line, column)),
        };
        let name = self.rest()[1..end].to_string();
        self.advance(end);
        Ok(self.token_at(TokenKind::ClassName(name), line, column))
    }

    fn lex_dict(&mut self, line: usize, column: usize) -> Result<Token, LexicalError> {
        let scan = fragments::scan_dict(self.rest(), self.line, self.column())?;
        self.advance(scan.consumed);
        Ok(self.token_at(TokenKind::AttrDict(scan.text), line, column))
    }

    fn lex_script(
        &mut self,
        kind: ScriptKind,
        marker_len: usize,
        line: usize,
        column: usize,
    ) -> Result<Token, LexicalError> {
        self.advance(marker_len);
        let frag_line = self.line;
        let frag_column = self.column();
        let scan = fragments::scan_script(self.rest(), frag_line, frag_column)?;
        self.advance(scan.consumed);
        self.pending = Some(self.token_at(TokenKind::Script(scan.text), frag_line, frag_column));
        Ok(self.token_at(TokenKind::ScriptMarker(kind), line, column))
    }

    /// A literal value running to the end of the line. A leading `\`
    /// escapes a marker character; a trailing ` |` switches to
    /// multiline-continuation mode.
    fn lex_value(&mut self, line: usize, column: usize) -> Result<Token, LexicalError> {
        let raw = self.rest_of_line();
        let n = raw.len();
        let mut value = raw.trim().to_string();
        self.advance(n);
        if let Some(stripped) = value.strip_prefix('\\') {
            value = stripped.to_string();
        }
        if value.ends_with(" |") || value.ends_with("\t|") {
            value = value[..value.len() - 1].trim_end().to_string();
            self.begin(Mode::Multi);
        }
        Ok(self.token_at(TokenKind::Value(value), line, column))
    }

    fn unexpected(&self, found: char, line: usize, column: usize) -> LexicalError {
        LexicalError::UnexpectedCharacter {
            found,
            line,
            column,
        }
    }
}

/// Recognize a script marker at the start of `rest`.
fn script_marker(rest: &str) -> Option<(ScriptKind, usize)> {
    if rest.starts_with("&=") {
        Some((ScriptKind::Escaped, 2))
    } else if rest.starts_with("!=") {
        Some((ScriptKind::Unescaped, 2))
    } else if rest.starts_with('~') {
        Some((ScriptKind::Preserve, 1))
    } else if rest.starts_with('=') {
        Some((ScriptKind::Plain, 1))
    } else {
        None
    }
}

/// Scan a whole source into a token vector.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexicalError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    while let Some(tok) = lexer.next_token()? {
        tokens.push(tok);
    }
    Ok(tokens)
}
