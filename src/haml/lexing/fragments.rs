//! Boundary scanning for embedded host-language fragments.
//!
//!     Attribute dicts and script values embed fragments of a host
//!     scripting language that the compiler passes through verbatim. The
//!     compiler never interprets a fragment; it only has to find where
//!     one ends. That still requires a real tokenizer, because string
//!     literals may contain brackets and (in their triple-quoted form)
//!     newlines that must not terminate the fragment.
//!
//!     A dict fragment starts at `{` and ends when brace depth returns to
//!     zero. A script fragment runs to the first newline outside any
//!     bracket pair, or to end of input; the newline itself is left for
//!     the caller.

use crate::haml::error::LexicalError;
use logos::Logos;

/// Tokens of the embedded-fragment scanner. Only boundaries matter:
/// brackets, string literals and newlines. Everything else is opaque.
#[derive(Logos, Debug, Clone, PartialEq)]
pub enum FragToken {
    #[token("{")]
    OpenBrace,
    #[token("}")]
    CloseBrace,
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token("[")]
    OpenBracket,
    #[token("]")]
    CloseBracket,
    /// Triple-quoted string; may span newlines.
    #[token("'''", lex_triple_single)]
    #[token("\"\"\"", lex_triple_double)]
    TripleString,
    /// Single-line string literal with backslash escapes.
    #[regex(r"'(?:[^'\\\n]|\\.)*'")]
    #[regex(r#""(?:[^"\\\n]|\\.)*""#)]
    Str,
    #[token("\n")]
    Newline,
    /// A run of characters none of the other rules care about.
    #[regex(r#"[^'"{}()\[\]\n]+"#)]
    Chunk,
}

fn lex_triple_single(lex: &mut logos::Lexer<FragToken>) -> bool {
    match lex.remainder().find("'''") {
        Some(i) => {
            lex.bump(i + 3);
            true
        }
        None => false,
    }
}

fn lex_triple_double(lex: &mut logos::Lexer<FragToken>) -> bool {
    match lex.remainder().find("\"\"\"") {
        Some(i) => {
            lex.bump(i + 3);
            true
        }
        None => false,
    }
}

/// A scanned fragment span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentScan {
    /// The fragment text to pass through to the evaluator.
    pub text: String,
    /// Bytes consumed from the input.
    pub consumed: usize,
    /// Newlines inside the consumed span.
    pub newlines: usize,
}

/// Scan a `{...}` attribute dict starting at `src` (which must begin with
/// the opening brace). Returns the fragment including both braces.
pub fn scan_dict(src: &str, line: usize, column: usize) -> Result<FragmentScan, LexicalError> {
    let mut lexer = FragToken::lexer(src);
    let mut depth = 0usize;

    while let Some(result) = lexer.next() {
        let token = result.map_err(|()| LexicalError::UnterminatedString { line, column })?;
        match token {
            FragToken::OpenBrace => depth += 1,
            FragToken::CloseBrace => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    let consumed = lexer.span().end;
                    let text = src[..consumed].to_string();
                    let newlines = text.matches('\n').count();
                    return Ok(FragmentScan {
                        text,
                        consumed,
                        newlines,
                    });
                }
            }
            _ => {}
        }
    }

    Err(LexicalError::UnterminatedDict { line, column })
}

/// Scan a script fragment: everything up to the first newline at bracket
/// depth zero, or end of input. The terminating newline is not consumed.
pub fn scan_script(src: &str, line: usize, column: usize) -> Result<FragmentScan, LexicalError> {
    let mut lexer = FragToken::lexer(src);
    let mut depth = 0usize;
    let mut consumed = src.len();

    while let Some(result) = lexer.next() {
        let token = result.map_err(|()| LexicalError::UnterminatedString { line, column })?;
        match token {
            FragToken::OpenBrace | FragToken::OpenParen | FragToken::OpenBracket => depth += 1,
            FragToken::CloseBrace | FragToken::CloseParen | FragToken::CloseBracket => {
                depth = depth.saturating_sub(1);
            }
            FragToken::Newline if depth == 0 => {
                consumed = lexer.span().start;
                break;
            }
            _ => {}
        }
    }

    let span = &src[..consumed];
    Ok(FragmentScan {
        text: span.trim().to_string(),
        consumed,
        newlines: span.matches('\n').count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dict_simple() {
        let scan = scan_dict("{'a':'b'} rest", 1, 0).unwrap();
        assert_eq!(scan.text, "{'a':'b'}");
        assert_eq!(scan.consumed, 9);
        assert_eq!(scan.newlines, 0);
    }

    #[test]
    fn test_dict_nested_braces() {
        let scan = scan_dict("{'a':{'b':'c'}} tail", 1, 0).unwrap();
        assert_eq!(scan.text, "{'a':{'b':'c'}}");
    }

    #[test]
    fn test_dict_brace_inside_string() {
        let scan = scan_dict("{'foo':'bar}'}", 1, 0).unwrap();
        assert_eq!(scan.text, "{'foo':'bar}'}");
        let scan = scan_dict("{'foo':'{bar'}", 1, 0).unwrap();
        assert_eq!(scan.text, "{'foo':'{bar'}");
    }

    #[test]
    fn test_dict_across_newlines() {
        let scan = scan_dict("{'a' : 'b',\n   'c':'d'} foo", 1, 0).unwrap();
        assert_eq!(scan.text, "{'a' : 'b',\n   'c':'d'}");
        assert_eq!(scan.newlines, 1);
    }

    #[test]
    fn test_dict_unterminated() {
        assert!(matches!(
            scan_dict("{'a':'b'", 3, 2),
            Err(LexicalError::UnterminatedDict { line: 3, column: 2 })
        ));
    }

    #[test]
    fn test_script_ends_at_newline() {
        let scan = scan_script(" 'foo'\n%p", 1, 0).unwrap();
        assert_eq!(scan.text, "'foo'");
        assert_eq!(&" 'foo'\n%p"[scan.consumed..], "\n%p");
    }

    #[test]
    fn test_script_runs_to_eof() {
        let scan = scan_script("  foo  ", 1, 0).unwrap();
        assert_eq!(scan.text, "foo");
        assert_eq!(scan.consumed, 7);
    }

    #[test]
    fn test_script_newline_inside_parens_continues() {
        let scan = scan_script("('multi'\n'line')\nnext", 1, 0).unwrap();
        assert_eq!(scan.text, "('multi'\n'line')");
        assert_eq!(scan.newlines, 1);
    }

    #[test]
    fn test_script_triple_quoted_string_spans_lines() {
        let scan = scan_script("'''foo\nbar'''\nnext", 1, 0).unwrap();
        assert_eq!(scan.text, "'''foo\nbar'''");
        assert_eq!(scan.newlines, 1);
    }

    #[test]
    fn test_script_escaped_quote() {
        let scan = scan_script(r"'foo\'s'", 1, 0).unwrap();
        assert_eq!(scan.text, r"'foo\'s'");
    }

    #[test]
    fn test_unterminated_triple_string() {
        assert!(matches!(
            scan_script("'''foo", 1, 0),
            Err(LexicalError::UnterminatedString { .. })
        ));
    }
}
