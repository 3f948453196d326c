//! Error types for haml compilation and rendering
//!
//! The taxonomy mirrors the compile pipeline: lexical errors come from the
//! scanner, grammar errors from the token-stream reducer, semantic errors
//! from node construction and the open/close protocol, and evaluation
//! errors are surfaced unchanged from the expression evaluator at render
//! time. Compilation aborts on the first error; there is no recovery or
//! partial-result mode.

use std::fmt;

/// Failures detected while scanning source text into tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexicalError {
    /// An indentation run mixes spaces and tabs, or uses a different
    /// character than the one the compile started with.
    MixedIndentation { line: usize },
    /// An indentation run is not a whole multiple of the detected unit,
    /// or jumps more than one level deeper than the previous line.
    InvalidIndentation { line: usize },
    /// An attribute dict opened with `{` never reaches brace depth zero.
    UnterminatedDict { line: usize, column: usize },
    /// A string literal inside an embedded fragment never closes.
    UnterminatedString { line: usize, column: usize },
    /// A character that no lexing rule accepts at this position.
    UnexpectedCharacter { found: char, line: usize, column: usize },
}

impl fmt::Display for LexicalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexicalError::MixedIndentation { line } => {
                write!(f, "mixed indentation on line {}", line)
            }
            LexicalError::InvalidIndentation { line } => {
                write!(f, "invalid indentation on line {}", line)
            }
            LexicalError::UnterminatedDict { line, column } => {
                write!(
                    f,
                    "unterminated attribute dict starting at {}:{}",
                    line, column
                )
            }
            LexicalError::UnterminatedString { line, column } => {
                write!(f, "unterminated string literal at {}:{}", line, column)
            }
            LexicalError::UnexpectedCharacter {
                found,
                line,
                column,
            } => {
                write!(f, "unexpected character {:?} at {}:{}", found, line, column)
            }
        }
    }
}

impl std::error::Error for LexicalError {}

/// A token arrived where the grammar does not accept it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarError {
    /// Human-readable description of the offending token.
    pub found: String,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unexpected {} at {}:{}",
            self.found, self.line, self.column
        )
    }
}

impl std::error::Error for GrammarError {}

/// A structurally valid construct that violates a document rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticError {
    /// Content nested under a node that forbids children.
    IllegalNesting { line: usize },
    /// A self-closed tag was also given inline content.
    SelfCloseWithValue { line: usize },
    /// A filter name with no registered filter.
    UnknownFilter { name: String, line: usize },
    /// No doctype string exists for this format/subtype combination.
    UnknownDoctype { subtype: String, line: usize },
    /// A bare statement while evaluation is suppressed; unlike
    /// expressions and attribute dicts it has no inert substitute.
    EvalSuppressed { line: usize },
}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticError::IllegalNesting { line } => {
                write!(f, "illegal nesting on line {}", line)
            }
            SemanticError::SelfCloseWithValue { line } => {
                write!(f, "self-closing tags cannot have content (line {})", line)
            }
            SemanticError::UnknownFilter { name, line } => {
                write!(f, "invalid filter {:?} on line {}", name, line)
            }
            SemanticError::UnknownDoctype { subtype, line } => {
                write!(f, "no doctype for subtype {:?} (line {})", subtype, line)
            }
            SemanticError::EvalSuppressed { line } => {
                write!(f, "script evaluation is not allowed (line {})", line)
            }
        }
    }
}

impl std::error::Error for SemanticError {}

/// Top-level error type returned by the compile and render entry points.
#[derive(Debug, Clone, PartialEq)]
pub enum HamlError {
    Lexical(LexicalError),
    Grammar(GrammarError),
    Semantic(SemanticError),
    /// Surfaced from the expression evaluator, annotated with the
    /// originating template line when it is known.
    Evaluation { message: String, line: Option<usize> },
}

impl fmt::Display for HamlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HamlError::Lexical(e) => write!(f, "{}", e),
            HamlError::Grammar(e) => write!(f, "{}", e),
            HamlError::Semantic(e) => write!(f, "{}", e),
            HamlError::Evaluation { message, line } => match line {
                Some(line) => write!(f, "evaluation error on line {}: {}", line, message),
                None => write!(f, "evaluation error: {}", message),
            },
        }
    }
}

impl std::error::Error for HamlError {}

impl From<LexicalError> for HamlError {
    fn from(e: LexicalError) -> Self {
        HamlError::Lexical(e)
    }
}

impl From<GrammarError> for HamlError {
    fn from(e: GrammarError) -> Self {
        HamlError::Grammar(e)
    }
}

impl From<SemanticError> for HamlError {
    fn from(e: SemanticError) -> Self {
        HamlError::Semantic(e)
    }
}

impl HamlError {
    /// True for errors raised while compiling (as opposed to rendering).
    pub fn is_compile_error(&self) -> bool {
        !matches!(self, HamlError::Evaluation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mentions_line() {
        let e = HamlError::from(LexicalError::MixedIndentation { line: 3 });
        assert!(e.to_string().contains("line 3"));

        let e = HamlError::from(SemanticError::UnknownFilter {
            name: "foo".to_string(),
            line: 7,
        });
        assert!(e.to_string().contains("foo"));
        assert!(e.to_string().contains('7'));
    }

    #[test]
    fn test_compile_vs_render_errors() {
        assert!(HamlError::from(GrammarError {
            found: "value".to_string(),
            line: 1,
            column: 0,
        })
        .is_compile_error());
        assert!(!HamlError::Evaluation {
            message: "boom".to_string(),
            line: None,
        }
        .is_compile_error());
    }
}
