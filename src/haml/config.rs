//! Compiler options.
//!
//! Options are supplied by the caller (CLI or embedding code); nothing in
//! here is parsed from the template source. A single `Options` value is
//! shared by a compile and the renders of its output.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Output format variant. Controls the doctype table and whether
/// autoclosed tags render with a trailing slash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Format {
    Html5,
    Html4,
    Xhtml,
}

impl Format {
    pub fn key(self) -> &'static str {
        match self {
            Format::Html5 => "html5",
            Format::Html4 => "html4",
            Format::Xhtml => "xhtml",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "html5" => Ok(Format::Html5),
            "html4" => Ok(Format::Html4),
            "xhtml" => Ok(Format::Xhtml),
            other => Err(format!(
                "unknown format {:?} (expected html5, html4 or xhtml)",
                other
            )),
        }
    }
}

/// Options consumed by the compiler and the render runtime.
#[derive(Debug, Clone)]
pub struct Options {
    pub format: Format,
    /// Quote character wrapping attribute values; `'` or `"`.
    pub attr_wrapper: char,
    /// Escape evaluated `=` fragments by default.
    pub escape_html: bool,
    /// Replace script fragments with inert equivalents instead of
    /// evaluating them.
    pub suppress_eval: bool,
    /// Tag names rendered without a closing tag when empty.
    pub autoclose: Vec<String>,
    /// Tag names whose interior whitespace is left untouched.
    pub preserve: Vec<String>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            format: Format::Html5,
            attr_wrapper: '\'',
            escape_html: true,
            suppress_eval: false,
            autoclose: [
                "meta", "img", "input", "link", "br", "hr", "area", "param", "col", "base",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            preserve: ["pre", "textarea"].iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Options {
    pub fn is_autoclose(&self, name: &str) -> bool {
        self.autoclose.iter().any(|t| t == name)
    }

    pub fn is_preserve(&self, name: &str) -> bool {
        self.preserve.iter().any(|t| t == name)
    }
}
