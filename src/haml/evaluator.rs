//! The expression evaluation boundary.
//!
//!     The compiler locates embedded host-language fragments but never
//!     interprets them; at render time each fragment is handed to an
//!     `Evaluator` together with the binding environment. Bindings are a
//!     JSON object: names mapped to `serde_json::Value`s.
//!
//!     `LiteralEvaluator` is the reference implementation used by the
//!     CLI and the test-suite. It understands literals (strings in
//!     single, double and triple quotes, numbers, booleans, None/null),
//!     identifiers resolved against the bindings, flat `{'key': value}`
//!     dicts, and `name = expr` assignment statements. Anything richer
//!     is an evaluation error; real host-language semantics belong to an
//!     embedding application.

use std::fmt;

pub type Value = serde_json::Value;
pub type Bindings = serde_json::Map<String, Value>;

/// An error raised by fragment evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalError {
    pub message: String,
}

impl EvalError {
    pub fn new(message: impl Into<String>) -> Self {
        EvalError {
            message: message.into(),
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EvalError {}

/// Evaluates embedded fragments against a binding environment.
pub trait Evaluator {
    /// Evaluate an expression fragment to a value.
    fn eval(&mut self, fragment: &str, bindings: &Bindings) -> Result<Value, EvalError>;

    /// Execute a statement fragment for its side effects.
    fn exec(&mut self, fragment: &str, bindings: &mut Bindings) -> Result<(), EvalError>;

    /// Evaluate an attribute-dict fragment to an ordered name/value list.
    fn eval_attrs(
        &mut self,
        fragment: &str,
        bindings: &Bindings,
    ) -> Result<Vec<(String, Value)>, EvalError>;
}

/// A literal-only evaluator; see the module docs for the grammar.
#[derive(Debug, Default, Clone, Copy)]
pub struct LiteralEvaluator;

impl Evaluator for LiteralEvaluator {
    fn eval(&mut self, fragment: &str, bindings: &Bindings) -> Result<Value, EvalError> {
        let mut cursor = Cursor::new(fragment);
        let value = cursor.parse_value(bindings)?;
        cursor.skip_ws();
        if !cursor.at_end() {
            return Err(EvalError::new(format!(
                "unsupported expression: {}",
                fragment
            )));
        }
        Ok(value)
    }

    fn exec(&mut self, fragment: &str, bindings: &mut Bindings) -> Result<(), EvalError> {
        if fragment.trim().is_empty() {
            return Ok(());
        }
        let mut cursor = Cursor::new(fragment);
        cursor.skip_ws();
        let name = cursor.parse_ident()?;
        cursor.skip_ws();
        cursor.expect('=')?;
        let value = cursor.parse_value(bindings)?;
        cursor.skip_ws();
        if !cursor.at_end() {
            return Err(EvalError::new(format!(
                "unsupported statement: {}",
                fragment
            )));
        }
        bindings.insert(name, value);
        Ok(())
    }

    fn eval_attrs(
        &mut self,
        fragment: &str,
        bindings: &Bindings,
    ) -> Result<Vec<(String, Value)>, EvalError> {
        let mut cursor = Cursor::new(fragment);
        cursor.skip_ws();
        cursor.expect('{')?;
        let mut pairs = Vec::new();
        loop {
            cursor.skip_ws();
            if cursor.eat('}') {
                break;
            }
            let key = cursor.parse_key(bindings)?;
            cursor.skip_ws();
            cursor.expect(':')?;
            let value = cursor.parse_value(bindings)?;
            pairs.push((key, value));
            cursor.skip_ws();
            if cursor.eat(',') {
                continue;
            }
            cursor.expect('}')?;
            break;
        }
        Ok(pairs)
    }
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Cursor { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_ws(&mut self) {
        let n = self
            .rest()
            .bytes()
            .take_while(|b| b.is_ascii_whitespace())
            .count();
        self.pos += n;
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), EvalError> {
        self.skip_ws();
        if self.eat(expected) {
            Ok(())
        } else {
            Err(EvalError::new(format!(
                "expected {:?} at offset {} in {:?}",
                expected, self.pos, self.src
            )))
        }
    }

    fn parse_value(&mut self, bindings: &Bindings) -> Result<Value, EvalError> {
        self.skip_ws();
        match self.peek() {
            Some('\'') | Some('"') => self.parse_string().map(Value::String),
            Some(c) if c.is_ascii_digit() || c == '-' => self.parse_number(),
            Some('{') => self.parse_dict(bindings),
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                let name = self.parse_ident()?;
                match name.as_str() {
                    "True" | "true" => Ok(Value::Bool(true)),
                    "False" | "false" => Ok(Value::Bool(false)),
                    "None" | "null" => Ok(Value::Null),
                    _ => bindings
                        .get(&name)
                        .cloned()
                        .ok_or_else(|| EvalError::new(format!("undefined name: {}", name))),
                }
            }
            _ => Err(EvalError::new(format!(
                "unsupported expression: {}",
                self.src
            ))),
        }
    }

    fn parse_string(&mut self) -> Result<String, EvalError> {
        let quote = self.peek().expect("caller checked the quote");
        let triple = format!("{0}{0}{0}", quote);
        if self.rest().starts_with(&triple) {
            self.pos += 3;
            match self.rest().find(&triple) {
                Some(i) => {
                    let content = self.rest()[..i].to_string();
                    self.pos += i + 3;
                    Ok(content)
                }
                None => Err(EvalError::new("unterminated string literal")),
            }
        } else {
            self.pos += 1;
            let mut content = String::new();
            let mut chars = self.rest().char_indices();
            while let Some((i, c)) = chars.next() {
                if c == quote {
                    self.pos += i + 1;
                    return Ok(content);
                }
                if c == '\\' {
                    match chars.next() {
                        Some((_, 'n')) => content.push('\n'),
                        Some((_, 't')) => content.push('\t'),
                        Some((_, e)) if e == quote || e == '\\' => content.push(e),
                        Some((_, other)) => {
                            content.push('\\');
                            content.push(other);
                        }
                        None => break,
                    }
                } else {
                    content.push(c);
                }
            }
            Err(EvalError::new("unterminated string literal"))
        }
    }

    fn parse_number(&mut self) -> Result<Value, EvalError> {
        let rest = self.rest();
        let mut len = 0;
        for (i, c) in rest.char_indices() {
            if c.is_ascii_digit() || c == '.' || (i == 0 && c == '-') {
                len = i + c.len_utf8();
            } else {
                break;
            }
        }
        let text = &rest[..len];
        self.pos += len;
        if text.contains('.') {
            let parsed: f64 = text
                .parse()
                .map_err(|_| EvalError::new(format!("bad number: {}", text)))?;
            serde_json::Number::from_f64(parsed)
                .map(Value::Number)
                .ok_or_else(|| EvalError::new(format!("bad number: {}", text)))
        } else {
            let parsed: i64 = text
                .parse()
                .map_err(|_| EvalError::new(format!("bad number: {}", text)))?;
            Ok(Value::Number(parsed.into()))
        }
    }

    fn parse_dict(&mut self, bindings: &Bindings) -> Result<Value, EvalError> {
        self.expect('{')?;
        let mut map = Bindings::new();
        loop {
            self.skip_ws();
            if self.eat('}') {
                break;
            }
            let key = self.parse_key(bindings)?;
            self.expect(':')?;
            let value = self.parse_value(bindings)?;
            map.insert(key, value);
            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            self.expect('}')?;
            break;
        }
        Ok(Value::Object(map))
    }

    fn parse_key(&mut self, bindings: &Bindings) -> Result<String, EvalError> {
        self.skip_ws();
        match self.peek() {
            Some('\'') | Some('"') => self.parse_string(),
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                let name = self.parse_ident()?;
                match bindings.get(&name) {
                    Some(Value::String(s)) => Ok(s.clone()),
                    Some(_) => Err(EvalError::new(format!(
                        "attribute name {} is not a string",
                        name
                    ))),
                    None => Err(EvalError::new(format!("undefined name: {}", name))),
                }
            }
            _ => Err(EvalError::new("expected an attribute name")),
        }
    }

    fn parse_ident(&mut self) -> Result<String, EvalError> {
        let rest = self.rest();
        let len = rest
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
            .count();
        if len == 0 || rest.as_bytes()[0].is_ascii_digit() {
            return Err(EvalError::new(format!(
                "expected an identifier at offset {} in {:?}",
                self.pos, self.src
            )));
        }
        self.pos += len;
        Ok(rest[..len].to_string())
    }
}
