//! The render runtime.
//!
//!     Executes a compiled instruction list against an output buffer and
//!     an injected expression evaluator. The runtime's formatting state
//!     is the current indentation depth (driven by Entab/Detab), and the
//!     one-shot trim-next flag (set by Trim, consumed by the next
//!     Indent). State is local to one execution; re-running a program
//!     starts fresh.
//!
//!     The final output is the accumulated text stripped of surrounding
//!     whitespace, with exactly one trailing newline.

use crate::haml::config::Options;
use crate::haml::error::HamlError;
use crate::haml::evaluator::{Bindings, EvalError, Evaluator, Value};
use crate::haml::ir::{Op, Program};

/// Width of one indentation level in the output.
const INDENT: &str = "  ";

/// Tri-state attribute value after evaluation: present with a value,
/// present as a boolean, or (already dropped) absent.
enum AttrValue {
    Value(String),
    True,
}

/// Execute a program and return the rendered text.
pub fn execute(
    program: &Program,
    options: &Options,
    evaluator: &mut dyn Evaluator,
    mut bindings: Bindings,
) -> Result<String, HamlError> {
    let mut out = String::new();
    let mut depth = 0usize;
    let mut trim_next = false;

    for instruction in program.instructions() {
        match &instruction.op {
            Op::WriteLiteral(text) => out.push_str(text),
            Op::WriteEval {
                fragment,
                escape,
                preserve,
            } => {
                let value = evaluator
                    .eval(fragment, &bindings)
                    .map_err(render_error)?;
                let mut text = stringify(&value);
                if *escape {
                    text = escape_html(&text);
                }
                if *preserve {
                    text = text.replace('\n', "&#x000A;");
                }
                out.push_str(&text);
            }
            Op::Attrs {
                fragment,
                id,
                class,
            } => {
                render_attrs(
                    fragment.as_deref(),
                    id.as_deref(),
                    class.as_deref(),
                    options,
                    evaluator,
                    &bindings,
                    &mut out,
                )?;
            }
            Op::Stmt(fragment) => {
                evaluator
                    .exec(fragment, &mut bindings)
                    .map_err(render_error)?;
            }
            Op::Indent => {
                if trim_next {
                    trim_next = false;
                } else {
                    out.push('\n');
                    for _ in 0..depth {
                        out.push_str(INDENT);
                    }
                }
            }
            Op::Entab => depth += 1,
            Op::Detab => depth = depth.saturating_sub(1),
            Op::Trim => trim_next = true,
        }
    }

    let mut result = out.trim().to_string();
    result.push('\n');
    Ok(result)
}

fn render_error(e: EvalError) -> HamlError {
    HamlError::Evaluation {
        message: e.message,
        line: None,
    }
}

/// Render the attribute list: the evaluated dict entries in source
/// order, merged with the shorthand id and class values.
fn render_attrs(
    fragment: Option<&str>,
    id: Option<&str>,
    class: Option<&str>,
    options: &Options,
    evaluator: &mut dyn Evaluator,
    bindings: &Bindings,
    out: &mut String,
) -> Result<(), HamlError> {
    let mut attrs: Vec<(String, AttrValue)> = Vec::new();
    if let Some(fragment) = fragment {
        for (name, value) in evaluator
            .eval_attrs(fragment, bindings)
            .map_err(render_error)?
        {
            match value {
                // Absent or boolean-false attributes are dropped.
                Value::Null | Value::Bool(false) => {}
                Value::Bool(true) => attrs.push((name, AttrValue::True)),
                other => attrs.push((name, AttrValue::Value(stringify(&other)))),
            }
        }
    }

    if let Some(id) = id {
        match attrs.iter_mut().find(|(name, _)| name == "id") {
            Some((_, slot)) => {
                // Shorthand and dict both supply an id: join them.
                *slot = match slot {
                    AttrValue::Value(existing) => {
                        AttrValue::Value(format!("{}_{}", id, existing))
                    }
                    AttrValue::True => AttrValue::Value(id.to_string()),
                };
            }
            None => attrs.push(("id".to_string(), AttrValue::Value(id.to_string()))),
        }
    }
    if let Some(class) = class {
        match attrs.iter_mut().find(|(name, _)| name == "class") {
            Some((_, slot)) => {
                // Class values compose, shorthand first.
                *slot = match slot {
                    AttrValue::Value(existing) => {
                        AttrValue::Value(format!("{} {}", class, existing))
                    }
                    AttrValue::True => AttrValue::Value(class.to_string()),
                };
            }
            None => attrs.push(("class".to_string(), AttrValue::Value(class.to_string()))),
        }
    }

    let wrapper = options.attr_wrapper;
    let entity = if wrapper == '"' { "&quot;" } else { "&#39;" };
    for (name, value) in attrs {
        let text = match value {
            AttrValue::True => name.clone(),
            AttrValue::Value(value) => value,
        };
        let text = text.replace(wrapper, entity);
        out.push(' ');
        out.push_str(&name);
        out.push('=');
        out.push(wrapper);
        out.push_str(&text);
        out.push(wrapper);
    }
    Ok(())
}

/// Stringify an evaluated value for output.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Escape `&`, `<`, `>` and `"` as named entities.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("cheese & crackers"), "cheese &amp; crackers");
        assert_eq!(escape_html("a < b > c"), "a &lt; b &gt; c");
        assert_eq!(escape_html("say \"hi\""), "say &quot;hi&quot;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_stringify() {
        assert_eq!(stringify(&json!("text")), "text");
        assert_eq!(stringify(&json!(3)), "3");
        assert_eq!(stringify(&json!(1.5)), "1.5");
        assert_eq!(stringify(&json!(true)), "true");
        assert_eq!(stringify(&json!(null)), "");
    }
}
