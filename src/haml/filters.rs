//! Built-in filters.
//!
//! A filter owns the raw lines of its block. The plain filter passes
//! them through untouched; the javascript filter wraps them in a
//! `<script>` tag, with a CDATA comment pair in the XML-strict format.

use crate::haml::config::Format;
use crate::haml::ir::Op;
use crate::haml::parsing::context::ParserContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Plain,
    Javascript,
}

impl FilterKind {
    pub fn from_name(name: &str) -> Option<FilterKind> {
        match name {
            "plain" => Some(FilterKind::Plain),
            "javascript" => Some(FilterKind::Javascript),
            _ => None,
        }
    }

    /// Emit the filter's content as instructions.
    pub fn emit(&self, lines: &[String], ctx: &mut ParserContext) {
        match self {
            FilterKind::Plain => {
                for line in lines {
                    ctx.push_literal(line, false, false);
                }
            }
            FilterKind::Javascript => {
                let wrapper = ctx.options().attr_wrapper;
                let xhtml = ctx.options().format == Format::Xhtml;
                ctx.push_literal(
                    &format!("<script type={}text/javascript{}>", wrapper, wrapper),
                    false,
                    false,
                );
                ctx.emit(Op::Entab);
                if xhtml {
                    ctx.push_literal("//<![CDATA[", false, false);
                    ctx.emit(Op::Entab);
                }
                for line in lines {
                    ctx.push_literal(line, false, false);
                }
                ctx.emit(Op::Detab);
                if xhtml {
                    ctx.push_literal("//]]>", false, false);
                    ctx.emit(Op::Detab);
                }
                ctx.push_literal("</script>", false, false);
            }
        }
    }
}
