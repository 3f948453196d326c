//! Document nodes and their open/close behavior.
//!
//!     A node is one parsed structural unit of the template. The set is
//!     closed, and the open/close protocol dispatches by matching on the
//!     variant: open emits the node's opening markup and close its
//!     closing markup, if any. Nodes that forbid children (literal
//!     content, doctypes, valued or self-closed tags) verify on close
//!     that they are still the most recently opened node.

use crate::haml::config::Format;
use crate::haml::doctype;
use crate::haml::error::{HamlError, SemanticError};
use crate::haml::filters::FilterKind;
use crate::haml::ir::Op;
use crate::haml::parsing::context::ParserContext;

/// Identity of a node within one compile; used by the no-nesting rule.
pub type NodeId = usize;

#[derive(Debug)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
}

#[derive(Debug)]
pub enum NodeKind {
    Tag(Tag),
    Content(Content),
    Script(Script),
    SilentScript(SilentScript),
    Doctype(Doctype),
    Comment(Comment),
    Filter(Filter),
}

/// An element with optional shorthand id/classes, attribute dict, trim
/// flags, self-close marker and trailing value.
#[derive(Debug)]
pub struct Tag {
    pub name: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub dict: Option<String>,
    pub inner: bool,
    pub outer: bool,
    pub selfclose: bool,
    pub value: Option<TagValue>,
    pub line: usize,
}

#[derive(Debug)]
pub enum TagValue {
    Text(String),
    Script(Script),
}

/// An evaluated expression fragment with its resolved escaping.
#[derive(Debug)]
pub struct Script {
    pub fragment: String,
    pub escape: bool,
    /// Entity-encode newlines in the evaluated result.
    pub preserve: bool,
    /// Evaluation is suppressed; render an empty string instead.
    pub suppressed: bool,
    pub line: usize,
}

#[derive(Debug)]
pub struct Content {
    pub value: String,
    pub line: usize,
}

#[derive(Debug)]
pub struct SilentScript {
    pub fragment: String,
    pub line: usize,
}

#[derive(Debug)]
pub struct Doctype {
    pub xml: bool,
    pub subtype: String,
    pub line: usize,
}

#[derive(Debug)]
pub struct Comment {
    pub value: String,
    pub condition: String,
    pub line: usize,
}

#[derive(Debug)]
pub struct Filter {
    pub kind: FilterKind,
    pub lines: Vec<String>,
    pub line: usize,
}

impl Node {
    pub fn open(&self, ctx: &mut ParserContext) -> Result<(), HamlError> {
        match &self.kind {
            NodeKind::Tag(tag) => open_tag(self.id, tag, ctx),
            NodeKind::Content(content) => {
                ctx.push_literal(&content.value, false, false);
                Ok(())
            }
            NodeKind::Script(script) => {
                ctx.push_script(script, false, false);
                Ok(())
            }
            NodeKind::SilentScript(script) => {
                ctx.emit(Op::Stmt(script.fragment.clone()));
                ctx.enblock();
                Ok(())
            }
            NodeKind::Doctype(doctype) => open_doctype(doctype, ctx),
            NodeKind::Comment(comment) => {
                open_comment(comment, ctx);
                Ok(())
            }
            NodeKind::Filter(filter) => {
                filter.kind.emit(&filter.lines, ctx);
                Ok(())
            }
        }
    }

    pub fn close(&self, ctx: &mut ParserContext) -> Result<(), HamlError> {
        match &self.kind {
            NodeKind::Tag(tag) => close_tag(self.id, tag, ctx),
            NodeKind::Content(content) => ctx.no_nesting(self.id, content.line),
            NodeKind::Script(_) => Ok(()),
            NodeKind::SilentScript(_) => {
                ctx.deblock();
                Ok(())
            }
            NodeKind::Doctype(doctype) => ctx.no_nesting(self.id, doctype.line),
            NodeKind::Comment(comment) => {
                close_comment(comment, ctx);
                Ok(())
            }
            NodeKind::Filter(_) => Ok(()),
        }
    }

    /// Statement blocks indent generated instructions, not output; all
    /// other nodes indent their children's output.
    pub fn entab(&self, ctx: &mut ParserContext) {
        if !matches!(self.kind, NodeKind::SilentScript(_)) {
            ctx.emit(Op::Entab);
        }
    }

    pub fn detab(&self, ctx: &mut ParserContext) {
        if !matches!(self.kind, NodeKind::SilentScript(_)) {
            ctx.emit(Op::Detab);
        }
    }

    pub fn line(&self) -> usize {
        match &self.kind {
            NodeKind::Tag(n) => n.line,
            NodeKind::Content(n) => n.line,
            NodeKind::Script(n) => n.line,
            NodeKind::SilentScript(n) => n.line,
            NodeKind::Doctype(n) => n.line,
            NodeKind::Comment(n) => n.line,
            NodeKind::Filter(n) => n.line,
        }
    }
}

impl Tag {
    /// A tag renders without a closing tag when it has no value and is
    /// either explicitly self-closed or in the configured autoclose set.
    /// An explicit value always forces normal rendering.
    fn auto(&self, ctx: &ParserContext) -> bool {
        self.value.is_none() && (self.selfclose || ctx.options().is_autoclose(&self.name))
    }
}

fn open_tag(id: NodeId, tag: &Tag, ctx: &mut ParserContext) -> Result<(), HamlError> {
    if tag.selfclose && tag.value.is_some() {
        return Err(SemanticError::SelfCloseWithValue { line: tag.line }.into());
    }

    ctx.push_literal(&format!("<{}", tag.name), tag.inner, tag.outer);

    let fragment = if ctx.options().suppress_eval {
        None
    } else {
        tag.dict.clone()
    };
    let class = if tag.classes.is_empty() {
        None
    } else {
        Some(tag.classes.join(" "))
    };
    ctx.emit(Op::Attrs {
        fragment,
        id: tag.id.clone(),
        class,
    });

    if tag.auto(ctx) {
        ctx.no_nesting(id, tag.line)?;
        if ctx.options().format == Format::Xhtml {
            ctx.write_literal("/");
        }
    }
    ctx.write_literal(">");

    match &tag.value {
        Some(TagValue::Text(text)) => ctx.write_literal(text),
        Some(TagValue::Script(script)) => ctx.write_script(script),
        None => {}
    }

    if ctx.options().is_preserve(&tag.name) {
        ctx.enter_preserve();
    }
    Ok(())
}

fn close_tag(id: NodeId, tag: &Tag, ctx: &mut ParserContext) -> Result<(), HamlError> {
    if tag.value.is_some() || tag.selfclose {
        ctx.no_nesting(id, tag.line)?;
    }

    let auto = tag.auto(ctx);
    let last = ctx.is_last_opened(id);

    if tag.value.is_some() || (last && !auto) {
        // Nothing was nested: the closing tag follows the content
        // directly on the same line.
        ctx.write_literal(&format!("</{}>", tag.name));
    }

    if auto || tag.value.is_some() || last {
        ctx.set_trim_next(tag.outer);
    } else {
        // The closing tag sits on its own line; the trim flags swap
        // sides relative to the opening tag.
        ctx.push_literal(&format!("</{}>", tag.name), tag.outer, tag.inner);
    }

    if ctx.options().is_preserve(&tag.name) {
        ctx.exit_preserve();
    }
    Ok(())
}

fn open_doctype(node: &Doctype, ctx: &mut ParserContext) -> Result<(), HamlError> {
    if node.xml {
        ctx.push_literal(&doctype::xml_prolog(&node.subtype), false, false);
        return Ok(());
    }
    match doctype::doctype(ctx.options().format, &node.subtype) {
        Some(declaration) => {
            ctx.push_literal(declaration, false, false);
            Ok(())
        }
        None => Err(SemanticError::UnknownDoctype {
            subtype: node.subtype.clone(),
            line: node.line,
        }
        .into()),
    }
}

fn open_comment(node: &Comment, ctx: &mut ParserContext) {
    let mut markup = if node.condition.is_empty() {
        "<!--".to_string()
    } else {
        format!("<!--[{}]>", node.condition)
    };
    if !node.value.is_empty() {
        markup.push(' ');
        markup.push_str(&node.value);
    }
    ctx.push_literal(&markup, false, false);
}

fn close_comment(node: &Comment, ctx: &mut ParserContext) {
    let markup = if node.condition.is_empty() {
        "-->"
    } else {
        "<![endif]-->"
    };
    if !node.value.is_empty() {
        // One-line comment: the terminator follows the text directly.
        ctx.write_literal(&format!(" {}", markup));
    } else {
        ctx.push_literal(markup, false, false);
    }
}
