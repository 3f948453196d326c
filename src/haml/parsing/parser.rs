//! The grammar reducer.
//!
//!     The parser pulls tokens one at a time and reduces each logical
//!     line into a document node. A node is begun the moment its place
//!     in the nesting stack is known: every node still open at a depth
//!     greater than or equal to the new node's depth is ended first, in
//!     LIFO order, then the new node's open() runs and it joins the
//!     stack. End of input closes whatever remains.
//!
//!     The depth a node is begun at is the depth recorded on the token
//!     that started it, so constructs whose tokens span multiple source
//!     lines (multiline values, filter blocks) still anchor to their own
//!     line.

use crate::haml::config::Options;
use crate::haml::error::{GrammarError, HamlError, SemanticError};
use crate::haml::filters::FilterKind;
use crate::haml::ir::Program;
use crate::haml::lexing::Lexer;
use crate::haml::parsing::context::ParserContext;
use crate::haml::parsing::nodes::{
    Comment, Content, Doctype, Filter, Node, NodeId, NodeKind, Script, SilentScript, Tag, TagValue,
};
use crate::haml::token::{ScriptKind, Token, TokenKind};

/// Compile source text into an instruction list.
pub fn parse(source: &str, options: &Options) -> Result<Program, HamlError> {
    Parser::new(source, options).run()
}

struct Parser<'o> {
    lexer: Lexer,
    peeked: Option<Token>,
    ctx: ParserContext<'o>,
    options: &'o Options,
    /// Open nodes, outermost first.
    to_close: Vec<Node>,
    next_id: NodeId,
}

impl<'o> Parser<'o> {
    fn new(source: &str, options: &'o Options) -> Self {
        Parser {
            lexer: Lexer::new(source),
            peeked: None,
            ctx: ParserContext::new(options),
            options,
            to_close: Vec::new(),
            next_id: 0,
        }
    }

    fn run(mut self) -> Result<Program, HamlError> {
        while let Some(token) = self.next()? {
            match token.kind.clone() {
                TokenKind::Newline => continue,
                TokenKind::TagName(_) | TokenKind::Id(_) | TokenKind::ClassName(_) => {
                    self.parse_tag(token)?;
                }
                TokenKind::Value(value) => self.parse_content(&token, value)?,
                TokenKind::ScriptMarker(kind) => self.parse_script(&token, kind)?,
                TokenKind::SilentScript(fragment) => self.parse_silent_script(&token, fragment)?,
                TokenKind::Doctype => self.parse_doctype(&token)?,
                TokenKind::Comment => self.parse_comment(&token, String::new())?,
                TokenKind::CondComment(condition) => self.parse_comment(&token, condition)?,
                TokenKind::Filter(name) => self.parse_filter(&token, name)?,
                _ => return Err(grammar_error(&token)),
            }
        }
        while let Some(node) = self.to_close.pop() {
            self.end(&node)?;
        }
        Ok(self.ctx.finish())
    }

    // ----- token plumbing -------------------------------------------------

    fn next(&mut self) -> Result<Option<Token>, HamlError> {
        match self.peeked.take() {
            Some(token) => Ok(Some(token)),
            None => Ok(self.lexer.next_token()?),
        }
    }

    fn peek(&mut self) -> Result<Option<&Token>, HamlError> {
        if self.peeked.is_none() {
            self.peeked = self.lexer.next_token()?;
        }
        Ok(self.peeked.as_ref())
    }

    /// Take the token `peek` just returned.
    fn bump(&mut self) -> Token {
        self.peeked.take().expect("bump follows a successful peek")
    }

    // ----- productions ----------------------------------------------------

    /// A tag head aggregates shorthand, dict, trim, self-close and a
    /// trailing value in any order; each may appear at most once except
    /// classes, which accumulate.
    fn parse_tag(&mut self, head: Token) -> Result<(), HamlError> {
        let depth = head.depth;
        let mut tag = Tag {
            name: "div".to_string(),
            id: None,
            classes: Vec::new(),
            dict: None,
            inner: false,
            outer: false,
            selfclose: false,
            value: None,
            line: head.line,
        };
        match head.kind {
            TokenKind::TagName(name) => tag.name = name,
            TokenKind::Id(id) => tag.id = Some(id),
            TokenKind::ClassName(class) => tag.classes.push(class),
            _ => unreachable!("parse_tag is called on tag-head tokens"),
        }

        let mut trim_seen = false;
        loop {
            let Some(peeked) = self.peek()? else { break };
            let after_value = tag.value.is_some();
            match &peeked.kind {
                TokenKind::Id(_) if tag.id.is_none() && !after_value => {
                    if let TokenKind::Id(id) = self.bump().kind {
                        tag.id = Some(id);
                    }
                }
                TokenKind::ClassName(_) if !after_value => {
                    if let TokenKind::ClassName(class) = self.bump().kind {
                        tag.classes.push(class);
                    }
                }
                TokenKind::AttrDict(_) if tag.dict.is_none() && !after_value => {
                    if let TokenKind::AttrDict(dict) = self.bump().kind {
                        tag.dict = Some(dict);
                    }
                }
                TokenKind::Trim(_) if !trim_seen && !after_value => {
                    if let TokenKind::Trim(trim) = self.bump().kind {
                        trim_seen = true;
                        tag.inner = trim.inner();
                        tag.outer = trim.outer();
                    }
                }
                TokenKind::SelfClose if !tag.selfclose && !after_value => {
                    self.bump();
                    tag.selfclose = true;
                }
                TokenKind::Value(_) => {
                    if let TokenKind::Value(part) = self.bump().kind {
                        match &mut tag.value {
                            None => tag.value = Some(TagValue::Text(part)),
                            Some(TagValue::Text(text)) => {
                                text.push(' ');
                                text.push_str(&part);
                            }
                            Some(TagValue::Script(_)) => {
                                return Err(grammar_error_at("value", head.line))
                            }
                        }
                    }
                }
                TokenKind::ScriptMarker(_) if !after_value => {
                    let kind = match self.bump().kind {
                        TokenKind::ScriptMarker(kind) => kind,
                        _ => unreachable!(),
                    };
                    let fragment = self.expect_script(head.line)?;
                    tag.value = Some(TagValue::Script(self.make_script(
                        kind,
                        fragment,
                        head.line,
                    )));
                }
                TokenKind::Newline => break,
                _ => return Err(grammar_error(peeked)),
            }
        }

        let node = self.node(NodeKind::Tag(tag));
        self.begin(node, depth)
    }

    /// Literal content; consecutive value tokens from a multiline
    /// continuation join with single spaces.
    fn parse_content(&mut self, head: &Token, first: String) -> Result<(), HamlError> {
        let mut value = first;
        while let Some(peeked) = self.peek()? {
            if let TokenKind::Value(_) = &peeked.kind {
                if let TokenKind::Value(part) = self.bump().kind {
                    value.push(' ');
                    value.push_str(&part);
                }
            } else {
                break;
            }
        }
        let node = self.node(NodeKind::Content(Content {
            value,
            line: head.line,
        }));
        self.begin(node, head.depth)
    }

    fn parse_script(&mut self, head: &Token, kind: ScriptKind) -> Result<(), HamlError> {
        let fragment = self.expect_script(head.line)?;
        let script = self.make_script(kind, fragment, head.line);
        let node = self.node(NodeKind::Script(script));
        self.begin(node, head.depth)
    }

    fn parse_silent_script(&mut self, head: &Token, fragment: String) -> Result<(), HamlError> {
        if self.options.suppress_eval {
            // Expressions and dicts have inert substitutes; a bare
            // statement does not.
            return Err(SemanticError::EvalSuppressed { line: head.line }.into());
        }
        let node = self.node(NodeKind::SilentScript(SilentScript {
            fragment,
            line: head.line,
        }));
        self.begin(node, head.depth)
    }

    fn parse_doctype(&mut self, head: &Token) -> Result<(), HamlError> {
        let mut node = Doctype {
            xml: false,
            subtype: String::new(),
            line: head.line,
        };
        if let Some(peeked) = self.peek()? {
            match &peeked.kind {
                TokenKind::HtmlType(_) => {
                    if let TokenKind::HtmlType(subtype) = self.bump().kind {
                        node.subtype = subtype;
                    }
                }
                TokenKind::XmlType(_) => {
                    if let TokenKind::XmlType(encoding) = self.bump().kind {
                        node.xml = true;
                        node.subtype = encoding;
                    }
                }
                _ => {}
            }
        }
        let node = self.node(NodeKind::Doctype(node));
        self.begin(node, head.depth)
    }

    fn parse_comment(&mut self, head: &Token, condition: String) -> Result<(), HamlError> {
        let mut value = String::new();
        if let Some(peeked) = self.peek()? {
            if let TokenKind::Value(_) = &peeked.kind {
                if let TokenKind::Value(text) = self.bump().kind {
                    value = text;
                }
            }
        }
        let node = self.node(NodeKind::Comment(Comment {
            value,
            condition,
            line: head.line,
        }));
        self.begin(node, head.depth)
    }

    fn parse_filter(&mut self, head: &Token, name: String) -> Result<(), HamlError> {
        let kind = FilterKind::from_name(&name).ok_or(SemanticError::UnknownFilter {
            name,
            line: head.line,
        })?;
        let mut lines = Vec::new();
        while let Some(peeked) = self.peek()? {
            if let TokenKind::FilterLine(_) = &peeked.kind {
                if let TokenKind::FilterLine(line) = self.bump().kind {
                    lines.push(line);
                }
            } else {
                break;
            }
        }
        let node = self.node(NodeKind::Filter(Filter {
            kind,
            lines,
            line: head.line,
        }));
        self.begin(node, head.depth)
    }

    // ----- helpers --------------------------------------------------------

    fn expect_script(&mut self, line: usize) -> Result<String, HamlError> {
        match self.next()? {
            Some(Token {
                kind: TokenKind::Script(fragment),
                ..
            }) => Ok(fragment),
            Some(token) => Err(grammar_error(&token)),
            None => Err(GrammarError {
                found: "end of input".to_string(),
                line,
                column: 0,
            }
            .into()),
        }
    }

    fn make_script(&self, kind: ScriptKind, fragment: String, line: usize) -> Script {
        let escape = match kind {
            ScriptKind::Escaped => true,
            ScriptKind::Unescaped => false,
            ScriptKind::Plain | ScriptKind::Preserve => self.options.escape_html,
        };
        Script {
            fragment,
            escape,
            preserve: kind == ScriptKind::Preserve,
            suppressed: self.options.suppress_eval,
            line,
        }
    }

    fn node(&mut self, kind: NodeKind) -> Node {
        let id = self.next_id;
        self.next_id += 1;
        Node { id, kind }
    }

    // ----- open/close protocol --------------------------------------------

    /// End every node at this depth or deeper, then open the new node
    /// and push it onto the to-close stack.
    fn begin(&mut self, node: Node, depth: usize) -> Result<(), HamlError> {
        while self.to_close.len() > depth {
            let open = self.to_close.pop().expect("stack size was just checked");
            self.end(&open)?;
        }
        self.ctx.set_last_opened(node.id);
        node.open(&mut self.ctx)?;
        node.entab(&mut self.ctx);
        self.to_close.push(node);
        Ok(())
    }

    fn end(&mut self, node: &Node) -> Result<(), HamlError> {
        node.detab(&mut self.ctx);
        node.close(&mut self.ctx)
    }
}

fn grammar_error(token: &Token) -> HamlError {
    GrammarError {
        found: token.kind.describe().to_string(),
        line: token.line,
        column: token.column,
    }
    .into()
}

fn grammar_error_at(found: &str, line: usize) -> HamlError {
    GrammarError {
        found: found.to_string(),
        line,
        column: 0,
    }
    .into()
}
