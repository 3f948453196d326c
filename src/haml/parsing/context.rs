//! Shared parser context: instruction emission and open/close bookkeeping.
//!
//!     Every node is opened and closed against one `ParserContext`,
//!     constructed fresh per compile. It owns the instruction list being
//!     built, the emission depth (indentation of generated instructions,
//!     not of source lines), the trim and preserve state, and the
//!     identity of the most recently opened node, which the no-nesting
//!     rule checks against.
//!
//!     The `push_*` methods implement the write protocol: a write is
//!     normally preceded by an indent instruction; an outer trim or a
//!     pending inner trim from the previous push replaces that indent
//!     with a trimmed one, and an active whitespace-preserving tag
//!     suppresses it entirely.

use crate::haml::config::Options;
use crate::haml::error::{HamlError, SemanticError};
use crate::haml::ir::{Op, Program};
use crate::haml::parsing::nodes::{NodeId, Script};

pub struct ParserContext<'o> {
    options: &'o Options,
    /// Emission depth, driven by enblock/deblock of statement blocks.
    depth: usize,
    program: Program,
    /// The next push's indent has been trimmed away by the previous one.
    trim_next: bool,
    /// Nesting count of whitespace-preserving tags currently open.
    preserve: usize,
    last_opened: Option<NodeId>,
}

impl<'o> ParserContext<'o> {
    pub fn new(options: &'o Options) -> Self {
        ParserContext {
            options,
            depth: 0,
            program: Program::new(),
            trim_next: false,
            preserve: 0,
            last_opened: None,
        }
    }

    pub fn options(&self) -> &Options {
        self.options
    }

    pub fn emit(&mut self, op: Op) {
        self.program.push(self.depth, op);
    }

    pub fn write_literal(&mut self, s: &str) {
        self.emit(Op::WriteLiteral(s.to_string()));
    }

    pub fn write_script(&mut self, script: &Script) {
        if script.suppressed {
            self.write_literal("");
        } else {
            self.emit(Op::WriteEval {
                fragment: script.fragment.clone(),
                escape: script.escape,
                preserve: script.preserve,
            });
        }
    }

    /// Write a literal on its own (usually indented) line.
    pub fn push_literal(&mut self, s: &str, inner: bool, outer: bool) {
        self.push_indent(outer);
        self.write_literal(s);
        self.trim_next = inner;
    }

    /// Write an evaluated fragment on its own line.
    pub fn push_script(&mut self, script: &Script, inner: bool, outer: bool) {
        self.push_indent(outer);
        self.write_script(script);
        self.trim_next = inner;
    }

    fn push_indent(&mut self, outer: bool) {
        if outer || self.trim_next {
            self.emit(Op::Trim);
            self.emit(Op::Indent);
        } else if self.preserve == 0 {
            self.emit(Op::Indent);
        }
    }

    /// Arm or clear trimming for the next push. A tag close owns this
    /// decision: it can cancel a trim its own open armed.
    pub fn set_trim_next(&mut self, trim: bool) {
        self.trim_next = trim;
    }

    pub fn enblock(&mut self) {
        self.depth += 1;
    }

    pub fn deblock(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn enter_preserve(&mut self) {
        self.preserve += 1;
    }

    pub fn exit_preserve(&mut self) {
        self.preserve = self.preserve.saturating_sub(1);
    }

    pub fn set_last_opened(&mut self, id: NodeId) {
        self.last_opened = Some(id);
    }

    pub fn is_last_opened(&self, id: NodeId) -> bool {
        self.last_opened == Some(id)
    }

    /// Check that nothing was opened under a node that forbids children.
    pub fn no_nesting(&self, id: NodeId, line: usize) -> Result<(), HamlError> {
        if self.is_last_opened(id) {
            Ok(())
        } else {
            Err(SemanticError::IllegalNesting { line }.into())
        }
    }

    pub fn finish(self) -> Program {
        self.program
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_emits_indent_then_write() {
        let options = Options::default();
        let mut ctx = ParserContext::new(&options);
        ctx.push_literal("<p", false, false);
        let program = ctx.finish();
        assert_eq!(program.instructions()[0].op, Op::Indent);
        assert_eq!(
            program.instructions()[1].op,
            Op::WriteLiteral("<p".to_string())
        );
    }

    #[test]
    fn test_outer_trim_replaces_indent() {
        let options = Options::default();
        let mut ctx = ParserContext::new(&options);
        ctx.push_literal("<img", false, true);
        let program = ctx.finish();
        assert_eq!(program.instructions()[0].op, Op::Trim);
        assert_eq!(program.instructions()[1].op, Op::Indent);
    }

    #[test]
    fn test_inner_trim_arms_next_push() {
        let options = Options::default();
        let mut ctx = ParserContext::new(&options);
        ctx.push_literal("<b", true, false);
        ctx.push_literal("foo", false, false);
        let program = ctx.finish();
        // Second push gets a trimmed indent because the first armed it.
        assert_eq!(program.instructions()[2].op, Op::Trim);
    }

    #[test]
    fn test_preserve_suppresses_indent() {
        let options = Options::default();
        let mut ctx = ParserContext::new(&options);
        ctx.enter_preserve();
        ctx.push_literal("<code", false, false);
        let program = ctx.finish();
        assert_eq!(
            program.instructions()[0].op,
            Op::WriteLiteral("<code".to_string())
        );
    }

    #[test]
    fn test_no_nesting_tracks_last_opened() {
        let options = Options::default();
        let mut ctx = ParserContext::new(&options);
        ctx.set_last_opened(1);
        assert!(ctx.no_nesting(1, 1).is_ok());
        ctx.set_last_opened(2);
        assert!(ctx.no_nesting(1, 1).is_err());
    }
}
