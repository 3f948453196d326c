//! Instruction stream for compiled templates.
//!
//!     A compile lowers the document into a flat, ordered list of
//!     instructions that a small runtime executes against an output
//!     buffer and an expression evaluator. Instructions carry the
//!     emission depth they were produced at; the runtime's indentation
//!     depth is a separate counter driven by the Entab/Detab opcodes.
//!
//!     Appending goes through a peephole reducer that looks at the last
//!     instruction already in the list: a Detab that directly follows an
//!     Entab at the same depth cancels it, and adjacent literal writes at
//!     the same depth are concatenated into one. Both rewrites shrink the
//!     program without changing what it prints.

use serde::Serialize;

/// One primitive output or formatting-state operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Op {
    /// Append text verbatim.
    WriteLiteral(String),
    /// Evaluate a fragment, stringify the result and append it.
    WriteEval {
        fragment: String,
        /// HTML-escape the stringified result.
        escape: bool,
        /// Entity-encode newlines in the result.
        preserve: bool,
    },
    /// Render the attribute list of a tag: an optional evaluated dict
    /// fragment merged with shorthand id/class values.
    Attrs {
        fragment: Option<String>,
        id: Option<String>,
        class: Option<String>,
    },
    /// Execute a statement fragment for its side effects.
    Stmt(String),
    /// Append a newline plus indentation for the current depth.
    Indent,
    /// Increase the indentation depth.
    Entab,
    /// Decrease the indentation depth.
    Detab,
    /// Suppress the next Indent (one-shot).
    Trim,
}

/// An opcode plus the emission depth it was generated at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instruction {
    pub depth: usize,
    pub op: Op,
}

/// An append-only instruction list with lookback merging.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    pub fn new() -> Self {
        Program {
            instructions: Vec::new(),
        }
    }

    /// Append an instruction, merging with the previous one when the
    /// peephole rules allow it.
    pub fn push(&mut self, depth: usize, op: Op) {
        if let Some(last) = self.instructions.last_mut() {
            if last.depth == depth {
                match (&mut last.op, &op) {
                    // An entab immediately undone by a detab is a no-op.
                    (Op::Entab, Op::Detab) => {
                        self.instructions.pop();
                        return;
                    }
                    // Adjacent literal writes concatenate.
                    (Op::WriteLiteral(prev), Op::WriteLiteral(next)) => {
                        prev.push_str(next);
                        return;
                    }
                    _ => {}
                }
            }
        }
        self.instructions.push(Instruction { depth, op });
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}
