//! Indentation measurement and depth tracking.
//!
//!     The first indented line of a compile fixes the indentation unit:
//!     its character (space or tab) and its width. Every later line must
//!     indent with a run of that same character whose length is a whole
//!     multiple of the width, and may go at most one level deeper than
//!     the line before it. Dedents of any size are fine.
//!
//!     Silent comments and filters additionally register a block depth.
//!     While a block is active, lines at or below the block depth keep
//!     only `block * width` characters as structural indentation; any
//!     excess belongs to the line's raw content. A line shallower than
//!     the block depth ends the block and is measured normally.

use crate::haml::error::LexicalError;

/// Result of measuring one line's leading whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurement {
    /// Nesting depth derived from the structural indentation.
    pub depth: usize,
    /// Bytes of the whitespace run that count as structural indentation.
    /// Anything beyond this belongs to the line's content.
    pub consumed: usize,
    /// True when an active raw block ended on this line.
    pub block_ended: bool,
}

/// Per-compile indentation state.
#[derive(Debug, Default)]
pub struct IndentationTracker {
    unit_char: Option<char>,
    unit_width: usize,
    depth: usize,
    block: Option<usize>,
}

impl IndentationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Depth of the most recently measured line.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Register a raw block that swallows lines at `depth` or deeper.
    pub fn set_block(&mut self, depth: usize) {
        self.block = Some(depth);
    }

    pub fn block(&self) -> Option<usize> {
        self.block
    }

    /// Measure a line that has no leading whitespace. Always depth 0;
    /// ends any active block.
    pub fn measure_unindented(&mut self) -> Measurement {
        self.depth = 0;
        Measurement {
            depth: 0,
            consumed: 0,
            block_ended: self.block.take().is_some(),
        }
    }

    /// Measure a leading whitespace run. `run` must be non-empty and
    /// contain only spaces and tabs.
    pub fn measure(&mut self, run: &str, line: usize) -> Result<Measurement, LexicalError> {
        debug_assert!(!run.is_empty());

        // The first indented line of the compile defines the unit.
        if self.unit_char.is_none() {
            self.unit_char = run.chars().next();
            self.unit_width = run.len();
        }
        let unit_char = self.unit_char.unwrap();

        let mut effective = run;
        let mut consumed = run.len();
        let mut block_ended = false;

        if let Some(block) = self.block {
            if run.len() / self.unit_width < block {
                self.block = None;
                block_ended = true;
            } else {
                // Inside the block: keep exactly the block's worth of
                // indentation, the rest is raw content.
                let structural = self.unit_width * block;
                if structural < run.len() {
                    consumed = structural;
                    effective = &run[..structural];
                }
            }
        }

        if effective.chars().any(|c| c != unit_char) {
            return Err(LexicalError::MixedIndentation { line });
        }

        let depth = effective.len() / self.unit_width;
        let remainder = effective.len() % self.unit_width;
        if remainder > 0 || depth > self.depth + 1 {
            return Err(LexicalError::InvalidIndentation { line });
        }

        self.depth = depth;
        Ok(Measurement {
            depth,
            consumed,
            block_ended,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_detected_from_first_run() {
        let mut t = IndentationTracker::new();
        let m = t.measure("  ", 2).unwrap();
        assert_eq!(m.depth, 1);
        let m = t.measure("    ", 3).unwrap();
        assert_eq!(m.depth, 2);
    }

    #[test]
    fn test_tab_unit() {
        let mut t = IndentationTracker::new();
        assert_eq!(t.measure("\t", 2).unwrap().depth, 1);
        assert_eq!(t.measure("\t\t", 3).unwrap().depth, 2);
    }

    #[test]
    fn test_mixed_characters_rejected() {
        let mut t = IndentationTracker::new();
        assert!(matches!(
            t.measure("\t ", 2),
            Err(LexicalError::MixedIndentation { line: 2 })
        ));

        let mut t = IndentationTracker::new();
        t.measure("  ", 2).unwrap();
        assert!(matches!(
            t.measure("\t\t", 3),
            Err(LexicalError::MixedIndentation { .. })
        ));
    }

    #[test]
    fn test_partial_unit_rejected() {
        let mut t = IndentationTracker::new();
        t.measure("  ", 2).unwrap();
        assert!(matches!(
            t.measure("   ", 3),
            Err(LexicalError::InvalidIndentation { .. })
        ));
    }

    #[test]
    fn test_depth_jump_rejected() {
        let mut t = IndentationTracker::new();
        t.measure(" ", 2).unwrap();
        assert!(matches!(
            t.measure("   ", 3),
            Err(LexicalError::InvalidIndentation { .. })
        ));
    }

    #[test]
    fn test_dedent_of_any_size_allowed() {
        let mut t = IndentationTracker::new();
        t.measure(" ", 2).unwrap();
        t.measure("  ", 3).unwrap();
        t.measure("   ", 4).unwrap();
        assert_eq!(t.measure(" ", 5).unwrap().depth, 1);
    }

    #[test]
    fn test_block_truncates_deep_lines() {
        let mut t = IndentationTracker::new();
        t.measure("  ", 2).unwrap();
        t.set_block(1);
        // Two levels inside a depth-1 block: one unit is structural,
        // the second belongs to the content.
        let m = t.measure("    ", 3).unwrap();
        assert_eq!(m.depth, 1);
        assert_eq!(m.consumed, 2);
        assert!(!m.block_ended);
    }

    #[test]
    fn test_block_accepts_mixed_tail() {
        let mut t = IndentationTracker::new();
        t.measure("\t", 2).unwrap();
        t.set_block(1);
        // Only the structural prefix is checked for consistency.
        let m = t.measure("\t  ", 3).unwrap();
        assert_eq!(m.depth, 1);
        assert_eq!(m.consumed, 1);
    }

    #[test]
    fn test_block_ends_on_dedent() {
        let mut t = IndentationTracker::new();
        t.measure(" ", 2).unwrap();
        t.measure("  ", 3).unwrap();
        t.set_block(2);
        let m = t.measure(" ", 4).unwrap();
        assert!(m.block_ended);
        assert_eq!(m.depth, 1);
        assert_eq!(t.block(), None);
    }

    #[test]
    fn test_unindented_line_ends_block() {
        let mut t = IndentationTracker::new();
        t.measure("  ", 2).unwrap();
        t.set_block(1);
        let m = t.measure_unindented();
        assert!(m.block_ended);
        assert_eq!(m.depth, 0);
    }
}
