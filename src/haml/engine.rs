//! Compile and render entry points.
//!
//! An `Engine` pairs a set of options with the two pipeline stages:
//! `compile` turns source text into an instruction list, `execute` runs
//! an instruction list against an evaluator and bindings. All per-run
//! state (lexer, parser context, render state) is constructed fresh
//! inside each call, so one engine can compile many templates and a
//! failed run leaves nothing behind.

use crate::haml::config::Options;
use crate::haml::error::HamlError;
use crate::haml::evaluator::{Bindings, Evaluator, LiteralEvaluator};
use crate::haml::ir::Program;
use crate::haml::parsing;
use crate::haml::runtime;

pub struct Engine {
    options: Options,
}

impl Engine {
    pub fn new(options: Options) -> Self {
        Engine { options }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Compile source text into an instruction list.
    pub fn compile(&self, source: &str) -> Result<Program, HamlError> {
        parsing::parse(source, &self.options)
    }

    /// Execute a compiled program against an evaluator and bindings.
    pub fn execute(
        &self,
        program: &Program,
        evaluator: &mut dyn Evaluator,
        bindings: Bindings,
    ) -> Result<String, HamlError> {
        runtime::execute(program, &self.options, evaluator, bindings)
    }

    /// Compile and render in one step with the literal evaluator.
    pub fn to_html(&self, source: &str) -> Result<String, HamlError> {
        self.to_html_with(source, Bindings::new())
    }

    /// Compile and render with the literal evaluator and the given
    /// bindings.
    pub fn to_html_with(&self, source: &str, bindings: Bindings) -> Result<String, HamlError> {
        let source = source.trim();
        if source.is_empty() {
            return Ok(String::new());
        }
        let program = self.compile(source)?;
        let mut evaluator = LiteralEvaluator;
        self.execute(&program, &mut evaluator, bindings)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new(Options::default())
    }
}
