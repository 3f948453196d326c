//! # haml
//!
//! A compiler for the haml templating format: an indentation-based
//! markup notation compiled to HTML.
//!
//! Compilation is a single synchronous pass. The scanner turns source
//! text into tokens, the parser reduces the token stream into document
//! nodes and immediately lowers each node into instructions as nesting
//! depth changes, and a small runtime executes the instruction list
//! against an expression evaluator to produce the final text.
//!
//! ```rust,ignore
//! use haml::Engine;
//!
//! let engine = Engine::default();
//! assert_eq!(engine.to_html("%p hello").unwrap(), "<p>hello</p>\n");
//! ```

pub mod haml;

pub use haml::config::{Format, Options};
pub use haml::engine::Engine;
pub use haml::error::HamlError;
