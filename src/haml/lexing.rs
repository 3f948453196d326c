//! Lexing: the mode-stacked scanner and its sub-protocols.

pub mod fragments;
pub mod indentation;
pub mod scanner;

pub use scanner::{tokenize, Lexer};
