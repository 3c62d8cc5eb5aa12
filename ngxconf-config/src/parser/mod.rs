//! Parser module for nginx-style configuration files
//!
//! This module provides the entry tree, the line classifier and the tree
//! builder.

pub mod ast;
pub mod lexer;
pub mod parser;

pub use ast::*;
pub use lexer::{LineComponents, LineKind, Token};
pub use parser::{parse, parse_with_options, BuildError, LineSource, ParseError, Parser, ReaderLines, StrLines};
