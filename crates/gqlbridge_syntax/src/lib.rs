//! Syntax layer for gqlbridge.
//!
//! This crate provides:
//! - `token`: Token kinds and token structures
//! - `lexer`: Tokenization and string value decoding
//! - `ast`: Abstract syntax tree types
//! - `parser`: Recursive descent parser for executable and SDL documents

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::*;
pub use lexer::{EscapeError, LexError, Lexer};
pub use parser::{parse, ParseResult};
pub use token::{Token, TokenKind};
