//! Shine Parser - Unicorn script frontend.
//!
//! Tokenizes with nom combinators, then builds a typed AST with a
//! recursive-descent parser. Nested blocks are fully supported.

pub mod ast;
mod error;
mod lexer;
mod parser;

pub use error::ParseError;
pub use lexer::{SpannedToken, Token, tokenize};
pub use parser::parse_program;
