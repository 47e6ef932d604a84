//! Query parser for the supported SQL subset
//!
//! Only `SELECT ... FROM` over one collection or one equality join, with
//! equality filters joined by AND and an optional single-stage GROUP BY.
//! Anything outside that shape is a parse error; the parser never tries to
//! recover or to accept general SQL.

mod ast;
mod errors;
mod lexer;
mod parser;

pub use ast::{FilterPredicate, JoinPredicate, ParsedQuery};
pub use errors::{ParseError, ParseErrorCode, ParseResult};
pub use lexer::{tokenize, Token, TokenKind};
pub use parser::parse_query;
