//! typespec parser: converts a token stream into annotated statements.

mod parse_decl;
mod parse_expr;
mod parse_stmt;
mod parse_type;
mod parser;

pub use parser::{ParseResult, Parser, MAX_NESTING_DEPTH};
