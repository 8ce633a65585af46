//! Shared types for typespec.
//!
//! This crate defines the statement-level syntax tree, source spans and
//! structured diagnostics used by the lexer, the parser and the checker.

mod error;
mod span;
pub mod ast;

pub use error::{CheckErrors, ErrorCategory, ErrorCode, TypespecError, MAX_ERRORS};
pub use span::{SourceFile, Span};
