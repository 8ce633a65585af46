use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Maximum number of diagnostics stored before further ones are only counted.
pub const MAX_ERRORS: usize = 20;

/// Diagnostic category, determined by error code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Syntax,
    Annotation,
    Check,
    Expectation,
}

/// Numeric error code (E100–E499).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Syntax errors (E100–E199) ──
    pub const UNEXPECTED_TOKEN: Self = Self(100);
    pub const UNTERMINATED_STRING: Self = Self(101);
    pub const UNEXPECTED_CHARACTER: Self = Self(102);
    pub const MISSING_ANNOTATION: Self = Self(103);
    pub const UNEXPECTED_INDENT: Self = Self(104);
    pub const NESTING_TOO_DEEP: Self = Self(105);

    // ── Annotation errors (E200–E299) ──
    pub const UNKNOWN_TYPE: Self = Self(200);
    pub const WRONG_TYPE_ARITY: Self = Self(201);
    pub const INVALID_LITERAL_KIND: Self = Self(202);
    pub const MALFORMED_ANNOTATION: Self = Self(203);

    // ── Check errors (E300–E399) ──
    pub const KIND_MISMATCH: Self = Self(300);
    pub const LITERAL_OUT_OF_RANGE: Self = Self(301);
    pub const ARITY_MISMATCH: Self = Self(302);
    pub const UNRESOLVED_NAME: Self = Self(303);

    // ── Expectation errors (E400–E499) ──
    pub const EXPECTATION_MISMATCH: Self = Self(400);

    pub fn category(self) -> ErrorCategory {
        match self.0 {
            200..=299 => ErrorCategory::Annotation,
            300..=399 => ErrorCategory::Check,
            400..=499 => ErrorCategory::Expectation,
            _ => ErrorCategory::Syntax,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => write!(f, "syntax"),
            Self::Annotation => write!(f, "annotation"),
            Self::Check => write!(f, "check"),
            Self::Expectation => write!(f, "expectation"),
        }
    }
}

/// A structured typespec diagnostic.
///
/// Consumers render these from their fields; the message is for humans only.
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
#[error("{span}: {code} [{category}] {message}")]
pub struct TypespecError {
    /// Source file name.
    pub file: String,
    pub code: ErrorCode,
    /// Derived from `code`.
    pub category: ErrorCategory,
    pub message: String,
    #[serde(flatten)]
    pub span: Span,
    /// The source line the span starts on.
    pub source_line: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl TypespecError {
    pub fn new(
        file: impl Into<String>,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        source_line: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            code,
            category: code.category(),
            message: message.into(),
            span,
            source_line: source_line.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Diagnostics collected by one stage of the pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckErrors {
    pub errors: Vec<TypespecError>,
    pub total_errors: usize,
}

impl CheckErrors {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    /// Returns `true` once [`MAX_ERRORS`] errors have been recorded.
    pub fn is_saturated(&self) -> bool {
        self.total_errors >= MAX_ERRORS
    }

    /// Add an error. Only the first [`MAX_ERRORS`] are stored; all are counted.
    pub fn push_error(&mut self, error: TypespecError) {
        if self.errors.len() < MAX_ERRORS {
            self.errors.push(error);
        }
        self.total_errors += 1;
    }

    /// Append everything from `other`, keeping the storage cap.
    pub fn extend(&mut self, other: CheckErrors) {
        let uncounted = other.total_errors.saturating_sub(other.errors.len());
        for error in other.errors {
            self.push_error(error);
        }
        self.total_errors += uncounted;
    }
}
