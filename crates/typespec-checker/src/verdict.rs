//! Verdicts and the reporter that orders them.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use typespec_types::ast::Expectation;
use typespec_types::{ErrorCode, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Ok,
    Err,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ok => f.write_str("OK"),
            Status::Err => f.write_str("ERR"),
        }
    }
}

/// Why a statement was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Reason {
    KindMismatch,
    LiteralOutOfRange,
    ArityMismatch,
    UnresolvedName,
    /// The statement's own annotation could not be normalized.
    InvalidAnnotation,
}

impl Reason {
    pub fn as_str(self) -> &'static str {
        match self {
            Reason::KindMismatch => "kind-mismatch",
            Reason::LiteralOutOfRange => "literal-out-of-range",
            Reason::ArityMismatch => "arity-mismatch",
            Reason::UnresolvedName => "unresolved-name",
            Reason::InvalidAnnotation => "invalid-annotation",
        }
    }

    /// Diagnostic code for the checker-time reasons. Annotation failures carry
    /// the normalizer's own code instead.
    pub fn code(self) -> ErrorCode {
        match self {
            Reason::KindMismatch => ErrorCode::KIND_MISMATCH,
            Reason::LiteralOutOfRange => ErrorCode::LITERAL_OUT_OF_RANGE,
            Reason::ArityMismatch => ErrorCode::ARITY_MISMATCH,
            Reason::UnresolvedName => ErrorCode::UNRESOLVED_NAME,
            Reason::InvalidAnnotation => ErrorCode::MALFORMED_ANNOTATION,
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome for one statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Index of the statement in its module.
    pub index: usize,
    #[serde(flatten)]
    pub span: Span,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reason: Option<Reason>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub code: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
}

impl Verdict {
    pub fn ok(index: usize, span: Span) -> Self {
        Self {
            index,
            span,
            status: Status::Ok,
            reason: None,
            code: None,
            message: None,
        }
    }

    pub fn err(index: usize, span: Span, reason: Reason, message: impl Into<String>) -> Self {
        Self {
            index,
            span,
            status: Status::Err,
            reason: Some(reason),
            code: Some(reason.code()),
            message: Some(message.into()),
        }
    }

    /// Replace the diagnostic code derived from the reason.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    /// Does this verdict agree with a written `# OK` / `# ERR`?
    pub fn matches(&self, expected: Expectation) -> bool {
        matches!(
            (self.status, expected),
            (Status::Ok, Expectation::Ok) | (Status::Err, Expectation::Err)
        )
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{} {}", self.span, self.index, self.status)?;
        if let Some(reason) = self.reason {
            write!(f, " [{reason}]")?;
        }
        if let Some(code) = self.code {
            write!(f, " {code}")?;
        }
        if let Some(message) = &self.message {
            write!(f, " {message}")?;
        }
        Ok(())
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Reporter
// ══════════════════════════════════════════════════════════════════════════════

/// Collects verdicts as the checker produces them.
#[derive(Debug, Default)]
pub struct VerdictReporter {
    verdicts: Vec<Verdict>,
}

impl VerdictReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, verdict: Verdict) {
        self.verdicts.push(verdict);
    }

    /// Finish, ordering verdicts by statement index.
    pub fn report(mut self) -> VerdictReport {
        self.verdicts.sort_by_key(|v| v.index);
        VerdictReport {
            verdicts: self.verdicts,
        }
    }
}

/// Ordered verdicts of one pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerdictReport {
    verdicts: Vec<Verdict>,
}

impl VerdictReport {
    pub fn verdicts(&self) -> &[Verdict] {
        &self.verdicts
    }

    /// The verdict for statement `index`.
    pub fn get(&self, index: usize) -> Option<&Verdict> {
        self.verdicts
            .binary_search_by_key(&index, |v| v.index)
            .ok()
            .map(|i| &self.verdicts[i])
    }

    pub fn len(&self) -> usize {
        self.verdicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }

    pub fn ok_count(&self) -> usize {
        self.verdicts.iter().filter(|v| v.is_ok()).count()
    }

    pub fn err_count(&self) -> usize {
        self.len() - self.ok_count()
    }

    pub fn count_reason(&self, reason: Reason) -> usize {
        self.verdicts
            .iter()
            .filter(|v| v.reason == Some(reason))
            .count()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// SHA-256 of the compact JSON form, hex encoded.
    pub fn digest(&self) -> serde_json::Result<String> {
        let bytes = serde_json::to_vec(self)?;
        let hash = Sha256::digest(&bytes);
        Ok(hash.iter().map(|b| format!("{b:02x}")).collect())
    }
}

impl<'a> IntoIterator for &'a VerdictReport {
    type Item = &'a Verdict;
    type IntoIter = std::slice::Iter<'a, Verdict>;

    fn into_iter(self) -> Self::IntoIter {
        self.verdicts.iter()
    }
}
