//! Fixture harness: compares verdicts with trailing `# OK` / `# ERR` comments.

use serde::Serialize;
use tracing::{info, warn};
use typespec_types::ast::Expectation;
use typespec_types::{CheckErrors, ErrorCode, TypespecError};

use crate::config::CheckerConfig;
use crate::verdict::{Verdict, VerdictReport};
use crate::{check_source_with, CheckOutcome};

/// One annotated statement and what the checker said about it.
#[derive(Debug, Clone, Serialize)]
pub struct ExpectationCheck {
    pub expected: Expectation,
    pub verdict: Verdict,
}

impl ExpectationCheck {
    pub fn matched(&self) -> bool {
        self.verdict.matches(self.expected)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FixtureResult {
    pub file: String,
    /// Lexer and parser errors. When present, nothing was checked.
    pub syntax_errors: CheckErrors,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<VerdictReport>,
    /// Annotated statements in source order.
    pub expectations: Vec<ExpectationCheck>,
    /// One E400 diagnostic per disagreeing statement.
    pub mismatches: CheckErrors,
}

impl FixtureResult {
    pub fn passed(&self) -> bool {
        !self.syntax_errors.has_errors() && !self.mismatches.has_errors()
    }

    pub fn matched_count(&self) -> usize {
        self.expectations.iter().filter(|e| e.matched()).count()
    }
}

/// Check `source` and compare every annotated statement's verdict with its
/// expectation.
pub fn run_fixture(source: &str, file_name: &str, config: &CheckerConfig) -> FixtureResult {
    let outcome = check_source_with(source, file_name, config);
    compare(outcome)
}

fn compare(outcome: CheckOutcome) -> FixtureResult {
    let CheckOutcome {
        source_file,
        module,
        errors,
        report,
    } = outcome;

    let mut expectations = Vec::new();
    let mut mismatches = CheckErrors::empty();
    if let Some(report) = &report {
        for (index, expected) in module.expectations() {
            let Some(verdict) = report.get(index) else {
                continue;
            };
            let check = ExpectationCheck {
                expected,
                verdict: verdict.clone(),
            };
            if !check.matched() {
                warn!(file = %source_file.name, line = verdict.span.start_line, %expected, got = %verdict.status, "expectation mismatch");
                mismatches.push_error(mismatch_error(&source_file, &check));
            }
            expectations.push(check);
        }
        info!(
            file = %source_file.name,
            expectations = expectations.len(),
            mismatches = mismatches.total_errors,
            "fixture checked"
        );
    }

    FixtureResult {
        file: source_file.name,
        syntax_errors: errors,
        report,
        expectations,
        mismatches,
    }
}

fn mismatch_error(
    source_file: &typespec_types::SourceFile,
    check: &ExpectationCheck,
) -> TypespecError {
    let verdict = &check.verdict;
    let mut message = format!("expected {}, checker reported {}", check.expected, verdict.status);
    if let (Some(reason), Some(detail)) = (verdict.reason, &verdict.message) {
        message.push_str(&format!(" [{reason}]: {detail}"));
    }
    let error = TypespecError::new(
        &source_file.name,
        ErrorCode::EXPECTATION_MISMATCH,
        message,
        verdict.span,
        source_file.line_for(verdict.span),
    );
    match check.expected {
        Expectation::Ok => error,
        Expectation::Err => error.with_suggestion("the checker accepted this statement"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &str) -> FixtureResult {
        run_fixture(source, "t.py", &CheckerConfig::default())
    }

    #[test]
    fn test_all_expectations_met() {
        let result = run("x: int = 1 # OK\ny: str = 1 # ERR\nz: int = 2\n");
        assert!(result.passed());
        assert_eq!(result.expectations.len(), 2);
        assert_eq!(result.matched_count(), 2);
    }

    #[test]
    fn test_mismatch_is_reported() {
        let result = run("x: int = \"a\" # OK\ny: int = 1 # ERR\n");
        assert!(!result.passed());
        assert_eq!(result.mismatches.total_errors, 2);
        let first = &result.mismatches.errors[0];
        assert_eq!(first.code, ErrorCode::EXPECTATION_MISMATCH);
        assert_eq!(first.span.start_line, 1);
        assert_eq!(first.source_line, "x: int = \"a\" # OK");
        assert!(first.message.starts_with("expected OK, checker reported ERR [kind-mismatch]"));
        assert!(first.suggestion.is_none());
        assert!(result.mismatches.errors[1].suggestion.is_some());
    }

    #[test]
    fn test_syntax_errors_skip_checking() {
        let result = run("x: int = = 1 # OK\n");
        assert!(!result.passed());
        assert!(result.syntax_errors.has_errors());
        assert!(result.report.is_none());
        assert!(result.expectations.is_empty());
    }

    #[test]
    fn test_serializes_to_json() {
        let result = run("x: int = 1 # OK\n");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["file"], "t.py");
        assert_eq!(json["expectations"][0]["expected"], "OK");
        assert_eq!(json["expectations"][0]["verdict"]["status"], "OK");
    }
}
