//! Source text through lexer, parser and checker.

use typespec_checker::{
    check_source, check_source_with, check_statements, CheckerConfig, ConfigError, Reason,
    Status,
};
use typespec_types::{ErrorCategory, ErrorCode};

fn reasons(source: &str) -> Vec<Option<Reason>> {
    check_source(source, "test.py")
        .report
        .expect("source parses")
        .verdicts()
        .iter()
        .map(|v| v.reason)
        .collect()
}

// ══════════════════════════════════════════════════════════════════════════════
// check_source
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn deeply_nested_source_is_a_syntax_error() {
    let source = format!(
        "x: {}int{} = {}1{}\n",
        "Optional[".repeat(5_000),
        "]".repeat(5_000),
        "[".repeat(5_000),
        "]".repeat(5_000),
    );
    let outcome = check_source(&source, "test.py");
    assert!(outcome.report.is_none());
    let first = &outcome.errors.errors[0];
    assert_eq!(first.code, ErrorCode::NESTING_TOO_DEEP);
    assert_eq!(first.code.category(), ErrorCategory::Syntax);
}

#[test]
fn clean_source_produces_a_report() {
    let outcome = check_source("x: int = 1\ny: str = x\n", "test.py");
    assert!(!outcome.errors.has_errors());
    let report = outcome.report.unwrap();
    assert_eq!(report.len(), 2);
    assert_eq!(report.get(1).unwrap().status, Status::Err);
}

#[test]
fn syntax_errors_suppress_the_report() {
    let outcome = check_source("x: int = 1\ny = = 2\n", "test.py");
    assert!(outcome.errors.has_errors());
    assert!(outcome.report.is_none());
    assert_eq!(outcome.errors.errors[0].category, ErrorCategory::Syntax);
}

#[test]
fn check_statements_matches_check_source() {
    let source = "def f(x: int) -> str:\n    pass\nf(1)\nf()\n";
    let outcome = check_source(source, "test.py");
    let again = check_statements(&outcome.module, &CheckerConfig::default());
    assert_eq!(Some(again), outcome.report);
}

#[test]
fn imports_produce_no_verdicts() {
    let source = "from typing import Union\nimport typing\nx: typing.Union[int, str] = 1\n";
    assert_eq!(reasons(source), vec![None]);
}

#[test]
fn each_reason_is_reachable() {
    let source = "\
x: int = \"a\"
d: Literal[1, 2] = 3
def f(a: int) -> None:
    pass
f(1, 2)
g(1)
y: Literal[1.5] = 1
";
    assert_eq!(
        reasons(source),
        vec![
            Some(Reason::KindMismatch),
            Some(Reason::LiteralOutOfRange),
            None,
            Some(Reason::ArityMismatch),
            Some(Reason::UnresolvedName),
            Some(Reason::InvalidAnnotation),
        ]
    );
}

// ══════════════════════════════════════════════════════════════════════════════
// Diagnostics
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn rejected_statements_become_diagnostics() {
    let outcome = check_source("x: int = 1\ny: Optional[int] = \"a\"\nz: Bogus = 1\n", "test.py");
    let diagnostics = outcome.diagnostics();
    assert_eq!(diagnostics.total_errors, 2);

    let mismatch = &diagnostics.errors[0];
    assert_eq!(mismatch.code, ErrorCode::KIND_MISMATCH);
    assert_eq!(mismatch.category, ErrorCategory::Check);
    assert_eq!(mismatch.file, "test.py");
    assert_eq!(mismatch.span.start_line, 2);
    assert_eq!(mismatch.source_line, "y: Optional[int] = \"a\"");

    let unknown = &diagnostics.errors[1];
    assert_eq!(unknown.code, ErrorCode::UNKNOWN_TYPE);
    assert_eq!(unknown.category, ErrorCategory::Annotation);
}

#[test]
fn diagnostics_keep_syntax_errors() {
    let outcome = check_source("def f(x) -> int:\n    pass\n", "test.py");
    let diagnostics = outcome.diagnostics();
    assert!(diagnostics.has_errors());
    assert_eq!(diagnostics.errors[0].code, ErrorCode::MISSING_ANNOTATION);
}

// ══════════════════════════════════════════════════════════════════════════════
// Configuration
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn covariant_list_from_config() {
    let config = CheckerConfig::from_json(
        r#"{
            "containers": {
                "list": { "variance": "covariant", "bases": ["Iterable"] },
                "Iterable": { "variance": "covariant" }
            },
            "aliases": {}
        }"#,
    )
    .unwrap();
    let source = "xs: list[int | str] = [1]\n";

    let strict = check_source(source, "test.py").report.unwrap();
    assert_eq!(strict.get(0).unwrap().reason, Some(Reason::KindMismatch));

    let relaxed = check_source_with(source, "test.py", &config).report.unwrap();
    assert_eq!(relaxed.get(0).unwrap().status, Status::Ok);
}

#[test]
fn unregistered_container_is_an_unknown_type() {
    let config = CheckerConfig::from_json(
        r#"{ "containers": { "list": { "variance": "invariant" } }, "aliases": {} }"#,
    )
    .unwrap();
    let report = check_source_with("xs: Iterable[int] = [1]\n", "test.py", &config)
        .report
        .unwrap();
    let verdict = report.get(0).unwrap();
    assert_eq!(verdict.reason, Some(Reason::InvalidAnnotation));
    assert_eq!(verdict.code, Some(ErrorCode::UNKNOWN_TYPE));
}

#[test]
fn invalid_configs_are_rejected() {
    let unknown_base = CheckerConfig::from_json(
        r#"{ "containers": { "list": { "variance": "invariant", "bases": ["Nope"] } } }"#,
    );
    assert!(matches!(unknown_base, Err(ConfigError::UnknownBase { .. })));

    let bad_json = CheckerConfig::from_json(r#"{ "containers": 3 }"#);
    assert!(matches!(bad_json, Err(ConfigError::Json(_))));

    let unknown_field = CheckerConfig::from_json(r#"{ "variance": "covariant" }"#);
    assert!(matches!(unknown_field, Err(ConfigError::Json(_))));
}

#[test]
fn default_config_round_trips_through_json() {
    let config = CheckerConfig::default();
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(CheckerConfig::from_json(&json).unwrap(), config);
}
