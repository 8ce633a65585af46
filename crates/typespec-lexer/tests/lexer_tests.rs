//! Lexer tests over the fixture subset: keywords, literals, punctuation,
//! comments, bracket-aware newlines, error recovery, determinism.

use typespec_lexer::{Lexer, TokenKind, ALL_KEYWORDS};
use typespec_types::{ErrorCode, SourceFile, Span};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

/// Lex source text and return the token kinds without the final Eof.
fn kinds(source: &str) -> Vec<TokenKind> {
    let sf = SourceFile::new("test.py", source);
    Lexer::new(&sf)
        .lex()
        .tokens
        .into_iter()
        .filter(|t| t.kind != TokenKind::Eof)
        .map(|t| t.kind)
        .collect()
}

fn error_codes(source: &str) -> Vec<ErrorCode> {
    let sf = SourceFile::new("test.py", source);
    Lexer::new(&sf)
        .lex()
        .errors
        .errors
        .iter()
        .map(|e| e.code)
        .collect()
}

fn ident(name: &str) -> TokenKind {
    TokenKind::Identifier(name.to_string())
}

// ─────────────────────────────────────────────────────────────────────
// Keywords & identifiers
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_every_keyword_lexes_to_its_token() {
    for &kw in ALL_KEYWORDS {
        let k = kinds(kw);
        assert_eq!(k.len(), 1, "keyword '{kw}'");
        assert!(k[0].is_keyword(), "'{kw}' should be a keyword token");
        assert_eq!(k[0].to_string(), kw);
    }
}

#[test]
fn test_typing_names_are_identifiers() {
    assert_eq!(
        kinds("Union Optional Literal Callable Iterable _"),
        vec![
            ident("Union"),
            ident("Optional"),
            ident("Literal"),
            ident("Callable"),
            ident("Iterable"),
            ident("_"),
        ]
    );
}

#[test]
fn test_soft_python_keywords_are_identifiers() {
    assert_eq!(kinds("if"), vec![ident("if")]);
    assert_eq!(kinds("lambda"), vec![ident("lambda")]);
}

#[test]
fn test_unicode_identifier() {
    assert_eq!(kinds("größe"), vec![ident("größe")]);
}

// ─────────────────────────────────────────────────────────────────────
// Numbers
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_integer_forms() {
    assert_eq!(
        kinds("0 42 1_000 0x2A 0o17 0b101"),
        vec![
            TokenKind::IntLit(0),
            TokenKind::IntLit(42),
            TokenKind::IntLit(1000),
            TokenKind::IntLit(42),
            TokenKind::IntLit(15),
            TokenKind::IntLit(5),
        ]
    );
}

#[test]
fn test_float_forms() {
    assert_eq!(
        kinds("1.5 .5 2e3 1.5e-2"),
        vec![
            TokenKind::FloatLit(1.5),
            TokenKind::FloatLit(0.5),
            TokenKind::FloatLit(2000.0),
            TokenKind::FloatLit(0.015),
        ]
    );
}

#[test]
fn test_negative_number_is_minus_then_literal() {
    assert_eq!(kinds("-7"), vec![TokenKind::Minus, TokenKind::IntLit(7)]);
}

#[test]
fn test_integer_overflow_is_reported() {
    let codes = error_codes("x = 99999999999999999999");
    assert_eq!(codes, vec![ErrorCode::UNEXPECTED_TOKEN]);
}

// ─────────────────────────────────────────────────────────────────────
// Strings
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_single_and_double_quoted_strings() {
    assert_eq!(
        kinds(r#""aa" 'b'"#),
        vec![
            TokenKind::StringLiteral("aa".into()),
            TokenKind::StringLiteral("b".into()),
        ]
    );
}

#[test]
fn test_string_escapes() {
    assert_eq!(
        kinds(r#""a\n\"b\"\\""#),
        vec![TokenKind::StringLiteral("a\n\"b\"\\".into())]
    );
}

#[test]
fn test_triple_quoted_string_spans_lines() {
    let k = kinds("\"\"\"one\ntwo\"\"\"");
    assert_eq!(k, vec![TokenKind::StringLiteral("one\ntwo".into())]);
}

#[test]
fn test_prefixed_strings() {
    assert_eq!(
        kinds(r#"b"raw" f"x{y}" rb"\d""#),
        vec![
            TokenKind::BytesLiteral("raw".into()),
            TokenKind::FormattedString("x{y}".into()),
            TokenKind::BytesLiteral("\\d".into()),
        ]
    );
}

#[test]
fn test_unterminated_string_is_reported() {
    assert_eq!(
        error_codes("x: str = \"abc\n"),
        vec![ErrorCode::UNTERMINATED_STRING]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Punctuation
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_annotation_punctuation() {
    assert_eq!(
        kinds("Callable[[int | str], None]"),
        vec![
            ident("Callable"),
            TokenKind::LBracket,
            TokenKind::LBracket,
            ident("int"),
            TokenKind::Pipe,
            ident("str"),
            TokenKind::RBracket,
            TokenKind::Comma,
            TokenKind::None,
            TokenKind::RBracket,
        ]
    );
}

#[test]
fn test_def_header_punctuation() {
    assert_eq!(
        kinds("def f(x: int) -> None:"),
        vec![
            TokenKind::Def,
            ident("f"),
            TokenKind::LParen,
            ident("x"),
            TokenKind::Colon,
            ident("int"),
            TokenKind::RParen,
            TokenKind::Arrow,
            TokenKind::None,
            TokenKind::Colon,
        ]
    );
}

#[test]
fn test_eq_versus_double_eq() {
    assert_eq!(
        kinds("a = b == c"),
        vec![
            ident("a"),
            TokenKind::Eq,
            ident("b"),
            TokenKind::Operator('='),
            ident("c"),
        ]
    );
}

#[test]
fn test_dotted_module_path() {
    assert_eq!(
        kinds("collections.abc"),
        vec![ident("collections"), TokenKind::Dot, ident("abc")]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Comments & newlines
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_trailing_comment_carries_text() {
    assert_eq!(
        kinds("f(1) # OK"),
        vec![
            ident("f"),
            TokenKind::LParen,
            TokenKind::IntLit(1),
            TokenKind::RParen,
            TokenKind::Comment(" OK".into()),
        ]
    );
}

#[test]
fn test_crlf_comment_text_is_trimmed() {
    assert_eq!(
        kinds("# ERR\r\n"),
        vec![TokenKind::Comment(" ERR".into()), TokenKind::Newline]
    );
}

#[test]
fn test_newlines_inside_brackets_are_dropped() {
    let k = kinds("x = [\n  1,  # first\n  2,\n]\n");
    assert_eq!(
        k,
        vec![
            ident("x"),
            TokenKind::Eq,
            TokenKind::LBracket,
            TokenKind::IntLit(1),
            TokenKind::Comma,
            TokenKind::IntLit(2),
            TokenKind::Comma,
            TokenKind::RBracket,
            TokenKind::Newline,
        ]
    );
}

#[test]
fn test_backslash_joins_lines() {
    assert_eq!(
        kinds("a = \\\n  1"),
        vec![ident("a"), TokenKind::Eq, TokenKind::IntLit(1)]
    );
}

#[test]
fn test_blank_lines_produce_newlines() {
    assert_eq!(
        kinds("\n\n"),
        vec![TokenKind::Newline, TokenKind::Newline]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Spans
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_spans_track_indentation() {
    let sf = SourceFile::new("test.py", "def f() -> int:\n    return 1\n");
    let tokens = Lexer::new(&sf).lex().tokens;
    let ret = tokens
        .iter()
        .find(|t| t.kind == TokenKind::Return)
        .expect("return token");
    assert_eq!(ret.span, Span::new(2, 5, 2, 10));
}

#[test]
fn test_eof_is_always_last() {
    for src in ["", "x", "x\n", "\"open"] {
        let sf = SourceFile::new("test.py", src);
        let tokens = Lexer::new(&sf).lex().tokens;
        assert_eq!(tokens.last().map(|t| &t.kind), Some(&TokenKind::Eof), "{src:?}");
    }
}

// ─────────────────────────────────────────────────────────────────────
// Error recovery
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_unexpected_character_recovers() {
    let sf = SourceFile::new("test.py", "x = $ 1");
    let result = Lexer::new(&sf).lex();
    assert_eq!(result.errors.total_errors, 1);
    assert_eq!(result.errors.errors[0].code, ErrorCode::UNEXPECTED_CHARACTER);
    let k: Vec<_> = result.tokens.into_iter().map(|t| t.kind).collect();
    assert_eq!(
        k,
        vec![ident("x"), TokenKind::Eq, TokenKind::IntLit(1), TokenKind::Eof]
    );
}

#[test]
fn test_error_count_is_capped() {
    let src = "$".repeat(50);
    let sf = SourceFile::new("test.py", &src);
    let result = Lexer::new(&sf).lex();
    assert!(result.errors.is_saturated());
    assert!(result.errors.errors.len() <= typespec_types::MAX_ERRORS);
}

// ─────────────────────────────────────────────────────────────────────
// Whole fixture & determinism
// ─────────────────────────────────────────────────────────────────────

const FIXTURE: &str = include_str!("../../../tests/fixtures/typespec.py");

#[test]
fn test_fixture_lexes_cleanly() {
    let sf = SourceFile::new("typespec.py", FIXTURE);
    let result = Lexer::new(&sf).lex();
    assert!(!result.errors.has_errors(), "{:?}", result.errors.errors);
    let comments = result
        .tokens
        .iter()
        .filter(|t| matches!(t.kind, TokenKind::Comment(_)))
        .count();
    assert_eq!(comments, 14);
}

#[test]
fn test_lexing_is_deterministic() {
    let sf = SourceFile::new("typespec.py", FIXTURE);
    let first = Lexer::new(&sf).lex().tokens;
    for _ in 0..100 {
        assert_eq!(Lexer::new(&sf).lex().tokens, first);
    }
}
