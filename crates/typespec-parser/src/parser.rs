//! Core parser infrastructure: token cursor, error reporting, line handling.

use typespec_lexer::token::{Token, TokenKind};
use typespec_types::ast::{Expectation, Ident, Module};
use typespec_types::{CheckErrors, ErrorCode, SourceFile, Span, TypespecError};

/// Deepest allowed nesting of brackets, parentheses and `|` chains.
pub const MAX_NESTING_DEPTH: usize = 64;

/// The typespec parser.
///
/// Consumes a token stream produced by the lexer and builds a [`Module`].
/// Errors are collected and parsing resumes at the next line.
pub struct Parser<'src> {
    tokens: Vec<Token>,
    /// Current index into `tokens`.
    pos: usize,
    source_file: &'src SourceFile,
    errors: CheckErrors,
    /// Current nesting of expressions and annotations.
    pub(crate) depth: usize,
}

/// Result of parsing.
pub struct ParseResult {
    /// Every statement that parsed cleanly, in source order.
    pub module: Module,
    pub errors: CheckErrors,
}

impl<'src> Parser<'src> {
    pub fn new(tokens: Vec<Token>, source_file: &'src SourceFile) -> Self {
        Self {
            tokens,
            pos: 0,
            source_file,
            errors: CheckErrors::empty(),
            depth: 0,
        }
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    pub(crate) fn peek(&self) -> &Token {
        static EOF: Token = Token {
            kind: TokenKind::Eof,
            span: Span {
                start_line: 1,
                start_col: 1,
                end_line: 1,
                end_col: 1,
            },
        };
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .unwrap_or(&EOF)
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    /// Advance the cursor by one and return the consumed token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn previous_span(&self) -> Span {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => token.span,
            None => Span::point(1, 1),
        }
    }

    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    pub(crate) fn check_exact(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// If the current token matches, advance and return `true`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check_exact(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn look_ahead(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    // ── Expect Helpers ────────────────────────────────────────────────────────

    pub(crate) fn expect(&mut self, expected: &TokenKind) -> Option<Token> {
        if self.check_exact(expected) {
            Some(self.advance())
        } else {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected '{}', got '{}'", expected, self.peek_kind()),
            );
            None
        }
    }

    pub(crate) fn expect_identifier(&mut self) -> Option<Ident> {
        match self.peek_kind().clone() {
            TokenKind::Identifier(name) => {
                let span = self.advance().span;
                Some(Ident::new(name, span))
            }
            other => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected identifier, got '{other}'"),
                );
                None
            }
        }
    }

    /// `a.b.c` joined into one spanned name.
    pub(crate) fn expect_dotted_name(&mut self) -> Option<Ident> {
        let first = self.expect_identifier()?;
        let mut name = first.name;
        let mut span = first.span;
        while self.check_exact(&TokenKind::Dot) {
            self.advance();
            let part = self.expect_identifier()?;
            name.push('.');
            name.push_str(&part.name);
            span = span.merge(part.span);
        }
        Some(Ident::new(name, span))
    }

    // ── Line Handling ─────────────────────────────────────────────────────────

    /// Skip empty lines and lines holding only a comment.
    pub(crate) fn skip_blank_lines(&mut self) {
        loop {
            match self.peek_kind() {
                TokenKind::Newline => {
                    self.advance();
                }
                TokenKind::Comment(_) if self.look_ahead(1).is_line_end() => {
                    self.advance();
                }
                _ => return,
            }
        }
    }

    /// Consume an optional trailing comment and the end of the line.
    ///
    /// Returns the expectation written in the comment, if any.
    pub(crate) fn finish_line(&mut self) -> Option<Expectation> {
        let mut expectation = None;
        if let TokenKind::Comment(text) = self.peek_kind() {
            expectation = Expectation::from_comment(text);
            self.advance();
        }
        if self.at_end() {
            return expectation;
        }
        if !self.eat(&TokenKind::Newline) {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected end of line, got '{}'", self.peek_kind()),
            );
            self.skip_line();
        }
        expectation
    }

    /// Skip everything up to and including the next newline.
    pub(crate) fn skip_line(&mut self) {
        while !self.at_end() {
            if self.advance().kind == TokenKind::Newline {
                return;
            }
        }
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    pub(crate) fn error_at_current(&mut self, code: ErrorCode, message: impl Into<String>) {
        let span = self.current_span();
        self.error_at(code, message, span);
    }

    pub(crate) fn error_at(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let error = TypespecError::new(
            &self.source_file.name,
            code,
            message,
            span,
            self.source_file.line_for(span),
        );
        self.errors.push_error(error);
    }

    /// Enter one nesting level. Past [`MAX_NESTING_DEPTH`] this reports
    /// `E105`, leaves the depth unchanged and returns `false`.
    pub(crate) fn enter_nesting(&mut self) -> bool {
        if self.depth >= MAX_NESTING_DEPTH {
            self.error_at_current(
                ErrorCode::NESTING_TOO_DEEP,
                format!("maximum nesting depth is {MAX_NESTING_DEPTH}"),
            );
            return false;
        }
        self.depth += 1;
        true
    }

    pub(crate) fn too_many_errors(&self) -> bool {
        self.errors.is_saturated()
    }

    // ── Public API ────────────────────────────────────────────────────────────

    /// Parse the token stream into a [`Module`].
    pub fn parse(mut self) -> ParseResult {
        let module = self.parse_module();
        ParseResult {
            module,
            errors: self.errors,
        }
    }
}
