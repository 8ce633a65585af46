//! Core typespec lexer: converts fixture source text to a token stream.
//!
//! Features:
//! - Python-style literals: integers (decimal, hex, octal, binary, `_`
//!   separators), floats, single/double/triple-quoted strings with `r`, `b`
//!   and `f` prefixes
//! - `#` comments are emitted as [`TokenKind::Comment`] so the parser can read
//!   `# OK` / `# ERR` expectations
//! - Implicit line joining: no newlines or comments inside `()`, `[]`, `{}`
//! - Explicit line joining with a trailing `\`
//! - Error recovery: collects up to [`typespec_types::MAX_ERRORS`] errors

use typespec_types::{CheckErrors, ErrorCode, SourceFile, Span, TypespecError};

use crate::token::{Token, TokenKind};

/// How the body of a string literal is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StringFlavor {
    raw: bool,
    bytes: bool,
    formatted: bool,
}

impl StringFlavor {
    const PLAIN: Self = Self {
        raw: false,
        bytes: false,
        formatted: false,
    };

    /// Parses a string prefix such as `r`, `b`, `rb` or `f`.
    fn from_prefix(prefix: &str) -> Option<Self> {
        let lower = prefix.to_ascii_lowercase();
        let flavor = match lower.as_str() {
            "r" => Self { raw: true, ..Self::PLAIN },
            "u" => Self::PLAIN,
            "b" => Self { bytes: true, ..Self::PLAIN },
            "br" | "rb" => Self { raw: true, bytes: true, formatted: false },
            "f" => Self { formatted: true, ..Self::PLAIN },
            "fr" | "rf" => Self { raw: true, bytes: false, formatted: true },
            _ => return None,
        };
        Some(flavor)
    }
}

/// The typespec lexer.
pub struct Lexer<'src> {
    source: &'src [u8],
    source_file: &'src SourceFile,
    /// Current byte offset into `source`.
    pos: usize,
    /// Current line (1-based).
    line: u32,
    /// Current column in characters (1-based).
    col: u32,
    /// Open bracket depth; newlines are insignificant while positive.
    depth: u32,
    errors: CheckErrors,
}

/// Result of lexing: tokens + any errors collected.
pub struct LexResult {
    /// The token stream (always ends with [`TokenKind::Eof`]).
    pub tokens: Vec<Token>,
    pub errors: CheckErrors,
}

impl<'src> Lexer<'src> {
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            source: source_file.source.as_bytes(),
            source_file,
            pos: 0,
            line: 1,
            col: 1,
            depth: 0,
            errors: CheckErrors::empty(),
        }
    }

    /// Lex the entire source file into a token stream.
    pub fn lex(mut self) -> LexResult {
        let mut tokens = Vec::new();

        loop {
            if self.errors.is_saturated() {
                break;
            }
            let token = self.scan_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            tokens.push(Token::new(TokenKind::Eof, self.current_span()));
        }

        LexResult {
            tokens,
            errors: self.errors,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.source.get(self.pos).copied()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else if ch & 0xC0 != 0x80 {
            // UTF-8 continuation bytes do not start a new column.
            self.col += 1;
        }
        Some(ch)
    }

    fn current_span(&self) -> Span {
        Span::point(self.line, self.col)
    }

    fn span_from(&self, start_line: u32, start_col: u32) -> Span {
        Span::new(
            start_line,
            start_col,
            self.line,
            self.col.saturating_sub(1).max(1),
        )
    }

    fn text(&self, start: usize) -> String {
        String::from_utf8_lossy(&self.source[start..self.pos]).into_owned()
    }

    fn emit_error(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let err = TypespecError::new(
            &self.source_file.name,
            code,
            message,
            span,
            self.source_file.line_for(span),
        );
        self.errors.push_error(err);
    }

    // ─────────────────────────────────────────────────────────────
    // Whitespace & line joining
    // ─────────────────────────────────────────────────────────────

    /// Skip blanks, explicit line joins, and anything insignificant inside
    /// brackets (newlines and comments).
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(b' ' | b'\t' | b'\r' | b'\x0c') => {
                    self.advance();
                }
                Some(b'\\') if self.peek_at(1) == Some(b'\n') => {
                    self.advance();
                    self.advance();
                }
                Some(b'\\') if self.peek_at(1) == Some(b'\r') && self.peek_at(2) == Some(b'\n') => {
                    self.advance();
                    self.advance();
                    self.advance();
                }
                Some(b'\n') if self.depth > 0 => {
                    self.advance();
                }
                Some(b'#') if self.depth > 0 => self.skip_to_line_end(),
                _ => break,
            }
        }
    }

    fn skip_to_line_end(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == b'\n' {
                break;
            }
            self.advance();
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Token scanning
    // ─────────────────────────────────────────────────────────────

    fn scan_token(&mut self) -> Token {
        self.skip_trivia();

        let start = self.pos;
        let start_line = self.line;
        let start_col = self.col;
        let Some(ch) = self.advance() else {
            return Token::new(TokenKind::Eof, self.current_span());
        };

        let kind = match ch {
            b'\n' => TokenKind::Newline,

            b'#' => {
                self.skip_to_line_end();
                let text = self.text(start + 1).trim_end_matches('\r').to_string();
                TokenKind::Comment(text)
            }

            b'"' | b'\'' => {
                return self.scan_string(ch, StringFlavor::PLAIN, start_line, start_col);
            }

            b'0'..=b'9' => return self.scan_number(start, start_line, start_col),
            b'.' if matches!(self.peek(), Some(b'0'..=b'9')) => {
                return self.scan_number(start, start_line, start_col);
            }

            b'a'..=b'z' | b'A'..=b'Z' | b'_' | 0x80..=0xFF => {
                return self.scan_identifier(start, start_line, start_col);
            }

            b'(' | b'[' | b'{' => {
                self.depth += 1;
                match ch {
                    b'(' => TokenKind::LParen,
                    b'[' => TokenKind::LBracket,
                    _ => TokenKind::LBrace,
                }
            }
            b')' | b']' | b'}' => {
                self.depth = self.depth.saturating_sub(1);
                match ch {
                    b')' => TokenKind::RParen,
                    b']' => TokenKind::RBracket,
                    _ => TokenKind::RBrace,
                }
            }

            b',' => TokenKind::Comma,
            b':' => TokenKind::Colon,
            b'.' => TokenKind::Dot,
            b'|' => TokenKind::Pipe,
            b'=' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::Operator('=')
                } else {
                    TokenKind::Eq
                }
            }
            b'-' => {
                if self.peek() == Some(b'>') {
                    self.advance();
                    TokenKind::Arrow
                } else {
                    TokenKind::Minus
                }
            }
            b'+' | b'*' | b'/' | b'%' | b'<' | b'>' | b'!' | b'&' | b'^' | b'~' | b'@'
            | b';' => TokenKind::Operator(ch as char),

            _ => {
                let span = self.span_from(start_line, start_col);
                self.emit_error(
                    ErrorCode::UNEXPECTED_CHARACTER,
                    format!("unexpected character '{}'", ch.escape_ascii()),
                    span,
                );
                return self.scan_token();
            }
        };

        Token::new(kind, self.span_from(start_line, start_col))
    }

    // ─────────────────────────────────────────────────────────────
    // Identifiers & keywords
    // ─────────────────────────────────────────────────────────────

    fn scan_identifier(&mut self, start: usize, start_line: u32, start_col: u32) -> Token {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == b'_' || ch >= 0x80 {
                self.advance();
            } else {
                break;
            }
        }
        let text = self.text(start);

        if let Some(quote @ (b'"' | b'\'')) = self.peek() {
            if let Some(flavor) = StringFlavor::from_prefix(&text) {
                self.advance();
                return self.scan_string(quote, flavor, start_line, start_col);
            }
        }

        let kind = TokenKind::from_keyword(&text).unwrap_or(TokenKind::Identifier(text));
        Token::new(kind, self.span_from(start_line, start_col))
    }

    // ─────────────────────────────────────────────────────────────
    // Number literals
    // ─────────────────────────────────────────────────────────────

    fn scan_number(&mut self, start: usize, start_line: u32, start_col: u32) -> Token {
        let first = self.source[start];
        let radix = match (first, self.peek()) {
            (b'0', Some(b'x' | b'X')) => Some(16),
            (b'0', Some(b'o' | b'O')) => Some(8),
            (b'0', Some(b'b' | b'B')) => Some(2),
            _ => None,
        };

        if let Some(radix) = radix {
            self.advance();
            let digits_start = self.pos;
            while let Some(ch) = self.peek() {
                if ch.is_ascii_hexdigit() || ch == b'_' {
                    self.advance();
                } else {
                    break;
                }
            }
            let digits = self.text(digits_start).replace('_', "");
            let span = self.span_from(start_line, start_col);
            return match i64::from_str_radix(&digits, radix) {
                Ok(value) => Token::new(TokenKind::IntLit(value), span),
                Err(_) => self.bad_int(span),
            };
        }

        let mut is_float = first == b'.';
        self.eat_digits();

        if !is_float
            && self.peek() == Some(b'.')
            && !matches!(self.peek_at(1), Some(b'a'..=b'z' | b'A'..=b'Z' | b'_'))
        {
            is_float = true;
            self.advance();
            self.eat_digits();
        }

        if matches!(self.peek(), Some(b'e' | b'E')) {
            let signed = matches!(self.peek_at(1), Some(b'+' | b'-'));
            let digit_at = if signed { 2 } else { 1 };
            if matches!(self.peek_at(digit_at), Some(b'0'..=b'9')) {
                is_float = true;
                for _ in 0..digit_at {
                    self.advance();
                }
                self.eat_digits();
            }
        }

        let text = self.text(start).replace('_', "");
        let span = self.span_from(start_line, start_col);
        if is_float {
            let value = text.parse::<f64>().unwrap_or(f64::NAN);
            Token::new(TokenKind::FloatLit(value), span)
        } else {
            match text.parse::<i64>() {
                Ok(value) => Token::new(TokenKind::IntLit(value), span),
                Err(_) => self.bad_int(span),
            }
        }
    }

    fn eat_digits(&mut self) {
        while let Some(b'0'..=b'9' | b'_') = self.peek() {
            self.advance();
        }
    }

    fn bad_int(&mut self, span: Span) -> Token {
        self.emit_error(
            ErrorCode::UNEXPECTED_TOKEN,
            "integer literal does not fit in 64 bits",
            span,
        );
        Token::new(TokenKind::IntLit(0), span)
    }

    // ─────────────────────────────────────────────────────────────
    // String literals
    // ─────────────────────────────────────────────────────────────

    /// Scan a string literal after its opening quote.
    fn scan_string(
        &mut self,
        quote: u8,
        flavor: StringFlavor,
        start_line: u32,
        start_col: u32,
    ) -> Token {
        let triple = self.peek() == Some(quote) && self.peek_at(1) == Some(quote);
        if triple {
            self.advance();
            self.advance();
        }

        let mut buf: Vec<u8> = Vec::new();
        loop {
            match self.peek() {
                None => {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error(
                        ErrorCode::UNTERMINATED_STRING,
                        "unterminated string literal",
                        span,
                    );
                    break;
                }
                Some(b'\n') if !triple => {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error(
                        ErrorCode::UNTERMINATED_STRING,
                        "unterminated string literal",
                        span,
                    );
                    break;
                }
                Some(ch) if ch == quote => {
                    if !triple {
                        self.advance();
                        break;
                    }
                    if self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote) {
                        self.advance();
                        self.advance();
                        self.advance();
                        break;
                    }
                    self.advance();
                    buf.push(ch);
                }
                Some(b'\\') => self.scan_escape(flavor, &mut buf),
                Some(ch) => {
                    self.advance();
                    buf.push(ch);
                }
            }
        }

        let value = String::from_utf8_lossy(&buf).into_owned();
        let kind = if flavor.bytes {
            TokenKind::BytesLiteral(value)
        } else if flavor.formatted {
            TokenKind::FormattedString(value)
        } else {
            TokenKind::StringLiteral(value)
        };
        Token::new(kind, self.span_from(start_line, start_col))
    }

    /// Consume a backslash sequence. Unknown escapes are kept verbatim.
    fn scan_escape(&mut self, flavor: StringFlavor, buf: &mut Vec<u8>) {
        self.advance();
        let Some(next) = self.peek() else {
            buf.push(b'\\');
            return;
        };

        if flavor.raw {
            buf.push(b'\\');
            if next != b'\n' {
                self.advance();
                buf.push(next);
            }
            return;
        }

        self.advance();
        match next {
            b'n' => buf.push(b'\n'),
            b't' => buf.push(b'\t'),
            b'r' => buf.push(b'\r'),
            b'0' => buf.push(0),
            b'\\' | b'\'' | b'"' => buf.push(next),
            b'\n' => {}
            other => {
                buf.push(b'\\');
                buf.push(other);
            }
        }
    }
}
