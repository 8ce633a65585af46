//! Token types for the typespec lexer.
//!
//! Defines [`TokenKind`] covering every lexeme of the fixture language and
//! [`Token`], which pairs a kind with a source [`Span`].

use std::fmt;
use typespec_types::Span;

/// Reserved words recognised by the lexer.
///
/// Other Python keywords lex as identifiers; they only appear inside skipped
/// function bodies.
pub const ALL_KEYWORDS: &[&str] = &[
    "def", "from", "import", "as", "pass", "return", "True", "False", "None",
];

// ─────────────────────────────────────────────────────────────────────
// Token
// ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn is_keyword(&self) -> bool {
        self.kind.is_keyword()
    }
}

// ─────────────────────────────────────────────────────────────────────
// TokenKind
// ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ── Literals ──────────────────────────────────────────────
    /// `42`, `0x2a`, `1_000`
    IntLit(i64),
    /// `3.14`, `1e9`
    FloatLit(f64),
    /// `"text"` or `'text'` (also raw and triple-quoted forms)
    StringLiteral(String),
    /// `b"raw"`
    BytesLiteral(String),
    /// `f"..."`: contents are kept verbatim, never interpolated.
    FormattedString(String),

    // ── Identifiers ──────────────────────────────────────────
    Identifier(String),

    // ── Keywords ─────────────────────────────────────────────
    Def,
    From,
    Import,
    As,
    Pass,
    Return,
    True,
    False,
    None,

    // ── Punctuation ──────────────────────────────────────────
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Dot,
    Eq,
    /// `->`
    Arrow,
    /// `|`
    Pipe,
    Minus,
    /// Any other operator character (`+`, `*`, `<`, ...). Only meaningful
    /// inside function bodies, which the parser skips.
    Operator(char),

    // ── Trivia ───────────────────────────────────────────────
    /// `# text`, carrying the text after `#`.
    Comment(String),
    /// End of a logical line. Not emitted inside brackets.
    Newline,
    Eof,
}

impl TokenKind {
    /// Maps a reserved word to its keyword token.
    pub fn from_keyword(s: &str) -> Option<TokenKind> {
        match s {
            "def" => Some(TokenKind::Def),
            "from" => Some(TokenKind::From),
            "import" => Some(TokenKind::Import),
            "as" => Some(TokenKind::As),
            "pass" => Some(TokenKind::Pass),
            "return" => Some(TokenKind::Return),
            "True" => Some(TokenKind::True),
            "False" => Some(TokenKind::False),
            "None" => Some(TokenKind::None),
            _ => None,
        }
    }

    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Def
                | TokenKind::From
                | TokenKind::Import
                | TokenKind::As
                | TokenKind::Pass
                | TokenKind::Return
                | TokenKind::True
                | TokenKind::False
                | TokenKind::None
        )
    }

    /// `true` for tokens that end a logical line.
    pub fn is_line_end(&self) -> bool {
        matches!(self, TokenKind::Newline | TokenKind::Eof)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::IntLit(n) => write!(f, "{n}"),
            TokenKind::FloatLit(n) => write!(f, "{n:?}"),
            TokenKind::StringLiteral(s) => write!(f, "{s:?}"),
            TokenKind::BytesLiteral(s) => write!(f, "b{s:?}"),
            TokenKind::FormattedString(s) => write!(f, "f{s:?}"),
            TokenKind::Identifier(s) => f.write_str(s),
            TokenKind::Def => f.write_str("def"),
            TokenKind::From => f.write_str("from"),
            TokenKind::Import => f.write_str("import"),
            TokenKind::As => f.write_str("as"),
            TokenKind::Pass => f.write_str("pass"),
            TokenKind::Return => f.write_str("return"),
            TokenKind::True => f.write_str("True"),
            TokenKind::False => f.write_str("False"),
            TokenKind::None => f.write_str("None"),
            TokenKind::LParen => f.write_str("("),
            TokenKind::RParen => f.write_str(")"),
            TokenKind::LBracket => f.write_str("["),
            TokenKind::RBracket => f.write_str("]"),
            TokenKind::LBrace => f.write_str("{"),
            TokenKind::RBrace => f.write_str("}"),
            TokenKind::Comma => f.write_str(","),
            TokenKind::Colon => f.write_str(":"),
            TokenKind::Dot => f.write_str("."),
            TokenKind::Eq => f.write_str("="),
            TokenKind::Arrow => f.write_str("->"),
            TokenKind::Pipe => f.write_str("|"),
            TokenKind::Minus => f.write_str("-"),
            TokenKind::Operator(c) => write!(f, "{c}"),
            TokenKind::Comment(_) => f.write_str("comment"),
            TokenKind::Newline => f.write_str("newline"),
            TokenKind::Eof => f.write_str("end of file"),
        }
    }
}
