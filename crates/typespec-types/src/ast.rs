//! Syntax tree for typespec fixtures.
//!
//! A fixture is a flat sequence of statements. Function bodies are not
//! represented; only the signature of a `def` matters to the checker.
//! Every node carries a [`Span`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Span;

// ══════════════════════════════════════════════════════════════════════════════
// Top Level
// ══════════════════════════════════════════════════════════════════════════════

/// A parsed fixture file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Module {
    pub statements: Vec<Statement>,
}

impl Module {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    /// Statements that carry a trailing `# OK` / `# ERR` expectation.
    pub fn expectations(&self) -> impl Iterator<Item = (usize, Expectation)> + '_ {
        self.statements
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.expectation.map(|e| (i, e)))
    }
}

/// A spanned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

/// Expected verdict written as a trailing comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Expectation {
    Ok,
    Err,
}

impl Expectation {
    /// Parse the body of a comment (`OK`, `err: reason`, ...).
    pub fn from_comment(text: &str) -> Option<Self> {
        let word = text
            .trim()
            .split(|c: char| !c.is_ascii_alphabetic())
            .next()
            .unwrap_or("");
        if word.eq_ignore_ascii_case("ok") {
            Some(Expectation::Ok)
        } else if word.eq_ignore_ascii_case("err") {
            Some(Expectation::Err)
        } else {
            None
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expectation::Ok => f.write_str("OK"),
            Expectation::Err => f.write_str("ERR"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StmtKind,
    pub span: Span,
    pub expectation: Option<Expectation>,
}

impl Statement {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self {
            kind,
            span,
            expectation: None,
        }
    }

    pub fn expecting(mut self, expectation: Expectation) -> Self {
        self.expectation = Some(expectation);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// `name: T` or `name: T = init`
    VarDecl(VarDecl),
    /// `name = value` (no annotation)
    Assign(Assign),
    /// `f(arg, ...)`
    Call(CallExpr),
    /// `def f(p: T, ...) -> R:`. The body is not retained.
    FuncDecl(FuncDecl),
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub name: Ident,
    pub type_ann: TypeExpr,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assign {
    pub target: Ident,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub name: Ident,
    pub params: Vec<Param>,
    pub ret: TypeExpr,
}

/// A function parameter: `name: T`
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Ident,
    pub type_ann: TypeExpr,
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Int(i64),
    Float(f64),
    Str(String),
    /// `b"..."`
    Bytes(String),
    /// `f"..."`: a `str`, never a literal type.
    FormattedStr(String),
    Bool(bool),
    None,
    /// `[a, b, ...]`
    List(Vec<Expr>),
    Name(String),
    Call(CallExpr),
}

/// `callee(args...)`
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub callee: Ident,
    pub args: Vec<Expr>,
}

// ══════════════════════════════════════════════════════════════════════════════
// Type Expressions
// ══════════════════════════════════════════════════════════════════════════════

/// A type annotation exactly as written. The checker normalizes it.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeExpr {
    pub kind: TypeExprKind,
    pub span: Span,
}

impl TypeExpr {
    pub fn new(kind: TypeExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeExprKind {
    /// `int`, `typing.Optional` (dotted names are joined with `.`)
    Name(String),
    /// `base[arg, ...]`
    Subscript { base: String, args: Vec<TypeExpr> },
    /// `[T, ...]`: the parameter list of `Callable[[...], R]`
    List(Vec<TypeExpr>),
    /// `left | right`
    Or(Box<TypeExpr>, Box<TypeExpr>),
    /// A constant such as `1`, `"a"`, `True` or `None`.
    Const(Const),
}

/// A constant appearing inside an annotation.
#[derive(Debug, Clone, PartialEq)]
pub enum Const {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    None,
}

impl fmt::Display for Const {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Const::Int(v) => write!(f, "{v}"),
            Const::Float(v) => write!(f, "{v:?}"),
            Const::Str(s) => write!(f, "{s:?}"),
            Const::Bool(true) => f.write_str("True"),
            Const::Bool(false) => f.write_str("False"),
            Const::None => f.write_str("None"),
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeExprKind::Name(name) => f.write_str(name),
            TypeExprKind::Subscript { base, args } => {
                write!(f, "{base}[")?;
                write_list(f, args)?;
                f.write_str("]")
            }
            TypeExprKind::List(items) => {
                f.write_str("[")?;
                write_list(f, items)?;
                f.write_str("]")
            }
            TypeExprKind::Or(left, right) => write!(f, "{left} | {right}"),
            TypeExprKind::Const(c) => write!(f, "{c}"),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[TypeExpr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}
