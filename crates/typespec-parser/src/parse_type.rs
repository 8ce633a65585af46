//! Type annotation parsing.
//!
//! Annotations are kept as written; resolving names such as `Union` or
//! `Iterable` is the checker's job.

use typespec_lexer::token::TokenKind;
use typespec_types::ast::*;
use typespec_types::ErrorCode;

use crate::parser::Parser;

impl<'src> Parser<'src> {
    /// ```ebnf
    /// Type     = TypeAtom { "|" TypeAtom } ;
    /// TypeAtom = Dotted [ "[" Type { "," Type } [ "," ] "]" ]
    ///          | "[" [ Type { "," Type } ] "]"
    ///          | "(" Type ")"
    ///          | Const ;
    /// Const    = [ "-" ] Int | Float | String | "True" | "False" | "None" ;
    /// ```
    pub(crate) fn parse_type_expr(&mut self) -> Option<TypeExpr> {
        let outer = self.depth;
        let result = self.parse_type_chain();
        self.depth = outer;
        result
    }

    /// Every `|` nests the left operand one level deeper.
    fn parse_type_chain(&mut self) -> Option<TypeExpr> {
        let mut ty = self.parse_type_atom()?;
        while self.eat(&TokenKind::Pipe) {
            if !self.enter_nesting() {
                return None;
            }
            let rhs = self.parse_type_atom()?;
            let span = ty.span.merge(rhs.span);
            ty = TypeExpr::new(TypeExprKind::Or(Box::new(ty), Box::new(rhs)), span);
        }
        Some(ty)
    }

    fn parse_type_atom(&mut self) -> Option<TypeExpr> {
        if !self.enter_nesting() {
            return None;
        }
        let result = self.parse_type_atom_inner();
        self.depth -= 1;
        result
    }

    fn parse_type_atom_inner(&mut self) -> Option<TypeExpr> {
        let start = self.current_span();
        let kind = match self.peek_kind().clone() {
            TokenKind::Identifier(_) => {
                let name = self.expect_dotted_name()?;
                if self.eat(&TokenKind::LBracket) {
                    let args = self.parse_type_args(&TokenKind::RBracket)?;
                    if args.is_empty() {
                        self.error_at_current(
                            ErrorCode::UNEXPECTED_TOKEN,
                            format!("'{}[]' needs at least one type argument", name.name),
                        );
                        return None;
                    }
                    self.expect(&TokenKind::RBracket)?;
                    TypeExprKind::Subscript {
                        base: name.name,
                        args,
                    }
                } else {
                    TypeExprKind::Name(name.name)
                }
            }
            TokenKind::LBracket => {
                self.advance();
                let items = self.parse_type_args(&TokenKind::RBracket)?;
                self.expect(&TokenKind::RBracket)?;
                TypeExprKind::List(items)
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_type_expr()?;
                self.expect(&TokenKind::RParen)?;
                return Some(TypeExpr::new(inner.kind, start.merge(self.previous_span())));
            }
            _ => TypeExprKind::Const(self.parse_const()?),
        };
        Some(TypeExpr::new(kind, start.merge(self.previous_span())))
    }

    fn parse_type_args(&mut self, close: &TokenKind) -> Option<Vec<TypeExpr>> {
        let mut args = Vec::new();
        while !self.check_exact(close) && !self.at_end() {
            args.push(self.parse_type_expr()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Some(args)
    }

    fn parse_const(&mut self) -> Option<Const> {
        let value = match self.peek_kind().clone() {
            TokenKind::IntLit(v) => Const::Int(v),
            TokenKind::FloatLit(v) => Const::Float(v),
            TokenKind::StringLiteral(s) => Const::Str(s),
            TokenKind::True => Const::Bool(true),
            TokenKind::False => Const::Bool(false),
            TokenKind::None => Const::None,
            TokenKind::Minus => {
                self.advance();
                return match self.peek_kind().clone() {
                    TokenKind::IntLit(v) => {
                        self.advance();
                        Some(Const::Int(-v))
                    }
                    TokenKind::FloatLit(v) => {
                        self.advance();
                        Some(Const::Float(-v))
                    }
                    other => {
                        self.error_at_current(
                            ErrorCode::UNEXPECTED_TOKEN,
                            format!("expected a number after '-', got '{other}'"),
                        );
                        None
                    }
                };
            }
            other => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected type, got '{other}'"),
                );
                return None;
            }
        };
        self.advance();
        Some(value)
    }
}
