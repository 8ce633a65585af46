//! Expression parsing.
//!
//! Only the forms a fixture needs on the right of `=` or as call arguments:
//! literals, names, list displays, calls and parentheses.

use typespec_lexer::token::TokenKind;
use typespec_types::ast::*;
use typespec_types::ErrorCode;

use crate::parser::Parser;

impl<'src> Parser<'src> {
    /// ```ebnf
    /// Expr    = [ "-" ] Number | String { String } | Bytes | FString
    ///         | "True" | "False" | "None"
    ///         | "[" [ Expr { "," Expr } [ "," ] ] "]"
    ///         | Ident [ "(" Args ")" ]
    ///         | "(" Expr ")" ;
    /// ```
    pub(crate) fn parse_expression(&mut self) -> Option<Expr> {
        if !self.enter_nesting() {
            return None;
        }
        let result = self.parse_expression_inner();
        self.depth -= 1;
        result
    }

    fn parse_expression_inner(&mut self) -> Option<Expr> {
        let start = self.current_span();
        let kind = match self.peek_kind().clone() {
            TokenKind::IntLit(v) => {
                self.advance();
                ExprKind::Int(v)
            }
            TokenKind::FloatLit(v) => {
                self.advance();
                ExprKind::Float(v)
            }
            TokenKind::Minus => {
                self.advance();
                match self.peek_kind().clone() {
                    TokenKind::IntLit(v) => {
                        self.advance();
                        ExprKind::Int(-v)
                    }
                    TokenKind::FloatLit(v) => {
                        self.advance();
                        ExprKind::Float(-v)
                    }
                    other => {
                        self.error_at_current(
                            ErrorCode::UNEXPECTED_TOKEN,
                            format!("expected a number after '-', got '{other}'"),
                        );
                        return None;
                    }
                }
            }
            TokenKind::StringLiteral(first) => {
                self.advance();
                let mut text = first;
                // Adjacent literals concatenate: "a" "b"
                while let TokenKind::StringLiteral(next) = self.peek_kind().clone() {
                    self.advance();
                    text.push_str(&next);
                }
                ExprKind::Str(text)
            }
            TokenKind::BytesLiteral(b) => {
                self.advance();
                ExprKind::Bytes(b)
            }
            TokenKind::FormattedString(s) => {
                self.advance();
                ExprKind::FormattedStr(s)
            }
            TokenKind::True => {
                self.advance();
                ExprKind::Bool(true)
            }
            TokenKind::False => {
                self.advance();
                ExprKind::Bool(false)
            }
            TokenKind::None => {
                self.advance();
                ExprKind::None
            }
            TokenKind::LBracket => {
                self.advance();
                let items = self.parse_expr_list(&TokenKind::RBracket)?;
                self.expect(&TokenKind::RBracket)?;
                ExprKind::List(items)
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(&TokenKind::RParen)?;
                return Some(Expr::new(inner.kind, start.merge(self.previous_span())));
            }
            TokenKind::Identifier(name) => {
                if self.look_ahead(1) == &TokenKind::LParen {
                    ExprKind::Call(self.parse_call()?)
                } else {
                    self.advance();
                    if self.check_exact(&TokenKind::Dot) {
                        self.error_at_current(
                            ErrorCode::UNEXPECTED_TOKEN,
                            format!("attribute access on '{name}' is not supported"),
                        );
                        return None;
                    }
                    ExprKind::Name(name)
                }
            }
            other => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected expression, got '{other}'"),
                );
                return None;
            }
        };
        Some(Expr::new(kind, start.merge(self.previous_span())))
    }

    /// `callee(arg, ...)`
    pub(crate) fn parse_call(&mut self) -> Option<CallExpr> {
        let callee = self.expect_identifier()?;
        self.expect(&TokenKind::LParen)?;
        let args = self.parse_expr_list(&TokenKind::RParen)?;
        self.expect(&TokenKind::RParen)?;
        Some(CallExpr { callee, args })
    }

    /// Comma-separated expressions up to (not including) `close`.
    fn parse_expr_list(&mut self, close: &TokenKind) -> Option<Vec<Expr>> {
        let mut items = Vec::new();
        while !self.check_exact(close) && !self.at_end() {
            items.push(self.parse_expression()?);
            if self.check_exact(&TokenKind::Eq) {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    "keyword arguments are not supported",
                );
                return None;
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Some(items)
    }
}
