//! Statement parsing.

use typespec_lexer::token::TokenKind;
use typespec_types::ast::*;
use typespec_types::ErrorCode;

use crate::parser::Parser;

impl<'src> Parser<'src> {
    /// Parse every top-level line.
    ///
    /// ```ebnf
    /// Module    = { Line } ;
    /// Line      = Import | Statement [ Comment ] Newline ;
    /// Statement = VarDecl | Assign | Call | FuncDecl | "pass" ;
    /// ```
    pub(crate) fn parse_module(&mut self) -> Module {
        let mut statements = Vec::new();
        loop {
            self.skip_blank_lines();
            if self.at_end() || self.too_many_errors() {
                break;
            }

            if self.current_span().start_col > 1 {
                self.error_at_current(ErrorCode::UNEXPECTED_INDENT, "unexpected indent");
                self.skip_line();
                continue;
            }

            match self.peek_kind() {
                TokenKind::From | TokenKind::Import => self.parse_import(),
                TokenKind::Pass => {
                    self.advance();
                    self.finish_line();
                }
                _ => match self.parse_statement() {
                    Some(stmt) => statements.push(stmt),
                    None => {
                        self.skip_line();
                        self.skip_indented_block();
                    }
                },
            }
        }
        Module::new(statements)
    }

    /// Parse one statement including its trailing expectation comment.
    pub(crate) fn parse_statement(&mut self) -> Option<Statement> {
        let lead = (self.peek_kind().clone(), self.look_ahead(1).clone());
        let mut stmt = match lead {
            (TokenKind::Def, _) => return self.parse_func_decl(),
            (TokenKind::Identifier(_), TokenKind::Colon) => self.parse_var_decl()?,
            (TokenKind::Identifier(_), TokenKind::Eq) => self.parse_assign()?,
            (TokenKind::Identifier(_), TokenKind::LParen) => {
                let start = self.current_span();
                let call = self.parse_call()?;
                Statement::new(StmtKind::Call(call), start.merge(self.previous_span()))
            }
            (other, _) => {
                let message = format!(
                    "expected a declaration, assignment, call or 'def', got '{other}'"
                );
                self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, message);
                return None;
            }
        };
        stmt.expectation = self.finish_line();
        Some(stmt)
    }

    /// `name: T` or `name: T = expr`
    fn parse_var_decl(&mut self) -> Option<Statement> {
        let start = self.current_span();
        let name = self.expect_identifier()?;
        self.expect(&TokenKind::Colon)?;
        let type_ann = self.parse_type_expr()?;
        let init = if self.eat(&TokenKind::Eq) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        let span = start.merge(self.previous_span());
        Some(Statement::new(
            StmtKind::VarDecl(VarDecl {
                name,
                type_ann,
                init,
            }),
            span,
        ))
    }

    /// `name = expr`
    fn parse_assign(&mut self) -> Option<Statement> {
        let start = self.current_span();
        let target = self.expect_identifier()?;
        self.expect(&TokenKind::Eq)?;
        let value = self.parse_expression()?;
        let span = start.merge(self.previous_span());
        Some(Statement::new(StmtKind::Assign(Assign { target, value }), span))
    }
}
