//! Declaration parsing: imports and function signatures.

use typespec_lexer::token::TokenKind;
use typespec_types::ast::*;
use typespec_types::ErrorCode;

use crate::parser::Parser;

impl<'src> Parser<'src> {
    /// Imports are accepted and dropped; every typing name is built in.
    ///
    /// ```ebnf
    /// Import = "import" Dotted [ "as" Ident ] { "," Dotted [ "as" Ident ] }
    ///        | "from" Dotted "import" ( "*" | Names | "(" Names ")" ) ;
    /// ```
    pub(crate) fn parse_import(&mut self) {
        if self.eat(&TokenKind::Import) {
            if self.import_names(true).is_none() {
                return;
            }
        } else {
            self.advance(); // `from`
            if self.expect_dotted_name().is_none() || self.expect(&TokenKind::Import).is_none() {
                self.skip_line();
                return;
            }
            let ok = if self.eat(&TokenKind::Operator('*')) {
                true
            } else if self.eat(&TokenKind::LParen) {
                self.import_names(false).is_some() && self.expect(&TokenKind::RParen).is_some()
            } else {
                self.import_names(false).is_some()
            };
            if !ok {
                self.skip_line();
                return;
            }
        }
        self.finish_line();
    }

    fn import_names(&mut self, dotted: bool) -> Option<()> {
        loop {
            if dotted {
                self.expect_dotted_name()?;
            } else {
                self.expect_identifier()?;
            }
            if self.eat(&TokenKind::As) {
                self.expect_identifier()?;
            }
            if !self.eat(&TokenKind::Comma) || self.check_exact(&TokenKind::RParen) {
                return Some(());
            }
        }
    }

    /// Parse a function signature and skip its body.
    ///
    /// ```ebnf
    /// FuncDecl = "def" Ident "(" [ Param { "," Param } [ "," ] ] ")" "->" Type ":" Body ;
    /// Param    = Ident ":" Type ;
    /// ```
    pub(crate) fn parse_func_decl(&mut self) -> Option<Statement> {
        let start = self.current_span();
        self.advance(); // `def`
        let name = self.expect_identifier()?;
        self.expect(&TokenKind::LParen)?;

        let mut params = Vec::new();
        while !self.check_exact(&TokenKind::RParen) && !self.at_end() {
            params.push(self.parse_param(&name)?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;

        if !self.eat(&TokenKind::Arrow) {
            self.error_at_current(
                ErrorCode::MISSING_ANNOTATION,
                format!("function '{}' needs a return annotation", name.name),
            );
            return None;
        }
        let ret = self.parse_type_expr()?;
        self.expect(&TokenKind::Colon)?;
        let span = start.merge(self.previous_span());

        let inline_body = !matches!(self.peek_kind(), TokenKind::Newline | TokenKind::Eof)
            && !(matches!(self.peek_kind(), TokenKind::Comment(_))
                && self.look_ahead(1).is_line_end());
        let expectation = if inline_body {
            while !matches!(
                self.peek_kind(),
                TokenKind::Comment(_) | TokenKind::Newline | TokenKind::Eof
            ) {
                self.advance();
            }
            self.finish_line()
        } else {
            let expectation = self.finish_line();
            if self.skip_indented_block() == 0 {
                self.error_at(
                    ErrorCode::UNEXPECTED_INDENT,
                    format!("expected an indented block after 'def {}'", name.name),
                    span,
                );
            }
            expectation
        };

        let mut stmt = Statement::new(StmtKind::FuncDecl(FuncDecl { name, params, ret }), span);
        stmt.expectation = expectation;
        Some(stmt)
    }

    fn parse_param(&mut self, func: &Ident) -> Option<Param> {
        if let TokenKind::Operator(marker @ ('*' | '/')) = *self.peek_kind() {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("parameter marker '{marker}' is not supported"),
            );
            return None;
        }
        let name = self.expect_identifier()?;
        if !self.eat(&TokenKind::Colon) {
            self.error_at(
                ErrorCode::MISSING_ANNOTATION,
                format!(
                    "parameter '{}' of '{}' needs a type annotation",
                    name.name, func.name
                ),
                name.span,
            );
            return None;
        }
        let type_ann = self.parse_type_expr()?;
        if self.check_exact(&TokenKind::Eq) {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("default value for parameter '{}' is not supported", name.name),
            );
            return None;
        }
        Some(Param { name, type_ann })
    }

    /// Skip the indented lines following a block header.
    ///
    /// Returns how many non-blank indented lines were skipped.
    pub(crate) fn skip_indented_block(&mut self) -> usize {
        let mut lines = 0;
        loop {
            match self.peek_kind() {
                TokenKind::Newline => {
                    self.advance();
                }
                TokenKind::Eof => return lines,
                TokenKind::Comment(_) if self.look_ahead(1).is_line_end() => self.skip_line(),
                _ if self.current_span().start_col > 1 => {
                    lines += 1;
                    self.skip_line();
                }
                _ => return lines,
            }
        }
    }
}
