//! Recursive descent parser for Vo source files

use crate::diagnostics::{error_codes, Diagnostic, DiagnosticBag, Span};
use crate::syntax::ast::*;
use crate::syntax::lexer::{Lexer, Token, TokenKind};

/// Parser for Vo source code
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    errors: DiagnosticBag,
    peeked: Option<Token>,
    peeked2: Option<Token>,
    prev_span: Option<Span>,
    /// Non-zero while composite literals are disallowed (`if` headers)
    no_composite: u32,
}

impl<'a> Parser<'a> {
    /// Create a new parser
    pub fn new(lexer: Lexer<'a>) -> Self {
        Self {
            lexer,
            errors: DiagnosticBag::new(),
            peeked: None,
            peeked2: None,
            prev_span: None,
            no_composite: 0,
        }
    }

    /// Parse a complete source file
    pub fn parse_file(&mut self) -> Result<File, DiagnosticBag> {
        let start_span = self.current_span();

        let (package, package_span) = match self.parse_package_clause() {
            Ok(result) => result,
            Err(diag) => {
                self.errors.push(diag);
                return Err(self.errors.clone());
            }
        };

        let mut imports = Vec::new();
        while self.check(TokenKind::Import) {
            match self.parse_import_decls() {
                Ok(mut decls) => imports.append(&mut decls),
                Err(diag) => {
                    self.errors.push(diag);
                    self.recover_to_next_decl();
                }
            }
            self.skip_semis();
        }

        let mut decls = Vec::new();
        while !self.is_eof() {
            match self.parse_decls() {
                Ok(mut parsed) => decls.append(&mut parsed),
                Err(diag) => {
                    self.errors.push(diag);
                    self.recover_to_next_decl();
                }
            }
            self.skip_semis();
        }

        if let Some(span) = self.lexer.invalid_token_span() {
            self.errors.push(
                Diagnostic::error(error_codes::syntax::INVALID_TOKEN)
                    .message("source contains invalid tokens")
                    .span(span.clone())
                    .build(),
            );
        }

        if self.errors.has_errors() {
            return Err(self.errors.clone());
        }

        let end_span = self.previous_span();
        Ok(File {
            id: NodeId::new(),
            span: start_span.to(&end_span),
            package,
            package_span,
            imports,
            decls,
        })
    }

    fn parse_package_clause(&mut self) -> Result<(String, Span), Diagnostic> {
        self.skip_semis();
        let start = self.current_span();
        self.expect(TokenKind::Package)?;
        let name = self.expect_ident_token()?;
        let span = start.to(&name.1);
        self.skip_semis();
        Ok((name.0, span))
    }

    fn parse_import_decls(&mut self) -> Result<Vec<ImportDecl>, Diagnostic> {
        let start = self.current_span();
        self.expect(TokenKind::Import)?;

        let mut imports = Vec::new();
        if self.check(TokenKind::LParen) {
            self.advance();
            self.skip_semis();
            while !self.check(TokenKind::RParen) && !self.is_eof() {
                imports.push(self.parse_import_spec(&start)?);
                self.skip_semis();
            }
            self.expect(TokenKind::RParen)?;
        } else {
            imports.push(self.parse_import_spec(&start)?);
        }
        Ok(imports)
    }

    fn parse_import_spec(&mut self, start: &Span) -> Result<ImportDecl, Diagnostic> {
        let alias = if matches!(self.peek().kind, TokenKind::Ident(_)) {
            Some(self.expect_ident()?)
        } else {
            None
        };
        let token = self.advance();
        let path = match token.kind {
            TokenKind::StringLit(path) => path,
            _ => {
                return Err(
                    Diagnostic::error(error_codes::syntax::UNEXPECTED_TOKEN)
                        .message(format!("expected import path, found {:?}", token.kind))
                        .span(token.span)
                        .build(),
                )
            }
        };
        Ok(ImportDecl {
            id: NodeId::new(),
            span: start.to(&token.span),
            alias,
            path,
        })
    }

    /// Parse one top-level declaration; `const` groups may expand to several
    fn parse_decls(&mut self) -> Result<Vec<Decl>, Diagnostic> {
        let token = self.peek();
        match &token.kind {
            TokenKind::Func => Ok(vec![Decl::Func(self.parse_func_decl()?)]),
            TokenKind::Type => Ok(vec![Decl::Type(self.parse_type_decl()?)]),
            TokenKind::Const => Ok(self.parse_const_decls()?),
            TokenKind::Var => Ok(vec![Decl::Var(self.parse_var_decl()?)]),
            _ => Err(self.error_unexpected("declaration")),
        }
    }

    fn parse_type_decl(&mut self) -> Result<TypeDecl, Diagnostic> {
        let start = self.current_span();
        let doc = self.doc_above(start.line);
        self.expect(TokenKind::Type)?;
        let (name, name_span) = self.expect_ident_token()?;

        let body = match self.peek().kind {
            TokenKind::Struct => TypeBody::Struct(self.parse_struct_type()?),
            TokenKind::Interface => TypeBody::Interface(self.parse_interface_type()?),
            _ => TypeBody::Named(self.parse_type_expr()?),
        };

        Ok(TypeDecl {
            id: NodeId::new(),
            span: start.to(&self.previous_span()),
            doc,
            name,
            name_span,
            body,
        })
    }

    fn parse_struct_type(&mut self) -> Result<StructType, Diagnostic> {
        let start = self.current_span();
        self.expect(TokenKind::Struct)?;
        self.expect(TokenKind::LBrace)?;
        self.skip_semis();

        let mut fields = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_eof() {
            fields.push(self.parse_field_decl()?);
            self.skip_semis();
        }
        self.expect(TokenKind::RBrace)?;

        Ok(StructType {
            id: NodeId::new(),
            span: start.to(&self.previous_span()),
            fields,
        })
    }

    /// Parse one struct field line: `a, b T`, `T`, or `*T` (embedded)
    fn parse_field_decl(&mut self) -> Result<FieldDecl, Diagnostic> {
        let start = self.current_span();

        if self.check(TokenKind::Star) {
            // Embedded pointer field
            let ty = self.parse_type_expr()?;
            return Ok(FieldDecl {
                id: NodeId::new(),
                span: start.to(&self.previous_span()),
                names: Vec::new(),
                ty,
            });
        }

        let first = self.expect_ident_node()?;
        match self.peek().kind {
            TokenKind::Semi | TokenKind::RBrace => {
                // Bare type name: an embedded field
                let ty = TypeExpr::Name {
                    id: NodeId::new(),
                    span: first.span.clone(),
                    package: None,
                    name: first.name,
                };
                Ok(FieldDecl {
                    id: NodeId::new(),
                    span: start.to(&self.previous_span()),
                    names: Vec::new(),
                    ty,
                })
            }
            TokenKind::Dot => {
                // Embedded qualified type `pkg.T`
                self.advance();
                let (name, name_span) = self.expect_ident_token()?;
                let ty = TypeExpr::Name {
                    id: NodeId::new(),
                    span: first.span.to(&name_span),
                    package: Some(first.name),
                    name,
                };
                Ok(FieldDecl {
                    id: NodeId::new(),
                    span: start.to(&self.previous_span()),
                    names: Vec::new(),
                    ty,
                })
            }
            _ => {
                let mut names = vec![first];
                while self.check(TokenKind::Comma) {
                    self.advance();
                    names.push(self.expect_ident_node()?);
                }
                let ty = self.parse_type_expr()?;
                Ok(FieldDecl {
                    id: NodeId::new(),
                    span: start.to(&self.previous_span()),
                    names,
                    ty,
                })
            }
        }
    }

    fn parse_interface_type(&mut self) -> Result<InterfaceType, Diagnostic> {
        let start = self.current_span();
        self.expect(TokenKind::Interface)?;
        self.expect(TokenKind::LBrace)?;
        self.skip_semis();

        let mut methods = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_eof() {
            let sig_start = self.current_span();
            let doc = self.doc_above(sig_start.line);
            let (name, _) = self.expect_ident_token()?;
            let params = self.parse_param_list()?;
            let (results, _) = self.parse_results()?;
            methods.push(MethodSig {
                id: NodeId::new(),
                span: sig_start.to(&self.previous_span()),
                doc,
                name,
                params,
                results,
            });
            self.skip_semis();
        }
        self.expect(TokenKind::RBrace)?;

        Ok(InterfaceType {
            id: NodeId::new(),
            span: start.to(&self.previous_span()),
            methods,
        })
    }

    fn parse_const_decls(&mut self) -> Result<Vec<Decl>, Diagnostic> {
        let start = self.current_span();
        self.expect(TokenKind::Const)?;

        let mut decls = Vec::new();
        if self.check(TokenKind::LParen) {
            self.advance();
            self.skip_semis();
            while !self.check(TokenKind::RParen) && !self.is_eof() {
                decls.push(Decl::Const(self.parse_const_spec(&start)?));
                self.skip_semis();
            }
            self.expect(TokenKind::RParen)?;
        } else {
            decls.push(Decl::Const(self.parse_const_spec(&start)?));
        }
        Ok(decls)
    }

    fn parse_const_spec(&mut self, start: &Span) -> Result<ConstDecl, Diagnostic> {
        let (name, name_span) = self.expect_ident_token()?;
        self.expect(TokenKind::Assign)?;
        let value = self.parse_expr()?;
        Ok(ConstDecl {
            id: NodeId::new(),
            span: start.to(&self.previous_span()),
            name,
            name_span,
            value,
        })
    }

    fn parse_var_decl(&mut self) -> Result<VarDecl, Diagnostic> {
        let start = self.current_span();
        self.expect(TokenKind::Var)?;

        let mut names = vec![self.expect_ident_node()?];
        while self.check(TokenKind::Comma) {
            self.advance();
            names.push(self.expect_ident_node()?);
        }

        let ty = if !self.check(TokenKind::Assign)
            && !self.check(TokenKind::Semi)
            && !self.check(TokenKind::RBrace)
        {
            Some(self.parse_type_expr()?)
        } else {
            None
        };

        let mut values = Vec::new();
        if self.check(TokenKind::Assign) {
            self.advance();
            values.push(self.parse_expr()?);
            while self.check(TokenKind::Comma) {
                self.advance();
                values.push(self.parse_expr()?);
            }
        }

        Ok(VarDecl {
            id: NodeId::new(),
            span: start.to(&self.previous_span()),
            names,
            ty,
            values,
        })
    }

    fn parse_func_decl(&mut self) -> Result<FuncDecl, Diagnostic> {
        let start = self.current_span();
        let doc = self.doc_above(start.line);
        self.expect(TokenKind::Func)?;

        // At top level, `func (` can only open a method receiver.
        let recv = if self.check(TokenKind::LParen) {
            Some(self.parse_receiver()?)
        } else {
            None
        };

        let (name, name_span) = self.expect_ident_token()?;
        let params = self.parse_param_list()?;
        let (results, results_span) = self.parse_results()?;
        let body = self.parse_block()?;

        Ok(FuncDecl {
            id: NodeId::new(),
            span: start.to(&self.previous_span()),
            doc,
            recv,
            name,
            name_span,
            params,
            results,
            results_span,
            body,
        })
    }

    fn parse_receiver(&mut self) -> Result<Receiver, Diagnostic> {
        let start = self.current_span();
        self.expect(TokenKind::LParen)?;

        let mut name = None;
        let mut is_pointer = false;
        let type_name;

        if self.check(TokenKind::Star) {
            // `(*T)`
            self.advance();
            is_pointer = true;
            type_name = self.expect_ident()?;
        } else {
            let first = self.expect_ident_node()?;
            match self.peek().kind {
                TokenKind::RParen => {
                    // `(T)`
                    type_name = first.name;
                }
                TokenKind::Star => {
                    // `(e *T)`
                    self.advance();
                    is_pointer = true;
                    name = Some(first);
                    type_name = self.expect_ident()?;
                }
                _ => {
                    // `(e T)`
                    name = Some(first);
                    type_name = self.expect_ident()?;
                }
            }
        }

        self.expect(TokenKind::RParen)?;
        Ok(Receiver {
            id: NodeId::new(),
            span: start.to(&self.previous_span()),
            name,
            is_pointer,
            type_name,
        })
    }

    /// Parse a parenthesized parameter list.
    ///
    /// Names are resolved the way the language defines them: an element
    /// followed by a type is a name, and pending bare identifiers attach to
    /// the next name/type group (`a, b string`). If no group in the list
    /// carries a type, all bare identifiers were types (`(string, error)`).
    fn parse_param_list(&mut self) -> Result<Vec<ParamDecl>, Diagnostic> {
        self.expect(TokenKind::LParen)?;
        let groups = self.parse_param_groups()?;
        self.expect(TokenKind::RParen)?;
        Ok(groups)
    }

    fn parse_param_groups(&mut self) -> Result<Vec<ParamDecl>, Diagnostic> {
        let mut groups: Vec<ParamDecl> = Vec::new();
        let mut pending: Vec<Ident> = Vec::new();

        while !self.check(TokenKind::RParen) && !self.is_eof() {
            let start = self.current_span();

            if matches!(self.peek().kind, TokenKind::Ident(_))
                && matches!(
                    self.peek2().kind,
                    TokenKind::Comma | TokenKind::RParen
                )
            {
                // Bare identifier: a shared name or an unnamed type;
                // decided once the list is complete.
                pending.push(self.expect_ident_node()?);
            } else if matches!(self.peek().kind, TokenKind::Ident(_))
                && !matches!(self.peek2().kind, TokenKind::Dot)
            {
                // `name Type`
                let name = self.expect_ident_node()?;
                let ty = self.parse_type_expr()?;
                let mut names = std::mem::take(&mut pending);
                names.push(name);
                groups.push(ParamDecl {
                    id: NodeId::new(),
                    span: start.to(&self.previous_span()),
                    names,
                    ty,
                });
            } else {
                // A type on its own (`*T`, `pkg.T`)
                let ty = self.parse_type_expr()?;
                for ident in pending.drain(..) {
                    groups.push(ParamDecl {
                        id: NodeId::new(),
                        span: ident.span.clone(),
                        names: Vec::new(),
                        ty: TypeExpr::Name {
                            id: NodeId::new(),
                            span: ident.span.clone(),
                            package: None,
                            name: ident.name,
                        },
                    });
                }
                groups.push(ParamDecl {
                    id: NodeId::new(),
                    span: start.to(&self.previous_span()),
                    names: Vec::new(),
                    ty,
                });
            }

            if self.check(TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }

        // Leftover bare identifiers are unnamed parameter types.
        for ident in pending {
            groups.push(ParamDecl {
                id: NodeId::new(),
                span: ident.span.clone(),
                names: Vec::new(),
                ty: TypeExpr::Name {
                    id: NodeId::new(),
                    span: ident.span.clone(),
                    package: None,
                    name: ident.name,
                },
            });
        }
        Ok(groups)
    }

    /// Parse an optional result list; returns the results and their span
    fn parse_results(&mut self) -> Result<(Vec<ResultDecl>, Option<Span>), Diagnostic> {
        match self.peek().kind {
            TokenKind::LBrace | TokenKind::Semi | TokenKind::RBrace | TokenKind::Eof => {
                Ok((Vec::new(), None))
            }
            TokenKind::LParen => {
                let start = self.current_span();
                self.advance();
                let groups = self.parse_param_groups()?;
                self.expect(TokenKind::RParen)?;
                let span = start.to(&self.previous_span());
                let results = groups
                    .into_iter()
                    .map(|g| ResultDecl {
                        id: g.id,
                        span: g.span,
                        names: g.names,
                        ty: g.ty,
                    })
                    .collect();
                Ok((results, Some(span)))
            }
            _ => {
                let ty = self.parse_type_expr()?;
                let span = ty.span().clone();
                Ok((
                    vec![ResultDecl {
                        id: NodeId::new(),
                        span: span.clone(),
                        names: Vec::new(),
                        ty,
                    }],
                    Some(span),
                ))
            }
        }
    }

    fn parse_type_expr(&mut self) -> Result<TypeExpr, Diagnostic> {
        let start = self.current_span();
        if self.check(TokenKind::Star) {
            self.advance();
            let elem = self.parse_type_expr()?;
            return Ok(TypeExpr::Pointer {
                id: NodeId::new(),
                span: start.to(&self.previous_span()),
                elem: Box::new(elem),
            });
        }

        let first = self.expect_ident_node()?;
        if self.check(TokenKind::Dot) {
            self.advance();
            let (name, name_span) = self.expect_ident_token()?;
            return Ok(TypeExpr::Name {
                id: NodeId::new(),
                span: first.span.to(&name_span),
                package: Some(first.name),
                name,
            });
        }
        Ok(TypeExpr::Name {
            id: NodeId::new(),
            span: first.span,
            package: None,
            name: first.name,
        })
    }

    fn parse_block(&mut self) -> Result<Block, Diagnostic> {
        let start = self.current_span();
        self.expect(TokenKind::LBrace)?;
        self.skip_semis();

        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_eof() {
            stmts.push(self.parse_stmt()?);
            self.skip_semis();
        }
        self.expect(TokenKind::RBrace)?;

        Ok(Block {
            id: NodeId::new(),
            span: start.to(&self.previous_span()),
            stmts,
        })
    }

    fn parse_stmt(&mut self) -> Result<Stmt, Diagnostic> {
        match self.peek().kind {
            TokenKind::Var => Ok(Stmt::Var(self.parse_var_decl()?)),
            TokenKind::Return => self.parse_return_stmt(),
            TokenKind::If => self.parse_if_stmt(),
            TokenKind::LBrace => Ok(Stmt::Block(self.parse_block()?)),
            _ => self.parse_simple_stmt(),
        }
    }

    fn parse_return_stmt(&mut self) -> Result<Stmt, Diagnostic> {
        let start = self.current_span();
        self.expect(TokenKind::Return)?;

        let mut results = Vec::new();
        if !self.check(TokenKind::Semi) && !self.check(TokenKind::RBrace) {
            results.push(self.parse_expr()?);
            while self.check(TokenKind::Comma) {
                self.advance();
                results.push(self.parse_expr()?);
            }
        }

        Ok(Stmt::Return {
            id: NodeId::new(),
            span: start.to(&self.previous_span()),
            results,
        })
    }

    fn parse_if_stmt(&mut self) -> Result<Stmt, Diagnostic> {
        let start = self.current_span();
        self.expect(TokenKind::If)?;

        self.no_composite += 1;
        let cond = self.parse_expr();
        self.no_composite -= 1;
        let cond = cond?;

        let then_block = self.parse_block()?;
        let else_branch = if self.check(TokenKind::Else) {
            self.advance();
            if self.check(TokenKind::If) {
                Some(Box::new(self.parse_if_stmt()?))
            } else {
                Some(Box::new(Stmt::Block(self.parse_block()?)))
            }
        } else {
            None
        };

        Ok(Stmt::If {
            id: NodeId::new(),
            span: start.to(&self.previous_span()),
            cond: Box::new(cond),
            then_block,
            else_branch,
        })
    }

    /// Expression statement, assignment, or short declaration
    fn parse_simple_stmt(&mut self) -> Result<Stmt, Diagnostic> {
        let start = self.current_span();
        let mut lhs = vec![self.parse_expr()?];
        while self.check(TokenKind::Comma) {
            self.advance();
            lhs.push(self.parse_expr()?);
        }

        let define = match self.peek().kind {
            TokenKind::Define => true,
            TokenKind::Assign => false,
            _ => {
                if lhs.len() != 1 {
                    return Err(self.error_unexpected("`:=` or `=`"));
                }
                let expr = lhs.remove(0);
                return Ok(Stmt::Expr {
                    id: NodeId::new(),
                    span: start.to(&self.previous_span()),
                    expr: Box::new(expr),
                });
            }
        };
        self.advance();

        let mut rhs = vec![self.parse_expr()?];
        while self.check(TokenKind::Comma) {
            self.advance();
            rhs.push(self.parse_expr()?);
        }

        Ok(Stmt::Assign {
            id: NodeId::new(),
            span: start.to(&self.previous_span()),
            lhs,
            rhs,
            define,
        })
    }

    // Expressions

    fn parse_expr(&mut self) -> Result<Expr, Diagnostic> {
        self.parse_binary(0)
    }

    fn parse_binary(&mut self, min_prec: u8) -> Result<Expr, Diagnostic> {
        let mut lhs = self.parse_unary()?;

        loop {
            let (op, prec) = match self.peek().kind {
                TokenKind::OrOr => (BinaryOp::Or, 1),
                TokenKind::AndAnd => (BinaryOp::And, 2),
                TokenKind::EqEq => (BinaryOp::Eq, 3),
                TokenKind::NotEq => (BinaryOp::NotEq, 3),
                TokenKind::Lt => (BinaryOp::Lt, 3),
                TokenKind::Gt => (BinaryOp::Gt, 3),
                TokenKind::LtEq => (BinaryOp::LtEq, 3),
                TokenKind::GtEq => (BinaryOp::GtEq, 3),
                _ => break,
            };
            if prec <= min_prec {
                break;
            }
            self.advance();
            let rhs = self.parse_binary(prec)?;
            let span = lhs.span().to(rhs.span());
            lhs = Expr::Binary {
                id: NodeId::new(),
                span,
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, Diagnostic> {
        let start = self.current_span();
        match self.peek().kind {
            TokenKind::Amp => {
                self.advance();
                let expr = self.parse_unary()?;
                Ok(Expr::Unary {
                    id: NodeId::new(),
                    span: start.to(expr.span()),
                    op: UnaryOp::Ref,
                    expr: Box::new(expr),
                })
            }
            TokenKind::Not => {
                self.advance();
                let expr = self.parse_unary()?;
                Ok(Expr::Unary {
                    id: NodeId::new(),
                    span: start.to(expr.span()),
                    op: UnaryOp::Not,
                    expr: Box::new(expr),
                })
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.peek().kind {
                TokenKind::Dot => {
                    self.advance();
                    let (name, name_span) = self.expect_ident_token()?;
                    let span = expr.span().to(&name_span);
                    expr = Expr::Selector {
                        id: NodeId::new(),
                        span,
                        expr: Box::new(expr),
                        name,
                        name_span,
                    };
                }
                TokenKind::LParen => {
                    self.advance();
                    let mut args = Vec::new();
                    let saved = self.no_composite;
                    self.no_composite = 0;
                    while !self.check(TokenKind::RParen) && !self.is_eof() {
                        args.push(self.parse_expr()?);
                        if self.check(TokenKind::Comma) {
                            self.advance();
                        } else {
                            break;
                        }
                    }
                    self.no_composite = saved;
                    self.expect(TokenKind::RParen)?;
                    let span = expr.span().to(&self.previous_span());
                    expr = Expr::Call {
                        id: NodeId::new(),
                        span,
                        callee: Box::new(expr),
                        args,
                    };
                }
                TokenKind::LBrace if self.no_composite == 0 => {
                    let Some(ty) = composite_type_name(&expr) else {
                        break;
                    };
                    expr = self.parse_composite_body(ty)?;
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_composite_body(&mut self, ty: TypeExpr) -> Result<Expr, Diagnostic> {
        let start = ty.span().clone();
        self.expect(TokenKind::LBrace)?;
        self.skip_semis();

        let mut elems = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_eof() {
            let elem_start = self.current_span();
            let key = if matches!(self.peek().kind, TokenKind::Ident(_))
                && self.peek2().kind == TokenKind::Colon
            {
                let key = self.expect_ident_node()?;
                self.expect(TokenKind::Colon)?;
                Some(key)
            } else {
                None
            };

            let saved = self.no_composite;
            self.no_composite = 0;
            let value = self.parse_expr();
            self.no_composite = saved;
            let value = value?;

            elems.push(CompositeElem {
                id: NodeId::new(),
                span: elem_start.to(&self.previous_span()),
                key,
                value,
            });

            if self.check(TokenKind::Comma) {
                self.advance();
                self.skip_semis();
            } else {
                self.skip_semis();
                break;
            }
        }
        self.expect(TokenKind::RBrace)?;

        Ok(Expr::Composite {
            id: NodeId::new(),
            span: start.to(&self.previous_span()),
            ty,
            elems,
        })
    }

    fn parse_primary(&mut self) -> Result<Expr, Diagnostic> {
        let token = self.peek();
        match token.kind.clone() {
            TokenKind::Ident(_) => {
                let ident = self.expect_ident_node()?;
                Ok(Expr::Ident(ident))
            }
            TokenKind::StringLit(value) => {
                let token = self.advance();
                Ok(Expr::StringLit {
                    id: NodeId::new(),
                    span: token.span,
                    value,
                })
            }
            TokenKind::IntLit(value) => {
                let token = self.advance();
                Ok(Expr::IntLit {
                    id: NodeId::new(),
                    span: token.span,
                    value,
                })
            }
            TokenKind::LParen => {
                self.advance();
                let saved = self.no_composite;
                self.no_composite = 0;
                let inner = self.parse_expr();
                self.no_composite = saved;
                let inner = inner?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::Func => self.parse_func_lit(),
            _ => Err(self.error_unexpected("expression")),
        }
    }

    fn parse_func_lit(&mut self) -> Result<Expr, Diagnostic> {
        let start = self.current_span();
        self.expect(TokenKind::Func)?;
        let params = self.parse_param_list()?;
        let (results, _) = self.parse_results()?;
        let body = self.parse_block()?;
        Ok(Expr::FuncLit {
            id: NodeId::new(),
            span: start.to(&self.previous_span()),
            params,
            results,
            body,
        })
    }

    // Helpers

    fn peek(&mut self) -> Token {
        if self.peeked.is_none() {
            self.peeked = Some(self.lexer.next_token());
        }
        self.peeked.clone().unwrap()
    }

    fn peek2(&mut self) -> Token {
        let _ = self.peek();
        if self.peeked2.is_none() {
            self.peeked2 = Some(self.lexer.next_token());
        }
        self.peeked2.clone().unwrap()
    }

    fn advance(&mut self) -> Token {
        let token = if let Some(token) = self.peeked.take() {
            self.peeked = self.peeked2.take();
            token
        } else {
            self.lexer.next_token()
        };
        self.prev_span = Some(token.span.clone());
        token
    }

    fn is_eof(&mut self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn current_span(&mut self) -> Span {
        self.peek().span
    }

    fn previous_span(&mut self) -> Span {
        self.prev_span
            .clone()
            .unwrap_or_else(|| self.current_span())
    }

    fn check(&mut self, kind: TokenKind) -> bool {
        std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(&kind)
    }

    fn skip_semis(&mut self) {
        while self.check(TokenKind::Semi) {
            self.advance();
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, Diagnostic> {
        let token = self.advance();
        if std::mem::discriminant(&token.kind) == std::mem::discriminant(&kind) {
            Ok(token)
        } else {
            Err(Diagnostic::error(error_codes::syntax::UNEXPECTED_TOKEN)
                .message(format!("expected {:?}, found {:?}", kind, token.kind))
                .span(token.span)
                .build())
        }
    }

    fn expect_ident(&mut self) -> Result<String, Diagnostic> {
        self.expect_ident_token().map(|(name, _)| name)
    }

    fn expect_ident_token(&mut self) -> Result<(String, Span), Diagnostic> {
        let token = self.advance();
        match token.kind {
            TokenKind::Ident(name) => Ok((name, token.span)),
            _ => Err(Diagnostic::error(error_codes::syntax::UNEXPECTED_TOKEN)
                .message(format!("expected identifier, found {:?}", token.kind))
                .span(token.span)
                .build()),
        }
    }

    fn expect_ident_node(&mut self) -> Result<Ident, Diagnostic> {
        let (name, span) = self.expect_ident_token()?;
        Ok(Ident {
            id: NodeId::new(),
            span,
            name,
        })
    }

    fn error_unexpected(&mut self, expected: &str) -> Diagnostic {
        let token = self.peek();
        let code = if matches!(token.kind, TokenKind::Eof) {
            error_codes::syntax::UNEXPECTED_EOF
        } else {
            error_codes::syntax::UNEXPECTED_TOKEN
        };
        Diagnostic::error(code)
            .message(format!("expected {}, found {:?}", expected, token.kind))
            .span(token.span)
            .build()
    }

    /// Skip ahead to the next top-level declaration keyword
    fn recover_to_next_decl(&mut self) {
        self.no_composite = 0;
        let mut depth = 0usize;
        loop {
            match self.peek().kind {
                TokenKind::Eof => return,
                TokenKind::LBrace => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::RBrace => {
                    depth = depth.saturating_sub(1);
                    self.advance();
                }
                TokenKind::Func | TokenKind::Type | TokenKind::Const | TokenKind::Var
                    if depth == 0 =>
                {
                    return;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Collect the run of `//` comment lines ending directly above `line`
    /// as the doc comment for a declaration starting on `line`.
    fn doc_above(&mut self, line: usize) -> Option<String> {
        let comments = self.lexer.comments();
        let mut collected: Vec<&str> = Vec::new();
        let mut expected = line.checked_sub(1)?;

        for comment in comments.iter().rev() {
            if comment.end_line >= line {
                continue;
            }
            if comment.end_line < expected {
                break;
            }
            // Only own-line `//` comments chain into a doc comment.
            if comment.end_line == expected
                && comment.own_line
                && comment.text.starts_with("//")
            {
                collected.push(&comment.text);
                expected = match comment.start_line.checked_sub(1) {
                    Some(prev) => prev,
                    None => break,
                };
            } else {
                break;
            }
        }

        if collected.is_empty() {
            return None;
        }

        let mut text = String::new();
        for raw in collected.iter().rev() {
            let stripped = raw.strip_prefix("//").unwrap_or(raw);
            let stripped = stripped.strip_prefix(' ').unwrap_or(stripped);
            text.push_str(stripped);
            text.push('\n');
        }
        Some(text)
    }
}

/// If `expr` is usable as a composite literal type (`T{...}` or
/// `pkg.T{...}`), convert it to the corresponding type expression.
fn composite_type_name(expr: &Expr) -> Option<TypeExpr> {
    match expr {
        Expr::Ident(ident) => Some(TypeExpr::Name {
            id: NodeId::new(),
            span: ident.span.clone(),
            package: None,
            name: ident.name.clone(),
        }),
        Expr::Selector {
            expr: inner,
            name,
            span,
            ..
        } => match inner.as_ref() {
            Expr::Ident(pkg) => Some(TypeExpr::Name {
                id: NodeId::new(),
                span: span.clone(),
                package: Some(pkg.name.clone()),
                name: name.clone(),
            }),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
