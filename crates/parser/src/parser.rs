//! Recursive-descent parser producing the typed AST.

use crate::ast::*;
use crate::error::ParseError;
use crate::lexer::{SpannedToken, Token, tokenize};

/// Parses a complete script from source text.
pub fn parse_program(source: &str) -> Result<Program, ParseError> {
    let tokens = tokenize(source)?;
    Parser::new(source, tokens).program()
}

struct Parser<'a> {
    src: &'a str,
    tokens: Vec<SpannedToken>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str, tokens: Vec<SpannedToken>) -> Self {
        Self {
            src,
            tokens,
            pos: 0,
        }
    }

    // ========================================================================
    // Token helpers
    // ========================================================================

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn check(&self, token: &Token) -> bool {
        self.peek() == Some(token)
    }

    fn matches(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token, what: &str) -> Result<(), ParseError> {
        if self.matches(&token) {
            Ok(())
        } else {
            match self.peek() {
                Some(found) => {
                    let found = found.describe();
                    Err(self.error_here(format!("Expected {}, found {}", what, found)))
                }
                None => Err(ParseError::eof(self.src)),
            }
        }
    }

    fn error_here(&self, message: impl Into<String>) -> ParseError {
        match self.tokens.get(self.pos) {
            Some(t) => ParseError::new(message, self.src, t.offset),
            None => ParseError::eof(self.src),
        }
    }

    fn take_identifier(&mut self, what: &str) -> Result<String, ParseError> {
        match self.peek() {
            Some(Token::Identifier(name)) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            Some(found) => {
                let found = found.describe();
                Err(self.error_here(format!("Expected {}, found {}", what, found)))
            }
            None => Err(ParseError::eof(self.src)),
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn program(mut self) -> Result<Program, ParseError> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            statements.push(self.statement()?);
        }
        Ok(Program { statements })
    }

    fn statement(&mut self) -> Result<Stmt, ParseError> {
        match self.peek() {
            Some(Token::Twinkle) => {
                self.pos += 1;
                let expr = self.expression()?;
                self.expect(Token::Semicolon, "';' after twinkle statement")?;
                Ok(Stmt::Twinkle(expr))
            }
            Some(Token::Fairy) => {
                self.pos += 1;
                self.declaration(DeclKind::Fairy)
            }
            Some(Token::Magic) => {
                self.pos += 1;
                self.declaration(DeclKind::Magic)
            }
            Some(Token::Unicorn) => {
                self.pos += 1;
                self.declaration(DeclKind::Unicorn)
            }
            Some(Token::Dragon) => {
                self.pos += 1;
                self.declaration(DeclKind::Dragon)
            }
            Some(Token::Pixie) => {
                self.pos += 1;
                self.declaration(DeclKind::Pixie)
            }
            Some(Token::PixieDust) => {
                self.pos += 1;
                self.declaration(DeclKind::PixieDust)
            }
            Some(Token::If) => {
                self.pos += 1;
                self.if_statement()
            }
            Some(Token::Repeat) => {
                self.pos += 1;
                self.repeat_statement()
            }
            Some(Token::Rainbow) => {
                self.pos += 1;
                Ok(Stmt::Function(self.function_decl()?))
            }
            Some(Token::Sparkle) => {
                self.pos += 1;
                self.sparkle_statement()
            }
            Some(Token::Try) => {
                self.pos += 1;
                self.try_statement()
            }
            Some(Token::Return) => {
                self.pos += 1;
                let value = if self.check(&Token::Semicolon) {
                    None
                } else {
                    Some(self.expression()?)
                };
                self.expect(Token::Semicolon, "';' after return")?;
                Ok(Stmt::Return(value))
            }
            _ => {
                let expr = self.expression()?;
                self.expect(Token::Semicolon, "';' after expression")?;
                Ok(Stmt::Expression(expr))
            }
        }
    }

    fn declaration(&mut self, kind: DeclKind) -> Result<Stmt, ParseError> {
        let name = self.take_identifier("variable name")?;
        self.expect(Token::Assign, "'=' in declaration")?;
        let init = self.expression()?;

        // Pixie, pixieDust, and unicorn declarations are literal-restricted.
        match kind {
            DeclKind::Pixie if !matches!(init, Expr::Bool(_)) => {
                return Err(self.error_here("pixie declaration requires a yes or no literal"));
            }
            DeclKind::PixieDust if !matches!(init, Expr::Array(_)) => {
                return Err(self.error_here("pixieDust declaration requires an array literal"));
            }
            DeclKind::Unicorn if !matches!(init, Expr::Str(_)) => {
                return Err(self.error_here("unicorn declaration requires a string literal"));
            }
            _ => {}
        }

        self.expect(Token::Semicolon, "';' after declaration")?;
        Ok(Stmt::Declare { kind, name, init })
    }

    fn if_statement(&mut self) -> Result<Stmt, ParseError> {
        self.expect(Token::OpenParen, "'(' after if")?;
        let condition = self.expression()?;
        self.expect(Token::CloseParen, "')' after condition")?;
        let then_branch = self.block()?;

        let unless_branch = if self.matches(&Token::Unless) {
            Some(self.block()?)
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            unless_branch,
        })
    }

    fn repeat_statement(&mut self) -> Result<Stmt, ParseError> {
        let count = self.expression()?;
        self.expect(Token::Times, "'times' after repeat count")?;
        let body = self.block()?;
        Ok(Stmt::Repeat { count, body })
    }

    /// Parses a function declaration, with the `rainbow` keyword already
    /// consumed.
    fn function_decl(&mut self) -> Result<FunctionDecl, ParseError> {
        let name = self.take_identifier("rainbow name")?;
        self.expect(Token::OpenParen, "'(' after rainbow name")?;

        let mut params = Vec::new();
        if !self.check(&Token::CloseParen) {
            loop {
                params.push(self.take_identifier("parameter name")?);
                if !self.matches(&Token::Comma) {
                    break;
                }
            }
        }
        self.expect(Token::CloseParen, "')' after parameters")?;

        let body = self.block()?;
        Ok(FunctionDecl { name, params, body })
    }

    fn sparkle_statement(&mut self) -> Result<Stmt, ParseError> {
        let name = self.take_identifier("sparkle name")?;
        self.expect(Token::OpenBrace, "'{' after sparkle name")?;

        let mut init = None;
        let mut methods = Vec::new();

        while !self.check(&Token::CloseBrace) && !self.is_at_end() {
            self.expect(Token::Rainbow, "'rainbow' inside sparkle body")?;
            let decl = self.function_decl()?;
            if decl.name == "init" {
                if init.is_some() {
                    return Err(self.error_here(format!(
                        "sparkle '{}' declares more than one init",
                        name
                    )));
                }
                init = Some(decl);
            } else {
                methods.push(decl);
            }
        }
        self.expect(Token::CloseBrace, "'}' after sparkle body")?;

        Ok(Stmt::Sparkle {
            name,
            init,
            methods,
        })
    }

    fn try_statement(&mut self) -> Result<Stmt, ParseError> {
        let body = self.block()?;
        self.expect(Token::Catch, "'catch' after try block")?;
        self.expect(Token::OpenParen, "'(' after catch")?;
        let catch_name = self.take_identifier("catch variable")?;
        self.expect(Token::CloseParen, "')' after catch variable")?;
        let catch_body = self.block()?;

        let finally_body = if self.matches(&Token::Finally) {
            Some(self.block()?)
        } else {
            None
        };

        Ok(Stmt::Try {
            body,
            catch_name,
            catch_body,
            finally_body,
        })
    }

    fn block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(Token::OpenBrace, "'{'")?;
        let mut statements = Vec::new();
        while !self.check(&Token::CloseBrace) && !self.is_at_end() {
            statements.push(self.statement()?);
        }
        self.expect(Token::CloseBrace, "'}'")?;
        Ok(statements)
    }

    // ========================================================================
    // Expressions, by ascending precedence
    // ========================================================================

    fn expression(&mut self) -> Result<Expr, ParseError> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr, ParseError> {
        let expr = self.or_expr()?;

        if self.matches(&Token::Assign) {
            let value = Box::new(self.assignment()?);
            return match expr {
                Expr::Variable(name) => Ok(Expr::Assign { name, value }),
                Expr::GetProperty { object, name } => Ok(Expr::SetProperty {
                    object,
                    name,
                    value,
                }),
                Expr::Index { object, index } => Ok(Expr::SetIndex {
                    object,
                    index,
                    value,
                }),
                _ => Err(self.error_here("Invalid assignment target")),
            };
        }

        Ok(expr)
    }

    fn or_expr(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.and_expr()?;
        while self.matches(&Token::OrOr) {
            let right = self.and_expr()?;
            expr = Expr::Logical {
                left: Box::new(expr),
                op: LogicalOp::Or,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn and_expr(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.equality()?;
        while self.matches(&Token::AndAnd) {
            let right = self.equality()?;
            expr = Expr::Logical {
                left: Box::new(expr),
                op: LogicalOp::And,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.comparison()?;
        loop {
            // `is` is the keyword alias for `==`.
            let op = if self.matches(&Token::EqEq) || self.matches(&Token::Is) {
                BinaryOp::Eq
            } else if self.matches(&Token::NotEq) {
                BinaryOp::Ne
            } else {
                break;
            };
            let right = self.comparison()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.term()?;
        loop {
            let op = if self.matches(&Token::Le) {
                BinaryOp::Le
            } else if self.matches(&Token::Ge) {
                BinaryOp::Ge
            } else if self.matches(&Token::Lt) {
                BinaryOp::Lt
            } else if self.matches(&Token::Gt) {
                BinaryOp::Gt
            } else {
                break;
            };
            let right = self.term()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.factor()?;
        loop {
            let op = if self.matches(&Token::Plus) {
                BinaryOp::Add
            } else if self.matches(&Token::Minus) {
                BinaryOp::Sub
            } else {
                break;
            };
            let right = self.factor()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.unary()?;
        loop {
            let op = if self.matches(&Token::Star) {
                BinaryOp::Mul
            } else if self.matches(&Token::Slash) {
                BinaryOp::Div
            } else if self.matches(&Token::Percent) {
                BinaryOp::Rem
            } else {
                break;
            };
            let right = self.unary()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        let op = if self.matches(&Token::Bang) {
            Some(UnaryOp::Not)
        } else if self.matches(&Token::Minus) {
            Some(UnaryOp::Neg)
        } else {
            None
        };

        match op {
            Some(op) => {
                let operand = Box::new(self.unary()?);
                Ok(Expr::Unary { op, operand })
            }
            None => self.call(),
        }
    }

    fn call(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.primary()?;
        loop {
            if self.matches(&Token::OpenParen) {
                let args = self.arguments()?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                };
            } else if self.matches(&Token::Dot) {
                let name = self.take_identifier("property name")?;
                expr = Expr::GetProperty {
                    object: Box::new(expr),
                    name,
                };
            } else if self.matches(&Token::OpenBracket) {
                let index = self.expression()?;
                self.expect(Token::CloseBracket, "']' after index")?;
                expr = Expr::Index {
                    object: Box::new(expr),
                    index: Box::new(index),
                };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    /// Parses a comma-separated argument list, with the opening paren
    /// already consumed.
    fn arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if !self.check(&Token::CloseParen) {
            loop {
                args.push(self.expression()?);
                if !self.matches(&Token::Comma) {
                    break;
                }
            }
        }
        self.expect(Token::CloseParen, "')' after arguments")?;
        Ok(args)
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let token = match self.peek() {
            Some(t) => t.clone(),
            None => return Err(ParseError::eof(self.src)),
        };

        match token {
            Token::Number(n) => {
                self.pos += 1;
                Ok(Expr::Number(n))
            }
            Token::String(s) => {
                self.pos += 1;
                Ok(Expr::Str(s))
            }
            Token::Bool(b) => {
                self.pos += 1;
                Ok(Expr::Bool(b))
            }
            Token::Null => {
                self.pos += 1;
                Ok(Expr::Null)
            }
            Token::This => {
                self.pos += 1;
                Ok(Expr::This)
            }
            Token::Identifier(name) => {
                self.pos += 1;
                Ok(Expr::Variable(name))
            }
            Token::OpenParen => {
                self.pos += 1;
                let expr = self.expression()?;
                self.expect(Token::CloseParen, "')' after expression")?;
                Ok(expr)
            }
            Token::OpenBracket => {
                self.pos += 1;
                let mut items = Vec::new();
                if !self.check(&Token::CloseBracket) {
                    loop {
                        items.push(self.expression()?);
                        if !self.matches(&Token::Comma) {
                            break;
                        }
                    }
                }
                self.expect(Token::CloseBracket, "']' after array items")?;
                Ok(Expr::Array(items))
            }
            Token::New => {
                self.pos += 1;
                let class = self.take_identifier("sparkle name after new")?;
                self.expect(Token::OpenParen, "'(' after sparkle name")?;
                let args = self.arguments()?;
                Ok(Expr::New { class, args })
            }
            other => Err(self.error_here(format!("Unexpected {}", other.describe()))),
        }
    }
}
