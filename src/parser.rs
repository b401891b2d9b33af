//! Pratt (top-down operator precedence) parser.
//!
//! Each token kind may carry a prefix handler ("nud"), an infix handler
//! ("led") and a binding power.  The dispatch tables are plain functions over
//! [`TokenKind`], fixed at compile time.

use std::rc::Rc;

use log::debug;

use crate::ast::{Expr, Stmt};
use crate::ctx::Context;
use crate::diag::ParseError;
use crate::token::{Token, TokenKind};

/// Priority used to decide when to stop folding infix operators into the
/// left operand.  Higher binds tighter.
#[allow(dead_code)] // the full ladder is kept even where the grammar has no operator yet
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub enum BindingPower {
    Lowest,
    Comma,
    Assignment,
    Logical,
    Relational,
    Additive,
    Multiplicative,
    Unary,
    Call,
    Member,
    Group,
    Primary,
}

type NudHandler = fn(&mut Parser) -> Result<Expr, ParseError>;
type LedHandler = fn(&mut Parser, Expr) -> Result<Expr, ParseError>;
type StatementHandler = fn(&mut Parser) -> Result<Stmt, ParseError>;

fn binding_power(kind: TokenKind) -> BindingPower {
    match kind {
        TokenKind::Equal => BindingPower::Assignment,
        TokenKind::BangEqual | TokenKind::EqualEqual => BindingPower::Logical,
        TokenKind::Less
        | TokenKind::LessEqual
        | TokenKind::Greater
        | TokenKind::GreaterEqual => BindingPower::Relational,
        TokenKind::Plus | TokenKind::Minus => BindingPower::Additive,
        TokenKind::Star | TokenKind::Slash => BindingPower::Multiplicative,
        TokenKind::Bang => BindingPower::Unary,
        TokenKind::LeftParen => BindingPower::Group,
        TokenKind::Number | TokenKind::String | TokenKind::Identifier => BindingPower::Primary,
        _ => BindingPower::Lowest,
    }
}

fn nud_handler(kind: TokenKind) -> Option<NudHandler> {
    match kind {
        TokenKind::Number
        | TokenKind::String
        | TokenKind::Identifier
        | TokenKind::True
        | TokenKind::False
        | TokenKind::Nil => Some(Parser::parse_primary_expr),
        TokenKind::LeftParen => Some(Parser::parse_group_expr),
        TokenKind::Minus | TokenKind::Bang => Some(Parser::parse_unary_expr),
        _ => None,
    }
}

fn led_handler(kind: TokenKind) -> Option<LedHandler> {
    match kind {
        TokenKind::Plus
        | TokenKind::Minus
        | TokenKind::Star
        | TokenKind::Slash
        | TokenKind::Less
        | TokenKind::LessEqual
        | TokenKind::Greater
        | TokenKind::GreaterEqual
        | TokenKind::BangEqual
        | TokenKind::EqualEqual
        | TokenKind::And
        | TokenKind::Or => Some(Parser::parse_binary_expr),
        TokenKind::Equal => Some(Parser::parse_assignment_expr),
        _ => None,
    }
}

fn statement_handler(kind: TokenKind) -> Option<StatementHandler> {
    match kind {
        TokenKind::Print => Some(Parser::parse_print_stmt),
        TokenKind::Var => Some(Parser::parse_var_decl),
        TokenKind::LeftBrace => Some(Parser::parse_block),
        _ => None,
    }
}

/// Consumes a slice of non-comment tokens terminated by `Eof` and produces
/// the syntax tree.  Any violation is fatal; there is no recovery.
#[derive(Debug)]
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    ctx: Rc<Context>,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>, ctx: Rc<Context>) -> Parser {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            tokens.push(Token::new(TokenKind::Eof, ""));
        }
        Parser {
            tokens,
            pos: 0,
            ctx,
        }
    }

    /// Parse all statements up to `Eof` into a top-level block.
    pub fn parse_program(&mut self) -> Result<Stmt, ParseError> {
        let mut body = vec![];
        while self.current().kind != TokenKind::Eof {
            body.push(self.parse_statement()?);
        }
        Ok(Stmt::Block(body))
    }

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        debug!("statement starts at '{}'", self.current().describe());
        match statement_handler(self.current().kind) {
            Some(handler) => handler(self),
            None => {
                let expr = self.parse_expression(BindingPower::Lowest)?;
                // The trailing semicolon of an expression statement is optional.
                if self.current().kind == TokenKind::Semicolon {
                    self.advance();
                }
                Ok(Stmt::Expr(Box::new(expr)))
            }
        }
    }

    fn parse_print_stmt(&mut self) -> Result<Stmt, ParseError> {
        self.advance();
        let expr = self.parse_expression(BindingPower::Lowest)?;
        self.consume(TokenKind::Semicolon, ";")?;
        Ok(Stmt::Print(Box::new(expr)))
    }

    fn parse_var_decl(&mut self) -> Result<Stmt, ParseError> {
        self.advance();
        if self.current().kind != TokenKind::Identifier {
            return Err(ParseError::UnexpectedToken {
                expected: "identifier".to_string(),
                got: self.current().describe().to_string(),
            });
        }
        let lexeme = self.advance().lexeme.clone();
        let name = self.ctx.symbol(&lexeme);
        let init = match self.current().kind {
            TokenKind::Equal => {
                self.advance();
                self.parse_expression(BindingPower::Lowest)?
            }
            _ => Expr::Nil,
        };
        self.consume(TokenKind::Semicolon, ";")?;
        Ok(Stmt::VarDecl(name, Box::new(init)))
    }

    fn parse_block(&mut self) -> Result<Stmt, ParseError> {
        self.advance();
        let mut body = vec![];
        while !matches!(self.current().kind, TokenKind::RightBrace | TokenKind::Eof) {
            body.push(self.parse_statement()?);
        }
        self.consume(TokenKind::RightBrace, "}")?;
        Ok(Stmt::Block(body))
    }

    /// The expression driver: prefix handler first, then fold infix handlers
    /// while the next token binds tighter than `bp`.
    pub fn parse_expression(&mut self, bp: BindingPower) -> Result<Expr, ParseError> {
        if self.current().kind == TokenKind::Semicolon {
            return Ok(Expr::Nil);
        }
        let nud = nud_handler(self.current().kind).ok_or_else(|| {
            ParseError::ExpectedOperand(self.current().describe().to_string())
        })?;
        let mut left = nud(self)?;

        loop {
            let kind = self.current().kind;
            if kind == TokenKind::RightParen || kind == TokenKind::Semicolon {
                break;
            }
            if binding_power(kind) <= bp {
                break;
            }
            match led_handler(kind) {
                Some(led) => left = led(self, left)?,
                None => {
                    return Err(ParseError::UnexpectedToken {
                        expected: "operator".to_string(),
                        got: self.current().describe().to_string(),
                    })
                }
            }
        }
        Ok(left)
    }

    fn parse_primary_expr(&mut self) -> Result<Expr, ParseError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Number => token
                .lexeme
                .parse::<f64>()
                .map(Expr::Number)
                .map_err(|_| ParseError::BadNumberLiteral(token.lexeme)),
            TokenKind::String => Ok(Expr::String(token.lexeme)),
            TokenKind::Identifier => Ok(Expr::Identifier(self.ctx.symbol(&token.lexeme))),
            TokenKind::True | TokenKind::False => Ok(Expr::Bool(token.lexeme == "true")),
            TokenKind::Nil => Ok(Expr::Nil),
            _ => Err(ParseError::ExpectedOperand(token.describe().to_string())),
        }
    }

    fn parse_group_expr(&mut self) -> Result<Expr, ParseError> {
        self.advance();
        let inner = self.parse_expression(BindingPower::Lowest)?;
        self.consume(TokenKind::RightParen, ")")?;
        Ok(Expr::Group(Box::new(inner)))
    }

    fn parse_unary_expr(&mut self) -> Result<Expr, ParseError> {
        let op = self.advance();
        let operand = self.parse_expression(BindingPower::Unary)?;
        Ok(Expr::Unary(op, Box::new(operand)))
    }

    fn parse_binary_expr(&mut self, left: Expr) -> Result<Expr, ParseError> {
        let op = self.advance();
        let right = self.parse_expression(binding_power(op.kind))?;
        Ok(Expr::Binary(Box::new(left), op, Box::new(right)))
    }

    fn parse_assignment_expr(&mut self, left: Expr) -> Result<Expr, ParseError> {
        self.advance();
        let Expr::Identifier(name) = left else {
            return Err(ParseError::ExpectedLvalue);
        };
        // Right-associative: the value is parsed all the way down.
        let value = self.parse_expression(BindingPower::Lowest)?;
        Ok(Expr::Assign(name, Box::new(value)))
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    /// Return the current token and move on, never past `Eof`.
    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn consume(&mut self, expected: TokenKind, what: &str) -> Result<(), ParseError> {
        if self.current().kind == expected {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::UnexpectedToken {
                expected: what.to_string(),
                got: self.current().describe().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::Scanner;

    fn parse_expr(input: &str) -> Result<Expr, ParseError> {
        let ctx = Context::new();
        parse_expr_with_ctx(ctx, input)
    }

    fn parse_expr_with_ctx(ctx: Rc<Context>, input: &str) -> Result<Expr, ParseError> {
        let tokens = Scanner::new(input, ctx.clone()).collect();
        Parser::new(tokens, ctx).parse_expression(BindingPower::Lowest)
    }

    fn parse_prg(input: &str) -> Result<Stmt, ParseError> {
        let ctx = Context::new();
        parse_prg_with_ctx(ctx, input)
    }

    fn parse_prg_with_ctx(ctx: Rc<Context>, input: &str) -> Result<Stmt, ParseError> {
        let tokens = Scanner::new(input, ctx.clone()).collect();
        Parser::new(tokens, ctx).parse_program()
    }

    fn op(kind: TokenKind, lexeme: &str) -> Token {
        Token::new(kind, lexeme)
    }

    fn binary(left: Expr, operator: Token, right: Expr) -> Expr {
        Expr::Binary(Box::new(left), operator, Box::new(right))
    }

    #[test]
    fn number() -> Result<(), ParseError> {
        assert_eq!(parse_expr("42")?, Expr::Number(42.0));
        Ok(())
    }

    #[test]
    fn string_literal() -> Result<(), ParseError> {
        assert_eq!(parse_expr("\"foo\"")?, Expr::String("foo".to_string()));
        Ok(())
    }

    #[test]
    fn bool_literals() -> Result<(), ParseError> {
        assert_eq!(parse_expr("true")?, Expr::Bool(true));
        assert_eq!(parse_expr("false")?, Expr::Bool(false));
        Ok(())
    }

    #[test]
    fn nil_literal() -> Result<(), ParseError> {
        assert_eq!(parse_expr("nil")?, Expr::Nil);
        Ok(())
    }

    #[test]
    fn unary_minus() -> Result<(), ParseError> {
        assert_eq!(
            parse_expr("--42")?,
            Expr::Unary(
                op(TokenKind::Minus, "-"),
                Box::new(Expr::Unary(
                    op(TokenKind::Minus, "-"),
                    Box::new(Expr::Number(42.0))
                ))
            )
        );
        Ok(())
    }

    #[test]
    fn unary_bang() -> Result<(), ParseError> {
        assert_eq!(
            parse_expr("!true")?,
            Expr::Unary(op(TokenKind::Bang, "!"), Box::new(Expr::Bool(true)))
        );
        Ok(())
    }

    #[test]
    fn addition() -> Result<(), ParseError> {
        assert_eq!(
            parse_expr("42 + 24")?,
            binary(
                Expr::Number(42.0),
                op(TokenKind::Plus, "+"),
                Expr::Number(24.0)
            )
        );
        Ok(())
    }

    #[test]
    fn addition_is_left_associative() -> Result<(), ParseError> {
        assert_eq!(
            parse_expr("1 + 2 + 3")?,
            binary(
                binary(
                    Expr::Number(1.0),
                    op(TokenKind::Plus, "+"),
                    Expr::Number(2.0)
                ),
                op(TokenKind::Plus, "+"),
                Expr::Number(3.0)
            )
        );
        Ok(())
    }

    #[test]
    fn factors_bind_tighter_than_terms() -> Result<(), ParseError> {
        assert_eq!(
            parse_expr("1 + 2 * 3")?,
            binary(
                Expr::Number(1.0),
                op(TokenKind::Plus, "+"),
                binary(
                    Expr::Number(2.0),
                    op(TokenKind::Star, "*"),
                    Expr::Number(3.0)
                ),
            )
        );
        Ok(())
    }

    #[test]
    fn unary_binds_tighter_than_factors() -> Result<(), ParseError> {
        assert_eq!(
            parse_expr("-123 * 45.67")?,
            binary(
                Expr::Unary(op(TokenKind::Minus, "-"), Box::new(Expr::Number(123.0))),
                op(TokenKind::Star, "*"),
                Expr::Number(45.67)
            )
        );
        Ok(())
    }

    #[test]
    fn grouping_overrides_precedence() -> Result<(), ParseError> {
        assert_eq!(
            parse_expr("1 * (2 + 3)")?,
            binary(
                Expr::Number(1.0),
                op(TokenKind::Star, "*"),
                Expr::Group(Box::new(binary(
                    Expr::Number(2.0),
                    op(TokenKind::Plus, "+"),
                    Expr::Number(3.0)
                )))
            ),
        );
        Ok(())
    }

    #[test]
    fn missing_right_paren() {
        match parse_expr("(1") {
            Err(ParseError::UnexpectedToken { expected, got })
                if expected == ")" && got == "EOF" => {}
            r => panic!("unexpected output: {:?}", r),
        }
    }

    #[test]
    fn comparisons() -> Result<(), ParseError> {
        assert_eq!(
            parse_expr("1 <= 2")?,
            binary(
                Expr::Number(1.0),
                op(TokenKind::LessEqual, "<="),
                Expr::Number(2.0)
            )
        );
        assert_eq!(
            parse_expr("1 >= 2")?,
            binary(
                Expr::Number(1.0),
                op(TokenKind::GreaterEqual, ">="),
                Expr::Number(2.0)
            )
        );
        Ok(())
    }

    #[test]
    fn comparison_binds_looser_than_terms() -> Result<(), ParseError> {
        assert_eq!(
            parse_expr("1 + 2 < 4")?,
            binary(
                binary(
                    Expr::Number(1.0),
                    op(TokenKind::Plus, "+"),
                    Expr::Number(2.0)
                ),
                op(TokenKind::Less, "<"),
                Expr::Number(4.0)
            )
        );
        Ok(())
    }

    #[test]
    fn equality_is_left_associative() -> Result<(), ParseError> {
        assert_eq!(
            parse_expr("1 == 2 == 3")?,
            binary(
                binary(
                    Expr::Number(1.0),
                    op(TokenKind::EqualEqual, "=="),
                    Expr::Number(2.0)
                ),
                op(TokenKind::EqualEqual, "=="),
                Expr::Number(3.0)
            )
        );
        Ok(())
    }

    #[test]
    fn operand_position_without_prefix_handler() {
        match parse_expr("+ 1") {
            Err(ParseError::ExpectedOperand(got)) if got == "+" => {}
            r => panic!("unexpected output: {:?}", r),
        }
    }

    #[test]
    fn logical_keywords_have_no_grammar() {
        match parse_prg("true and false;") {
            Err(ParseError::ExpectedOperand(got)) if got == "and" => {}
            r => panic!("unexpected output: {:?}", r),
        }
    }

    #[test]
    fn expr_with_variables() -> Result<(), ParseError> {
        let ctx = Context::new();
        let sym_a = ctx.symbol("a");
        let sym_b = ctx.symbol("b");
        assert_eq!(
            parse_expr_with_ctx(ctx, "a!=b")?,
            binary(
                Expr::Identifier(sym_a),
                op(TokenKind::BangEqual, "!="),
                Expr::Identifier(sym_b)
            )
        );
        Ok(())
    }

    #[test]
    fn simple_assignment() -> Result<(), ParseError> {
        let ctx = Context::new();
        let sym_a = ctx.symbol("a");
        let sym_b = ctx.symbol("b");
        assert_eq!(
            parse_expr_with_ctx(ctx, "a = b")?,
            Expr::Assign(sym_a, Box::new(Expr::Identifier(sym_b)))
        );
        Ok(())
    }

    #[test]
    fn assignment_is_right_associative() -> Result<(), ParseError> {
        let ctx = Context::new();
        let sym_a = ctx.symbol("a");
        let sym_b = ctx.symbol("b");
        assert_eq!(
            parse_expr_with_ctx(ctx, "a = b = 1")?,
            Expr::Assign(
                sym_a,
                Box::new(Expr::Assign(sym_b, Box::new(Expr::Number(1.0))))
            )
        );
        Ok(())
    }

    #[test]
    fn bad_assignment_lhs() {
        match parse_expr("(1+a=b") {
            Err(ParseError::ExpectedLvalue) => {}
            r => panic!("unexpected output: {:?}", r),
        }
    }

    #[test]
    fn expr_stmts() -> Result<(), ParseError> {
        assert_eq!(
            parse_prg("1; 1+2;")?,
            Stmt::Block(vec![
                Stmt::Expr(Box::new(Expr::Number(1.0))),
                Stmt::Expr(Box::new(binary(
                    Expr::Number(1.0),
                    op(TokenKind::Plus, "+"),
                    Expr::Number(2.0)
                )))
            ])
        );
        Ok(())
    }

    #[test]
    fn expr_stmt_semicolon_is_optional() -> Result<(), ParseError> {
        assert_eq!(
            parse_prg("1 + 2")?,
            Stmt::Block(vec![Stmt::Expr(Box::new(binary(
                Expr::Number(1.0),
                op(TokenKind::Plus, "+"),
                Expr::Number(2.0)
            )))])
        );
        Ok(())
    }

    #[test]
    fn print_stmt() -> Result<(), ParseError> {
        assert_eq!(
            parse_prg("print 1+2;")?,
            Stmt::Block(vec![Stmt::Print(Box::new(binary(
                Expr::Number(1.0),
                op(TokenKind::Plus, "+"),
                Expr::Number(2.0)
            )))])
        );
        Ok(())
    }

    #[test]
    fn print_stmt_requires_semicolon() {
        match parse_prg("print 1") {
            Err(ParseError::UnexpectedToken { expected, got })
                if expected == ";" && got == "EOF" => {}
            r => panic!("unexpected output: {:?}", r),
        }
    }

    #[test]
    fn var_decl() -> Result<(), ParseError> {
        let ctx = Context::new();
        let sym_foo = ctx.symbol("foo");
        let sym_bar = ctx.symbol("bar");
        assert_eq!(
            parse_prg_with_ctx(ctx, "var foo; var bar = 2 * 3.14;")?,
            Stmt::Block(vec![
                Stmt::VarDecl(sym_foo, Box::new(Expr::Nil)),
                Stmt::VarDecl(
                    sym_bar,
                    Box::new(binary(
                        Expr::Number(2.0),
                        op(TokenKind::Star, "*"),
                        Expr::Number(3.14)
                    ))
                )
            ])
        );
        Ok(())
    }

    #[test]
    fn var_decl_requires_identifier() {
        match parse_prg("var 1 = 2;") {
            Err(ParseError::UnexpectedToken { expected, got })
                if expected == "identifier" && got == "1" => {}
            r => panic!("unexpected output: {:?}", r),
        }
    }

    #[test]
    fn empty_block() -> Result<(), ParseError> {
        assert_eq!(parse_prg("{ }")?, Stmt::Block(vec![Stmt::Block(vec![])]));
        Ok(())
    }

    #[test]
    fn block_with_many_stmts() -> Result<(), ParseError> {
        assert_eq!(
            parse_prg("{ 1; 2; }")?,
            Stmt::Block(vec![Stmt::Block(vec![
                Stmt::Expr(Box::new(Expr::Number(1.0))),
                Stmt::Expr(Box::new(Expr::Number(2.0))),
            ])])
        );
        Ok(())
    }

    #[test]
    fn unclosed_block() {
        match parse_prg("{ 1;") {
            Err(ParseError::UnexpectedToken { expected, got })
                if expected == "}" && got == "EOF" => {}
            r => panic!("unexpected output: {:?}", r),
        }
    }

    #[test]
    fn bare_semicolon_in_expression_position_is_nil() -> Result<(), ParseError> {
        assert_eq!(
            parse_prg("print ;")?,
            Stmt::Block(vec![Stmt::Print(Box::new(Expr::Nil))])
        );
        Ok(())
    }

    #[test]
    fn control_flow_keywords_are_not_statements() {
        match parse_prg("if (true) 1;") {
            Err(ParseError::ExpectedOperand(got)) if got == "if" => {}
            r => panic!("unexpected output: {:?}", r),
        }
    }

    #[test]
    fn parser_stops_at_eof() -> Result<(), ParseError> {
        let ctx = Context::new();
        let mut parser = Parser::new(vec![], ctx);
        assert_eq!(parser.parse_program()?, Stmt::Block(vec![]));
        Ok(())
    }

    #[test]
    fn pretty_printing_literals_is_stable_under_reparsing() -> Result<(), ParseError> {
        for src in ["123", "45.67", "true", "false", "nil", "\"foo\""] {
            let printed = parse_expr(src)?.to_string();
            let reparsed = parse_expr(&printed)?.to_string();
            assert_eq!(printed, reparsed);
        }
        Ok(())
    }
}
