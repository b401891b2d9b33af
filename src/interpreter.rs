//! API to control the interpreter.
//!
//! One [`Interpreter`] drives the scanner → parser → evaluator pipeline and
//! offers four operations that truncate it at different stages, mirroring
//! the CLI subcommands.

use std::error::Error;
use std::fmt;
use std::io::prelude::*;
use std::rc::Rc;

use log::debug;

use crate::ctx::Context;
use crate::diag::ParseError;
use crate::eval::{Evaluator, RuntimeError};
use crate::parser::{BindingPower, Parser};
use crate::scanner::Scanner;
use crate::token::{Token, TokenKind};

/// Tree-walk interpreter.
///
/// # Example
///
/// ```
/// # use lox::interpreter::{Interpreter, LoxError};
///
/// let mut output: Vec<u8> = Vec::new();
/// let mut interp = Interpreter::new(&mut output);
///
/// interp.run("var a = 1; { var a = 2; print a; } print a;")?;
///
/// assert_eq!(output, b"2\n1\n");
/// # Ok::<(), LoxError>(())
/// ```
#[derive(Debug)]
pub struct Interpreter<'t, W: Write> {
    ctx: Rc<Context>,
    output: &'t mut W,
}

/// Errors the interpreter can raise, one variant per exit class.
#[derive(Debug)]
pub enum LoxError {
    /// One or more lexical errors; their diagnostics have already been
    /// written to standard error by the scanner.
    Lex,

    /// Error occurring during syntactic analysis.
    Parse(ParseError),

    /// Error occurring during evaluation.
    Runtime(RuntimeError),
}

impl fmt::Display for LoxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoxError::Lex => write!(f, "lexical error"),
            LoxError::Parse(e) => write!(f, "{}", e),
            LoxError::Runtime(e) => write!(f, "runtime error: {}", e),
        }
    }
}

impl Error for LoxError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LoxError::Lex => None,
            LoxError::Parse(e) => Some(e),
            LoxError::Runtime(e) => Some(e),
        }
    }
}

impl From<ParseError> for LoxError {
    fn from(e: ParseError) -> LoxError {
        LoxError::Parse(e)
    }
}

impl From<RuntimeError> for LoxError {
    fn from(e: RuntimeError) -> LoxError {
        LoxError::Runtime(e)
    }
}

impl<'t, W: Write> Interpreter<'t, W> {
    pub fn new(output: &'t mut W) -> Interpreter<'t, W> {
        Interpreter {
            ctx: Context::new(),
            output,
        }
    }

    /// Scan the whole source and print one line per token, comments
    /// excluded, ending with the `EOF` line.  Fails with [`LoxError::Lex`]
    /// after printing if any illegal token was produced.
    pub fn tokenize(&mut self, source: &str) -> Result<(), LoxError> {
        let (tokens, had_error) = self.scan(source);
        for token in &tokens {
            writeln!(self.output, "{}", token).map_err(RuntimeError::from)?;
        }
        if had_error {
            return Err(LoxError::Lex);
        }
        Ok(())
    }

    /// Scan and parse the whole source, then print the syntax tree in
    /// s-expression form, one top-level statement per line.
    pub fn parse(&mut self, source: &str) -> Result<(), LoxError> {
        let program = self.parse_program(source)?;
        write!(self.output, "{}", program).map_err(RuntimeError::from)?;
        Ok(())
    }

    /// Scan the source, parse a single expression and print its value.
    pub fn evaluate(&mut self, source: &str) -> Result<(), LoxError> {
        let tokens = self.clean_tokens(source)?;
        let expr = Parser::new(tokens, self.ctx.clone()).parse_expression(BindingPower::Lowest)?;
        debug!("parsed expression: {}", expr);
        let mut evaluator = Evaluator::new(&mut *self.output);
        let value = evaluator.eval_expression(&expr)?;
        writeln!(self.output, "{}", value).map_err(RuntimeError::from)?;
        Ok(())
    }

    /// Execute a whole program.
    pub fn run(&mut self, source: &str) -> Result<(), LoxError> {
        let program = self.parse_program(source)?;
        let mut evaluator = Evaluator::new(&mut *self.output);
        evaluator.eval_program(&program)?;
        debug!("program finished");
        Ok(())
    }

    fn parse_program(&mut self, source: &str) -> Result<crate::ast::Stmt, LoxError> {
        let tokens = self.clean_tokens(source)?;
        let program = Parser::new(tokens, self.ctx.clone()).parse_program()?;
        debug!("parsing complete");
        Ok(program)
    }

    /// The parser-visible token stream: comments dropped, terminated by
    /// `Eof`.  Fails if any illegal token was produced.
    fn clean_tokens(&mut self, source: &str) -> Result<Vec<Token>, LoxError> {
        let (tokens, had_error) = self.scan(source);
        if had_error {
            return Err(LoxError::Lex);
        }
        Ok(tokens)
    }

    /// Scan everything up front.  Comments and illegal tokens are filtered
    /// out; the returned flag records whether any illegal token occurred.
    fn scan(&mut self, source: &str) -> (Vec<Token>, bool) {
        let mut scanner = Scanner::new(source, self.ctx.clone());
        let mut tokens = vec![];
        let mut had_error = false;
        loop {
            let (_, token) = scanner.get_token();
            match token.kind {
                TokenKind::Eof => {
                    tokens.push(token);
                    break;
                }
                TokenKind::Comment => (),
                TokenKind::Illegal => had_error = true,
                _ => tokens.push(token),
            }
        }
        debug!("scanned {} tokens", tokens.len());
        (tokens, had_error)
    }
}
