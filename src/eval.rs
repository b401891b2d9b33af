use std::cell::RefCell;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::io;
use std::io::prelude::*;
use std::rc::Rc;

use log::debug;

use crate::ast::{Expr, Stmt};
use crate::interner::Symbol;
use crate::token::TokenKind;

/// A runtime value.  No implicit cross-kind coercion anywhere; the derived
/// `PartialEq` is exactly the language's `==` (same kind and same value,
/// different kinds always unequal).
#[derive(Debug, PartialEq, Clone)]
pub enum Value {
    Nil,
    Number(f64),
    String(String),
    Bool(bool),
}

impl Value {
    /// `nil` and `false` are false; everything else, including `0` and the
    /// empty string, is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            _ => true,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
        }
    }
}

#[derive(Debug)]
pub enum RuntimeError {
    OperandMustBeNumber,
    OperandsMustBeNumbers,
    OperandsMustBeNumbersOrStrings,
    DivisionByZero,
    UnknownVariable(String),
    EmptyExpression,
    UnsupportedOperator(String),
    Io(io::Error),
}

impl Error for RuntimeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RuntimeError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::OperandMustBeNumber => write!(f, "Operand must be a number"),
            RuntimeError::OperandsMustBeNumbers => write!(f, "Operands must be numbers"),
            RuntimeError::OperandsMustBeNumbersOrStrings => {
                write!(f, "Both operands must be numbers or strings")
            }
            RuntimeError::DivisionByZero => write!(f, "Division by 0 is not allowed"),
            RuntimeError::UnknownVariable(name) => write!(f, "unknown variable '{}'", name),
            RuntimeError::EmptyExpression => write!(f, "empty expression"),
            RuntimeError::UnsupportedOperator(op) => write!(f, "unsupported operator '{}'", op),
            RuntimeError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl From<io::Error> for RuntimeError {
    fn from(e: io::Error) -> RuntimeError {
        RuntimeError::Io(e)
    }
}

/// Walks the tree against a chain of lexical scopes, writing `print` output
/// to the borrowed writer.
#[derive(Debug)]
pub struct Evaluator<'t, W: Write> {
    output: &'t mut W,
    globals: Rc<Env>,
}

impl<'a, W: Write> Evaluator<'a, W> {
    pub fn new(output: &'a mut W) -> Evaluator<'a, W> {
        Evaluator {
            output,
            globals: Env::new(),
        }
    }

    /// Run a parsed program.  The top-level block evaluates directly in the
    /// global scope.
    pub fn eval_program(&mut self, program: &Stmt) -> Result<(), RuntimeError> {
        match program {
            Stmt::Block(stmts) => self.eval_stmts(stmts, self.globals.clone()),
            stmt => self.eval_stmt(stmt, self.globals.clone()),
        }
    }

    /// Evaluate a single expression in the global scope.
    pub fn eval_expression(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        self.eval_expr(expr, self.globals.clone())
    }

    fn eval_stmts(&mut self, stmts: &[Stmt], env: Rc<Env>) -> Result<(), RuntimeError> {
        for stmt in stmts {
            self.eval_stmt(stmt, env.clone())?
        }
        Ok(())
    }

    fn eval_stmt(&mut self, stmt: &Stmt, env: Rc<Env>) -> Result<(), RuntimeError> {
        match stmt {
            Stmt::Expr(e) => {
                self.eval_expr(e, env)?;
            }
            Stmt::Print(e) => {
                let v = self.eval_expr(e, env)?;
                if v == Value::Nil {
                    return Err(RuntimeError::EmptyExpression);
                }
                writeln!(self.output, "{}", v)?;
            }
            Stmt::VarDecl(sym, init) => {
                let value = self.eval_expr(init, env.clone())?;
                debug!("defining '{}' = {}", sym, value);
                env.define(sym, value);
            }
            Stmt::Block(stmts) => {
                // A fresh scope for the block; the previous one is untouched
                // and becomes current again on any exit path.
                self.eval_stmts(stmts, Env::with_parent(env))?;
            }
        };
        Ok(())
    }

    fn eval_expr(&mut self, expr: &Expr, env: Rc<Env>) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Nil => Ok(Value::Nil),
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::String(s) => Ok(Value::String(s.clone())),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Identifier(sym) => match env.get(sym) {
                Some(value) => Ok(value),
                None => Err(RuntimeError::UnknownVariable(sym.name().to_owned())),
            },
            Expr::Group(e) => self.eval_expr(e, env),
            Expr::Unary(op, operand) => {
                let value = self.eval_expr(operand, env)?;
                match op.kind {
                    TokenKind::Minus => match value {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        _ => Err(RuntimeError::OperandMustBeNumber),
                    },
                    TokenKind::Bang => Ok(Value::Bool(!value.is_truthy())),
                    _ => Err(RuntimeError::UnsupportedOperator(op.lexeme.clone())),
                }
            }
            Expr::Binary(lhs, op, rhs) => {
                let l = self.eval_expr(lhs, env.clone())?;
                let r = self.eval_expr(rhs, env)?;
                self.eval_binary(op.kind, &op.lexeme, l, r)
            }
            Expr::Assign(sym, rhs) => {
                if !env.is_bound(sym) {
                    return Err(RuntimeError::UnknownVariable(sym.name().to_owned()));
                }
                let value = self.eval_expr(rhs, env.clone())?;
                env.assign(sym, value.clone());
                Ok(value)
            }
        }
    }

    fn eval_binary(
        &mut self,
        op: TokenKind,
        lexeme: &str,
        l: Value,
        r: Value,
    ) -> Result<Value, RuntimeError> {
        match op {
            TokenKind::Plus => match (l, r) {
                (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l + r)),
                (Value::String(l), Value::String(r)) => Ok(Value::String(l + &r)),
                _ => Err(RuntimeError::OperandsMustBeNumbersOrStrings),
            },
            TokenKind::Minus => {
                let (l, r) = number_operands(l, r)?;
                Ok(Value::Number(l - r))
            }
            TokenKind::Star => {
                let (l, r) = number_operands(l, r)?;
                Ok(Value::Number(l * r))
            }
            TokenKind::Slash => {
                let (l, r) = number_operands(l, r)?;
                if r == 0.0 {
                    Err(RuntimeError::DivisionByZero)
                } else {
                    Ok(Value::Number(l / r))
                }
            }
            TokenKind::Less => {
                let (l, r) = number_operands(l, r)?;
                Ok(Value::Bool(l < r))
            }
            TokenKind::LessEqual => {
                let (l, r) = number_operands(l, r)?;
                Ok(Value::Bool(l <= r))
            }
            TokenKind::Greater => {
                let (l, r) = number_operands(l, r)?;
                Ok(Value::Bool(l > r))
            }
            TokenKind::GreaterEqual => {
                let (l, r) = number_operands(l, r)?;
                Ok(Value::Bool(l >= r))
            }
            TokenKind::EqualEqual => Ok(Value::Bool(l == r)),
            TokenKind::BangEqual => match (&l, &r) {
                (Value::Number(l), Value::Number(r)) => Ok(Value::Bool(l != r)),
                (Value::String(l), Value::String(r)) => Ok(Value::Bool(l != r)),
                _ => Ok(Value::Bool(l.is_truthy() != r.is_truthy())),
            },
            _ => Err(RuntimeError::UnsupportedOperator(lexeme.to_owned())),
        }
    }
}

fn number_operands(l: Value, r: Value) -> Result<(f64, f64), RuntimeError> {
    match (l, r) {
        (Value::Number(l), Value::Number(r)) => Ok((l, r)),
        _ => Err(RuntimeError::OperandsMustBeNumbers),
    }
}

/// One lexical scope: a mapping from names to values plus the enclosing
/// scope.  The chain is acyclic by construction.
#[derive(Debug)]
struct Env {
    parent: Option<Rc<Env>>,
    bindings: RefCell<HashMap<Symbol, Value>>,
}

impl Env {
    fn new() -> Rc<Env> {
        Rc::new(Env {
            parent: None,
            bindings: RefCell::new(HashMap::new()),
        })
    }

    fn with_parent(parent: Rc<Env>) -> Rc<Env> {
        Rc::new(Env {
            parent: Some(parent),
            bindings: RefCell::new(HashMap::new()),
        })
    }

    /// Bind `sym` in this scope, replacing any previous binding here.
    fn define(&self, sym: &Symbol, val: Value) {
        self.bindings.borrow_mut().insert(sym.clone(), val);
    }

    /// Write `sym` in this scope.  Callers must have checked `is_bound`;
    /// assignment targets the current scope even when the existing binding
    /// lives in an enclosing one.
    fn assign(&self, sym: &Symbol, val: Value) {
        self.bindings.borrow_mut().insert(sym.clone(), val);
    }

    fn is_bound(&self, sym: &Symbol) -> bool {
        if self.bindings.borrow().contains_key(sym) {
            true
        } else {
            self.parent.as_ref().is_some_and(|p| p.is_bound(sym))
        }
    }

    fn get(&self, sym: &Symbol) -> Option<Value> {
        match self.bindings.borrow().get(sym) {
            Some(v) => Some(v.clone()),
            None => self.parent.as_ref().and_then(|p| p.get(sym)),
        }
    }
}
