//! s-expression rendering of the syntax tree, as dumped by the `parse`
//! subcommand.

use std::fmt;

use crate::ast::{Expr, Stmt};

/// Canonical number form for token literals and the AST dump: integral
/// values get a trailing `.0`, everything else keeps its natural decimal
/// form.
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}.0", n)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Nil => write!(f, "nil"),
            Expr::Number(n) => write!(f, "{}", format_number(*n)),
            Expr::String(s) => write!(f, "{}", s),
            Expr::Bool(b) => write!(f, "{}", b),
            Expr::Identifier(sym) => write!(f, "{}", sym),
            Expr::Unary(op, operand) => write!(f, "({} {})", op.lexeme, operand),
            Expr::Binary(left, op, right) => write!(f, "({} {} {})", op.lexeme, left, right),
            Expr::Group(inner) => write!(f, "(group {})", inner),
            Expr::Assign(name, value) => write!(f, "(= {} {})", name, value),
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Expr(expr) => write!(f, "{}", expr),
            Stmt::Print(expr) => write!(f, "(print {})", expr),
            Stmt::VarDecl(name, init) => write!(f, "(= {} {})", name, init),
            Stmt::Block(body) => {
                for stmt in body {
                    writeln!(f, "{}", stmt)?;
                }
                Ok(())
            }
        }
    }
}
