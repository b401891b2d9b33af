use std::error::Error;
use std::fmt;

/// Line number (starting at one).  Tracked by the scanner for its own
/// diagnostics; tokens do not carry it.
pub type Position = u32;

/// Violations detected by the parser.  All of them are fatal: there is no
/// recovery or synchronization.
#[derive(Debug, PartialEq)]
pub enum ParseError {
    /// A token with no prefix handler appeared in operand position.
    ExpectedOperand(String),
    /// Some other token than the required one was found.
    UnexpectedToken { expected: String, got: String },
    /// The left-hand side of `=` was not an identifier.
    ExpectedLvalue,
    /// A number lexeme that does not fit a 64-bit float.
    BadNumberLiteral(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::ExpectedOperand(got) => {
                write!(f, "Expected 'operand', got '{}'", got)
            }
            ParseError::UnexpectedToken { expected, got } => {
                write!(f, "Expected '{}', got '{}'", expected, got)
            }
            ParseError::ExpectedLvalue => {
                write!(f, "Invalid assignment target")
            }
            ParseError::BadNumberLiteral(lit) => {
                write!(f, "Invalid number literal: {}", lit)
            }
        }
    }
}

impl Error for ParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}
