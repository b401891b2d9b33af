use std::fmt;

use crate::printer::format_number;

/// What kind of "word" a token is.
///
/// The scanner emits every kind, including `Comment` and `Illegal`; the
/// driver filters those two out before handing the stream to the parser.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    Eof,

    // Punctuation
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Dot,
    Semicolon,
    Colon,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,

    // Literals
    Number,
    String,
    Identifier,

    // Keywords
    And,
    Or,
    If,
    Else,
    For,
    While,
    Fun,
    Return,
    Class,
    This,
    Super,
    True,
    False,
    Nil,
    Var,
    Print,

    Comment,
    Illegal,
}

impl TokenKind {
    /// Canonical upper-snake-case name used by the `tokenize` output.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Eof => "EOF",
            TokenKind::LeftParen => "LEFT_PAREN",
            TokenKind::RightParen => "RIGHT_PAREN",
            TokenKind::LeftBrace => "LEFT_BRACE",
            TokenKind::RightBrace => "RIGHT_BRACE",
            TokenKind::Comma => "COMMA",
            TokenKind::Dot => "DOT",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Colon => "COLON",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Star => "STAR",
            TokenKind::Slash => "SLASH",
            TokenKind::Bang => "BANG",
            TokenKind::BangEqual => "BANG_EQUAL",
            TokenKind::Equal => "EQUAL",
            TokenKind::EqualEqual => "EQUAL_EQUAL",
            TokenKind::Less => "LESS",
            TokenKind::LessEqual => "LESS_EQUAL",
            TokenKind::Greater => "GREATER",
            TokenKind::GreaterEqual => "GREATER_EQUAL",
            TokenKind::Number => "NUMBER",
            TokenKind::String => "STRING",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::If => "IF",
            TokenKind::Else => "ELSE",
            TokenKind::For => "FOR",
            TokenKind::While => "WHILE",
            TokenKind::Fun => "FUN",
            TokenKind::Return => "RETURN",
            TokenKind::Class => "CLASS",
            TokenKind::This => "THIS",
            TokenKind::Super => "SUPER",
            TokenKind::True => "TRUE",
            TokenKind::False => "FALSE",
            TokenKind::Nil => "NIL",
            TokenKind::Var => "VAR",
            TokenKind::Print => "PRINT",
            TokenKind::Comment => "COMMENT",
            TokenKind::Illegal => "ILLEGAL",
        }
    }
}

/// One "word" of the source.
///
/// `lexeme` holds the exact characters matched, except for string literals
/// where the surrounding quotes are stripped, and `Eof` where it is empty.
#[derive(Debug, PartialEq, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>) -> Token {
        Token {
            kind,
            lexeme: lexeme.into(),
        }
    }

    /// Lexeme as shown in diagnostics.  `Eof` has no characters of its own.
    pub fn describe(&self) -> &str {
        match self.kind {
            TokenKind::Eof => "EOF",
            _ => &self.lexeme,
        }
    }
}

impl fmt::Display for Token {
    /// The canonical `<KIND> <lexeme> <literal>` line used by `tokenize`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Number => match self.lexeme.parse::<f64>() {
                Ok(n) => write!(f, "NUMBER {} {}", self.lexeme, format_number(n)),
                Err(_) => write!(f, "NUMBER {} null", self.lexeme),
            },
            TokenKind::String => write!(f, "STRING \"{}\" {}", self.lexeme, self.lexeme),
            _ => write!(f, "{} {} null", self.kind.name(), self.lexeme),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn punctuation_line_has_null_literal() {
        assert_eq!(
            Token::new(TokenKind::LeftParen, "(").to_string(),
            "LEFT_PAREN ( null"
        );
        assert_eq!(
            Token::new(TokenKind::EqualEqual, "==").to_string(),
            "EQUAL_EQUAL == null"
        );
    }

    #[test]
    fn integral_number_gets_a_decimal_suffix() {
        assert_eq!(Token::new(TokenKind::Number, "1").to_string(), "NUMBER 1 1.0");
        assert_eq!(
            Token::new(TokenKind::Number, "42").to_string(),
            "NUMBER 42 42.0"
        );
    }

    #[test]
    fn fractional_number_keeps_its_natural_form() {
        assert_eq!(
            Token::new(TokenKind::Number, "45.67").to_string(),
            "NUMBER 45.67 45.67"
        );
    }

    #[test]
    fn number_lexeme_is_verbatim() {
        assert_eq!(
            Token::new(TokenKind::Number, "0.50").to_string(),
            "NUMBER 0.50 0.5"
        );
    }

    #[test]
    fn string_line_quotes_the_lexeme_column() {
        assert_eq!(
            Token::new(TokenKind::String, "foo").to_string(),
            "STRING \"foo\" foo"
        );
    }

    #[test]
    fn eof_line_has_two_spaces() {
        assert_eq!(Token::new(TokenKind::Eof, "").to_string(), "EOF  null");
    }

    #[test]
    fn keyword_line() {
        assert_eq!(Token::new(TokenKind::Var, "var").to_string(), "VAR var null");
    }
}
