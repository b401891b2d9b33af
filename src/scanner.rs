//! Lexical analyzer

use std::rc::Rc;

use crate::ctx::Context;
use crate::diag::Position;
use crate::token::{Token, TokenKind};

/// Turn source text into a sequence of tokens.
///
/// The scanner holds a byte cursor into the source and never fails: a byte it
/// cannot place in any token is reported on standard error and surfaces as an
/// [`TokenKind::Illegal`] token, after which scanning continues.  One
/// instance consumes one source.
#[derive(Debug)]
pub struct Scanner {
    source: Vec<u8>,

    /// Index of the byte currently under examination.
    position: usize,
    /// Index of the byte after the current one.
    read_position: usize,
    /// The byte under examination, 0 once the source is exhausted.
    ch: u8,

    line: Position,
    ctx: Rc<Context>,
}

impl Scanner {
    /// Creates a new scanner operating on `source`.
    pub fn new(source: &str, ctx: Rc<Context>) -> Scanner {
        let mut scanner = Scanner {
            source: source.as_bytes().to_vec(),
            position: 0,
            read_position: 0,
            ch: 0,
            line: 1,
            ctx,
        };
        scanner.read_char();
        scanner
    }

    /// Scan the next token and return it with the line it started on.
    ///
    /// Returns `Eof` forever once the source is exhausted.
    pub fn get_token(&mut self) -> (Position, Token) {
        self.skip_whitespace();
        let line = self.line;
        let token = match self.ch {
            0 => Token::new(TokenKind::Eof, ""),
            b'(' => self.single(TokenKind::LeftParen),
            b')' => self.single(TokenKind::RightParen),
            b'{' => self.single(TokenKind::LeftBrace),
            b'}' => self.single(TokenKind::RightBrace),
            // Square brackets alias round ones.
            b'[' => self.single(TokenKind::LeftParen),
            b']' => self.single(TokenKind::RightParen),
            b',' => self.single(TokenKind::Comma),
            b'.' => self.single(TokenKind::Dot),
            b':' => self.single(TokenKind::Colon),
            b';' => self.single(TokenKind::Semicolon),
            b'+' => self.single(TokenKind::Plus),
            b'-' => self.single(TokenKind::Minus),
            b'*' => self.single(TokenKind::Star),
            b'/' => {
                if self.peek_next() == b'/' {
                    self.scan_comment()
                } else {
                    self.single(TokenKind::Slash)
                }
            }
            b'=' => self.one_or_two(TokenKind::Equal, TokenKind::EqualEqual),
            b'!' => self.one_or_two(TokenKind::Bang, TokenKind::BangEqual),
            b'<' => self.one_or_two(TokenKind::Less, TokenKind::LessEqual),
            b'>' => self.one_or_two(TokenKind::Greater, TokenKind::GreaterEqual),
            b'"' => self.scan_string(),
            b'0'..=b'9' => self.scan_number(),
            ch if is_alpha(ch) => self.scan_identifier(),
            ch => {
                eprintln!("[line {}] Error: Unexpected character: {}", self.line, ch as char);
                Token::new(TokenKind::Illegal, (ch as char).to_string())
            }
        };
        self.read_char();
        (line, token)
    }

    fn single(&self, kind: TokenKind) -> Token {
        Token::new(kind, (self.ch as char).to_string())
    }

    /// Longest-match dispatch for the `= == ! != < <= > >=` family.
    fn one_or_two(&mut self, one: TokenKind, two: TokenKind) -> Token {
        if self.peek_next() == b'=' {
            let start = self.position;
            self.read_char();
            Token::new(two, self.lexeme(start, self.read_position))
        } else {
            self.single(one)
        }
    }

    /// One or more digits, optionally followed by `.` and one or more digits.
    ///
    /// A `.` with no digit after it is not part of the number; the number
    /// ends before it.
    fn scan_number(&mut self) -> Token {
        let start = self.position;
        while is_digit(self.peek_next()) {
            self.read_char();
        }
        let after_dot = self.source.get(self.read_position + 1).copied().unwrap_or(0);
        if self.peek_next() == b'.' && is_digit(after_dot) {
            self.read_char();
            while is_digit(self.peek_next()) {
                self.read_char();
            }
        }
        Token::new(TokenKind::Number, self.lexeme(start, self.read_position))
    }

    /// Everything up to the closing quote, quotes stripped, no escapes.
    fn scan_string(&mut self) -> Token {
        let start = self.position + 1;
        while self.peek_next() != b'"' && !self.at_end() {
            self.read_char();
            if self.ch == b'\n' {
                self.line += 1;
            }
        }
        if self.at_end() {
            eprintln!("[line {}] Error: Unterminated string.", self.line);
            return Token::new(TokenKind::Illegal, "\"");
        }
        let contents = self.lexeme(start, self.read_position);
        self.read_char();
        Token::new(TokenKind::String, contents)
    }

    /// Rest of the line after `//`, excluding the newline.
    fn scan_comment(&mut self) -> Token {
        self.read_char();
        let start = self.read_position;
        while self.peek_next() != b'\n' && self.peek_next() != 0 {
            self.read_char();
        }
        Token::new(TokenKind::Comment, self.lexeme(start, self.read_position))
    }

    fn scan_identifier(&mut self) -> Token {
        let start = self.position;
        while is_alphanumeric(self.peek_next()) {
            self.read_char();
        }
        let text = self.lexeme(start, self.read_position);
        let sym = self.ctx.symbol(&text);
        match self.ctx.keyword(&sym) {
            Some(kind) => Token::new(kind, text),
            None => Token::new(TokenKind::Identifier, text),
        }
    }

    fn read_char(&mut self) {
        self.ch = self.source.get(self.read_position).copied().unwrap_or(0);
        self.position = self.read_position;
        self.read_position += 1;
    }

    fn peek_next(&self) -> u8 {
        self.source.get(self.read_position).copied().unwrap_or(0)
    }

    fn at_end(&self) -> bool {
        self.position >= self.source.len()
    }

    fn lexeme(&self, start: usize, end: usize) -> String {
        let end = end.min(self.source.len());
        String::from_utf8_lossy(&self.source[start..end]).into_owned()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.ch, b' ' | b'\t' | b'\n') {
            if self.ch == b'\n' {
                self.line += 1;
            }
            self.read_char();
        }
    }
}

impl Iterator for Scanner {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        match self.get_token() {
            (_, token) if token.kind == TokenKind::Eof => None,
            (_, token) => Some(token),
        }
    }
}

fn is_digit(ch: u8) -> bool {
    ch.is_ascii_digit()
}

fn is_alpha(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || ch == b'_'
}

fn is_alphanumeric(ch: u8) -> bool {
    is_digit(ch) || is_alpha(ch)
}
