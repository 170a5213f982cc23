//! FILENAME: core/parser/src/lexer.rs
//! PURPOSE: Scans a raw formula string and produces a stream of Tokens.
//! CONTEXT: This is the first stage of the parsing pipeline. It handles
//! whitespace skipping, number parsing (with `.` or `,` as decimal separator),
//! identifiers (PI, E, function keywords, the free variable), and constant
//! symbols introduced by `#`. It also tracks the character offset of every
//! token so the parser can report where an error occurred.
//!
//! ERROR LATCH: once an error token (Illegal, Unknown, Malformed) has been
//! produced, every further call yields EOF.

use crate::ast::Function;
use crate::constants::{is_symbol_char, lookup_constant, CONSTANT_MARKER};
use crate::options::DEFAULT_VARIABLE_NAME;
use crate::token::Token;
use std::iter::Peekable;
use std::str::Chars;

pub struct Lexer<'a> {
    input: Peekable<Chars<'a>>,
    variable_name: &'a str,
    /// Characters consumed so far.
    pos: usize,
    /// Offset of the first character of the last token returned.
    token_start: usize,
    failed: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::with_variable(input, DEFAULT_VARIABLE_NAME)
    }

    pub fn with_variable(input: &'a str, variable_name: &'a str) -> Self {
        Lexer {
            input: input.chars().peekable(),
            variable_name,
            pos: 0,
            token_start: 0,
            failed: false,
        }
    }

    /// Zero-based character offset where the last returned token starts.
    pub fn token_start(&self) -> usize {
        self.token_start
    }

    /// Advances the lexer and returns the next token.
    pub fn next_token(&mut self) -> Token {
        if self.failed {
            self.token_start = self.pos;
            return Token::EOF;
        }

        self.skip_whitespace();
        self.token_start = self.pos;

        let token = match self.bump() {
            Some('+') => Token::Plus,
            Some('-') => Token::Minus,
            Some('*') => Token::Asterisk,
            Some('/') => Token::Slash,
            Some('^') => Token::Caret,
            Some('(') => Token::LParen,
            Some(')') => Token::RParen,

            Some(CONSTANT_MARKER) => self.read_constant(),

            Some(ch) if ch.is_ascii_digit() => self.read_number(ch),

            Some(ch) if ch.is_ascii_alphabetic() => self.read_identifier(ch),

            // End of input
            None => Token::EOF,

            // Unknown character
            Some(ch) => Token::Illegal(ch),
        };

        if token.is_error() {
            self.failed = true;
        }
        token
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.input.next();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn skip_whitespace(&mut self) {
        while let Some(&ch) = self.input.peek() {
            if !ch.is_whitespace() {
                break;
            }
            self.bump();
        }
    }

    /// Appends consecutive digits to `text` and returns how many were read.
    fn read_digits(&mut self, text: &mut String) -> usize {
        let mut count = 0;
        while let Some(&ch) = self.input.peek() {
            if !ch.is_ascii_digit() {
                break;
            }
            text.push(ch);
            self.bump();
            count += 1;
        }
        count
    }

    fn read_number(&mut self, first_char: char) -> Token {
        let mut number_str = String::from(first_char);
        self.read_digits(&mut number_str);

        if let Some(&sep) = self.input.peek() {
            if sep == '.' || sep == ',' {
                self.bump();
                number_str.push('.');
                if self.read_digits(&mut number_str) == 0 {
                    return Token::Malformed(number_str);
                }
            }
        }

        if self.exponent_follows() {
            // Marker and optional sign
            if let Some(marker) = self.bump() {
                number_str.push(marker);
            }
            if let Some(&sign) = self.input.peek() {
                if sign == '+' || sign == '-' {
                    number_str.push(sign);
                    self.bump();
                }
            }
            if self.read_digits(&mut number_str) == 0 {
                return Token::Malformed(number_str);
            }
        }

        match number_str.parse::<f64>() {
            Ok(n) if n.is_finite() => Token::Number(n),
            _ => Token::Malformed(number_str),
        }
    }

    /// An `E`/`e` after a number only starts an exponent when a digit or a
    /// sign comes next; otherwise it is left for the next token.
    fn exponent_follows(&self) -> bool {
        let mut ahead = self.input.clone();
        match ahead.next() {
            Some('e') | Some('E') => {}
            _ => return false,
        }
        matches!(ahead.next(), Some(ch) if ch.is_ascii_digit() || ch == '+' || ch == '-')
    }

    fn read_identifier(&mut self, first_char: char) -> Token {
        let mut ident = String::from(first_char);

        while let Some(&ch) = self.input.peek() {
            if !ch.is_ascii_alphabetic() {
                break;
            }
            ident.push(ch);
            self.bump();
        }

        match ident.to_uppercase().as_str() {
            "PI" => Token::Number(std::f64::consts::PI),
            "E" => {
                if self.input.peek() == Some(&'^') {
                    self.bump();
                    Token::ExpPower
                } else {
                    Token::Number(std::f64::consts::E)
                }
            }
            upper => {
                if let Some(func) = Function::from_keyword(upper) {
                    Token::Function(func)
                } else if ident.eq_ignore_ascii_case(self.variable_name) {
                    Token::Variable
                } else {
                    Token::Unknown(ident)
                }
            }
        }
    }

    /// Reads a constant symbol after the `#` marker.
    fn read_constant(&mut self) -> Token {
        let mut symbol = String::new();

        while let Some(&ch) = self.input.peek() {
            if !is_symbol_char(ch) {
                break;
            }
            symbol.push(ch);
            self.bump();
        }

        match lookup_constant(&symbol) {
            Some(constant) => Token::Constant(constant),
            None => Token::Unknown(format!("{}{}", CONSTANT_MARKER, symbol)),
        }
    }
}
