//! Tokenizer for object-literal text
//!
//! Produces only literal tokens: punctuation, strings, numbers and bare
//! identifiers. Anything that could start an expression (operators,
//! template strings, parentheses) is an error here, so the parser never
//! sees it.

use crate::error::{Error, Result};
use serde_json::Number;
use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Colon,
    Comma,
    Equals,
    Semicolon,
    Str(String),
    Number(Number),
    Ident(String),
    Eof,
}

impl Token {
    /// Short description for error messages
    pub(crate) fn describe(&self) -> String {
        match self {
            Token::LeftBrace => "`{`".to_string(),
            Token::RightBrace => "`}`".to_string(),
            Token::LeftBracket => "`[`".to_string(),
            Token::RightBracket => "`]`".to_string(),
            Token::Colon => "`:`".to_string(),
            Token::Comma => "`,`".to_string(),
            Token::Equals => "`=`".to_string(),
            Token::Semicolon => "`;`".to_string(),
            Token::Str(_) => "string".to_string(),
            Token::Number(n) => format!("number `{n}`"),
            Token::Ident(word) => format!("identifier `{word}`"),
            Token::Eof => "end of input".to_string(),
        }
    }
}

/// A token with the 1-based position of its first character
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Spanned {
    pub(crate) token: Token,
    pub(crate) line: usize,
    pub(crate) column: usize,
}

pub(crate) fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

pub(crate) fn is_ident_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

pub(crate) fn parse_error(line: usize, column: usize, message: impl Into<String>) -> Error {
    Error::Parse {
        message: message.into(),
        line,
        column,
    }
}

/// Integer when it fits, otherwise the nearest float
fn hex_number(digits: &str, negative: bool) -> Option<Number> {
    match u64::from_str_radix(digits, 16) {
        Ok(magnitude) if !negative => Some(Number::from(magnitude)),
        Ok(magnitude) => i64::try_from(magnitude)
            .ok()
            .map(|m| Number::from(-m))
            .or_else(|| Number::from_f64(-(magnitude as f64))),
        Err(_) => {
            let magnitude = digits
                .chars()
                .filter_map(|c| c.to_digit(16))
                .fold(0.0, |acc, digit| acc * 16.0 + f64::from(digit));
            Number::from_f64(if negative { -magnitude } else { magnitude })
        }
    }
}

pub(crate) struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    /// Character after the next one
    fn peek_second(&self) -> Option<char> {
        let mut ahead = self.chars.clone();
        ahead.next();
        ahead.next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    pub(crate) fn next_token(&mut self) -> Result<Spanned> {
        self.skip_trivia()?;

        let (line, column) = (self.line, self.column);
        let Some(ch) = self.peek() else {
            return Ok(Spanned {
                token: Token::Eof,
                line,
                column,
            });
        };

        let punct = match ch {
            '{' => Some(Token::LeftBrace),
            '}' => Some(Token::RightBrace),
            '[' => Some(Token::LeftBracket),
            ']' => Some(Token::RightBracket),
            ':' => Some(Token::Colon),
            ',' => Some(Token::Comma),
            '=' => Some(Token::Equals),
            ';' => Some(Token::Semicolon),
            _ => None,
        };

        let token = if let Some(token) = punct {
            self.bump();
            token
        } else if ch == '"' || ch == '\'' {
            Token::Str(self.string(ch)?)
        } else if self.starts_number(ch) {
            Token::Number(self.number()?)
        } else if is_ident_start(ch) {
            Token::Ident(self.identifier())
        } else if ch == '`' {
            return Err(parse_error(line, column, "Template strings are not allowed"));
        } else {
            return Err(parse_error(line, column, format!("Unexpected character `{ch}`")));
        };

        Ok(Spanned {
            token,
            line,
            column,
        })
    }

    fn skip_trivia(&mut self) -> Result<()> {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() || ch == '\u{feff}' {
                self.bump();
                continue;
            }
            if ch != '/' {
                break;
            }

            let (line, column) = (self.line, self.column);
            match self.peek_second() {
                Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                Some('*') => {
                    self.bump();
                    self.bump();
                    loop {
                        match self.bump() {
                            Some('*') if self.peek() == Some('/') => {
                                self.bump();
                                break;
                            }
                            Some(_) => {}
                            None => {
                                return Err(parse_error(line, column, "Unterminated comment"));
                            }
                        }
                    }
                }
                _ => return Err(parse_error(line, column, "Unexpected character `/`")),
            }
        }
        Ok(())
    }

    fn string(&mut self, quote: char) -> Result<String> {
        let (line, column) = (self.line, self.column);
        self.bump();

        let mut out = String::new();
        loop {
            match self.bump() {
                None | Some('\n') | Some('\r') => {
                    return Err(parse_error(line, column, "Unterminated string"));
                }
                Some(c) if c == quote => return Ok(out),
                Some('\\') => self.escape(&mut out, line, column)?,
                Some(c) => out.push(c),
            }
        }
    }

    fn escape(&mut self, out: &mut String, line: usize, column: usize) -> Result<()> {
        let (esc_line, esc_column) = (self.line, self.column.saturating_sub(1));
        let Some(ch) = self.bump() else {
            return Err(parse_error(line, column, "Unterminated string"));
        };

        match ch {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' => out.push('\0'),
            // line continuation
            '\n' => {}
            '\r' => {
                if self.peek() == Some('\n') {
                    self.bump();
                }
            }
            'x' => {
                let code = self.hex_digits(2, esc_line, esc_column)?;
                out.push(self.scalar(code, esc_line, esc_column)?);
            }
            'u' if self.peek() == Some('{') => {
                self.bump();
                let code = self.braced_code_point(esc_line, esc_column)?;
                out.push(self.scalar(code, esc_line, esc_column)?);
            }
            'u' => {
                let high = self.hex_digits(4, esc_line, esc_column)?;
                if (0xD800..0xDC00).contains(&high) {
                    if self.peek() != Some('\\') || self.peek_second() != Some('u') {
                        return Err(parse_error(esc_line, esc_column, "Unpaired surrogate in unicode escape"));
                    }
                    self.bump();
                    self.bump();
                    let low = self.hex_digits(4, esc_line, esc_column)?;
                    if !(0xDC00..0xE000).contains(&low) {
                        return Err(parse_error(esc_line, esc_column, "Unpaired surrogate in unicode escape"));
                    }
                    let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                    out.push(self.scalar(code, esc_line, esc_column)?);
                } else {
                    out.push(self.scalar(high, esc_line, esc_column)?);
                }
            }
            // \\ \' \" \/ and any other identity escape
            other => out.push(other),
        }
        Ok(())
    }

    fn hex_digits(&mut self, count: usize, line: usize, column: usize) -> Result<u32> {
        let mut code = 0u32;
        for _ in 0..count {
            let digit = self
                .peek()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| parse_error(line, column, "Invalid escape sequence"))?;
            self.bump();
            code = code * 16 + digit;
        }
        Ok(code)
    }

    /// Digits of a `\u{...}` escape, after the `{`
    fn braced_code_point(&mut self, line: usize, column: usize) -> Result<u32> {
        let mut code = 0u32;
        let mut digits = 0usize;
        loop {
            match self.bump() {
                Some('}') if digits > 0 => return Ok(code),
                Some(c) => match c.to_digit(16) {
                    Some(digit) if code <= 0x10FFFF => {
                        code = code * 16 + digit;
                        digits += 1;
                    }
                    _ => return Err(parse_error(line, column, "Invalid escape sequence")),
                },
                None => return Err(parse_error(line, column, "Unterminated string")),
            }
        }
    }

    fn scalar(&self, code: u32, line: usize, column: usize) -> Result<char> {
        char::from_u32(code).ok_or_else(|| parse_error(line, column, "Invalid unicode escape"))
    }

    fn starts_number(&self, ch: char) -> bool {
        match ch {
            '0'..='9' => true,
            '+' | '-' | '.' => matches!(self.peek_second(), Some('0'..='9' | '.')),
            _ => false,
        }
    }

    fn number(&mut self) -> Result<Number> {
        let (line, column) = (self.line, self.column);
        let mut text = String::new();

        let negative = match self.peek() {
            Some('-') => {
                self.bump();
                true
            }
            Some('+') => {
                self.bump();
                false
            }
            _ => false,
        };

        if self.peek() == Some('0') && matches!(self.peek_second(), Some('x' | 'X')) {
            self.bump();
            self.bump();
            while let Some(c) = self.peek().filter(char::is_ascii_hexdigit) {
                text.push(c);
                self.bump();
            }
            self.reject_trailing_ident(line, column)?;
            if text.is_empty() {
                return Err(parse_error(line, column, "Invalid hexadecimal number"));
            }
            return hex_number(&text, negative)
                .ok_or_else(|| parse_error(line, column, "Number out of range"));
        }

        if negative {
            text.push('-');
        }

        let mut digits = 0usize;
        let mut is_float = false;

        while let Some(c) = self.peek().filter(char::is_ascii_digit) {
            text.push(c);
            digits += 1;
            self.bump();
        }

        if self.peek() == Some('.') {
            is_float = true;
            text.push('.');
            self.bump();
            while let Some(c) = self.peek().filter(char::is_ascii_digit) {
                text.push(c);
                digits += 1;
                self.bump();
            }
        }

        if digits == 0 {
            return Err(parse_error(line, column, "Invalid number"));
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            is_float = true;
            text.push('e');
            self.bump();
            if let Some(sign @ ('+' | '-')) = self.peek() {
                text.push(sign);
                self.bump();
            }
            let mut exponent_digits = 0usize;
            while let Some(c) = self.peek().filter(char::is_ascii_digit) {
                text.push(c);
                exponent_digits += 1;
                self.bump();
            }
            if exponent_digits == 0 {
                return Err(parse_error(line, column, "Invalid number exponent"));
            }
        }

        self.reject_trailing_ident(line, column)?;

        if !is_float {
            if let Ok(value) = text.parse::<i64>() {
                return Ok(Number::from(value));
            }
            if let Ok(value) = text.parse::<u64>() {
                return Ok(Number::from(value));
            }
        }

        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .ok_or_else(|| parse_error(line, column, "Number out of range"))
    }

    fn reject_trailing_ident(&mut self, line: usize, column: usize) -> Result<()> {
        match self.peek() {
            Some(c) if is_ident_continue(c) => Err(parse_error(
                line,
                column,
                format!("Unexpected character `{c}` after number"),
            )),
            _ => Ok(()),
        }
    }

    fn identifier(&mut self) -> String {
        let mut word = String::new();
        while let Some(c) = self.peek().filter(|c| is_ident_continue(*c)) {
            word.push(c);
            self.bump();
        }
        word
    }
}
