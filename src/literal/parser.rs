//! Recursive-descent parser for object-literal text
//!
//! Grammar (after tokenizing):
//!
//! ```text
//! document := declaration? object ";"? EOF
//! declaration := ("const" | "let" | "var") IDENT "="
//! value    := object | array | STRING | NUMBER | "true" | "false" | "null" | "undefined"
//! object   := "{" (key ":" value ("," key ":" value)* ","?)? "}"
//! array    := "[" (value ("," value)* ","?)? "]"
//! key      := IDENT | STRING | NUMBER
//! ```
//!
//! The optional declaration wrapper accepts the snippet exactly as the
//! Firebase console prints it (`const firebaseConfig = { ... };`).

use super::lexer::{Lexer, Spanned, Token, parse_error};
use crate::constants::MAX_NESTING_DEPTH;
use crate::error::Result;
use serde_json::{Map, Value};

/// Parse relaxed object-literal text into a JSON object
pub fn parse_object(input: &str) -> Result<Map<String, Value>> {
    let mut parser = Parser::new(input)?;
    parser.skip_declaration()?;

    let open = parser.advance()?;
    if open.token != Token::LeftBrace {
        return Err(parse_error(
            open.line,
            open.column,
            format!("Expected `{{` but found {}", open.token.describe()),
        ));
    }

    let map = parser.object_body(open.line, open.column)?;

    if parser.current.token == Token::Semicolon {
        parser.advance()?;
    }
    if parser.current.token != Token::Eof {
        return Err(parser.unexpected());
    }

    Ok(map)
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Spanned,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Result<Self> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            depth: 0,
        })
    }

    /// Consume the current token and return it
    fn advance(&mut self) -> Result<Spanned> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn unexpected(&self) -> crate::error::Error {
        parse_error(
            self.current.line,
            self.current.column,
            format!("Unexpected {}", self.current.token.describe()),
        )
    }

    fn skip_declaration(&mut self) -> Result<()> {
        let Token::Ident(word) = &self.current.token else {
            return Ok(());
        };
        if !matches!(word.as_str(), "const" | "let" | "var") {
            return Ok(());
        }

        self.advance()?;
        let name = self.advance()?;
        if !matches!(name.token, Token::Ident(_)) {
            return Err(parse_error(name.line, name.column, "Expected a variable name"));
        }
        let equals = self.advance()?;
        if equals.token != Token::Equals {
            return Err(parse_error(
                equals.line,
                equals.column,
                format!("Expected `=` but found {}", equals.token.describe()),
            ));
        }
        Ok(())
    }

    fn enter(&mut self, line: usize, column: usize) -> Result<()> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(parse_error(line, column, "Config is nested too deeply"));
        }
        self.depth += 1;
        Ok(())
    }

    fn value(&mut self) -> Result<Value> {
        // Checked before advancing so `process.env.KEY` reports the identifier,
        // not the `.` after it.
        if let Token::Ident(word) = &self.current.token {
            if !matches!(word.as_str(), "true" | "false" | "null" | "undefined") {
                return Err(parse_error(
                    self.current.line,
                    self.current.column,
                    format!("Unexpected identifier `{word}`, only literal values are allowed"),
                ));
            }
        }

        let spanned = self.advance()?;
        match spanned.token {
            Token::LeftBrace => self
                .object_body(spanned.line, spanned.column)
                .map(Value::Object),
            Token::LeftBracket => self
                .array_body(spanned.line, spanned.column)
                .map(Value::Array),
            Token::Str(s) => Ok(Value::String(s)),
            Token::Number(n) => Ok(Value::Number(n)),
            Token::Ident(word) => match word.as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Ok(Value::Null),
            },
            Token::Eof => Err(parse_error(
                spanned.line,
                spanned.column,
                "Unexpected end of input",
            )),
            other => Err(parse_error(
                spanned.line,
                spanned.column,
                format!("Unexpected {}", other.describe()),
            )),
        }
    }

    /// Parse the members of an object whose `{` was already consumed
    fn object_body(&mut self, line: usize, column: usize) -> Result<Map<String, Value>> {
        self.enter(line, column)?;
        let mut map = Map::new();

        loop {
            if self.current.token == Token::RightBrace {
                self.advance()?;
                break;
            }

            let key = self.advance()?;
            let name = match key.token {
                Token::Ident(word) | Token::Str(word) => word,
                Token::Number(n) => n.to_string(),
                Token::Eof => {
                    return Err(parse_error(key.line, key.column, "Unterminated object"));
                }
                other => {
                    return Err(parse_error(
                        key.line,
                        key.column,
                        format!("Expected a property name but found {}", other.describe()),
                    ));
                }
            };

            if self.current.token != Token::Colon {
                return Err(parse_error(
                    self.current.line,
                    self.current.column,
                    format!("Expected `:` after `{name}`"),
                ));
            }
            self.advance()?;

            let value = self.value()?;
            map.insert(name, value);

            match self.current.token {
                Token::Comma => {
                    self.advance()?;
                }
                Token::RightBrace => {
                    self.advance()?;
                    break;
                }
                Token::Eof => {
                    return Err(parse_error(line, column, "Unterminated object"));
                }
                _ => {
                    return Err(parse_error(
                        self.current.line,
                        self.current.column,
                        format!("Expected `,` or `}}` but found {}", self.current.token.describe()),
                    ));
                }
            }
        }

        self.depth -= 1;
        Ok(map)
    }

    /// Parse the items of an array whose `[` was already consumed
    fn array_body(&mut self, line: usize, column: usize) -> Result<Vec<Value>> {
        self.enter(line, column)?;
        let mut items = Vec::new();

        loop {
            if self.current.token == Token::RightBracket {
                self.advance()?;
                break;
            }

            items.push(self.value()?);

            match self.current.token {
                Token::Comma => {
                    self.advance()?;
                }
                Token::RightBracket => {
                    self.advance()?;
                    break;
                }
                Token::Eof => {
                    return Err(parse_error(line, column, "Unterminated array"));
                }
                _ => {
                    return Err(parse_error(
                        self.current.line,
                        self.current.column,
                        format!("Expected `,` or `]` but found {}", self.current.token.describe()),
                    ));
                }
            }
        }

        self.depth -= 1;
        Ok(items)
    }
}
