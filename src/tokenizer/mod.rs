//=============================================
// File: tokenizer/mod.rs
//=============================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Lexer for the body of .theta schema files
// Objective: Turn source text into positioned tokens for the parser
//=============================================

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Identifier(String),
    DocComment(String),
    Import,
    Type,
    Enum,
    Newtype,
    Dot,
    Colon,
    Comma,
    Equals,
    Pipe,
    Question,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Identifier(name) => write!(f, "identifier '{}'", name),
            TokenKind::DocComment(_) => f.write_str("doc comment"),
            TokenKind::Import => f.write_str("'import'"),
            TokenKind::Type => f.write_str("'type'"),
            TokenKind::Enum => f.write_str("'enum'"),
            TokenKind::Newtype => f.write_str("'newtype'"),
            TokenKind::Dot => f.write_str("'.'"),
            TokenKind::Colon => f.write_str("':'"),
            TokenKind::Comma => f.write_str("','"),
            TokenKind::Equals => f.write_str("'='"),
            TokenKind::Pipe => f.write_str("'|'"),
            TokenKind::Question => f.write_str("'?'"),
            TokenKind::LeftBrace => f.write_str("'{'"),
            TokenKind::RightBrace => f.write_str("'}'"),
            TokenKind::LeftBracket => f.write_str("'['"),
            TokenKind::RightBracket => f.write_str("']'"),
            TokenKind::Eof => f.write_str("end of input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizeError {
    pub message: String,
    pub position: Position,
}

pub struct Tokenizer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::starting_at(source, Position::new(1, 1))
    }

    /// Start counting positions from `start`; used when the body follows a header.
    pub fn starting_at(source: &'a str, start: Position) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: start.line,
            column: start.column,
        }
    }

    /// Tokenize the whole input. The result always ends with `Eof`.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, TokenizeError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            let position = self.position();
            let Some(c) = self.advance() else {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    position,
                });
                return Ok(tokens);
            };

            let kind = match c {
                '.' => TokenKind::Dot,
                ':' => TokenKind::Colon,
                ',' => TokenKind::Comma,
                '=' => TokenKind::Equals,
                '|' => TokenKind::Pipe,
                '?' => TokenKind::Question,
                '{' => TokenKind::LeftBrace,
                '}' => TokenKind::RightBrace,
                '[' => TokenKind::LeftBracket,
                ']' => TokenKind::RightBracket,
                '/' => match self.advance() {
                    Some('/') => {
                        self.skip_line();
                        continue;
                    }
                    Some('*') => match self.block_comment(position)? {
                        Some(doc) => TokenKind::DocComment(doc),
                        None => continue,
                    },
                    _ => {
                        return Err(TokenizeError {
                            message: "stray '/'".into(),
                            position,
                        });
                    }
                },
                c if c.is_ascii_alphabetic() || c == '_' => self.word(c),
                other => {
                    return Err(TokenizeError {
                        message: format!("unexpected character '{}'", other),
                        position,
                    });
                }
            };
            tokens.push(Token { kind, position });
        }
    }

    fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.advance();
        }
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.advance() {
            if c == '\n' {
                break;
            }
        }
    }

    fn word(&mut self, first: char) -> TokenKind {
        let mut word = String::from(first);
        while let Some(&c) = self.chars.peek() {
            if !(c.is_ascii_alphanumeric() || c == '_') {
                break;
            }
            word.push(c);
            self.advance();
        }
        match word.as_str() {
            "import" => TokenKind::Import,
            "type" => TokenKind::Type,
            "enum" => TokenKind::Enum,
            "newtype" => TokenKind::Newtype,
            _ => TokenKind::Identifier(word),
        }
    }

    /// Consume a `/* */` comment. `/** */` comments are returned as docs.
    fn block_comment(&mut self, start: Position) -> Result<Option<String>, TokenizeError> {
        let is_doc = self.chars.peek() == Some(&'*');
        let mut body = String::new();
        loop {
            match self.advance() {
                Some('*') if self.chars.peek() == Some(&'/') => {
                    self.advance();
                    break;
                }
                Some(c) => body.push(c),
                None => {
                    return Err(TokenizeError {
                        message: "unterminated comment".into(),
                        position: start,
                    });
                }
            }
        }
        if !is_doc {
            return Ok(None);
        }
        // `/**/` is an empty block comment, not a doc
        let Some(text) = body.strip_prefix('*') else {
            return Ok(None);
        };
        Ok(Some(clean_doc(text)))
    }
}

/// Strip the leading `*` gutter and surrounding blank lines from a doc comment.
fn clean_doc(text: &str) -> String {
    let lines: Vec<&str> = text
        .lines()
        .map(|line| {
            let trimmed = line.trim();
            trimmed
                .strip_prefix("* ")
                .or_else(|| trimmed.strip_prefix('*'))
                .unwrap_or(trimmed)
        })
        .collect();
    lines.join("\n").trim().to_string()
}


//=============================================
// End of file
//=============================================
