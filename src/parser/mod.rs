//=============================================
// File: parser/mod.rs
//=============================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Recursive descent parser for .theta schema files
// Objective: Turn source text into a raw module with unresolved imports
//=============================================

//=============================================
//            Section 1: Imports
//=============================================

use crate::name::{ModuleName, Name, NameError};
use crate::tokenizer::{Position, Token, TokenKind, Tokenizer};
use crate::types::{Case, Definition, EnumSymbol, Field, Primitive, Type};
use semver::Version;
use thiserror::Error;

//=============================================
//            Section 2: Parse Errors
//=============================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected {expected} but found {found} at {position}")]
    UnexpectedToken {
        expected: String,
        found: TokenKind,
        position: Position,
    },
    #[error("{message} at {position}")]
    Tokenize { message: String, position: Position },
    #[error("invalid header line {line}: {message}")]
    InvalidHeader { line: usize, message: String },
    #[error("header is missing '{0}'")]
    MissingHeaderField(&'static str),
    #[error("header is not terminated by '---'")]
    UnterminatedHeader,
    #[error("invalid name at {position}: {error}")]
    InvalidName { error: NameError, position: Position },
}

//=============================================
//            Section 3: Raw Modules
//=============================================

/// Versions declared in the `---`-terminated header of a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub language_version: Version,
    pub target_version: Version,
}

/// A parsed module whose imports are still bare names.
#[derive(Debug, Clone, PartialEq)]
pub struct RawModule {
    pub header: Header,
    pub imports: Vec<ModuleName>,
    pub definitions: Vec<Definition>,
}

/// Source text -> raw module. The loader depends only on this seam.
pub trait ModuleParser: Send + Sync {
    /// `module` qualifies unqualified names declared or referenced in `source`.
    fn parse(&self, module: &ModuleName, source: &str) -> Result<RawModule, ParseError>;
}

/// The stock `.theta` grammar.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThetaParser;

impl ModuleParser for ThetaParser {
    fn parse(&self, module: &ModuleName, source: &str) -> Result<RawModule, ParseError> {
        parse_module(module, source)
    }
}

pub fn parse_module(module: &ModuleName, source: &str) -> Result<RawModule, ParseError> {
    let (header, body, body_start) = parse_header(source)?;
    let tokens = Tokenizer::starting_at(body, body_start)
        .tokenize()
        .map_err(|error| ParseError::Tokenize {
            message: error.message,
            position: error.position,
        })?;
    let mut parser = Parser::new(module, tokens);
    let (imports, definitions) = parser.parse()?;
    Ok(RawModule {
        header,
        imports,
        definitions,
    })
}

//=============================================
//            Section 4: Header
//=============================================

const LANGUAGE_VERSION_KEY: &str = "language-version";
const TARGET_VERSION_KEYS: [&str; 2] = ["avro-version", "target-version"];
const HEADER_END: &str = "---";

fn parse_header(source: &str) -> Result<(Header, &str, Position), ParseError> {
    let mut language_version = None;
    let mut target_version = None;
    let mut offset = 0;

    for (index, line) in source.split_inclusive('\n').enumerate() {
        let number = index + 1;
        offset += line.len();
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }
        if trimmed == HEADER_END {
            let header = Header {
                language_version: language_version
                    .ok_or(ParseError::MissingHeaderField(LANGUAGE_VERSION_KEY))?,
                target_version: target_version
                    .ok_or(ParseError::MissingHeaderField(TARGET_VERSION_KEYS[0]))?,
            };
            return Ok((header, &source[offset..], Position::new(number + 1, 1)));
        }

        let invalid = |message: String| ParseError::InvalidHeader {
            line: number,
            message,
        };
        let (key, value) = trimmed
            .split_once(':')
            .ok_or_else(|| invalid(format!("expected 'key: value', found '{}'", trimmed)))?;
        let (key, value) = (key.trim(), value.trim());
        let version = Version::parse(value)
            .map_err(|error| invalid(format!("'{}' is not a version: {}", value, error)))?;
        if key == LANGUAGE_VERSION_KEY {
            language_version = Some(version);
        } else if TARGET_VERSION_KEYS.contains(&key) {
            target_version = Some(version);
        } else {
            return Err(invalid(format!("unknown key '{}'", key)));
        }
    }

    Err(ParseError::UnterminatedHeader)
}

//=============================================
//            Section 5: Parser State
//=============================================

struct Parser<'m> {
    module: &'m ModuleName,
    tokens: Vec<Token>,
    current: usize,
}

impl<'m> Parser<'m> {
    fn new(module: &'m ModuleName, tokens: Vec<Token>) -> Self {
        Self {
            module,
            tokens,
            current: 0,
        }
    }

    fn parse(&mut self) -> Result<(Vec<ModuleName>, Vec<Definition>), ParseError> {
        let mut imports = Vec::new();
        let mut definitions = Vec::new();

        while !self.is_at_end() {
            let doc = self.doc();
            match self.peek().kind {
                TokenKind::Import if doc.is_none() => {
                    self.advance();
                    imports.push(self.module_name()?);
                }
                TokenKind::Type => definitions.push(self.type_definition(doc)?),
                TokenKind::Enum => definitions.push(self.enum_definition(doc)?),
                TokenKind::Newtype => definitions.push(self.newtype_definition(doc)?),
                _ => return Err(self.unexpected("a definition or import")),
            }
        }

        Ok((imports, definitions))
    }

    //=============================================
    //            Section 6: Token Navigation
    //=============================================

    fn peek(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.current.min(last)]
    }

    fn peek_next(&self) -> &TokenKind {
        self.peek_at(1)
    }

    fn peek_at(&self, offset: usize) -> &TokenKind {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.current + offset).min(last)].kind
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&kind.to_string()))
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let token = self.peek();
        ParseError::UnexpectedToken {
            expected: expected.to_string(),
            found: token.kind.clone(),
            position: token.position,
        }
    }

    fn doc(&mut self) -> Option<String> {
        let mut doc = None;
        while let TokenKind::DocComment(text) = &self.peek().kind {
            doc = Some(text.clone());
            self.advance();
        }
        doc
    }

    fn identifier(&mut self) -> Result<(String, Position), ParseError> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Identifier(name) => {
                self.advance();
                Ok((name, token.position))
            }
            _ => Err(self.unexpected("an identifier")),
        }
    }

    /// `a.b.c`, returned segment by segment.
    fn dotted(&mut self) -> Result<(Vec<String>, Position), ParseError> {
        let (first, position) = self.identifier()?;
        let mut segments = vec![first];
        while self.eat(&TokenKind::Dot) {
            segments.push(self.identifier()?.0);
        }
        Ok((segments, position))
    }

    fn module_name(&mut self) -> Result<ModuleName, ParseError> {
        let (segments, position) = self.dotted()?;
        ModuleName::parse(&segments.join("."))
            .map_err(|error| ParseError::InvalidName { error, position })
    }

    fn local_name(&mut self) -> Result<Name, ParseError> {
        let (name, position) = self.identifier()?;
        Name::new(self.module.clone(), name)
            .map_err(|error| ParseError::InvalidName { error, position })
    }

    //=============================================
    //            Section 7: Definitions
    //=============================================

    fn definition_head(&mut self, keyword: TokenKind) -> Result<Name, ParseError> {
        self.expect(keyword)?;
        let name = self.local_name()?;
        self.expect(TokenKind::Equals)?;
        Ok(name)
    }

    fn type_definition(&mut self, doc: Option<String>) -> Result<Definition, ParseError> {
        let name = self.definition_head(TokenKind::Type)?;
        let ty = match self.peek().kind {
            TokenKind::LeftBrace if self.starts_record() => Type::Record(self.fields()?),
            TokenKind::DocComment(_) => Type::Variant(self.cases()?),
            TokenKind::Identifier(_) if matches!(self.peek_next(), TokenKind::LeftBrace) => {
                Type::Variant(self.cases()?)
            }
            _ => self.type_expr()?,
        };
        Ok(Definition { name, doc, ty })
    }

    /// `{` opens a record body unless it wraps a bare map value type.
    fn starts_record(&self) -> bool {
        match self.peek_at(1) {
            TokenKind::RightBrace | TokenKind::DocComment(_) => true,
            TokenKind::Identifier(_) => matches!(self.peek_at(2), TokenKind::Colon),
            _ => false,
        }
    }

    fn enum_definition(&mut self, doc: Option<String>) -> Result<Definition, ParseError> {
        let name = self.definition_head(TokenKind::Enum)?;
        let mut symbols = Vec::new();
        loop {
            let doc = self.doc();
            let (symbol, _) = self.identifier()?;
            symbols.push(EnumSymbol { name: symbol, doc });
            if !self.eat(&TokenKind::Pipe) {
                break;
            }
        }
        Ok(Definition {
            name,
            doc,
            ty: Type::Enum(symbols),
        })
    }

    fn newtype_definition(&mut self, doc: Option<String>) -> Result<Definition, ParseError> {
        let name = self.definition_head(TokenKind::Newtype)?;
        let inner = self.type_expr()?;
        Ok(Definition {
            name,
            doc,
            ty: Type::Newtype(Box::new(inner)),
        })
    }

    fn cases(&mut self) -> Result<Vec<Case>, ParseError> {
        let mut cases = Vec::new();
        loop {
            let doc = self.doc();
            let name = self.local_name()?;
            let fields = self.fields()?;
            cases.push(Case { name, doc, fields });
            if !self.eat(&TokenKind::Pipe) {
                break;
            }
        }
        Ok(cases)
    }

    /// `{ name : Type, ... }` with an optional trailing comma.
    fn fields(&mut self) -> Result<Vec<Field>, ParseError> {
        self.expect(TokenKind::LeftBrace)?;
        let mut fields = Vec::new();
        loop {
            let doc = self.doc();
            if self.eat(&TokenKind::RightBrace) {
                break;
            }
            let (name, _) = self.identifier()?;
            self.expect(TokenKind::Colon)?;
            let ty = self.type_expr()?;
            fields.push(Field { name, doc, ty });
            if !self.eat(&TokenKind::Comma) {
                self.doc();
                self.expect(TokenKind::RightBrace)?;
                break;
            }
        }
        Ok(fields)
    }

    //=============================================
    //            Section 8: Type Expressions
    //=============================================

    fn type_expr(&mut self) -> Result<Type, ParseError> {
        let mut ty = match self.peek().kind {
            TokenKind::LeftBracket => {
                self.advance();
                let item = self.type_expr()?;
                self.expect(TokenKind::RightBracket)?;
                Type::Array(Box::new(item))
            }
            TokenKind::LeftBrace => {
                self.advance();
                let value = self.type_expr()?;
                self.expect(TokenKind::RightBrace)?;
                Type::Map(Box::new(value))
            }
            TokenKind::Identifier(_) => self.named_type()?,
            _ => return Err(self.unexpected("a type")),
        };
        while self.eat(&TokenKind::Question) {
            ty = Type::Optional(Box::new(ty));
        }
        Ok(ty)
    }

    fn named_type(&mut self) -> Result<Type, ParseError> {
        let (mut segments, position) = self.dotted()?;
        let invalid = |error| ParseError::InvalidName { error, position };
        if segments.len() == 1 {
            let local = segments.remove(0);
            if let Some(primitive) = Primitive::from_keyword(&local) {
                return Ok(Type::Primitive(primitive));
            }
            return Name::new(self.module.clone(), local)
                .map(Type::Reference)
                .map_err(invalid);
        }
        Name::parse(&segments.join("."))
            .map(Type::Reference)
            .map_err(invalid)
    }
}


//=============================================
// End of file
//=============================================
