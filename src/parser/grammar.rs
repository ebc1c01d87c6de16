use tracing::{debug, trace};

use crate::error::ParseError;
use super::ast::*;
use super::comments::collect_leading;
use super::config::ParseOptions;
use super::lexer::{Position, TokenKind};
use super::source::TokenSource;

/// Keywords the grammar dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    Syntax,
    Package,
    Import,
    Option,
    Message,
    Enum,
    Service,
    Oneof,
    Reserved,
    Map,
    Rpc,
    Repeated,
    Optional,
    Required,
}

impl Keyword {
    fn from_text(text: &str) -> Option<Keyword> {
        let kw = match text {
            "syntax" => Keyword::Syntax,
            "package" => Keyword::Package,
            "import" => Keyword::Import,
            "option" => Keyword::Option,
            "message" => Keyword::Message,
            "enum" => Keyword::Enum,
            "service" => Keyword::Service,
            "oneof" => Keyword::Oneof,
            "reserved" => Keyword::Reserved,
            "map" => Keyword::Map,
            "rpc" => Keyword::Rpc,
            "repeated" => Keyword::Repeated,
            "optional" => Keyword::Optional,
            "required" => Keyword::Required,
            _ => return None,
        };
        Some(kw)
    }
}

/// Recursive-descent parser over a [`TokenSource`].
///
/// Each `parse_*` entry point parses one construct starting at the cursor,
/// including any comments leading it, and leaves the cursor right after the
/// construct. The parser never recovers: the first error aborts the parse.
pub struct Parser<S> {
    source: S,
    options: ParseOptions,
    depth: usize,
    /// Line of the last significant token consumed.
    last_line: usize,
}

impl<S: TokenSource> Parser<S> {
    pub fn new(source: S) -> Self {
        Parser::with_options(source, ParseOptions::default())
    }

    pub fn with_options(source: S, options: ParseOptions) -> Self {
        Parser {
            source,
            options,
            depth: 0,
            last_line: 0,
        }
    }

    /// Whether the cursor has reached the end of input.
    pub fn is_eof(&self) -> bool {
        self.source.current_kind() == TokenKind::Eof
    }

    /// Fail unless only comments remain before end of input.
    pub fn expect_end(&mut self) -> Result<(), ParseError> {
        self.skip_comments();
        if self.is_eof() {
            Ok(())
        } else {
            Err(self.unexpected("end of input", "file"))
        }
    }

    /// Parse a whole file: every top-level statement up to end of input.
    pub fn parse_file(&mut self) -> Result<AstFile, ParseError> {
        let mut items = Vec::new();
        let mut boundary = None;

        loop {
            let comments = collect_leading(&mut self.source, boundary);
            if self.is_eof() {
                break;
            }

            let item = match self.keyword() {
                Some(Keyword::Syntax) => Some(AstItem::Syntax(self.syntax(comments)?)),
                Some(Keyword::Package) => Some(AstItem::Package(self.package(comments)?)),
                Some(Keyword::Import) => Some(AstItem::Import(self.import(comments)?)),
                Some(Keyword::Option) => Some(AstItem::Option(self.option(comments)?)),
                Some(Keyword::Message) => Some(AstItem::Message(self.message(comments)?)),
                Some(Keyword::Enum) => Some(AstItem::Enum(self.enumeration(comments)?)),
                Some(Keyword::Service) => Some(AstItem::Service(self.service(comments)?)),
                _ if self.at(";") => {
                    self.bump();
                    None
                }
                _ => {
                    self.skip_unknown()?;
                    None
                }
            };

            items.extend(item);
            boundary = Some(self.last_line);
        }

        debug!(items = items.len(), "parsed file");
        Ok(AstFile { items })
    }

    pub fn parse_message(&mut self) -> Result<AstMessage, ParseError> {
        let comments = collect_leading(&mut self.source, None);
        self.message(comments)
    }

    pub fn parse_option(&mut self) -> Result<AstOption, ParseError> {
        let comments = collect_leading(&mut self.source, None);
        self.option(comments)
    }

    pub fn parse_enum(&mut self) -> Result<AstEnum, ParseError> {
        let comments = collect_leading(&mut self.source, None);
        self.enumeration(comments)
    }

    pub fn parse_service(&mut self) -> Result<AstService, ParseError> {
        let comments = collect_leading(&mut self.source, None);
        self.service(comments)
    }

    // Top-level statements

    fn skip_unknown(&mut self) -> Result<(), ParseError> {
        if self.options.is_strict() {
            return Err(self.unexpected("top-level statement", "file"));
        }
        trace!(
            token = self.source.current_text(),
            position = %self.source.current_position(),
            "skipping unrecognized top-level token"
        );
        self.bump();
        Ok(())
    }

    fn syntax(&mut self, comments: Vec<AstComment>) -> Result<AstSyntax, ParseError> {
        let position = self.expect_keyword("syntax", "syntax")?;
        self.expect("=", "syntax")?;
        let version = self.expect_string("syntax")?;
        self.expect(";", "syntax")?;

        Ok(AstSyntax {
            version: unquote(&version).to_string(),
            comments,
            position,
        })
    }

    fn package(&mut self, comments: Vec<AstComment>) -> Result<AstPackage, ParseError> {
        let position = self.expect_keyword("package", "package")?;
        let name = self.full_ident("package")?;
        self.expect(";", "package")?;

        Ok(AstPackage {
            name,
            comments,
            position,
        })
    }

    fn import(&mut self, comments: Vec<AstComment>) -> Result<AstImport, ParseError> {
        let position = self.expect_keyword("import", "import")?;

        let modifier = if self.at("public") {
            self.bump();
            Some(ImportModifier::Public)
        } else if self.at("weak") {
            self.bump();
            Some(ImportModifier::Weak)
        } else {
            None
        };

        let path = self.expect_string("import")?;
        self.expect(";", "import")?;

        Ok(AstImport {
            modifier,
            path: unquote(&path).to_string(),
            comments,
            position,
        })
    }

    // Options

    fn option(&mut self, comments: Vec<AstComment>) -> Result<AstOption, ParseError> {
        let position = self.expect_keyword("option", "option")?;
        let name = self.option_name()?;
        self.expect("=", "option")?;
        let constant = self.constant()?;
        self.expect(";", "option")?;

        Ok(AstOption {
            name,
            constant,
            comments,
            position,
        })
    }

    /// `ident { "." ident }` or `"(" fullIdent ")" { "." ident }`, where any
    /// segment after a dot may itself be parenthesized.
    fn option_name(&mut self) -> Result<String, ParseError> {
        let mut name = self.option_name_segment()?;
        while self.at(".") {
            self.bump();
            name.push('.');
            name.push_str(&self.option_name_segment()?);
        }
        Ok(name)
    }

    fn option_name_segment(&mut self) -> Result<String, ParseError> {
        if self.at("(") {
            self.bump();
            let inner = self.type_name("option")?;
            self.expect(")", "option")?;
            Ok(format!("({inner})"))
        } else {
            self.expect_ident("option")
        }
    }

    fn constant(&mut self) -> Result<String, ParseError> {
        self.skip_comments();
        let position = self.source.current_position();

        match self.source.current_kind() {
            TokenKind::Eof => Err(self.unexpected("constant", "option")),
            TokenKind::Illegal => Err(ParseError::MalformedConstant {
                found: self.source.current_text().to_string(),
                position,
            }),
            TokenKind::Ident | TokenKind::Int | TokenKind::Float | TokenKind::Str => {
                Ok(self.take())
            }
            TokenKind::Punct if self.at("-") || self.at("+") => {
                let sign = self.take();
                match self.source.current_kind() {
                    TokenKind::Int | TokenKind::Float | TokenKind::Ident => {
                        Ok(format!("{sign}{}", self.take()))
                    }
                    _ => Err(ParseError::MalformedConstant {
                        found: format!("{sign}{}", self.source.current_text()),
                        position,
                    }),
                }
            }
            TokenKind::Punct if self.at("{") => self.delimited("{", "}", "option"),
            _ if self.options.is_strict() => Err(ParseError::MalformedConstant {
                found: self.source.current_text().to_string(),
                position,
            }),
            _ => Ok(self.take()),
        }
    }

    // Messages

    fn message(&mut self, comments: Vec<AstComment>) -> Result<AstMessage, ParseError> {
        let position = self.expect_keyword("message", "message")?;
        let name = self.name("message")?;
        self.expect("{", "message")?;
        let body = self.nested(position, |p| p.message_body())?;
        self.expect("}", "message")?;

        Ok(AstMessage {
            name,
            body,
            comments,
            position,
        })
    }

    fn message_body(&mut self) -> Result<Vec<AstMember>, ParseError> {
        let mut body = Vec::new();
        let mut boundary = None;

        loop {
            let comments = collect_leading(&mut self.source, boundary);
            if self.is_eof() {
                return Err(self.unexpected("'}'", "message"));
            }
            if self.at("}") {
                break;
            }
            if self.at(";") {
                self.bump();
                boundary = Some(self.last_line);
                continue;
            }

            let member = match self.keyword() {
                Some(Keyword::Option) => AstMember::Option(self.option(comments)?),
                Some(Keyword::Message) => AstMember::Message(self.message(comments)?),
                Some(Keyword::Enum) => AstMember::Enum(self.enumeration(comments)?),
                Some(Keyword::Oneof) => AstMember::Oneof(self.oneof(comments)?),
                Some(Keyword::Reserved) => AstMember::Reserved(self.reserved(comments)?),
                Some(Keyword::Map) if self.source.peek_significant().text == "<" => {
                    AstMember::MapField(self.map_field(comments)?)
                }
                _ => AstMember::Field(self.field(comments)?),
            };

            body.push(member);
            boundary = Some(self.last_line);
        }

        Ok(body)
    }

    fn field(&mut self, comments: Vec<AstComment>) -> Result<AstField, ParseError> {
        let position = self.source.current_position();

        let label = match self.keyword() {
            Some(Keyword::Repeated) => Some(FieldLabel::Repeated),
            Some(Keyword::Optional) => Some(FieldLabel::Optional),
            Some(Keyword::Required) => Some(FieldLabel::Required),
            _ => None,
        };
        if label.is_some() {
            self.bump();
        }

        let type_name = self.type_name("field")?;
        let name = self.name("field")?;
        self.expect("=", "field")?;
        let number = self.expect_int("field")?;
        let options = self.field_options("field")?;
        self.expect(";", "field")?;

        Ok(AstField {
            label,
            type_name,
            name,
            number,
            options,
            comments,
            position,
        })
    }

    fn map_field(&mut self, comments: Vec<AstComment>) -> Result<AstMapField, ParseError> {
        let position = self.expect_keyword("map", "map field")?;
        self.expect("<", "map field")?;
        let key_type = self.expect_ident("map field")?;
        self.expect(",", "map field")?;
        let value_type = self.type_name("map field")?;
        self.expect(">", "map field")?;
        let name = self.name("map field")?;
        self.expect("=", "map field")?;
        let number = self.expect_int("map field")?;
        let options = self.field_options("map field")?;
        self.expect(";", "map field")?;

        Ok(AstMapField {
            key_type,
            value_type,
            name,
            number,
            options,
            comments,
            position,
        })
    }

    fn oneof(&mut self, comments: Vec<AstComment>) -> Result<AstOneof, ParseError> {
        let position = self.expect_keyword("oneof", "oneof")?;
        let name = self.name("oneof")?;
        self.expect("{", "oneof")?;

        let mut fields = Vec::new();
        let mut boundary = None;
        loop {
            let comments = collect_leading(&mut self.source, boundary);
            if self.is_eof() {
                return Err(self.unexpected("'}'", "oneof"));
            }
            if self.at("}") {
                break;
            }
            if self.at(";") {
                self.bump();
            } else {
                fields.push(self.oneof_field(comments)?);
            }
            boundary = Some(self.last_line);
        }
        self.expect("}", "oneof")?;

        Ok(AstOneof {
            name,
            fields,
            comments,
            position,
        })
    }

    fn oneof_field(&mut self, comments: Vec<AstComment>) -> Result<AstOneofField, ParseError> {
        let position = self.source.current_position();
        let type_name = self.type_name("oneof field")?;
        let name = self.name("oneof field")?;
        self.expect("=", "oneof field")?;
        let number = self.expect_int("oneof field")?;
        let options = self.field_options("oneof field")?;
        self.expect(";", "oneof field")?;

        Ok(AstOneofField {
            type_name,
            name,
            number,
            options,
            comments,
            position,
        })
    }

    fn reserved(&mut self, comments: Vec<AstComment>) -> Result<AstReserved, ParseError> {
        let position = self.expect_keyword("reserved", "reserved")?;

        let mut entries = Vec::new();
        loop {
            self.skip_comments();
            match self.source.current_kind() {
                TokenKind::Str => entries.push(self.take()),
                TokenKind::Int => {
                    let start = self.take();
                    if self.at("to") {
                        self.bump();
                        let end = if self.at("max") {
                            self.take()
                        } else {
                            self.expect_int("reserved")?
                        };
                        entries.push(format!("{start} to {end}"));
                    } else {
                        entries.push(start);
                    }
                }
                _ => return Err(self.unexpected("field name or number", "reserved")),
            }

            if self.at(",") {
                self.bump();
            } else {
                break;
            }
        }
        self.expect(";", "reserved")?;

        Ok(AstReserved {
            entries,
            comments,
            position,
        })
    }

    // Enums

    fn enumeration(&mut self, comments: Vec<AstComment>) -> Result<AstEnum, ParseError> {
        let position = self.expect_keyword("enum", "enum")?;
        let name = self.name("enum")?;
        self.expect("{", "enum")?;

        let mut body = Vec::new();
        let mut boundary = None;
        loop {
            let comments = collect_leading(&mut self.source, boundary);
            if self.is_eof() {
                return Err(self.unexpected("'}'", "enum"));
            }
            if self.at("}") {
                break;
            }
            if self.at(";") {
                self.bump();
            } else if self.keyword() == Some(Keyword::Option) {
                body.push(AstEnumMember::Option(self.option(comments)?));
            } else {
                body.push(AstEnumMember::Field(self.enum_field(comments)?));
            }
            boundary = Some(self.last_line);
        }
        self.expect("}", "enum")?;

        Ok(AstEnum {
            name,
            body,
            comments,
            position,
        })
    }

    fn enum_field(&mut self, comments: Vec<AstComment>) -> Result<AstEnumField, ParseError> {
        let position = self.source.current_position();
        let name = self.name("enum field")?;
        self.expect("=", "enum field")?;

        let value = if self.at("-") {
            self.bump();
            format!("-{}", self.expect_int("enum field")?)
        } else {
            self.expect_int("enum field")?
        };
        let options = self.field_options("enum field")?;
        self.expect(";", "enum field")?;

        Ok(AstEnumField {
            name,
            value,
            options,
            comments,
            position,
        })
    }

    // Services

    fn service(&mut self, comments: Vec<AstComment>) -> Result<AstService, ParseError> {
        let position = self.expect_keyword("service", "service")?;
        let name = self.name("service")?;
        self.expect("{", "service")?;

        let mut options = Vec::new();
        let mut rpcs = Vec::new();
        let mut boundary = None;
        loop {
            let comments = collect_leading(&mut self.source, boundary);
            if self.is_eof() {
                return Err(self.unexpected("'}'", "service"));
            }
            if self.at("}") {
                break;
            }
            match self.keyword() {
                Some(Keyword::Rpc) => rpcs.push(self.rpc(comments)?),
                Some(Keyword::Option) => options.push(self.option(comments)?),
                _ if self.at(";") => self.bump(),
                _ => return Err(self.unexpected("'rpc'", "service")),
            }
            boundary = Some(self.last_line);
        }
        self.expect("}", "service")?;

        Ok(AstService {
            name,
            options,
            rpcs,
            comments,
            position,
        })
    }

    fn rpc(&mut self, comments: Vec<AstComment>) -> Result<AstRpc, ParseError> {
        let position = self.expect_keyword("rpc", "rpc")?;
        let name = self.name("rpc")?;
        let request = self.rpc_type()?;
        self.expect_keyword("returns", "rpc")?;
        let response = self.rpc_type()?;

        let mut options = Vec::new();
        if self.at("{") {
            self.bump();
            let mut boundary = None;
            loop {
                let comments = collect_leading(&mut self.source, boundary);
                if self.is_eof() {
                    return Err(self.unexpected("'}'", "rpc"));
                }
                if self.at("}") {
                    break;
                }
                if self.at(";") {
                    self.bump();
                } else {
                    options.push(self.option(comments)?);
                }
                boundary = Some(self.last_line);
            }
            self.expect("}", "rpc")?;
        } else {
            self.expect(";", "rpc")?;
        }

        Ok(AstRpc {
            name,
            request,
            response,
            options,
            comments,
            position,
        })
    }

    /// `"(" ["stream"] messageType ")"`
    fn rpc_type(&mut self) -> Result<AstRpcType, ParseError> {
        self.expect("(", "rpc")?;
        // `stream` is only a modifier when a type name follows it.
        let is_stream = self.at("stream") && self.source.peek_significant().text != ")";
        if is_stream {
            self.bump();
        }
        let message_type = self.type_name("rpc")?;
        self.expect(")", "rpc")?;

        Ok(AstRpcType {
            message_type,
            is_stream,
        })
    }

    // Shared pieces

    /// Run a production one nesting level deeper, failing once the configured
    /// depth is exceeded.
    fn nested<T>(
        &mut self,
        position: Position,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= self.options.max_depth {
            return Err(ParseError::RecursionLimitExceeded {
                limit: self.options.max_depth,
                position,
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Optional `[ ... ]` after a field number, returned as opaque text.
    fn field_options(&mut self, production: &'static str) -> Result<Option<String>, ParseError> {
        if !self.at("[") {
            return Ok(None);
        }
        let text = self.delimited("[", "]", production)?;
        let inner = &text[1..text.len() - 1];
        Ok(Some(inner.trim().to_string()))
    }

    /// Consume a balanced `open ... close` span and return its text.
    ///
    /// Whitespace between tokens collapses to one space; comments are dropped.
    fn delimited(
        &mut self,
        open: &'static str,
        close: &'static str,
        production: &'static str,
    ) -> Result<String, ParseError> {
        let mut text = String::new();
        let mut depth = 0usize;
        let mut prev_end: Option<usize> = None;

        loop {
            match self.source.current_kind() {
                TokenKind::Eof => return Err(self.unexpected(format!("'{close}'"), production)),
                TokenKind::Comment => {
                    self.source.advance();
                    continue;
                }
                _ => {}
            }

            let token = self.source.current();
            if prev_end.is_some_and(|end| token.position.offset > end) {
                text.push(' ');
            }
            text.push_str(&token.text);
            prev_end = Some(token.position.offset + token.text.len());

            if token.text == open {
                depth += 1;
            } else if token.text == close {
                depth -= 1;
            }
            self.bump();

            if depth == 0 {
                return Ok(text);
            }
        }
    }

    /// A possibly dotted type reference, optionally fully qualified with a
    /// leading dot.
    fn type_name(&mut self, production: &'static str) -> Result<String, ParseError> {
        let mut name = String::new();
        if self.at(".") {
            self.bump();
            name.push('.');
        }
        name.push_str(&self.full_ident(production)?);
        Ok(name)
    }

    /// `ident { "." ident }`
    fn full_ident(&mut self, production: &'static str) -> Result<String, ParseError> {
        let mut name = self.expect_ident(production)?;
        while self.at(".") {
            self.bump();
            name.push('.');
            name.push_str(&self.expect_ident(production)?);
        }
        Ok(name)
    }

    /// The name slot of a declaration. Lenient mode takes whatever token is
    /// there; strict mode requires an identifier.
    fn name(&mut self, production: &'static str) -> Result<String, ParseError> {
        self.skip_comments();
        match self.source.current_kind() {
            TokenKind::Ident => Ok(self.take()),
            TokenKind::Eof => Err(self.unexpected("name", production)),
            _ if self.options.is_strict() => Err(ParseError::MalformedIdentifier {
                production,
                found: self.source.current_text().to_string(),
                position: self.source.current_position(),
            }),
            _ => Ok(self.take()),
        }
    }

    // Token helpers

    fn keyword(&self) -> Option<Keyword> {
        if self.source.current_kind() != TokenKind::Ident {
            return None;
        }
        Keyword::from_text(self.source.current_text())
    }

    fn skip_comments(&mut self) {
        while self.source.current_kind() == TokenKind::Comment {
            self.source.advance();
        }
    }

    /// Whether the current significant token is `text`. Skips interior
    /// comments first.
    fn at(&mut self, text: &str) -> bool {
        self.skip_comments();
        let kind = self.source.current_kind();
        kind != TokenKind::Eof && kind != TokenKind::Str && self.source.current_text() == text
    }

    fn bump(&mut self) {
        self.last_line = self.source.current_position().line;
        self.source.advance();
    }

    fn take(&mut self) -> String {
        let text = self.source.current_text().to_string();
        self.bump();
        text
    }

    fn expect(&mut self, text: &'static str, production: &'static str) -> Result<(), ParseError> {
        if self.at(text) {
            self.bump();
            Ok(())
        } else {
            Err(self.unexpected(format!("'{text}'"), production))
        }
    }

    fn expect_keyword(
        &mut self,
        keyword: &'static str,
        production: &'static str,
    ) -> Result<Position, ParseError> {
        let position = if self.at(keyword) {
            self.source.current_position()
        } else {
            return Err(self.unexpected(format!("'{keyword}'"), production));
        };
        self.bump();
        Ok(position)
    }

    fn expect_of_kind(
        &mut self,
        kind: TokenKind,
        expected: &'static str,
        production: &'static str,
    ) -> Result<String, ParseError> {
        self.skip_comments();
        if self.source.current_kind() == kind {
            Ok(self.take())
        } else {
            Err(self.unexpected(expected, production))
        }
    }

    fn expect_ident(&mut self, production: &'static str) -> Result<String, ParseError> {
        self.expect_of_kind(TokenKind::Ident, "identifier", production)
    }

    fn expect_int(&mut self, production: &'static str) -> Result<String, ParseError> {
        self.expect_of_kind(TokenKind::Int, "integer", production)
    }

    fn expect_string(&mut self, production: &'static str) -> Result<String, ParseError> {
        self.expect_of_kind(TokenKind::Str, "string literal", production)
    }

    fn unexpected(&self, expected: impl Into<String>, production: &'static str) -> ParseError {
        let position = self.source.current_position();
        match self.source.current_kind() {
            TokenKind::Eof => ParseError::UnexpectedEndOfInput {
                production,
                expected: expected.into(),
                position,
            },
            _ => ParseError::UnexpectedToken {
                production,
                expected: expected.into(),
                found: self.source.current_text().to_string(),
                position,
            },
        }
    }
}

/// Strip one pair of matching surrounding quotes.
fn unquote(literal: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = literal
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    literal
}
