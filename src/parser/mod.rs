pub mod lexer;
pub mod source;
pub mod comments;
pub mod config;
pub mod ast;
pub mod grammar;

use crate::error::ParseError;
use ast::{AstFile, AstMessage, AstOption};
use config::ParseOptions;
use grammar::Parser;
use source::TokenStream;

/// Parse protobuf schema text into an `AstFile`.
///
/// This is the main entry point for the parser module. Unrecognized top-level
/// statements are skipped; use [`parse_file_with`] and
/// [`ParseOptions::strict`] to reject them instead.
pub fn parse_file(input: &str) -> Result<AstFile, ParseError> {
    parse_file_with(input, ParseOptions::default())
}

pub fn parse_file_with(input: &str, options: ParseOptions) -> Result<AstFile, ParseError> {
    Parser::with_options(TokenStream::lex(input), options).parse_file()
}

/// Parse `input` as exactly one `message` definition. Only comments may
/// follow it.
pub fn parse_message(input: &str) -> Result<AstMessage, ParseError> {
    let mut parser = Parser::new(TokenStream::lex(input));
    let message = parser.parse_message()?;
    parser.expect_end()?;
    Ok(message)
}

/// Parse `input` as exactly one `option` statement. Only comments may
/// follow it.
pub fn parse_option(input: &str) -> Result<AstOption, ParseError> {
    let mut parser = Parser::new(TokenStream::lex(input));
    let option = parser.parse_option()?;
    parser.expect_end()?;
    Ok(option)
}
