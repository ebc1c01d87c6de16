use std::fmt;

/// Classes of tokens produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// An identifier or keyword (`message`, `int32`, `my_field`)
    Ident,
    /// An integer literal (decimal, hex or octal)
    Int,
    /// A floating point literal
    Float,
    /// A quoted string literal; the text keeps its quotes
    Str,
    /// A single punctuation character
    Punct,
    /// A `//` line comment or a `/* */` block comment
    Comment,
    /// Text the lexer could not classify (unterminated string or comment,
    /// control characters)
    Illegal,
    /// End of input
    Eof,
}

/// Location of the first character of a token.
///
/// All three values are 1-based: the first byte of the input sits at offset 1,
/// line 1, column 1. Columns count characters, offsets count bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Position {
            offset,
            line,
            column,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::new(1, 1, 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A token with its literal text and source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: Position) -> Self {
        Token {
            kind,
            text: text.into(),
            position,
        }
    }

    /// The end-of-input pseudo-token that directly follows `self`.
    pub fn eof_after(&self) -> Token {
        let mut position = self.position;
        position.offset += self.text.len();
        for c in self.text.chars() {
            if c == '\n' {
                position.line += 1;
                position.column = 1;
            } else {
                position.column += 1;
            }
        }
        Token::new(TokenKind::Eof, "", position)
    }
}

/// Tokenizer for protobuf schema text.
///
/// Unlike most lexers, comments are not skipped: they come out as
/// [`TokenKind::Comment`] tokens so the parser can attach them to the
/// declarations they precede. The iterator ends with exactly one
/// [`TokenKind::Eof`] token.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            pos: 0,
            line: 1,
            column: 1,
            finished: false,
        }
    }

    fn current_position(&self) -> Position {
        Position::new(self.pos + 1, self.line, self.column)
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_byte_at(&self, n: usize) -> Option<u8> {
        self.input.as_bytes().get(self.pos + n).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn advance_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.peek_char() {
            if !pred(c) {
                break;
            }
            self.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        self.advance_while(char::is_whitespace);
    }

    fn read_line_comment(&mut self) -> TokenKind {
        self.advance_while(|c| c != '\n');
        TokenKind::Comment
    }

    fn read_block_comment(&mut self) -> TokenKind {
        // Consume "/*"
        self.advance();
        self.advance();
        loop {
            match self.advance() {
                None => return TokenKind::Illegal,
                Some('*') if self.peek_char() == Some('/') => {
                    self.advance();
                    return TokenKind::Comment;
                }
                Some(_) => {}
            }
        }
    }

    fn read_string(&mut self, quote: char) -> TokenKind {
        self.advance();
        loop {
            match self.peek_char() {
                None | Some('\n') => return TokenKind::Illegal,
                Some('\\') => {
                    self.advance();
                    if self.peek_char().is_some_and(|c| c != '\n') {
                        self.advance();
                    }
                }
                Some(c) => {
                    self.advance();
                    if c == quote {
                        return TokenKind::Str;
                    }
                }
            }
        }
    }

    fn read_exponent(&mut self) {
        if matches!(self.peek_char(), Some('e') | Some('E')) {
            let has_digits = match self.peek_byte_at(1) {
                Some(b'+') | Some(b'-') => self.peek_byte_at(2).is_some_and(|b| b.is_ascii_digit()),
                Some(b) => b.is_ascii_digit(),
                None => false,
            };
            if has_digits {
                self.advance();
                if matches!(self.peek_char(), Some('+') | Some('-')) {
                    self.advance();
                }
                self.advance_while(|c| c.is_ascii_digit());
            }
        }
    }

    fn read_number(&mut self) -> TokenKind {
        let hex_prefix = matches!(self.peek_byte_at(1), Some(b'x') | Some(b'X'));
        if self.peek_char() == Some('0') && hex_prefix {
            self.advance();
            self.advance();
            self.advance_while(|c| c.is_ascii_hexdigit());
            return TokenKind::Int;
        }

        let mut kind = TokenKind::Int;
        self.advance_while(|c| c.is_ascii_digit());
        if self.peek_char() == Some('.') {
            self.advance();
            self.advance_while(|c| c.is_ascii_digit());
            kind = TokenKind::Float;
        }
        let before = self.pos;
        self.read_exponent();
        if self.pos != before {
            kind = TokenKind::Float;
        }
        kind
    }

    /// Read the next token.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        let start = self.pos;
        let position = self.current_position();

        let kind = match self.peek_char() {
            None => return Token::new(TokenKind::Eof, "", position),
            Some('/') if self.peek_byte_at(1) == Some(b'/') => self.read_line_comment(),
            Some('/') if self.peek_byte_at(1) == Some(b'*') => self.read_block_comment(),
            Some(q @ ('"' | '\'')) => self.read_string(q),
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                self.advance_while(|c| c.is_ascii_alphanumeric() || c == '_');
                TokenKind::Ident
            }
            Some(c) if c.is_ascii_digit() => self.read_number(),
            Some('.') if self.peek_byte_at(1).is_some_and(|b| b.is_ascii_digit()) => {
                self.advance();
                self.advance_while(|c| c.is_ascii_digit());
                self.read_exponent();
                TokenKind::Float
            }
            Some(c) if c.is_ascii_punctuation() => {
                self.advance();
                TokenKind::Punct
            }
            Some(_) => {
                self.advance();
                TokenKind::Illegal
            }
        };

        let text = self.input[start..self.pos].trim_end_matches('\r');
        Token::new(kind, text, position)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            self.finished = true;
        }
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<(TokenKind, String)> {
        Lexer::new(input).map(|t| (t.kind, t.text)).collect()
    }

    #[test]
    fn test_basic_tokens() {
        let mut lex = Lexer::new("message Person { int32 id = 1; }");
        let expected = [
            (TokenKind::Ident, "message"),
            (TokenKind::Ident, "Person"),
            (TokenKind::Punct, "{"),
            (TokenKind::Ident, "int32"),
            (TokenKind::Ident, "id"),
            (TokenKind::Punct, "="),
            (TokenKind::Int, "1"),
            (TokenKind::Punct, ";"),
            (TokenKind::Punct, "}"),
            (TokenKind::Eof, ""),
        ];
        for (kind, text) in expected {
            let tok = lex.next_token();
            assert_eq!(tok.kind, kind);
            assert_eq!(tok.text, text);
        }
    }

    #[test]
    fn test_comments_are_tokens() {
        let toks = kinds("// one\n/* two\n three */ syntax");
        assert_eq!(toks[0], (TokenKind::Comment, "// one".to_string()));
        assert_eq!(toks[1], (TokenKind::Comment, "/* two\n three */".to_string()));
        assert_eq!(toks[2], (TokenKind::Ident, "syntax".to_string()));
    }

    #[test]
    fn test_crlf_line_comment() {
        let toks = kinds("// windows\r\nfoo");
        assert_eq!(toks[0], (TokenKind::Comment, "// windows".to_string()));
        assert_eq!(toks[1], (TokenKind::Ident, "foo".to_string()));
    }

    #[test]
    fn test_strings_keep_quotes() {
        let toks = kinds(r#""com.example.foo" 'single' "esc\"aped""#);
        assert_eq!(toks[0], (TokenKind::Str, r#""com.example.foo""#.to_string()));
        assert_eq!(toks[1], (TokenKind::Str, "'single'".to_string()));
        assert_eq!(toks[2], (TokenKind::Str, r#""esc\"aped""#.to_string()));
    }

    #[test]
    fn test_unterminated_string_is_illegal() {
        let toks = kinds("\"open\nnext");
        assert_eq!(toks[0], (TokenKind::Illegal, "\"open".to_string()));
        assert_eq!(toks[1], (TokenKind::Ident, "next".to_string()));
    }

    #[test]
    fn test_numbers() {
        let toks = kinds("42 0x1F 3.14 1e10 2.5E-3 .5");
        assert_eq!(toks[0], (TokenKind::Int, "42".to_string()));
        assert_eq!(toks[1], (TokenKind::Int, "0x1F".to_string()));
        assert_eq!(toks[2], (TokenKind::Float, "3.14".to_string()));
        assert_eq!(toks[3], (TokenKind::Float, "1e10".to_string()));
        assert_eq!(toks[4], (TokenKind::Float, "2.5E-3".to_string()));
        assert_eq!(toks[5], (TokenKind::Float, ".5".to_string()));
    }

    #[test]
    fn test_dotted_names_split() {
        let toks = kinds("foo.bar");
        assert_eq!(toks[0], (TokenKind::Ident, "foo".to_string()));
        assert_eq!(toks[1], (TokenKind::Punct, ".".to_string()));
        assert_eq!(toks[2], (TokenKind::Ident, "bar".to_string()));
    }

    #[test]
    fn test_position_tracking() {
        let toks: Vec<Token> = Lexer::new("\nmessage Outer {\n  int64 x = 1;\n}").collect();
        assert_eq!(toks[0].position, Position::new(2, 2, 1));
        assert_eq!(toks[1].position, Position::new(10, 2, 9));
        assert_eq!(toks[3].position, Position::new(20, 3, 3));
    }

    #[test]
    fn test_columns_count_chars() {
        let toks: Vec<Token> = Lexer::new("// é\n\"ü\" x").collect();
        assert_eq!(toks[1].position, Position::new(7, 2, 1));
        assert_eq!(toks[2].position, Position::new(12, 2, 5));
    }

    #[test]
    fn test_eof_is_yielded_once() {
        let toks: Vec<Token> = Lexer::new("  ").collect();
        assert_eq!(toks.len(), 1);
        assert_eq!(toks[0].kind, TokenKind::Eof);
        assert_eq!(toks[0].position, Position::new(3, 1, 3));
    }

    #[test]
    fn test_eof_after() {
        let tok = Token::new(TokenKind::Ident, "abc", Position::new(5, 2, 3));
        assert_eq!(tok.eof_after().position, Position::new(8, 2, 6));
    }
}
