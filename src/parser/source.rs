//! The cursor the grammar pulls tokens from.

use std::collections::VecDeque;

use super::lexer::{Lexer, Position, Token, TokenKind};

/// A cursor over classified tokens.
///
/// Comments are ordinary tokens here; nothing is skipped implicitly. Once the
/// cursor reaches [`TokenKind::Eof`], [`advance`](TokenSource::advance) is a
/// no-op.
pub trait TokenSource {
    /// The token under the cursor.
    fn current(&self) -> &Token;

    /// The token right after the cursor, without moving it.
    fn peek(&mut self) -> &Token;

    /// The first non-comment token after the cursor, without moving it.
    fn peek_significant(&mut self) -> &Token;

    /// Move the cursor to the next token.
    fn advance(&mut self);

    fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    fn current_text(&self) -> &str {
        &self.current().text
    }

    fn current_position(&self) -> Position {
        self.current().position
    }
}

/// A [`TokenSource`] over any iterator of [`Token`]s. Lookahead is buffered,
/// so peeking past a run of comments is possible.
///
/// If the iterator runs dry without producing an `Eof` token, one is
/// synthesized right after the last token seen.
pub struct TokenStream<I: Iterator<Item = Token>> {
    tokens: I,
    current: Token,
    lookahead: VecDeque<Token>,
}

impl<'a> TokenStream<Lexer<'a>> {
    /// Token stream over schema text.
    pub fn lex(input: &'a str) -> Self {
        TokenStream::new(Lexer::new(input))
    }
}

impl<I: Iterator<Item = Token>> TokenStream<I> {
    pub fn new(mut tokens: I) -> Self {
        let current = tokens
            .next()
            .unwrap_or_else(|| Token::new(TokenKind::Eof, "", Position::default()));
        TokenStream {
            tokens,
            current,
            lookahead: VecDeque::new(),
        }
    }

    fn pull(&mut self) -> Token {
        match self.tokens.next() {
            Some(token) => token,
            None => self.lookahead.back().unwrap_or(&self.current).eof_after(),
        }
    }

    /// Index into the lookahead buffer of the first token after the cursor
    /// for which `stop` holds, pulling tokens as needed. Never reads past `Eof`.
    fn scan(&mut self, stop: impl Fn(&Token) -> bool) -> usize {
        let mut i = 0;
        loop {
            if i == self.lookahead.len() {
                let token = self.pull();
                self.lookahead.push_back(token);
            }
            let token = &self.lookahead[i];
            if token.kind == TokenKind::Eof || stop(token) {
                return i;
            }
            i += 1;
        }
    }
}

impl<I: Iterator<Item = Token>> TokenSource for TokenStream<I> {
    fn current(&self) -> &Token {
        &self.current
    }

    fn peek(&mut self) -> &Token {
        if self.current.kind == TokenKind::Eof {
            return &self.current;
        }
        let i = self.scan(|_| true);
        &self.lookahead[i]
    }

    fn peek_significant(&mut self) -> &Token {
        if self.current.kind == TokenKind::Eof {
            return &self.current;
        }
        let i = self.scan(|token| token.kind != TokenKind::Comment);
        &self.lookahead[i]
    }

    fn advance(&mut self) {
        if self.current.kind == TokenKind::Eof {
            return;
        }
        self.current = match self.lookahead.pop_front() {
            Some(token) => token,
            None => self.pull(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_walk() {
        let mut src = TokenStream::lex("map<int32, string>");
        assert_eq!(src.current_text(), "map");
        assert_eq!(src.peek().text, "<");
        // Peeking does not move the cursor
        assert_eq!(src.current_text(), "map");
        src.advance();
        assert_eq!(src.current_text(), "<");
        assert_eq!(src.current_position(), Position::new(4, 1, 4));
    }

    #[test]
    fn test_advance_is_idempotent_at_eof() {
        let mut src = TokenStream::lex("x");
        src.advance();
        assert_eq!(src.current_kind(), TokenKind::Eof);
        let at_end = src.current_position();
        src.advance();
        src.advance();
        assert_eq!(src.current_kind(), TokenKind::Eof);
        assert_eq!(src.current_position(), at_end);
        assert_eq!(src.peek().kind, TokenKind::Eof);
    }

    #[test]
    fn test_comments_are_not_skipped() {
        let mut src = TokenStream::lex("// hi\nfoo");
        assert_eq!(src.current_kind(), TokenKind::Comment);
        src.advance();
        assert_eq!(src.current_text(), "foo");
    }

    #[test]
    fn test_peek_significant_skips_comments() {
        let mut src = TokenStream::lex("map /* a */ // b\n<int32");
        assert_eq!(src.peek().kind, TokenKind::Comment);
        assert_eq!(src.peek_significant().text, "<");
        assert_eq!(src.current_text(), "map");

        // Buffered comments are still walked one by one
        src.advance();
        assert_eq!(src.current_text(), "/* a */");
        src.advance();
        assert_eq!(src.current_text(), "// b");
        src.advance();
        assert_eq!(src.current_text(), "<");
        assert_eq!(src.current_position(), Position::new(18, 2, 1));
    }

    #[test]
    fn test_peek_significant_stops_at_eof() {
        let mut src = TokenStream::lex("stream // only comments follow");
        assert_eq!(src.peek_significant().kind, TokenKind::Eof);
        src.advance();
        src.advance();
        assert_eq!(src.current_kind(), TokenKind::Eof);
    }

    #[test]
    fn test_synthesized_eof() {
        let tokens = vec![Token::new(TokenKind::Ident, "abc", Position::default())];
        let mut src = TokenStream::new(tokens.into_iter());
        assert_eq!(src.peek().kind, TokenKind::Eof);
        src.advance();
        assert_eq!(src.current_kind(), TokenKind::Eof);
        assert_eq!(src.current_position(), Position::new(4, 1, 4));
    }

    #[test]
    fn test_empty_iterator() {
        let src = TokenStream::new(std::iter::empty());
        assert_eq!(src.current_kind(), TokenKind::Eof);
        assert_eq!(src.current_position(), Position::default());
    }
}
