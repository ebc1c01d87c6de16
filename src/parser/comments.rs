//! Leading-comment collection.

use super::ast::AstComment;
use super::lexer::TokenKind;
use super::source::TokenSource;

/// Consume the run of comment tokens under the cursor and return the ones that
/// lead the construct that follows.
///
/// The cursor is left on the first non-comment token. All comments in the run
/// are consumed, but only a contiguous block directly above the construct is
/// returned:
///
/// - a comment starting on `boundary_line` (the line where the previous sibling
///   ended) trails that sibling and is dropped;
/// - a blank line inside the run, or between the run and the construct,
///   drops everything above it.
pub fn collect_leading<S: TokenSource>(
    source: &mut S,
    boundary_line: Option<usize>,
) -> Vec<AstComment> {
    let mut comments = Vec::new();
    let mut last_end_line: Option<usize> = None;

    while source.current_kind() == TokenKind::Comment {
        let position = source.current_position();
        let raw = source.current_text().to_string();

        if boundary_line != Some(position.line) {
            if last_end_line.is_some_and(|end| position.line > end + 1) {
                comments.clear();
            }
            last_end_line = Some(position.line + raw.matches('\n').count());
            comments.push(AstComment { raw, position });
        }

        source.advance();
    }

    if let Some(end) = last_end_line {
        let next = source.current();
        if next.kind != TokenKind::Eof && next.position.line > end + 1 {
            comments.clear();
        }
    }

    comments
}
