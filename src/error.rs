use crate::parser::lexer::Position;

/// Errors from the protobuf schema parser.
///
/// Parsing stops at the first error; no partial AST is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("{position}: expected {expected} in {production}, found '{found}'")]
    UnexpectedToken {
        production: &'static str,
        expected: String,
        found: String,
        position: Position,
    },

    #[error("{position}: unexpected end of input in {production}, expected {expected}")]
    UnexpectedEndOfInput {
        production: &'static str,
        expected: String,
        position: Position,
    },

    #[error("{position}: malformed constant '{found}'")]
    MalformedConstant { found: String, position: Position },

    #[error("{position}: malformed identifier '{found}' in {production}")]
    MalformedIdentifier {
        production: &'static str,
        found: String,
        position: Position,
    },

    #[error("{position}: nesting exceeds the limit of {limit}")]
    RecursionLimitExceeded { limit: usize, position: Position },
}

impl ParseError {
    /// Where the offending token starts.
    pub fn position(&self) -> Position {
        match self {
            ParseError::UnexpectedToken { position, .. }
            | ParseError::UnexpectedEndOfInput { position, .. }
            | ParseError::MalformedConstant { position, .. }
            | ParseError::MalformedIdentifier { position, .. }
            | ParseError::RecursionLimitExceeded { position, .. } => *position,
        }
    }
}

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, ParseError>;
