//! Error types for the lispcalc interpreter
//!
//! Only structural problems are reported through [`Error`]. Expressions that are
//! well formed but have no defined value (division by zero, an unbound variable,
//! a descending range) evaluate to NaN instead.

use thiserror::Error;

/// Structural calculator errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Parse errors
    /// An expression did not start with `(`
    ///
    /// **Triggered by:** Bare tokens or an empty line
    /// **Example:** `5`, `+(1)(2)`
    #[error("Syntax error at position {position}: expected '('")]
    ExpectedOpenParen {
        /// Character offset where `(` was expected
        position: usize,
    },

    /// Input ended before the current expression was closed
    ///
    /// **Triggered by:** Missing closing parentheses
    /// **Example:** `(+(1)`
    #[error("Syntax error at position {position}: unterminated expression")]
    UnterminatedExpression {
        /// Character offset where input ran out
        position: usize,
    },

    /// Something other than a child `(` or the closing `)` followed a child
    ///
    /// **Example:** `(+(1) (2))` (the space after the first child)
    #[error("Syntax error at position {position}: unexpected character '{found}'")]
    UnexpectedChar {
        /// Offending character
        found: char,
        /// Character offset of the offending character
        position: usize,
    },

    /// A complete expression was followed by more input
    ///
    /// **Example:** `(1))`
    #[error("Syntax error at position {position}: trailing input after expression")]
    TrailingInput {
        /// Character offset of the first unconsumed character
        position: usize,
    },

    /// Input line was not valid UTF-8
    ///
    /// **Triggered by:** Binary data piped into the session
    #[error("Syntax error at position {position}: invalid UTF-8")]
    InvalidEncoding {
        /// Character offset of the first undecodable byte
        position: usize,
    },

    // Evaluation errors
    /// Node with children whose token is not an operator
    #[error("Unknown operator: {token}")]
    UnknownOperator {
        /// Token found at the operator position
        token: String,
    },

    /// Operator applied to the wrong number of operands
    ///
    /// **Triggered by:** `(*(1))`, `(+(1)(2)(3))`
    #[error("Operator '{operator}' expects {expected} operand(s), got {got}")]
    ArityMismatch {
        /// Operator token
        operator: String,
        /// Accepted operand counts, for display
        expected: String,
        /// Number of children found
        got: usize,
    },

    /// Childless node that is neither a number nor a variable name
    ///
    /// **Example:** `(1a)`, `()`
    #[error("Invalid terminal: '{token}'")]
    InvalidTerminal {
        /// Token of the terminal node
        token: String,
    },

    /// Left side of `=` is not a plain variable name
    ///
    /// **Example:** `(=(1)(2))`, `(=(+(a))(2))`
    #[error("Invalid assignment target: '{token}'")]
    InvalidAssignmentTarget {
        /// Token of the rejected target node
        token: String,
    },

    // Variable file errors
    /// Malformed line in a variable pre-load file
    #[error("Invalid variable assignment at line {line}: {reason}")]
    InvalidAssignmentLine {
        /// 1-based line number
        line: usize,
        /// What was wrong with it
        reason: String,
    },

    /// Reading a variable file failed
    #[error("I/O error: {0}")]
    Io(String),

    // Session errors
    /// Writing the transcript file failed; the session cannot go on
    #[error("Transcript write failed: {0}")]
    Transcript(String),

    /// Rendering an expression as JSON failed
    #[error("Serialization error: {0}")]
    Serialize(String),
}

impl Error {
    /// Whether the error was raised while parsing rather than evaluating
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Error::ExpectedOpenParen { .. }
                | Error::UnterminatedExpression { .. }
                | Error::UnexpectedChar { .. }
                | Error::TrailingInput { .. }
                | Error::InvalidEncoding { .. }
        )
    }

    pub(crate) fn arity(operator: &str, expected: &str, got: usize) -> Self {
        Error::ArityMismatch {
            operator: operator.to_string(),
            expected: expected.to_string(),
            got,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialize(err.to_string())
    }
}

/// Result type for lispcalc operations
pub type Result<T> = std::result::Result<T, Error>;
