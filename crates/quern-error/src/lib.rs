//! Error taxonomy shared across the quern workspace.
//!
//! Three families of failure exist in the SQL frontend:
//!
//! - **Syntax**: raised by the lexer/parser before lowering ever starts.
//!   Carries the line and column of the offending token.
//! - **Unsupported construct**: the parse succeeded but lowering has no case
//!   for the rule. Never silent; always surfaces to the caller.
//! - **Structural assumption violations**: a parse tree that is syntactically
//!   valid but shaped in a way lowering refuses to guess about (mismatched
//!   FOREIGN KEY column lists, malformed UPDATE assignment splits, an empty
//!   statement batch).
//!
//! No local recovery is attempted anywhere; every error propagates.

use thiserror::Error;

/// Any error produced by the quern SQL frontend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Lexical or grammatical error in the input text.
    #[error("syntax error at line {line}:{column}: {message}")]
    Syntax {
        /// 1-based line of the offending character or token.
        line: u32,
        /// 1-based column of the offending character or token.
        column: u32,
        message: String,
    },

    /// The parser recognized a construct that lowering has no case for.
    #[error("unsupported construct: {0}")]
    UnsupportedConstruct(String),

    /// A statement batch lowered to zero statements.
    #[error("statement batch contains no statements")]
    EmptyBatch,

    /// An operator lexeme with no entry in the canonical operator table.
    #[error("unrecognized operator `{0}`")]
    UnknownOperator(String),

    /// FOREIGN KEY local and referenced column lists differ in length.
    #[error(
        "FOREIGN KEY lists {local} local column(s) but {referenced} referenced column(s)"
    )]
    ForeignKeyColumnMismatch { local: usize, referenced: usize },

    /// UPDATE SET column count does not match its value expression count.
    #[error("UPDATE has {columns} SET column(s) but {expressions} value expression(s)")]
    MalformedUpdate { columns: usize, expressions: usize },

    /// Storage stub: the named table already exists.
    #[error("table already exists: {0}")]
    TableExists(String),
}

impl Error {
    /// Construct a [`Error::Syntax`] at the given position.
    #[must_use]
    pub fn syntax(line: u32, column: u32, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            column,
            message: message.into(),
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_displays_position() {
        let err = Error::syntax(3, 14, "unexpected token `)`");
        assert_eq!(
            err.to_string(),
            "syntax error at line 3:14: unexpected token `)`"
        );
    }

    #[test]
    fn foreign_key_mismatch_displays_counts() {
        let err = Error::ForeignKeyColumnMismatch {
            local: 2,
            referenced: 1,
        };
        assert_eq!(
            err.to_string(),
            "FOREIGN KEY lists 2 local column(s) but 1 referenced column(s)"
        );
    }
}
