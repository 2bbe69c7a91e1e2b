//! Error handling for query construction, compilation, and execution.
//!
//! All fallible public APIs return `Result<T, QueryError>`. Errors fall into
//! three groups:
//!
//! - construction errors, raised immediately when an expression, element, or
//!   pattern is built from invalid arguments;
//! - execution-context errors, raised when a terminal builder operation runs
//!   without an active transaction;
//! - collaborator errors, surfaced from the query runner or while decoding
//!   result records.
//!
//! Compilation itself never fails: expression and element variants are closed
//! enums, so every conversion is checked exhaustively at compile time.

use std::fmt;

use thiserror::Error;

use crate::config::ConfigError;

/// Result type for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;

/// Errors that can occur while building or running a query.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Relationship direction marker was not one of `->`, `<-`, `-`.
    #[error("direction must be one of '->', '<-', '-' (got '{marker}')")]
    InvalidDirection {
        /// Marker supplied by the caller.
        marker: String,
    },
    /// Membership test against a value that is not a collection.
    #[error("unsupported 'in' operand for field '{field}': expected a list, got {found}")]
    NotACollection {
        /// Field on the left-hand side of the membership test.
        field: String,
        /// Type name of the value supplied.
        found: &'static str,
    },
    /// Operator symbol was not recognised.
    #[error("unknown operator '{op}'")]
    UnknownOperator {
        /// Symbol supplied by the caller.
        op: String,
    },
    /// Operator requires a non-null operand.
    #[error("operator {op} does not accept a null operand")]
    NullOperand {
        /// Operator symbol.
        op: String,
    },
    /// Operator requires an operand but none was supplied.
    #[error("operator {op} requires an operand")]
    MissingOperand {
        /// Operator symbol.
        op: String,
    },
    /// A no-value operator was given an operand.
    #[error("operator {op} does not take an operand")]
    UnexpectedOperand {
        /// Operator symbol.
        op: String,
    },
    /// Terminal builder operation invoked without a bound transaction.
    #[error("query must be executed within a transaction context")]
    NoActiveTransaction,
    /// The query runner reported a failure.
    #[error("query execution failed: {0}")]
    Execution(String),
    /// Result column was absent from a returned record.
    #[error("result record is missing column '{column}'")]
    MissingColumn {
        /// Expected column name.
        column: String,
    },
    /// Result column could not be decoded into the requested type.
    #[error("cannot decode column '{column}': {reason}")]
    Decode {
        /// Column being decoded.
        column: String,
        /// Decoder message.
        reason: String,
    },
    /// Configuration could not be loaded or validated.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl QueryError {
    /// Returns a machine-readable code for the error variant.
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::InvalidDirection { .. } => "InvalidDirection",
            QueryError::NotACollection { .. } => "NotACollection",
            QueryError::UnknownOperator { .. } => "UnknownOperator",
            QueryError::NullOperand { .. } => "NullOperand",
            QueryError::MissingOperand { .. } => "MissingOperand",
            QueryError::UnexpectedOperand { .. } => "UnexpectedOperand",
            QueryError::NoActiveTransaction => "NoActiveTransaction",
            QueryError::Execution(_) => "Execution",
            QueryError::MissingColumn { .. } => "MissingColumn",
            QueryError::Decode { .. } => "Decode",
            QueryError::Config(_) => "Config",
        }
    }

    /// Whether the error was raised while constructing an expression or element.
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            QueryError::InvalidDirection { .. }
                | QueryError::NotACollection { .. }
                | QueryError::UnknownOperator { .. }
                | QueryError::NullOperand { .. }
                | QueryError::MissingOperand { .. }
                | QueryError::UnexpectedOperand { .. }
        )
    }
}

/// Convenience wrapper that formats query errors with their codes.
pub struct QueryErrorWithCode<'a>(pub &'a QueryError);

impl fmt::Display for QueryErrorWithCode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.0.code(), self.0)
    }
}
