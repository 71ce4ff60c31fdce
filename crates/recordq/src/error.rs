//! Error types for recordq

use crate::query::StatementKind;
use thiserror::Error;

/// Result type alias for recordq operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for building and running queries.
///
/// Builder errors are raised while clauses are accumulated and surface the
/// first time the query is prepared or executed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrmError {
    /// SELECT/INSERT/UPDATE/DELETE builder calls were mixed on one query
    #[error("The type of query is already '{current}', it cannot become '{requested}'")]
    ConflictingStatementKind {
        current: StatementKind,
        requested: StatementKind,
    },

    /// A clause was used that the statement kind cannot carry
    #[error("{clause} is not allowed in a {kind} statement")]
    ClauseNotAllowed {
        clause: &'static str,
        kind: StatementKind,
    },

    /// `get_col` / `get_var` without exactly one select column
    #[error("Query.{operation}: exactly one select argument is required, found {found}")]
    InvalidSelectArity {
        operation: &'static str,
        found: usize,
    },

    /// A where/having argument that cannot be turned into a condition
    #[error("Malformed condition argument: {0}")]
    MalformedConditionArgument(String),

    /// An INSERT row that does not match the first row's columns
    #[error("Malformed insert row: {0}")]
    MalformedInsertRow(String),

    /// An UPDATE without assignments or an INSERT without rows
    #[error("{kind} statement requires a {clause} clause")]
    MissingClause {
        clause: &'static str,
        kind: StatementKind,
    },

    /// A statement that needs a table was built without one
    #[error("{kind} statement requires a table")]
    MissingTable { kind: StatementKind },

    /// A finder name that does not follow the `get_*_by_*` convention
    #[error("No finder method with name '{0}'")]
    UnknownFinderMethod(String),

    /// Placeholder count and argument count disagree
    #[error("Placeholder mismatch: template has {placeholders} placeholder(s), {args} argument(s) given")]
    PlaceholderMismatch { placeholders: usize, args: usize },

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Error reported by the database adapter
    #[error("Database error: {0}")]
    Database(String),
}

impl OrmError {
    /// Create a malformed condition error
    pub fn malformed_condition(message: impl Into<String>) -> Self {
        Self::MalformedConditionArgument(message.into())
    }

    /// Create a malformed insert row error
    pub fn malformed_row(message: impl Into<String>) -> Self {
        Self::MalformedInsertRow(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create an adapter error
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }

    /// Check if this is a statement kind conflict
    pub fn is_conflicting_kind(&self) -> bool {
        matches!(
            self,
            Self::ConflictingStatementKind { .. } | Self::ClauseNotAllowed { .. }
        )
    }

    /// Check if this is a select arity error
    pub fn is_invalid_arity(&self) -> bool {
        matches!(self, Self::InvalidSelectArity { .. })
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this error was produced by the database adapter
    pub fn is_database(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}
