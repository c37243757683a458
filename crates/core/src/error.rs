//! Error types for the pagination domain layer.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`CursorError`] - Opaque cursor decoding failures
//! - [`SourceError`] - Record source (database/transport) failures
//! - [`PaginationError`] - Everything a caller of the engine can observe
//!
//! Errors carry structured parameters only. Rendering them into a
//! localized, user-facing message is the presentation layer's job.

use std::fmt;

use thiserror::Error;

/// Fixed ceiling for `first` and `last`.
pub const MAX_PAGE_SIZE: u32 = 100;

// =============================================================================
// Arguments
// =============================================================================

/// Pagination argument named in a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Argument {
    First,
    Last,
    Before,
    After,
    OrderBy,
}

impl Argument {
    /// GraphQL name of the argument.
    pub fn as_str(&self) -> &'static str {
        match self {
            Argument::First => "first",
            Argument::Last => "last",
            Argument::Before => "before",
            Argument::After => "after",
            Argument::OrderBy => "orderBy",
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`", self.as_str())
    }
}

// =============================================================================
// Cursor Errors
// =============================================================================

/// Reasons an opaque cursor can fail to decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorError {
    /// Token is not standard base64.
    #[error("cursor is not valid base64")]
    InvalidEncoding,

    /// Decoded bytes are not UTF-8.
    #[error("cursor is not valid UTF-8")]
    InvalidUtf8,

    /// Decoded text has no `type:` prefix.
    #[error("cursor is missing a type tag")]
    MissingTypeTag,

    /// Cursor belongs to another entity type.
    #[error("cursor type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Type tag the caller expected.
        expected: String,
        /// Type tag embedded in the cursor.
        found: String,
    },
}

// =============================================================================
// Source Errors
// =============================================================================

/// Failures raised by a record source adapter.
///
/// These carry internal detail and must never reach an end user directly;
/// the engine logs them and returns [`PaginationError::LoadFailed`] instead.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to reach the backing store.
    #[error("connection error: {0}")]
    Connection(String),

    /// Query execution failed.
    #[error("query error: {0}")]
    Query(String),

    /// A row could not be converted into a record.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The fetch did not complete in time.
    #[error("timed out: {0}")]
    Timeout(String),

    /// Schema migration failed.
    #[error("migration error: {0}")]
    Migration(String),
}

impl SourceError {
    /// Short category used as the prefix of diagnostic lines.
    pub fn kind(&self) -> &'static str {
        match self {
            SourceError::Connection(_) | SourceError::Query(_) | SourceError::Migration(_) => {
                "Database"
            }
            SourceError::Serialization(_) => "Data",
            SourceError::Timeout(_) => "Timeout",
        }
    }
}

// =============================================================================
// Pagination Errors
// =============================================================================

/// Errors returned by the connection pagination engine.
///
/// Every variant except [`PaginationError::LoadFailed`] is a validation
/// error and is raised before the record source is touched.
#[derive(Debug, Error)]
pub enum PaginationError {
    /// Neither `first` nor `last` was supplied.
    #[error("You must provide a `first` or `last` value to properly paginate the connection.")]
    MissingLimit,

    /// Both `first` and `last` were supplied.
    #[error("Passing both `first` and `last` to paginate the connection is not supported.")]
    ConflictingLimits,

    /// `first`/`last` is not an integer.
    #[error("{argument} must be of type `number` not `{found}`.")]
    InvalidLimitType {
        argument: Argument,
        /// Runtime type of the supplied value.
        found: &'static str,
    },

    /// `first`/`last` is below zero.
    #[error("{argument} on the connection cannot be less than zero.")]
    NegativeLimit { argument: Argument, value: i64 },

    /// `first`/`last` is above [`MAX_PAGE_SIZE`].
    #[error("Requesting {value} records on the connection exceeds the {argument} limit of {max} records.")]
    LimitExceeded {
        argument: Argument,
        value: i64,
        max: u32,
    },

    /// `after`/`before` could not be decoded.
    #[error("Invalid cursor supplied to {argument}.")]
    MalformedCursor {
        argument: Argument,
        #[source]
        source: CursorError,
    },

    /// `orderBy.field` is not orderable for this entity.
    #[error("Unable to order the connection by unknown field `{field}`.")]
    UnknownOrderField { field: String },

    /// The record source failed. Internal detail is only in the logs.
    #[error("Unable to load {entity}. Please try again.")]
    LoadFailed { entity: &'static str },
}

impl PaginationError {
    /// Stable machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            PaginationError::MissingLimit => "MISSING_LIMIT",
            PaginationError::ConflictingLimits => "CONFLICTING_LIMITS",
            PaginationError::InvalidLimitType { .. } => "INVALID_LIMIT_TYPE",
            PaginationError::NegativeLimit { .. } => "NEGATIVE_LIMIT",
            PaginationError::LimitExceeded { .. } => "LIMIT_EXCEEDED",
            PaginationError::MalformedCursor { .. } => "MALFORMED_CURSOR",
            PaginationError::UnknownOrderField { .. } => "UNKNOWN_ORDER_FIELD",
            PaginationError::LoadFailed { .. } => "LOAD_FAILED",
        }
    }

    /// Whether this error was caused by caller input.
    pub fn is_validation(&self) -> bool {
        !matches!(self, PaginationError::LoadFailed { .. })
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for engine operations.
pub type PaginationResult<T> = Result<T, PaginationError>;

/// Result type for record source operations.
pub type SourceResult<T> = Result<T, SourceError>;
