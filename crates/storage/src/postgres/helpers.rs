//! Shared helper functions for PostgreSQL row conversion.

use tracker_core::error::{SourceError, SourceResult};

/// Classify a sqlx failure.
pub fn query_error(err: sqlx::Error) -> SourceError {
    match err {
        sqlx::Error::PoolTimedOut => SourceError::Timeout(err.to_string()),
        sqlx::Error::PoolClosed | sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
            SourceError::Connection(err.to_string())
        }
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::Decode(_) => SourceError::Serialization(err.to_string()),
        _ => SourceError::Query(err.to_string()),
    }
}

/// Reject a percentage outside `0..=100` as corrupt.
pub fn checked_percentage(value: i32, field_name: &str) -> SourceResult<i32> {
    if (0..=100).contains(&value) {
        Ok(value)
    } else {
        Err(SourceError::Serialization(format!(
            "{field_name} is out of range: expected 0..=100, got {value}"
        )))
    }
}

/// Reject a negative count or length as corrupt.
pub fn checked_non_negative<T>(value: T, field_name: &str) -> SourceResult<T>
where
    T: PartialOrd + Default + std::fmt::Display,
{
    if value < T::default() {
        return Err(SourceError::Serialization(format!(
            "{field_name} is negative: {value}"
        )));
    }
    Ok(value)
}
