//! Classification of Diesel failures shared by the repositories.
//!
//! Each repository maps a [`DieselFailure`] onto its own port error enum.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

/// Repository-agnostic category of a Diesel error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    /// The connection dropped mid-operation.
    Connection(&'static str),
    /// The statement failed.
    Query(&'static str),
    /// A unique constraint rejected the write.
    UniqueViolation,
}

/// Classify a Diesel error, logging the database detail at debug level.
pub(crate) fn classify_diesel_error(error: DieselError) -> DieselFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => DieselFailure::Query("record not found"),
        DieselError::QueryBuilderError(_) => DieselFailure::Query("database query error"),
        DieselError::DeserializationError(_) => DieselFailure::Query("unexpected column data"),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            DieselFailure::UniqueViolation
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DieselFailure::Connection("database connection error")
        }
        _ => DieselFailure::Query("database error"),
    }
}

/// Expands to a `map_diesel_error` fn converting Diesel errors into a port
/// error with `connection` and `query` constructors. Unique violations are
/// reported as query failures.
macro_rules! basic_diesel_error_mapper {
    ($error:ty) => {
        fn map_diesel_error(error: diesel::result::Error) -> $error {
            use $crate::outbound::persistence::error_mapping::{
                DieselFailure, classify_diesel_error,
            };
            match classify_diesel_error(error) {
                DieselFailure::Connection(message) => <$error>::connection(message),
                DieselFailure::Query(message) => <$error>::query(message),
                DieselFailure::UniqueViolation => <$error>::query("duplicate record"),
            }
        }

        fn map_pool_error(error: $crate::outbound::persistence::pool::PoolError) -> $error {
            <$error>::connection(error.into_message())
        }
    };
}

pub(crate) use basic_diesel_error_mapper;
