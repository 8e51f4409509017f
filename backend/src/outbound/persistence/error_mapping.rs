//! Shared mapping from pool, Diesel and row-conversion failures into the
//! `Connection` / `Query` constructors every repository port error exposes.

use std::fmt::Display;

use tracing::debug;

use super::pool::PoolError;

/// Map a pool failure into a repository-specific connection error.
pub(crate) fn map_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map common Diesel error variants into query/connection constructors.
///
/// Closed connections are reported as connection errors; everything else,
/// including `NotFound` from `first`, is a query error.
pub(crate) fn map_diesel_error<E, Q, C>(
    error: diesel::result::Error,
    query: Q,
    connection: C,
) -> E
where
    Q: FnOnce(&'static str) -> E,
    C: FnOnce(&'static str) -> E,
{
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        _ => query("database error"),
    }
}

/// Describe a stored row that the domain refused to rehydrate.
pub(crate) fn invalid_row(table: &str, id: impl Display, reason: impl Display) -> String {
    debug!(table, %id, %reason, "stored row failed domain validation");
    format!("{table} row {id} is invalid: {reason}")
}

/// Convert an unsigned domain counter into a Postgres `INTEGER`.
pub(crate) fn to_db_int(field: &'static str, value: u32) -> Result<i32, String> {
    i32::try_from(value).map_err(|_| format!("{field} {value} exceeds the column range"))
}

/// Convert a Postgres `INTEGER` back into an unsigned domain counter.
pub(crate) fn from_db_int(field: &'static str, value: i32) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("{field} {value} is negative"))
}

#[cfg(test)]
mod tests {
    use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    enum Mapped {
        Connection(String),
        Query(String),
    }

    struct Info;

    impl DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            "server closed the connection"
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            None
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            None
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn map(error: DieselError) -> Mapped {
        map_diesel_error(
            error,
            |msg| Mapped::Query(msg.to_owned()),
            |msg| Mapped::Connection(msg.to_owned()),
        )
    }

    #[rstest]
    fn closed_connections_map_to_connection_errors() {
        let mapped = map(DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection,
            Box::new(Info),
        ));
        assert_eq!(mapped, Mapped::Connection("database connection error".to_owned()));
    }

    #[rstest]
    fn missing_rows_map_to_query_errors() {
        assert_eq!(map(DieselError::NotFound), Mapped::Query("record not found".to_owned()));
    }

    #[rstest]
    fn pool_checkout_failures_keep_their_message() {
        let mapped = map_pool_error(PoolError::checkout("timed out"), Mapped::Connection);
        assert_eq!(mapped, Mapped::Connection("timed out".to_owned()));
    }

    #[rstest]
    #[case(0, Ok(0))]
    #[case(-1, Err(()))]
    fn negative_integers_are_rejected(#[case] stored: i32, #[case] expected: Result<u32, ()>) {
        assert_eq!(from_db_int("sequence", stored).map_err(|_| ()), expected);
    }

    #[rstest]
    fn oversized_counters_are_rejected() {
        assert!(to_db_int("sequence", u32::MAX).is_err());
    }
}
