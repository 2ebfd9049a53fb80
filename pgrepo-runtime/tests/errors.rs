//! Error classification tests.

use std::{borrow::Cow, error::Error as StdError, fmt};

use pgrepo_runtime::{ErrorKind, RepoError, classify_sqlstate, is_retryable_sqlstate};
use sqlx::error::{DatabaseError, ErrorKind as DbErrorKind};

/// Server error as the driver would surface it, minus the Postgres-specific fields.
#[derive(Debug)]
struct ServerError {
    code: &'static str,
    message: &'static str,
    constraint: Option<&'static str>,
}

impl ServerError {
    fn new(code: &'static str, message: &'static str) -> Self {
        Self {
            code,
            message,
            constraint: None,
        }
    }

    fn with_constraint(mut self, name: &'static str) -> Self {
        self.constraint = Some(name);
        self
    }

    fn into_sqlx(self) -> sqlx::Error {
        sqlx::Error::Database(Box::new(self))
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message)
    }
}

impl StdError for ServerError {}

impl DatabaseError for ServerError {
    fn message(&self) -> &str {
        self.message
    }

    fn code(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self.code))
    }

    fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self
    }

    fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
        self
    }

    fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
        self
    }

    fn constraint(&self) -> Option<&str> {
        self.constraint
    }

    fn kind(&self) -> DbErrorKind {
        match self.code {
            "23505" => DbErrorKind::UniqueViolation,
            "23502" => DbErrorKind::NotNullViolation,
            _ => DbErrorKind::Other,
        }
    }
}

#[test]
fn test_constraint_codes_map_to_kinds() {
    assert_eq!(classify_sqlstate("23505"), Some(ErrorKind::AlreadyExists));
    assert_eq!(classify_sqlstate("23503"), Some(ErrorKind::InvalidReference));
    assert_eq!(classify_sqlstate("23514"), Some(ErrorKind::ValidationFailed));
    assert_eq!(
        classify_sqlstate("23502"),
        Some(ErrorKind::RequiredFieldMissing)
    );
    assert_eq!(classify_sqlstate("42P01"), None);
}

#[test]
fn test_statement_cancel_is_timeout() {
    assert_eq!(classify_sqlstate("57014"), Some(ErrorKind::Timeout));
    assert!(!is_retryable_sqlstate("57014"));
}

#[test]
fn test_connection_class_is_connection_and_retryable() {
    assert_eq!(classify_sqlstate("08006"), Some(ErrorKind::Connection));
    assert!(is_retryable_sqlstate("08006"));
    assert!(is_retryable_sqlstate("57P01"));
}

#[test]
fn test_retry_allow_list() {
    for code in ["40001", "40P01", "53000", "53100", "53200", "53300"] {
        assert!(is_retryable_sqlstate(code), "{code} should be retryable");
    }
    for code in ["23505", "23514", "42601", "22P02"] {
        assert!(!is_retryable_sqlstate(code), "{code} should not be retryable");
    }
}

#[test]
fn test_from_sqlstate_carries_context() {
    let err = RepoError::from_sqlstate("create", "User", "23505", "users_email_key");

    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    assert_eq!(err.operation(), "create");
    assert_eq!(err.entity(), "User");
    assert_eq!(err.code(), Some("23505"));
    assert!(!err.is_retryable());
    assert_eq!(
        err.to_string(),
        "create User: already exists (users_email_key)"
    );
}

#[test]
fn test_unknown_code_is_other() {
    let err = RepoError::from_sqlstate("list", "User", "42P01", "relation does not exist");
    assert_eq!(err.kind(), ErrorKind::Other);
}

#[test]
fn test_row_not_found_is_not_found() {
    let err = RepoError::from_sqlx("get", "User", sqlx::Error::RowNotFound);

    assert!(err.is_not_found());
    assert!(!err.is_retryable());
    assert!(err.source().is_some());
}

#[test]
fn test_pool_timeout_is_timeout() {
    let err = RepoError::from_sqlx("list", "User", sqlx::Error::PoolTimedOut);
    assert_eq!(err.kind(), ErrorKind::Timeout);
}

#[test]
fn test_io_error_is_retryable_connection() {
    let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
    let err = RepoError::from_sqlx("update", "User", sqlx::Error::Io(io));

    assert_eq!(err.kind(), ErrorKind::Connection);
    assert!(err.is_retryable());
}

#[test]
fn test_connection_keywords_without_sqlstate() {
    let err = RepoError::from_sqlx(
        "delete",
        "User",
        sqlx::Error::Protocol("unexpected EOF on connection".to_string()),
    );
    assert_eq!(err.kind(), ErrorKind::Connection);

    let err = RepoError::from_sqlx(
        "delete",
        "User",
        sqlx::Error::Protocol("unknown message type".to_string()),
    );
    assert_eq!(err.kind(), ErrorKind::Other);
}

#[test]
fn test_retry_exhausted_wraps_last_error() {
    let last = RepoError::from_sqlstate("update", "Order", "40001", "could not serialize");
    let err = RepoError::retry_exhausted(3, last);

    assert_eq!(err.kind(), ErrorKind::RetryExhausted);
    assert_eq!(err.operation(), "update");
    let source = err.source().expect("source");
    let inner = source.downcast_ref::<RepoError>().expect("repo error");
    assert_eq!(inner.code(), Some("40001"));
}

#[test]
fn test_unique_violation_from_driver() {
    let db = ServerError::new("23505", "duplicate key value violates unique constraint")
        .with_constraint("users_email_key");
    let err = RepoError::from_sqlx("create", "User", db.into_sqlx());

    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    assert_eq!(err.code(), Some("23505"));
    assert_eq!(err.detail(), Some("users_email_key"));
    assert!(!err.is_retryable());
    assert!(err.source().is_some());
}

#[test]
fn test_not_null_violation_names_column() {
    let db = ServerError::new(
        "23502",
        "null value in column \"email\" of relation \"users\" violates not-null constraint",
    );
    let err = RepoError::from_sqlx("update", "User", db.into_sqlx());

    assert_eq!(err.kind(), ErrorKind::RequiredFieldMissing);
    assert_eq!(err.detail(), Some("email"));
    assert!(!err.is_retryable());
}

#[test]
fn test_serialization_failure_is_retryable() {
    let db = ServerError::new("40001", "could not serialize access due to concurrent update");
    let err = RepoError::from_sqlx("update", "Order", db.into_sqlx());

    assert_eq!(err.kind(), ErrorKind::Other);
    assert_eq!(err.code(), Some("40001"));
    assert!(err.is_retryable());
}

#[test]
fn test_server_connection_class_from_driver() {
    let db = ServerError::new("08006", "connection failure");
    let err = RepoError::from_sqlx("list", "User", db.into_sqlx());

    assert_eq!(err.kind(), ErrorKind::Connection);
    assert!(err.is_retryable());
}
