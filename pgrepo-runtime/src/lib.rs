//! Runtime support shared by pgrepo-generated repositories.
//!
//! This file is copied verbatim into every generated package as `runtime.rs`.
//! It holds the error taxonomy, the retry policy and the cursor pagination
//! protocol, so generated entity files only contain SQL and bindings.
//!
//! Consumers need `sqlx` (postgres, uuid), `uuid`, `base64`, `tokio` (time),
//! `tokio-util` and `tracing`.

use std::{error::Error as StdError, fmt, future::Future, time::Duration};

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use sqlx::postgres::PgDatabaseError;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

// ============================================================================
// Errors
// ============================================================================

/// Classified failure kind, independent of the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A single-row fetch, update or delete matched nothing.
    NotFound,
    /// Unique constraint violation.
    AlreadyExists,
    /// Foreign key violation.
    InvalidReference,
    /// Check constraint violation.
    ValidationFailed,
    /// Not-null violation; the detail names the column.
    RequiredFieldMissing,
    /// Deadline exceeded or statement cancelled by the server.
    Timeout,
    /// Network or connection-level failure.
    Connection,
    /// A pagination cursor that does not decode.
    InvalidCursor,
    /// The caller cancelled a retry loop.
    Cancelled,
    /// A transient error persisted through every allowed attempt.
    RetryExhausted,
    /// Anything not covered above.
    Other,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not found",
            ErrorKind::AlreadyExists => "already exists",
            ErrorKind::InvalidReference => "invalid reference",
            ErrorKind::ValidationFailed => "validation failed",
            ErrorKind::RequiredFieldMissing => "required field missing",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Connection => "connection error",
            ErrorKind::InvalidCursor => "invalid cursor",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::RetryExhausted => "retries exhausted",
            ErrorKind::Other => "database error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a SQLSTATE code to an error kind.
pub fn classify_sqlstate(code: &str) -> Option<ErrorKind> {
    match code {
        "23505" => Some(ErrorKind::AlreadyExists),
        "23503" => Some(ErrorKind::InvalidReference),
        "23514" => Some(ErrorKind::ValidationFailed),
        "23502" => Some(ErrorKind::RequiredFieldMissing),
        "57014" => Some(ErrorKind::Timeout),
        "57P01" | "57P02" | "57P03" => Some(ErrorKind::Connection),
        c if c.starts_with("08") => Some(ErrorKind::Connection),
        _ => None,
    }
}

/// Whether a SQLSTATE code is on the retry allow-list.
///
/// Serialization failures, deadlocks, insufficient resources (class 53) and
/// connection exceptions (class 08, server shutdown) are transient.
pub fn is_retryable_sqlstate(code: &str) -> bool {
    matches!(code, "40001" | "40P01" | "57P01" | "57P02" | "57P03")
        || code.starts_with("53")
        || code.starts_with("08")
}

/// Column named by a not-null violation message when the driver left the field empty.
fn not_null_column(message: &str) -> Option<&str> {
    let rest = &message[message.find("column \"")? + "column \"".len()..];
    rest.find('"').map(|end| &rest[..end])
}

/// Keyword scan for connection failures that carry no SQLSTATE.
pub fn looks_like_connection_failure(message: &str) -> bool {
    const KEYWORDS: &[&str] = &[
        "connection",
        "broken pipe",
        "reset by peer",
        "network",
        "unexpected eof",
    ];
    let message = message.to_ascii_lowercase();
    KEYWORDS.iter().any(|k| message.contains(k))
}

/// A structured repository error.
///
/// Carries the repository operation and entity that failed, the classified
/// kind and the underlying cause, reachable through [`StdError::source`].
#[derive(Debug)]
pub struct RepoError {
    kind: ErrorKind,
    operation: &'static str,
    entity: &'static str,
    detail: Option<String>,
    code: Option<String>,
    retryable: bool,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl RepoError {
    pub fn new(kind: ErrorKind, operation: &'static str, entity: &'static str) -> Self {
        Self {
            kind,
            operation,
            entity,
            detail: None,
            code: None,
            retryable: kind == ErrorKind::Connection,
            source: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// No row matched a single-row operation.
    pub fn not_found(operation: &'static str, entity: &'static str) -> Self {
        Self::new(ErrorKind::NotFound, operation, entity)
    }

    /// A deadline elapsed.
    pub fn timeout(operation: &'static str, entity: &'static str) -> Self {
        Self::new(ErrorKind::Timeout, operation, entity)
    }

    pub fn cancelled(operation: &'static str, entity: &'static str) -> Self {
        Self::new(ErrorKind::Cancelled, operation, entity)
    }

    pub fn invalid_cursor(
        operation: &'static str,
        entity: &'static str,
        cause: InvalidCursor,
    ) -> Self {
        Self::new(ErrorKind::InvalidCursor, operation, entity)
            .with_detail(cause.reason)
            .with_source(cause)
    }

    /// Build an error from a SQLSTATE code and server message.
    pub fn from_sqlstate(
        operation: &'static str,
        entity: &'static str,
        code: &str,
        message: impl Into<String>,
    ) -> Self {
        let kind = classify_sqlstate(code).unwrap_or(ErrorKind::Other);
        Self {
            kind,
            operation,
            entity,
            detail: Some(message.into()),
            code: Some(code.to_string()),
            retryable: is_retryable_sqlstate(code),
            source: None,
        }
    }

    /// Classify a driver error.
    pub fn from_sqlx(operation: &'static str, entity: &'static str, err: sqlx::Error) -> Self {
        let (kind, code, detail, retryable) = match &err {
            sqlx::Error::RowNotFound => (ErrorKind::NotFound, None, None, false),
            sqlx::Error::PoolTimedOut => (ErrorKind::Timeout, None, None, false),
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => (ErrorKind::Connection, None, None, true),
            sqlx::Error::Database(db) => {
                let code = db.code().map(|c| c.into_owned());
                let kind = code
                    .as_deref()
                    .and_then(classify_sqlstate)
                    .unwrap_or(ErrorKind::Other);
                let detail = match kind {
                    ErrorKind::RequiredFieldMissing => db
                        .try_downcast_ref::<PgDatabaseError>()
                        .and_then(|pg| pg.column())
                        .or_else(|| not_null_column(db.message()))
                        .map(str::to_string),
                    ErrorKind::AlreadyExists
                    | ErrorKind::InvalidReference
                    | ErrorKind::ValidationFailed => db.constraint().map(str::to_string),
                    _ => None,
                };
                let retryable = code.as_deref().is_some_and(is_retryable_sqlstate);
                (kind, code, detail, retryable)
            }
            other if looks_like_connection_failure(&other.to_string()) => {
                (ErrorKind::Connection, None, None, true)
            }
            _ => (ErrorKind::Other, None, None, false),
        };

        Self {
            kind,
            operation,
            entity,
            detail,
            code,
            retryable,
            source: Some(Box::new(err)),
        }
    }

    /// Wrap the last transient error after the final attempt.
    pub fn retry_exhausted(attempts: u32, last: RepoError) -> Self {
        let operation = last.operation;
        let entity = last.entity;
        Self::new(ErrorKind::RetryExhausted, operation, entity)
            .with_detail(format!("gave up after {} attempts", attempts))
            .with_source(last)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn entity(&self) -> &'static str {
        self.entity
    }

    /// Column, constraint or message attached by classification.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// SQLSTATE code, when the server reported one.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }
}

impl fmt::Display for RepoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.operation, self.entity, self.kind)?;
        if let Some(detail) = &self.detail {
            write!(f, " ({})", detail)?;
        }
        Ok(())
    }
}

impl StdError for RepoError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

/// Run `fut`, failing with [`ErrorKind::Timeout`] once `deadline` elapses.
pub async fn with_deadline<T, Fut>(
    deadline: Duration,
    operation: &'static str,
    entity: &'static str,
    fut: Fut,
) -> Result<T, RepoError>
where
    Fut: Future<Output = Result<T, RepoError>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(elapsed) => Err(RepoError::timeout(operation, entity).with_source(elapsed)),
    }
}

// ============================================================================
// Retry
// ============================================================================

/// Exponential backoff settings handed to every repository constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts, including the first. Values below 1 behave as 1.
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub base_delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
}

impl RetryConfig {
    pub const fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
        }
    }

    /// Run each operation exactly once.
    pub const fn no_retry() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    /// Delay after the `failed`-th failed attempt (1-based): base * 2^(failed-1), capped.
    pub fn backoff(&self, failed: u32) -> Duration {
        let factor = 2u32.saturating_pow(failed.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(100), Duration::from_secs(5))
    }
}

/// Run `op` until it succeeds, fails permanently, runs out of attempts or
/// `cancel` fires.
///
/// Only errors with [`RepoError::is_retryable`] are retried. Cancellation
/// wins over both the running attempt and the backoff sleep and surfaces as
/// [`ErrorKind::Cancelled`].
pub async fn with_retry<T, F, Fut>(
    config: &RetryConfig,
    cancel: &CancellationToken,
    operation: &'static str,
    entity: &'static str,
    mut op: F,
) -> Result<T, RepoError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RepoError>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(RepoError::cancelled(operation, entity));
        }
        attempt += 1;

        let err = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RepoError::cancelled(operation, entity)),
            result = op() => match result {
                Ok(value) => return Ok(value),
                Err(err) => err,
            },
        };

        if !err.is_retryable() {
            return Err(err);
        }
        if attempt >= max_attempts {
            tracing::warn!(operation, entity, attempt, error = %err, "retries exhausted");
            return Err(RepoError::retry_exhausted(attempt, err));
        }

        let delay = config.backoff(attempt);
        tracing::debug!(operation, entity, attempt, ?delay, error = %err, "retrying");

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RepoError::cancelled(operation, entity)),
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

// ============================================================================
// Pagination
// ============================================================================

/// Page size used when none (or a non-positive one) is requested.
pub const DEFAULT_PAGE_LIMIT: i64 = 20;

/// Largest page size served.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Clamp a requested page size into `1..=MAX_PAGE_LIMIT`.
pub fn clamp_limit(requested: Option<i64>) -> i64 {
    match requested {
        Some(limit) if limit > 0 => limit.min(MAX_PAGE_LIMIT),
        _ => DEFAULT_PAGE_LIMIT,
    }
}

/// A cursor that does not decode to a primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidCursor {
    reason: &'static str,
}

impl fmt::Display for InvalidCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid cursor: {}", self.reason)
    }
}

impl StdError for InvalidCursor {}

/// Encode a primary key as an opaque cursor.
pub fn encode_cursor(key: Uuid) -> String {
    URL_SAFE_NO_PAD.encode(key.as_bytes())
}

/// Decode a cursor produced by [`encode_cursor`].
pub fn decode_cursor(cursor: &str) -> Result<Uuid, InvalidCursor> {
    let bytes = URL_SAFE_NO_PAD.decode(cursor).map_err(|_| InvalidCursor {
        reason: "not url-safe base64",
    })?;
    Uuid::from_slice(&bytes).map_err(|_| InvalidCursor {
        reason: "wrong key length",
    })
}

/// Request for one page of a keyset scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// Requested page size; clamped, never rejected.
    pub limit: Option<i64>,
    /// Cursor from the previous page; `None` starts from the beginning.
    pub cursor: Option<String>,
}

impl PageRequest {
    pub fn first(limit: i64) -> Self {
        Self {
            limit: Some(limit),
            cursor: None,
        }
    }

    pub fn after(cursor: impl Into<String>, limit: i64) -> Self {
        Self {
            limit: Some(limit),
            cursor: Some(cursor.into()),
        }
    }

    /// The page that follows `page`, or `None` after the last page.
    pub fn next<T>(&self, page: &Page<T>) -> Option<Self> {
        page.next_cursor.as_ref().map(|cursor| Self {
            limit: self.limit,
            cursor: Some(cursor.clone()),
        })
    }

    /// Effective page size.
    pub fn limit(&self) -> i64 {
        clamp_limit(self.limit)
    }

    /// Key to resume after, if a cursor is present.
    pub fn after_key(&self) -> Result<Option<Uuid>, InvalidCursor> {
        self.cursor.as_deref().map(decode_cursor).transpose()
    }
}

/// One page of results in ascending primary-key order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Cursor for the following page; present exactly when `has_more`.
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Build a page from a probe of up to `limit + 1` rows.
    pub fn from_probe(mut rows: Vec<T>, limit: i64, key: impl Fn(&T) -> Uuid) -> Self {
        let limit = usize::try_from(limit).unwrap_or(0);
        let has_more = rows.len() > limit;
        if has_more {
            rows.truncate(limit);
        }
        let next_cursor = if has_more {
            rows.last().map(|row| encode_cursor(key(row)))
        } else {
            None
        };

        Self {
            items: rows,
            next_cursor,
            has_more,
        }
    }
}

/// Fetch one page: decode the cursor, probe `limit + 1` rows after it, trim.
///
/// `fetch` receives the key to resume after (if any) and the probe size and
/// must return rows with key greater than it in ascending key order.
pub async fn paginate<T, K, F, Fut>(
    request: &PageRequest,
    operation: &'static str,
    entity: &'static str,
    key: K,
    fetch: F,
) -> Result<Page<T>, RepoError>
where
    K: Fn(&T) -> Uuid,
    F: FnOnce(Option<Uuid>, i64) -> Fut,
    Fut: Future<Output = Result<Vec<T>, sqlx::Error>>,
{
    let limit = request.limit();
    let after = request
        .after_key()
        .map_err(|cause| RepoError::invalid_cursor(operation, entity, cause))?;

    let rows = fetch(after, limit + 1)
        .await
        .map_err(|err| RepoError::from_sqlx(operation, entity, err))?;

    Ok(Page::from_probe(rows, limit, key))
}
