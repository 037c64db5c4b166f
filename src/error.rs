//! Application error types and HTTP response conversion.
//!
//! Defines a unified error type ([`AppError`]) carrying a closed set of
//! kinds, each with a stable public `code`, an HTTP status, a public
//! `message`, a private `detail` (only ever logged, never serialized to a
//! client), and a mutable structured metadata map.
//!
//! ## Database Error Mapping
//!
//! SQLx errors are automatically converted via [`From<SqlxError>`] with:
//! - Unique constraint violations → [`ErrorKind::DatabaseError`] (the
//!   allocator and link authoring service special-case this before it ever
//!   reaches a handler by matching `InsertOutcome::DuplicateKey` directly,
//!   never via this generic conversion)
//! - Row not found → [`ErrorKind::UrlNotFound`]
//! - Connection pool issues → [`ErrorKind::DatabaseError`]
//!
//! ## Observability
//!
//! All database errors emit metrics via `metrics::counter!` for monitoring.

use axum::{
    Json,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use sqlx::Error as SqlxError;
use validator::ValidationErrors;

/// The closed set of error kinds that may cross a component boundary (spec §4.N).
///
/// Each carries its own default HTTP status; `AppError` may override it via
/// [`AppError::with_status`] but nothing in this repository does so today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UrlNotFound,
    UrlExpired,
    UrlInactive,
    Unauthorized,
    TokenExpired,
    InvalidToken,
    InvalidSigningKey,
    Forbidden,
    InvalidInput,
    MissingRequiredField,
    InvalidFormat,
    CustomAliasTaken,
    DatabaseError,
    CacheError,
    QueueError,
    ExternalServiceError,
    RequestTimeout,
    ServiceUnavailable,
    RateLimitExceeded,
    InternalServerError,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::UrlNotFound => "URL_NOT_FOUND",
            ErrorKind::UrlExpired => "URL_EXPIRED",
            ErrorKind::UrlInactive => "URL_INACTIVE",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::TokenExpired => "TOKEN_EXPIRED",
            ErrorKind::InvalidToken => "INVALID_TOKEN",
            ErrorKind::InvalidSigningKey => "INVALID_SIGNING_KEY",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::InvalidInput => "INVALID_INPUT",
            ErrorKind::MissingRequiredField => "MISSING_REQUIRED_FIELD",
            ErrorKind::InvalidFormat => "INVALID_FORMAT",
            ErrorKind::CustomAliasTaken => "CUSTOM_ALIAS_TAKEN",
            ErrorKind::DatabaseError => "DATABASE_ERROR",
            ErrorKind::CacheError => "CACHE_ERROR",
            ErrorKind::QueueError => "QUEUE_ERROR",
            ErrorKind::ExternalServiceError => "EXTERNAL_SERVICE_ERROR",
            ErrorKind::RequestTimeout => "REQUEST_TIMEOUT",
            ErrorKind::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            ErrorKind::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ErrorKind::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn default_status(self) -> StatusCode {
        match self {
            ErrorKind::UrlNotFound => StatusCode::NOT_FOUND,
            ErrorKind::UrlExpired => StatusCode::GONE,
            ErrorKind::UrlInactive => StatusCode::FORBIDDEN,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::TokenExpired => StatusCode::UNAUTHORIZED,
            ErrorKind::InvalidToken => StatusCode::UNAUTHORIZED,
            ErrorKind::InvalidSigningKey => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::MissingRequiredField => StatusCode::BAD_REQUEST,
            ErrorKind::InvalidFormat => StatusCode::BAD_REQUEST,
            ErrorKind::CustomAliasTaken => StatusCode::BAD_REQUEST,
            ErrorKind::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::CacheError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::QueueError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::ExternalServiceError => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            ErrorKind::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            ErrorKind::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Structured error information returned in API responses. `detail` never
/// appears here — it is logged server-side only.
#[derive(Debug, Serialize, Clone)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub metadata: Value,
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    error: ErrorInfo,
    timestamp: String,
}

/// Application-level error type with a public message, a private cause for
/// logging, and mutable structured metadata.
#[derive(Debug)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
    metadata: Value,
    /// Private detail, e.g. the underlying driver error. Never serialized.
    detail: Option<String>,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            metadata: json!({}),
            detail: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Attaches a cause for server-side logging (`Wrap` in spec §4.N).
    pub fn wrap(mut self, cause: impl std::fmt::Display) -> Self {
        self.detail = Some(cause.to_string());
        self
    }

    /// Clones and adds a metadata entry (`WithContext` in spec §4.N).
    pub fn with_context(mut self, key: &str, value: impl Into<Value>) -> Self {
        if let Value::Object(ref mut map) = self.metadata {
            map.insert(key.to_string(), value.into());
        }
        self
    }

    /// Clones and replaces the public message (`WithMessage` in spec §4.N).
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn to_error_info(&self) -> ErrorInfo {
        ErrorInfo {
            code: self.kind.code(),
            message: self.message.clone(),
            metadata: self.metadata.clone(),
        }
    }

    // Convenience constructors, one per kind, mirroring the teacher's
    // `bad_request`/`not_found`/... helpers.

    pub fn url_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UrlNotFound, message)
    }
    pub fn url_expired(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UrlExpired, message)
    }
    pub fn url_inactive(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UrlInactive, message)
    }
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }
    pub fn token_expired(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TokenExpired, message)
    }
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidToken, message)
    }
    pub fn invalid_signing_key(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidSigningKey, message)
    }
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }
    pub fn missing_required_field(field: &str) -> Self {
        Self::new(ErrorKind::MissingRequiredField, format!("Missing required field: {field}"))
            .with_context("field", field.to_string())
    }
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidFormat, message)
    }
    pub fn custom_alias_taken(alias: &str) -> Self {
        Self::new(ErrorKind::CustomAliasTaken, "This alias is already in use")
            .with_context("alias", alias.to_string())
    }
    pub fn database_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DatabaseError, message)
    }
    pub fn cache_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CacheError, message)
    }
    pub fn queue_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::QueueError, message)
    }
    pub fn external_service_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExternalServiceError, message)
    }
    pub fn request_timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RequestTimeout, message)
    }
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }
    pub fn rate_limit_exceeded(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RateLimitExceeded, message)
    }
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InternalServerError, message)
    }

    /// True for errors worth retrying in a bounded backoff loop (used by K's
    /// click-worker retry predicate). Mirrors the teacher's
    /// `is_transient_error`, generalized to the full kind set.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::DatabaseError | ErrorKind::CacheError | ErrorKind::QueueError
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.kind.default_status();
        let add_www_authenticate = matches!(
            self.kind,
            ErrorKind::Unauthorized | ErrorKind::TokenExpired | ErrorKind::InvalidToken
        );

        if let Some(detail) = &self.detail {
            tracing::error!(code = self.kind.code(), detail, "request failed");
        }

        let body = ErrorBody {
            success: false,
            message: self.message.clone(),
            error: self.to_error_info(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        if add_www_authenticate {
            let mut headers = HeaderMap::new();
            headers.insert(header::WWW_AUTHENTICATE, "Bearer".parse().unwrap());
            (status, headers, Json(body)).into_response()
        } else {
            (status, Json(body)).into_response()
        }
    }
}

impl From<SqlxError> for AppError {
    fn from(e: SqlxError) -> Self {
        map_sqlx_error(e)
    }
}

/// Maps SQLx errors to application errors, emitting metrics for monitoring.
///
/// Unique-violation here always maps to [`ErrorKind::DatabaseError`] — the
/// *meaning* of a duplicate key (collision vs. taken custom alias) is
/// context-dependent and is decided by the caller, which matches
/// `InsertOutcome::DuplicateKey` directly rather than going through this
/// generic conversion.
pub fn map_sqlx_error(e: SqlxError) -> AppError {
    #[cfg(debug_assertions)]
    tracing::debug!(error = ?e, "full sqlx error in debug mode");

    match &e {
        SqlxError::Database(db_err) => {
            if db_err.is_unique_violation() {
                metrics::counter!("database_errors_total", "type" => "unique_violation")
                    .increment(1);
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                return AppError::database_error("Duplicate key")
                    .with_context("constraint", constraint.clone())
                    .wrap(format!("unique violation on {constraint}"));
            }

            if db_err.is_foreign_key_violation() {
                metrics::counter!("database_errors_total", "type" => "foreign_key_violation")
                    .increment(1);
                return AppError::invalid_input("Referenced resource not found")
                    .wrap(db_err.message().to_string());
            }

            if db_err.is_check_violation() {
                metrics::counter!("database_errors_total", "type" => "check_violation")
                    .increment(1);
                return AppError::invalid_input("Data validation failed")
                    .wrap(db_err.message().to_string());
            }

            tracing::error!(
                code = ?db_err.code(),
                message = ?db_err.message(),
                constraint = ?db_err.constraint(),
                "unhandled database error"
            );
            metrics::counter!("database_errors_total", "type" => "other").increment(1);
            AppError::database_error("Database constraint violation").wrap(db_err.message().to_string())
        }

        SqlxError::RowNotFound => {
            metrics::counter!("database_errors_total", "type" => "row_not_found").increment(1);
            AppError::url_not_found("Record not found")
        }

        SqlxError::PoolTimedOut => {
            tracing::warn!("database connection pool timed out");
            metrics::counter!("database_errors_total", "type" => "pool_timeout").increment(1);
            AppError::database_error("Service temporarily unavailable").with_context("retryable", true)
        }

        SqlxError::PoolClosed => {
            tracing::error!("database connection pool is closed");
            metrics::counter!("database_errors_total", "type" => "pool_closed").increment(1);
            AppError::service_unavailable("Service unavailable")
        }

        SqlxError::Io(_) => {
            tracing::warn!(error = ?e, "database I/O error");
            metrics::counter!("database_errors_total", "type" => "io_error").increment(1);
            AppError::database_error("Database connection issue").with_context("retryable", true)
        }

        _ => {
            tracing::error!(error = ?e, "unexpected database error");
            metrics::counter!("database_errors_total", "type" => "unknown").increment(1);
            AppError::database_error("Database operation failed")
        }
    }
}

impl std::error::Error for AppError {}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.code(), self.message)
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let metadata = json!({
            "fields": errors
                .field_errors()
                .iter()
                .map(|(field, errors)| {
                    (
                        field.to_string(),
                        errors
                            .iter()
                            .map(|e| {
                                json!({
                                    "code": e.code,
                                    "message": e.message.as_ref().map(|m| m.to_string()),
                                    "params": e.params
                                })
                            })
                            .collect::<Vec<_>>()
                    )
                })
                .collect::<std::collections::HashMap<_, _>>()
        });

        AppError::new(ErrorKind::InvalidInput, "Request validation failed").with_context("fields", metadata["fields"].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_mapping_matches_spec_table() {
        assert_eq!(status(AppError::url_not_found("x")), StatusCode::NOT_FOUND);
        assert_eq!(status(AppError::url_expired("x")), StatusCode::GONE);
        assert_eq!(status(AppError::url_inactive("x")), StatusCode::FORBIDDEN);
        assert_eq!(status(AppError::unauthorized("x")), StatusCode::UNAUTHORIZED);
        assert_eq!(status(AppError::token_expired("x")), StatusCode::UNAUTHORIZED);
        assert_eq!(status(AppError::invalid_token("x")), StatusCode::UNAUTHORIZED);
        assert_eq!(status(AppError::invalid_signing_key("x")), StatusCode::UNAUTHORIZED);
        assert_eq!(status(AppError::forbidden("x")), StatusCode::FORBIDDEN);
        assert_eq!(status(AppError::invalid_input("x")), StatusCode::BAD_REQUEST);
        assert_eq!(status(AppError::missing_required_field("x")), StatusCode::BAD_REQUEST);
        assert_eq!(status(AppError::invalid_format("x")), StatusCode::BAD_REQUEST);
        assert_eq!(status(AppError::custom_alias_taken("x")), StatusCode::BAD_REQUEST);
        assert_eq!(status(AppError::database_error("x")), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status(AppError::cache_error("x")), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status(AppError::queue_error("x")), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status(AppError::external_service_error("x")), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status(AppError::request_timeout("x")), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(status(AppError::service_unavailable("x")), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status(AppError::rate_limit_exceeded("x")), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(status(AppError::internal("x")), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_unauthorized_family_has_www_authenticate_header() {
        for err in [
            AppError::unauthorized("x"),
            AppError::token_expired("x"),
            AppError::invalid_token("x"),
        ] {
            let response = err.into_response();
            assert_eq!(
                response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
                "Bearer"
            );
        }
    }

    #[test]
    fn test_url_not_found_has_no_www_authenticate_header() {
        let response = AppError::url_not_found("x").into_response();
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }

    #[test]
    fn test_with_context_adds_metadata() {
        let err = AppError::invalid_input("bad").with_context("field", "originalUrl");
        assert_eq!(err.to_error_info().metadata["field"], "originalUrl");
    }

    #[test]
    fn test_with_message_replaces_public_message() {
        let err = AppError::internal("original").with_message("replaced");
        assert_eq!(err.to_error_info().message, "replaced");
    }

    #[test]
    fn test_wrap_does_not_leak_into_error_info() {
        let err = AppError::internal("public").wrap("super secret driver detail");
        let info = err.to_error_info();
        assert_eq!(info.message, "public");
        assert!(serde_json::to_string(&info).unwrap().contains("public"));
        assert!(!serde_json::to_string(&info).unwrap().contains("secret"));
    }

    #[test]
    fn test_is_transient() {
        assert!(AppError::database_error("x").is_transient());
        assert!(AppError::cache_error("x").is_transient());
        assert!(AppError::queue_error("x").is_transient());
        assert!(!AppError::url_not_found("x").is_transient());
        assert!(!AppError::invalid_input("x").is_transient());
    }

    #[test]
    fn test_display_includes_code_and_message() {
        let s = AppError::url_expired("link expired").to_string();
        assert!(s.contains("URL_EXPIRED"));
        assert!(s.contains("link expired"));
    }
}
