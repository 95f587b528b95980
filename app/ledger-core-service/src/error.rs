//! HTTP boundary error type. Every domain error enum in this workspace
//! exposes a stable `kind()` string (spec §7); this is the single place
//! that translates `kind()` into an HTTP status code and response body —
//! the domain layer itself never thinks in terms of status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use idempotency::IdempotencyError;
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct ApiError {
    pub kind: String,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new("invalid-input", message)
    }

    pub fn missing_idempotency_key() -> Self {
        Self::new(
            "idempotency-key-missing",
            "the Idempotency-Key header is required for this command",
        )
    }

    pub fn internal(message: impl std::fmt::Display) -> Self {
        Self::new("internal", message.to_string())
    }

    fn status(&self) -> StatusCode {
        match self.kind.as_str() {
            "invalid-input" | "currency-mismatch" | "idempotency-key-missing" => {
                StatusCode::BAD_REQUEST
            }
            "tenant-scope-violation" => StatusCode::FORBIDDEN,
            "not-found" => StatusCode::NOT_FOUND,
            "invalid-state-transition"
            | "unbalanced-entry"
            | "rounding-mismatch"
            | "overpayment"
            | "insufficient-stock"
            | "period-closed"
            | "idempotency-key-reuse" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    kind: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorBody {
            kind: self.kind,
            message: self.message,
        });
        (status, body).into_response()
    }
}

impl From<documents_rs::DocumentError> for ApiError {
    fn from(err: documents_rs::DocumentError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

impl From<gl_rs::LedgerError> for ApiError {
    fn from(err: gl_rs::LedgerError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        Self::internal(err)
    }
}

/// Reconstructs the original `kind`/`message` when a command wrapped by
/// `idempotency::run` failed, or maps the idempotency layer's own errors
/// (key reuse, storage failures) to their stable kinds.
impl From<IdempotencyError> for ApiError {
    fn from(err: IdempotencyError) -> Self {
        match err {
            IdempotencyError::KeyReuse { key } => Self::new(
                "idempotency-key-reuse",
                format!("idempotency key {key} was already used with a different request"),
            ),
            IdempotencyError::Command { kind, message } => Self::new(kind, message),
            other => Self::internal(other),
        }
    }
}

/// Lets a command closure return `ApiError` directly and have
/// `idempotency::run` carry it through untouched via `IdempotencyError::Command`.
impl From<ApiError> for IdempotencyError {
    fn from(err: ApiError) -> Self {
        IdempotencyError::Command {
            kind: err.kind,
            message: err.message,
        }
    }
}
