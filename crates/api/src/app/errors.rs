//! Closed error taxonomy and the error half of the response envelope.
//!
//! Every error leaving the gateway is one of these codes, rendered as
//! `{ "error": { "id", "code", "message", "details" } }`. No other shape
//! and no ad-hoc codes exist; handlers never hand-roll envelopes.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use sitegate_auth::{AuthError, AuthzError, TenantError};
use sitegate_core::DomainError;

/// The closed, documented error code set.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    /// Missing, malformed, unknown, or revoked token.
    Authentication,
    /// Missing permission, or missing tenant header on a scoped route.
    Authorization,
    /// Tenant header present but mismatched (cross-tenant probing signal).
    TenantInvalid,
    /// Resource absent or cross-tenant (deliberately indistinguishable).
    NotFound,
    /// Login attempt budget exceeded.
    Throttled,
    /// Catch-all for wrapped internal faults. Never leaks details.
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Authentication => "E401.AUTHENTICATION",
            ErrorCode::Authorization => "E403.AUTHORIZATION",
            ErrorCode::TenantInvalid => "TENANT_INVALID",
            ErrorCode::NotFound => "E404.NOT_FOUND",
            // The taxonomy documents the throttle code by its status literal.
            ErrorCode::Throttled => "429",
            ErrorCode::Internal => "E500.INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::Authentication => StatusCode::UNAUTHORIZED,
            ErrorCode::Authorization | ErrorCode::TenantInvalid => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Throttled => StatusCode::TOO_MANY_REQUESTS,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A gateway error ready to render.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: json!({}),
        }
    }

    pub fn authentication() -> Self {
        Self::new(ErrorCode::Authentication, "authentication required")
    }

    pub fn authorization() -> Self {
        Self::new(ErrorCode::Authorization, "forbidden")
    }

    pub fn tenant_invalid() -> Self {
        Self::new(ErrorCode::TenantInvalid, "tenant mismatch")
    }

    pub fn not_found() -> Self {
        Self::new(ErrorCode::NotFound, "not found")
    }

    pub fn throttled() -> Self {
        Self::new(ErrorCode::Throttled, "too many login attempts")
    }

    pub fn internal() -> Self {
        Self::new(ErrorCode::Internal, "internal error")
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (
            self.code.status(),
            Json(json!({
                "error": {
                    "id": Uuid::now_v7().to_string(),
                    "code": self.code.as_str(),
                    "message": self.message,
                    "details": self.details,
                }
            })),
        )
            .into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Throttled => Self::throttled(),
            AuthError::Unauthenticated | AuthError::InvalidCredentials => Self::authentication(),
            // Crypto failures are internal faults, not client errors, but
            // they must not leak what went wrong.
            AuthError::Crypto(_) => Self::internal(),
        }
    }
}

impl From<TenantError> for ApiError {
    fn from(err: TenantError) -> Self {
        match err {
            // Deliberately the generic authorization code: clients cannot
            // distinguish "no tenant" from "wrong permission".
            TenantError::Missing => Self::authorization(),
            TenantError::Mismatch => Self::tenant_invalid(),
        }
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Forbidden(permission) => {
                Self::authorization().with_details(json!({ "required": permission }))
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    /// A body the framework cannot parse is a wrapped fault like any other:
    /// the closed code set has no validation entry, and the raw rejection
    /// text must never leave the gateway unenveloped.
    fn from(_: JsonRejection) -> Self {
        Self::new(ErrorCode::Internal, "malformed request body")
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound | DomainError::InvalidId(_) => Self::not_found(),
            _ => Self::internal(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
