use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::announcement::ValidationError;
use crate::models::duration::DurationError;

/// Short identifiers for business-rule rejections, carried in the `reason`
/// field of structured error bodies. The set is shared by the service (which
/// emits them) and the store client (which maps them to notice keys).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasonCode {
    OverlappingWindow,
    EndNotAfterStart,
    MessageEmpty,
    MessageTooLong,
    UnitMustBeNonNegative,
    DurationRequired,
}

impl ReasonCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OverlappingWindow => "OVERLAPPING_WINDOW",
            Self::EndNotAfterStart => "END_NOT_AFTER_START",
            Self::MessageEmpty => "MESSAGE_EMPTY",
            Self::MessageTooLong => "MESSAGE_TOO_LONG",
            Self::UnitMustBeNonNegative => "UNIT_MUST_BE_NON_NEGATIVE",
            Self::DurationRequired => "DURATION_REQUIRED",
        }
    }

    /// Parse a wire reason code; unknown codes yield `None` so callers fall
    /// back to their generic message instead of failing.
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "OVERLAPPING_WINDOW" => Some(Self::OverlappingWindow),
            "END_NOT_AFTER_START" => Some(Self::EndNotAfterStart),
            "MESSAGE_EMPTY" => Some(Self::MessageEmpty),
            "MESSAGE_TOO_LONG" => Some(Self::MessageTooLong),
            "UNIT_MUST_BE_NON_NEGATIVE" => Some(Self::UnitMustBeNonNegative),
            "DURATION_REQUIRED" => Some(Self::DurationRequired),
            _ => None,
        }
    }
}

impl From<&ValidationError> for ReasonCode {
    fn from(err: &ValidationError) -> Self {
        match err {
            ValidationError::MessageEmpty => Self::MessageEmpty,
            ValidationError::MessageTooLong => Self::MessageTooLong,
            ValidationError::EndNotAfterStart => Self::EndNotAfterStart,
            ValidationError::Duration(DurationError::UnitMustBeNonNegative) => {
                Self::UnitMustBeNonNegative
            }
            ValidationError::Duration(_) => Self::DurationRequired,
        }
    }
}

/// Service-side error type for the REST surface.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("announcement window overlaps an existing announcement")]
    OverlappingWindow,
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::OverlappingWindow => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn reason(&self) -> Option<ReasonCode> {
        match self {
            Self::Validation(err) => Some(ReasonCode::from(err)),
            Self::OverlappingWindow => Some(ReasonCode::OverlappingWindow),
            Self::Unauthorized | Self::Internal(_) => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({ "error": self.to_string() });
        if let Some(reason) = self.reason() {
            body["reason"] = json!(reason.as_str());
        }
        (self.status_code(), Json(body)).into_response()
    }
}
