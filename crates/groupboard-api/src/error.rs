//! Error types for the API layer.
//!
//! [`ApiError`] wraps the core [`SessionError`] taxonomy plus request
//! decoding failures, and converts into an HTTP response via its
//! [`IntoResponse`] implementation.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use groupboard_core::{ErrorKind, SessionError};

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A session operation rejected the request.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The request body was missing or not valid JSON of the expected shape.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// A serialization error while building a response.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Session(e) => match e.kind() {
                ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Conflict | ErrorKind::Full => StatusCode::CONFLICT,
            },
            Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Session(e) => e.kind().code(),
            Self::InvalidBody(_) => ErrorKind::InvalidArgument.code(),
            Self::Serialization(_) => "internal",
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({
            "error": self.to_string(),
            "code": self.code(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_errors_map_to_statuses() {
        let cases = [
            (SessionError::invalid("x"), StatusCode::BAD_REQUEST),
            (SessionError::GroupNotFound(String::from("g")), StatusCode::NOT_FOUND),
            (
                SessionError::NameTaken { name: String::from("a") },
                StatusCode::CONFLICT,
            ),
            (SessionError::GroupFull { capacity: 1 }, StatusCode::CONFLICT),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn conflict_and_full_have_distinct_codes() {
        let taken = ApiError::from(SessionError::NameTaken { name: String::from("a") });
        let full = ApiError::from(SessionError::GroupFull { capacity: 1 });
        assert_eq!(taken.code(), "conflict");
        assert_eq!(full.code(), "full");
    }

    #[test]
    fn bad_body_is_invalid_argument() {
        let err = ApiError::InvalidBody(String::from("expected object"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "invalid_argument");
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
