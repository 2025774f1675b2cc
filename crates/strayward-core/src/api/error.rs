use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unauthorized: {}", .detail.as_deref().unwrap_or("token may be expired"))]
    Unauthorized { detail: Option<String> },

    #[error("Access denied: {}", .detail.as_deref().unwrap_or("not enough permissions"))]
    AccessDenied { detail: Option<String> },

    #[error("Resource not found: {}", .detail.as_deref().unwrap_or("no details"))]
    NotFound { detail: Option<String> },

    #[error("Request rejected ({status}): {}", .detail.as_deref().unwrap_or("no details"))]
    Validation {
        status: StatusCode,
        detail: Option<String>,
        body: String,
    },

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error ({status}): {body}")]
    Server {
        status: StatusCode,
        detail: Option<String>,
        body: String,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Pull the server's `detail` out of an error body.
    ///
    /// Handled errors carry `{"detail": "..."}`; request validation failures
    /// carry `{"detail": [{"msg": "...", ...}]}`.
    pub fn extract_detail(body: &str) -> Option<String> {
        let value: Value = serde_json::from_str(body).ok()?;
        match value.get("detail")? {
            Value::String(detail) if !detail.trim().is_empty() => Some(detail.clone()),
            Value::Array(items) => items
                .iter()
                .find_map(|item| item.get("msg").and_then(Value::as_str))
                .map(str::to_string),
            _ => None,
        }
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let detail = Self::extract_detail(body);
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized { detail },
            403 => ApiError::AccessDenied { detail },
            404 => ApiError::NotFound { detail },
            429 => ApiError::RateLimited,
            400..=499 => ApiError::Validation {
                status,
                detail,
                body: truncated,
            },
            500..=599 => ApiError::Server {
                status,
                detail,
                body: truncated,
            },
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// HTTP status, when the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Network(e) => e.status(),
            ApiError::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            ApiError::AccessDenied { .. } => Some(StatusCode::FORBIDDEN),
            ApiError::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            ApiError::RateLimited => Some(StatusCode::TOO_MANY_REQUESTS),
            ApiError::Validation { status, .. } | ApiError::Server { status, .. } => Some(*status),
            ApiError::InvalidResponse(_) | ApiError::InvalidRequest(_) => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    /// Server-provided detail string, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { detail }
            | ApiError::AccessDenied { detail }
            | ApiError::NotFound { detail }
            | ApiError::Validation { detail, .. }
            | ApiError::Server { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Message suitable for showing to a user: the server's detail when it
    /// sent one, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.detail().unwrap_or(fallback).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_categories() {
        assert!(ApiError::from_status(StatusCode::UNAUTHORIZED, "").is_unauthorized());
        assert!(matches!(
            ApiError::from_status(StatusCode::FORBIDDEN, ""),
            ApiError::AccessDenied { .. }
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, ""),
            ApiError::NotFound { .. }
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, ""),
            ApiError::RateLimited
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, ""),
            ApiError::Validation { .. }
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, "upstream"),
            ApiError::Server { .. }
        ));
    }

    #[test]
    fn test_detail_string() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"detail": "Email already registered"}"#);
        assert_eq!(err.detail(), Some("Email already registered"));
        assert_eq!(err.user_message("Signup failed"), "Email already registered");
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn test_detail_validation_array() {
        let body = r#"{"detail": [{"loc": ["body", "latitude"], "msg": "ensure this value is less than or equal to 90", "type": "value_error"}]}"#;
        let err = ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, body);
        assert_eq!(err.detail(), Some("ensure this value is less than or equal to 90"));
    }

    #[test]
    fn test_fallback_when_no_detail() {
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
        assert_eq!(err.detail(), None);
        assert_eq!(err.user_message("Failed to load dogs"), "Failed to load dogs");

        let err = ApiError::InvalidResponse("bad json".to_string());
        assert_eq!(err.user_message("Login failed"), "Login failed");
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(MAX_ERROR_BODY_LENGTH + 20);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.starts_with(&"x".repeat(MAX_ERROR_BODY_LENGTH)));
        assert!(truncated.contains("truncated, 520 total bytes"));

        // Never split a multi-byte character
        let multibyte = "č".repeat(MAX_ERROR_BODY_LENGTH);
        assert!(ApiError::truncate_body(&multibyte).contains("truncated"));
    }
}
