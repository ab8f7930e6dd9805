use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized - credential rejected by the backend")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            // Back off to a char boundary; the cut may land mid-codepoint.
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..end],
                body.len()
            )
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            400 => ApiError::BadRequest(truncated),
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden(truncated),
            404 => ApiError::NotFound(truncated),
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// Whether the backend rejected the request itself, as opposed to a
    /// transport or server fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ApiError::BadRequest(_)
                | ApiError::Unauthorized
                | ApiError::Forbidden(_)
                | ApiError::NotFound(_)
        )
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::InvalidResponse(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_mapping() {
        assert_eq!(
            ApiError::from_status(StatusCode::BAD_REQUEST, "Incorrect answer."),
            ApiError::BadRequest("Incorrect answer.".to_string())
        );
        assert_eq!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, "whatever"),
            ApiError::Unauthorized
        );
        assert!(matches!(
            ApiError::from_status(StatusCode::FORBIDDEN, "no"),
            ApiError::Forbidden(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, "gone"),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            ApiError::ServerError(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::IM_A_TEAPOT, "teapot"),
            ApiError::InvalidResponse(_)
        ));
    }

    #[test]
    fn test_body_truncation() {
        let long_body = "x".repeat(2000);
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, &long_body);
        let ApiError::BadRequest(msg) = err else {
            panic!("expected BadRequest");
        };
        assert!(msg.len() < 600);
        assert!(msg.contains("truncated"));
    }

    #[test]
    fn test_body_truncation_respects_char_boundaries() {
        // Place a two-byte character across the cut point.
        let mut body = "x".repeat(MAX_ERROR_BODY_LENGTH - 1);
        body.push('é');
        body.push_str(&"y".repeat(200));

        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, &body);
        let ApiError::ServerError(msg) = err else {
            panic!("expected ServerError");
        };
        assert!(msg.starts_with(&"x".repeat(MAX_ERROR_BODY_LENGTH - 1)));
        assert!(msg.contains("truncated"));
    }

    #[test]
    fn test_is_client_error() {
        assert!(ApiError::Unauthorized.is_client_error());
        assert!(ApiError::BadRequest(String::new()).is_client_error());
        assert!(!ApiError::ServerError(String::new()).is_client_error());
        assert!(!ApiError::Network(String::new()).is_client_error());
    }
}
