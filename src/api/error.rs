use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The server returned a well-formed error payload. The message is
    /// safe to show to the user as-is.
    #[error("{0}")]
    Server(String),

    /// Authentication failure without a server-provided explanation.
    #[error("Unauthorized - session is no longer valid")]
    Unauthorized,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Shape of the error payload the origin server sends for handled errors.
#[derive(Deserialize)]
struct ServerErrorBody {
    message: String,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..MAX_ERROR_BODY_LENGTH],
                body.len()
            )
        }
    }

    /// Classify a non-success response.
    ///
    /// A JSON body carrying `message` means the server explained the
    /// failure and wins regardless of status code. A bare 401 maps to
    /// `Unauthorized`; everything else is an invalid response.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        if let Ok(parsed) = serde_json::from_str::<ServerErrorBody>(body) {
            return ApiError::Server(parsed.message);
        }
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            _ => ApiError::InvalidResponse(format!(
                "Status {}: {}",
                status,
                Self::truncate_body(body)
            )),
        }
    }
}
