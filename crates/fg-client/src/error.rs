//! Client error types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Longest slice of a rejected response body kept in an error message
const MAX_ERROR_BODY: usize = 512;

/// Gateway client errors
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The tenant has no usable endpoint
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Network or IO failure while talking to the gateway
    #[error("transport error: {0}")]
    Transport(String),

    /// The gateway answered with a status outside the expected success code
    #[error("gateway responded with status {status}: {message}")]
    Remote { status: u16, message: String },

    /// The response body did not have the expected shape
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// No token could be issued for the user
    #[error("identity error: {0}")]
    Identity(String),
}

impl GatewayError {
    /// Build a remote error from a status and the (possibly empty) body
    pub fn remote(status: u16, context: impl Into<String>, body: &str) -> Self {
        let mut message = context.into();
        let body = body.trim();
        if !body.is_empty() {
            let cut = body
                .char_indices()
                .map(|(i, _)| i)
                .take_while(|i| *i <= MAX_ERROR_BODY)
                .last()
                .unwrap_or(0);
            let snippet = if body.len() > MAX_ERROR_BODY { &body[..cut] } else { body };
            message.push_str(": ");
            message.push_str(snippet);
        }
        Self::Remote { status, message }
    }

    /// HTTP status carried by a remote error
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether a caller may reasonably try the same call again
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Remote { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Check if this is a missing/invalid endpoint error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Transport(format!("request timed out: {}", err))
        } else if err.is_connect() {
            GatewayError::Transport(format!("connection failed: {}", err))
        } else if err.is_decode() {
            GatewayError::MalformedResponse(err.to_string())
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

impl From<std::io::Error> for GatewayError {
    fn from(err: std::io::Error) -> Self {
        GatewayError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::MalformedResponse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(GatewayError::Transport("reset".into()).is_retryable());
        assert!(GatewayError::remote(503, "busy", "").is_retryable());
        assert!(!GatewayError::remote(404, "missing", "").is_retryable());
        assert!(!GatewayError::Configuration("unset".into()).is_retryable());
        assert!(!GatewayError::MalformedResponse("bad".into()).is_retryable());
    }

    #[test]
    fn test_remote_message_includes_trimmed_body() {
        let err = GatewayError::remote(400, "add failed", "  {\"message\":\"bad\"}\n");
        assert_eq!(err.status(), Some(400));
        assert_eq!(
            err.to_string(),
            "gateway responded with status 400: add failed: {\"message\":\"bad\"}"
        );
    }

    #[test]
    fn test_remote_message_truncates_long_body() {
        let body = "x".repeat(4 * MAX_ERROR_BODY);
        match GatewayError::remote(500, "boom", &body) {
            GatewayError::Remote { message, .. } => {
                assert!(message.len() <= "boom: ".len() + MAX_ERROR_BODY);
            }
            other => panic!("expected Remote, got {other:?}"),
        }
    }
}
