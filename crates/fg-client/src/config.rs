//! Client configuration

use std::time::Duration;

/// Content type sent with JSON requests
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Client configuration
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Whole-request timeout
    pub timeout: Duration,
    /// Timeout for establishing the TCP/TLS connection
    pub connect_timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Content type used for JSON reads and writes
    pub content_type: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("fg-client/{}", env!("CARGO_PKG_VERSION")),
            content_type: JSON_CONTENT_TYPE.to_string(),
        }
    }
}

impl ClientConfig {
    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Override the JSON content type
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }
}
