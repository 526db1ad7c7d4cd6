use thiserror::Error;

/// Type alias for Result with ApiError
pub type Result<T> = std::result::Result<T, ApiError>;

/// Error types for the HuntDesk client
#[derive(Error, Debug)]
pub enum ApiError {
    /// Local precondition failure - never reaches the network
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Bad credentials, bad one-time code, or invalid federated credential
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The backend rejected the bearer token (401); session has been torn down
    #[error("Session expired or revoked")]
    SessionExpired,

    /// The external mailbox is not connected; intake operations are gated on it
    #[error("Mailbox not connected")]
    MailboxNotConnected,

    /// The same action is already in flight; retry after it settles
    #[error("{0} is already in flight")]
    AlreadyInFlight(&'static str),

    /// Resource not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-2xx response from a mutation or read
    #[error("Operation failed (HTTP {status}): {message}")]
    OperationFailed { status: u16, message: String },

    /// Network-related error (connection issues, timeouts, etc.)
    #[error("Network error: {0}")]
    Network(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error (config file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Check whether the error came from a failed local precondition,
    /// meaning no request was sent
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ApiError::Validation(_)
                | ApiError::MailboxNotConnected
                | ApiError::AlreadyInFlight(_)
                | ApiError::Config(_)
        )
    }

    /// Check whether the triggering entity was left unchanged and the
    /// action can be retried by repeating it
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            ApiError::OperationFailed { .. }
                | ApiError::Network(_)
                | ApiError::AlreadyInFlight(_)
        )
    }

    /// Check whether the error forces the session down
    pub fn is_session_fatal(&self) -> bool {
        matches!(self, ApiError::SessionExpired)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            return ApiError::OperationFailed {
                status: error.status().map(|s| s.as_u16()).unwrap_or(0),
                message: format!("Malformed response body: {}", error),
            };
        }
        ApiError::Network(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_errors() {
        assert!(ApiError::Validation("password too short".to_string()).is_local());
        assert!(ApiError::MailboxNotConnected.is_local());
        assert!(ApiError::AlreadyInFlight("scan").is_local());
        assert!(!ApiError::SessionExpired.is_local());
        assert!(!ApiError::Network("connection reset".to_string()).is_local());
    }

    #[test]
    fn test_retriable_errors() {
        let failed = ApiError::OperationFailed {
            status: 500,
            message: "internal error".to_string(),
        };
        assert!(failed.is_retriable());
        assert!(ApiError::Network("timeout".to_string()).is_retriable());
        assert!(!ApiError::Auth("bad password".to_string()).is_retriable());
        assert!(!ApiError::SessionExpired.is_retriable());
    }

    #[test]
    fn test_session_fatal() {
        assert!(ApiError::SessionExpired.is_session_fatal());
        assert!(!ApiError::Auth("invalid 2FA code".to_string()).is_session_fatal());
    }

    #[test]
    fn test_error_display() {
        let error = ApiError::OperationFailed {
            status: 502,
            message: "bad gateway".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("502"));
        assert!(display.contains("bad gateway"));

        let display = format!("{}", ApiError::AlreadyInFlight("scan"));
        assert!(display.contains("scan"));
    }
}
