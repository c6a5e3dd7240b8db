//! Error types for the Pomelo client.
//!
//! Every fallible operation in this crate returns [`ClientError`]. The
//! variants mirror the failure modes of the backend contract: consent
//! rejection, code-for-token exchange failure, profile fetch failure, order
//! submission failure, and session expiry (a 401 on any authenticated call).
//!
//! `SessionExpired` is never surfaced as retryable; the session manager
//! handles it uniformly by forcing a logout.

use thiserror::Error;

/// Errors that can occur when talking to the shop's backend services.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed (connection, timeout, malformed response).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The user or identity provider rejected the authorization request.
    #[error("Authorization denied: {0}")]
    AuthorizationDenied(String),

    /// The authorization code could not be exchanged for a token.
    #[error("Token exchange failed: {0}")]
    TokenExchangeFailed(String),

    /// The user profile could not be fetched.
    #[error("Profile fetch failed: {0}")]
    ProfileFetchFailed(String),

    /// The order could not be submitted.
    #[error("Order submission failed: {0}")]
    OrderSubmissionFailed(String),

    /// An authenticated call returned 401; the session is no longer valid.
    #[error("Session expired")]
    SessionExpired,

    /// The backend returned a non-success status with an error body.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The on-disk credential cache could not be read or written.
    #[error("Credential store error at {path}: {source}")]
    CredentialStore {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClientError::TokenExchangeFailed("invalid_grant".to_string());
        assert_eq!(err.to_string(), "Token exchange failed: invalid_grant");

        let err = ClientError::Api {
            status: 409,
            message: "insufficient stock".to_string(),
        };
        assert_eq!(err.to_string(), "API error (409): insufficient stock");

        assert_eq!(ClientError::SessionExpired.to_string(), "Session expired");
    }
}
