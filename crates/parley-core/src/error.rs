//! Error types shared across the engine.
//!
//! Remote collaborators report [`RemoteError`]; token decoding reports
//! [`TokenError`]. Higher layers classify every failure into a
//! [`FailureKind`] so the UI can react without matching on concrete types.

use thiserror::Error;

/// Coarse failure classification exposed to the calling application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Bad credentials or an expired/rejected token.
    AuthFailure,
    /// Transport-level failure (connect, timeout, broken stream).
    NetworkFailure,
    /// Malformed token, response body, push payload or persisted slot.
    DecodeFailure,
    /// Operation needs a session but none is established.
    NotAuthenticated,
    /// Server answered with a non-success status other than auth.
    Rejected,
    /// Local durable storage failed.
    Storage,
}

/// Errors reported by the remote client and push stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Server refused the credentials or token (401/403).
    #[error("authentication rejected ({status}): {message}")]
    Auth {
        /// HTTP status code.
        status: u16,
        /// Server-provided reason.
        message: String,
    },

    /// Transport failure before a response was obtained.
    #[error("network error: {0}")]
    Network(String),

    /// Response or payload could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Server answered with another non-success status.
    #[error("request rejected ({status}): {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Server-provided reason.
        message: String,
    },
}

impl RemoteError {
    /// Classify this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Auth { .. } => FailureKind::AuthFailure,
            Self::Network(_) => FailureKind::NetworkFailure,
            Self::Decode(_) => FailureKind::DecodeFailure,
            Self::Rejected { .. } => FailureKind::Rejected,
        }
    }

    /// Returns true if retrying the same request may succeed.
    ///
    /// The engine itself never retries; this is a hint for callers.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Rejected { status, .. } => *status >= 500,
            Self::Auth { .. } | Self::Decode(_) => false,
        }
    }
}

/// Errors from decoding a session token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Not a JWT, or claims don't describe a user.
    #[error("malformed token: {0}")]
    Malformed(String),

    /// Signature or algorithm check failed.
    #[error("token rejected: {0}")]
    Rejected(String),

    /// `exp` claim is in the past.
    #[error("token expired")]
    Expired,
}

impl From<TokenError> for RemoteError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => Self::Auth { status: 401, message: err.to_string() },
            TokenError::Malformed(_) | TokenError::Rejected(_) => Self::Decode(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_matches_taxonomy() {
        assert_eq!(
            RemoteError::Auth { status: 401, message: String::new() }.kind(),
            FailureKind::AuthFailure
        );
        assert_eq!(RemoteError::Network("reset".into()).kind(), FailureKind::NetworkFailure);
        assert_eq!(RemoteError::Decode("eof".into()).kind(), FailureKind::DecodeFailure);
        assert_eq!(
            RemoteError::Rejected { status: 404, message: String::new() }.kind(),
            FailureKind::Rejected
        );
    }

    #[test]
    fn only_network_and_server_errors_are_transient() {
        assert!(RemoteError::Network("timeout".into()).is_transient());
        assert!(RemoteError::Rejected { status: 503, message: String::new() }.is_transient());
        assert!(!RemoteError::Rejected { status: 400, message: String::new() }.is_transient());
        assert!(!RemoteError::Auth { status: 401, message: String::new() }.is_transient());
        assert!(!RemoteError::Decode("bad json".into()).is_transient());
    }

    #[test]
    fn expired_token_is_an_auth_failure() {
        assert_eq!(RemoteError::from(TokenError::Expired).kind(), FailureKind::AuthFailure);
        assert_eq!(
            RemoteError::from(TokenError::Malformed("x".into())).kind(),
            FailureKind::DecodeFailure
        );
    }
}
