//! Caller-facing error taxonomy.

use thiserror::Error;

use itam_core::DomainError;

use crate::backend::ApiError;
use crate::storage::StorageError;

pub type ClientResult<T> = Result<T, ClientError>;

/// Shown when a failed request carries no usable backend message.
pub const GENERIC_FAILURE: &str = "Request failed, please try again";

#[derive(Debug, Error)]
pub enum ClientError {
    /// Login rejected. Prior session state is untouched.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The credential stopped working; the session has been demoted to
    /// anonymous.
    #[error("session expired, please sign in again")]
    SessionExpired,

    /// A CRUD call failed. The session is untouched.
    #[error("{message}")]
    RequestFailed { message: String },

    /// An authenticated call was attempted with no credential.
    #[error("not signed in")]
    NotAuthenticated,

    /// A logout happened while the call was in flight; its result was dropped.
    #[error("session changed while the request was in flight")]
    Superseded,

    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error("could not persist session: {0}")]
    Storage(#[from] StorageError),
}

impl ClientError {
    /// Wrap a non-authentication backend failure for display in a form.
    pub fn request_failed(err: &ApiError) -> Self {
        let message = err.detail().unwrap_or(GENERIC_FAILURE).to_string();
        ClientError::RequestFailed { message }
    }

    /// Message suitable for the UI. Never includes raw backend bodies.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Validation(DomainError::Validation(msg)) => msg.clone(),
            other => other.to_string(),
        }
    }

    /// Errors after which the caller should go back to sign-in.
    pub fn requires_sign_in(&self) -> bool {
        matches!(
            self,
            ClientError::SessionExpired | ClientError::NotAuthenticated | ClientError::Superseded
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_failed_prefers_backend_detail() {
        let err = ClientError::request_failed(&ApiError::Rejected {
            status: 400,
            detail: Some("asset code already exists".into()),
        });
        assert_eq!(err.user_message(), "asset code already exists");

        let err = ClientError::request_failed(&ApiError::Network("connection reset".into()));
        assert_eq!(err.user_message(), GENERIC_FAILURE);
    }

    #[test]
    fn validation_message_is_unprefixed() {
        let err = ClientError::from(DomainError::validation("asset code is required"));
        assert_eq!(err.user_message(), "asset code is required");
    }

    #[test]
    fn only_session_errors_require_sign_in() {
        assert!(ClientError::SessionExpired.requires_sign_in());
        assert!(!ClientError::InvalidCredentials.requires_sign_in());
        assert!(
            !ClientError::RequestFailed {
                message: "x".into()
            }
            .requires_sign_in()
        );
    }
}
