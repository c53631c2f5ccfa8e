//! Session lifecycle states.
//!
//! ```text
//! Anonymous --login--> Authenticating --ok--> Authenticated
//!     ^                     |  fail                 |
//!     +---------------------+                       | logout / refresh failure
//!     +------------- Invalidating <-----------------+
//! ```
//!
//! Identity only ever appears next to a credential: the only variant carrying
//! an [`Identity`] also carries a [`Credential`].

use serde::Serialize;

use crate::{Credential, Identity};

/// Coarse lifecycle phase, without payload.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Anonymous,
    Authenticating,
    Authenticated,
    Invalidating,
}

impl core::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            SessionPhase::Anonymous => "anonymous",
            SessionPhase::Authenticating => "authenticating",
            SessionPhase::Authenticated => "authenticated",
            SessionPhase::Invalidating => "invalidating",
        };
        f.write_str(s)
    }
}

/// The (credential, identity) pairing for this client instance.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No credential. Initial state when nothing is persisted.
    #[default]
    Anonymous,
    /// A login or profile fetch is in flight.
    ///
    /// `credential` is `None` while a login exchange is pending and `Some`
    /// while a restored credential is being validated.
    Authenticating { credential: Option<Credential> },
    /// Credential and identity are both known.
    Authenticated {
        credential: Credential,
        identity: Identity,
    },
    /// Credential already dropped from memory; durable storage is being cleared.
    Invalidating,
}

impl SessionState {
    /// State for a credential read back from durable storage, identity not
    /// yet fetched.
    pub fn restoring(credential: Credential) -> Self {
        Self::Authenticating {
            credential: Some(credential),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        match self {
            SessionState::Anonymous => SessionPhase::Anonymous,
            SessionState::Authenticating { .. } => SessionPhase::Authenticating,
            SessionState::Authenticated { .. } => SessionPhase::Authenticated,
            SessionState::Invalidating => SessionPhase::Invalidating,
        }
    }

    pub fn credential(&self) -> Option<&Credential> {
        match self {
            SessionState::Authenticating { credential } => credential.as_ref(),
            SessionState::Authenticated { credential, .. } => Some(credential),
            SessionState::Anonymous | SessionState::Invalidating => None,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionState::Authenticated { identity, .. } => Some(identity),
            _ => None,
        }
    }

    pub fn has_credential(&self) -> bool {
        self.credential().is_some()
    }

    /// Credential present but identity still being fetched.
    pub fn is_restoring(&self) -> bool {
        matches!(
            self,
            SessionState::Authenticating {
                credential: Some(_)
            }
        )
    }
}
