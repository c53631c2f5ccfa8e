use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque bearer token proving authentication.
///
/// `Debug` is redacted so the token never ends up in logs.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Credential(String);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("bearer token is empty")]
pub struct EmptyCredential;

impl Credential {
    /// Wrap a raw token. Surrounding whitespace is dropped; an empty token is
    /// not a credential.
    pub fn new(token: impl Into<String>) -> Result<Self, EmptyCredential> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(EmptyCredential);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Credential {
    type Error = EmptyCredential;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Credential> for String {
    fn from(value: Credential) -> Self {
        value.0
    }
}

impl core::fmt::Debug for Credential {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_rejects_empty_tokens() {
        assert_eq!(Credential::new("  abc.def \n").unwrap().as_str(), "abc.def");
        assert_eq!(Credential::new("   "), Err(EmptyCredential));
    }

    #[test]
    fn debug_output_is_redacted() {
        let credential = Credential::new("super-secret").unwrap();
        assert!(!format!("{credential:?}").contains("super-secret"));
    }
}
