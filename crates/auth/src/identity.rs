//! Authenticated identity and user-administration payloads.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use itam_core::{DomainError, DomainResult, RoleId, UserId};

use crate::{Capability, Role};

const MIN_USERNAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 6;

/// Authenticated user's profile plus assigned role.
///
/// The same shape is returned for `/api/me` and for each entry of the
/// user-management listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub dept: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub role: Role,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

/// A user account as listed by an administrator.
pub type UserAccount = Identity;

fn default_active() -> bool {
    true
}

impl Identity {
    /// Name shown in the user menu: display name, falling back to username.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.username)
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.role.grants(capability)
    }
}

/// Payload for `POST /api/users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub display_name: Option<String>,
    pub dept: Option<String>,
    pub role_id: RoleId,
    pub password: String,
}

impl NewUser {
    /// Mirrors the backend's field constraints so obvious mistakes are caught
    /// before a round trip.
    pub fn validate(&self) -> DomainResult<()> {
        if self.username.trim().chars().count() < MIN_USERNAME_LEN {
            return Err(DomainError::validation(format!(
                "username must be at least {MIN_USERNAME_LEN} characters"
            )));
        }
        check_password(&self.password)
    }
}

/// Payload for `PUT /api/users/{id}`. Omitted fields are unchanged; in
/// particular an absent `password` keeps the current one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dept: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<RoleId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UserPatch {
    /// Patch flipping the account's active flag and nothing else.
    pub fn toggle_active(target: &UserAccount) -> Self {
        Self {
            is_active: Some(!target.is_active),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        match &self.password {
            Some(password) => check_password(password),
            None => Ok(()),
        }
    }
}

fn check_password(password: &str) -> DomainResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn identity_json() -> serde_json::Value {
        json!({
            "id": 1,
            "username": "alice",
            "display_name": null,
            "dept": "IT",
            "is_active": true,
            "role": {
                "id": 3,
                "role_name": "viewer",
                "can_create_asset": false,
                "can_read_asset": true,
                "can_update_asset": false,
                "can_delete_asset": false,
                "can_manage_users": false
            },
            "created_at": "2024-01-01T00:00:00",
            "updated_at": "2024-01-02T00:00:00"
        })
    }

    #[test]
    fn decodes_me_response() {
        let identity: Identity = serde_json::from_value(identity_json()).unwrap();
        assert_eq!(identity.id, UserId::new(1));
        assert_eq!(identity.label(), "alice");
        assert!(identity.can(Capability::ReadAsset));
        assert!(!identity.can(Capability::ManageUsers));
    }

    #[test]
    fn label_prefers_display_name() {
        let mut identity: Identity = serde_json::from_value(identity_json()).unwrap();
        identity.display_name = Some("Alice Liddell".into());
        assert_eq!(identity.label(), "Alice Liddell");
        identity.display_name = Some("  ".into());
        assert_eq!(identity.label(), "alice");
    }

    #[test]
    fn patch_without_password_omits_the_field() {
        let patch = UserPatch {
            dept: Some("Ops".into()),
            ..Default::default()
        };
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value, json!({"dept": "Ops"}));
        assert!(value.get("password").is_none());
    }

    #[test]
    fn toggle_flips_only_active_flag() {
        let identity: Identity = serde_json::from_value(identity_json()).unwrap();
        let patch = UserPatch::toggle_active(&identity);
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({"is_active": false}));
    }

    #[test]
    fn new_user_enforces_backend_minimums() {
        let mut user = NewUser {
            username: "bo".into(),
            display_name: None,
            dept: None,
            role_id: RoleId::new(1),
            password: "secret1".into(),
        };
        assert!(user.validate().is_err());
        user.username = "bob".into();
        assert!(user.validate().is_ok());
        user.password = "short".into();
        assert!(user.validate().is_err());

        let weak = UserPatch {
            password: Some("123".into()),
            ..Default::default()
        };
        assert!(weak.validate().is_err());
    }
}
