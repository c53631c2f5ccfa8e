use serde::{Deserialize, Serialize};

use itam_core::RoleId;

use crate::Capability;

/// Backend-defined role: a name plus the fixed capability flags.
///
/// The client only ever reads these flags to decide rendering; it never
/// mutates a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub role_name: String,
    #[serde(default)]
    pub can_create_asset: bool,
    #[serde(default)]
    pub can_read_asset: bool,
    #[serde(default)]
    pub can_update_asset: bool,
    #[serde(default)]
    pub can_delete_asset: bool,
    #[serde(default)]
    pub can_manage_users: bool,
}

impl Role {
    /// A role with every flag cleared.
    pub fn named(id: RoleId, role_name: impl Into<String>) -> Self {
        Self {
            id,
            role_name: role_name.into(),
            can_create_asset: false,
            can_read_asset: false,
            can_update_asset: false,
            can_delete_asset: false,
            can_manage_users: false,
        }
    }

    /// Builder-style flag setter, mostly for fixtures.
    pub fn with(mut self, capability: Capability, granted: bool) -> Self {
        *self.flag_mut(capability) = granted;
        self
    }

    pub fn grants(&self, capability: Capability) -> bool {
        match capability {
            Capability::CreateAsset => self.can_create_asset,
            Capability::ReadAsset => self.can_read_asset,
            Capability::UpdateAsset => self.can_update_asset,
            Capability::DeleteAsset => self.can_delete_asset,
            Capability::ManageUsers => self.can_manage_users,
        }
    }

    pub fn capabilities(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|c| self.grants(*c))
            .collect()
    }

    fn flag_mut(&mut self, capability: Capability) -> &mut bool {
        match capability {
            Capability::CreateAsset => &mut self.can_create_asset,
            Capability::ReadAsset => &mut self.can_read_asset,
            Capability::UpdateAsset => &mut self.can_update_asset,
            Capability::DeleteAsset => &mut self.can_delete_asset,
            Capability::ManageUsers => &mut self.can_manage_users,
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.role_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_backend_role_info() {
        let role: Role = serde_json::from_value(json!({
            "id": 2,
            "role_name": "editor",
            "can_create_asset": true,
            "can_read_asset": true,
            "can_update_asset": true,
            "can_delete_asset": false,
            "can_manage_users": false
        }))
        .unwrap();

        assert!(role.grants(Capability::UpdateAsset));
        assert!(!role.grants(Capability::DeleteAsset));
        assert_eq!(
            role.capabilities(),
            vec![Capability::CreateAsset, Capability::ReadAsset, Capability::UpdateAsset]
        );
    }

    #[test]
    fn missing_flags_default_to_denied() {
        let role: Role = serde_json::from_value(json!({"id": 9, "role_name": "partial"})).unwrap();
        assert!(role.capabilities().is_empty());
    }

    #[test]
    fn builder_sets_single_flag() {
        let role = Role::named(RoleId::new(1), "admin").with(Capability::ManageUsers, true);
        assert!(role.grants(Capability::ManageUsers));
        assert!(!role.grants(Capability::ReadAsset));
    }
}
