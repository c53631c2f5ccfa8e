use serde::{Deserialize, Serialize};

/// One of the fixed boolean capability flags carried by a [`crate::Role`].
///
/// The wire name matches the backend's role column (e.g. `can_read_asset`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    #[serde(rename = "can_create_asset")]
    CreateAsset,
    #[serde(rename = "can_read_asset")]
    ReadAsset,
    #[serde(rename = "can_update_asset")]
    UpdateAsset,
    #[serde(rename = "can_delete_asset")]
    DeleteAsset,
    #[serde(rename = "can_manage_users")]
    ManageUsers,
}

impl Capability {
    pub const ALL: [Capability; 5] = [
        Capability::CreateAsset,
        Capability::ReadAsset,
        Capability::UpdateAsset,
        Capability::DeleteAsset,
        Capability::ManageUsers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::CreateAsset => "can_create_asset",
            Capability::ReadAsset => "can_read_asset",
            Capability::UpdateAsset => "can_update_asset",
            Capability::DeleteAsset => "can_delete_asset",
            Capability::ManageUsers => "can_manage_users",
        }
    }
}

impl core::fmt::Display for Capability {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
