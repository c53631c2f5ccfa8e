//! Hardware asset records (PCs, servers, network gear) and their form payloads.

use core::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{AssetId, DomainError, DomainResult};

/// Asset category vocabulary understood by the backend.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetCategory {
    #[default]
    Pc,
    Server,
    Switch,
    Router,
    Firewall,
    Ap,
}

impl AssetCategory {
    pub const ALL: [AssetCategory; 6] = [
        AssetCategory::Pc,
        AssetCategory::Server,
        AssetCategory::Switch,
        AssetCategory::Router,
        AssetCategory::Firewall,
        AssetCategory::Ap,
    ];

    /// Wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetCategory::Pc => "pc",
            AssetCategory::Server => "server",
            AssetCategory::Switch => "switch",
            AssetCategory::Router => "router",
            AssetCategory::Firewall => "firewall",
            AssetCategory::Ap => "ap",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            AssetCategory::Pc => "Desktop PC",
            AssetCategory::Server => "Server",
            AssetCategory::Switch => "Switch",
            AssetCategory::Router => "Router",
            AssetCategory::Firewall => "Firewall",
            AssetCategory::Ap => "Wireless AP",
        }
    }
}

impl core::fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AssetCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| DomainError::unknown("asset category", s))
    }
}

/// Lifecycle status of an asset.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    #[default]
    InUse,
    Spare,
    Repair,
    Retired,
}

impl AssetStatus {
    pub const ALL: [AssetStatus; 4] = [
        AssetStatus::InUse,
        AssetStatus::Spare,
        AssetStatus::Repair,
        AssetStatus::Retired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::InUse => "in_use",
            AssetStatus::Spare => "spare",
            AssetStatus::Repair => "repair",
            AssetStatus::Retired => "retired",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AssetStatus::InUse => "In use",
            AssetStatus::Spare => "Spare",
            AssetStatus::Repair => "In repair",
            AssetStatus::Retired => "Retired",
        }
    }
}

impl core::fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AssetStatus::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| DomainError::unknown("asset status", s))
    }
}

/// Asset record as returned by the backend.
///
/// `category` and `status` are kept verbatim: the backend stores free strings,
/// so values outside the known vocabulary must still round-trip for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    pub asset_code: String,
    pub category: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub owner_dept: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub mac_address: Option<String>,
    #[serde(default)]
    pub os_or_firmware: Option<String>,
    pub status: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

impl Asset {
    pub fn category_kind(&self) -> Option<AssetCategory> {
        self.category.parse().ok()
    }

    pub fn status_kind(&self) -> Option<AssetStatus> {
        self.status.parse().ok()
    }

    /// Category label, or the raw wire value when it is not in the vocabulary.
    pub fn category_label(&self) -> &str {
        self.category_kind().map_or(self.category.as_str(), |c| c.label())
    }

    /// Status label, or the raw wire value when it is not in the vocabulary.
    pub fn status_label(&self) -> &str {
        self.status_kind().map_or(self.status.as_str(), |s| s.label())
    }

    /// "brand / model", or `None` when neither is set.
    pub fn make_and_model(&self) -> Option<String> {
        let parts: Vec<&str> = [self.brand.as_deref(), self.model.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(" / "))
    }
}

/// List filter. Blank fields are not sent.
///
/// The backend matches `asset_code`/`ip_address` as substrings and
/// `category`/`status` exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetFilter {
    #[serde(default)]
    pub asset_code: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub category: Option<AssetCategory>,
    #[serde(default)]
    pub status: Option<AssetStatus>,
}

impl AssetFilter {
    /// Query-string pairs in a stable order, skipping blank values.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(code) = non_blank(self.asset_code.as_deref()) {
            pairs.push(("asset_code", code.to_string()));
        }
        if let Some(ip) = non_blank(self.ip_address.as_deref()) {
            pairs.push(("ip_address", ip.to_string()));
        }
        if let Some(category) = self.category {
            pairs.push(("category", category.as_str().to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        pairs
    }
}

/// Full asset form payload, used for create and for whole-record edits.
///
/// Optional fields serialize as `null` so an edit can clear them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDraft {
    pub asset_code: String,
    pub category: AssetCategory,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub location: Option<String>,
    pub owner_dept: Option<String>,
    pub ip_address: Option<String>,
    pub mac_address: Option<String>,
    pub os_or_firmware: Option<String>,
    pub status: AssetStatus,
    pub note: Option<String>,
}

impl AssetDraft {
    pub fn new(asset_code: impl Into<String>) -> Self {
        Self {
            asset_code: asset_code.into(),
            ..Default::default()
        }
    }

    /// Trim text fields and turn blank optionals into `None`.
    pub fn normalized(mut self) -> Self {
        self.asset_code = self.asset_code.trim().to_string();
        for field in [
            &mut self.brand,
            &mut self.model,
            &mut self.serial_number,
            &mut self.location,
            &mut self.owner_dept,
            &mut self.ip_address,
            &mut self.mac_address,
            &mut self.os_or_firmware,
            &mut self.note,
        ] {
            *field = field.take().and_then(|v| non_blank(Some(v.as_str())).map(str::to_string));
        }
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.asset_code.trim().is_empty() {
            return Err(DomainError::validation("asset code is required"));
        }
        Ok(())
    }
}

impl TryFrom<&Asset> for AssetDraft {
    type Error = DomainError;

    fn try_from(asset: &Asset) -> Result<Self, Self::Error> {
        Ok(Self {
            asset_code: asset.asset_code.clone(),
            category: asset.category.parse()?,
            brand: asset.brand.clone(),
            model: asset.model.clone(),
            serial_number: asset.serial_number.clone(),
            location: asset.location.clone(),
            owner_dept: asset.owner_dept.clone(),
            ip_address: asset.ip_address.clone(),
            mac_address: asset.mac_address.clone(),
            os_or_firmware: asset.os_or_firmware.clone(),
            status: asset.status.parse()?,
            note: asset.note.clone(),
        })
    }
}

/// Partial update: only `Some` fields are sent, omitted fields stay unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<AssetCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_dept: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_or_firmware: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AssetStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl AssetPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.asset_code.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(DomainError::validation("asset code cannot be blank"));
        }
        Ok(())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
