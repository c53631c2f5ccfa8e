//! `itam-core`: asset inventory domain building blocks.
//!
//! This crate contains **pure domain** data (no transport, no storage).

pub mod asset;
pub mod error;
pub mod id;

pub use asset::{Asset, AssetCategory, AssetDraft, AssetFilter, AssetPatch, AssetStatus};
pub use error::{DomainError, DomainResult};
pub use id::{AssetId, RoleId, UserId};
