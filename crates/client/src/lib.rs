//! `itam-client`
//!
//! **Responsibility:** client side of the asset inventory: who is signed
//! in, what they may see, and the REST calls behind each screen.
//!
//! This crate provides:
//! - [`SessionStore`]: credential + identity, persisted across restarts
//! - [`AccessGate`]: reactive route admission and affordance visibility
//! - [`HttpBackend`]: the REST endpoints consumed
//! - Session-aware CRUD services and headless view models
//!
//! The backend remains the authority for validation and authorization.

pub mod backend;
pub mod config;
pub mod error;
pub mod gate;
pub mod http;
pub mod services;
pub mod session;
pub mod storage;
pub mod views;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{ApiError, ApiResult, Backend, LoginResponse, TokenGrant};
pub use config::{ClientConfig, ConfigError};
pub use error::{ClientError, ClientResult};
pub use gate::{AccessGate, Destination};
pub use http::HttpBackend;
pub use services::{AssetService, UserAdminService};
pub use session::SessionStore;
pub use storage::{FileTokenStore, MemoryTokenStore, StorageError, TokenStore};
