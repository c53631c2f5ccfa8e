//! Contract with the REST backend.
//!
//! | Method | Path | Auth |
//! |---|---|---|
//! | POST | `/api/login` | none |
//! | GET | `/api/me` | bearer |
//! | GET/POST | `/api/assets` | bearer |
//! | GET/PUT/DELETE | `/api/assets/{id}` | bearer |
//! | GET/POST | `/api/users` | bearer |
//! | GET | `/api/users/roles` | bearer |
//! | PUT | `/api/users/{id}` | bearer |

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use itam_auth::{Credential, Identity, NewUser, Role, UserAccount, UserPatch};
use itam_core::{Asset, AssetDraft, AssetFilter, AssetId, AssetPatch, UserId};

pub type ApiResult<T> = Result<T, ApiError>;

/// Transport-level failure of one backend call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("unauthorized")]
    Unauthorized { detail: Option<String> },

    #[error("forbidden")]
    Forbidden { detail: Option<String> },

    #[error("not found")]
    NotFound { detail: Option<String> },

    #[error("backend rejected request ({status})")]
    Rejected { status: u16, detail: Option<String> },

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Classify a non-success response. Only the backend's `detail` message is
    /// kept; raw bodies are never carried upward.
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = extract_detail(body);
        match status {
            401 => ApiError::Unauthorized { detail },
            403 => ApiError::Forbidden { detail },
            404 => ApiError::NotFound { detail },
            _ => ApiError::Rejected { status, detail },
        }
    }

    /// Human-readable message supplied by the backend, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { detail }
            | ApiError::Forbidden { detail }
            | ApiError::NotFound { detail }
            | ApiError::Rejected { detail, .. } => detail.as_deref(),
            ApiError::Network(_) | ApiError::InvalidResponse(_) => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}

/// Pull the message out of `{"detail": "..."}` or a validation error list
/// (`{"detail": [{"msg": "..."}, ...]}`).
pub fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let detail = value.get("detail").or_else(|| value.get("message"))?;
    let message = match detail {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items
            .iter()
            .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
            .collect::<Vec<_>>()
            .join("; "),
        _ => return None,
    };
    let message = message.trim().to_string();
    (!message.is_empty()).then_some(message)
}

/// Token part of the login response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// `POST /api/login` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: TokenGrant,
    pub user: Identity,
}

/// The REST backend as seen by the client.
///
/// Every method except [`Backend::login`] takes the credential to attach, so
/// a request can only carry a token the caller explicitly read from the
/// session at send time.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> ApiResult<LoginResponse>;

    async fn me(&self, credential: &Credential) -> ApiResult<Identity>;

    async fn list_assets(
        &self,
        credential: &Credential,
        filter: &AssetFilter,
    ) -> ApiResult<Vec<Asset>>;

    async fn get_asset(&self, credential: &Credential, id: AssetId) -> ApiResult<Asset>;

    async fn create_asset(&self, credential: &Credential, draft: &AssetDraft) -> ApiResult<Asset>;

    async fn update_asset(
        &self,
        credential: &Credential,
        id: AssetId,
        patch: &AssetPatch,
    ) -> ApiResult<Asset>;

    /// Whole-record edit (the edit form submits every field).
    async fn replace_asset(
        &self,
        credential: &Credential,
        id: AssetId,
        draft: &AssetDraft,
    ) -> ApiResult<Asset>;

    async fn delete_asset(&self, credential: &Credential, id: AssetId) -> ApiResult<()>;

    async fn list_users(&self, credential: &Credential) -> ApiResult<Vec<UserAccount>>;

    async fn list_roles(&self, credential: &Credential) -> ApiResult<Vec<Role>>;

    async fn create_user(&self, credential: &Credential, user: &NewUser) -> ApiResult<UserAccount>;

    async fn update_user(
        &self,
        credential: &Credential,
        id: UserId,
        patch: &UserPatch,
    ) -> ApiResult<UserAccount>;
}
