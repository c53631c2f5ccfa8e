//! reqwest-backed [`Backend`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;

use itam_auth::{Credential, Identity, NewUser, Role, UserAccount, UserPatch};
use itam_core::{Asset, AssetDraft, AssetFilter, AssetId, AssetPatch, UserId};

use crate::backend::{ApiError, ApiResult, Backend, LoginResponse};
use crate::config::ClientConfig;

/// HTTP client for the inventory API. Cheap to clone.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    http: Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {e}")))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { base_url, http })
    }

    pub fn from_config(config: &ClientConfig) -> ApiResult<Self> {
        Self::new(config.api_url.clone(), config.request_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        credential: Option<&Credential>,
    ) -> RequestBuilder {
        tracing::debug!(%method, path, "backend request");
        let req = self.http.request(method, format!("{}{}", self.base_url, path));
        match credential {
            Some(credential) => req.bearer_auth(credential.as_str()),
            None => req,
        }
    }

    async fn execute(&self, req: RequestBuilder) -> ApiResult<reqwest::Response> {
        let resp = req.send().await.map_err(|e| ApiError::Network(e.to_string()))?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), "backend rejected request");
        Err(ApiError::from_status(status.as_u16(), &body))
    }

    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> ApiResult<T> {
        self.execute(req)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn login(&self, username: &str, password: &str) -> ApiResult<LoginResponse> {
        let req = self
            .request(Method::POST, "/api/login", None)
            .json(&json!({ "username": username, "password": password }));
        self.send_json(req).await
    }

    async fn me(&self, credential: &Credential) -> ApiResult<Identity> {
        self.send_json(self.request(Method::GET, "/api/me", Some(credential)))
            .await
    }

    async fn list_assets(
        &self,
        credential: &Credential,
        filter: &AssetFilter,
    ) -> ApiResult<Vec<Asset>> {
        let req = self
            .request(Method::GET, "/api/assets", Some(credential))
            .query(&filter.query_pairs());
        self.send_json(req).await
    }

    async fn get_asset(&self, credential: &Credential, id: AssetId) -> ApiResult<Asset> {
        let path = format!("/api/assets/{id}");
        self.send_json(self.request(Method::GET, &path, Some(credential)))
            .await
    }

    async fn create_asset(&self, credential: &Credential, draft: &AssetDraft) -> ApiResult<Asset> {
        let req = self
            .request(Method::POST, "/api/assets", Some(credential))
            .json(draft);
        self.send_json(req).await
    }

    async fn update_asset(
        &self,
        credential: &Credential,
        id: AssetId,
        patch: &AssetPatch,
    ) -> ApiResult<Asset> {
        let path = format!("/api/assets/{id}");
        let req = self.request(Method::PUT, &path, Some(credential)).json(patch);
        self.send_json(req).await
    }

    async fn replace_asset(
        &self,
        credential: &Credential,
        id: AssetId,
        draft: &AssetDraft,
    ) -> ApiResult<Asset> {
        let path = format!("/api/assets/{id}");
        let req = self.request(Method::PUT, &path, Some(credential)).json(draft);
        self.send_json(req).await
    }

    async fn delete_asset(&self, credential: &Credential, id: AssetId) -> ApiResult<()> {
        let path = format!("/api/assets/{id}");
        self.execute(self.request(Method::DELETE, &path, Some(credential)))
            .await
            .map(|_| ())
    }

    async fn list_users(&self, credential: &Credential) -> ApiResult<Vec<UserAccount>> {
        self.send_json(self.request(Method::GET, "/api/users", Some(credential)))
            .await
    }

    async fn list_roles(&self, credential: &Credential) -> ApiResult<Vec<Role>> {
        self.send_json(self.request(Method::GET, "/api/users/roles", Some(credential)))
            .await
    }

    async fn create_user(&self, credential: &Credential, user: &NewUser) -> ApiResult<UserAccount> {
        let req = self
            .request(Method::POST, "/api/users", Some(credential))
            .json(user);
        self.send_json(req).await
    }

    async fn update_user(
        &self,
        credential: &Credential,
        id: UserId,
        patch: &UserPatch,
    ) -> ApiResult<UserAccount> {
        let path = format!("/api/users/{id}");
        let req = self.request(Method::PUT, &path, Some(credential)).json(patch);
        self.send_json(req).await
    }
}
