//! Session-aware CRUD services.
//!
//! Each call picks up the credential current at send time through
//! [`SessionStore::authorized`]. Payloads are checked locally before they go
//! out, but the backend stays the authority on validation and permissions.

use std::sync::Arc;

use itam_auth::{NewUser, Role, UserAccount, UserPatch};
use itam_core::{Asset, AssetDraft, AssetFilter, AssetId, AssetPatch, UserId};

use crate::error::ClientResult;
use crate::session::SessionStore;

#[derive(Debug, Clone)]
pub struct AssetService {
    session: Arc<SessionStore>,
}

impl AssetService {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }

    pub async fn list(&self, filter: &AssetFilter) -> ClientResult<Vec<Asset>> {
        let backend = self.session.backend();
        self.session
            .authorized(|c| async move { backend.list_assets(&c, filter).await })
            .await
    }

    pub async fn get(&self, id: AssetId) -> ClientResult<Asset> {
        let backend = self.session.backend();
        self.session
            .authorized(|c| async move { backend.get_asset(&c, id).await })
            .await
    }

    pub async fn create(&self, draft: AssetDraft) -> ClientResult<Asset> {
        let draft = draft.normalized();
        draft.validate()?;
        let backend = self.session.backend();
        let asset = self
            .session
            .authorized(|c| async move { backend.create_asset(&c, &draft).await })
            .await?;
        tracing::info!(asset_id = %asset.id, asset_code = %asset.asset_code, "asset created");
        Ok(asset)
    }

    /// Overwrite every field of an asset (edit form save).
    pub async fn replace(&self, id: AssetId, draft: AssetDraft) -> ClientResult<Asset> {
        let draft = draft.normalized();
        draft.validate()?;
        let backend = self.session.backend();
        let asset = self
            .session
            .authorized(|c| async move { backend.replace_asset(&c, id, &draft).await })
            .await?;
        tracing::info!(asset_id = %id, "asset replaced");
        Ok(asset)
    }

    /// Change only the fields set in `patch`.
    pub async fn update(&self, id: AssetId, patch: &AssetPatch) -> ClientResult<Asset> {
        patch.validate()?;
        let backend = self.session.backend();
        let asset = self
            .session
            .authorized(|c| async move { backend.update_asset(&c, id, patch).await })
            .await?;
        tracing::info!(asset_id = %id, "asset updated");
        Ok(asset)
    }

    pub async fn delete(&self, id: AssetId) -> ClientResult<()> {
        let backend = self.session.backend();
        self.session
            .authorized(|c| async move { backend.delete_asset(&c, id).await })
            .await?;
        tracing::info!(asset_id = %id, "asset deleted");
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct UserAdminService {
    session: Arc<SessionStore>,
}

impl UserAdminService {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }

    pub async fn list_users(&self) -> ClientResult<Vec<UserAccount>> {
        let backend = self.session.backend();
        self.session
            .authorized(|c| async move { backend.list_users(&c).await })
            .await
    }

    pub async fn list_roles(&self) -> ClientResult<Vec<Role>> {
        let backend = self.session.backend();
        self.session
            .authorized(|c| async move { backend.list_roles(&c).await })
            .await
    }

    pub async fn create_user(&self, user: NewUser) -> ClientResult<UserAccount> {
        user.validate()?;
        let backend = self.session.backend();
        let account = self
            .session
            .authorized(|c| async move { backend.create_user(&c, &user).await })
            .await?;
        tracing::info!(user_id = %account.id, username = %account.username, "user created");
        Ok(account)
    }

    pub async fn update_user(&self, id: UserId, patch: UserPatch) -> ClientResult<UserAccount> {
        patch.validate()?;
        let backend = self.session.backend();
        let account = self
            .session
            .authorized(|c| async move { backend.update_user(&c, id, &patch).await })
            .await?;
        tracing::info!(user_id = %id, "user updated");
        Ok(account)
    }

    /// Flip the active flag of `target`.
    pub async fn toggle_active(&self, target: &UserAccount) -> ClientResult<UserAccount> {
        self.update_user(target.id, UserPatch::toggle_active(target)).await
    }
}
