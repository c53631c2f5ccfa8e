//! In-memory backend used by unit tests.
//!
//! Behaves like the real API for the parts the client relies on: bearer
//! tokens map to accounts, role flags are enforced server-side, and profile or
//! login calls can be held mid-flight to exercise races.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use itam_auth::{Capability, Credential, Identity, NewUser, Role, UserAccount, UserPatch};
use itam_core::{Asset, AssetDraft, AssetFilter, AssetId, AssetPatch, RoleId, UserId};

use crate::backend::{ApiError, ApiResult, Backend, LoginResponse, TokenGrant};

/// Pauses the next call after it reached the backend until released.
#[derive(Clone, Default)]
pub(crate) struct Hold {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

impl Hold {
    async fn pass(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }
}

#[derive(Default)]
struct Db {
    accounts: Vec<(String, Identity)>,
    roles: Vec<Role>,
    tokens: HashMap<String, UserId>,
    next_token: u64,
    assets: Vec<Asset>,
    next_asset: i64,
    offline: bool,
    seen: Vec<String>,
}

#[derive(Default)]
pub(crate) struct FakeBackend {
    db: Mutex<Db>,
    profile_hold: Mutex<Option<Hold>>,
    login_hold: Mutex<Option<Hold>>,
}

pub(crate) fn viewer_role() -> Role {
    Role::named(RoleId::new(3), "viewer").with(Capability::ReadAsset, true)
}

pub(crate) fn editor_role() -> Role {
    Role::named(RoleId::new(2), "editor")
        .with(Capability::CreateAsset, true)
        .with(Capability::ReadAsset, true)
        .with(Capability::UpdateAsset, true)
}

pub(crate) fn admin_role() -> Role {
    Capability::ALL
        .into_iter()
        .fold(Role::named(RoleId::new(1), "admin"), |role, cap| role.with(cap, true))
}

fn forbidden() -> ApiError {
    ApiError::Forbidden {
        detail: Some("permission denied".into()),
    }
}

impl FakeBackend {
    /// Accounts: `alice`/`pw` (viewer), `erin`/`editpw` (editor),
    /// `root`/`rootpw` (admin).
    pub fn new() -> Self {
        let backend = Self::default();
        {
            let mut db = backend.db.lock().unwrap();
            db.roles = vec![admin_role(), editor_role(), viewer_role()];
            db.next_asset = 1;
        }
        backend.add_account("root", "rootpw", admin_role());
        backend.add_account("erin", "editpw", editor_role());
        backend.add_account("alice", "pw", viewer_role());
        backend
    }

    pub fn add_account(&self, username: &str, password: &str, role: Role) -> Identity {
        let mut db = self.db.lock().unwrap();
        let identity = Identity {
            id: UserId::new(db.accounts.len() as i64 + 1),
            username: username.to_string(),
            display_name: None,
            dept: None,
            is_active: true,
            role,
            created_at: None,
            updated_at: None,
        };
        db.accounts.retain(|(_, i)| i.username != username);
        db.accounts.push((password.to_string(), identity.clone()));
        identity
    }

    /// Issue a token without going through login (a "persisted" credential).
    pub fn issue_token(&self, username: &str) -> Credential {
        let mut db = self.db.lock().unwrap();
        let id = db
            .accounts
            .iter()
            .find(|(_, i)| i.username == username)
            .map(|(_, i)| i.id)
            .expect("unknown fixture account");
        Self::mint(&mut db, id)
    }

    fn mint(db: &mut Db, id: UserId) -> Credential {
        db.next_token += 1;
        let token = format!("tok-{}-{}", id, db.next_token);
        db.tokens.insert(token.clone(), id);
        Credential::new(token).unwrap()
    }

    /// Invalidate every issued token (server-side expiry).
    pub fn revoke_all(&self) {
        self.db.lock().unwrap().tokens.clear();
    }

    pub fn set_offline(&self, offline: bool) {
        self.db.lock().unwrap().offline = offline;
    }

    pub fn hold_profile(&self) -> Hold {
        let hold = Hold::default();
        *self.profile_hold.lock().unwrap() = Some(hold.clone());
        hold
    }

    pub fn hold_login(&self) -> Hold {
        let hold = Hold::default();
        *self.login_hold.lock().unwrap() = Some(hold.clone());
        hold
    }

    /// Tokens attached to authenticated calls, in order.
    pub fn seen_tokens(&self) -> Vec<String> {
        self.db.lock().unwrap().seen.clone()
    }

    pub fn seed_asset(&self, draft: AssetDraft) -> Asset {
        let mut db = self.db.lock().unwrap();
        Self::insert_asset(&mut db, &draft)
    }

    fn insert_asset(db: &mut Db, draft: &AssetDraft) -> Asset {
        let asset = Asset {
            id: AssetId::new(db.next_asset),
            asset_code: draft.asset_code.clone(),
            category: draft.category.as_str().to_string(),
            brand: draft.brand.clone(),
            model: draft.model.clone(),
            serial_number: draft.serial_number.clone(),
            location: draft.location.clone(),
            owner_dept: draft.owner_dept.clone(),
            ip_address: draft.ip_address.clone(),
            mac_address: draft.mac_address.clone(),
            os_or_firmware: draft.os_or_firmware.clone(),
            status: draft.status.as_str().to_string(),
            note: draft.note.clone(),
            created_at: None,
            updated_at: None,
        };
        db.next_asset += 1;
        db.assets.push(asset.clone());
        asset
    }

    fn authenticate(
        &self,
        credential: &Credential,
        required: Option<Capability>,
    ) -> ApiResult<Identity> {
        let mut db = self.db.lock().unwrap();
        if db.offline {
            return Err(ApiError::Network("connection refused".into()));
        }
        db.seen.push(credential.as_str().to_string());
        let id = db.tokens.get(credential.as_str()).copied().ok_or(ApiError::Unauthorized {
            detail: Some("invalid or expired token".into()),
        })?;
        let identity = db
            .accounts
            .iter()
            .map(|(_, i)| i)
            .find(|i| i.id == id && i.is_active)
            .cloned()
            .ok_or(ApiError::Unauthorized { detail: None })?;
        match required {
            Some(cap) if !identity.can(cap) => Err(forbidden()),
            _ => Ok(identity),
        }
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn login(&self, username: &str, password: &str) -> ApiResult<LoginResponse> {
        let hold = self.login_hold.lock().unwrap().take();
        if let Some(hold) = hold {
            hold.pass().await;
        }
        let mut db = self.db.lock().unwrap();
        if db.offline {
            return Err(ApiError::Network("connection refused".into()));
        }
        let identity = db
            .accounts
            .iter()
            .find(|(pw, i)| i.username == username && pw == password && i.is_active)
            .map(|(_, i)| i.clone())
            .ok_or(ApiError::Unauthorized {
                detail: Some("invalid username or password".into()),
            })?;
        let credential = Self::mint(&mut db, identity.id);
        Ok(LoginResponse {
            token: TokenGrant {
                access_token: credential.as_str().to_string(),
                token_type: "bearer".into(),
            },
            user: identity,
        })
    }

    async fn me(&self, credential: &Credential) -> ApiResult<Identity> {
        let hold = self.profile_hold.lock().unwrap().take();
        if let Some(hold) = hold {
            hold.pass().await;
        }
        self.authenticate(credential, None)
    }

    async fn list_assets(
        &self,
        credential: &Credential,
        filter: &AssetFilter,
    ) -> ApiResult<Vec<Asset>> {
        self.authenticate(credential, Some(Capability::ReadAsset))?;
        let db = self.db.lock().unwrap();
        Ok(db
            .assets
            .iter()
            .filter(|a| {
                filter.query_pairs().iter().all(|(key, value)| match *key {
                    "asset_code" => a.asset_code.contains(value.as_str()),
                    "ip_address" => a
                        .ip_address
                        .as_deref()
                        .is_some_and(|ip| ip.contains(value.as_str())),
                    "category" => a.category == *value,
                    "status" => a.status == *value,
                    _ => true,
                })
            })
            .cloned()
            .collect())
    }

    async fn get_asset(&self, credential: &Credential, id: AssetId) -> ApiResult<Asset> {
        self.authenticate(credential, Some(Capability::ReadAsset))?;
        let db = self.db.lock().unwrap();
        db.assets
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or(ApiError::NotFound {
                detail: Some("asset not found".into()),
            })
    }

    async fn create_asset(&self, credential: &Credential, draft: &AssetDraft) -> ApiResult<Asset> {
        self.authenticate(credential, Some(Capability::CreateAsset))?;
        let mut db = self.db.lock().unwrap();
        if db.assets.iter().any(|a| a.asset_code == draft.asset_code) {
            return Err(ApiError::Rejected {
                status: 400,
                detail: Some("asset code already exists".into()),
            });
        }
        Ok(Self::insert_asset(&mut db, draft))
    }

    async fn update_asset(
        &self,
        credential: &Credential,
        id: AssetId,
        patch: &AssetPatch,
    ) -> ApiResult<Asset> {
        self.authenticate(credential, Some(Capability::UpdateAsset))?;
        let mut db = self.db.lock().unwrap();
        let asset = db
            .assets
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(ApiError::NotFound { detail: None })?;
        if let Some(code) = &patch.asset_code {
            asset.asset_code = code.clone();
        }
        if let Some(status) = patch.status {
            asset.status = status.as_str().to_string();
        }
        if let Some(location) = &patch.location {
            asset.location = Some(location.clone());
        }
        Ok(asset.clone())
    }

    async fn replace_asset(
        &self,
        credential: &Credential,
        id: AssetId,
        draft: &AssetDraft,
    ) -> ApiResult<Asset> {
        self.authenticate(credential, Some(Capability::UpdateAsset))?;
        let mut db = self.db.lock().unwrap();
        let asset = db
            .assets
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(ApiError::NotFound { detail: None })?;
        asset.asset_code = draft.asset_code.clone();
        asset.category = draft.category.as_str().to_string();
        asset.status = draft.status.as_str().to_string();
        asset.brand = draft.brand.clone();
        asset.location = draft.location.clone();
        asset.note = draft.note.clone();
        Ok(asset.clone())
    }

    async fn delete_asset(&self, credential: &Credential, id: AssetId) -> ApiResult<()> {
        self.authenticate(credential, Some(Capability::DeleteAsset))?;
        let mut db = self.db.lock().unwrap();
        let before = db.assets.len();
        db.assets.retain(|a| a.id != id);
        if db.assets.len() == before {
            return Err(ApiError::NotFound { detail: None });
        }
        Ok(())
    }

    async fn list_users(&self, credential: &Credential) -> ApiResult<Vec<UserAccount>> {
        self.authenticate(credential, Some(Capability::ManageUsers))?;
        let db = self.db.lock().unwrap();
        Ok(db.accounts.iter().map(|(_, i)| i.clone()).collect())
    }

    async fn list_roles(&self, credential: &Credential) -> ApiResult<Vec<Role>> {
        self.authenticate(credential, Some(Capability::ManageUsers))?;
        Ok(self.db.lock().unwrap().roles.clone())
    }

    async fn create_user(&self, credential: &Credential, user: &NewUser) -> ApiResult<UserAccount> {
        self.authenticate(credential, Some(Capability::ManageUsers))?;
        let role = {
            let db = self.db.lock().unwrap();
            if db.accounts.iter().any(|(_, i)| i.username == user.username) {
                return Err(ApiError::Rejected {
                    status: 400,
                    detail: Some("username already exists".into()),
                });
            }
            db.roles.iter().find(|r| r.id == user.role_id).cloned().ok_or(ApiError::Rejected {
                status: 400,
                detail: Some("role does not exist".into()),
            })?
        };
        let mut identity = self.add_account(&user.username, &user.password, role);
        identity.display_name = user.display_name.clone();
        identity.dept = user.dept.clone();
        Ok(identity)
    }

    async fn update_user(
        &self,
        credential: &Credential,
        id: UserId,
        patch: &UserPatch,
    ) -> ApiResult<UserAccount> {
        self.authenticate(credential, Some(Capability::ManageUsers))?;
        let mut db = self.db.lock().unwrap();
        let roles = db.roles.clone();
        let (password, identity) = db
            .accounts
            .iter_mut()
            .find(|(_, i)| i.id == id)
            .ok_or(ApiError::NotFound { detail: None })?;
        if let Some(name) = &patch.display_name {
            identity.display_name = Some(name.clone());
        }
        if let Some(dept) = &patch.dept {
            identity.dept = Some(dept.clone());
        }
        if let Some(active) = patch.is_active {
            identity.is_active = active;
        }
        if let Some(role_id) = patch.role_id {
            identity.role = roles.into_iter().find(|r| r.id == role_id).ok_or(ApiError::Rejected {
                status: 400,
                detail: Some("role does not exist".into()),
            })?;
        }
        if let Some(new_password) = &patch.password {
            *password = new_password.clone();
        }
        Ok(identity.clone())
    }
}
