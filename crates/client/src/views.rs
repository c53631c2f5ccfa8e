//! Headless view models for the asset and user screens.
//!
//! These hold exactly what a page renders: which gated controls exist, the
//! rows, and the last error message. A renderer (terminal, web, anything)
//! only has to draw them.

use serde::Serialize;

use itam_auth::{
    Affordance, Capability, Gated, NewUser, PageAccess, Role, Route, UserAccount, UserPatch,
};
use itam_core::{Asset, AssetDraft, AssetFilter, AssetId, DomainError, RoleId, UserId};

use crate::error::ClientResult;
use crate::gate::AccessGate;
use crate::services::{AssetService, UserAdminService};

// ─────────────────────────────────────────────────────────────────────────────
// Asset list
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetRow {
    pub asset: Asset,
    /// Row actions the current role may use (edit, delete).
    pub actions: Vec<Affordance>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetListView {
    pub access: PageAccess,
    pub can_create: bool,
    pub rows: Vec<AssetRow>,
}

impl AssetListView {
    /// Fetch and decorate the list. Nothing is requested unless the page is
    /// ready for the current identity.
    pub async fn load(
        gate: &AccessGate,
        assets: &AssetService,
        filter: &AssetFilter,
    ) -> ClientResult<Self> {
        let access = gate.page(&Route::Assets);
        if access != PageAccess::Ready {
            return Ok(Self {
                access,
                can_create: false,
                rows: Vec::new(),
            });
        }
        let listed = assets.list(filter).await?;
        Ok(Self::build(gate, listed))
    }

    pub fn build(gate: &AccessGate, assets: Vec<Asset>) -> Self {
        let actions = gate.visible(Affordance::ROW_ACTIONS);
        Self {
            access: gate.page(&Route::Assets),
            can_create: gate.is_visible(&Affordance::CreateAsset),
            rows: assets
                .into_iter()
                .map(|asset| AssetRow {
                    asset,
                    actions: actions.clone(),
                })
                .collect(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Asset form
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(AssetId),
}

impl Gated for FormMode {
    fn required_capability(&self) -> Capability {
        match self {
            FormMode::Create => Capability::CreateAsset,
            FormMode::Edit(_) => Capability::UpdateAsset,
        }
    }
}

/// Create/edit form. On a failed save the entered values stay in place and
/// `error` carries the message to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetForm {
    pub mode: FormMode,
    pub values: AssetDraft,
    pub error: Option<String>,
}

impl AssetForm {
    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            values: AssetDraft::default(),
            error: None,
        }
    }

    /// Prefill from the stored record.
    pub async fn edit(assets: &AssetService, id: AssetId) -> ClientResult<Self> {
        let asset = assets.get(id).await?;
        Ok(Self {
            mode: FormMode::Edit(id),
            values: AssetDraft::try_from(&asset)?,
            error: None,
        })
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "New asset",
            FormMode::Edit(_) => "Edit asset",
        }
    }

    pub fn route(&self) -> Route {
        match self.mode {
            FormMode::Create => Route::NewAsset,
            FormMode::Edit(id) => Route::EditAsset(id),
        }
    }

    pub async fn submit(&mut self, assets: &AssetService) -> ClientResult<Asset> {
        self.error = None;
        let values = self.values.clone();
        let result = match self.mode {
            FormMode::Create => assets.create(values).await,
            FormMode::Edit(id) => assets.replace(id, values).await,
        };
        if let Err(err) = &result {
            self.error = Some(err.user_message());
        }
        result
    }
}

impl Gated for AssetForm {
    fn required_capability(&self) -> Capability {
        self.mode.required_capability()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// User administration
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAdminView {
    pub access: PageAccess,
    pub users: Vec<UserAccount>,
    pub roles: Vec<Role>,
}

impl UserAdminView {
    /// Without `can_manage_users` this returns the denied state and never
    /// calls the backend.
    pub async fn load(gate: &AccessGate, users: &UserAdminService) -> ClientResult<Self> {
        let access = gate.page(&Route::Users);
        if access != PageAccess::Ready {
            return Ok(Self {
                access,
                users: Vec::new(),
                roles: Vec::new(),
            });
        }
        let (accounts, roles) = tokio::try_join!(users.list_users(), users.list_roles())?;
        Ok(Self {
            access,
            users: accounts,
            roles,
        })
    }

    /// Role preselected on the create form.
    pub fn default_role(&self) -> Option<RoleId> {
        self.roles.first().map(|role| role.id)
    }

    pub fn role_name(&self, id: RoleId) -> Option<&str> {
        self.roles
            .iter()
            .find(|role| role.id == id)
            .map(|role| role.role_name.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserForm {
    pub editing: Option<UserId>,
    pub username: String,
    pub display_name: String,
    pub dept: String,
    pub role_id: Option<RoleId>,
    /// Left empty on edit to keep the current password.
    pub password: String,
    pub error: Option<String>,
}

impl UserForm {
    pub fn create(view: &UserAdminView) -> Self {
        Self {
            role_id: view.default_role(),
            ..Self::default()
        }
    }

    pub fn edit(target: &UserAccount) -> Self {
        Self {
            editing: Some(target.id),
            username: target.username.clone(),
            display_name: target.display_name.clone().unwrap_or_default(),
            dept: target.dept.clone().unwrap_or_default(),
            role_id: Some(target.role.id),
            password: String::new(),
            error: None,
        }
    }

    pub fn to_new_user(&self) -> ClientResult<NewUser> {
        let role_id = self
            .role_id
            .ok_or_else(|| DomainError::validation("a role must be selected"))?;
        Ok(NewUser {
            username: self.username.trim().to_string(),
            display_name: optional(&self.display_name),
            dept: optional(&self.dept),
            role_id,
            password: self.password.clone(),
        })
    }

    /// Display name and department are always sent so they can be cleared;
    /// the password only when one was typed.
    pub fn to_patch(&self) -> UserPatch {
        UserPatch {
            display_name: Some(self.display_name.trim().to_string()),
            dept: Some(self.dept.trim().to_string()),
            role_id: self.role_id,
            is_active: None,
            password: (!self.password.is_empty()).then(|| self.password.clone()),
        }
    }

    pub async fn submit(&mut self, users: &UserAdminService) -> ClientResult<UserAccount> {
        self.error = None;
        let result = match self.editing {
            None => match self.to_new_user() {
                Ok(user) => users.create_user(user).await,
                Err(err) => Err(err),
            },
            Some(id) => users.update_user(id, self.to_patch()).await,
        };
        match &result {
            Ok(_) => self.password.clear(),
            Err(err) => self.error = Some(err.user_message()),
        }
        result
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl From<&UserAdminView> for UserForm {
    fn from(view: &UserAdminView) -> Self {
        Self::create(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::session::SessionStore;
    use crate::storage::MemoryTokenStore;
    use crate::testing::FakeBackend;
    use itam_core::AssetCategory;

    struct Screen {
        backend: Arc<FakeBackend>,
        session: Arc<SessionStore>,
        gate: AccessGate,
        assets: AssetService,
        users: UserAdminService,
    }

    async fn screen(username: &str, password: &str) -> Screen {
        let backend = Arc::new(FakeBackend::new());
        let storage = Arc::new(MemoryTokenStore::new());
        let session = Arc::new(SessionStore::new(backend.clone(), storage));
        session.login(username, password).await.unwrap();
        Screen {
            gate: session.gate(),
            assets: AssetService::new(session.clone()),
            users: UserAdminService::new(session.clone()),
            backend,
            session,
        }
    }

    #[tokio::test]
    async fn viewer_list_has_no_actions() {
        let s = screen("alice", "pw").await;
        s.backend.seed_asset(AssetDraft::new("PC-1"));

        let view = AssetListView::load(&s.gate, &s.assets, &AssetFilter::default())
            .await
            .unwrap();
        assert_eq!(view.access, PageAccess::Ready);
        assert!(!view.can_create);
        assert_eq!(view.rows.len(), 1);
        assert!(view.rows[0].actions.is_empty());
    }

    #[tokio::test]
    async fn admin_list_has_every_action() {
        let s = screen("root", "rootpw").await;
        s.backend.seed_asset(AssetDraft::new("PC-1"));

        let view = AssetListView::load(&s.gate, &s.assets, &AssetFilter::default())
            .await
            .unwrap();
        assert!(view.can_create);
        assert_eq!(view.rows[0].actions, Affordance::ROW_ACTIONS.to_vec());
    }

    #[tokio::test]
    async fn signed_out_list_is_not_fetched() {
        let s = screen("alice", "pw").await;
        s.session.logout();
        let before = s.backend.seen_tokens().len();

        let view = AssetListView::load(&s.gate, &s.assets, &AssetFilter::default())
            .await
            .unwrap();
        assert_eq!(view.access, PageAccess::Denied(Capability::ReadAsset));
        assert_eq!(s.backend.seen_tokens().len(), before);
    }

    #[tokio::test]
    async fn failed_save_keeps_entered_values() {
        let s = screen("erin", "editpw").await;
        s.backend.seed_asset(AssetDraft::new("SRV-1"));

        let mut form = AssetForm::create();
        form.values.asset_code = "SRV-1".into();
        form.values.category = AssetCategory::Server;
        form.values.location = Some("DC-2".into());

        let before = form.values.clone();
        assert!(form.submit(&s.assets).await.is_err());
        assert_eq!(form.error.as_deref(), Some("asset code already exists"));
        assert_eq!(form.values, before);

        form.values.asset_code = "SRV-2".into();
        let saved = form.submit(&s.assets).await.unwrap();
        assert_eq!(saved.category, "server");
        assert_eq!(form.error, None);
    }

    #[tokio::test]
    async fn edit_form_prefills_and_replaces() {
        let s = screen("erin", "editpw").await;
        let mut draft = AssetDraft::new("RT-1");
        draft.note = Some("core router".into());
        let seeded = s.backend.seed_asset(draft);

        let mut form = AssetForm::edit(&s.assets, seeded.id).await.unwrap();
        assert_eq!(form.title(), "Edit asset");
        assert_eq!(form.route(), Route::EditAsset(seeded.id));
        assert_eq!(form.values.note.as_deref(), Some("core router"));
        assert!(s.gate.is_visible(&form));

        form.values.note = Some("  ".into());
        let saved = form.submit(&s.assets).await.unwrap();
        assert_eq!(saved.note, None);
    }

    #[tokio::test]
    async fn users_page_is_denied_without_manage() {
        let s = screen("erin", "editpw").await;
        let view = UserAdminView::load(&s.gate, &s.users).await.unwrap();
        assert_eq!(view.access, PageAccess::Denied(Capability::ManageUsers));
        assert!(view.users.is_empty());
    }

    #[tokio::test]
    async fn user_form_defaults_to_first_role_and_omits_blank_password() {
        let s = screen("root", "rootpw").await;
        let view = UserAdminView::load(&s.gate, &s.users).await.unwrap();
        assert_eq!(view.access, PageAccess::Ready);

        let mut form = UserForm::from(&view);
        assert_eq!(form.role_id, view.default_role());
        assert_eq!(view.role_name(form.role_id.unwrap()), Some("admin"));
        form.username = "dave".into();
        form.password = "secret1".into();
        let dave = form.submit(&s.users).await.unwrap();

        let mut edit = UserForm::edit(&dave);
        assert!(edit.password.is_empty());
        assert_eq!(edit.to_patch().password, None);
        edit.display_name = "Dave".into();
        let updated = edit.submit(&s.users).await.unwrap();
        assert_eq!(updated.display_name.as_deref(), Some("Dave"));

        // The untouched password still works.
        let again = SessionStore::new(s.backend.clone(), Arc::new(MemoryTokenStore::new()));
        assert!(again.login("dave", "secret1").await.is_ok());
    }

    #[tokio::test]
    async fn user_form_without_role_is_rejected() {
        let s = screen("root", "rootpw").await;
        let mut form = UserForm {
            username: "eve".into(),
            password: "secret1".into(),
            ..UserForm::default()
        };
        assert!(form.submit(&s.users).await.is_err());
        assert_eq!(form.error.as_deref(), Some("a role must be selected"));
    }
}
