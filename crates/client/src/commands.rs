//! Console command handlers.
//!
//! Every gated command goes through the same [`AccessGate`] checks a page
//! would, so the console never offers what the role cannot do.

use std::io::BufRead;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use serde_json::json;

use itam_auth::{Affordance, Gated, PageAccess, Route, UserAccount};
use itam_client::gate::Destination;
use itam_client::views::{AssetForm, AssetListView, UserAdminView, UserForm};
use itam_client::{
    AccessGate, AssetService, ClientConfig, FileTokenStore, HttpBackend, SessionStore,
    UserAdminService,
};
use itam_core::{AssetDraft, AssetFilter, UserId};

use crate::{AssetCommands, AssetFields, UserCommands};

pub struct Console {
    session: Arc<SessionStore>,
    gate: AccessGate,
    assets: AssetService,
    users: UserAdminService,
    json: bool,
}

impl Console {
    /// Load configuration and restore any persisted session.
    pub async fn open(json: bool) -> Result<Self> {
        let config = ClientConfig::from_env().context("invalid configuration")?;
        tracing::info!(
            api_url = %config.api_url,
            token_path = %config.token_path.display(),
            "starting console"
        );
        let backend = HttpBackend::from_config(&config).context("could not build HTTP client")?;
        let storage = FileTokenStore::new(config.token_path.clone());
        let session = SessionStore::open(Arc::new(backend), Arc::new(storage)).await;
        Ok(Self::new(session, json))
    }

    pub fn new(session: Arc<SessionStore>, json: bool) -> Self {
        Self {
            gate: session.gate(),
            assets: AssetService::new(session.clone()),
            users: UserAdminService::new(session.clone()),
            session,
            json,
        }
    }

    pub async fn login(&self, username: &str, password: Option<String>) -> Result<()> {
        let password = read_secret("Password", password)?;
        let identity = self.session.login(username, &password).await?;
        println!(
            "Signed in as {} ({})",
            identity.label(),
            identity.role.role_name
        );
        Ok(())
    }

    pub fn logout(&self) -> Result<()> {
        let next = self.session.logout();
        println!("Signed out. Continue at {next}");
        Ok(())
    }

    pub fn whoami(&self) -> Result<()> {
        let Some(identity) = self.session.identity() else {
            println!("Not signed in");
            return Ok(());
        };
        if self.json {
            println!("{}", serde_json::to_string_pretty(&identity)?);
            return Ok(());
        }
        println!("User:   {} ({})", identity.label(), identity.username);
        if let Some(dept) = identity.dept.as_deref() {
            println!("Dept:   {dept}");
        }
        println!("Role:   {}", identity.role.role_name);
        let caps: Vec<&str> = identity
            .role
            .capabilities()
            .into_iter()
            .map(|c| c.as_str())
            .collect();
        println!("Grants: {}", caps.join(", "));
        Ok(())
    }

    pub fn nav(&self) -> Result<()> {
        let items = self.gate.navigation();
        if self.json {
            let entries: Vec<_> = items
                .iter()
                .map(|item| json!({ "label": item.label, "path": item.route.path() }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
            return Ok(());
        }
        if items.is_empty() {
            println!("(nothing to show)");
        }
        for item in items {
            println!("{:<8} {}", item.label, item.route);
        }
        Ok(())
    }

    /// Resolve `path` the way the router would.
    pub fn open_path(&self, path: &str) -> Result<()> {
        let destination = self.gate.navigate(path);
        if self.json {
            let value = match &destination {
                Destination::Render { route, access } => {
                    json!({ "render": route.path(), "access": access })
                }
                Destination::Redirect { from, to } => {
                    json!({ "redirect": from.path(), "to": to.path() })
                }
            };
            println!("{}", serde_json::to_string_pretty(&value)?);
            return Ok(());
        }
        match destination {
            Destination::Render { route, access } => match access {
                PageAccess::Ready => println!("{route}: render"),
                PageAccess::Pending => println!("{route}: loading"),
                PageAccess::Denied(cap) => println!("{route}: access denied (requires {cap})"),
            },
            Destination::Redirect { from, to } => println!("{from} -> {to}"),
        }
        Ok(())
    }

    pub async fn assets(&self, command: AssetCommands) -> Result<()> {
        match command {
            AssetCommands::List {
                code,
                ip,
                category,
                status,
            } => {
                self.enter(Route::Assets)?;
                let filter = AssetFilter {
                    asset_code: code,
                    ip_address: ip,
                    category,
                    status,
                };
                let view = AssetListView::load(&self.gate, &self.assets, &filter).await?;
                self.print_assets(&view)
            }
            AssetCommands::Show { id } => {
                self.enter(Route::Assets)?;
                let asset = self.assets.get(id).await?;
                if self.json {
                    println!("{}", serde_json::to_string_pretty(&asset)?);
                    return Ok(());
                }
                println!("{} [{}]", asset.asset_code, asset.id);
                println!("  category: {}", asset.category_label());
                println!("  status:   {}", asset.status_label());
                for (label, value) in [
                    ("make", asset.make_and_model()),
                    ("serial", asset.serial_number.clone()),
                    ("location", asset.location.clone()),
                    ("dept", asset.owner_dept.clone()),
                    ("ip", asset.ip_address.clone()),
                    ("mac", asset.mac_address.clone()),
                    ("firmware", asset.os_or_firmware.clone()),
                    ("note", asset.note.clone()),
                ] {
                    if let Some(value) = value {
                        println!("  {label:<9} {value}");
                    }
                }
                Ok(())
            }
            AssetCommands::Create { code, fields } => {
                self.enter(Route::NewAsset)?;
                let mut form = AssetForm::create();
                form.values.asset_code = code;
                fields.apply(&mut form.values);
                let asset = form.submit(&self.assets).await?;
                println!("Created {} [{}]", asset.asset_code, asset.id);
                Ok(())
            }
            AssetCommands::Update { id, code, fields } => {
                self.enter(Route::EditAsset(id))?;
                let mut form = AssetForm::edit(&self.assets, id).await?;
                if let Some(code) = code {
                    form.values.asset_code = code;
                }
                fields.apply(&mut form.values);
                let asset = form.submit(&self.assets).await?;
                println!("Saved {} [{}]", asset.asset_code, asset.id);
                Ok(())
            }
            AssetCommands::Delete { id, yes } => {
                self.enter(Route::Assets)?;
                self.require(Affordance::DeleteAsset)?;
                let prompt = format!("Delete asset {id}?");
                if !yes && !confirm(&prompt, std::io::stdin().lock())? {
                    println!("Cancelled");
                    return Ok(());
                }
                self.assets.delete(id).await?;
                println!("Deleted asset {id}");
                Ok(())
            }
        }
    }

    pub async fn users(&self, command: UserCommands) -> Result<()> {
        self.enter(Route::Users)?;
        let view = UserAdminView::load(&self.gate, &self.users).await?;
        match command {
            UserCommands::List => {
                if self.json {
                    println!("{}", serde_json::to_string_pretty(&view.users)?);
                    return Ok(());
                }
                println!(
                    "{:<5} {:<16} {:<20} {:<12} {:<10} {}",
                    "ID", "USERNAME", "NAME", "DEPT", "ROLE", "ACTIVE"
                );
                for user in &view.users {
                    println!(
                        "{:<5} {:<16} {:<20} {:<12} {:<10} {}",
                        user.id,
                        user.username,
                        user.display_name.as_deref().unwrap_or("-"),
                        user.dept.as_deref().unwrap_or("-"),
                        user.role.role_name,
                        if user.is_active { "yes" } else { "no" }
                    );
                }
                Ok(())
            }
            UserCommands::Roles => {
                if self.json {
                    println!("{}", serde_json::to_string_pretty(&view.roles)?);
                    return Ok(());
                }
                for role in &view.roles {
                    let caps: Vec<&str> =
                        role.capabilities().into_iter().map(|c| c.as_str()).collect();
                    println!("{:<4} {:<12} {}", role.id, role.role_name, caps.join(", "));
                }
                Ok(())
            }
            UserCommands::Create {
                username,
                role,
                display_name,
                dept,
                password,
            } => {
                let mut form = UserForm::create(&view);
                form.username = username;
                if role.is_some() {
                    form.role_id = role;
                }
                form.display_name = display_name.unwrap_or_default();
                form.dept = dept.unwrap_or_default();
                form.password = read_secret("New password", password)?;
                let user = form.submit(&self.users).await?;
                println!("Created user {} [{}]", user.username, user.id);
                Ok(())
            }
            UserCommands::Update {
                id,
                role,
                display_name,
                dept,
                password,
            } => {
                let mut form = UserForm::edit(find_user(&view, id)?);
                if role.is_some() {
                    form.role_id = role;
                }
                if let Some(name) = display_name {
                    form.display_name = name;
                }
                if let Some(dept) = dept {
                    form.dept = dept;
                }
                form.password = password.unwrap_or_default();
                let user = form.submit(&self.users).await?;
                println!("Saved user {} [{}]", user.username, user.id);
                Ok(())
            }
            UserCommands::Toggle { id } => {
                let user = self.users.toggle_active(find_user(&view, id)?).await?;
                let state = if user.is_active { "enabled" } else { "disabled" };
                println!("User {} {state}", user.username);
                Ok(())
            }
        }
    }

    /// Refuse unless the router would render `route` for this session.
    fn enter(&self, route: Route) -> Result<()> {
        match self.gate.navigate(&route.path()) {
            Destination::Render {
                access: PageAccess::Ready,
                ..
            } => Ok(()),
            Destination::Render {
                route,
                access: PageAccess::Denied(cap),
            } => bail!("access denied: {route} requires {cap}"),
            Destination::Render {
                access: PageAccess::Pending,
                ..
            } => bail!("session is still loading"),
            Destination::Redirect { to: Route::Login, .. } => {
                bail!("not signed in; run `itam login <username>`")
            }
            Destination::Redirect { to, .. } => bail!("redirected to {to}"),
        }
    }

    fn require(&self, affordance: Affordance) -> Result<()> {
        self.gate.authorize(affordance.required_capability())?;
        Ok(())
    }

    fn print_assets(&self, view: &AssetListView) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(view)?);
            return Ok(());
        }
        println!(
            "{:<5} {:<14} {:<10} {:<8} {:<16} {:<24} {}",
            "ID", "CODE", "CATEGORY", "STATUS", "IP", "MAKE/MODEL", "ACTIONS"
        );
        for row in &view.rows {
            let asset = &row.asset;
            let actions: Vec<&str> = row.actions.iter().map(|a| a.label()).collect();
            println!(
                "{:<5} {:<14} {:<10} {:<8} {:<16} {:<24} {}",
                asset.id,
                asset.asset_code,
                asset.category_label(),
                asset.status_label(),
                asset.ip_address.as_deref().unwrap_or("-"),
                asset.make_and_model().unwrap_or_else(|| "-".into()),
                actions.join(" ")
            );
        }
        if view.rows.is_empty() {
            println!("(no assets)");
        }
        if view.can_create {
            println!();
            println!("{}: itam assets create <code>", Affordance::CreateAsset.label());
        }
        Ok(())
    }
}

impl AssetFields {
    /// Overwrite draft fields that were given; an empty string clears one.
    fn apply(self, draft: &mut AssetDraft) {
        if let Some(category) = self.category {
            draft.category = category;
        }
        if let Some(status) = self.status {
            draft.status = status;
        }
        for (slot, value) in [
            (&mut draft.brand, self.brand),
            (&mut draft.model, self.model),
            (&mut draft.serial_number, self.serial),
            (&mut draft.location, self.location),
            (&mut draft.owner_dept, self.dept),
            (&mut draft.ip_address, self.ip),
            (&mut draft.mac_address, self.mac),
            (&mut draft.os_or_firmware, self.firmware),
            (&mut draft.note, self.note),
        ] {
            if let Some(value) = value {
                *slot = Some(value);
            }
        }
    }
}

fn find_user(view: &UserAdminView, id: UserId) -> Result<&UserAccount> {
    view.users
        .iter()
        .find(|user| user.id == id)
        .with_context(|| format!("no user with id {id}"))
}

/// Ask a yes/no question on stderr; anything but `y`/`yes` declines.
fn confirm(prompt: &str, mut input: impl BufRead) -> Result<bool> {
    eprint!("{prompt} [y/N] ");
    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("could not read from stdin")?;
    let answer = line.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

fn read_secret(prompt: &str, given: Option<String>) -> Result<String> {
    if let Some(secret) = given {
        return Ok(secret);
    }
    eprint!("{prompt}: ");
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("could not read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
