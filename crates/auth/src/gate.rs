//! Access gate: route admission and capability-gated rendering.
//!
//! Every function here is a pure read of a [`SessionState`]:
//! - No IO
//! - No caching (callers re-evaluate on every navigation/render)
//! - No mutation of the session

use serde::Serialize;
use thiserror::Error;

use crate::{Capability, Identity, Route, SessionState};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("not signed in")]
    NotAuthenticated,

    #[error("access denied: missing capability '{0}'")]
    Forbidden(Capability),
}

/// Require `required` on the current identity.
///
/// An absent identity (never signed in, still loading, logged out) is
/// `NotAuthenticated`; there is no partial grant.
pub fn authorize(session: &SessionState, required: Capability) -> Result<&Identity, GateError> {
    let identity = session.identity().ok_or(GateError::NotAuthenticated)?;
    if identity.can(required) {
        Ok(identity)
    } else {
        Err(GateError::Forbidden(required))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Route admission
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of entering a destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Granted,
    Redirect(Route),
}

/// Decide whether `route` may be entered.
///
/// Only credential presence matters here, not the identity: a restored
/// credential is admitted while its profile loads. Redirects are single hop.
pub fn admit(session: &SessionState, route: &Route) -> Admission {
    if !route.is_protected() {
        return Admission::Granted;
    }
    if !session.has_credential() {
        return Admission::Redirect(Route::Login);
    }
    match route {
        Route::Home | Route::NotFound(_) => Admission::Redirect(Route::Assets),
        _ => Admission::Granted,
    }
}

/// What an admitted page may render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "capability")]
pub enum PageAccess {
    Ready,
    /// Credential present, identity not loaded yet. Nothing gated is shown.
    Pending,
    /// Render an explicit "access denied" state.
    Denied(Capability),
}

pub fn page_access(session: &SessionState, route: &Route) -> PageAccess {
    let Some(required) = route.required_capability() else {
        return PageAccess::Ready;
    };
    match session.identity() {
        Some(identity) if identity.can(required) => PageAccess::Ready,
        Some(_) => PageAccess::Denied(required),
        None if session.is_restoring() => PageAccess::Pending,
        None => PageAccess::Denied(required),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Capability-gated affordances
// ─────────────────────────────────────────────────────────────────────────────

/// Anything rendered only when the current role holds one capability.
pub trait Gated {
    fn required_capability(&self) -> Capability;
}

/// Hidden unless an identity is present and its role grants the capability.
pub fn is_visible<T: Gated + ?Sized>(session: &SessionState, item: &T) -> bool {
    session
        .identity()
        .is_some_and(|identity| identity.can(item.required_capability()))
}

pub fn filter_visible<T, I>(session: &SessionState, items: I) -> Vec<T>
where
    T: Gated,
    I: IntoIterator<Item = T>,
{
    items
        .into_iter()
        .filter(|item| is_visible(session, item))
        .collect()
}

/// Optional actions on the asset and user screens.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Affordance {
    AssetsNav,
    UsersNav,
    CreateAsset,
    EditAsset,
    DeleteAsset,
}

impl Affordance {
    pub const ALL: [Affordance; 5] = [
        Affordance::AssetsNav,
        Affordance::UsersNav,
        Affordance::CreateAsset,
        Affordance::EditAsset,
        Affordance::DeleteAsset,
    ];

    /// Per-row actions on the asset list.
    pub const ROW_ACTIONS: [Affordance; 2] = [Affordance::EditAsset, Affordance::DeleteAsset];

    pub fn label(&self) -> &'static str {
        match self {
            Affordance::AssetsNav => "Assets",
            Affordance::UsersNav => "Users",
            Affordance::CreateAsset => "New asset",
            Affordance::EditAsset => "Edit",
            Affordance::DeleteAsset => "Delete",
        }
    }
}

impl Gated for Affordance {
    fn required_capability(&self) -> Capability {
        match self {
            Affordance::AssetsNav => Capability::ReadAsset,
            Affordance::UsersNav => Capability::ManageUsers,
            Affordance::CreateAsset => Capability::CreateAsset,
            Affordance::EditAsset => Capability::UpdateAsset,
            Affordance::DeleteAsset => Capability::DeleteAsset,
        }
    }
}

/// Entry of the top navigation menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub route: Route,
    pub affordance: Affordance,
}

impl Gated for NavItem {
    fn required_capability(&self) -> Capability {
        self.affordance.required_capability()
    }
}

fn nav_table() -> [NavItem; 2] {
    [
        NavItem {
            label: Affordance::AssetsNav.label(),
            route: Route::Assets,
            affordance: Affordance::AssetsNav,
        },
        NavItem {
            label: Affordance::UsersNav.label(),
            route: Route::Users,
            affordance: Affordance::UsersNav,
        },
    ]
}

/// Navigation menu entries visible to the current role.
pub fn navigation(session: &SessionState) -> Vec<NavItem> {
    filter_visible(session, nav_table())
}
