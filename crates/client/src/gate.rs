//! Reactive wrapper around the pure checks in [`itam_auth::gate`].
//!
//! The gate holds no decisions of its own. Every call reads the session as it
//! is right now, so a logout or role change is reflected on the next render.

use tokio::sync::watch;

use itam_auth::{
    Admission, Capability, Gated, GateError, Identity, NavItem, PageAccess, Route, SessionState,
};

/// Where a navigation attempt ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Render `route` in the given access state.
    Render { route: Route, access: PageAccess },
    /// Leave `from` and go to `to` instead. Single hop.
    Redirect { from: Route, to: Route },
}

#[derive(Debug, Clone)]
pub struct AccessGate {
    session: watch::Receiver<SessionState>,
}

impl AccessGate {
    pub fn new(session: watch::Receiver<SessionState>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> SessionState {
        self.session.borrow().clone()
    }

    pub fn admit(&self, route: &Route) -> Admission {
        itam_auth::admit(&self.session.borrow(), route)
    }

    pub fn page(&self, route: &Route) -> PageAccess {
        itam_auth::page_access(&self.session.borrow(), route)
    }

    /// Resolve a path into either a page to render or a redirect.
    pub fn navigate(&self, path: &str) -> Destination {
        let route = Route::parse(path);
        let session = self.session.borrow();
        match itam_auth::admit(&session, &route) {
            Admission::Granted => {
                let access = itam_auth::page_access(&session, &route);
                Destination::Render { route, access }
            }
            Admission::Redirect(to) => Destination::Redirect { from: route, to },
        }
    }

    pub fn is_visible<T: Gated + ?Sized>(&self, item: &T) -> bool {
        itam_auth::is_visible(&self.session.borrow(), item)
    }

    pub fn visible<T, I>(&self, items: I) -> Vec<T>
    where
        T: Gated,
        I: IntoIterator<Item = T>,
    {
        itam_auth::filter_visible(&self.session.borrow(), items)
    }

    pub fn navigation(&self) -> Vec<NavItem> {
        itam_auth::navigation(&self.session.borrow())
    }

    /// Current identity if it holds `required`.
    pub fn authorize(&self, required: Capability) -> Result<Identity, GateError> {
        itam_auth::authorize(&self.session.borrow(), required).cloned()
    }

    /// Label for the user menu, if signed in.
    pub fn user_label(&self) -> Option<String> {
        self.session
            .borrow()
            .identity()
            .map(|identity| identity.label().to_string())
    }

    /// Wait for the next session change. `false` once the store is gone.
    pub async fn changed(&mut self) -> bool {
        self.session.changed().await.is_ok()
    }
}
