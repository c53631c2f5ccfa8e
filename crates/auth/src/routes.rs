//! Navigational destinations of the inventory UI.

use itam_core::AssetId;

use crate::Capability;

/// A resolved destination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// Sign-in entry point. The only public destination.
    Login,
    /// `/`, forwards to the asset list.
    Home,
    Assets,
    NewAsset,
    EditAsset(AssetId),
    Users,
    /// Anything not in the table; forwards to the asset list.
    NotFound(String),
}

impl Route {
    /// Resolve a path (query string and trailing slash ignored).
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed
            .trim_start_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        match segments.as_slice() {
            [] => Route::Home,
            ["login"] => Route::Login,
            ["assets"] => Route::Assets,
            ["assets", "new"] => Route::NewAsset,
            ["assets", id] => match id.parse::<AssetId>() {
                Ok(id) => Route::EditAsset(id),
                Err(_) => Route::NotFound(path.to_string()),
            },
            ["users"] => Route::Users,
            _ => Route::NotFound(path.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Home => "/".to_string(),
            Route::Assets => "/assets".to_string(),
            Route::NewAsset => "/assets/new".to_string(),
            Route::EditAsset(id) => format!("/assets/{id}"),
            Route::Users => "/users".to_string(),
            Route::NotFound(path) => path.clone(),
        }
    }

    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login)
    }

    /// Capability a page needs to be useful at all. `None` means the page has
    /// no capability requirement of its own.
    pub fn required_capability(&self) -> Option<Capability> {
        match self {
            Route::Assets => Some(Capability::ReadAsset),
            Route::NewAsset => Some(Capability::CreateAsset),
            Route::EditAsset(_) => Some(Capability::UpdateAsset),
            Route::Users => Some(Capability::ManageUsers),
            Route::Login | Route::Home | Route::NotFound(_) => None,
        }
    }
}

impl core::fmt::Display for Route {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.path())
    }
}
