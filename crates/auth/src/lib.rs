//! `itam-auth`: client-side session and authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it models who
//! is signed in and decides, from that alone, which routes are admitted and
//! which affordances are rendered. The backend remains the authority.

pub mod capability;
pub mod credential;
pub mod gate;
pub mod identity;
pub mod roles;
pub mod routes;
pub mod session;

pub use capability::Capability;
pub use credential::Credential;
pub use gate::{
    Admission, Affordance, Gated, GateError, NavItem, PageAccess, admit, authorize, filter_visible,
    is_visible, navigation, page_access,
};
pub use identity::{Identity, NewUser, UserAccount, UserPatch};
pub use roles::Role;
pub use routes::Route;
pub use session::{SessionPhase, SessionState};
