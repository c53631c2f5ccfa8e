//! Session store: the single owner of the (credential, identity) pair.
//!
//! State is published through a `tokio::sync::watch` channel so every view
//! and the [`AccessGate`](crate::AccessGate) re-render on change. Durable
//! storage is written under the same commit lock as the published state, so
//! once an operation returns the persisted token always equals the in-memory
//! credential.
//!
//! Each credential change bumps an epoch. A network call that started under
//! an older epoch cannot write its result back; this is how a logout wins
//! against a profile fetch or login that is still in flight.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use itam_auth::{Credential, Identity, Route, SessionState};

use crate::backend::{ApiResult, Backend};
use crate::error::{ClientError, ClientResult};
use crate::gate::AccessGate;
use crate::storage::TokenStore;

pub struct SessionStore {
    backend: Arc<dyn Backend>,
    storage: Arc<dyn TokenStore>,
    state: watch::Sender<SessionState>,
    epoch: Mutex<u64>,
    // Login and profile refresh never overlap.
    ops: tokio::sync::Mutex<()>,
}

impl SessionStore {
    /// Build the store from whatever credential is persisted.
    ///
    /// A stored token starts in the restoring state; nothing is trusted until
    /// [`initialize`](Self::initialize) has fetched the profile.
    pub fn new(backend: Arc<dyn Backend>, storage: Arc<dyn TokenStore>) -> Self {
        let initial = match storage.load() {
            Ok(Some(credential)) => SessionState::restoring(credential),
            Ok(None) => SessionState::Anonymous,
            Err(err) => {
                warn!(error = %err, "could not read persisted token; starting signed out");
                SessionState::Anonymous
            }
        };
        let (state, _) = watch::channel(initial);
        Self {
            backend,
            storage,
            state,
            epoch: Mutex::new(0),
            ops: tokio::sync::Mutex::new(()),
        }
    }

    /// Construct and validate any persisted credential.
    pub async fn open(backend: Arc<dyn Backend>, storage: Arc<dyn TokenStore>) -> Arc<Self> {
        let store = Arc::new(Self::new(backend, storage));
        store.initialize().await;
        store
    }

    /// Resolve a restored credential into an identity, or drop it.
    pub async fn initialize(&self) {
        if !self.snapshot().is_restoring() {
            return;
        }
        match self.refresh_profile().await {
            Ok(()) => debug!("restored session validated"),
            Err(err) => info!(error = %err, "stored credential rejected; signed out"),
        }
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// Current state, cloned.
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn credential(&self) -> Option<Credential> {
        self.state.borrow().credential().cloned()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().identity().cloned()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn gate(&self) -> AccessGate {
        AccessGate::new(self.subscribe())
    }

    /// Exchange username/password for a credential and identity.
    ///
    /// Any failure leaves the previous session exactly as it was and is
    /// reported as [`ClientError::InvalidCredentials`]; the cause is logged.
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<Identity> {
        let _op = self.ops.lock().await;
        let started = {
            let epoch = self.lock_epoch();
            self.state.send_if_modified(|state| {
                if matches!(state, SessionState::Anonymous) {
                    *state = SessionState::Authenticating { credential: None };
                    true
                } else {
                    false
                }
            });
            *epoch
        };

        let result = self.backend.login(username, password).await;

        let mut epoch = self.lock_epoch();
        if *epoch != started {
            debug!(username, "login finished after logout; discarding result");
            return Err(match result {
                Ok(_) => ClientError::Superseded,
                Err(_) => ClientError::InvalidCredentials,
            });
        }

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                warn!(username, error = %err, "login rejected");
                self.abandon_login();
                return Err(ClientError::InvalidCredentials);
            }
        };
        let credential = match Credential::new(response.token.access_token) {
            Ok(credential) => credential,
            Err(err) => {
                warn!(username, error = %err, "login returned no usable token");
                self.abandon_login();
                return Err(ClientError::InvalidCredentials);
            }
        };
        if let Err(err) = self.storage.save(&credential) {
            error!(username, error = %err, "failed to persist token");
            self.abandon_login();
            return Err(err.into());
        }

        *epoch += 1;
        let identity = response.user;
        self.state.send_replace(SessionState::Authenticated {
            credential,
            identity: identity.clone(),
        });
        info!(username = %identity.username, role = %identity.role.role_name, "signed in");
        Ok(identity)
    }

    /// Drop the credential from memory and storage. Always succeeds.
    ///
    /// Returns the route the caller should navigate to.
    pub fn logout(&self) -> Route {
        let mut epoch = self.lock_epoch();
        self.invalidate(&mut epoch);
        info!("signed out");
        Route::Login
    }

    /// Re-fetch the identity for the current credential.
    ///
    /// Without a credential this is a no-op. Any failure ends the session
    /// (no retry) and yields [`ClientError::SessionExpired`].
    pub async fn refresh_profile(&self) -> ClientResult<()> {
        let _op = self.ops.lock().await;
        let (credential, started) = {
            let epoch = self.lock_epoch();
            match self.state.borrow().credential() {
                Some(credential) => (credential.clone(), *epoch),
                None => return Ok(()),
            }
        };

        let result = self.backend.me(&credential).await;

        let mut epoch = self.lock_epoch();
        if *epoch != started {
            debug!("profile fetch finished after session change; discarding result");
            return Err(ClientError::Superseded);
        }
        match result {
            Ok(identity) => {
                debug!(username = %identity.username, "profile refreshed");
                self.state.send_replace(SessionState::Authenticated { credential, identity });
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "profile fetch failed; ending session");
                self.invalidate(&mut epoch);
                Err(ClientError::SessionExpired)
            }
        }
    }

    /// Run an authenticated backend call with the credential current at send
    /// time.
    ///
    /// A 401 demotes the session, but only if the rejected credential is
    /// still the current one.
    pub async fn authorized<T, F, Fut>(&self, call: F) -> ClientResult<T>
    where
        F: FnOnce(Credential) -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        let (credential, started) = {
            let epoch = self.lock_epoch();
            let credential = self.state.borrow().credential().cloned();
            (credential.ok_or(ClientError::NotAuthenticated)?, *epoch)
        };

        match call(credential).await {
            Ok(value) => Ok(value),
            Err(err) if err.is_unauthorized() => {
                let mut epoch = self.lock_epoch();
                if *epoch != started {
                    return Err(ClientError::Superseded);
                }
                warn!("credential rejected by backend; ending session");
                self.invalidate(&mut epoch);
                Err(ClientError::SessionExpired)
            }
            Err(err) => {
                debug!(error = %err, "request failed");
                Err(ClientError::request_failed(&err))
            }
        }
    }

    fn lock_epoch(&self) -> MutexGuard<'_, u64> {
        self.epoch.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Caller holds the epoch lock.
    fn invalidate(&self, epoch: &mut u64) {
        *epoch += 1;
        self.state.send_replace(SessionState::Invalidating);
        if let Err(err) = self.storage.clear() {
            error!(error = %err, "failed to clear persisted token");
        }
        self.state.send_replace(SessionState::Anonymous);
    }

    /// Caller holds the epoch lock.
    fn abandon_login(&self) {
        self.state.send_if_modified(|state| {
            if matches!(state, SessionState::Authenticating { credential: None }) {
                *state = SessionState::Anonymous;
                true
            } else {
                false
            }
        });
    }
}

impl core::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionStore")
            .field("phase", &self.state.borrow().phase())
            .finish_non_exhaustive()
    }
}
