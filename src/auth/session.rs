//! Session state machine.
//!
//! `SessionManager` owns the single in-memory `SessionState`, drives
//! sign-in/sign-out/profile updates, mirrors them into the
//! `CredentialStore`, and keeps the `ApiClient`'s bearer token in step.
//! At construction it subscribes to the client's auth-failure channel so
//! a 401 from any request, fired by any screen, tears the session down.

use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError, AuthFailureHandle};
use crate::models::{Credential, User};

use super::storage::{CredentialStore, StorageError};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Success status but the body is missing a field a sign-in cannot
    /// proceed without.
    #[error("Malformed sign-in response: {0}")]
    MalformedResponse(&'static str),
}

/// The one fact the rest of the app consumes.
///
/// `loading == true` means "do not draw either route tree yet" - it is
/// set for the duration of every session operation, starting with the
/// bootstrap the process begins in.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub loading: bool,
    pub user: Option<User>,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.user.as_ref().is_some_and(|u| !u.id.is_empty())
    }
}

impl Default for SessionState {
    /// The process starts bootstrapping: no user yet, loading set.
    fn default() -> Self {
        Self {
            loading: true,
            user: None,
        }
    }
}

struct SessionInner {
    api: ApiClient,
    store: CredentialStore,
    state: Mutex<SessionState>,
}

impl SessionInner {
    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_loading(&self, loading: bool) {
        self.state().loading = loading;
    }

    /// Shared body of user-initiated and forced sign-out.
    ///
    /// The in-memory transition, record removals, and token clear all run
    /// regardless of individual failures; the first unexpected storage
    /// error is returned only after the transition has completed, so
    /// sign-out is never blockable.
    fn sign_out(&self) -> Result<(), StorageError> {
        self.set_loading(true);
        self.state().user = None;

        let removed_user = self.store.remove_user();
        let removed_credential = self.store.remove_credential();
        self.api.set_token(None);

        self.set_loading(false);
        info!("Signed out");

        if let Err(e) = &removed_user {
            warn!(error = %e, "Failed to remove user record during sign-out");
        }
        if let Err(e) = &removed_credential {
            warn!(error = %e, "Failed to remove credential record during sign-out");
        }
        removed_user.and(removed_credential)
    }

    /// Best-effort cleanup of a half-persisted session (one record
    /// without the other). Failures are logged, not surfaced - the
    /// in-memory state is already signed out.
    fn discard_partial_records(&self) {
        if let Err(e) = self.store.remove_user() {
            warn!(error = %e, "Failed to discard stale user record");
        }
        if let Err(e) = self.store.remove_credential() {
            warn!(error = %e, "Failed to discard stale credential record");
        }
    }
}

/// Owns the session for the lifetime of the process.
///
/// Holds the auth-failure subscription handle; dropping the manager
/// unsubscribes, so the channel never calls into a dead session.
pub struct SessionManager {
    inner: Arc<SessionInner>,
    _auth_failure: AuthFailureHandle,
}

impl SessionManager {
    pub fn new(api: ApiClient, store: CredentialStore) -> Self {
        let inner = Arc::new(SessionInner {
            api: api.clone(),
            store,
            state: Mutex::new(SessionState::default()),
        });

        let weak = Arc::downgrade(&inner);
        let handle = api.subscribe_auth_failures(move || {
            if let Some(inner) = weak.upgrade() {
                info!("Auth failure reported by the request channel, forcing sign-out");
                // Storage errors cannot block a forced sign-out; they were
                // already logged inside sign_out.
                let _ = inner.sign_out();
            }
        });

        Self {
            inner,
            _auth_failure: handle,
        }
    }

    /// One-time startup read of the persisted session, before any routing
    /// decision. Never touches the network; a storage read failure fails
    /// open to signed-out rather than surfacing an error there is no UI
    /// to show yet.
    pub fn bootstrap(&self) {
        let inner = &self.inner;
        inner.set_loading(true);

        match inner.store.load_session() {
            Ok(Some((user, credential))) => {
                inner.api.set_token(Some(credential.token));
                inner.state().user = Some(user);
                info!("Persisted session restored");
            }
            Ok(None) => {
                debug!("No persisted session");
                inner.discard_partial_records();
            }
            Err(e) => {
                warn!(error = %e, "Failed to read persisted session, treating as signed out");
                inner.discard_partial_records();
            }
        }

        inner.set_loading(false);
    }

    /// Exchange email and password for an authenticated session.
    ///
    /// The user is persisted before the credential, and the in-memory
    /// transition happens only after both records are on disk - a
    /// credential write failure leaves the session signed out, and the
    /// stray user record is discarded by the next bootstrap or sign-out.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, SessionError> {
        self.inner.set_loading(true);
        let result = self.sign_in_inner(email, password).await;
        self.inner.set_loading(false);
        result
    }

    async fn sign_in_inner(&self, email: &str, password: &str) -> Result<User, SessionError> {
        let response = self.inner.api.create_session(email, password).await?;

        let user = response
            .user
            .ok_or(SessionError::MalformedResponse("response has no user"))?;
        let token = response
            .token
            .ok_or(SessionError::MalformedResponse("response has no token"))?;
        if user.id.is_empty() {
            return Err(SessionError::MalformedResponse("user has an empty id"));
        }

        let credential = Credential::new(token, response.refresh_token);

        self.inner.store.save_user(&user)?;
        self.inner.store.save_credential(&credential)?;

        self.inner.api.set_token(Some(credential.token));
        self.inner.state().user = Some(user.clone());

        info!(user_id = %user.id, "Signed in");
        Ok(user)
    }

    /// Replace the current user's profile.
    ///
    /// Persist-first policy: memory is updated only once the record is on
    /// disk, so the in-memory user and the stored user never diverge.
    /// The credential and the authenticated state are untouched.
    pub fn update_user_profile(&self, user: User) -> Result<(), SessionError> {
        self.inner.set_loading(true);
        let persisted = self.inner.store.save_user(&user);
        if persisted.is_ok() {
            self.inner.state().user = Some(user);
        }
        self.inner.set_loading(false);
        persisted?;
        Ok(())
    }

    /// Tear down the session. The state transition always completes; an
    /// unexpected storage error is returned afterwards for surfacing.
    pub fn sign_out(&self) -> Result<(), StorageError> {
        self.inner.sign_out()
    }

    /// Snapshot of the current session state.
    pub fn state(&self) -> SessionState {
        self.inner.state().clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.inner.state().user.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state().loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state().is_authenticated()
    }
}
