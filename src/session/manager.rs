use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::session::api::{ClientError, SessionApi};
use crate::session::store::TokenStore;
use crate::users::dto::PublicUser;

/// What the presentation layer may observe. `Restoring` only occurs during
/// the startup profile fetch; until it resolves the session is not yet
/// determined and callers should show an indeterminate state.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Anonymous,
    Restoring,
    Authenticated(PublicUser),
}

/// Client-held session. Transitions are serialized by the operation mutex,
/// so a `restore()` in flight cannot interleave with login or logout, while
/// the state itself lives in a watch channel and stays readable at any
/// point — `Restoring` is visible for the whole profile fetch.
pub struct SessionManager<A: SessionApi, S: TokenStore> {
    api: A,
    store: S,
    ops: Mutex<()>,
    state_tx: watch::Sender<SessionState>,
}

impl<A: SessionApi, S: TokenStore> SessionManager<A, S> {
    pub fn new(api: A, store: S) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Anonymous);
        Self {
            api,
            store,
            ops: Mutex::new(()),
            state_tx,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state_tx.borrow().clone()
    }

    /// A receiver the presentation layer can await state changes on.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// The persisted bearer token, for callers making their own requests.
    pub fn token(&self) -> Option<String> {
        self.store.load()
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<PublicUser, ClientError> {
        let _guard = self.ops.lock().await;
        let (token, user) = self.api.login(email, password).await?;
        self.store.save(&token);
        self.state_tx.send_replace(SessionState::Authenticated(user.clone()));
        info!(email = %email, "session established");
        Ok(user)
    }

    /// Registration immediately logs in with the same credentials; a failure
    /// from either step propagates and leaves the session anonymous.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<PublicUser, ClientError> {
        self.api.register(name, email, password).await?;
        self.login(email, password).await
    }

    pub async fn logout(&self) {
        let _guard = self.ops.lock().await;
        self.store.clear();
        self.state_tx.send_replace(SessionState::Anonymous);
        info!("session cleared");
    }

    /// Run once at startup. Any failure to fetch the profile, expiry
    /// included, means "not logged in" and discards the stored token.
    pub async fn restore(&self) {
        let _guard = self.ops.lock().await;
        let Some(token) = self.store.load() else {
            self.state_tx.send_replace(SessionState::Anonymous);
            return;
        };
        self.state_tx.send_replace(SessionState::Restoring);
        match self.api.profile(&token).await {
            Ok(user) => {
                info!(user_id = %user.id, "session restored");
                self.state_tx.send_replace(SessionState::Authenticated(user));
            }
            Err(e) => {
                warn!(error = %e, "session restore failed; discarding token");
                self.store.clear();
                self.state_tx.send_replace(SessionState::Anonymous);
            }
        }
    }

    /// Replace the in-memory account after a successful profile edit; no
    /// network call, no effect while not authenticated.
    pub async fn update_local(&self, user: PublicUser) {
        let _guard = self.ops.lock().await;
        let authenticated = matches!(*self.state_tx.borrow(), SessionState::Authenticated(_));
        if authenticated {
            self.state_tx.send_replace(SessionState::Authenticated(user));
        } else {
            debug!("update_local ignored outside an authenticated session");
        }
    }
}
