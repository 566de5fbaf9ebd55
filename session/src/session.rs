use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use jot_core::client::{ApiClient, AuthToken};
use jot_core::errors::{ApiError, ApiResult};
use jot_core::types::{Identity, LoginRequest, LoginResponse, Session};

use crate::storage::{SessionStorage, TOKEN_KEY, USER_KEY};

/// Callback fired after the session has been cleared, whether by `logout`
/// or by a rejected credential.
pub type SessionClearedHandler = Arc<dyn Fn() + Send + Sync>;

struct SessionState {
    token: String,
    identity: Identity,
}

/// Owns the credential/identity pair and keeps the persistent storage and
/// the HTTP client's bearer slot in sync with it.
///
/// Clones share state; the store is the session's single writer.
#[derive(Clone)]
pub struct SessionStore {
    client: ApiClient,
    storage: Arc<dyn SessionStorage>,
    state: Arc<RwLock<Option<SessionState>>>,
    on_cleared: Arc<RwLock<Option<SessionClearedHandler>>>,
}

impl SessionStore {
    pub fn new(client: ApiClient, storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            client,
            storage,
            state: Arc::new(RwLock::new(None)),
            on_cleared: Arc::new(RwLock::new(None)),
        }
    }

    /// Adopts a persisted session when one is present and well-formed, and
    /// registers the client's auth-failure handler. Malformed or partial
    /// entries are discarded and the session starts empty.
    pub fn initialize(&self) -> Session {
        if let Some((token, identity)) = self.load_persisted() {
            debug!(username = %identity.username, "restored persisted session");
            self.client.auth_token().set(&token);
            *self.state.write() = Some(SessionState { token, identity });
        }

        // A 401 anywhere invalidates the session before the caller sees
        // the error.
        let state = Arc::clone(&self.state);
        let storage = Arc::clone(&self.storage);
        let token = self.client.auth_token();
        let on_cleared = Arc::clone(&self.on_cleared);
        self.client.on_auth_failure(Arc::new(move || {
            warn!("credential rejected by server, clearing session");
            clear_session(&state, &storage, &token, &on_cleared);
        }));

        self.session()
    }

    /// Exchanges credentials for a session. On success the new session is
    /// persisted and adopted; on failure nothing changes and the caller
    /// gets the typed rejection.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<Session> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response = match self
            .client
            .post::<_, LoginResponse>("/api/auth/login", &request)
            .await
        {
            Ok(response) => response,
            // The adapter reports any 401 as a rejected credential; on the
            // login boundary that means the submitted credentials.
            Err(ApiError::Unauthorized) => return Err(ApiError::InvalidCredentials),
            Err(err) => return Err(err),
        };

        let identity = response.identity();
        let identity_json =
            serde_json::to_string(&identity).map_err(|e| ApiError::Storage(e.to_string()))?;

        // Persist before adopting so a storage fault cannot leave a live
        // session that would not survive a restart.
        if let Err(e) = self
            .storage
            .put(TOKEN_KEY, &response.token)
            .and_then(|_| self.storage.put(USER_KEY, &identity_json))
        {
            discard_persisted(self.storage.as_ref());
            return Err(ApiError::Storage(e.to_string()));
        }

        self.client.auth_token().set(&response.token);
        *self.state.write() = Some(SessionState {
            token: response.token,
            identity: identity.clone(),
        });
        debug!(username = %identity.username, "login succeeded");

        Ok(Session::authenticated(identity))
    }

    /// Clears the session everywhere. Calling while logged out is a no-op.
    pub fn logout(&self) {
        clear_session(
            &self.state,
            &self.storage,
            &self.client.auth_token(),
            &self.on_cleared,
        );
    }

    /// Registers a callback fired after every clear; the shell uses it to
    /// reset resource stores and fall back to the login screen.
    pub fn on_session_cleared(&self, handler: SessionClearedHandler) {
        *self.on_cleared.write() = Some(handler);
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.session().is_admin()
    }

    /// The current bearer token, when logged in.
    pub fn token(&self) -> Option<String> {
        self.state.read().as_ref().map(|s| s.token.clone())
    }

    /// Snapshot of the current session.
    pub fn session(&self) -> Session {
        match self.state.read().as_ref() {
            Some(state) => Session::authenticated(state.identity.clone()),
            None => Session::anonymous(),
        }
    }

    fn load_persisted(&self) -> Option<(String, Identity)> {
        let token = self.storage.get(TOKEN_KEY).unwrap_or_else(|e| {
            warn!("failed to read persisted token: {e}");
            None
        });
        let user = self.storage.get(USER_KEY).unwrap_or_else(|e| {
            warn!("failed to read persisted identity: {e}");
            None
        });

        match (token, user) {
            (Some(token), Some(user)) => match serde_json::from_str::<Identity>(&user) {
                Ok(identity) => Some((token, identity)),
                Err(e) => {
                    warn!("discarding malformed persisted identity: {e}");
                    discard_persisted(self.storage.as_ref());
                    None
                }
            },
            (None, None) => None,
            // One entry without the other violates the session invariant;
            // drop whichever half is left.
            _ => {
                warn!("discarding partial persisted session");
                discard_persisted(self.storage.as_ref());
                None
            }
        }
    }
}

fn discard_persisted(storage: &dyn SessionStorage) {
    for key in [TOKEN_KEY, USER_KEY] {
        if let Err(e) = storage.remove(key) {
            warn!("failed to remove persisted {key}: {e}");
        }
    }
}

/// Shared by `logout` and the auth-failure handler; a free function so the
/// handler does not have to capture the store itself.
fn clear_session(
    state: &Arc<RwLock<Option<SessionState>>>,
    storage: &Arc<dyn SessionStorage>,
    token: &AuthToken,
    on_cleared: &Arc<RwLock<Option<SessionClearedHandler>>>,
) {
    let was_authenticated = state.write().take().is_some();
    token.clear();
    discard_persisted(storage.as_ref());

    if was_authenticated {
        debug!("session cleared");
        let handler = on_cleared.read().clone();
        if let Some(handler) = handler {
            handler();
        }
    }
}
