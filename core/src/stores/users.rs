use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::{begin, fail, SharedState, StoreState};
use crate::client::ApiClient;
use crate::errors::ApiResult;
use crate::types::{CreateUserRequest, User};

/// Store for the system's user accounts. Every operation requires the
/// admin role server-side; the store itself does not gate access.
#[derive(Clone)]
pub struct UserStore {
    client: ApiClient,
    state: SharedState<User>,
}

impl UserStore {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: Arc::new(RwLock::new(StoreState::default())),
        }
    }

    pub fn users(&self) -> Vec<User> {
        self.state.read().items.clone()
    }

    pub fn loading(&self) -> bool {
        self.state.read().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    /// Replaces the collection with the server's list.
    #[instrument(skip(self))]
    pub async fn fetch_all(&self) -> ApiResult<Vec<User>> {
        begin(&self.state);
        match self.client.get::<Vec<User>>("/api/users").await {
            Ok(users) => {
                let mut state = self.state.write();
                state.items = users.clone();
                state.loading = false;
                Ok(users)
            }
            Err(err) => {
                fail(&self.state, &err, "failed to load users");
                Err(err)
            }
        }
    }

    /// Creates an account and appends the server's canonical record.
    #[instrument(skip(self, user), fields(username = %user.username))]
    pub async fn create(&self, user: &CreateUserRequest) -> ApiResult<User> {
        begin(&self.state);
        match self.client.post::<_, User>("/api/users", user).await {
            Ok(created) => {
                let mut state = self.state.write();
                state.items.push(created.clone());
                state.loading = false;
                debug!(id = created.id, "user created");
                Ok(created)
            }
            Err(err) => {
                fail(&self.state, &err, "failed to create user");
                Err(err)
            }
        }
    }

    /// Deletes an account and drops the local record by id.
    #[instrument(skip(self))]
    pub async fn remove(&self, id: i64) -> ApiResult<()> {
        begin(&self.state);
        match self.client.delete(&format!("/api/users/{id}")).await {
            Ok(()) => {
                let mut state = self.state.write();
                state.items.retain(|u| u.id != id);
                state.loading = false;
                debug!(id, "user deleted");
                Ok(())
            }
            Err(err) => {
                fail(&self.state, &err, "failed to delete user");
                Err(err)
            }
        }
    }

    /// Back to initial values; used on logout and screen teardown.
    pub fn reset(&self) {
        *self.state.write() = StoreState::default();
    }
}
