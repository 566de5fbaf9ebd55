use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::{begin, fail, finish, SharedState, StoreState};
use crate::client::ApiClient;
use crate::errors::ApiResult;
use crate::types::{Note, NoteRequest};

/// Store for the current user's notes.
///
/// An in-flight request is never cancelled: if the caller has moved on by
/// the time the response lands, the result is still applied to the shared
/// state.
#[derive(Clone)]
pub struct NoteStore {
    client: ApiClient,
    state: SharedState<Note>,
}

impl NoteStore {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: Arc::new(RwLock::new(StoreState::default())),
        }
    }

    pub fn notes(&self) -> Vec<Note> {
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
    pub async fn fetch_all(&self) -> ApiResult<Vec<Note>> {
        begin(&self.state);
        match self.client.get::<Vec<Note>>("/api/notes").await {
            Ok(notes) => {
                let mut state = self.state.write();
                state.items = notes.clone();
                state.loading = false;
                Ok(notes)
            }
            Err(err) => {
                fail(&self.state, &err, "failed to load notes");
                Err(err)
            }
        }
    }

    /// Fetches a single note without touching the shared collection.
    #[instrument(skip(self))]
    pub async fn fetch_by_id(&self, id: i64) -> ApiResult<Note> {
        begin(&self.state);
        match self.client.get::<Note>(&format!("/api/notes/{id}")).await {
            Ok(note) => {
                finish(&self.state);
                Ok(note)
            }
            Err(err) => {
                fail(&self.state, &err, "failed to load note");
                Err(err)
            }
        }
    }

    /// Creates a note and prepends the server's canonical record, never the
    /// input data.
    #[instrument(skip(self, note))]
    pub async fn create(&self, note: &NoteRequest) -> ApiResult<Note> {
        begin(&self.state);
        match self.client.post::<_, Note>("/api/notes", note).await {
            Ok(created) => {
                let mut state = self.state.write();
                state.items.insert(0, created.clone());
                state.loading = false;
                debug!(id = created.id, "note created");
                Ok(created)
            }
            Err(err) => {
                fail(&self.state, &err, "failed to create note");
                Err(err)
            }
        }
    }

    /// Updates a note and replaces the matching local record by id.
    #[instrument(skip(self, note))]
    pub async fn update(&self, id: i64, note: &NoteRequest) -> ApiResult<Note> {
        begin(&self.state);
        match self
            .client
            .put::<_, Note>(&format!("/api/notes/{id}"), note)
            .await
        {
            Ok(updated) => {
                let mut state = self.state.write();
                if let Some(existing) = state.items.iter_mut().find(|n| n.id == id) {
                    *existing = updated.clone();
                }
                state.loading = false;
                Ok(updated)
            }
            Err(err) => {
                fail(&self.state, &err, "failed to update note");
                Err(err)
            }
        }
    }

    /// Deletes a note and drops the local record by id.
    #[instrument(skip(self))]
    pub async fn remove(&self, id: i64) -> ApiResult<()> {
        begin(&self.state);
        match self.client.delete(&format!("/api/notes/{id}")).await {
            Ok(()) => {
                let mut state = self.state.write();
                state.items.retain(|n| n.id != id);
                state.loading = false;
                debug!(id, "note deleted");
                Ok(())
            }
            Err(err) => {
                fail(&self.state, &err, "failed to delete note");
                Err(err)
            }
        }
    }

    /// Back to initial values; used on logout and screen teardown.
    pub fn reset(&self) {
        *self.state.write() = StoreState::default();
    }
}
