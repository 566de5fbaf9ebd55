//! CRUD-backed resource stores.
//!
//! Each store owns one collection plus a `loading`/`error` pair shared by
//! every operation on that store. Concurrent operations race on the shared
//! pair and the last response to resolve wins; this mirrors the surface the
//! screens were written against and is intentional. Collections are only
//! mutated after the server confirms a change.

mod notes;
mod users;

pub use notes::NoteStore;
pub use users::UserStore;

use parking_lot::RwLock;
use std::sync::Arc;

use crate::errors::ApiError;

/// Tri-state tracked per store: the collection, whether an operation is in
/// flight, and the last failure message.
#[derive(Debug, Clone)]
pub struct StoreState<T> {
    pub items: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for StoreState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
        }
    }
}

pub(crate) type SharedState<T> = Arc<RwLock<StoreState<T>>>;

/// Marks an operation as started: loading set, previous error cleared.
pub(crate) fn begin<T>(state: &SharedState<T>) {
    let mut state = state.write();
    state.loading = true;
    state.error = None;
}

/// Marks an operation as finished without touching the collection.
pub(crate) fn finish<T>(state: &SharedState<T>) {
    state.write().loading = false;
}

/// Records a failure: loading cleared, message captured, collection intact.
pub(crate) fn fail<T>(state: &SharedState<T>, err: &ApiError, fallback: &str) {
    let mut state = state.write();
    state.loading = false;
    state.error = Some(err.user_message(fallback));
}
