// Session handling for the note service client:
// - Durable session storage (file-backed and in-memory)
// - The session store: credential/identity lifecycle, authorization
//   predicates, synchronization with the HTTP client's bearer slot

// Export errors module - storage error types
pub mod errors;
pub use errors::StorageError;

// Export storage module - persistent session storage
pub mod storage;
pub use storage::{FileStorage, MemoryStorage, SessionStorage, TOKEN_KEY, USER_KEY};

// Export session module - the session store
pub mod session;
pub use session::{SessionClearedHandler, SessionStore};
