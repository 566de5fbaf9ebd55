// Core client functionality for the note service:
// - HTTP client adapter with bearer injection and 401 interception
// - Request/response data structures shared with the server
// - Navigation guard
// - Resource stores (notes, users)
// - Configuration loading

// Export client module - HTTP client adapter
pub mod client;
pub use client::*;

// Export types module - Request/response data structures
pub mod types;
pub use types::*;

// Export config module - Configuration loading
pub mod config;
pub use config::*;

// Export errors module - Shared error types
pub mod errors;
pub use errors::*;

// Route policies and the navigation guard
pub mod router;

// Resource stores
pub mod stores;
pub use stores::{NoteStore, StoreState, UserStore};

// Notification capability consumed by the presentation layer
pub mod notify;
pub use notify::{Notice, NoticeKind, Notifier};
