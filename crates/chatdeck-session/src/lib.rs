//! Chat session persistence for chatdeck.
//!
//! A [`Storage`] adapter wraps a raw [`KvStore`] and never fails past its
//! boundary. The [`SessionRepository`] keeps the full session collection in
//! memory, tracks the current session through an [`ActiveSession`], and
//! writes everything back after each mutation.

/// The current session.
pub mod active;
/// JSON export and import.
pub mod export;
/// Theme and user profile.
pub mod prefs;
/// The session collection.
pub mod repository;
/// Failure-absorbing storage adapter.
pub mod storage;
/// Raw key/value media.
pub mod store;

pub use active::ActiveSession;
pub use export::{read_session_export, write_export, AllSessionsExport, SessionExport};
pub use prefs::{Preferences, Theme, UserProfile};
pub use repository::{DeleteOutcome, SessionRepository};
pub use storage::{Storage, StorageKeys};
pub use store::{FileKvStore, KvStore, MemoryKvStore};
