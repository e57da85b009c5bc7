//! Authentication module for managing the user session.
//!
//! This module provides:
//! - `SessionManager`: the session state machine (bootstrap, sign-in,
//!   sign-out, profile update, forced sign-out on auth failure)
//! - `CredentialStore`: persisted user and credential records
//!
//! The session is the single source of truth for "who is signed in" and
//! "is the session still loading"; everything else consumes it.

pub mod session;
pub mod storage;

pub use session::{SessionError, SessionManager, SessionState};
pub use storage::{CredentialStore, StorageError};
