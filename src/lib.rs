//! gymbook-core - the client core for the gymbook workout tracker.
//!
//! This crate holds everything a gymbook shell (mobile, TUI, or GUI)
//! needs besides rendering: the API client, the data models, persisted
//! credentials, and the session state machine. Screens ask the session
//! two things - who is the current user, and is the session still
//! loading - and call its operations; the session keeps the request
//! channel's bearer token and the persisted records in step, and tears
//! itself down when any request reports an authentication failure.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError, AuthFailureHandle};
pub use auth::{CredentialStore, SessionError, SessionManager, SessionState, StorageError};
pub use config::Config;
pub use models::{Credential, Exercise, HistoryByDay, HistoryEntry, User};
