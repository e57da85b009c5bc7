//! Data models for gymbook entities.
//!
//! This module contains all the data structures used to represent
//! gymbook data including:
//!
//! - `User`, `Credential`: Authenticated identity and its token pair
//! - `Exercise`: Catalog entries listed per muscle group
//! - `HistoryEntry`, `HistoryByDay`: Completed-exercise history

pub mod exercise;
pub mod history;
pub mod user;

pub use exercise::Exercise;
pub use history::{HistoryByDay, HistoryEntry};
pub use user::{Credential, User};
