//! REST API client module for the gymbook server.
//!
//! This module provides the `ApiClient` for exercise, history, and
//! profile requests, plus the auth-failure subscription mechanism the
//! session layer uses to tear down a session when any request comes
//! back unauthorized.
//!
//! The API uses bearer token authentication obtained through the
//! `/sessions` endpoint; only the session layer may set or clear the
//! attached token.

pub mod client;
pub mod error;

pub use client::{ApiClient, AuthFailureHandle, SessionResponse};
pub use error::ApiError;
