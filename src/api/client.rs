//! API client for communicating with the gymbook REST API.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! requests for exercise, history, and profile data, and the
//! auth-failure subscription used by the session layer to force a
//! sign-out when any request comes back 401.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use reqwest::{header, Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{Exercise, HistoryByDay, User};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Callback invoked when a response is classified as an authentication
/// failure. Must not subscribe or unsubscribe from inside the callback.
type AuthFailureCallback = Arc<dyn Fn() + Send + Sync>;

/// Success body of `POST /sessions`.
///
/// Fields are optional on purpose: the session layer decides whether a
/// body missing `user` or `token` counts as a malformed response, the
/// client only transports it.
#[derive(Debug, Deserialize)]
pub struct SessionResponse {
    pub user: Option<User>,
    pub token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AvatarResponse {
    avatar: String,
}

#[derive(Debug, Serialize)]
struct ProfileUpdateBody<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    old_password: Option<&'a str>,
}

struct ClientInner {
    http: Client,
    base_url: String,
    /// Bearer token attached to every outgoing request. Only the session
    /// layer mutates it; it is re-read per request, so a change takes
    /// effect before the next send without touching in-flight requests.
    token: Mutex<Option<String>>,
    subscribers: Mutex<Vec<(u64, AuthFailureCallback)>>,
    next_subscriber_id: AtomicU64,
}

/// API client for the gymbook server.
/// Clone is cheap - all state lives behind an `Arc`, and reqwest::Client
/// shares its connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

/// Unsubscription token returned by [`ApiClient::subscribe_auth_failures`].
///
/// Dropping it (or calling [`unsubscribe`](Self::unsubscribe)) removes
/// exactly the callback it was issued for; removing twice is a no-op.
pub struct AuthFailureHandle {
    id: u64,
    inner: Weak<ClientInner>,
}

impl AuthFailureHandle {
    /// Remove the subscribed callback.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for AuthFailureHandle {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            let mut subscribers = inner
                .subscribers
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            subscribers.retain(|(id, _)| *id != self.id);
        }
    }
}

impl ApiClient {
    /// Create a new API client for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                token: Mutex::new(None),
                subscribers: Mutex::new(Vec::new()),
                next_subscriber_id: AtomicU64::new(1),
            }),
        })
    }

    /// Set or clear the bearer token attached to subsequent requests.
    /// Restricted to the session layer - nothing else may touch the
    /// auth header.
    pub(crate) fn set_token(&self, token: Option<String>) {
        let mut slot = self
            .inner
            .token
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = token;
    }

    /// The bearer token currently attached to outgoing requests, if any.
    pub fn token(&self) -> Option<String> {
        self.inner
            .token
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Register a callback invoked whenever a response is classified as an
    /// authentication failure. Multiple subscribers may coexist; each is
    /// invoked independently. The callback runs after error classification
    /// and before the error reaches the original caller.
    pub fn subscribe_auth_failures(
        &self,
        callback: impl Fn() + Send + Sync + 'static,
    ) -> AuthFailureHandle {
        let id = self.inner.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        let mut subscribers = self
            .inner
            .subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        subscribers.push((id, Arc::new(callback)));

        AuthFailureHandle {
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    fn notify_auth_failure(&self) {
        // Snapshot under the lock, invoke outside it, so a callback that
        // drops a handle cannot deadlock the registry.
        let callbacks: Vec<AuthFailureCallback> = {
            let subscribers = self
                .inner
                .subscribers
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            subscribers.iter().map(|(_, cb)| Arc::clone(cb)).collect()
        };

        debug!(subscribers = callbacks.len(), "Auth failure intercepted");
        for callback in callbacks {
            callback();
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.inner.base_url, path)
    }

    fn auth_headers(&self) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = self.token() {
            let value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ApiError::InvalidResponse(format!("Invalid bearer token: {}", e)))?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Send a prepared request and classify the response.
    ///
    /// A 401 status notifies every auth-failure subscriber after the error
    /// is classified and before it is handed back to the caller.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = request.headers(self.auth_headers()?).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = ApiError::from_status(status, &body);
        warn!(status = %status, "Request failed: {}", error);

        if status == StatusCode::UNAUTHORIZED {
            self.notify_auth_failure();
        }

        Err(error)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        debug!(path, "GET");
        let response = self.send(self.inner.http.get(self.url(path))).await?;
        Ok(response.json().await?)
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        debug!(path, "POST");
        let response = self
            .send(self.inner.http.post(self.url(path)).json(body))
            .await?;
        Ok(response.json().await?)
    }

    /// POST for endpoints whose success body carries nothing we consume.
    async fn post_unit<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        debug!(path, "POST");
        self.send(self.inner.http.post(self.url(path)).json(body))
            .await?;
        Ok(())
    }

    async fn put_unit<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        debug!(path, "PUT");
        self.send(self.inner.http.put(self.url(path)).json(body))
            .await?;
        Ok(())
    }

    // ===== Session Endpoints =====

    /// Exchange email and password for a user plus token pair.
    pub async fn create_session(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SessionResponse, ApiError> {
        let body = serde_json::json!({ "email": email, "password": password });
        self.post("/sessions", &body).await
    }

    /// Register a new account.
    pub async fn create_account(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(), ApiError> {
        let body = serde_json::json!({ "name": name, "email": email, "password": password });
        self.post_unit("/users", &body).await
    }

    // ===== Profile Endpoints =====

    /// Update name and optionally the password of the signed-in user.
    pub async fn update_profile(
        &self,
        name: &str,
        password: Option<&str>,
        old_password: Option<&str>,
    ) -> Result<(), ApiError> {
        let body = ProfileUpdateBody {
            name,
            password,
            old_password,
        };
        self.put_unit("/users", &body).await
    }

    /// Upload a new avatar image; returns the stored file name.
    pub async fn update_avatar(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ApiError> {
        debug!(file_name, "PATCH /users/avatar");
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("avatar", part);

        let response = self
            .send(self.inner.http.patch(self.url("/users/avatar")).multipart(form))
            .await?;
        let parsed: AvatarResponse = response.json().await?;
        Ok(parsed.avatar)
    }

    // ===== Exercise Endpoints =====

    /// Fetch the list of muscle groups.
    pub async fn fetch_exercise_groups(&self) -> Result<Vec<String>, ApiError> {
        self.get("/groups").await
    }

    /// Fetch all exercises belonging to a muscle group.
    pub async fn fetch_exercises_by_group(&self, group: &str) -> Result<Vec<Exercise>, ApiError> {
        self.get(&format!("/exercises/bygroup/{}", group)).await
    }

    /// Fetch detail for a single exercise.
    pub async fn fetch_exercise(&self, id: i64) -> Result<Exercise, ApiError> {
        self.get(&format!("/exercises/{}", id)).await
    }

    // ===== History Endpoints =====

    /// Record an exercise as completed.
    pub async fn record_history(&self, exercise_id: i64) -> Result<(), ApiError> {
        let body = serde_json::json!({ "exercise_id": exercise_id });
        self.post_unit("/history", &body).await
    }

    /// Fetch completion history grouped by day, newest first.
    pub async fn fetch_history(&self) -> Result<Vec<HistoryByDay>, ApiError> {
        self.get("/history").await
    }

    // ===== Media URLs =====

    /// URL for a user avatar file.
    pub fn avatar_url(&self, file: &str) -> String {
        self.url(&format!("/avatar/{}", file))
    }

    /// URL for an exercise thumbnail file.
    pub fn exercise_thumb_url(&self, file: &str) -> String {
        self.url(&format!("/exercise/thumb/{}", file))
    }

    /// URL for an exercise demonstration file.
    pub fn exercise_demo_url(&self, file: &str) -> String {
        self.url(&format!("/exercise/demo/{}", file))
    }
}
