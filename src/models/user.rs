use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authenticated identity as returned by the API and mirrored into storage.
///
/// A non-empty `id` means the session is authenticated; every field is
/// serialized so the persisted copy never drops data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
}

impl User {
    /// Display name with a fallback for accounts created before names
    /// were required.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

/// Token pair issued at sign-in.
///
/// The refresh token is optional; builds without rotation only receive an
/// access token. Never handed to UI code - read by the session layer to
/// attach to outgoing requests and by storage for persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub token: String,
    pub refresh_token: Option<String>,
    pub saved_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(token: String, refresh_token: Option<String>) -> Self {
        Self {
            token,
            refresh_token,
            saved_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_falls_back_to_email() {
        let user = User {
            id: "u1".to_string(),
            name: String::new(),
            email: "a@b.com".to_string(),
            avatar: None,
        };
        assert_eq!(user.display_name(), "a@b.com");

        let named = User {
            name: "Ana".to_string(),
            ..user
        };
        assert_eq!(named.display_name(), "Ana");
    }

    #[test]
    fn test_user_serialization_round_trip() {
        let user = User {
            id: "u1".to_string(),
            name: "Ana".to_string(),
            email: "a@b.com".to_string(),
            avatar: Some("ana.png".to_string()),
        };
        let json = serde_json::to_string(&user).unwrap();
        let back: User = serde_json::from_str(&json).unwrap();
        assert_eq!(back, user);
    }
}
