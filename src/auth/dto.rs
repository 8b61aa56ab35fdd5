use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo::{Role, User};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Request body for account creation.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    pub current_password: String,
    pub password: String,
}

/// Response returned whenever a session is (re)issued.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub status: &'static str,
    pub token: String,
    pub user: PublicUser,
}

/// Serialization view of a user; structurally excludes credential fields.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: OffsetDateTime,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// Soft-authentication probe: `user` is null for anonymous visitors.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: Option<PublicUser>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub status: &'static str,
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("guide@trailbook.example"));
        assert!(is_valid_email("first.last+tag@mail.co"));
    }

    #[test]
    fn rejects_junk() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("two@@at.com"));
        assert!(!is_valid_email("spaces in@mail.com"));
        assert!(!is_valid_email("missing@tld"));
    }

    #[test]
    fn public_user_omits_credentials() {
        let user = User {
            id: Uuid::new_v4(),
            name: "A".into(),
            email: "a@b.co".into(),
            password_hash: "$argon2id$fake".into(),
            role: Role::Admin,
            password_changed_at: None,
            password_reset_token_hash: Some("deadbeef".into()),
            password_reset_expires_at: None,
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&PublicUser::from(&user)).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("deadbeef"));
        assert!(json.contains("\"role\":\"admin\""));
    }
}
